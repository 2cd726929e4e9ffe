//! Plain-text table rendering for history records.

use serde_json::Value;
use std::fmt;

use crate::history::HistoryRecord;

/// Records laid out as columns and rows of cell text
#[derive(Debug, Clone, PartialEq)]
pub struct RecordTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RecordTable {
    /// Columns are the union of record keys in first-seen order; rows keep input order.
    pub fn from_records(records: &[HistoryRecord]) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for record in records {
            for key in record.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|column| record.get(column).map(cell_text).unwrap_or_default())
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    fn column_widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                self.rows
                    .iter()
                    .map(|row| row[i].chars().count())
                    .chain(std::iter::once(column.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }
}

impl fmt::Display for RecordTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.column_widths();

        write_row(f, &self.columns, &widths)?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(w + 2)).collect();
        writeln!(f, "+{}+", rule.join("+"))?;
        for row in &self.rows {
            write_row(f, row, &widths)?;
        }
        Ok(())
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, cells: &[String], widths: &[usize]) -> fmt::Result {
    write!(f, "|")?;
    for (cell, width) in cells.iter().zip(widths) {
        let pad = width - cell.chars().count();
        write!(f, " {}{} |", cell, " ".repeat(pad))?;
    }
    writeln!(f)
}

/// Strings unquoted, null blank, everything else as compact JSON
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.replace(['\n', '\r'], " "),
        other => other.to_string(),
    }
}

/// Rendered table text for a non-empty record list
pub fn render_records_table(records: &[HistoryRecord]) -> String {
    RecordTable::from_records(records).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(value: Value) -> Vec<HistoryRecord> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    #[test]
    fn test_single_record_table() {
        let table = RecordTable::from_records(&records(json!([
            {"ip": "1.2.3.4", "first_seen": "2020-01-01"}
        ])));

        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.columns.len(), 2);
        assert!(table.columns.contains(&"ip".to_string()));
        assert!(table.columns.contains(&"first_seen".to_string()));
        assert!(table.rows[0].contains(&"1.2.3.4".to_string()));
        assert!(table.rows[0].contains(&"2020-01-01".to_string()));
    }

    #[test]
    fn test_columns_union_and_missing_cells() {
        let table = RecordTable::from_records(&records(json!([
            {"ip": "1.1.1.1"},
            {"ip": "2.2.2.2", "last_seen": "2022-02-02"}
        ])));

        assert_eq!(table.columns, vec!["ip", "last_seen"]);
        assert_eq!(table.rows[0], vec!["1.1.1.1", ""]);
        assert_eq!(table.rows[1], vec!["2.2.2.2", "2022-02-02"]);
    }

    #[test]
    fn test_rows_keep_provider_order() {
        let table = RecordTable::from_records(&records(json!([
            {"ip": "9.9.9.9"}, {"ip": "1.1.1.1"}, {"ip": "5.5.5.5"}
        ])));
        let ips: Vec<&str> = table.rows.iter().map(|r| r[0].as_str()).collect();
        assert_eq!(ips, vec!["9.9.9.9", "1.1.1.1", "5.5.5.5"]);
    }

    #[test]
    fn test_cell_text_for_value_kinds() {
        assert_eq!(cell_text(&json!(null)), "");
        assert_eq!(cell_text(&json!("text")), "text");
        assert_eq!(cell_text(&json!(42)), "42");
        assert_eq!(cell_text(&json!(true)), "true");
        assert_eq!(cell_text(&json!(["a", "b"])), r#"["a","b"]"#);
        assert_eq!(
            cell_text(&json!([{"ip": "1.2.3.4", "ip_count": 1}])),
            r#"[{"ip":"1.2.3.4","ip_count":1}]"#
        );
    }

    #[test]
    fn test_rendered_table_is_aligned() {
        let text = render_records_table(&records(json!([
            {"ip": "1.2.3.4", "type": "a"},
            {"ip": "10.20.30.40", "type": "a"}
        ])));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4, "header, rule and two rows");
        let width = lines[0].chars().count();
        assert!(lines.iter().all(|l| l.chars().count() == width));
        assert!(lines[1].starts_with("+-"));
        assert!(lines[3].contains("10.20.30.40"));
    }
}
