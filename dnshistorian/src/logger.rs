use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use indicatif::{ProgressBar, ProgressStyle};

use crate::analyzer::Surface;
use crate::history::HistoryRecord;
use crate::render::render_records_table;

#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub enum VerbosityLevel {
    Summary = 0,   // Results, warnings and errors (default)
    Detailed = 1,  // Plus progress messages
    Debug = 2,     // Everything
}

impl VerbosityLevel {
    pub fn from_verbose_count(count: u8) -> Self {
        match count {
            0 => VerbosityLevel::Summary,
            1 => VerbosityLevel::Detailed,
            2.. => VerbosityLevel::Debug,
        }
    }

    /// Default `tracing` filter directive for this level
    pub fn tracing_directive(&self) -> &'static str {
        match self {
            VerbosityLevel::Summary => "warn",
            VerbosityLevel::Detailed => "info",
            VerbosityLevel::Debug => "debug",
        }
    }
}

/// Terminal output for an interactive session.
///
/// Results go to stdout, status lines to stderr. Everything shown is also kept
/// in a transcript buffer when a log file was requested.
#[derive(Clone)]
pub struct ConsoleLogger {
    verbosity: VerbosityLevel,
    color: bool,
    spinner: Arc<Mutex<Option<ProgressBar>>>,
    transcript: Arc<Mutex<Vec<String>>>,
    log_file_path: Option<String>,
}

impl ConsoleLogger {
    pub fn new(verbosity: VerbosityLevel, color: bool) -> Self {
        Self {
            verbosity,
            color,
            spinner: Arc::new(Mutex::new(None)),
            transcript: Arc::new(Mutex::new(Vec::new())),
            log_file_path: None,
        }
    }

    pub fn with_log_file(verbosity: VerbosityLevel, color: bool, log_file_path: String) -> Self {
        Self {
            log_file_path: Some(log_file_path),
            ..Self::new(verbosity, color)
        }
    }

    pub fn info(&self, message: &str) {
        if self.verbosity >= VerbosityLevel::Detailed {
            self.print_status("INFO", message);
        }
    }

    pub fn debug(&self, message: &str) {
        if self.verbosity >= VerbosityLevel::Debug {
            self.print_status("DEBUG", message);
        }
    }

    fn print_status(&self, level: &str, message: &str) {
        let msg = format!("[{}] {}: {}", timestamp(), level, message);
        self.record(&msg);

        // Print above the spinner when one is running
        if let Ok(guard) = self.spinner.lock() {
            if let Some(pb) = guard.as_ref() {
                pb.println(msg);
                return;
            }
        }
        eprintln!("{}", msg);
    }

    /// User-facing output on stdout
    fn print_result(&self, text: &str) {
        self.record(text);
        println!("{}", text);
    }

    fn record(&self, line: &str) {
        if self.log_file_path.is_some() {
            if let Ok(mut buffer) = self.transcript.lock() {
                buffer.push(line.to_string());
            }
        }
    }

    pub fn print_banner(&self, title: &str) {
        self.print_result(&format!("\n🛡️  {}\n", title));
    }

    /// Export the session transcript to the configured file
    pub fn export_logs(&self) -> std::io::Result<()> {
        let Some(ref log_file_path) = self.log_file_path else {
            return Ok(());
        };
        let Ok(buffer) = self.transcript.lock() else {
            return Ok(());
        };

        if let Some(parent) = Path::new(log_file_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_file_path)?;

        for entry in buffer.iter() {
            writeln!(file, "{}", entry)?;
        }
        file.flush()
    }

    pub fn is_log_export_enabled(&self) -> bool {
        self.log_file_path.is_some()
    }

    pub fn get_log_count(&self) -> usize {
        self.transcript.lock().map(|b| b.len()).unwrap_or(0)
    }

    fn spinner_style(&self) -> ProgressStyle {
        let template = if self.color {
            "{spinner:.cyan} {msg}"
        } else {
            "{spinner} {msg}"
        };
        ProgressStyle::default_spinner()
            .template(template)
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }
}

impl Surface for ConsoleLogger {
    fn warning(&self, message: &str) {
        self.print_result(&format!("⚠️  {}", message));
    }

    fn error(&self, message: &str) {
        self.print_result(&format!("❌ {}", message));
    }

    fn show_records(&self, heading: &str, records: &[HistoryRecord]) {
        self.print_result(&format!("\n{}\n{}", heading, "=".repeat(heading.chars().count())));
        self.print_result(render_records_table(records).trim_end());
        self.debug(&format!("Displayed {} records", records.len()));
    }

    fn show_summary(&self, heading: &str, text: &str) {
        self.print_result(&format!("\n{}\n{}", heading, "=".repeat(heading.chars().count())));
        self.print_result(text);
        println!();
    }

    fn start_spinner(&self, message: &str) {
        self.info(message);
        let pb = ProgressBar::new_spinner();
        pb.set_style(self.spinner_style());
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        if let Ok(mut guard) = self.spinner.lock() {
            if let Some(previous) = guard.replace(pb) {
                previous.finish_and_clear();
            }
        }
    }

    fn finish_spinner(&self) {
        if let Ok(mut guard) = self.spinner.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }
}

/// UTC time of day as `hh:mm:ss.mmmZ`
fn timestamp() -> String {
    let since_epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let of_day = since_epoch.as_secs() % 86_400;

    format!(
        "{:02}:{:02}:{:02}.{:03}Z",
        of_day / 3600,
        of_day / 60 % 60,
        of_day % 60,
        since_epoch.subsec_millis()
    )
}
