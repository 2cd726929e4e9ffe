//! The per-request pipeline: fetch history, show it, summarize it.
//!
//! Each call to [`Analyzer::run`] starts from scratch. Failures are reported
//! through the [`Surface`] and returned as a [`RunOutcome`]; nothing here
//! ends the process.

use tracing::{debug, info};

use crate::history::{HistoryError, HistoryRecord, HistorySource};
use crate::secrets::Secrets;
use crate::summarize::{self, AiError, Summarizer};

pub const RECORDS_HEADING: &str = "Historical DNS Records";
pub const SUMMARY_HEADING: &str = "AI Security Summary";
pub const EMPTY_DOMAIN_WARNING: &str = "Please enter a domain name.";
pub const NO_RECORDS_WARNING: &str = "No records found for this domain.";

/// Where the pipeline writes what the user sees
pub trait Surface {
    fn warning(&self, message: &str);
    fn error(&self, message: &str);
    fn show_records(&self, heading: &str, records: &[HistoryRecord]);
    fn show_summary(&self, heading: &str, text: &str);
    fn start_spinner(&self, message: &str);
    fn finish_spinner(&self);
}

/// How a single run ended
#[derive(Debug)]
pub enum RunOutcome {
    EmptyDomain,
    HistoryFailed(HistoryError),
    NoRecords,
    Summarized { records: usize, summary: String },
    SummaryFailed { records: usize, error: AiError },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Summarized { .. } | RunOutcome::NoRecords)
    }
}

pub fn history_error_message(err: &HistoryError) -> String {
    format!("Error fetching data: {}", err)
}

pub fn ai_error_message(err: &AiError) -> String {
    format!("AI analysis failed: {}", err)
}

pub struct Analyzer<H, S> {
    history: H,
    summarizer: S,
    history_api_key: String,
    prompt_char_limit: usize,
}

impl<H, S> Analyzer<H, S>
where
    H: HistorySource,
    S: Summarizer,
{
    pub fn new(history: H, summarizer: S, secrets: &Secrets, prompt_char_limit: usize) -> Self {
        Self {
            history,
            summarizer,
            history_api_key: secrets.history_api_key().to_string(),
            prompt_char_limit,
        }
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn summarizer(&self) -> &S {
        &self.summarizer
    }

    pub async fn run(&self, domain: &str, surface: &dyn Surface) -> RunOutcome {
        if domain.is_empty() {
            surface.warning(EMPTY_DOMAIN_WARNING);
            return RunOutcome::EmptyDomain;
        }

        info!("Analyzing {}", domain);

        surface.start_spinner("Fetching domain history...");
        let fetched = self.history.fetch_history(domain, &self.history_api_key).await;
        surface.finish_spinner();

        let records = match fetched {
            Ok(response) => response.records,
            Err(err) => {
                surface.error(&history_error_message(&err));
                return RunOutcome::HistoryFailed(err);
            }
        };

        if records.is_empty() {
            surface.warning(NO_RECORDS_WARNING);
            return RunOutcome::NoRecords;
        }

        surface.show_records(RECORDS_HEADING, &records);
        debug!("Rendered {} records for {}", records.len(), domain);

        surface.start_spinner("Analyzing the data...");
        let summary = summarize::summarize(&self.summarizer, domain, &records, self.prompt_char_limit).await;
        surface.finish_spinner();

        match summary {
            Ok(text) => {
                surface.show_summary(SUMMARY_HEADING, &text);
                RunOutcome::Summarized {
                    records: records.len(),
                    summary: text,
                }
            }
            Err(err) => {
                surface.error(&ai_error_message(&err));
                RunOutcome::SummaryFailed {
                    records: records.len(),
                    error: err,
                }
            }
        }
    }
}
