//! Interactive prompt loop.
//!
//! Every entered line triggers one analysis of that line. EOF, `:quit` or
//! Ctrl+C at the prompt end the session; Ctrl+C during an analysis only
//! cancels that analysis.

use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use crate::analyzer::{Analyzer, RunOutcome, Surface};
use crate::history::HistorySource;
use crate::summarize::Summarizer;

pub const TITLE: &str = "Domain History & AI Analyst";
pub const PROMPT: &str = "Enter a domain to analyze (e.g., google.com): ";
pub const CANCELLED_WARNING: &str = "Analysis cancelled.";
pub const UNREADABLE_INPUT_WARNING: &str = "Input is not valid UTF-8; enter the domain again.";

const QUIT_COMMANDS: [&str; 2] = [":quit", ":q"];

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct SessionSummary {
    pub runs: usize,
    pub succeeded: usize,
    pub cancelled: usize,
}

impl SessionSummary {
    fn record(&mut self, outcome: &RunOutcome) {
        self.runs += 1;
        if outcome.is_success() {
            self.succeeded += 1;
        }
    }
}

/// Read domains from `input` until EOF or a quit command.
///
/// A line that cannot be decoded is rejected with a warning and the session
/// continues. A failing input stream ends the session, not the process.
pub async fn run_session<H, S, R>(
    analyzer: &Analyzer<H, S>,
    surface: &dyn Surface,
    mut input: R,
) -> SessionSummary
where
    H: HistorySource,
    S: Summarizer,
    R: AsyncBufRead + Unpin,
{
    let mut summary = SessionSummary::default();
    let mut raw = Vec::new();

    loop {
        print!("{}", PROMPT);
        if let Err(e) = std::io::stdout().flush() {
            debug!("Failed to flush prompt: {}", e);
        }

        raw.clear();
        let read = tokio::select! {
            read = input.read_until(b'\n', &mut raw) => read,
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
        };

        match read {
            Ok(0) => {
                println!();
                break;
            }
            Ok(_) => {}
            Err(e) => {
                debug!("Reading input failed: {:?}", e);
                surface.error(&format!("Failed to read input: {}", e));
                break;
            }
        }

        let Some(domain) = decode_line(&raw) else {
            surface.warning(UNREADABLE_INPUT_WARNING);
            continue;
        };

        if QUIT_COMMANDS.contains(&domain) {
            break;
        }

        tokio::select! {
            outcome = analyzer.run(domain, surface) => {
                debug!("Run for {:?} finished: {:?}", domain, outcome);
                summary.record(&outcome);
            }
            _ = tokio::signal::ctrl_c() => {
                surface.finish_spinner();
                surface.warning(CANCELLED_WARNING);
                summary.runs += 1;
                summary.cancelled += 1;
            }
        }
    }

    debug!("Session ended: {:?}", summary);
    summary
}

/// Strip the line terminator; `None` when the bytes are not UTF-8
fn decode_line(raw: &[u8]) -> Option<&str> {
    let line = raw.strip_suffix(b"\n").unwrap_or(raw);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    std::str::from_utf8(line).ok()
}

/// Analyze one domain without prompting
pub async fn run_once<H, S>(analyzer: &Analyzer<H, S>, surface: &dyn Surface, domain: &str) -> RunOutcome
where
    H: HistorySource,
    S: Summarizer,
{
    analyzer.run(domain, surface).await
}
