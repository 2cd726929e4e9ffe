pub mod analyzer;
pub mod cli;
pub mod config;
pub mod history;
pub mod logger;
pub mod render;
pub mod secrets;
pub mod session;
pub mod summarize;

pub use analyzer::{Analyzer, RunOutcome, Surface};
pub use config::AppConfig;
pub use history::{HistoryClient, HistoryRecord, HistoryResponse};
pub use secrets::Secrets;
pub use summarize::GeminiClient;
