use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use dnshistorian::cli::Cli;
use dnshistorian::config::{self, AppConfig};
use dnshistorian::logger::{ConsoleLogger, VerbosityLevel};
use dnshistorian::session::{self, TITLE};
use dnshistorian::{Analyzer, GeminiClient, HistoryClient, Secrets};

fn init_tracing(verbosity: VerbosityLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.tracing_directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let verbosity = VerbosityLevel::from_verbose_count(cli.verbose);
    init_tracing(verbosity);

    // Handle --init first (before any other processing)
    if cli.init {
        match AppConfig::create_default_config(&cli.config) {
            Ok(path) => {
                println!("✅ Created default configuration file at: {}", path.display());
                println!("   Edit this file to customize settings, then run dnshistorian again.");
                std::process::exit(0);
            }
            Err(e) => {
                eprintln!("❌ Failed to create configuration file: {}", e);
                std::process::exit(1);
            }
        }
    }

    let app_config = match AppConfig::load_from_path(&cli.config) {
        Ok(cfg) => cfg,
        Err(config::ConfigError::FileNotFound(path)) => {
            // Config not found - prompt to create if interactive
            match AppConfig::prompt_create_config(&path) {
                Ok(Some(created_path)) => {
                    println!("✅ Created default configuration file at: {}", created_path.display());
                    println!("   Edit this file to customize settings, then run dnshistorian again.");
                    std::process::exit(0);
                }
                Ok(None) => {
                    eprintln!("❌ Configuration file not found at: {}", path.display());
                    eprintln!("   Run with --init to create a default configuration file.");
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("❌ Failed to create configuration file: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Err(e) => {
            eprintln!("❌ Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // Both keys must be present before anything talks to the network
    let secrets = match Secrets::load(&app_config.secrets) {
        Ok(secrets) => secrets,
        Err(e) => {
            eprintln!("❌ Configuration error: {}", e);
            eprintln!(
                "   Please set {} and {}.",
                app_config.secrets.ai_api_key_name, app_config.secrets.history_api_key_name
            );
            std::process::exit(1);
        }
    };

    let history = HistoryClient::from_config(&app_config)
        .context("Failed to create HTTP client for the history provider")?;
    let summarizer = GeminiClient::from_config(&app_config, secrets.ai_api_key())
        .context("Failed to create HTTP client for the AI provider")?;
    let analyzer = Analyzer::new(history, summarizer, &secrets, app_config.ai.prompt_char_limit);

    let logger = match cli.log_file.clone() {
        Some(path) => ConsoleLogger::with_log_file(verbosity, cli.use_color(), path),
        None => ConsoleLogger::new(verbosity, cli.use_color()),
    };
    logger.debug(&format!("Using model {}", analyzer.summarizer().model()));

    let exit_code = match cli.domain.as_deref() {
        Some(domain) => {
            let outcome = session::run_once(&analyzer, &logger, domain).await;
            if outcome.is_success() { 0 } else { 1 }
        }
        None => {
            logger.print_banner(TITLE);
            let summary = session::run_session(&analyzer, &logger, BufReader::new(tokio::io::stdin())).await;
            logger.info(&format!(
                "Session finished: {} analyses, {} completed, {} cancelled",
                summary.runs, summary.succeeded, summary.cancelled
            ));
            0
        }
    };

    if logger.is_log_export_enabled() {
        match logger.export_logs() {
            Ok(()) => logger.info(&format!("Exported {} transcript lines", logger.get_log_count())),
            Err(e) => eprintln!("❌ Failed to export session log: {}", e),
        }
    }

    std::process::exit(exit_code);
}
