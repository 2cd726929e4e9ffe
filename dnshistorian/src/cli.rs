use clap::Parser;
use std::path::PathBuf;

use crate::config::CONFIG_PATH;

#[derive(Parser, Debug)]
#[command(name = "dnshistorian")]
#[command(about = "Look up historical DNS A records for a domain and get an AI summary of hosting changes and risks")]
#[command(version)]
pub struct Cli {
    /// Create default configuration file (at --config or ./config/dnshistorian.toml) and exit
    #[arg(long)]
    pub init: bool,

    /// Path to the configuration file
    #[arg(short, long, value_name = "PATH", default_value = CONFIG_PATH)]
    pub config: PathBuf,

    /// Analyze a single domain and exit instead of starting an interactive session
    #[arg(short, long)]
    pub domain: Option<String>,

    /// Verbose logging (use -v for INFO, -vv for DEBUG)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Export the session transcript to a file (specify file path)
    #[arg(long)]
    pub log_file: Option<String>,

    /// Disable colored output (also respects NO_COLOR environment variable)
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    pub fn use_color(&self) -> bool {
        !self.no_color && std::env::var_os("NO_COLOR").is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["dnshistorian"]).unwrap();
        assert!(!cli.init);
        assert_eq!(cli.config, PathBuf::from(CONFIG_PATH));
        assert!(cli.domain.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_one_shot_flags() {
        let cli = Cli::try_parse_from([
            "dnshistorian",
            "--domain",
            "example.com",
            "-vv",
            "--config",
            "/tmp/custom.toml",
            "--log-file",
            "session.log",
        ])
        .unwrap();

        assert_eq!(cli.domain.as_deref(), Some("example.com"));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, PathBuf::from("/tmp/custom.toml"));
        assert_eq!(cli.log_file.as_deref(), Some("session.log"));
    }

    #[test]
    fn test_no_color_flag() {
        let cli = Cli::try_parse_from(["dnshistorian", "--no-color"]).unwrap();
        assert!(!cli.use_color());
    }
}
