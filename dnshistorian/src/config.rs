//! Configuration management for dnshistorian
//!
//! Configuration is loaded from `./config/dnshistorian.toml` unless another
//! path is given on the command line. The embedded template below is the only
//! place defaults live; `--init` writes it to disk.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::fs;
use std::io::{self, IsTerminal, Write};
use std::time::Duration;
use thiserror::Error;

/// Configuration file path relative to working directory
pub const CONFIG_PATH: &str = "./config/dnshistorian.toml";

/// Default configuration file content
pub const DEFAULT_CONFIG: &str = include_str!("../config/dnshistorian.toml");

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found at {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] io::Error),

    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid URL in '{field}': {url} (expected http:// or https://)")]
    InvalidUrl { field: String, url: String },

    #[error("Configuration field '{field}' cannot be empty")]
    EmptyRequired { field: String },
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub history: HistoryConfig,
    pub ai: AiConfig,
    #[serde(default)]
    pub secrets: SecretsConfig,
}

/// HTTP client configuration shared by both outbound clients
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub user_agent: String,
    /// Unset means the client default (no explicit timeout)
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl HttpConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Build the HTTP client used for both providers
    pub fn build_client(&self) -> reqwest::Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder().user_agent(&self.user_agent);
        if let Some(timeout) = self.request_timeout() {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }
}

/// DNS history provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    pub base_url: String,
    /// Header carrying the API key. Providers disagree on casing.
    pub api_key_header: String,
    /// Adds `accept: application/json` to the request
    #[serde(default = "default_send_accept_header")]
    pub send_accept_header: bool,
}

fn default_send_accept_header() -> bool {
    true
}

/// Generative language service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    pub base_url: String,
    pub model: String,
    #[serde(default = "default_prompt_char_limit")]
    pub prompt_char_limit: usize,
}

fn default_prompt_char_limit() -> usize {
    2000
}

/// Where the two API keys come from
#[derive(Debug, Clone, Deserialize)]
pub struct SecretsConfig {
    #[serde(default = "default_ai_api_key_name")]
    pub ai_api_key_name: String,
    #[serde(default = "default_history_api_key_name")]
    pub history_api_key_name: String,
    /// Optional `NAME = "value"` file consulted when an environment variable is unset
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_ai_api_key_name() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_history_api_key_name() -> String {
    "SECURITYTRAILS_API_KEY".to_string()
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            ai_api_key_name: default_ai_api_key_name(),
            history_api_key_name: default_history_api_key_name(),
            file: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty("http.user_agent", &self.http.user_agent)?;
        if self.http.request_timeout_secs == Some(0) {
            return Err(ConfigError::EmptyRequired {
                field: "http.request_timeout_secs".to_string(),
            });
        }

        require_http_url("history.base_url", &self.history.base_url)?;
        require_non_empty("history.api_key_header", &self.history.api_key_header)?;

        require_http_url("ai.base_url", &self.ai.base_url)?;
        require_non_empty("ai.model", &self.ai.model)?;
        if self.ai.prompt_char_limit == 0 {
            return Err(ConfigError::EmptyRequired {
                field: "ai.prompt_char_limit".to_string(),
            });
        }

        require_non_empty("secrets.ai_api_key_name", &self.secrets.ai_api_key_name)?;
        require_non_empty("secrets.history_api_key_name", &self.secrets.history_api_key_name)?;

        Ok(())
    }

    /// Create default configuration file at the given location
    pub fn create_default_config(path: &Path) -> Result<PathBuf, ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = fs::File::create(path)?;
        file.write_all(DEFAULT_CONFIG.as_bytes())?;

        Ok(path.to_path_buf())
    }

    /// Check if stdin is a TTY (interactive terminal)
    pub fn is_interactive() -> bool {
        io::stdin().is_terminal()
    }

    /// Offer to write the default template at `path`; declined or non-interactive gives `None`
    pub fn prompt_create_config(path: &Path) -> Result<Option<PathBuf>, ConfigError> {
        if !Self::is_interactive() {
            return Ok(None);
        }

        print!("No configuration at {}. Write the default template there? [Y/n] ", path.display());
        io::stdout().flush()?;

        let mut answer = String::new();
        io::stdin().read_line(&mut answer)?;

        if accepts_default(&answer) {
            Self::create_default_config(path).map(Some)
        } else {
            Ok(None)
        }
    }
}

/// Empty answer means yes
fn accepts_default(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "" | "y" | "yes")
}

fn require_non_empty(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::EmptyRequired {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn require_http_url(field: &str, url: &str) -> Result<(), ConfigError> {
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        return Err(ConfigError::InvalidUrl {
            field: field.to_string(),
            url: url.to_string(),
        });
    }
    Ok(())
}
