//! API key resolution.
//!
//! Both keys are required. Each is looked up in the environment first and
//! then in the optional secrets file, a flat TOML table of `NAME = "value"`.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::config::SecretsConfig;

#[derive(Error, Debug)]
pub enum SecretsError {
    #[error("Missing required API key(s): {}. Set them in the environment or in the secrets file.", .names.join(", "))]
    Missing { names: Vec<String> },

    #[error("Failed to read secrets file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse secrets file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// The two credentials, immutable for the life of the process.
#[derive(Clone)]
pub struct Secrets {
    ai_api_key: String,
    history_api_key: String,
}

impl Secrets {
    pub fn new(ai_api_key: impl Into<String>, history_api_key: impl Into<String>) -> Self {
        Self {
            ai_api_key: ai_api_key.into(),
            history_api_key: history_api_key.into(),
        }
    }

    /// Resolve both keys from the process environment and the configured file
    pub fn load(config: &SecretsConfig) -> Result<Self, SecretsError> {
        Self::resolve(config, |name| std::env::var(name).ok())
    }

    /// Resolve both keys with a custom environment lookup
    pub fn resolve<F>(config: &SecretsConfig, env: F) -> Result<Self, SecretsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file_values = match config.file.as_deref() {
            Some(path) => read_secrets_file(path)?,
            None => HashMap::new(),
        };

        let lookup = |name: &str| -> Option<String> {
            env(name)
                .filter(|v| !v.is_empty())
                .or_else(|| file_values.get(name).cloned().filter(|v| !v.is_empty()))
        };

        let ai = lookup(&config.ai_api_key_name);
        let history = lookup(&config.history_api_key_name);

        match (ai, history) {
            (Some(ai_api_key), Some(history_api_key)) => Ok(Self {
                ai_api_key,
                history_api_key,
            }),
            (ai, history) => {
                let mut names = Vec::new();
                if ai.is_none() {
                    names.push(config.ai_api_key_name.clone());
                }
                if history.is_none() {
                    names.push(config.history_api_key_name.clone());
                }
                Err(SecretsError::Missing { names })
            }
        }
    }

    pub fn ai_api_key(&self) -> &str {
        &self.ai_api_key
    }

    pub fn history_api_key(&self) -> &str {
        &self.history_api_key
    }
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("ai_api_key", &"<redacted>")
            .field("history_api_key", &"<redacted>")
            .finish()
    }
}

/// A missing file is not an error; the environment may hold both keys.
fn read_secrets_file(path: &Path) -> Result<HashMap<String, String>, SecretsError> {
    if !path.exists() {
        debug!("Secrets file {} not present", path.display());
        return Ok(HashMap::new());
    }

    let content = fs::read_to_string(path).map_err(|source| SecretsError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let table: toml::Table = toml::from_str(&content).map_err(|source| SecretsError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    // Non-string values are ignored
    Ok(table
        .into_iter()
        .filter_map(|(k, v)| match v {
            toml::Value::String(s) => Some((k, s)),
            _ => None,
        })
        .collect())
}
