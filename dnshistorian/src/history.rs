//! DNS "A" record history lookups against the history provider.

use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue, ACCEPT};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{AppConfig, HistoryConfig};

/// One historical snapshot. Fields are passed through untouched.
pub type HistoryRecord = Map<String, Value>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryResponse {
    pub records: Vec<HistoryRecord>,
}

#[derive(Deserialize)]
struct RawHistoryResponse {
    // Missing or null both mean "no records"
    #[serde(default)]
    records: Option<Vec<HistoryRecord>>,
}

impl From<RawHistoryResponse> for HistoryResponse {
    fn from(raw: RawHistoryResponse) -> Self {
        Self {
            records: raw.records.unwrap_or_default(),
        }
    }
}

/// Every variant renders as the tail of "Error fetching data: ..."
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("{}", .0.as_u16())]
    Status(StatusCode),

    #[error("{0}")]
    Network(#[source] reqwest::Error),

    #[error("invalid response body ({0})")]
    Decode(#[source] serde_json::Error),

    #[error("cannot build request URL from '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid API key header: {0}")]
    InvalidHeader(String),
}

impl HistoryError {
    /// HTTP status returned by the provider, if it answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            HistoryError::Status(code) => Some(code.as_u16()),
            _ => None,
        }
    }
}

#[async_trait]
pub trait HistorySource: Send + Sync {
    async fn fetch_history(&self, domain: &str, api_key: &str) -> Result<HistoryResponse, HistoryError>;
}

/// HTTP client for the provider's A record history endpoint
pub struct HistoryClient {
    client: Client,
    base_url: String,
    api_key_header: HeaderName,
    send_accept_header: bool,
}

impl HistoryClient {
    pub fn from_config(config: &AppConfig) -> Result<Self, HistoryError> {
        let client = config.http.build_client().map_err(HistoryError::Network)?;
        Self::with_client(client, &config.history)
    }

    pub fn with_client(client: Client, config: &HistoryConfig) -> Result<Self, HistoryError> {
        let api_key_header = HeaderName::from_bytes(config.api_key_header.as_bytes())
            .map_err(|_| HistoryError::InvalidHeader(config.api_key_header.clone()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key_header,
            send_accept_header: config.send_accept_header,
        })
    }

    /// The domain is interpolated verbatim, without normalization.
    pub fn history_url(&self, domain: &str) -> Result<Url, HistoryError> {
        let raw = format!("{}/history/{}/dns/a", self.base_url, domain);
        Url::parse(&raw).map_err(|e| HistoryError::InvalidUrl {
            url: raw,
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl HistorySource for HistoryClient {
    async fn fetch_history(&self, domain: &str, api_key: &str) -> Result<HistoryResponse, HistoryError> {
        let url = self.history_url(domain)?;
        let key = HeaderValue::from_str(api_key)
            .map_err(|_| HistoryError::InvalidHeader(self.api_key_header.to_string()))?;

        debug!("Fetching A record history: {}", url);

        let mut request = self.client.get(url).header(self.api_key_header.clone(), key);
        if self.send_accept_header {
            request = request.header(ACCEPT, "application/json");
        }

        let response = request.send().await.map_err(|e| {
            debug!("History request for {} failed: {}", domain, e);
            HistoryError::Network(e)
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            info!("History provider returned {} for {}", status, domain);
            return Err(HistoryError::Status(status));
        }

        let body = response.bytes().await.map_err(HistoryError::Network)?;
        let raw: RawHistoryResponse = serde_json::from_slice(&body).map_err(HistoryError::Decode)?;
        let parsed = HistoryResponse::from(raw);

        info!("History provider returned {} records for {}", parsed.records.len(), domain);
        Ok(parsed)
    }
}
