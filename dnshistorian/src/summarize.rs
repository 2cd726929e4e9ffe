//! Prompt construction and the generative language client.
//!
//! The record data placed in the prompt is the compact JSON serialization of
//! the whole record list cut to a fixed number of characters. The cut is not
//! aligned to record boundaries and may end mid-value.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{AiConfig, AppConfig};
use crate::history::HistoryRecord;

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Error, Debug)]
pub enum AiError {
    #[error("provider returned {code}: {message}")]
    Status { code: u16, message: String },

    #[error("request failed: {0}")]
    Network(#[source] reqwest::Error),

    #[error("unreadable response ({0})")]
    Decode(#[source] serde_json::Error),

    #[error("prompt was blocked ({0})")]
    Blocked(String),

    #[error("the model returned no text")]
    EmptyResponse,

    #[error("cannot build request URL '{0}'")]
    InvalidUrl(String),
}

/// Compact JSON of the full record list
pub fn serialize_records(records: &[HistoryRecord]) -> String {
    // Maps of JSON values always serialize
    serde_json::to_string(records).unwrap_or_default()
}

/// First `limit` characters of `text`, counted in Unicode scalar values.
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

pub fn build_prompt(domain: &str, truncated_records: &str) -> String {
    format!(
        "Analyze these historical DNS records for {} and summarize major hosting changes or potential security risks: {}",
        domain, truncated_records
    )
}

/// Full prompt for a domain and its records, with the record text cut at `limit`
pub fn prompt_for(domain: &str, records: &[HistoryRecord], limit: usize) -> String {
    let serialized = serialize_records(records);
    build_prompt(domain, truncate_chars(&serialized, limit))
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Send one single-turn prompt and return the model's text
    async fn generate(&self, prompt: &str) -> Result<String, AiError>;
}

/// Build the prompt for `records` and ask the model for a summary
pub async fn summarize<S>(
    summarizer: &S,
    domain: &str,
    records: &[HistoryRecord],
    limit: usize,
) -> Result<String, AiError>
where
    S: Summarizer + ?Sized,
{
    let prompt = prompt_for(domain, records, limit);
    debug!("Prompt for {} is {} characters", domain, prompt.chars().count());
    summarizer.generate(&prompt).await
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

impl GenerateResponse {
    fn into_text(self) -> Result<String, AiError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(AiError::Blocked(reason));
        }

        let candidate = self.candidates.into_iter().next().ok_or(AiError::EmptyResponse)?;
        let finish_reason = candidate.finish_reason;
        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            let blocked = matches!(
                finish_reason.as_deref(),
                Some("SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT")
            );
            return Err(match finish_reason {
                Some(reason) if blocked => AiError::Blocked(reason),
                _ => AiError::EmptyResponse,
            });
        }
        Ok(text)
    }
}

/// Client for the `generateContent` endpoint of the generative language API
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn from_config(config: &AppConfig, api_key: &str) -> Result<Self, AiError> {
        let client = config.http.build_client().map_err(AiError::Network)?;
        Ok(Self::with_client(client, &config.ai, api_key))
    }

    pub fn with_client(client: Client, config: &AiConfig, api_key: &str) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: api_key.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> Result<Url, AiError> {
        let raw = format!("{}/models/{}:generateContent", self.base_url, self.model);
        Url::parse(&raw).map_err(|_| AiError::InvalidUrl(raw))
    }
}

#[async_trait]
impl Summarizer for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, AiError> {
        let url = self.endpoint()?;
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        info!("Requesting summary from model {}", self.model);

        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(AiError::Network)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(AiError::Network)?;

        if status != StatusCode::OK {
            let message = serde_json::from_slice::<ErrorEnvelope>(&bytes)
                .map(|e| e.error.message)
                .ok()
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());
            info!("Model {} returned {}: {}", self.model, status, message);
            return Err(AiError::Status {
                code: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse = serde_json::from_slice(&bytes).map_err(AiError::Decode)?;
        parsed.into_text()
    }
}
