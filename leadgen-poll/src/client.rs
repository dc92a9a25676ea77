//! HTTP client for the webhook receiver
//!
//! Every request carries a bounded timeout so a stalled server can never
//! hang the poll loop.

use std::time::Duration;

use leadgen_common::api::{
    IngestResponse, ListResponse, MessageResponse, SIMULATE_PATH, WEBHOOK_PATH,
};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Receiver address used when nothing else is configured
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5780";

/// Per-request timeout for receiver calls
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server responded with {0}: {1}")]
    Status(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    /// Server answered 2xx but with `success: false`
    #[error("{0}")]
    Rejected(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Timeout
        } else {
            ClientError::Network(e.to_string())
        }
    }
}

/// Webhook receiver client
#[derive(Debug, Clone)]
pub struct WebhookClient {
    http: Client,
    base_url: String,
}

impl WebhookClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        Url::parse(trimmed)
            .map_err(|e| ClientError::Config(format!("Invalid server URL {:?}: {}", base_url, e)))?;

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        Ok(Self {
            http,
            base_url: trimmed.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL of a receiver route
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET /api/clay-webhook
    pub async fn list(&self) -> Result<ListResponse, ClientError> {
        debug!(url = %self.url(WEBHOOK_PATH), "Fetching results");
        let response = self.http.get(self.url(WEBHOOK_PATH)).send().await?;
        read_body(response).await
    }

    /// POST /api/clay-webhook with an object or array payload
    pub async fn ingest(&self, payload: &Value) -> Result<IngestResponse, ClientError> {
        let response = self
            .http
            .post(self.url(WEBHOOK_PATH))
            .json(payload)
            .send()
            .await?;
        read_body(response).await
    }

    /// DELETE /api/clay-webhook
    pub async fn clear(&self) -> Result<MessageResponse, ClientError> {
        let response = self.http.delete(self.url(WEBHOOK_PATH)).send().await?;
        read_body(response).await
    }

    /// GET /api/simulate-callback
    pub async fn simulate(&self) -> Result<IngestResponse, ClientError> {
        let response = self.http.get(self.url(SIMULATE_PATH)).send().await?;
        read_body(response).await
    }
}

/// Check status, then `success`, then decode the typed body
async fn read_body<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(ClientError::Status(status.as_u16(), text));
    }

    let body: Value = response
        .json()
        .await
        .map_err(|e| ClientError::Parse(e.to_string()))?;

    if body.get("success").and_then(Value::as_bool) == Some(false) {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Request was not successful")
            .to_string();
        return Err(ClientError::Rejected(message));
    }

    serde_json::from_value(body).map_err(|e| ClientError::Parse(e.to_string()))
}
