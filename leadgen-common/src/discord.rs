//! Discord webhook delivery
//!
//! Posts a [`DiscordMessage`] to a webhook URL. Used by the receiver's search
//! route and by the poll client's lead-search logging.

use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use crate::search::DiscordMessage;

/// Discord delivery errors
#[derive(Debug, Error)]
pub enum DiscordError {
    #[error("Discord webhook request failed: {0}")]
    Network(String),

    #[error("Discord webhook error: {status} - {body}")]
    Rejected { status: u16, body: String },
}

/// A configured Discord webhook
#[derive(Debug, Clone)]
pub struct DiscordWebhook {
    http: Client,
    url: String,
}

impl DiscordWebhook {
    pub fn new(http: Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    /// Deliver one message; any non-2xx answer is an error
    pub async fn send(&self, message: &DiscordMessage) -> Result<(), DiscordError> {
        debug!(fields = message.embeds.iter().map(|e| e.fields.len()).sum::<usize>(), "Posting to Discord webhook");

        let response = self
            .http
            .post(&self.url)
            .json(message)
            .send()
            .await
            .map_err(|e| DiscordError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DiscordError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
