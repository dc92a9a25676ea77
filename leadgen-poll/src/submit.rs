//! Lead-search submission
//!
//! A search is announced on Discord, then delivered to the enrichment API
//! through an escalating list of routes. Each route is tried once with its
//! own timeout. When every route fails the payload is logged instead and the
//! submission still succeeds from the user's point of view.

use std::time::Duration;

use leadgen_common::api::{MCP_PROXY_PATH, PROXY_PATH};
use leadgen_common::discord::DiscordWebhook;
use leadgen_common::search::{self, ClayPayload, LeadSearch};
use leadgen_common::time;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::client::ClientError;

/// Which way a payload reaches the enrichment API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryRoute {
    /// Receiver's CORS-enabled proxy
    McpProxy,
    /// Receiver's plain proxy
    Proxy,
    /// Straight to the enrichment webhook
    Direct,
}

impl DeliveryRoute {
    pub fn label(self) -> &'static str {
        match self {
            DeliveryRoute::McpProxy => "MCP proxy",
            DeliveryRoute::Proxy => "proxy",
            DeliveryRoute::Direct => "direct webhook",
        }
    }
}

/// One planned delivery attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryAttempt {
    pub route: DeliveryRoute,
    pub url: String,
    pub timeout: Duration,
}

/// Where payloads can be sent; either side may be missing
#[derive(Debug, Clone, Default)]
pub struct DeliveryTargets {
    /// Receiver base URL (for the two proxy routes)
    pub server_url: Option<String>,
    /// Enrichment API webhook
    pub clay_webhook_url: Option<String>,
}

impl DeliveryTargets {
    /// Escalating attempt list: MCP proxy (5 s), proxy (10 s), direct (15 s)
    ///
    /// Routes whose target is not configured are left out.
    pub fn plan(&self) -> Vec<DeliveryAttempt> {
        let mut attempts = Vec::with_capacity(3);
        if let Some(server) = &self.server_url {
            let server = server.trim_end_matches('/');
            attempts.push(DeliveryAttempt {
                route: DeliveryRoute::McpProxy,
                url: format!("{}{}", server, MCP_PROXY_PATH),
                timeout: Duration::from_secs(5),
            });
            attempts.push(DeliveryAttempt {
                route: DeliveryRoute::Proxy,
                url: format!("{}{}", server, PROXY_PATH),
                timeout: Duration::from_secs(10),
            });
        }
        if let Some(clay) = &self.clay_webhook_url {
            attempts.push(DeliveryAttempt {
                route: DeliveryRoute::Direct,
                url: clay.clone(),
                timeout: Duration::from_secs(15),
            });
        }
        attempts
    }
}

/// A delivery the enrichment API accepted
#[derive(Debug, Clone)]
pub struct Delivered {
    pub route: DeliveryRoute,
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("No delivery target configured")]
    NoTargets,

    /// Every attempt failed; one reason per attempt, in order
    #[error("All delivery attempts failed: {}", .0.join("; "))]
    AllFailed(Vec<String>),
}

/// Result of a search submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    pub success: bool,
    pub message: String,
    pub clay_api_success: bool,
}

/// Submits lead searches
pub struct LeadSubmitter {
    http: Client,
    targets: DeliveryTargets,
    discord: Option<DiscordWebhook>,
}

impl LeadSubmitter {
    pub fn new(
        targets: DeliveryTargets,
        discord_webhook_url: Option<String>,
    ) -> Result<Self, ClientError> {
        // Timeouts are set per attempt
        let http = Client::builder()
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;
        let discord = discord_webhook_url.map(|url| DiscordWebhook::new(http.clone(), url));

        Ok(Self {
            http,
            targets,
            discord,
        })
    }

    /// Notify, deliver, fall back
    pub async fn submit_search(&self, search: &LeadSearch) -> SearchOutcome {
        let now = time::now();
        let payload = ClayPayload::from_search(search, now);

        self.notify_discord(&payload).await;

        let body = match serde_json::to_value(&payload) {
            Ok(body) => body,
            Err(e) => {
                warn!("Could not encode search payload: {}", e);
                Value::Null
            }
        };

        match self.deliver(&body).await {
            Ok(delivered) => SearchOutcome {
                success: true,
                message: format!(
                    "Your search query has been sent to Clay API via {}.",
                    delivered.route.label()
                ),
                clay_api_success: true,
            },
            Err(e) => {
                warn!("Clay API delivery failed, falling back to simulation: {}", e);
                simulate_delivery(&body);
                SearchOutcome {
                    success: true,
                    message: "Your search query has been processed, but we couldn't send it to \
                              Clay API. Please use the CURL command."
                        .to_string(),
                    clay_api_success: false,
                }
            }
        }
    }

    /// Send the fixed test payload through the delivery chain, no fallback
    pub async fn test_clay(&self) -> Result<Delivered, DeliveryError> {
        self.deliver(&search::test_payload(time::now())).await
    }

    /// Try each planned route once, stopping at the first 2xx
    pub async fn deliver(&self, body: &Value) -> Result<Delivered, DeliveryError> {
        let attempts = self.targets.plan();
        if attempts.is_empty() {
            return Err(DeliveryError::NoTargets);
        }

        let mut failures = Vec::with_capacity(attempts.len());
        for attempt in attempts {
            info!(route = attempt.route.label(), "Sending data to Clay API");
            match self.attempt(&attempt, body).await {
                Ok(delivered) => {
                    info!(
                        route = attempt.route.label(),
                        status = delivered.status,
                        "Clay API accepted the payload"
                    );
                    return Ok(delivered);
                }
                Err(reason) => {
                    warn!(route = attempt.route.label(), "Delivery attempt failed: {}", reason);
                    failures.push(format!("{}: {}", attempt.route.label(), reason));
                }
            }
        }

        Err(DeliveryError::AllFailed(failures))
    }

    async fn attempt(&self, attempt: &DeliveryAttempt, body: &Value) -> Result<Delivered, String> {
        let response = self
            .http
            .post(&attempt.url)
            .json(body)
            .timeout(attempt.timeout)
            .send()
            .await
            .map_err(|e| ClientError::from(e).to_string())?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(format!("{} - {}", status.as_u16(), text));
        }

        Ok(Delivered {
            route: attempt.route,
            status: status.as_u16(),
            body: text,
        })
    }

    async fn notify_discord(&self, payload: &ClayPayload) {
        let Some(discord) = &self.discord else {
            info!("Discord webhook not configured, skipping notification");
            return;
        };
        if let Err(e) = discord
            .send(&payload.to_discord_message(time::now()))
            .await
        {
            warn!("Error sending to Discord webhook: {}", e);
        }
    }
}

/// Secondary delivery channel: record what would have been sent
fn simulate_delivery(body: &Value) {
    info!(payload = %body, "Simulating Clay API webhook call (not actually sending)");
}

/// Equivalent `curl` invocation for a payload
pub fn curl_command(payload: &Value, url: &str) -> String {
    let json = serde_json::to_string_pretty(payload).unwrap_or_else(|_| "{}".to_string());
    format!(
        "curl -X POST \"{}\" \\\n  -H \"Content-Type: application/json\" \\\n  -d '{}'",
        url,
        json.replace('\'', r"'\''")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plan_with_everything_configured() {
        let targets = DeliveryTargets {
            server_url: Some("http://localhost:5780/".to_string()),
            clay_webhook_url: Some("https://clay.example.test/hook".to_string()),
        };
        let plan = targets.plan();

        assert_eq!(plan.len(), 3);
        assert_eq!(plan[0].route, DeliveryRoute::McpProxy);
        assert_eq!(plan[0].url, "http://localhost:5780/api/mcp-clay-proxy");
        assert_eq!(plan[0].timeout, Duration::from_secs(5));
        assert_eq!(plan[1].url, "http://localhost:5780/api/clay-proxy");
        assert_eq!(plan[1].timeout, Duration::from_secs(10));
        assert_eq!(plan[2].route, DeliveryRoute::Direct);
        assert_eq!(plan[2].timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_plan_skips_unconfigured_routes() {
        let targets = DeliveryTargets {
            server_url: None,
            clay_webhook_url: Some("https://clay.example.test/hook".to_string()),
        };
        let plan = targets.plan();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].route, DeliveryRoute::Direct);

        assert!(DeliveryTargets::default().plan().is_empty());
    }

    #[test]
    fn test_curl_command() {
        let cmd = curl_command(&json!({"industry": "Retail"}), "https://clay.example.test/hook");
        assert_eq!(
            cmd,
            "curl -X POST \"https://clay.example.test/hook\" \\\n  -H \"Content-Type: application/json\" \\\n  -d '{\n  \"industry\": \"Retail\"\n}'"
        );
    }

    #[test]
    fn test_curl_command_escapes_single_quotes() {
        let cmd = curl_command(&json!({"city": "L'Aquila"}), "https://x.test");
        assert!(cmd.contains(r"L'\''Aquila"));
    }
}
