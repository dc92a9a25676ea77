//! Webhook receiver request/response bodies
//!
//! Field names are camelCase on the wire (`totalEntries`, `lastUpdated`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entry::Record;
use crate::time;

/// GET /api/clay-webhook
///
/// Results are in store (insertion) order; sorting is up to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub success: bool,
    pub results: Vec<Record>,
    #[serde(with = "time::serde_iso_opt", default)]
    pub last_updated: Option<DateTime<Utc>>,
}

/// POST /api/clay-webhook and GET /api/simulate-callback
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestResponse {
    pub success: bool,
    pub message: String,
    pub total_entries: usize,
}

/// Plain success body: DELETE /api/clay-webhook, POST /api/search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// Failure envelope used by every receiver route
///
/// `error` carries the underlying cause; `errors` carries field-level
/// validation problems. Both are omitted when empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Value>,
}

impl FailureResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            error: None,
            errors: None,
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn with_errors(mut self, errors: Value) -> Self {
        self.errors = Some(errors);
        self
    }
}

/// GET /api/get-results
///
/// `data` is `null` (with `success: false`) while nothing has arrived yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyResultsResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: Option<Vec<Record>>,
}
