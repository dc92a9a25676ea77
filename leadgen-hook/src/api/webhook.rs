//! Webhook receiver endpoint
//!
//! `GET` lists accumulated entries, `POST` tags and appends a callback
//! payload (object or array), `DELETE` clears everything. Any other method
//! gets 405.

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use leadgen_common::api::{IngestResponse, ListResponse, MessageResponse, WEBHOOK_PATH};
use leadgen_common::tag_payload;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use super::method_not_allowed;
use crate::{ApiError, ApiResult, AppState};

/// How a POST combines with what is already stored
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestMode {
    /// Add after existing entries
    #[default]
    Append,
    /// Drop existing entries first
    Replace,
}

/// Query parameters for POST
#[derive(Debug, Default, Deserialize)]
pub struct IngestParams {
    #[serde(default)]
    pub mode: IngestMode,
}

/// GET /api/clay-webhook
///
/// Always 200; an empty store gives an empty list and `lastUpdated: null`.
pub async fn list_results(State(state): State<AppState>) -> ApiResult<Json<ListResponse>> {
    let snapshot = state
        .store
        .list()
        .await
        .map_err(ApiError::store("Error retrieving webhook data"))?;

    Ok(Json(ListResponse {
        success: true,
        results: snapshot.entries.into_iter().map(|e| e.into_record()).collect(),
        last_updated: snapshot.last_updated,
    }))
}

/// POST /api/clay-webhook
///
/// Accepts any JSON value. Bodies that are not JSON are rejected here, at
/// the transport boundary, with the extractor's status.
pub async fn ingest_results(
    State(state): State<AppState>,
    params: Result<Query<IngestParams>, QueryRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<IngestResponse>> {
    let Query(params) = params.map_err(|rejection| ApiError::Rejected {
        status: rejection.status(),
        message: "Invalid query parameters".to_string(),
        detail: rejection.body_text(),
    })?;

    let Json(payload) = payload.map_err(|rejection| ApiError::Rejected {
        status: rejection.status(),
        message: "Invalid JSON payload".to_string(),
        detail: rejection.body_text(),
    })?;

    debug!(payload = %payload, "Received webhook payload");

    let entries = tag_payload(payload);
    let received = entries.len();

    let (total_entries, message) = match params.mode {
        IngestMode::Append => (
            state
                .store
                .append(entries)
                .await
                .map_err(ApiError::store("Error processing webhook data"))?,
            "Data received successfully",
        ),
        IngestMode::Replace => (
            state
                .store
                .replace_all(entries)
                .await
                .map_err(ApiError::store("Error processing webhook data"))?,
            "Data replaced successfully",
        ),
    };

    info!(
        received,
        total_entries,
        mode = ?params.mode,
        "Webhook entries stored"
    );

    Ok(Json(IngestResponse {
        success: true,
        message: message.to_string(),
        total_entries,
    }))
}

/// DELETE /api/clay-webhook
///
/// Idempotent: clearing an empty store succeeds the same way.
pub async fn clear_results(State(state): State<AppState>) -> ApiResult<Json<MessageResponse>> {
    state
        .store
        .clear()
        .await
        .map_err(ApiError::store("Error clearing webhook data"))?;

    info!("Webhook entries cleared");

    Ok(Json(MessageResponse {
        success: true,
        message: "All results cleared".to_string(),
    }))
}

/// Build webhook receiver routes
pub fn webhook_routes() -> Router<AppState> {
    Router::new().route(
        WEBHOOK_PATH,
        get(list_results)
            .head(method_not_allowed)
            .post(ingest_results)
            .delete(clear_results)
            .fallback(method_not_allowed),
    )
}
