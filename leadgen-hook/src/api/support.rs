//! Supporting routes around the webhook receiver
//!
//! - `GET /api/simulate-callback`: push a sample callback record, for trying
//!   the polling client without a real enrichment partner
//! - `GET /api/get-results`: older read view of the same store
//! - `GET /api/config`: Supabase settings the browser client needs

use axum::{extract::State, Json, Router};
use leadgen_common::api::{
    IngestResponse, LegacyResultsResponse, CONFIG_PATH, LEGACY_RESULTS_PATH, SIMULATE_PATH,
};
use leadgen_common::{samples, tag_payload, time};
use serde::Serialize;
use tracing::info;

use super::get_only;
use crate::{ApiError, ApiResult, AppState};

/// GET /api/simulate-callback
pub async fn simulate_callback(State(state): State<AppState>) -> ApiResult<Json<IngestResponse>> {
    let entries = tag_payload(samples::simulated_callback(time::now()));

    let total_entries = state
        .store
        .append(entries)
        .await
        .map_err(ApiError::store("Error simulating webhook data"))?;

    info!(total_entries, "Simulated callback stored");

    Ok(Json(IngestResponse {
        success: true,
        message: "Test data added successfully".to_string(),
        total_entries,
    }))
}

/// GET /api/get-results
///
/// `success: false` with `data: null` until the first entry arrives.
pub async fn legacy_results(
    State(state): State<AppState>,
) -> ApiResult<Json<LegacyResultsResponse>> {
    let snapshot = state
        .store
        .list()
        .await
        .map_err(ApiError::store("Error retrieving processed data"))?;

    if snapshot.entries.is_empty() {
        return Ok(Json(LegacyResultsResponse {
            success: false,
            message: Some("No data available yet".to_string()),
            data: None,
        }));
    }

    Ok(Json(LegacyResultsResponse {
        success: true,
        message: None,
        data: Some(snapshot.entries.into_iter().map(|e| e.into_record()).collect()),
    }))
}

#[derive(Debug, Serialize)]
pub struct SupabaseSettings {
    pub url: String,
    pub key: String,
}

#[derive(Debug, Serialize)]
pub struct ClientConfigResponse {
    pub supabase: SupabaseSettings,
}

/// GET /api/config
///
/// Unset values are empty strings, never errors.
pub async fn client_config(State(state): State<AppState>) -> Json<ClientConfigResponse> {
    Json(ClientConfigResponse {
        supabase: SupabaseSettings {
            url: state.integrations.supabase_url.clone().unwrap_or_default(),
            key: state.integrations.supabase_key.clone().unwrap_or_default(),
        },
    })
}

/// Build supporting routes
pub fn support_routes() -> Router<AppState> {
    Router::new()
        .route(SIMULATE_PATH, get_only(simulate_callback))
        .route(LEGACY_RESULTS_PATH, get_only(legacy_results))
        .route(CONFIG_PATH, get_only(client_config))
}
