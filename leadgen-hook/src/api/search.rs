//! Search submission endpoint
//!
//! Validates a people-search query and posts it to the configured Discord
//! webhook as an embed.

use axum::{extract::rejection::JsonRejection, extract::State, routing::post, Json, Router};
use leadgen_common::api::{MessageResponse, SEARCH_PATH};
use leadgen_common::discord::DiscordWebhook;
use leadgen_common::search::SearchQuery;
use leadgen_common::time;
use serde_json::Value;
use tracing::info;

use super::method_not_allowed;
use crate::{ApiError, ApiResult, AppState};

/// POST /api/search
///
/// **Errors:**
/// - 400: body is not JSON, or a field has the wrong type
/// - 500: Discord webhook URL missing, or Discord rejected the message
pub async fn submit_search(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Json(body) = payload.map_err(|rejection| ApiError::Rejected {
        status: rejection.status(),
        message: "Invalid search data".to_string(),
        detail: rejection.body_text(),
    })?;

    let query = SearchQuery::validate(&body).map_err(ApiError::Validation)?;

    let url = state
        .integrations
        .discord_webhook_url
        .as_deref()
        .ok_or_else(|| ApiError::Config("Discord webhook URL not configured".to_string()))?;

    let message = query.to_discord_message(time::now());
    DiscordWebhook::new(state.http.clone(), url)
        .send(&message)
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    info!(
        fields = message.embeds[0].fields.len(),
        "Search query sent to Discord"
    );

    Ok(Json(MessageResponse {
        success: true,
        message: "Search data sent successfully to Discord".to_string(),
    }))
}

/// Build search routes
pub fn search_routes() -> Router<AppState> {
    Router::new().route(SEARCH_PATH, post(submit_search).fallback(method_not_allowed))
}
