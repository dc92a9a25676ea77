//! Enrichment API proxies
//!
//! Both routes forward the request body verbatim to the configured Clay
//! webhook and relay the upstream status code and raw text body. The MCP
//! variant also sends an `Origin` header and adds CORS headers to its POST
//! response. Any other method, OPTIONS included, gets a 405.
//!
//! No timeout is applied to the upstream call.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use leadgen_common::api::{MCP_PROXY_PATH, PROXY_PATH};
use serde_json::json;
use tracing::{error, info};

use crate::AppState;

/// Proxy errors, rendered as `{ error, message }`
#[derive(Debug)]
pub enum ProxyError {
    MethodNotAllowed,
    NotConfigured,
    Network(String),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ProxyError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                json!({ "error": "Method not allowed" }),
            ),
            ProxyError::NotConfigured => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": "Clay webhook URL not configured",
                    "message": "Set CLAY_WEBHOOK_URL or clay_webhook_url in the config file",
                }),
            ),
            ProxyError::Network(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": "Failed to proxy request to Clay API",
                    "message": message,
                }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Send `body` upstream and return (status, text)
async fn forward(
    state: &AppState,
    body: Bytes,
    origin: Option<&str>,
) -> Result<(StatusCode, String), ProxyError> {
    let url = state
        .integrations
        .clay_webhook_url
        .as_deref()
        .ok_or(ProxyError::NotConfigured)?;

    let mut request = state
        .http
        .post(url)
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body(body.to_vec());
    if let Some(origin) = origin {
        request = request.header(reqwest::header::ORIGIN, origin);
    }

    let response = request.send().await.map_err(|e| {
        error!("Error proxying to Clay API: {}", e);
        ProxyError::Network(e.to_string())
    })?;

    // reqwest and axum use different `http` crate versions
    let status =
        StatusCode::from_u16(response.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let text = response
        .text()
        .await
        .map_err(|e| ProxyError::Network(e.to_string()))?;

    info!(status = %status, bytes = text.len(), "Clay API responded");
    Ok((status, text))
}

fn with_cors(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}

/// POST /api/mcp-clay-proxy
pub async fn mcp_proxy(State(state): State<AppState>, body: Bytes) -> Response {
    let origin = state.integrations.public_origin.clone();
    let response = match forward(&state, body, origin.as_deref()).await {
        Ok(relayed) => relayed.into_response(),
        Err(e) => e.into_response(),
    };
    with_cors(response)
}

/// POST /api/clay-proxy
pub async fn plain_proxy(State(state): State<AppState>, body: Bytes) -> Response {
    match forward(&state, body, None).await {
        Ok(relayed) => relayed.into_response(),
        Err(e) => e.into_response(),
    }
}

async fn proxy_method_not_allowed() -> ProxyError {
    ProxyError::MethodNotAllowed
}

/// Build proxy routes
pub fn proxy_routes() -> Router<AppState> {
    Router::new()
        .route(
            MCP_PROXY_PATH,
            post(mcp_proxy).fallback(proxy_method_not_allowed),
        )
        .route(
            PROXY_PATH,
            post(plain_proxy).fallback(proxy_method_not_allowed),
        )
}
