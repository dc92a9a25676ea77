//! HTTP API handlers for leadgen-hook

pub mod health;
pub mod proxy;
pub mod search;
pub mod support;
pub mod webhook;

pub use health::health_routes;
pub use proxy::proxy_routes;
pub use search::search_routes;
pub use support::support_routes;
pub use webhook::webhook_routes;

use axum::handler::Handler;
use axum::routing::{get, MethodRouter};

use crate::{ApiError, AppState};

/// Fallback for known paths hit with an unsupported method
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// GET route that answers HEAD and every other method with 405
pub fn get_only<H, T>(handler: H) -> MethodRouter<AppState>
where
    H: Handler<T, AppState>,
    T: 'static,
{
    get(handler)
        .head(method_not_allowed)
        .fallback(method_not_allowed)
}
