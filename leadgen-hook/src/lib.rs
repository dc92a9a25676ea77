//! leadgen-hook library - webhook receiver and enrichment proxy
//!
//! Exposes the router and application state for the binary and for
//! integration tests.

use axum::Router;
use chrono::{DateTime, Utc};
use leadgen_common::config::Integrations;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod store;

pub use crate::error::{ApiError, ApiResult};
use crate::store::ResultStore;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Accumulated webhook entries
    pub store: Arc<dyn ResultStore>,
    /// Discord, Clay and Supabase settings
    pub integrations: Arc<Integrations>,
    /// Outbound HTTP client (no timeout: upstream calls are not cut short)
    pub http: reqwest::Client,
    /// Service startup timestamp for uptime reporting
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(store: Arc<dyn ResultStore>, integrations: Integrations) -> Self {
        Self {
            store,
            integrations: Arc::new(integrations),
            http: reqwest::Client::new(),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::webhook_routes())
        .merge(api::proxy_routes())
        .merge(api::search_routes())
        .merge(api::support_routes())
        .merge(api::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
