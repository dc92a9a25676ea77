//! API types shared by the webhook receiver and its clients

pub mod types;

pub use types::{
    FailureResponse, IngestResponse, LegacyResultsResponse, ListResponse, MessageResponse,
};

/// Path of the webhook receiver endpoint
pub const WEBHOOK_PATH: &str = "/api/clay-webhook";

/// Path of the CORS-enabled enrichment proxy
pub const MCP_PROXY_PATH: &str = "/api/mcp-clay-proxy";

/// Path of the plain enrichment proxy
pub const PROXY_PATH: &str = "/api/clay-proxy";

/// Path of the search submission route
pub const SEARCH_PATH: &str = "/api/search";

/// Path of the simulated callback route
pub const SIMULATE_PATH: &str = "/api/simulate-callback";

/// Path of the legacy results view
pub const LEGACY_RESULTS_PATH: &str = "/api/get-results";

/// Path of the client configuration route
pub const CONFIG_PATH: &str = "/api/config";
