//! leadgen-hook - Webhook receiver and enrichment proxy
//!
//! Accumulates asynchronous enrichment callbacks for the polling client,
//! forwards lead searches to the enrichment API, and relays people-search
//! queries to Discord.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use leadgen_common::config::{self, Integrations, TomlConfig, DEFAULT_PORT};
use leadgen_hook::store::{MemoryStore, ResultStore, SqliteStore};
use leadgen_hook::{build_router, AppState};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Where accumulated entries live
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StoreKind {
    /// Process memory; lost on restart
    Memory,
    /// SQLite file; survives restarts
    Sqlite,
}

/// Command-line arguments for leadgen-hook
#[derive(Parser, Debug)]
#[command(name = "leadgen-hook")]
#[command(about = "Webhook receiver and enrichment proxy for lead searches")]
#[command(version)]
struct Args {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1", env = "LEADGEN_HOOK_HOST")]
    host: String,

    /// Port to listen on (falls back to the config file, then 5780)
    #[arg(short, long, env = "LEADGEN_HOOK_PORT")]
    port: Option<u16>,

    /// Result store backend
    #[arg(long, value_enum, default_value = "memory", env = "LEADGEN_STORE")]
    store: StoreKind,

    /// SQLite file used with `--store sqlite`
    #[arg(long, env = "LEADGEN_DATABASE")]
    database: Option<PathBuf>,

    /// TOML config file (default: ~/.config/leadgen/config.toml)
    #[arg(short, long, env = "LEADGEN_CONFIG")]
    config: Option<PathBuf>,

    /// Discord webhook for search notifications
    #[arg(long, env = "DISCORD_WEBHOOK_URL", hide_env_values = true)]
    discord_webhook_url: Option<String>,

    /// Enrichment API webhook the proxies forward to
    #[arg(long, env = "CLAY_WEBHOOK_URL", hide_env_values = true)]
    clay_webhook_url: Option<String>,

    /// Origin header sent with MCP proxy requests
    #[arg(long, env = "LEADGEN_PUBLIC_ORIGIN")]
    public_origin: Option<String>,

    #[arg(long, env = "SUPABASE_URL", hide_env_values = true)]
    supabase_url: Option<String>,

    #[arg(long, env = "SUPABASE_KEY", hide_env_values = true)]
    supabase_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "leadgen_hook=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Build identification first, before any config or database work
    info!(
        "Starting leadgen-hook v{} [{}] ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let toml = TomlConfig::load_or_default(args.config.as_deref());

    let integrations = Integrations::resolve(
        Integrations {
            discord_webhook_url: args.discord_webhook_url,
            clay_webhook_url: args.clay_webhook_url,
            public_origin: args.public_origin,
            supabase_url: args.supabase_url,
            supabase_key: args.supabase_key,
        },
        &toml,
    );
    integrations.log_summary();

    let store: Arc<dyn ResultStore> = match args.store {
        StoreKind::Memory => Arc::new(MemoryStore::new()),
        StoreKind::Sqlite => {
            let path = args
                .database
                .or_else(|| toml.database_path.clone())
                .unwrap_or_else(config::default_database_path);
            info!("Database path: {}", path.display());
            Arc::new(
                SqliteStore::open(&path)
                    .await
                    .with_context(|| format!("Failed to open {}", path.display()))?,
            )
        }
    };
    info!("Result store: {}", store.backend());

    let port = args.port.or(toml.port).unwrap_or(DEFAULT_PORT);
    let addr: SocketAddr = format!("{}:{}", args.host, port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", args.host, port))?;

    let app = build_router(AppState::new(store, integrations));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("leadgen-hook listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
