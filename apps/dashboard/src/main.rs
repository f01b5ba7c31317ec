//! # Dokan Dashboard Daemon
//!
//! Serves the dashboard API and keeps the shop snapshot fresh.
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. tracing (RUST_LOG, default dokan=info,tower_http=info)              │
//! │  2. DokanConfig::load (file → env → validate)                           │
//! │  3. AppState::from_config (store, clients, engine, agent spawned)       │
//! │  4. axum::serve until Ctrl+C / SIGTERM                                  │
//! │  5. agent shutdown, wait for its loop to exit                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use dokan_dashboard::{build_router, AppState};
use dokan_sync::DokanConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("dokan=info,tower_http=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!("Starting Dokan dashboard...");

    // Load configuration
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = DokanConfig::load(config_path).context("loading configuration")?;
    info!(
        bind = %config.server.bind_addr,
        helpers = %config.endpoints.base_url,
        interval_secs = config.sync.interval_secs,
        "Configuration loaded"
    );

    // Build services and start the agent
    let (state, agent_task) = AppState::from_config(&config).context("building services")?;
    let agent = state.agent.clone();

    let listener = TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.server.bind_addr))?;
    info!(addr = %config.server.bind_addr, "Dashboard API listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    agent.shutdown().await;
    if let Err(e) = agent_task.await {
        warn!(error = %e, "Sync agent task ended abnormally");
    }

    info!("Shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
