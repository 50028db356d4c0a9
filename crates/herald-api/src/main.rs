//! Herald REST API entry point.
//!
//! Binary name: `herald`
//!
//! Loads configuration, wires the concrete collaborators into the
//! dispatcher, and serves the turn endpoint until interrupted. On shutdown
//! the processor queues are closed and drained so accepted jobs finish.

mod http;
mod state;

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config_path = std::env::var("HERALD_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("herald.toml"));
    let config = herald_infra::config::load_config(&config_path).await;
    let bind_addr = config.server.bind_addr.clone();

    let state = AppState::init(config)?;
    let dispatcher = state.dispatcher.clone();
    let router = http::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "herald listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received");
        })
        .await?;

    // Let queued jobs drain before the process exits.
    dispatcher.shutdown().await;
    Ok(())
}
