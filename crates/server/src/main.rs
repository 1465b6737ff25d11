//! HTTP server for outline-to-deck generation.

use anyhow::{Context, Result};
use clap::Parser;
use deck_server::{router, AppState, ServerConfig};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::parse();

    // Initialize logging
    let filter = if config.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let state = AppState::from_config(&config)?;
    spawn_expiry(state.clone(), config.session_ttl(), config.sweep_interval());

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    log::info!("Listening on http://{}", addr);

    axum::serve(listener, router(state))
        .await
        .context("Server error")?;
    Ok(())
}

/// Periodically drop conversations and job records older than `ttl`.
fn spawn_expiry(state: AppState, ttl: Duration, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let dropped = state.expire(ttl);
            if dropped > 0 {
                log::debug!("Expired {} conversations and jobs", dropped);
            }
        }
    });
}
