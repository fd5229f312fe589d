//! noor server entry point.
//!
//! Boots the MCP server on stdio transport. Before serving, the offline
//! cache is populated from the static asset manifest; if that fails the
//! server still starts and serves from the network and whatever is stored.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use noor_core::AppConfig;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod handler;
mod state;
mod tools;

use state::AppState;

const PRAYER_CHECK_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    let state = Arc::new(AppState::open(config).await?);
    tracing::info!(
        cache = %state.config.cache_name,
        db = %state.config.db_path.display(),
        "Starting noor server on stdio transport"
    );

    if let Err(e) = state.cache.install().await {
        tracing::warn!("offline cache install failed, continuing without it: {e}");
    }

    let watcher = tokio::spawn(watch_prayers(Arc::clone(&state)));

    let handler = handler::NoorServer::new(Arc::clone(&state));
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    watcher.abort();
    state.cache.flush().await;

    Ok(())
}

/// Log the announcement for a prayer when its minute arrives.
async fn watch_prayers(state: Arc<AppState>) {
    let mut interval = tokio::time::interval(PRAYER_CHECK_INTERVAL);
    loop {
        interval.tick().await;
        match state.session.due_prayer(Local::now().time()).await {
            Ok(Some(prayer)) => tracing::info!(prayer = prayer.key(), "{}", prayer.announcement()),
            Ok(None) => {}
            Err(e) => tracing::debug!("prayer check failed: {e}"),
        }
    }
}
