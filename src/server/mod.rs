//! HTTP surface serving the bulletin feed.
//!
//! Every path is routed to [`feed_handler`], which checks the method itself
//! so non-GET requests get an explicit empty 405.

mod handler;

use anyhow::Context;
use axum::Router;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;

pub use handler::{build_feed, feed_handler, FeedError, CONTENT_MODE_HEADER, RSS_CONTENT_TYPE};

const USER_AGENT: &str = concat!("bulletin-rss/", env!("CARGO_PKG_VERSION"));

/// Shared, read-only per-process state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub client: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new().fallback(feed_handler).with_state(state)
}

/// Binds the configured address and serves until ctrl-c.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let bind_address = config.bind_address.clone();
    let state = AppState::new(config).context("Failed to build HTTP client")?;

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind feed server to {}", bind_address))?;

    tracing::info!(
        address = %bind_address,
        listing_url = %state.config.listing_url,
        "Feed server listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Feed server error")?;

    tracing::info!("Feed server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for ctrl-c, serving until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
