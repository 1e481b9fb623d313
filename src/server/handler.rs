use axum::{
    extract::State,
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use thiserror::Error;

use super::AppState;
use crate::extract::{extract_listing, Listing};
use crate::feed::{
    build_entries, fetch_all_content, fetch_page, render_rss, ContentData, FetchError,
};

/// Request header whose value must equal the configured secret to enable content-mode.
pub const CONTENT_MODE_HEADER: &str = "content-mode-token";

pub const RSS_CONTENT_TYPE: &str = "application/rss+xml; charset=utf-8";

/// Failures that end a feed request with an error response.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The listing page could not be fetched
    #[error("Failed to fetch listing page: {0}")]
    Listing(#[source] FetchError),
    /// At least one announcement page could not be fetched in content-mode
    #[error("Failed to fetch announcement page: {0}")]
    Content(#[source] FetchError),
}

impl IntoResponse for FeedError {
    fn into_response(self) -> Response {
        // Upstream details are logged, never exposed to the client
        let body = match &self {
            FeedError::Listing(e) => {
                tracing::error!(error = %e, "Listing fetch failed");
                "Failed to fetch data"
            }
            FeedError::Content(e) => {
                tracing::error!(error = %e, "Announcement fetch failed, dropping whole feed");
                "Failed to fetch page content"
            }
        };
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

/// Serves the bulletin feed.
///
/// Only GET is accepted; anything else gets an empty 405 before any upstream
/// request is made.
pub async fn feed_handler(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
) -> Response {
    if method != Method::GET {
        tracing::debug!(method = %method, "Rejecting non-GET request");
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    let token = headers
        .get(CONTENT_MODE_HEADER)
        .and_then(|v| v.to_str().ok());
    let content_mode = state.config.content_mode_enabled(token);

    match build_feed(&state, content_mode).await {
        Ok(xml) => ([(header::CONTENT_TYPE, RSS_CONTENT_TYPE)], xml).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Runs the full pipeline: listing fetch, extraction, optional content
/// fan-out, assembly and serialization.
pub async fn build_feed(state: &AppState, content_mode: bool) -> Result<String, FeedError> {
    let html = fetch_page(&state.client, &state.config.listing_url)
        .await
        .map_err(FeedError::Listing)?;

    let Listing { links, dates } = extract_listing(&html, &state.config.base_url);
    tracing::info!(
        bytes = html.len(),
        links = links.len(),
        dates = dates.len(),
        content_mode = content_mode,
        "Extracted listing"
    );

    let contents = if content_mode {
        fetch_all_content(&state.client, &links)
            .await
            .map_err(FeedError::Content)?
    } else {
        vec![ContentData::placeholder(); links.len()]
    };

    let entries = build_entries(&links, &dates, &contents);
    Ok(render_rss(&state.config.feed, &entries, Utc::now()))
}
