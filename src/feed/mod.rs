//! Upstream fetching and RSS feed assembly.
//!
//! - [`fetcher`] - listing and announcement page retrieval, including the
//!   concurrent all-or-nothing content fan-out
//! - [`builder`] - positional merge of links, dates and contents into feed
//!   entries, and RSS 2.0 serialization via the `rss` crate
//!
//! # Example
//!
//! ```ignore
//! use crate::feed::{build_entries, fetch_all_content, render_rss};
//!
//! let contents = fetch_all_content(&client, &listing.links).await?;
//! let entries = build_entries(&listing.links, &listing.dates, &contents);
//! let xml = render_rss(&config.feed, &entries, Utc::now());
//! ```

mod builder;
mod fetcher;

pub use builder::{build_entries, publication_time, render_rss, FeedEntry, CONTENT_NAMESPACE};
pub use fetcher::{fetch_all_content, fetch_content, fetch_page, ContentData, FetchError};
