//! Bulletin board to RSS gateway.
//!
//! Fetches the bulletin listing page, pairs each announcement link with its
//! publication date, optionally pulls every announcement body concurrently,
//! and serves the result as an RSS 2.0 feed.

pub mod config;
pub mod extract;
pub mod feed;
pub mod server;
pub mod util;
