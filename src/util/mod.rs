//! Utility functions for common operations.
//!
//! - **Text escaping**: entity escaping and line-break conversion for feed bodies
//!
//! # Examples
//!
//! ```
//! use bulletin_rss::util::{escape_html, to_feed_body};
//!
//! assert_eq!(escape_html("R&D"), "R&amp;D");
//! assert_eq!(to_feed_body("first\nsecond"), "first<br />second");
//! ```

mod text;

pub use text::{escape_html, to_feed_body, LINE_BREAK};
