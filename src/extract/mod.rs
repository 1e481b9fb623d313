//! HTML extraction for the bulletin listing and announcement pages.
//!
//! Everything here is synchronous and works on a parsed [`scraper::Html`],
//! which is not `Send`; callers parse, extract and drop the document before
//! awaiting anything.
//!
//! - [`scan`] - selector-bound callbacks dispatched in document order
//! - [`links`] - announcement titles and absolute links from the listing
//! - [`dates`] - per-row publication dates from the listing
//! - [`content`] - the body text of one announcement page

mod content;
mod dates;
mod links;
mod scan;

use chrono::NaiveDate;
use scraper::Html;

pub use content::{extract_page_content, CONTENT_SELECTOR};
pub use dates::{date_selector, extract_dates, DATE_FORMAT};
pub use links::{absolutize_href, extract_links, LinkData, LINK_SELECTOR};
pub use scan::{parse_selector, ElementHandler, HtmlScanner};

/// Links and dates scraped from one listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub links: Vec<LinkData>,
    /// Positionally paired with `links`; see [`extract_dates`].
    pub dates: Vec<NaiveDate>,
}

/// Parses the listing once and runs link extraction followed by one date scan per link.
pub fn extract_listing(html: &str, base_url: &str) -> Listing {
    let document = Html::parse_document(html);
    let links = extract_links(&document, base_url);
    let dates = extract_dates(&document, links.len());
    Listing { links, dates }
}

/// Parses an announcement page and extracts its body text.
pub fn extract_content(html: &str) -> String {
    extract_page_content(&Html::parse_document(html))
}
