use scraper::{ElementRef, Html};

use super::scan::{ElementHandler, HtmlScanner};

/// Anchors inside the bulletin table; one per announcement row.
pub const LINK_SELECTOR: &str = "table.striped.bordered a";

/// Relative prefix the listing uses for announcement pages.
const RELATIVE_PREFIX: &str = "../";

/// An announcement title and its absolute detail page URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkData {
    pub title: String,
    pub link: String,
}

/// Rewrites a leading `../` to `base_url`; any other href passes through unchanged.
pub fn absolutize_href(href: &str, base_url: &str) -> String {
    match href.strip_prefix(RELATIVE_PREFIX) {
        Some(rest) => format!("{base_url}{rest}"),
        None => href.to_string(),
    }
}

struct LinkExtractor<'a> {
    base_url: &'a str,
    links: Vec<LinkData>,
}

impl ElementHandler for LinkExtractor<'_> {
    fn element(&mut self, element: ElementRef<'_>) {
        let anchor = element.value();
        let (Some(title), Some(href)) = (anchor.attr("title"), anchor.attr("href")) else {
            return;
        };
        if title.is_empty() || href.is_empty() {
            return;
        }

        self.links.push(LinkData {
            title: title.to_string(),
            link: absolutize_href(href, self.base_url),
        });
    }
}

/// Collects every titled anchor in the bulletin table, in document order.
///
/// Anchors missing a non-empty `title` or `href` are skipped without shifting
/// the position of later anchors.
pub fn extract_links(document: &Html, base_url: &str) -> Vec<LinkData> {
    let mut extractor = LinkExtractor {
        base_url,
        links: Vec::new(),
    };
    HtmlScanner::new()
        .on(LINK_SELECTOR, &mut extractor)
        .run(document);
    extractor.links
}
