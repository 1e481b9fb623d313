use scraper::{ElementRef, Html};

use super::scan::{ElementHandler, HtmlScanner};

/// The element holding an announcement's body on its detail page.
pub const CONTENT_SELECTOR: &str = "span#ctl00_ContentPlaceHolder1_lbl_content";

/// The body element plus the line breaks inside it, so both reach one handler
/// in document order.
const CONTENT_AND_BREAKS: &str =
    "span#ctl00_ContentPlaceHolder1_lbl_content, span#ctl00_ContentPlaceHolder1_lbl_content br";

#[derive(Default)]
struct ContentExtractor {
    content: String,
}

impl ElementHandler for ContentExtractor {
    fn element(&mut self, element: ElementRef<'_>) {
        if element.value().name() == "br" {
            self.content.push('\n');
        }
    }

    fn text(&mut self, text: &str) {
        if text.trim().is_empty() {
            self.content.push('\n');
        } else {
            self.content.push_str(text);
        }
    }
}

/// Accumulates the plain text of an announcement body.
///
/// Each whitespace-only text node and each `<br>` contribute one `\n`; other
/// text nodes are appended verbatim in document order. Returns an empty string
/// when the page has no body element.
pub fn extract_page_content(document: &Html) -> String {
    let mut extractor = ContentExtractor::default();
    HtmlScanner::new()
        .on(CONTENT_AND_BREAKS, &mut extractor)
        .run(document);
    extractor.content
}
