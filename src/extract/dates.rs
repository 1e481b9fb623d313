use chrono::NaiveDate;
use scraper::Html;

use super::scan::{ElementHandler, HtmlScanner};

/// Date format used by the listing's date labels.
pub const DATE_FORMAT: &str = "%Y/%m/%d";

/// Builds the selector for the date label of the 1-based `row`.
///
/// The listing gives date labels no stable class; each carries an id with the
/// row number zero-padded to two digits.
pub fn date_selector(row: usize) -> String {
    format!("table.striped.bordered span#ctl00_ContentPlaceHolder1_Repeater1_ctl{row:02}_lbl_time")
}

#[derive(Default)]
struct DateExtractor {
    dates: Vec<NaiveDate>,
}

impl ElementHandler for DateExtractor {
    fn text(&mut self, text: &str) {
        if let Ok(date) = NaiveDate::parse_from_str(text.trim(), DATE_FORMAT) {
            self.dates.push(date);
        }
    }
}

/// Collects publication dates for rows `1..=rows`, one scan per row.
///
/// Text that does not parse as `YYYY/MM/DD` is dropped. The result is only
/// aligned with the extracted links when every row carries a correctly
/// numbered date label; a missing label shifts every later date.
pub fn extract_dates(document: &Html, rows: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(rows);
    for row in 1..=rows {
        let mut extractor = DateExtractor::default();
        HtmlScanner::new()
            .on(&date_selector(row), &mut extractor)
            .run(document);
        dates.extend(extractor.dates);
    }
    dates
}
