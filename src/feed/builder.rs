use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use rss::{ChannelBuilder, GuidBuilder, ImageBuilder, Item, ItemBuilder};
use std::collections::BTreeMap;

use crate::config::FeedMetadata;
use crate::extract::LinkData;
use crate::feed::ContentData;

/// Namespace of the `content:encoded` extension element.
pub const CONTENT_NAMESPACE: &str = "http://purl.org/rss/1.0/modules/content/";

const GENERATOR: &str = concat!("bulletin-rss ", env!("CARGO_PKG_VERSION"));
const RSS_DOCS: &str = "https://validator.w3.org/feed/docs/rss2.html";

/// One announcement as it appears in the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    /// Also used as the item's guid; duplicate titles share an identity.
    pub title: String,
    pub link: String,
    /// Escaped body markup; `None` when content-mode is off.
    pub content: Option<String>,
    pub published: Option<NaiveDate>,
}

/// Merges links, dates and contents by position, in listing order.
///
/// Dates are paired positionally with no structural check. When the counts
/// differ the pairing is kept as is, a warning is logged, and entries past
/// the end of `dates` carry no publication date. No re-sorting by date is done.
pub fn build_entries(
    links: &[LinkData],
    dates: &[NaiveDate],
    contents: &[ContentData],
) -> Vec<FeedEntry> {
    if dates.len() != links.len() {
        tracing::warn!(
            links = links.len(),
            dates = dates.len(),
            "Listing dates out of step with links, pairing by position"
        );
    }

    links
        .iter()
        .enumerate()
        .map(|(i, link)| FeedEntry {
            title: link.title.clone(),
            link: link.link.clone(),
            content: contents
                .get(i)
                .filter(|c| !c.is_placeholder())
                .map(|c| c.content.clone()),
            published: dates.get(i).copied(),
        })
        .collect()
}

/// Midnight UTC on `date`.
pub fn publication_time(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

fn to_item(entry: &FeedEntry) -> Item {
    ItemBuilder::default()
        .title(Some(entry.title.clone()))
        .link(Some(entry.link.clone()))
        .guid(Some(
            GuidBuilder::default()
                .value(entry.title.clone())
                .permalink(false)
                .build(),
        ))
        .pub_date(entry.published.map(|d| publication_time(d).to_rfc2822()))
        .content(entry.content.clone())
        .build()
}

/// Serializes `entries` as an RSS 2.0 document.
///
/// `content:encoded` (and its namespace declaration) only appear when at least
/// one entry carries content.
pub fn render_rss(meta: &FeedMetadata, entries: &[FeedEntry], built_at: DateTime<Utc>) -> String {
    let mut namespaces = BTreeMap::new();
    if entries.iter().any(|e| e.content.is_some()) {
        namespaces.insert("content".to_string(), CONTENT_NAMESPACE.to_string());
    }

    let image = ImageBuilder::default()
        .url(meta.image.clone())
        .title(meta.title.clone())
        .link(meta.link.clone())
        .build();

    let channel = ChannelBuilder::default()
        .namespaces(namespaces)
        .title(meta.title.clone())
        .link(meta.link.clone())
        .description(meta.description.clone())
        .language(Some(meta.language.clone()))
        .copyright(Some(meta.copyright.clone()))
        .managing_editor(Some(format!("{} ({})", meta.author_email, meta.author_name)))
        .generator(Some(GENERATOR.to_string()))
        .docs(Some(RSS_DOCS.to_string()))
        .last_build_date(Some(built_at.to_rfc2822()))
        .image(Some(image))
        .items(entries.iter().map(to_item).collect::<Vec<_>>())
        .build();

    channel.to_string()
}
