//! RSS feed parsing
//!
//! The feed is the only discovery source that carries dates, which is what
//! lets the planner stop early instead of fetching every post.

use crate::crawler::extractor::parse_date;
use crate::url::{to_mobile, Endpoints};
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    #[serde(default)]
    link: Option<String>,
    #[serde(rename = "pubDate", default)]
    pub_date: Option<String>,
}

/// One feed entry, link already in mobile form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub link: String,
    pub published: Option<NaiveDate>,
}

/// Parses an RSS 2.0 document into feed items, in document order
///
/// Malformed XML yields an empty list. Items without a link are dropped;
/// items with an unparseable date are kept undated.
pub fn parse_feed(xml: &str, endpoints: &Endpoints) -> Vec<FeedItem> {
    let rss: Rss = match quick_xml::de::from_str(xml) {
        Ok(rss) => rss,
        Err(e) => {
            tracing::warn!("Ignoring malformed feed: {}", e);
            return Vec::new();
        }
    };

    rss.channel
        .items
        .into_iter()
        .filter_map(|item| {
            let link = item.link.as_deref().map(str::trim).filter(|l| !l.is_empty())?;
            Some(FeedItem {
                link: to_mobile(link, endpoints),
                published: item.pub_date.as_deref().and_then(parse_pub_date),
            })
        })
        .collect()
}

/// Calendar date of an RSS `pubDate`, in the feed's own offset
///
/// RFC 2822 first; anything else goes through the page date parser.
pub fn parse_pub_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc2822(raw)
        .map(|dt| dt.date_naive())
        .ok()
        .or_else(|| parse_date(raw))
}
