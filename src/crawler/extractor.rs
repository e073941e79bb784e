//! Post page extraction
//!
//! Pages come in several editor generations, each with its own container,
//! title and date markup. Selectors are tried newest layout first.

use crate::crawler::types::{ExtractedPost, PostCandidate};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use thiserror::Error;

const TITLE_FALLBACK_CHARS: usize = 80;

fn selectors(list: &[&str]) -> Vec<Selector> {
    list.iter()
        .map(|s| Selector::parse(s).expect("valid static selector"))
        .collect()
}

static CONTENT_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selectors(&[
        "div.se-main-container",
        "#postViewArea",
        ".se_component_wrap",
    ])
});

static TITLE_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selectors(&[
        "h3.se_text_area",
        "div.se_title h3",
        "h3.se_title_text",
        "span.pcol1",
        "meta[property='og:title']",
    ])
});

static PUBLISHED_META: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("meta[property='article:published_time']").expect("valid static selector")
});

static DATE_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selectors(&[
        "span.se_publishDate",
        "p.se_date",
        "span.date",
        "em.pcol2",
        "span._postAddDate",
    ])
});

static BODY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("valid static selector"));

/// `2024년 1월 10일`, `2024. 1. 10.`, `2024-01-10 09:30` and the like
static LOOSE_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4})\s*[년.\-/]\s*(\d{1,2})\s*[월.\-/]\s*(\d{1,2})").expect("valid date regex")
});

static BLANK_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n(?:[ \t]*\n)+").expect("valid blank-line regex"));

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y.%m.%d", "%Y/%m/%d"];

/// Neither the page nor the feed supplied a date
#[derive(Debug, Error, PartialEq, Eq)]
#[error("no date found for {link}")]
pub struct DateUnresolved {
    pub link: String,
}

/// What a post page yields on its own
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageExtract {
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    pub content: String,
}

impl PageExtract {
    /// The page title, or the first content line cut to 80 characters
    pub fn title_or_fallback(&self) -> String {
        match &self.title {
            Some(title) => title.clone(),
            None => self
                .content
                .lines()
                .next()
                .unwrap_or("")
                .chars()
                .take(TITLE_FALLBACK_CHARS)
                .collect(),
        }
    }

    /// Combines the page with its candidate
    ///
    /// The page date wins; the feed hint is used only when the page has
    /// none.
    pub fn resolve(self, candidate: &PostCandidate) -> Result<ExtractedPost, DateUnresolved> {
        let date = self
            .date
            .or(candidate.hinted_date)
            .ok_or_else(|| DateUnresolved {
                link: candidate.link.clone(),
            })?;

        Ok(ExtractedPost {
            title: self.title_or_fallback(),
            date,
            content: self.content,
            link: candidate.link.clone(),
        })
    }
}

/// Extracts title, date and body text from a post page
pub fn extract(html: &str) -> PageExtract {
    let document = Html::parse_document(html);

    PageExtract {
        title: extract_title(&document),
        date: extract_date(&document),
        content: extract_content(&document),
    }
}

fn extract_title(document: &Html) -> Option<String> {
    for selector in TITLE_SELECTORS.iter() {
        let Some(el) = document.select(selector).next() else {
            continue;
        };
        let title = if el.value().name() == "meta" {
            el.value().attr("content").map(|c| c.trim().to_string())
        } else {
            Some(inline_text(el))
        };
        if let Some(title) = title.filter(|t| !t.is_empty()) {
            return Some(title);
        }
    }
    None
}

fn extract_date(document: &Html) -> Option<NaiveDate> {
    let meta = document
        .select(&PUBLISHED_META)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(str::to_string);

    let elements = DATE_SELECTORS
        .iter()
        .filter_map(|selector| document.select(selector).next())
        .map(inline_text);

    meta.into_iter()
        .chain(elements)
        .filter(|raw| !raw.trim().is_empty())
        .find_map(|raw| parse_date(&raw))
}

fn extract_content(document: &Html) -> String {
    let container = CONTENT_SELECTORS
        .iter()
        .find_map(|selector| document.select(selector).next())
        .or_else(|| document.select(&BODY).next())
        .unwrap_or_else(|| document.root_element());

    let text = block_text(container);
    BLANK_RUNS.replace_all(&text, "\n").into_owned()
}

/// Text of an element with whitespace runs collapsed to single spaces
fn inline_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text pieces of an element one per line, leaving out script and style
fn block_text(el: ElementRef<'_>) -> String {
    let mut lines = Vec::new();
    for node in el.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .map(|e| matches!(e.name(), "script" | "style"))
                .unwrap_or(false)
        });
        let trimmed = text.trim();
        if !hidden && !trimmed.is_empty() {
            lines.push(trimmed);
        }
    }
    lines.join("\n")
}

/// Parses a date as it appears in page markup
///
/// Tries ISO, dotted and slashed dates, ISO date-times with and without an
/// offset, then a loose `year sep month sep day` pattern that also accepts
/// Korean unit suffixes.
///
/// ```
/// use blog_gleaner::crawler::parse_date;
/// use chrono::NaiveDate;
///
/// let d = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
/// assert_eq!(parse_date("2024.01.10"), Some(d));
/// assert_eq!(parse_date("2024년 1월 10일"), Some(d));
/// assert_eq!(parse_date("2024-01-10T09:30:00+09:00"), Some(d));
/// ```
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }

    let caps = LOOSE_DATE.captures(raw)?;
    let year = caps[1].parse().ok()?;
    let month = caps[2].parse().ok()?;
    let day = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}
