//! Values that flow through one collection run

use chrono::NaiveDate;
use thiserror::Error;

/// A blog to collect from
///
/// `url` is the canonical handle for the source; the blog identifier used to
/// address its feed, listing and post store is derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogTarget {
    pub name: String,
    pub url: String,
}

impl BlogTarget {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Rejected window bounds
#[derive(Debug, Error, PartialEq, Eq)]
#[error("window start {start} is after end {end}")]
pub struct WindowError {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Inclusive date range `[start, end]`
///
/// Construction fails when `start > end`, so every window in circulation
/// is non-empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl CrawlWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, WindowError> {
        if start > end {
            return Err(WindowError { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Returns true if `date` lies within the window, bounds included
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// A discovered post reference
///
/// `hinted_date` comes from the feed. The page's own date takes precedence
/// whenever it can be parsed; the hint is only a fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostCandidate {
    pub link: String,
    pub hinted_date: Option<NaiveDate>,
}

impl PostCandidate {
    pub fn unhinted(link: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            hinted_date: None,
        }
    }

    pub fn hinted(link: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            link: link.into(),
            hinted_date: Some(date),
        }
    }
}

/// A post whose title and date were resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPost {
    pub title: String,
    pub date: NaiveDate,
    pub content: String,
    pub link: String,
}

/// Summary of a collection run
///
/// On cancellation the counts cover only the candidates processed before
/// the stop signal took effect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlResult {
    /// Candidates handed to the per-candidate loop (after planning)
    pub total_candidates: u64,
    pub saved: u64,
    pub duplicates: u64,
    /// Candidates dropped for a failed fetch, an unresolved date or a date
    /// outside the window
    pub skipped: u64,
    pub cancelled: bool,
}
