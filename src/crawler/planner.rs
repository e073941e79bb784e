//! Date-windowed planning
//!
//! Hinted candidates arrive sorted newest first, so the first hint older
//! than the window ends the scan. Undated candidates (homepage and listing
//! links) are always kept; their date is checked after extraction instead.

use crate::crawler::types::{CrawlWindow, PostCandidate};

/// Candidates to fetch, in fetch order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub candidates: Vec<PostCandidate>,
    /// Candidates looked at before the scan ended
    pub examined: usize,
    /// True when a hint older than the window stopped the scan
    pub stopped_early: bool,
}

/// Filters `candidates` against `window`
///
/// For each candidate in order:
/// - hint before `window.start` → stop, nothing after it is examined
/// - hint after `window.end` → skipped, scan continues
/// - hint inside the window, or no hint → kept
pub fn plan(candidates: Vec<PostCandidate>, window: &CrawlWindow) -> Plan {
    let mut planned = Plan::default();

    for candidate in candidates {
        planned.examined += 1;
        match candidate.hinted_date {
            Some(date) if date < window.start() => {
                planned.stopped_early = true;
                break;
            }
            Some(date) if date > window.end() => continue,
            _ => planned.candidates.push(candidate),
        }
    }

    planned
}
