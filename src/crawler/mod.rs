//! Crawler module for date-windowed post collection
//!
//! This module contains the collection pipeline, including:
//! - Rate-limited HTTP fetching with cooperative cancellation
//! - Link discovery (feed, homepage, content frame, listing pages)
//! - Date-windowed planning with early exit
//! - Title, date and body extraction
//! - The dedup gate and overall run coordination

mod coordinator;
mod discovery;
mod extractor;
mod feed;
mod fetcher;
mod gate;
mod hooks;
mod planner;
mod types;
mod wait;

pub use coordinator::Coordinator;
pub use discovery::{find_frame_src, scan_post_links, Discoverer, Discovery, DiscoveryError, LinkSource};
pub use extractor::{extract, parse_date, DateUnresolved, PageExtract};
pub use feed::{parse_feed, parse_pub_date, FeedItem};
pub use fetcher::{build_http_client, FetchError, PoliteFetcher};
pub use gate::{accept, GateDecision};
pub use hooks::{CollectHooks, FnHooks, NoopHooks};
pub use planner::{plan, Plan};
pub use types::{BlogTarget, CrawlResult, CrawlWindow, ExtractedPost, PostCandidate, WindowError};
pub use wait::{interruptible_wait, PolitenessDelay, WaitOutcome};

use crate::config::Config;
use crate::storage::{open_storage_for, StorageError};
use crate::GleanerError;
use thiserror::Error;

/// Non-success outcomes of a collection run
///
/// Everything else (failed fetches, unparseable pages, unresolved dates)
/// is absorbed as a skip.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("no page could be retrieved during discovery for {url}")]
    NoPageRetrieved { url: String },

    #[error("post store failed: {0}")]
    Store(#[from] StorageError),
}

/// Runs a complete collection for one blog
///
/// This is the main entry point for library callers. It will:
/// 1. Open (creating if needed) the blog's post store
/// 2. Discover candidate links
/// 3. Filter them against `window`
/// 4. Fetch, extract and store each surviving candidate
///
/// # Arguments
///
/// * `config` - The collector configuration
/// * `target` - The blog to collect from
/// * `window` - Inclusive date range of posts to keep
/// * `hooks` - Progress, log and stop callbacks
///
/// # Returns
///
/// * `Ok(CrawlResult)` - Run completed or was cancelled
/// * `Err(GleanerError)` - Setup failed, discovery retrieved nothing, or
///   the store failed
pub async fn collect(
    config: &Config,
    target: &BlogTarget,
    window: &CrawlWindow,
    hooks: &dyn CollectHooks,
) -> Result<CrawlResult, GleanerError> {
    let mut store = open_storage_for(config, &target.url)?;
    let coordinator = Coordinator::new(config.clone())?;
    let result = coordinator.collect(&mut store, target, window, hooks).await?;
    Ok(result)
}
