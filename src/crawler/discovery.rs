//! Link discovery
//!
//! Candidates come from, in order of preference:
//! - the blog's RSS feed, whose items carry publish dates (undated items
//!   are dropped)
//! - anchors on the homepage (mobile first, then the desktop page's
//!   content frame)
//! - anchors on a bounded number of paginated listing pages
//!
//! A strategy that fails to fetch falls through to the next one. Discovery
//! as a whole fails only when no request returned a body.

use crate::crawler::feed::{parse_feed, FeedItem};
use crate::crawler::fetcher::{FetchError, PoliteFetcher};
use crate::crawler::hooks::{log_info, log_warn, CollectHooks};
use crate::crawler::types::{BlogTarget, PostCandidate};
use crate::url::{blog_id_from_url, canonical_post_link, to_mobile, Endpoints};
use scraper::{Html, Selector};
use std::cmp::Reverse;
use std::collections::HashSet;
use std::sync::LazyLock;
use thiserror::Error;
use url::Url;

static ANCHORS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid static selector"));

static MAIN_FRAME: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("iframe#mainFrame").expect("valid static selector"));

/// Where the candidate list came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkSource {
    /// Feed items, sorted newest first, carrying date hints
    Feed,
    /// Homepage or frame anchors, in page order, no hints
    Homepage,
    /// Listing page anchors, in page order, no hints
    Listing,
    /// Nothing found
    None,
}

impl LinkSource {
    pub fn has_hints(&self) -> bool {
        matches!(self, Self::Feed)
    }
}

/// Outcome of discovery
#[derive(Debug, Clone)]
pub struct Discovery {
    pub candidates: Vec<PostCandidate>,
    pub source: LinkSource,
    /// Discovery requests that returned a body
    pub pages_retrieved: usize,
}

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("no page could be retrieved for {url}")]
    NoPageRetrieved { url: String },

    #[error("stopped during discovery")]
    Cancelled,
}

/// Ways of obtaining the homepage, tried in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HomeStrategy {
    MobileHome,
    DesktopFrame,
}

const HOME_STRATEGIES: [HomeStrategy; 2] = [HomeStrategy::MobileHome, HomeStrategy::DesktopFrame];

/// A fetched page together with the URL relative links resolve against
struct Page {
    url: Url,
    html: String,
}

pub struct Discoverer<'a> {
    fetcher: &'a PoliteFetcher,
    endpoints: &'a Endpoints,
    max_listing_pages: u32,
}

impl<'a> Discoverer<'a> {
    pub fn new(fetcher: &'a PoliteFetcher, endpoints: &'a Endpoints, max_listing_pages: u32) -> Self {
        Self {
            fetcher,
            endpoints,
            max_listing_pages,
        }
    }

    /// Produces the candidate list for `target`
    pub async fn discover(
        &self,
        target: &BlogTarget,
        hooks: &dyn CollectHooks,
    ) -> Result<Discovery, DiscoveryError> {
        let mut pages_retrieved = 0;
        let mobile_url = to_mobile(&target.url, self.endpoints);
        let blog_id = blog_id_from_url(&mobile_url, self.endpoints)
            .or_else(|| blog_id_from_url(&target.url, self.endpoints));

        let mut home_links = Vec::new();
        for strategy in HOME_STRATEGIES {
            if let Some(page) = self
                .home_page(strategy, target, &mobile_url, hooks, &mut pages_retrieved)
                .await?
            {
                home_links = scan_post_links(
                    &page.html,
                    &page.url,
                    self.endpoints,
                    blog_id.as_deref(),
                    None,
                );
                break;
            }
        }

        let Some(blog_id) = blog_id else {
            log_warn(hooks, &format!("No blog id in {}, skipping feed and listing", target.url));
            let candidates = home_links.into_iter().map(PostCandidate::unhinted).collect();
            return finish(target, candidates, LinkSource::Homepage, pages_retrieved);
        };

        let feed_items = match self
            .fetcher
            .fetch(&self.endpoints.feed_url(&blog_id), hooks)
            .await
        {
            Ok(xml) => {
                pages_retrieved += 1;
                parse_feed(&xml, self.endpoints)
            }
            Err(e) => {
                check_cancelled(&e)?;
                log_warn(hooks, &format!("Feed unavailable: {}", e));
                Vec::new()
            }
        };
        log_info(hooks, &format!("RSS items: {}", feed_items.len()));

        if !feed_items.is_empty() {
            let candidates = feed_candidates(feed_items);
            if candidates.is_empty() {
                log_warn(hooks, "No dated RSS items");
            }
            return finish(target, candidates, LinkSource::Feed, pages_retrieved);
        }

        if !home_links.is_empty() {
            let candidates = home_links.into_iter().map(PostCandidate::unhinted).collect();
            return finish(target, candidates, LinkSource::Homepage, pages_retrieved);
        }

        let listing_links = self
            .scan_listing(&blog_id, hooks, &mut pages_retrieved)
            .await?;
        let candidates = listing_links.into_iter().map(PostCandidate::unhinted).collect();
        finish(target, candidates, LinkSource::Listing, pages_retrieved)
    }

    async fn home_page(
        &self,
        strategy: HomeStrategy,
        target: &BlogTarget,
        mobile_url: &str,
        hooks: &dyn CollectHooks,
        pages_retrieved: &mut usize,
    ) -> Result<Option<Page>, DiscoveryError> {
        match strategy {
            HomeStrategy::MobileHome => self.fetch_page(mobile_url, hooks, pages_retrieved).await,
            HomeStrategy::DesktopFrame => {
                let Some(desktop) = self.fetch_page(&target.url, hooks, pages_retrieved).await? else {
                    return Ok(None);
                };
                let Some(frame_url) = find_frame_src(&desktop.html)
                    .and_then(|src| desktop.url.join(&src).ok())
                else {
                    log_warn(hooks, &format!("No content frame on {}", desktop.url));
                    return Ok(None);
                };
                self.fetch_page(frame_url.as_str(), hooks, pages_retrieved).await
            }
        }
    }

    async fn fetch_page(
        &self,
        url: &str,
        hooks: &dyn CollectHooks,
        pages_retrieved: &mut usize,
    ) -> Result<Option<Page>, DiscoveryError> {
        let Ok(parsed) = Url::parse(url) else {
            log_warn(hooks, &format!("Not a URL: {}", url));
            return Ok(None);
        };

        match self.fetcher.fetch(url, hooks).await {
            Ok(html) => {
                *pages_retrieved += 1;
                Ok(Some(Page { url: parsed, html }))
            }
            Err(e) => {
                check_cancelled(&e)?;
                log_warn(hooks, &format!("Fetch failed: {}", e));
                Ok(None)
            }
        }
    }

    async fn scan_listing(
        &self,
        blog_id: &str,
        hooks: &dyn CollectHooks,
        pages_retrieved: &mut usize,
    ) -> Result<Vec<String>, DiscoveryError> {
        let mut links = Vec::new();
        let mut seen = HashSet::new();

        for page_no in 1..=self.max_listing_pages {
            let url = self.endpoints.listing_url(blog_id, page_no);
            if let Some(page) = self.fetch_page(&url, hooks, pages_retrieved).await? {
                let found = scan_post_links(
                    &page.html,
                    &page.url,
                    self.endpoints,
                    Some(blog_id),
                    Some(blog_id),
                );
                links.extend(found.into_iter().filter(|l| seen.insert(l.clone())));
            }
            log_info(
                hooks,
                &format!("PostList page {} collected {} links so far", page_no, links.len()),
            );
        }

        Ok(links)
    }
}

/// Dated feed items, deduplicated by link, newest first
///
/// Items without a parseable publish date are dropped.
fn feed_candidates(items: Vec<FeedItem>) -> Vec<PostCandidate> {
    let mut seen = HashSet::new();
    let mut candidates: Vec<PostCandidate> = items
        .into_iter()
        .filter_map(|item| {
            let date = item.published?;
            seen.insert(item.link.clone())
                .then(|| PostCandidate::hinted(item.link, date))
        })
        .collect();
    candidates.sort_by_key(|c| Reverse(c.hinted_date));
    candidates
}

fn check_cancelled(e: &FetchError) -> Result<(), DiscoveryError> {
    if e.is_cancelled() {
        Err(DiscoveryError::Cancelled)
    } else {
        Ok(())
    }
}

fn finish(
    target: &BlogTarget,
    candidates: Vec<PostCandidate>,
    source: LinkSource,
    pages_retrieved: usize,
) -> Result<Discovery, DiscoveryError> {
    if pages_retrieved == 0 {
        return Err(DiscoveryError::NoPageRetrieved {
            url: target.url.clone(),
        });
    }
    let source = if candidates.is_empty() {
        LinkSource::None
    } else {
        source
    };
    Ok(Discovery {
        candidates,
        source,
        pages_retrieved,
    })
}

/// Canonical post links among a page's anchors, first occurrence first
pub fn scan_post_links(
    html: &str,
    page_url: &Url,
    endpoints: &Endpoints,
    blog_hint: Option<&str>,
    only_blog: Option<&str>,
) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();

    document
        .select(&ANCHORS)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| canonical_post_link(href, page_url, endpoints, blog_hint, only_blog))
        .filter(|link| seen.insert(link.clone()))
        .collect()
}

/// `src` of the desktop page's content frame
pub fn find_frame_src(html: &str) -> Option<String> {
    Html::parse_document(html)
        .select(&MAIN_FRAME)
        .next()
        .and_then(|frame| frame.value().attr("src"))
        .map(str::trim)
        .filter(|src| !src.is_empty())
        .map(str::to_string)
}
