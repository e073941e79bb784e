//! URL handling module for Blog-Gleaner
//!
//! This module knows the origin's URL shapes: how a blog identifier is
//! derived from a blog URL, how desktop URLs map onto the mobile host, and
//! which links point at individual posts.

mod blog;
mod post_link;

use crate::config::EndpointConfig;
use crate::{UrlError, UrlResult};
use url::Url;

// Re-export main functions
pub use blog::{blog_id_from_url, query_param, to_mobile};
pub use post_link::canonical_post_link;

/// Parsed origin hosts
///
/// Built once from [`EndpointConfig`]; every URL the crawler issues is
/// addressed relative to one of these bases.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub desktop: Url,
    pub mobile: Url,
    pub feed: Url,
}

impl Endpoints {
    /// Parses the configured bases
    ///
    /// # Returns
    ///
    /// * `Ok(Endpoints)` - All three bases are absolute HTTP(S) URLs with a host
    /// * `Err(UrlError)` - A base failed to parse or uses another scheme
    pub fn from_config(config: &EndpointConfig) -> UrlResult<Self> {
        Ok(Self {
            desktop: parse_base(&config.desktop_base)?,
            mobile: parse_base(&config.mobile_base)?,
            feed: parse_base(&config.feed_base)?,
        })
    }

    /// Returns true if `url` is served by the desktop host
    pub fn is_desktop(&self, url: &Url) -> bool {
        same_host(&self.desktop, url)
    }

    /// Returns true if `url` is served by the mobile host
    pub fn is_mobile(&self, url: &Url) -> bool {
        same_host(&self.mobile, url)
    }

    /// Canonical mobile URL of a single post
    pub fn mobile_post_url(&self, blog_id: &str, log_no: &str) -> String {
        format!("{}/{}/{}", base(&self.mobile), blog_id, log_no)
    }

    /// Syndication feed of a blog
    pub fn feed_url(&self, blog_id: &str) -> String {
        format!("{}/{}.xml", base(&self.feed), blog_id)
    }

    /// One page of the paginated post listing (pages start at 1)
    pub fn listing_url(&self, blog_id: &str, page: u32) -> String {
        format!(
            "{}/PostList.naver?blogId={}&categoryNo=0&currentPage={}",
            base(&self.mobile),
            blog_id,
            page
        )
    }
}

fn parse_base(raw: &str) -> UrlResult<Url> {
    let url = Url::parse(raw).map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::Parse(format!("{}: missing host", raw)));
    }

    Ok(url)
}

/// Base URL without the trailing slash `Url` always carries on an empty path
fn base(url: &Url) -> &str {
    url.as_str().trim_end_matches('/')
}

fn same_host(a: &Url, b: &Url) -> bool {
    a.host_str() == b.host_str() && a.port_or_known_default() == b.port_or_known_default()
}
