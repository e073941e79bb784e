use crate::url::{query_param, Endpoints};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// `/<blogId>/<logNo>` on the mobile host; post numbers have at least 7 digits
static MOBILE_POST_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/([A-Za-z0-9._-]+)/([0-9]{7,})/?$").expect("valid mobile post regex")
});

/// Maps an anchor `href` to the canonical mobile URL of a post
///
/// Accepts mobile post URLs (`<mobile>/<blogId>/<logNo>`) and `PostView`
/// view URLs on either host, whose blog and post number travel as query
/// parameters. Root-relative hrefs are resolved against the mobile host,
/// other relative hrefs against `page_url`.
///
/// # Arguments
///
/// * `href` - The raw attribute value
/// * `page_url` - URL of the page the anchor was found on
/// * `endpoints` - Origin hosts
/// * `blog_hint` - Blog identifier assumed when a view URL omits `blogId`
/// * `only_blog` - When set, links to other blogs are rejected
///
/// # Returns
///
/// * `Some(String)` - `<mobile>/<blogId>/<logNo>`
/// * `None` - The href does not point at a post (of the requested blog)
pub fn canonical_post_link(
    href: &str,
    page_url: &Url,
    endpoints: &Endpoints,
    blog_hint: Option<&str>,
    only_blog: Option<&str>,
) -> Option<String> {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
    {
        return None;
    }

    let resolved = if href.starts_with('/') && !href.starts_with("//") {
        endpoints.mobile.join(href).ok()?
    } else {
        page_url.join(href).ok()?
    };

    let (blog_id, log_no) = if is_view_url(&resolved)
        && (endpoints.is_desktop(&resolved) || endpoints.is_mobile(&resolved))
    {
        let blog_id = query_param(&resolved, "blogId").or_else(|| blog_hint.map(str::to_string))?;
        let log_no = query_param(&resolved, "logNo")?;
        if !log_no.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        (blog_id, log_no)
    } else if endpoints.is_mobile(&resolved) {
        let caps = MOBILE_POST_PATH.captures(resolved.path())?;
        (caps[1].to_string(), caps[2].to_string())
    } else {
        return None;
    };

    if let Some(only) = only_blog {
        if blog_id != only {
            return None;
        }
    }

    Some(endpoints.mobile_post_url(&blog_id, &log_no))
}

fn is_view_url(url: &Url) -> bool {
    url.path_segments()
        .and_then(|segments| segments.last())
        .map(|last| last.starts_with("PostView"))
        .unwrap_or(false)
}
