use crate::url::Endpoints;
use url::Url;

/// Derives the blog identifier from a blog or post URL
///
/// On the desktop and mobile hosts the identifier is the first path
/// segment (`https://blog.naver.com/cook` → `cook`). Endpoint paths such as
/// `PostList.naver` are not identifiers; for those, and for any other host,
/// the `blogId` query parameter is used.
///
/// # Examples
///
/// ```
/// use blog_gleaner::config::EndpointConfig;
/// use blog_gleaner::url::{blog_id_from_url, Endpoints};
///
/// let e = Endpoints::from_config(&EndpointConfig::default()).unwrap();
/// assert_eq!(blog_id_from_url("https://blog.naver.com/cook", &e), Some("cook".to_string()));
/// assert_eq!(
///     blog_id_from_url("https://blog.naver.com/PostList.naver?blogId=travel", &e),
///     Some("travel".to_string())
/// );
/// ```
pub fn blog_id_from_url(url: &str, endpoints: &Endpoints) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;

    if endpoints.is_desktop(&parsed) || endpoints.is_mobile(&parsed) {
        if let Some(first) = first_segment(&parsed) {
            if !first.contains('.') {
                return Some(first.to_string());
            }
        }
    }

    query_param(&parsed, "blogId")
}

/// Rewrites a desktop URL to its mobile form
///
/// Mobile URLs and URLs on foreign hosts are returned unchanged.
pub fn to_mobile(url: &str, endpoints: &Endpoints) -> String {
    let Ok(parsed) = Url::parse(url.trim()) else {
        return url.to_string();
    };

    if !endpoints.is_desktop(&parsed) || endpoints.is_mobile(&parsed) {
        return url.to_string();
    }

    let mobile_base = endpoints.mobile.as_str().trim_end_matches('/');
    let path = parsed.path().trim_matches('/');
    if let Some(first) = first_segment(&parsed) {
        if !first.contains('.') {
            return format!("{}/{}", mobile_base, path);
        }
    }

    match (
        query_param(&parsed, "blogId"),
        query_param(&parsed, "logNo"),
    ) {
        (Some(blog_id), Some(log_no)) => endpoints.mobile_post_url(&blog_id, &log_no),
        (Some(blog_id), None) => format!("{}/{}", mobile_base, blog_id),
        _ => url.to_string(),
    }
}

/// Returns a non-empty query parameter value
pub fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

fn first_segment(url: &Url) -> Option<&str> {
    url.path_segments()
        .and_then(|mut segments| segments.find(|s| !s.is_empty()))
}
