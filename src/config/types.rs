use serde::Deserialize;

/// Main configuration structure for Blog-Gleaner
///
/// Every section has defaults, so an empty file is a valid configuration
/// targeting the production origin.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetcher: FetcherConfig,
    pub endpoints: EndpointConfig,
    pub discovery: DiscoveryConfig,
    pub collection: CollectionConfig,
    pub storage: StorageConfig,
    #[serde(rename = "blog")]
    pub blogs: Vec<BlogEntry>,
}

/// Outbound request behaviour
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FetcherConfig {
    /// Lower bound of the randomized pre-request delay (milliseconds)
    pub min_delay_ms: u64,

    /// Upper bound of the randomized pre-request delay (milliseconds)
    pub max_delay_ms: u64,

    /// Granularity at which delays poll the stop signal (milliseconds)
    pub poll_interval_ms: u64,

    /// Whole-request timeout (seconds)
    pub timeout_secs: u64,

    /// Browser user agent sent with every request
    pub user_agent: String,

    /// Referer header sent with every request
    pub referer: String,

    /// Accept-Language header sent with every request
    pub accept_language: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: 5_000,
            max_delay_ms: 20_000,
            poll_interval_ms: 100,
            timeout_secs: 15,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            referer: "https://blog.naver.com/".to_string(),
            accept_language: "ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7".to_string(),
        }
    }
}

/// Origin hosts used to address a blog's pages
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EndpointConfig {
    /// Desktop host, serving the framed homepage
    pub desktop_base: String,

    /// Mobile host, serving post pages and the paginated listing
    pub mobile_base: String,

    /// Syndication host, serving `<blogId>.xml`
    pub feed_base: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            desktop_base: "https://blog.naver.com".to_string(),
            mobile_base: "https://m.blog.naver.com".to_string(),
            feed_base: "https://rss.blog.naver.com".to_string(),
        }
    }
}

/// Link discovery limits
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DiscoveryConfig {
    /// Number of listing pages scanned when the homepage has no post links
    pub max_listing_pages: u32,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_listing_pages: 10,
        }
    }
}

/// When the orchestrator pauses between candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PostDelay {
    /// Pause only after a post was saved
    #[default]
    AfterSave,

    /// Pause after every candidate whose page was fetched
    AfterFetch,
}

/// Per-candidate loop behaviour
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CollectionConfig {
    pub post_delay: PostDelay,
}

/// Where collected posts and the blog registry live
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StorageConfig {
    /// Directory holding one `posts_<blogId>.db` per blog
    pub data_dir: String,

    /// SQLite file listing registered blogs
    pub registry_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: ".".to_string(),
            registry_path: "./data.db".to_string(),
        }
    }
}

/// A blog registered in the configuration file
#[derive(Debug, Clone, Deserialize)]
pub struct BlogEntry {
    pub name: String,
    pub url: String,
}
