//! Blog-Gleaner: a polite, date-windowed blog post collector
//!
//! This crate collects posts from a single blog platform within a
//! caller-specified date window. It discovers post links through several
//! fallback strategies, fetches pages behind a randomized politeness delay,
//! extracts title, date and body text, and stores each post once.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Blog-Gleaner operations
#[derive(Debug, Error)]
pub enum GleanerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Collection error: {0}")]
    Collect(#[from] crawler::CollectError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Invalid crawl window: {0}")]
    Window(#[from] crawler::WindowError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown blog: {0}")]
    UnknownBlog(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("No blog identifier in URL: {0}")]
    MissingBlogId(String),
}

/// Result type alias for Blog-Gleaner operations
pub type Result<T> = std::result::Result<T, GleanerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{
    collect, BlogTarget, CollectError, CollectHooks, CrawlResult, CrawlWindow, FnHooks,
};
pub use state::CollectionState;
pub use url::{blog_id_from_url, to_mobile};
