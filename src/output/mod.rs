//! Output module for reporting on collected posts
//!
//! This module handles:
//! - Per-blog statistics (stored posts, date range, recent runs)
//! - Markdown digests of the posts in a date window

mod markdown;
pub mod stats;

pub use markdown::{format_posts_digest, write_posts_digest};
pub use stats::{load_statistics, print_statistics, BlogStatistics};

use crate::storage::StorageError;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
