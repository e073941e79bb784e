//! Storage traits and error types
//!
//! This module defines the trait interface for post stores and the
//! associated error types.

use crate::crawler::{CrawlResult, CrawlWindow};
use crate::storage::{PersistedRecord, RunRecord, RunStatus};
use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Blog already registered: {0}")]
    DuplicateBlog(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for post store implementations
///
/// One store exists per blog target. The collection loop only ever calls
/// `exists_record` followed by `insert_record` for a candidate, strictly
/// sequentially, so implementations need no insert-side locking.
pub trait Storage {
    // ===== Dedup Gate =====

    /// Checks whether a post with this identity is already stored
    ///
    /// Identity is `(blog_name, title, date)`; content is not compared.
    fn exists_record(&self, blog_name: &str, title: &str, date: NaiveDate) -> StorageResult<bool>;

    /// Inserts a new post record
    fn insert_record(&mut self, record: &PersistedRecord) -> StorageResult<()>;

    // ===== Queries =====

    /// Posts dated within `window`, newest first
    ///
    /// When `keyword` is given, only posts whose title or content contains
    /// it are returned.
    fn query_posts(
        &self,
        window: &CrawlWindow,
        keyword: Option<&str>,
    ) -> StorageResult<Vec<PersistedRecord>>;

    /// Total number of stored posts
    fn count_posts(&self) -> StorageResult<u64>;

    /// Earliest and latest stored post dates
    fn post_date_range(&self) -> StorageResult<Option<(NaiveDate, NaiveDate)>>;

    // ===== Run Management =====

    /// Records the start of a collection run
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(
        &mut self,
        blog_name: &str,
        window: &CrawlWindow,
        config_hash: Option<&str>,
    ) -> StorageResult<i64>;

    /// Records how a run ended
    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        result: &CrawlResult,
    ) -> StorageResult<()>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Gets the most recent runs, newest first
    fn list_runs(&self, limit: usize) -> StorageResult<Vec<RunRecord>>;
}
