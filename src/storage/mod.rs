//! Storage module for persisting collected posts
//!
//! This module handles all database operations, including:
//! - One SQLite post store per blog (`posts_<blogId>.db`)
//! - The dedup identity check and post insertion
//! - Collection run tracking
//! - The registry of blogs a user has added

mod registry;
mod schema;
mod sqlite;
mod traits;

pub use registry::{BlogRecord, BlogRegistry};
pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::config::Config;
use crate::url::{blog_id_from_url, Endpoints};
use crate::GleanerError;
use chrono::{DateTime, NaiveDate, Utc};
use std::path::{Path, PathBuf};

/// Path of the post store for a blog URL
///
/// Blogs whose identifier cannot be derived share `posts_default.db`.
pub fn post_db_path(data_dir: &Path, blog_url: &str, endpoints: &Endpoints) -> PathBuf {
    let blog_id = blog_id_from_url(blog_url, endpoints).unwrap_or_else(|| "default".to_string());
    data_dir.join(format!("posts_{}.db", blog_id))
}

/// Opens (creating if needed) the post store for a blog URL
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully opened store
/// * `Err(GleanerError)` - Invalid endpoints, or the database could not be opened
pub fn open_storage_for(config: &Config, blog_url: &str) -> Result<SqliteStorage, GleanerError> {
    let endpoints = Endpoints::from_config(&config.endpoints)?;
    let data_dir = Path::new(&config.storage.data_dir);
    std::fs::create_dir_all(data_dir)?;
    let storage = SqliteStorage::new(&post_db_path(data_dir, blog_url, &endpoints))?;
    Ok(storage)
}

/// A stored post
///
/// Never mutated or deleted once inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedRecord {
    pub blog_name: String,
    pub title: String,
    pub date: NaiveDate,
    pub content: String,
    pub link: String,
    pub created_at: DateTime<Utc>,
}

/// Represents a collection run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub blog_name: String,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub window_start: String,
    pub window_end: String,
    pub config_hash: Option<String>,
    pub status: RunStatus,
    pub total_candidates: u64,
    pub saved: u64,
    pub duplicates: u64,
}

/// Status of a collection run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
