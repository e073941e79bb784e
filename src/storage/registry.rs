//! Registry of blogs added by the user

use crate::config::BlogEntry;
use crate::storage::schema::initialize_registry_schema;
use crate::storage::traits::{StorageError, StorageResult};
use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::path::Path;

/// A registered blog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogRecord {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub created_at: String,
}

/// SQLite-backed blog registry
pub struct BlogRegistry {
    conn: Connection,
}

fn blog_from_row(row: &Row<'_>) -> rusqlite::Result<BlogRecord> {
    Ok(BlogRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        url: row.get(2)?,
        created_at: row.get(3)?,
    })
}

impl BlogRegistry {
    /// Opens or creates the registry database
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        initialize_registry_schema(&conn)?;
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_registry_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Registers a blog
    ///
    /// URLs are unique; registering the same URL twice yields
    /// `StorageError::DuplicateBlog`.
    pub fn add_blog(&mut self, name: &str, url: &str) -> StorageResult<i64> {
        let result = self.conn.execute(
            "INSERT INTO blogs (name, url, created_at) VALUES (?1, ?2, ?3)",
            params![name, url, Utc::now().to_rfc3339()],
        );

        match result {
            Ok(_) => Ok(self.conn.last_insert_rowid()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(StorageError::DuplicateBlog(url.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// All registered blogs, most recently added first
    pub fn list_blogs(&self) -> StorageResult<Vec<BlogRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, url, created_at FROM blogs ORDER BY id DESC")?;
        let blogs = stmt
            .query_map([], blog_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(blogs)
    }

    /// Looks a blog up by its exact URL, falling back to its name
    pub fn find_blog(&self, name_or_url: &str) -> StorageResult<Option<BlogRecord>> {
        let by_url = self
            .conn
            .query_row(
                "SELECT id, name, url, created_at FROM blogs WHERE url = ?1",
                params![name_or_url],
                blog_from_row,
            )
            .optional()?;
        if by_url.is_some() {
            return Ok(by_url);
        }

        let by_name = self
            .conn
            .query_row(
                "SELECT id, name, url, created_at FROM blogs WHERE name = ?1
                 ORDER BY id DESC LIMIT 1",
                params![name_or_url],
                blog_from_row,
            )
            .optional()?;
        Ok(by_name)
    }

    /// Registers config-declared blogs, ignoring URLs already present
    ///
    /// # Returns
    ///
    /// The number of newly registered blogs
    pub fn seed(&mut self, entries: &[BlogEntry]) -> StorageResult<usize> {
        let now = Utc::now().to_rfc3339();
        let mut added = 0;
        for entry in entries {
            added += self.conn.execute(
                "INSERT OR IGNORE INTO blogs (name, url, created_at) VALUES (?1, ?2, ?3)",
                params![entry.name, entry.url, now],
            )?;
        }
        Ok(added)
    }
}
