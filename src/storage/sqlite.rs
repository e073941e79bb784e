//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::crawler::{CrawlResult, CrawlWindow};
use crate::storage::schema::initialize_posts_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{PersistedRecord, RunRecord, RunStatus};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const RUN_COLUMNS: &str = "id, blog_name, started_at, finished_at, window_start, window_end,
     config_hash, status, total_candidates, saved, duplicates";

/// SQLite post store for a single blog
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens or creates a post store
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_posts_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_posts_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    raw.parse::<NaiveDate>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    raw.parse::<DateTime<Utc>>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<PersistedRecord> {
    Ok(PersistedRecord {
        blog_name: row.get(0)?,
        title: row.get(1)?,
        date: date_column(row, 2)?,
        content: row.get(3)?,
        link: row.get(4)?,
        created_at: timestamp_column(row, 5)?,
    })
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        blog_name: row.get(1)?,
        started_at: row.get(2)?,
        finished_at: row.get(3)?,
        window_start: row.get(4)?,
        window_end: row.get(5)?,
        config_hash: row.get(6)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(7)?).unwrap_or(RunStatus::Failed),
        total_candidates: row.get::<_, i64>(8)? as u64,
        saved: row.get::<_, i64>(9)? as u64,
        duplicates: row.get::<_, i64>(10)? as u64,
    })
}

impl Storage for SqliteStorage {
    // ===== Dedup Gate =====

    fn exists_record(&self, blog_name: &str, title: &str, date: NaiveDate) -> StorageResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM posts WHERE blog_name = ?1 AND title = ?2 AND date = ?3 LIMIT 1",
                params![blog_name, title, date.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn insert_record(&mut self, record: &PersistedRecord) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO posts (blog_name, title, date, content, link, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.blog_name,
                record.title,
                record.date.to_string(),
                record.content,
                record.link,
                record.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    // ===== Queries =====

    fn query_posts(
        &self,
        window: &CrawlWindow,
        keyword: Option<&str>,
    ) -> StorageResult<Vec<PersistedRecord>> {
        let keyword = keyword.map(str::trim).filter(|k| !k.is_empty());

        let mut sql = String::from(
            "SELECT blog_name, title, date, content, link, created_at FROM posts
             WHERE date BETWEEN ?1 AND ?2",
        );
        if keyword.is_some() {
            sql.push_str(" AND (title LIKE ?3 OR content LIKE ?3)");
        }
        sql.push_str(" ORDER BY date DESC, created_at DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let start = window.start().to_string();
        let end = window.end().to_string();

        let posts = match keyword {
            Some(kw) => {
                let like = format!("%{}%", kw);
                stmt.query_map(params![start, end, like], post_from_row)?
                    .collect::<Result<Vec<_>, _>>()?
            }
            None => stmt
                .query_map(params![start, end], post_from_row)?
                .collect::<Result<Vec<_>, _>>()?,
        };

        Ok(posts)
    }

    fn count_posts(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn post_date_range(&self) -> StorageResult<Option<(NaiveDate, NaiveDate)>> {
        let range: (Option<String>, Option<String>) = self.conn.query_row(
            "SELECT MIN(date), MAX(date) FROM posts",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(match range {
            (Some(min), Some(max)) => match (min.parse(), max.parse()) {
                (Ok(min), Ok(max)) => Some((min, max)),
                _ => None,
            },
            _ => None,
        })
    }

    // ===== Run Management =====

    fn create_run(
        &mut self,
        blog_name: &str,
        window: &CrawlWindow,
        config_hash: Option<&str>,
    ) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (blog_name, started_at, window_start, window_end, config_hash, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                blog_name,
                now,
                window.start().to_string(),
                window.end().to_string(),
                config_hash,
                RunStatus::Running.to_db_string()
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        result: &CrawlResult,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, total_candidates = ?3,
             saved = ?4, duplicates = ?5 WHERE id = ?6",
            params![
                status.to_db_string(),
                now,
                result.total_candidates as i64,
                result.saved as i64,
                result.duplicates as i64,
                run_id
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        let sql = format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS);
        self.conn
            .query_row(&sql, params![run_id], run_from_row)
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let sql = format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS);
        let run = self.conn.query_row(&sql, [], run_from_row).optional()?;
        Ok(run)
    }

    fn list_runs(&self, limit: usize) -> StorageResult<Vec<RunRecord>> {
        let sql = format!("SELECT {} FROM runs ORDER BY id DESC LIMIT ?1", RUN_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let runs = stmt
            .query_map(params![limit as i64], run_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(runs)
    }
}
