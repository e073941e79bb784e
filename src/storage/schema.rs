//! Database schema definitions
//!
//! Two kinds of SQLite files exist: one post store per blog, and a single
//! registry listing the blogs a user has added.

/// SQL schema for a per-blog post store
pub const POSTS_SCHEMA_SQL: &str = r#"
-- Collected posts; identity for dedup is (blog_name, title, date)
CREATE TABLE IF NOT EXISTS posts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    blog_name TEXT NOT NULL,
    title TEXT NOT NULL,
    date TEXT NOT NULL,
    content TEXT NOT NULL,
    link TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_posts_identity ON posts(blog_name, title, date);
CREATE INDEX IF NOT EXISTS idx_posts_date ON posts(date);

-- One row per collect call
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    blog_name TEXT NOT NULL,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    window_start TEXT NOT NULL,
    window_end TEXT NOT NULL,
    config_hash TEXT,
    status TEXT NOT NULL,
    total_candidates INTEGER NOT NULL DEFAULT 0,
    saved INTEGER NOT NULL DEFAULT 0,
    duplicates INTEGER NOT NULL DEFAULT 0
);
"#;

/// SQL schema for the blog registry
pub const REGISTRY_SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS blogs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    url TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL
);
"#;

/// Initializes the post store schema
pub fn initialize_posts_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(POSTS_SCHEMA_SQL)
}

/// Initializes the registry schema
pub fn initialize_registry_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(REGISTRY_SCHEMA_SQL)
}
