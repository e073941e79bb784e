//! Dedup gate in front of the post store

use crate::crawler::types::ExtractedPost;
use crate::storage::{PersistedRecord, Storage, StorageResult};
use chrono::Utc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Saved,
    Duplicate,
}

/// Stores `post` unless a post with the same blog, title and date exists
///
/// Content is never compared and an existing record is never overwritten.
/// Check-then-insert is safe because a run processes candidates one at a
/// time against a store owned by a single blog.
pub fn accept<S: Storage + ?Sized>(
    store: &mut S,
    blog_name: &str,
    post: &ExtractedPost,
) -> StorageResult<GateDecision> {
    if store.exists_record(blog_name, &post.title, post.date)? {
        return Ok(GateDecision::Duplicate);
    }

    store.insert_record(&PersistedRecord {
        blog_name: blog_name.to_string(),
        title: post.title.clone(),
        date: post.date,
        content: post.content.clone(),
        link: post.link.clone(),
        created_at: Utc::now(),
    })?;

    Ok(GateDecision::Saved)
}
