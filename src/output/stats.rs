//! Statistics generation from a post store
//!
//! This module provides functionality for extracting and displaying
//! per-blog collection statistics from the storage layer.

use crate::output::OutputResult;
use crate::storage::{RunRecord, Storage};
use chrono::NaiveDate;

/// Collection statistics for one blog
#[derive(Debug, Clone)]
pub struct BlogStatistics {
    pub blog_name: String,

    /// Number of stored posts
    pub total_posts: u64,

    /// Earliest and latest stored post dates
    pub date_range: Option<(NaiveDate, NaiveDate)>,

    /// Most recent runs, newest first
    pub recent_runs: Vec<RunRecord>,
}

impl BlogStatistics {
    /// Posts saved across the listed runs
    pub fn saved_in_recent_runs(&self) -> u64 {
        self.recent_runs.iter().map(|r| r.saved).sum()
    }
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The blog's post store
/// * `blog_name` - Display name of the blog
/// * `run_limit` - How many recent runs to include
///
/// # Returns
///
/// * `Ok(BlogStatistics)` - Successfully loaded statistics
/// * `Err(OutputError)` - Failed to query statistics
pub fn load_statistics(
    storage: &dyn Storage,
    blog_name: &str,
    run_limit: usize,
) -> OutputResult<BlogStatistics> {
    Ok(BlogStatistics {
        blog_name: blog_name.to_string(),
        total_posts: storage.count_posts()?,
        date_range: storage.post_date_range()?,
        recent_runs: storage.list_runs(run_limit)?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &BlogStatistics) {
    println!("=== {} ===\n", stats.blog_name);

    println!("Posts:");
    println!("  Stored: {}", stats.total_posts);
    match stats.date_range {
        Some((first, last)) => println!("  Dates: {} .. {}", first, last),
        None => println!("  Dates: -"),
    }
    println!();

    if stats.recent_runs.is_empty() {
        println!("No collection runs recorded");
        return;
    }

    println!("Recent Runs ({}):", stats.recent_runs.len());
    for run in &stats.recent_runs {
        println!(
            "  #{} {} [{} .. {}] {}: {} saved, {} duplicates of {}",
            run.id,
            run.started_at,
            run.window_start,
            run.window_end,
            run.status,
            run.saved,
            run.duplicates,
            run.total_candidates
        );
    }
    println!();

    println!(
        "Saved in listed runs: {}",
        stats.saved_in_recent_runs()
    );
}
