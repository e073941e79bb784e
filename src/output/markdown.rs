//! Markdown digest generation
//!
//! Renders stored posts as one markdown document, the plain-text form
//! handed to external readers and summarisers.

use crate::crawler::CrawlWindow;
use crate::output::OutputResult;
use crate::storage::PersistedRecord;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a markdown digest of `posts` to `output_path`
///
/// # Arguments
///
/// * `blog_name` - Heading of the digest
/// * `window` - Date range the posts were selected from
/// * `posts` - Posts in the order they should appear
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the digest
/// * `Err(OutputError)` - Failed to write the file
pub fn write_posts_digest(
    blog_name: &str,
    window: &CrawlWindow,
    posts: &[PersistedRecord],
    output_path: &Path,
) -> OutputResult<()> {
    let markdown = format_posts_digest(blog_name, window, posts);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats posts as a markdown digest
pub fn format_posts_digest(
    blog_name: &str,
    window: &CrawlWindow,
    posts: &[PersistedRecord],
) -> String {
    let mut md = String::new();

    md.push_str(&format!("# {}\n\n", blog_name));
    md.push_str(&format!(
        "- **Period**: {} to {}\n",
        window.start(),
        window.end()
    ));
    md.push_str(&format!("- **Posts**: {}\n\n", posts.len()));

    if posts.is_empty() {
        md.push_str("_No posts in this period._\n");
        return md;
    }

    for post in posts {
        let title = if post.title.trim().is_empty() {
            "(untitled)"
        } else {
            post.title.as_str()
        };
        md.push_str("---\n\n");
        md.push_str(&format!("## {}\n\n", title));
        md.push_str(&format!("- **Date**: {}\n", post.date));
        if !post.link.is_empty() {
            md.push_str(&format!("- **Link**: <{}>\n", post.link));
        }
        md.push('\n');
        md.push_str(post.content.trim_end());
        md.push_str("\n\n");
    }

    md
}
