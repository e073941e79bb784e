//! Blog-Gleaner main entry point
//!
//! This is the command-line interface for the Blog-Gleaner post collector.

use anyhow::{bail, Context};
use blog_gleaner::config::{load_config_with_hash, Config};
use blog_gleaner::crawler::{BlogTarget, CollectError, Coordinator, CrawlWindow, FnHooks};
use blog_gleaner::output::{load_statistics, print_statistics, write_posts_digest};
use blog_gleaner::storage::{open_storage_for, BlogRecord, BlogRegistry, Storage, StorageError};
use blog_gleaner::GleanerError;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Blog-Gleaner: a polite, date-windowed blog post collector
///
/// Collects the posts of registered blogs that fall within a date range,
/// pausing between requests and storing each post once.
#[derive(Parser, Debug)]
#[command(name = "blog-gleaner")]
#[command(version = "1.0.0")]
#[command(about = "A polite, date-windowed blog post collector", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register a blog
    AddBlog {
        /// Display name, used as the blog name of stored posts
        name: String,
        /// Blog homepage URL
        url: String,
    },

    /// List registered blogs
    Blogs,

    /// Collect posts published within a date range
    Collect {
        /// Blog name or URL; repeat for several (all registered blogs when omitted)
        #[arg(long = "blog", value_name = "NAME|URL")]
        blogs: Vec<String>,

        /// First day of the range (YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,

        /// Last day of the range, inclusive (YYYY-MM-DD)
        #[arg(long)]
        to: NaiveDate,
    },

    /// List stored posts of a blog
    Posts {
        #[arg(long, value_name = "NAME|URL")]
        blog: String,

        #[arg(long)]
        from: NaiveDate,

        #[arg(long)]
        to: NaiveDate,

        /// Only posts whose title or content contains this text
        #[arg(long)]
        keyword: Option<String>,
    },

    /// Show statistics for a blog
    Stats {
        #[arg(long, value_name = "NAME|URL")]
        blog: String,

        /// Number of recent runs to show
        #[arg(long, default_value_t = 10)]
        runs: usize,
    },

    /// Write stored posts of a blog to a markdown digest
    Export {
        #[arg(long, value_name = "NAME|URL")]
        blog: String,

        #[arg(long)]
        from: NaiveDate,

        #[arg(long)]
        to: NaiveDate,

        /// Destination markdown file
        #[arg(long, value_name = "FILE")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, Some(hash))
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            (Config::default(), None)
        }
    };

    let mut registry = BlogRegistry::new(Path::new(&config.storage.registry_path))
        .with_context(|| format!("Failed to open registry {}", config.storage.registry_path))?;
    let seeded = registry.seed(&config.blogs)?;
    if seeded > 0 {
        tracing::info!("Registered {} blogs from configuration", seeded);
    }

    match cli.command {
        Command::AddBlog { name, url } => handle_add_blog(&mut registry, &config, &name, &url),
        Command::Blogs => handle_blogs(&registry),
        Command::Collect { blogs, from, to } => {
            handle_collect(&registry, config, config_hash, &blogs, from, to).await
        }
        Command::Posts {
            blog,
            from,
            to,
            keyword,
        } => handle_posts(&registry, &config, &blog, from, to, keyword.as_deref()),
        Command::Stats { blog, runs } => handle_stats(&registry, &config, &blog, runs),
        Command::Export {
            blog,
            from,
            to,
            output,
        } => handle_export(&registry, &config, &blog, from, to, &output),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("blog_gleaner=info,warn"),
            1 => EnvFilter::new("blog_gleaner=debug,info"),
            2 => EnvFilter::new("blog_gleaner=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn resolve_blog(registry: &BlogRegistry, name_or_url: &str) -> anyhow::Result<BlogRecord> {
    registry
        .find_blog(name_or_url)?
        .ok_or_else(|| GleanerError::UnknownBlog(name_or_url.to_string()).into())
}

fn handle_add_blog(
    registry: &mut BlogRegistry,
    config: &Config,
    name: &str,
    url: &str,
) -> anyhow::Result<()> {
    let endpoints = blog_gleaner::url::Endpoints::from_config(&config.endpoints)?;
    let Some(blog_id) = blog_gleaner::blog_id_from_url(url, &endpoints) else {
        bail!("No blog identifier in {}", url);
    };

    match registry.add_blog(name, url) {
        Ok(id) => {
            println!("✓ Registered {} ({}) as #{}", name, blog_id, id);
            Ok(())
        }
        Err(StorageError::DuplicateBlog(url)) => {
            println!("Already registered: {}", url);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn handle_blogs(registry: &BlogRegistry) -> anyhow::Result<()> {
    let blogs = registry.list_blogs()?;
    if blogs.is_empty() {
        println!("No blogs registered. Use `blog-gleaner add-blog <NAME> <URL>`.");
        return Ok(());
    }

    println!("Registered Blogs ({}):", blogs.len());
    for blog in blogs {
        println!("  #{} {} - {} (added {})", blog.id, blog.name, blog.url, blog.created_at);
    }
    Ok(())
}

/// Handles the main collection operation
async fn handle_collect(
    registry: &BlogRegistry,
    config: Config,
    config_hash: Option<String>,
    selected: &[String],
    from: NaiveDate,
    to: NaiveDate,
) -> anyhow::Result<()> {
    let window = CrawlWindow::new(from, to)?;

    let blogs = if selected.is_empty() {
        registry.list_blogs()?
    } else {
        selected
            .iter()
            .map(|s| resolve_blog(registry, s))
            .collect::<anyhow::Result<Vec<_>>>()?
    };
    if blogs.is_empty() {
        bail!("No blogs to collect. Register one with `blog-gleaner add-blog`.");
    }

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, stopping after the current step");
                stop.store(true, Ordering::SeqCst);
            }
        });
    }

    let mut coordinator = Coordinator::new(config.clone())?;
    if let Some(hash) = config_hash {
        coordinator = coordinator.with_config_hash(hash);
    }

    let mut failures = 0;
    for blog in &blogs {
        if stop.load(Ordering::SeqCst) {
            break;
        }

        let target = BlogTarget::new(blog.name.as_str(), blog.url.as_str());
        let mut store = open_storage_for(&config, &target.url)?;

        let last_percent = AtomicU8::new(u8::MAX);
        let hooks = FnHooks::new(
            |percent| {
                if last_percent.swap(percent, Ordering::Relaxed) != percent {
                    eprintln!("[{:>3}%] {}", percent, target.name);
                }
            },
            |_: &str| {},
            || stop.load(Ordering::SeqCst),
        );

        match coordinator.collect(&mut store, &target, &window, &hooks).await {
            Ok(result) => {
                let status = if result.cancelled { "Cancelled" } else { "Done" };
                println!(
                    "{} {}: {} saved, {} duplicates, {} skipped of {} posts",
                    status,
                    target.name,
                    result.saved,
                    result.duplicates,
                    result.skipped,
                    result.total_candidates
                );
            }
            Err(CollectError::NoPageRetrieved { url }) => {
                failures += 1;
                eprintln!("✗ {}: no page could be retrieved from {}", target.name, url);
            }
            Err(e @ CollectError::Store(_)) => {
                failures += 1;
                eprintln!("✗ {}: {}", target.name, e);
            }
        }
    }

    if failures > 0 {
        bail!("{} of {} blogs failed", failures, blogs.len());
    }
    Ok(())
}

fn handle_posts(
    registry: &BlogRegistry,
    config: &Config,
    blog: &str,
    from: NaiveDate,
    to: NaiveDate,
    keyword: Option<&str>,
) -> anyhow::Result<()> {
    let blog = resolve_blog(registry, blog)?;
    let window = CrawlWindow::new(from, to)?;
    let storage = open_storage_for(config, &blog.url)?;

    let posts = storage.query_posts(&window, keyword)?;
    println!("{} posts in {} from {} to {}\n", posts.len(), blog.name, from, to);
    for post in posts {
        println!("{}  {}", post.date, post.title);
        println!("    {}", post.link);
    }
    Ok(())
}

/// Handles the stats command: shows statistics from a blog's post store
fn handle_stats(
    registry: &BlogRegistry,
    config: &Config,
    blog: &str,
    runs: usize,
) -> anyhow::Result<()> {
    let blog = resolve_blog(registry, blog)?;
    let storage = open_storage_for(config, &blog.url)?;

    let stats = load_statistics(&storage, &blog.name, runs)?;
    print_statistics(&stats);
    Ok(())
}

/// Handles the export command: writes a markdown digest
fn handle_export(
    registry: &BlogRegistry,
    config: &Config,
    blog: &str,
    from: NaiveDate,
    to: NaiveDate,
    output: &Path,
) -> anyhow::Result<()> {
    let blog = resolve_blog(registry, blog)?;
    let window = CrawlWindow::new(from, to)?;
    let storage = open_storage_for(config, &blog.url)?;

    let posts = storage.query_posts(&window, None)?;
    write_posts_digest(&blog.name, &window, &posts, output)?;

    println!(
        "✓ Exported {} posts to: {}",
        posts.len(),
        output.display()
    );
    Ok(())
}
