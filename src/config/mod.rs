//! Configuration module for Blog-Gleaner
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use blog_gleaner::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("gleaner.toml")).unwrap();
//! println!("Posts are stored under: {}", config.storage.data_dir);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BlogEntry, CollectionConfig, Config, DiscoveryConfig, EndpointConfig, FetcherConfig,
    PostDelay, StorageConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
