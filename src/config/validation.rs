use crate::config::types::{BlogEntry, Config, DiscoveryConfig, FetcherConfig};
use crate::url::{blog_id_from_url, Endpoints};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetcher_config(&config.fetcher)?;
    let endpoints = Endpoints::from_config(&config.endpoints)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid endpoint: {}", e)))?;
    validate_discovery_config(&config.discovery)?;
    validate_storage_config(config)?;
    validate_blogs(&config.blogs, &endpoints)?;
    Ok(())
}

/// Validates fetcher configuration
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.min_delay_ms > config.max_delay_ms {
        return Err(ConfigError::Validation(format!(
            "min_delay_ms ({}) must not exceed max_delay_ms ({})",
            config.min_delay_ms, config.max_delay_ms
        )));
    }

    if config.poll_interval_ms < 1 || config.poll_interval_ms > 100 {
        return Err(ConfigError::Validation(format!(
            "poll_interval_ms must be between 1 and 100, got {}",
            config.poll_interval_ms
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates discovery limits
fn validate_discovery_config(config: &DiscoveryConfig) -> Result<(), ConfigError> {
    if config.max_listing_pages < 1 || config.max_listing_pages > 10 {
        return Err(ConfigError::Validation(format!(
            "max_listing_pages must be between 1 and 10, got {}",
            config.max_listing_pages
        )));
    }
    Ok(())
}

/// Validates storage locations
fn validate_storage_config(config: &Config) -> Result<(), ConfigError> {
    if config.storage.data_dir.is_empty() {
        return Err(ConfigError::Validation(
            "data_dir cannot be empty".to_string(),
        ));
    }

    if config.storage.registry_path.is_empty() {
        return Err(ConfigError::Validation(
            "registry_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates registered blog entries
fn validate_blogs(blogs: &[BlogEntry], endpoints: &Endpoints) -> Result<(), ConfigError> {
    for entry in blogs {
        if entry.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "Blog '{}' must have a name",
                entry.url
            )));
        }

        let url = ::url::Url::parse(&entry.url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid blog URL '{}': {}", entry.url, e))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "Blog URL '{}' must use HTTP or HTTPS",
                entry.url
            )));
        }

        if blog_id_from_url(&entry.url, endpoints).is_none() {
            return Err(ConfigError::Validation(format!(
                "Blog URL '{}' does not name a blog",
                entry.url
            )));
        }
    }

    Ok(())
}
