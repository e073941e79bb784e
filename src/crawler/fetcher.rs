//! HTTP fetcher implementation
//!
//! This module handles every outbound request a collection run makes:
//! - Building the HTTP client with browser-like identity and a fixed timeout
//! - Sleeping a randomized, interruptible politeness delay before each GET
//! - Classifying non-2xx statuses and transport failures

use crate::config::FetcherConfig;
use crate::crawler::hooks::{log_debug, CollectHooks};
use crate::crawler::wait::{PolitenessDelay, WaitOutcome};
use reqwest::header::{ACCEPT_LANGUAGE, REFERER};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Failure of a single fetch
///
/// All variants are recoverable from the run's point of view: the current
/// candidate is skipped (or the discovery strategy falls through).
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: StatusCode },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("stopped before requesting {url}")]
    Cancelled { url: String },
}

impl FetchError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The fetcher configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use blog_gleaner::config::FetcherConfig;
/// use blog_gleaner::crawler::build_http_client;
///
/// let client = build_http_client(&FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Rate-limited GET with cooperative cancellation
pub struct PoliteFetcher {
    client: Client,
    delay: PolitenessDelay,
    referer: String,
    accept_language: String,
}

impl PoliteFetcher {
    pub fn new(config: &FetcherConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
            delay: PolitenessDelay::from_config(config),
            referer: config.referer.clone(),
            accept_language: config.accept_language.clone(),
        })
    }

    /// The delay shared with the orchestrator's between-candidate pause
    pub fn delay(&self) -> &PolitenessDelay {
        &self.delay
    }

    /// Fetches `url` and returns the response body
    ///
    /// # Request Flow
    ///
    /// 1. Sample a delay and sleep it in ticks, polling `hooks.should_stop`
    ///    - Stop observed → `FetchError::Cancelled`, no request issued
    /// 2. Send the GET with referer and accept-language headers
    /// 3. Non-2xx → `FetchError::Status`; transport failure or body read
    ///    failure → `FetchError::Transport`
    pub async fn fetch(&self, url: &str, hooks: &dyn CollectHooks) -> Result<String, FetchError> {
        let pause = self.delay.sample();
        log_debug(
            hooks,
            &format!("Delay {:.2}s before GET {}", pause.as_secs_f64(), url),
        );

        if self.delay.wait(pause, || hooks.should_stop()).await == WaitOutcome::Stopped {
            return Err(FetchError::Cancelled {
                url: url.to_string(),
            });
        }

        let response = self
            .client
            .get(url)
            .header(REFERER, self.referer.as_str())
            .header(ACCEPT_LANGUAGE, self.accept_language.as_str())
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        response.text().await.map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })
    }
}
