//! Collection coordinator - orchestrates a single `collect` run
//!
//! This module composes discovery, planning, fetching, extraction and the
//! dedup gate into one strictly sequential run:
//! - Recording the run in the post store
//! - Driving the `CollectionState` machine
//! - Reporting progress and log lines to the caller
//! - Honouring the stop probe between candidates and during delays

use crate::config::{Config, PostDelay};
use crate::crawler::discovery::{Discoverer, DiscoveryError};
use crate::crawler::extractor::extract;
use crate::crawler::fetcher::PoliteFetcher;
use crate::crawler::gate::{accept, GateDecision};
use crate::crawler::hooks::{log_debug, log_error, log_info, log_warn, CollectHooks};
use crate::crawler::planner::plan;
use crate::crawler::types::{BlogTarget, CrawlResult, CrawlWindow, PostCandidate};
use crate::crawler::wait::WaitOutcome;
use crate::crawler::CollectError;
use crate::state::CollectionState;
use crate::storage::{RunStatus, Storage};
use crate::url::Endpoints;
use crate::GleanerError;

/// Main collection coordinator structure
///
/// Holds the HTTP session and parsed endpoints; one coordinator may run
/// any number of `collect` calls, one after another.
pub struct Coordinator {
    config: Config,
    endpoints: Endpoints,
    fetcher: PoliteFetcher,
    config_hash: Option<String>,
}

/// How the per-candidate loop ended
enum LoopEnd {
    Completed,
    Cancelled,
}

/// Tracks the current state of one run
struct StateTracker {
    state: CollectionState,
}

impl StateTracker {
    fn new() -> Self {
        Self {
            state: CollectionState::Idle,
        }
    }

    fn enter(&mut self, next: CollectionState) {
        if !self.state.can_transition_to(next) {
            tracing::warn!("Unexpected state transition {} -> {}", self.state, next);
        }
        tracing::trace!("State {} -> {}", self.state, next);
        self.state = next;
    }
}

/// Integer progress before candidate `index` (0-based)
fn percent(index: usize, total: usize) -> u8 {
    (index * 100 / total.max(1)).min(100) as u8
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Endpoints parsed and HTTP client built
    /// * `Err(GleanerError)` - Invalid endpoint base or client setup failure
    pub fn new(config: Config) -> Result<Self, GleanerError> {
        let endpoints = Endpoints::from_config(&config.endpoints)?;
        let fetcher = PoliteFetcher::new(&config.fetcher)?;

        Ok(Self {
            config,
            endpoints,
            fetcher,
            config_hash: None,
        })
    }

    /// Records `hash` on every run this coordinator starts
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Collects posts of `target` dated within `window` into `store`
    ///
    /// Per-candidate failures are absorbed as skips. Only an empty-handed
    /// discovery and store failures are errors; a stop request is a normal
    /// result with `cancelled` set.
    pub async fn collect<S: Storage + ?Sized>(
        &self,
        store: &mut S,
        target: &BlogTarget,
        window: &CrawlWindow,
        hooks: &dyn CollectHooks,
    ) -> Result<CrawlResult, CollectError> {
        let run_id = store.create_run(&target.name, window, self.config_hash.as_deref())?;
        let mut tracker = StateTracker::new();
        let mut result = CrawlResult::default();

        tracker.enter(CollectionState::Discovering);
        log_info(
            hooks,
            &format!(
                "Collecting {} ({}) from {} to {}",
                target.name,
                target.url,
                window.start(),
                window.end()
            ),
        );

        let discoverer = Discoverer::new(
            &self.fetcher,
            &self.endpoints,
            self.config.discovery.max_listing_pages,
        );
        let discovery = match discoverer.discover(target, hooks).await {
            Ok(discovery) => discovery,
            Err(DiscoveryError::Cancelled) => {
                tracker.enter(CollectionState::Cancelled);
                log_info(hooks, "Cancelled by user");
                result.cancelled = true;
                hooks.on_progress(100);
                store.finish_run(run_id, RunStatus::Cancelled, &result)?;
                return Ok(result);
            }
            Err(DiscoveryError::NoPageRetrieved { url }) => {
                tracker.enter(CollectionState::Fatal);
                log_error(hooks, &format!("Fatal: no page could be retrieved for {}", url));
                if let Err(finish_err) = store.finish_run(run_id, RunStatus::Failed, &result) {
                    tracing::error!("Could not record failed run {}: {}", run_id, finish_err);
                }
                return Err(CollectError::NoPageRetrieved { url });
            }
        };
        log_debug(
            hooks,
            &format!(
                "Discovered {} candidates from {:?} ({} pages retrieved)",
                discovery.candidates.len(),
                discovery.source,
                discovery.pages_retrieved
            ),
        );

        tracker.enter(CollectionState::Planning);
        let planned = plan(discovery.candidates, window);
        if planned.stopped_early {
            log_debug(
                hooks,
                &format!("Stopped planning after {} candidates", planned.examined),
            );
        }
        let total = planned.candidates.len();
        result.total_candidates = total as u64;
        log_info(hooks, &format!("Found {} post links", total));

        let end = match self
            .run_candidates(store, target, window, planned.candidates, hooks, &mut tracker, &mut result)
            .await
        {
            Ok(end) => end,
            Err(e) => {
                tracker.enter(CollectionState::Fatal);
                log_error(hooks, &format!("Fatal: {}", e));
                if let Err(finish_err) = store.finish_run(run_id, RunStatus::Failed, &result) {
                    tracing::error!("Could not record failed run {}: {}", run_id, finish_err);
                }
                return Err(e);
            }
        };

        let status = match end {
            LoopEnd::Completed => {
                tracker.enter(CollectionState::Done);
                RunStatus::Completed
            }
            LoopEnd::Cancelled => {
                tracker.enter(CollectionState::Cancelled);
                result.cancelled = true;
                RunStatus::Cancelled
            }
        };

        hooks.on_progress(100);
        store.finish_run(run_id, status, &result)?;
        log_info(
            hooks,
            &format!(
                "Finished {}: {} saved, {} duplicates, {} skipped of {}",
                status, result.saved, result.duplicates, result.skipped, result.total_candidates
            ),
        );

        Ok(result)
    }

    #[allow(clippy::too_many_arguments)]
    async fn run_candidates<S: Storage + ?Sized>(
        &self,
        store: &mut S,
        target: &BlogTarget,
        window: &CrawlWindow,
        candidates: Vec<PostCandidate>,
        hooks: &dyn CollectHooks,
        tracker: &mut StateTracker,
        result: &mut CrawlResult,
    ) -> Result<LoopEnd, CollectError> {
        let total = candidates.len();

        for (i, candidate) in candidates.iter().enumerate() {
            if hooks.should_stop() {
                log_info(hooks, "Cancelled by user");
                return Ok(LoopEnd::Cancelled);
            }
            hooks.on_progress(percent(i, total));

            tracker.enter(CollectionState::Fetching);
            log_info(
                hooks,
                &format!("Processing [{}/{}] {}", i + 1, total, candidate.link),
            );

            let html = match self.fetcher.fetch(&candidate.link, hooks).await {
                Ok(html) => html,
                Err(e) if e.is_cancelled() => {
                    log_info(hooks, "Cancelled by user");
                    return Ok(LoopEnd::Cancelled);
                }
                Err(e) => {
                    log_warn(hooks, &format!("Skip: {}", e));
                    result.skipped += 1;
                    continue;
                }
            };

            tracker.enter(CollectionState::Extracting);
            let post = match extract(&html).resolve(candidate) {
                Ok(post) if window.contains(post.date) => post,
                Ok(post) => {
                    log_info(hooks, &format!("Skip: {} out of range", post.date));
                    result.skipped += 1;
                    if self.pause_after(false, hooks).await == WaitOutcome::Stopped {
                        return Ok(LoopEnd::Cancelled);
                    }
                    continue;
                }
                Err(_) => {
                    log_info(hooks, "Skip: date parse failed");
                    result.skipped += 1;
                    if self.pause_after(false, hooks).await == WaitOutcome::Stopped {
                        return Ok(LoopEnd::Cancelled);
                    }
                    continue;
                }
            };

            tracker.enter(CollectionState::Gating);
            let saved = match accept(store, &target.name, &post)? {
                GateDecision::Saved => {
                    result.saved += 1;
                    log_info(hooks, &format!("Saved: {} ({})", post.title, post.date));
                    true
                }
                GateDecision::Duplicate => {
                    result.duplicates += 1;
                    log_info(hooks, "Skip duplicate (Same title & date)");
                    false
                }
            };

            if self.pause_after(saved, hooks).await == WaitOutcome::Stopped {
                return Ok(LoopEnd::Cancelled);
            }
        }

        Ok(LoopEnd::Completed)
    }

    /// Between-candidate pause after a fetched candidate
    ///
    /// `after-save` pauses only when the candidate was saved;
    /// `after-fetch` pauses after every fetched candidate.
    async fn pause_after(&self, saved: bool, hooks: &dyn CollectHooks) -> WaitOutcome {
        let due = match self.config.collection.post_delay {
            PostDelay::AfterSave => saved,
            PostDelay::AfterFetch => true,
        };
        if !due {
            return WaitOutcome::Elapsed;
        }

        let delay = self.fetcher.delay();
        let pause = delay.sample();
        log_debug(hooks, &format!("Sleep {:.2}s", pause.as_secs_f64()));

        let outcome = delay.wait(pause, || hooks.should_stop()).await;
        if outcome == WaitOutcome::Stopped {
            log_info(hooks, "Cancelled during sleep");
        }
        outcome
    }
}
