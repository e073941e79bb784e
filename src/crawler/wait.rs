//! Interruptible waiting
//!
//! Both the pre-request delay and the orchestrator's between-candidate
//! pause go through [`interruptible_wait`], which sleeps in short ticks and
//! polls the stop probe between them.

use crate::config::FetcherConfig;
use rand::Rng;
use std::time::Duration;
use tokio::time::Instant;

/// Longest tick between two stop-probe checks
pub const MAX_TICK: Duration = Duration::from_millis(100);

/// How a wait ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Elapsed,
    Stopped,
}

/// Sleeps for `duration`, checking `should_stop` at least every `tick`
///
/// The probe is checked once before sleeping, so a stop raised earlier
/// returns immediately. `tick` is clamped to `1ms..=MAX_TICK`.
pub async fn interruptible_wait<F>(duration: Duration, tick: Duration, should_stop: F) -> WaitOutcome
where
    F: Fn() -> bool,
{
    let tick = tick.clamp(Duration::from_millis(1), MAX_TICK);
    let deadline = Instant::now() + duration;

    loop {
        if should_stop() {
            return WaitOutcome::Stopped;
        }
        let now = Instant::now();
        if now >= deadline {
            return WaitOutcome::Elapsed;
        }
        tokio::time::sleep(tick.min(deadline - now)).await;
    }
}

/// Randomized politeness delay
#[derive(Debug, Clone)]
pub struct PolitenessDelay {
    min_ms: u64,
    max_ms: u64,
    tick: Duration,
}

impl PolitenessDelay {
    pub fn new(min_ms: u64, max_ms: u64, tick: Duration) -> Self {
        Self {
            min_ms: min_ms.min(max_ms),
            max_ms: max_ms.max(min_ms),
            tick,
        }
    }

    pub fn from_config(config: &FetcherConfig) -> Self {
        Self::new(
            config.min_delay_ms,
            config.max_delay_ms,
            Duration::from_millis(config.poll_interval_ms),
        )
    }

    /// Draws a duration uniformly from `[min, max]`
    pub fn sample(&self) -> Duration {
        Duration::from_millis(rand::rng().random_range(self.min_ms..=self.max_ms))
    }

    /// Waits for an already sampled duration
    pub async fn wait<F>(&self, duration: Duration, should_stop: F) -> WaitOutcome
    where
        F: Fn() -> bool,
    {
        interruptible_wait(duration, self.tick, should_stop).await
    }
}
