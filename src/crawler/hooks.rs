//! Callbacks connecting a collection run to its caller
//!
//! The caller observes progress and log lines and may request a stop at any
//! time. Stopping is cooperative: the run checks `should_stop` before each
//! candidate and on every tick of its politeness delays.

/// Observer and stop probe for one `collect` call
pub trait CollectHooks: Send + Sync {
    /// Integer percentage, non-decreasing over a run and ending at 100
    fn on_progress(&self, _percent: u8) {}

    /// Human-facing status line
    fn on_log(&self, _message: &str) {}

    /// Returns true once the caller wants the run to stop
    fn should_stop(&self) -> bool {
        false
    }
}

/// Hooks that observe nothing and never stop
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl CollectHooks for NoopHooks {}

/// Hooks assembled from three closures
///
/// ```
/// use blog_gleaner::FnHooks;
/// use std::sync::atomic::{AtomicBool, Ordering};
///
/// let stop = AtomicBool::new(false);
/// let hooks = FnHooks::new(
///     |pct| println!("{}%", pct),
///     |line: &str| println!("{}", line),
///     || stop.load(Ordering::Relaxed),
/// );
/// # let _ = hooks;
/// ```
pub struct FnHooks<P, L, S> {
    progress: P,
    log: L,
    stop: S,
}

impl<P, L, S> FnHooks<P, L, S>
where
    P: Fn(u8) + Send + Sync,
    L: Fn(&str) + Send + Sync,
    S: Fn() -> bool + Send + Sync,
{
    pub fn new(progress: P, log: L, stop: S) -> Self {
        Self {
            progress,
            log,
            stop,
        }
    }
}

impl<P, L, S> CollectHooks for FnHooks<P, L, S>
where
    P: Fn(u8) + Send + Sync,
    L: Fn(&str) + Send + Sync,
    S: Fn() -> bool + Send + Sync,
{
    fn on_progress(&self, percent: u8) {
        (self.progress)(percent)
    }

    fn on_log(&self, message: &str) {
        (self.log)(message)
    }

    fn should_stop(&self) -> bool {
        (self.stop)()
    }
}

// Status lines go both to tracing and to the caller.

pub(crate) fn log_debug(hooks: &dyn CollectHooks, message: &str) {
    tracing::debug!("{}", message);
    hooks.on_log(message);
}

pub(crate) fn log_info(hooks: &dyn CollectHooks, message: &str) {
    tracing::info!("{}", message);
    hooks.on_log(message);
}

pub(crate) fn log_warn(hooks: &dyn CollectHooks, message: &str) {
    tracing::warn!("{}", message);
    hooks.on_log(message);
}

pub(crate) fn log_error(hooks: &dyn CollectHooks, message: &str) {
    tracing::error!("{}", message);
    hooks.on_log(message);
}
