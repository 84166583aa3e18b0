//! Shared run-control state for the training loop.
//!
//! The loop and whoever supervises it (a signal handler, a test) share a
//! [`TrainingControl`] behind an [`Arc`](std::sync::Arc). The stop flag is
//! atomic so the loop reads it without locking.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};

/// Why the training loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingEndReason {
    /// The configured number of episodes finished.
    EpisodeLimitReached,
    /// A stop was requested.
    StopRequested,
}

/// Stop, pacing, and episode-limit controls for a training run.
#[derive(Debug)]
pub struct TrainingControl {
    /// Whether a stop has been requested.
    stop_requested: AtomicBool,
    /// Real-time sleep between ticks in milliseconds.
    tick_interval_ms: u64,
    /// Episodes to finish before stopping (0 = unlimited).
    max_episodes: u64,
    /// Wall-clock start of the run.
    started_at: DateTime<Utc>,
}

impl TrainingControl {
    /// Create control state for a run.
    pub fn new(tick_interval_ms: u64, max_episodes: u64) -> Self {
        Self {
            stop_requested: AtomicBool::new(false),
            tick_interval_ms,
            max_episodes,
            started_at: Utc::now(),
        }
    }

    // -----------------------------------------------------------------------
    // Stop
    // -----------------------------------------------------------------------

    /// Request a clean stop. The loop returns before its next tick.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
    }

    /// Whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    // -----------------------------------------------------------------------
    // Pacing and limits
    // -----------------------------------------------------------------------

    /// Real-time sleep between ticks.
    pub const fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms
    }

    /// Configured episode limit (0 = unlimited).
    pub const fn max_episodes(&self) -> u64 {
        self.max_episodes
    }

    /// Whether `completed` episodes satisfy the limit.
    pub const fn episode_limit_reached(&self, completed: u64) -> bool {
        self.max_episodes > 0 && completed >= self.max_episodes
    }

    /// Wall-clock seconds since the control state was created.
    pub fn elapsed_seconds(&self) -> u64 {
        let elapsed = Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds();
        u64::try_from(elapsed.max(0)).unwrap_or(u64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn episode_limit_zero_is_unlimited() {
        let control = TrainingControl::new(0, 0);
        assert!(!control.episode_limit_reached(u64::MAX));

        let control = TrainingControl::new(0, 3);
        assert!(!control.episode_limit_reached(2));
        assert!(control.episode_limit_reached(3));
    }

    #[test]
    fn stop_request_is_visible_through_shared_handle() {
        let control = Arc::new(TrainingControl::new(10, 0));
        let supervisor = Arc::clone(&control);
        assert!(!control.is_stop_requested());

        supervisor.request_stop();
        assert!(control.is_stop_requested());
        assert_eq!(control.tick_interval_ms(), 10);
    }
}
