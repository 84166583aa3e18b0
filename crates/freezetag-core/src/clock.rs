//! Episode clock and the one-shot timer used for the settle delay.
//!
//! The clock is the single source of truth for all temporal state. Time is
//! integer milliseconds advanced by a fixed step; nothing accumulates
//! floating-point error across thousands of episodes.
//!
//! Two timelines are tracked:
//!
//! - **Clock time** (`now_ms`) runs for the whole training run and drives
//!   the one-shot timer.
//! - **Episode time** (`elapsed_ms`) restarts at every reset and is what the
//!   time limit is compared against. It only advances while an episode is
//!   running.

use freezetag_types::unit_fraction;

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Tick counter or clock time would overflow.
    #[error("clock overflow: cannot advance beyond u64::MAX")]
    Overflow,

    /// Invalid time configuration (e.g. a zero-length tick).
    #[error("invalid time configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

/// Work the clock can be asked to perform later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledTask {
    /// Run the reset protocol.
    Reset,
}

/// A pending one-shot timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingTimer {
    due_ms: u64,
    task: ScheduledTask,
}

/// Fixed-step clock with at most one pending one-shot timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeClock {
    /// Global tick counter, monotonic across episodes.
    tick: u64,
    /// Length of one tick in milliseconds.
    tick_ms: u64,
    /// Clock time since the run started.
    now_ms: u64,
    /// Episode time since the last reset.
    elapsed_ms: u64,
    /// Episode time limit.
    time_limit_ms: u64,
    /// The one-shot timer, if armed.
    pending: Option<PendingTimer>,
}

impl EpisodeClock {
    /// Create a clock with the given tick length.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if `tick_ms` is zero.
    pub fn new(tick_ms: u64) -> Result<Self, ClockError> {
        if tick_ms == 0 {
            return Err(ClockError::InvalidConfig {
                reason: "tick_ms must be at least 1".to_owned(),
            });
        }
        Ok(Self {
            tick: 0,
            tick_ms,
            now_ms: 0,
            elapsed_ms: 0,
            time_limit_ms: 0,
            pending: None,
        })
    }

    /// Advance the tick counter and clock time by one step. Returns the new
    /// tick number. Episode time is advanced separately.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::Overflow`] if either counter would overflow.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        let tick = self.tick.checked_add(1).ok_or(ClockError::Overflow)?;
        let now_ms = self
            .now_ms
            .checked_add(self.tick_ms)
            .ok_or(ClockError::Overflow)?;
        self.tick = tick;
        self.now_ms = now_ms;
        Ok(tick)
    }

    /// Advance episode time by one step. Returns the new elapsed time.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::Overflow`] if elapsed time would overflow.
    pub fn advance_elapsed(&mut self) -> Result<u64, ClockError> {
        self.elapsed_ms = self
            .elapsed_ms
            .checked_add(self.tick_ms)
            .ok_or(ClockError::Overflow)?;
        Ok(self.elapsed_ms)
    }

    /// Begin a new episode: zero elapsed time and set the limit.
    pub const fn start_episode(&mut self, time_limit_ms: u64) {
        self.elapsed_ms = 0;
        self.time_limit_ms = time_limit_ms;
    }

    /// Current tick number.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Length of one tick in milliseconds.
    pub const fn tick_ms(&self) -> u64 {
        self.tick_ms
    }

    /// Clock time in milliseconds.
    pub const fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Episode time in milliseconds.
    pub const fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// Episode time limit in milliseconds.
    pub const fn time_limit_ms(&self) -> u64 {
        self.time_limit_ms
    }

    /// Whether episode time has reached the limit.
    pub const fn time_limit_reached(&self) -> bool {
        self.elapsed_ms >= self.time_limit_ms
    }

    /// Fraction of the time limit still remaining, in `[0, 1]`.
    pub fn normalized_time_remaining(&self) -> f64 {
        unit_fraction(
            self.time_limit_ms.saturating_sub(self.elapsed_ms),
            self.time_limit_ms,
        )
    }

    /// Arm the one-shot timer to fire `delay_ms` from now.
    ///
    /// Returns `false` without changing anything if a timer is already
    /// pending.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::Overflow`] if the due time would overflow.
    pub fn schedule_once(&mut self, delay_ms: u64, task: ScheduledTask) -> Result<bool, ClockError> {
        if self.pending.is_some() {
            return Ok(false);
        }
        let due_ms = self
            .now_ms
            .checked_add(delay_ms)
            .ok_or(ClockError::Overflow)?;
        self.pending = Some(PendingTimer { due_ms, task });
        Ok(true)
    }

    /// Whether a timer is armed.
    pub const fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Disarm and return the timer's task if it is due.
    pub fn take_due(&mut self) -> Option<ScheduledTask> {
        match self.pending {
            Some(timer) if timer.due_ms <= self.now_ms => {
                self.pending = None;
                Some(timer.task)
            }
            Some(_) | None => None,
        }
    }

    /// Disarm the timer without running it.
    pub const fn cancel_pending(&mut self) {
        self.pending = None;
    }
}
