//! Runner freeze/rescue state machine.
//!
//! ```text
//!            capture (tagger spends a charge)
//!   Active ------------------------------------> Frozen
//!     ^                                           |  ^
//!     |  rescue timer reaches threshold           |  | rescuer leaves range
//!     |                                  rescuer  |  | (timer discarded)
//!     +------------ BeingRescued <----- in range -+  |
//!                        |                           |
//!                        +---------------------------+
//! ```
//!
//! Freezing a runner that is already frozen (or being rescued) is a no-op.
//! The controller may also force a frozen runner back to active, which is
//! how the initial unfreeze at episode start works.
//!
//! Each runner also remembers whom it is currently rescuing, so a rescuer
//! can never run two rescues at once.

use serde::{Deserialize, Serialize};

use freezetag_types::{AgentId, RunnerPhase, unit_fraction};

use crate::error::AgentError;

/// Runner freeze state with the rescue timer held inside the variant that
/// uses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RescueState {
    /// Free to move.
    Active,
    /// Frozen with nobody rescuing.
    Frozen,
    /// Frozen with exactly one rescuer in range.
    BeingRescued {
        /// The teammate doing the rescue.
        rescuer: AgentId,
        /// Continuous proximity so far.
        elapsed_ms: u64,
    },
}

/// Result of a freeze attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreezeOutcome {
    /// The runner went from active to frozen.
    Frozen {
        /// How long the runner had been active.
        survived_ms: u64,
        /// The runner this one was rescuing, if any. That rescue can no
        /// longer continue and must be cancelled.
        abandoned: Option<AgentId>,
    },
    /// The runner was already frozen; nothing changed.
    AlreadyFrozen,
}

/// Result of advancing a rescue timer by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RescueProgress {
    /// No rescue is running.
    Idle,
    /// Still below the threshold.
    InProgress {
        /// The rescuer.
        rescuer: AgentId,
        /// Continuous proximity so far.
        elapsed_ms: u64,
    },
    /// The threshold was reached and the runner is active again.
    Completed {
        /// The rescuer.
        rescuer: AgentId,
        /// How long the runner had been frozen.
        frozen_ms: u64,
    },
}

/// Per-runner state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerState {
    rescue: RescueState,
    /// The frozen teammate this runner is rescuing, if any.
    rescuing: Option<AgentId>,
    /// Episode time at which the runner last became active.
    active_since_ms: u64,
    /// Episode time at which the runner last became frozen.
    frozen_since_ms: u64,
}

impl RunnerState {
    /// A runner as spawned at reset: frozen, waiting to be selected for the
    /// initial unfreeze.
    pub const fn spawned(now_ms: u64) -> Self {
        Self {
            rescue: RescueState::Frozen,
            rescuing: None,
            active_since_ms: now_ms,
            frozen_since_ms: now_ms,
        }
    }

    /// Observable phase.
    pub const fn phase(&self) -> RunnerPhase {
        match self.rescue {
            RescueState::Active => RunnerPhase::Active,
            RescueState::Frozen => RunnerPhase::Frozen,
            RescueState::BeingRescued { .. } => RunnerPhase::BeingRescued,
        }
    }

    /// Frozen or being rescued.
    pub const fn is_frozen(&self) -> bool {
        self.phase().is_frozen()
    }

    /// The current rescuer, if being rescued.
    pub const fn rescuer(&self) -> Option<AgentId> {
        match self.rescue {
            RescueState::BeingRescued { rescuer, .. } => Some(rescuer),
            RescueState::Active | RescueState::Frozen => None,
        }
    }

    /// The teammate this runner is rescuing, if any.
    pub const fn rescuing(&self) -> Option<AgentId> {
        self.rescuing
    }

    pub(crate) const fn set_rescuing(&mut self, target: Option<AgentId>) {
        self.rescuing = target;
    }

    /// Rescue timer so far, zero unless being rescued.
    pub const fn rescue_elapsed_ms(&self) -> u64 {
        match self.rescue {
            RescueState::BeingRescued { elapsed_ms, .. } => elapsed_ms,
            RescueState::Active | RescueState::Frozen => 0,
        }
    }

    /// Rescue progress as a fraction of `threshold_ms`, in `[0, 1]`.
    pub fn rescue_progress(&self, threshold_ms: u64) -> f64 {
        unit_fraction(self.rescue_elapsed_ms(), threshold_ms)
    }

    /// Freeze the runner. A no-op if it is already frozen.
    pub fn freeze(&mut self, now_ms: u64) -> FreezeOutcome {
        match self.rescue {
            RescueState::Active => {
                self.rescue = RescueState::Frozen;
                self.frozen_since_ms = now_ms;
                FreezeOutcome::Frozen {
                    survived_ms: now_ms.saturating_sub(self.active_since_ms),
                    abandoned: self.rescuing.take(),
                }
            }
            RescueState::Frozen | RescueState::BeingRescued { .. } => FreezeOutcome::AlreadyFrozen,
        }
    }

    /// Start a rescue by `rescuer`. Only a frozen runner with no rescuer
    /// can start one, and a runner cannot rescue itself (`me`).
    ///
    /// Returns whether the rescue started.
    pub fn begin_rescue(&mut self, me: AgentId, rescuer: AgentId) -> bool {
        if me == rescuer {
            return false;
        }
        match self.rescue {
            RescueState::Frozen => {
                self.rescue = RescueState::BeingRescued {
                    rescuer,
                    elapsed_ms: 0,
                };
                true
            }
            RescueState::Active | RescueState::BeingRescued { .. } => false,
        }
    }

    /// Abandon the rescue in progress. The runner returns to plain frozen
    /// and the timer is discarded.
    ///
    /// Returns the rescuer whose attempt was cancelled.
    pub fn cancel_rescue(&mut self) -> Option<AgentId> {
        let rescuer = self.rescuer()?;
        self.rescue = RescueState::Frozen;
        Some(rescuer)
    }

    /// Advance the rescue timer by `dt_ms`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ArithmeticOverflow`] if the timer overflows.
    pub fn advance_rescue(
        &mut self,
        dt_ms: u64,
        threshold_ms: u64,
        now_ms: u64,
    ) -> Result<RescueProgress, AgentError> {
        let RescueState::BeingRescued {
            rescuer,
            elapsed_ms,
        } = self.rescue
        else {
            return Ok(RescueProgress::Idle);
        };

        let elapsed_ms = elapsed_ms
            .checked_add(dt_ms)
            .ok_or(AgentError::ArithmeticOverflow {
                context: "rescue timer",
            })?;

        if elapsed_ms >= threshold_ms {
            self.rescue = RescueState::Active;
            self.active_since_ms = now_ms;
            return Ok(RescueProgress::Completed {
                rescuer,
                frozen_ms: now_ms.saturating_sub(self.frozen_since_ms),
            });
        }

        self.rescue = RescueState::BeingRescued {
            rescuer,
            elapsed_ms,
        };
        Ok(RescueProgress::InProgress {
            rescuer,
            elapsed_ms,
        })
    }

    /// Make the runner active regardless of its state.
    ///
    /// Returns the rescuer whose attempt was cut short, if one was running.
    pub fn force_activate(&mut self, now_ms: u64) -> Option<AgentId> {
        let cut_short = self.rescuer();
        if self.is_frozen() {
            self.rescue = RescueState::Active;
            self.active_since_ms = now_ms;
        }
        cut_short
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const ME: AgentId = AgentId(1);
    const MATE: AgentId = AgentId(2);

    fn active() -> RunnerState {
        let mut runner = RunnerState::spawned(0);
        runner.force_activate(0);
        runner
    }

    #[test]
    fn spawns_frozen() {
        let runner = RunnerState::spawned(0);
        assert_eq!(runner.phase(), RunnerPhase::Frozen);
        assert_eq!(runner.rescuer(), None);
    }

    #[test]
    fn freeze_reports_survival_time() {
        let mut runner = RunnerState::spawned(0);
        runner.force_activate(1000);
        assert_eq!(
            runner.freeze(4500),
            FreezeOutcome::Frozen {
                survived_ms: 3500,
                abandoned: None
            }
        );
        assert_eq!(runner.phase(), RunnerPhase::Frozen);
    }

    #[test]
    fn freeze_is_idempotent() {
        let mut runner = active();
        runner.freeze(10);
        let before = runner.clone();
        assert_eq!(runner.freeze(20), FreezeOutcome::AlreadyFrozen);
        assert_eq!(runner, before);

        runner.begin_rescue(ME, MATE);
        let before = runner.clone();
        assert_eq!(runner.freeze(30), FreezeOutcome::AlreadyFrozen);
        assert_eq!(runner, before);
    }

    #[test]
    fn freezing_a_rescuer_abandons_its_target() {
        let mut runner = active();
        runner.set_rescuing(Some(MATE));
        assert_eq!(
            runner.freeze(5),
            FreezeOutcome::Frozen {
                survived_ms: 5,
                abandoned: Some(MATE)
            }
        );
        assert_eq!(runner.rescuing(), None);
    }

    #[test]
    fn cannot_rescue_self_or_active_runner() {
        let mut frozen = RunnerState::spawned(0);
        assert!(!frozen.begin_rescue(ME, ME));
        assert_eq!(frozen.phase(), RunnerPhase::Frozen);

        let mut runner = active();
        assert!(!runner.begin_rescue(ME, MATE));
        assert_eq!(runner.phase(), RunnerPhase::Active);
    }

    #[test]
    fn second_rescuer_is_rejected() {
        let mut runner = RunnerState::spawned(0);
        assert!(runner.begin_rescue(ME, MATE));
        assert!(!runner.begin_rescue(ME, AgentId(3)));
        assert_eq!(runner.rescuer(), Some(MATE));
    }

    #[test]
    fn cancel_returns_to_plain_frozen() {
        let mut runner = RunnerState::spawned(0);
        let frozen = runner.clone();
        runner.begin_rescue(ME, MATE);
        runner.advance_rescue(1000, 5000, 1000).unwrap();
        assert_eq!(runner.rescue_elapsed_ms(), 1000);

        assert_eq!(runner.cancel_rescue(), Some(MATE));
        assert_eq!(runner, frozen);
        assert_eq!(runner.rescue_elapsed_ms(), 0);
        assert_eq!(runner.cancel_rescue(), None);
    }

    #[test]
    fn rescue_completes_at_threshold() {
        let mut runner = RunnerState::spawned(0);
        runner.begin_rescue(ME, MATE);
        let mut now = 0;
        let mut last = RescueProgress::Idle;
        for _ in 0..250 {
            now += 20;
            last = runner.advance_rescue(20, 5000, now).unwrap();
        }
        assert_eq!(
            last,
            RescueProgress::Completed {
                rescuer: MATE,
                frozen_ms: 5000
            }
        );
        assert_eq!(runner.phase(), RunnerPhase::Active);
        assert_eq!(
            runner.advance_rescue(20, 5000, now).unwrap(),
            RescueProgress::Idle
        );
    }

    #[test]
    fn progress_fraction() {
        let mut runner = RunnerState::spawned(0);
        runner.begin_rescue(ME, MATE);
        runner.advance_rescue(2500, 5000, 2500).unwrap();
        assert!((runner.rescue_progress(5000) - 0.5).abs() < 1e-12);
    }
}
