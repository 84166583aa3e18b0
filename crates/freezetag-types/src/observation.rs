//! Per-tick observation delivered to each enabled agent's policy.
//!
//! The observation is role-aware: runners see their own freeze and rescue
//! state, taggers see their charge count plus team-level signals. Both
//! variants are carried in one struct so a decision source can treat all
//! agents uniformly and flatten with [`Observation::to_vector`].

use serde::{Deserialize, Serialize};

use crate::enums::Role;

/// Everything a policy may read about its agent and the episode this tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Observation {
    /// The runner is frozen (including while being rescued).
    pub frozen: bool,
    /// A teammate is currently rescuing this runner.
    pub being_rescued: bool,
    /// Rescue progress in `[0, 1]`; zero unless being rescued.
    pub rescue_progress: f64,
    /// Freeze charges held (taggers only; zero for runners).
    pub charges: u32,
    /// Fraction of the time limit still remaining, in `[0, 1]`.
    pub time_remaining: f64,
    /// Fraction of runners currently frozen, in `[0, 1]`.
    pub percent_frozen: f64,
    /// How evenly charges are spread across taggers, in `[0, 1]`.
    pub charge_balance: f64,
}

impl Observation {
    /// Flatten into the fixed-order numeric vector a policy consumes.
    ///
    /// Runners: `[frozen, being_rescued, rescue_progress]`.
    /// Taggers: `[charges, time_remaining, percent_frozen, charge_balance]`.
    pub fn to_vector(&self, role: Role) -> Vec<f64> {
        match role {
            Role::Runner => vec![
                flag(self.frozen),
                flag(self.being_rescued),
                self.rescue_progress,
            ],
            Role::Tagger => vec![
                f64::from(self.charges),
                self.time_remaining,
                self.percent_frozen,
                self.charge_balance,
            ],
        }
    }
}

const fn flag(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}

/// `numerator / denominator` clamped to `[0, 1]`; zero when the
/// denominator is zero.
///
/// Inputs saturate at `u32::MAX` before conversion, which is ample for
/// millisecond durations and agent counts.
pub fn unit_fraction(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    let num = f64::from(u32::try_from(numerator).unwrap_or(u32::MAX));
    let den = f64::from(u32::try_from(denominator).unwrap_or(u32::MAX));
    (num / den).clamp(0.0, 1.0)
}
