//! Tunable reward values and interaction rules.
//!
//! These structs are deserialised from the `rewards`, `rules`, and
//! `movement` sections of `freezetag-config.yaml`. Every field has a
//! default, so a partial section only overrides what it names.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Reward magnitudes. Rates are per simulated second; the rest are granted
/// once per triggering event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Per second while a runner is unfrozen (default: 0.01).
    pub survival_per_second: Decimal,
    /// Food collected by a runner (default: 0.2).
    pub food: Decimal,
    /// Per second for a rescuer while the rescue progresses (default: 0.025).
    pub rescue_progress_per_second: Decimal,
    /// Rescuer bonus on completion (default: 0.5).
    pub rescue_bonus: Decimal,
    /// Freeze charge collected by a tagger (default: 0.05).
    pub charge: Decimal,
    /// Tagger bonus for freezing a runner (default: 0.5).
    pub freeze_bonus: Decimal,
    /// Per second for every tagger while any runner is unfrozen
    /// (default: -0.005).
    pub tagger_pressure_per_second: Decimal,
    /// Per second for every tagger while any rescue is in progress
    /// (default: -0.025).
    pub interference_per_second: Decimal,
    /// Every active tagger when a rescue succeeds (default: -0.5).
    pub rescue_success_penalty: Decimal,
    /// Every active tagger when all runners are frozen (default: 1.0).
    pub capture_win: Decimal,
    /// Every active tagger on pursuit timeout (default: -1.0).
    pub timeout_loss: Decimal,
    /// Every unfrozen runner on pursuit timeout (default: 1.0).
    pub timeout_survival: Decimal,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            survival_per_second: Decimal::new(1, 2),
            food: Decimal::new(2, 1),
            rescue_progress_per_second: Decimal::new(25, 3),
            rescue_bonus: Decimal::new(5, 1),
            charge: Decimal::new(5, 2),
            freeze_bonus: Decimal::new(5, 1),
            tagger_pressure_per_second: Decimal::new(-5, 3),
            interference_per_second: Decimal::new(-25, 3),
            rescue_success_penalty: Decimal::new(-5, 1),
            capture_win: Decimal::ONE,
            timeout_loss: Decimal::NEGATIVE_ONE,
            timeout_survival: Decimal::ONE,
        }
    }
}

/// Distances and durations that govern interactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Maximum rescuer distance for a rescue to start or continue
    /// (default: 5.0).
    pub rescue_radius: f64,
    /// Continuous proximity needed to complete a rescue, in milliseconds
    /// (default: 5000).
    pub rescue_threshold_ms: u64,
    /// Tagger-to-runner distance that counts as contact (default: 1.2).
    pub contact_radius: f64,
    /// Agent-to-item distance that counts as a pickup (default: 1.0).
    pub pickup_radius: f64,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            rescue_radius: 5.0,
            rescue_threshold_ms: 5000,
            contact_radius: 1.2,
            pickup_radius: 1.0,
        }
    }
}

/// How discrete actions translate into motion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Horizontal speed in world units per second (default: 0.3).
    pub move_speed: f64,
    /// Turn rate in degrees per second (default: 180.0).
    pub turn_speed_deg: f64,
    /// Upward impulse for a jump (default: 5.0).
    pub jump_impulse: f64,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            move_speed: 0.3,
            turn_speed_deg: 180.0,
            jump_impulse: 5.0,
        }
    }
}
