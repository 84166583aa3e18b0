//! Runner and tagger state machines, the roster, and reward rules for the
//! freeze tag environment.
//!
//! # Modules
//!
//! - [`config`] -- Reward, rule, and movement tuning.
//! - [`error`] -- Error types for roster and state operations.
//! - [`intent`] -- Action-to-motion translation.
//! - [`rewards`] -- Continuous and terminal reward rules.
//! - [`roster`] -- [`Roster`]: all agents of the live episode.
//! - [`runner`] -- Runner freeze/rescue state machine.
//! - [`tagger`] -- Tagger charge bookkeeping.

pub mod config;
pub mod error;
pub mod intent;
pub mod rewards;
pub mod roster;
pub mod runner;
pub mod tagger;

// Re-export primary types at crate root.
pub use config::{MovementConfig, RewardConfig, RulesConfig};
pub use error::AgentError;
pub use intent::motion_intent;
pub use rewards::{Grant, accrue_continuous, rescue_success_penalties, terminal_rewards};
pub use roster::{Agent, CompletedRescue, RoleState, Roster};
pub use runner::{FreezeOutcome, RescueProgress, RescueState, RunnerState};
pub use tagger::TaggerState;
