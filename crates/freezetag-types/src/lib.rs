//! Shared type definitions for the freeze tag training environment.
//!
//! This crate is the single source of truth for the vocabulary used across
//! the workspace: identifiers, role and state enums, geometry read back
//! from physics, the discrete action contract, observations, and metrics
//! events.
//!
//! # Modules
//!
//! - [`ids`] -- Sequential typed identifiers and the run UUID
//! - [`enums`] -- Roles, runner phases, item kinds, levels, outcomes
//! - [`geometry`] -- `Vec3` and `Pose`
//! - [`actions`] -- Discrete agent actions and physics motion intents
//! - [`observation`] -- Per-tick observation handed to policies
//! - [`events`] -- Metrics events emitted by the episode controller

pub mod actions;
pub mod enums;
pub mod events;
pub mod geometry;
pub mod ids;
pub mod observation;

// Re-export all public types at crate root for convenience.
pub use actions::{ActionDecodeError, AgentAction, MotionIntent, Movement, Turn};
pub use enums::{
    Behavior, EpisodePhase, ItemKind, Level, Outcome, Role, RunnerPhase, TerminationCause,
};
pub use events::EpisodeEvent;
pub use geometry::{Pose, Vec3};
pub use ids::{AgentId, BodyHandle, ItemId, RunId};
pub use observation::{Observation, unit_fraction};
