//! Episode orchestration for the freeze tag environment.
//!
//! This crate owns the fixed-timestep tick that drives an episode: decision
//! collection, movement, item pickups, captures, rescues, rewards, win
//! detection, and the reset protocol that starts the next episode.
//!
//! # Modules
//!
//! - [`clock`] -- Episode clock and the one-shot settle timer.
//! - [`config`] -- Configuration loading from `freezetag-config.yaml` into
//!   strongly-typed structs.
//! - [`control`] -- Stop, pacing, and episode-limit state shared with the loop.
//! - [`controller`] -- [`EpisodeController`]: the per-tick update and
//!   termination.
//! - [`decision`] -- [`DecisionSource`] trait and [`IdleDecisionSource`].
//! - [`episode`] -- The live episode aggregate.
//! - [`events`] -- [`EventSink`] metrics boundary.
//! - [`params`] -- [`ParameterResolver`] and the curriculum boundary.
//! - [`physics`] -- [`PhysicsBackend`] trait and [`KinematicPhysics`].
//! - [`runner`] -- The async training loop.
//! - [`signals`] -- Episode-level observation signals.
//!
//! [`EpisodeController`]: controller::EpisodeController
//! [`DecisionSource`]: decision::DecisionSource
//! [`IdleDecisionSource`]: decision::IdleDecisionSource
//! [`EventSink`]: events::EventSink
//! [`ParameterResolver`]: params::ParameterResolver
//! [`PhysicsBackend`]: physics::PhysicsBackend
//! [`KinematicPhysics`]: physics::KinematicPhysics

pub mod clock;
pub mod config;
pub mod control;
pub mod controller;
pub mod decision;
pub mod episode;
pub mod events;
mod interactions;
pub mod params;
pub mod physics;
mod reset;
pub mod runner;
pub mod signals;

pub use clock::{ClockError, EpisodeClock, ScheduledTask};
pub use config::{ConfigError, SimulationConfig};
pub use control::{TrainingControl, TrainingEndReason};
pub use controller::{EpisodeController, EpisodeEnd, ResetReport, TickError, TickSummary};
pub use decision::{AgentView, DecisionError, DecisionSource, IdleDecisionSource};
pub use episode::Episode;
pub use events::{EventSink, NoOpSink, RecordingSink};
pub use params::{
    CurriculumSource, MapCurriculum, ParameterResolver, ParameterSource, ResolvedParameters,
};
pub use physics::{KinematicPhysics, PhysicsBackend, PhysicsError};
pub use runner::{NoOpCallback, RunnerError, TickCallback, TrainingResult, run_training};
