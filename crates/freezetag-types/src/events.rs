//! Fire-and-forget metrics events emitted by the episode controller.
//!
//! The core never persists these; an external sink aggregates them.

use serde::{Deserialize, Serialize};

use crate::enums::{ItemKind, Level, Outcome};
use crate::ids::{AgentId, ItemId};

/// Something observable that happened during an episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EpisodeEvent {
    /// A reset completed and a new episode began.
    EpisodeStarted {
        /// Episode counter (monotonic over the run).
        episode: u64,
        /// Level being played.
        level: Level,
        /// Runners actually spawned.
        runners: u32,
        /// Taggers actually spawned.
        taggers: u32,
        /// Episode time limit in milliseconds.
        time_limit_ms: u64,
    },
    /// The resolved level differs from the previous episode's level.
    LevelChanged {
        /// Episode in which the new level applies.
        episode: u64,
        /// Previous level index.
        from: i64,
        /// New level index.
        to: i64,
    },
    /// A tagger froze a runner.
    RunnerFrozen {
        /// The frozen runner.
        runner: AgentId,
        /// The tagger that spent a charge.
        tagger: AgentId,
        /// How long the runner had been active before the capture.
        survived_ms: u64,
    },
    /// A rescue completed and a runner is active again.
    RunnerRescued {
        /// The rescued runner.
        runner: AgentId,
        /// The teammate that performed the rescue.
        rescuer: AgentId,
        /// How long the runner had been frozen.
        frozen_ms: u64,
    },
    /// An item was collected.
    ItemCollected {
        /// The collected item.
        item: ItemId,
        /// Its kind.
        kind: ItemKind,
        /// The collecting agent.
        collector: AgentId,
        /// How long the item existed before collection.
        lifetime_ms: u64,
    },
    /// A rescuer entered range of a frozen runner.
    RescueStarted {
        /// The frozen runner.
        runner: AgentId,
        /// The rescuer.
        rescuer: AgentId,
    },
    /// A rescue attempt ended, successfully or not.
    RescueEnded {
        /// The runner that was being rescued.
        runner: AgentId,
        /// The rescuer.
        rescuer: AgentId,
        /// Whether the runner was unfrozen.
        success: bool,
    },
    /// The episode reached a terminal outcome.
    EpisodeEnded {
        /// Episode counter.
        episode: u64,
        /// Terminal outcome.
        outcome: Outcome,
        /// Elapsed episode time in milliseconds.
        elapsed_ms: u64,
        /// Runners frozen at the end.
        frozen_runners: u32,
        /// Runners in the roster at the end.
        total_runners: u32,
    },
}

impl EpisodeEvent {
    /// Short machine-readable name, used as a log field.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::EpisodeStarted { .. } => "episode_started",
            Self::LevelChanged { .. } => "level_changed",
            Self::RunnerFrozen { .. } => "runner_frozen",
            Self::RunnerRescued { .. } => "runner_rescued",
            Self::ItemCollected { .. } => "item_collected",
            Self::RescueStarted { .. } => "rescue_started",
            Self::RescueEnded { .. } => "rescue_ended",
            Self::EpisodeEnded { .. } => "episode_ended",
        }
    }
}
