//! Enumeration types for the freeze tag environment.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// The team an agent plays for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Forages for food, can be frozen by taggers and rescued by teammates.
    Runner,
    /// Collects freeze charges and spends them to freeze runners.
    Tagger,
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Runner => write!(f, "runner"),
            Self::Tagger => write!(f, "tagger"),
        }
    }
}

/// Observable behavioral state of a runner.
///
/// A runner is in exactly one of these states at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunnerPhase {
    /// Free to move, forage, and rescue teammates.
    Active,
    /// Immobilised by a tagger; waiting for a rescuer.
    Frozen,
    /// Frozen, with an active teammate currently in rescue range.
    BeingRescued,
}

impl RunnerPhase {
    /// Whether the runner counts as frozen for win-condition purposes.
    pub const fn is_frozen(self) -> bool {
        matches!(self, Self::Frozen | Self::BeingRescued)
    }
}

/// How an agent's actions are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Behavior {
    /// Actions come from a trained or training policy.
    #[default]
    Learned,
    /// Actions come from manual input or a scripted stand-in.
    Heuristic,
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// A collectible item kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// Food, collected by active runners for a reward.
    Food,
    /// A freeze charge, collected by taggers to enable one capture.
    FreezeCharge,
}

impl ItemKind {
    /// The role allowed to collect this item.
    pub const fn collector(self) -> Role {
        match self {
            Self::Food => Role::Runner,
            Self::FreezeCharge => Role::Tagger,
        }
    }
}

impl core::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Food => write!(f, "food"),
            Self::FreezeCharge => write!(f, "freeze_charge"),
        }
    }
}

// ---------------------------------------------------------------------------
// Episode
// ---------------------------------------------------------------------------

/// The game variant played in an episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    /// Level index 0: runners forage and rescue, no taggers.
    Forage,
    /// Level index 1: taggers hunt runners.
    Pursuit,
}

impl Level {
    /// Map a level index to a level.
    ///
    /// Only index 1 selects [`Level::Pursuit`]; every other index plays the
    /// forage variant.
    pub const fn from_index(index: i64) -> Self {
        if index == 1 { Self::Pursuit } else { Self::Forage }
    }

    /// The canonical index of this level.
    pub const fn index(self) -> i64 {
        match self {
            Self::Forage => 0,
            Self::Pursuit => 1,
        }
    }

    /// Whether taggers and freeze charges take part in this level.
    pub const fn has_taggers(self) -> bool {
        matches!(self, Self::Pursuit)
    }
}

impl core::fmt::Display for Level {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Forage => write!(f, "forage"),
            Self::Pursuit => write!(f, "pursuit"),
        }
    }
}

/// Result of an episode. Once terminal, it does not change until reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Outcome {
    /// The episode is still being played.
    #[default]
    Pending,
    /// The time limit expired with at least one runner unfrozen.
    RunnersWin,
    /// Every runner was frozen before the time limit.
    TaggersWin,
}

impl Outcome {
    /// Whether this outcome ends the episode.
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl core::fmt::Display for Outcome {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::RunnersWin => write!(f, "runners_win"),
            Self::TaggersWin => write!(f, "taggers_win"),
        }
    }
}

/// Lifecycle phase of the episode controller.
///
/// Valid transitions: `Running -> Terminating -> Resetting -> Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EpisodePhase {
    /// Ticks advance the game.
    Running,
    /// A terminal condition fired; agents are disabled and the settle
    /// delay is pending.
    Terminating,
    /// The reset protocol is rebuilding the roster and item pools.
    Resetting,
}

/// Why an episode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerminationCause {
    /// The episode time limit was reached.
    Timeout,
    /// Every runner was frozen.
    AllFrozen,
}
