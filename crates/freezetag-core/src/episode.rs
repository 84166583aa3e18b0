//! The live episode aggregate.
//!
//! Exactly one episode exists at a time. Its outcome is written once, by
//! [`Episode::conclude`], and stays fixed until the next reset replaces the
//! whole aggregate.

use freezetag_types::{EpisodePhase, Level, Outcome, TerminationCause};

use crate::params::ResolvedParameters;

/// One bounded round of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Episode {
    number: u64,
    level_index: i64,
    level: Level,
    time_limit_ms: u64,
    phase: EpisodePhase,
    outcome: Outcome,
    cause: Option<TerminationCause>,
}

impl Episode {
    /// Placeholder before the first reset. Ticks are no-ops until then.
    pub const fn unstarted() -> Self {
        Self {
            number: 0,
            level_index: 0,
            level: Level::Forage,
            time_limit_ms: 0,
            phase: EpisodePhase::Resetting,
            outcome: Outcome::Pending,
            cause: None,
        }
    }

    /// A new episode being set up from `params`.
    pub const fn begin(number: u64, params: &ResolvedParameters) -> Self {
        Self {
            number,
            level_index: params.level_index,
            level: params.level,
            time_limit_ms: params.time_limit_ms,
            phase: EpisodePhase::Resetting,
            outcome: Outcome::Pending,
            cause: None,
        }
    }

    /// Episode counter, starting at 1 for the first real episode.
    pub const fn number(&self) -> u64 {
        self.number
    }

    /// Raw level index as resolved.
    pub const fn level_index(&self) -> i64 {
        self.level_index
    }

    /// Level being played.
    pub const fn level(&self) -> Level {
        self.level
    }

    /// Time limit in milliseconds.
    pub const fn time_limit_ms(&self) -> u64 {
        self.time_limit_ms
    }

    /// Lifecycle phase.
    pub const fn phase(&self) -> EpisodePhase {
        self.phase
    }

    /// Outcome so far.
    pub const fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Why the episode ended, once it has.
    pub const fn cause(&self) -> Option<TerminationCause> {
        self.cause
    }

    /// Whether ticks currently play the game.
    pub const fn is_running(&self) -> bool {
        matches!(self.phase, EpisodePhase::Running)
    }

    pub(crate) const fn set_phase(&mut self, phase: EpisodePhase) {
        self.phase = phase;
    }

    /// End a running episode. Returns the outcome, or `None` if the episode
    /// is not running or already has an outcome.
    pub const fn conclude(&mut self, cause: TerminationCause) -> Option<Outcome> {
        if !self.is_running() || self.outcome.is_terminal() {
            return None;
        }
        let outcome = match cause {
            TerminationCause::Timeout => Outcome::RunnersWin,
            TerminationCause::AllFrozen => Outcome::TaggersWin,
        };
        self.outcome = outcome;
        self.cause = Some(cause);
        self.phase = EpisodePhase::Terminating;
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use crate::params::ParameterSource;

    use super::*;

    fn running() -> Episode {
        let params = ResolvedParameters {
            source: ParameterSource::Manual,
            level_index: 1,
            level: Level::Pursuit,
            num_runners: 2,
            num_taggers: 1,
            food_capacity: 0,
            charge_capacity: 0,
            time_limit_ms: 1000,
        };
        let mut episode = Episode::begin(3, &params);
        episode.set_phase(EpisodePhase::Running);
        episode
    }

    #[test]
    fn outcome_is_written_once() {
        let mut episode = running();
        assert_eq!(
            episode.conclude(TerminationCause::AllFrozen),
            Some(Outcome::TaggersWin)
        );
        assert_eq!(episode.conclude(TerminationCause::Timeout), None);
        assert_eq!(episode.outcome(), Outcome::TaggersWin);
        assert_eq!(episode.phase(), EpisodePhase::Terminating);
    }

    #[test]
    fn unstarted_episode_cannot_conclude() {
        let mut episode = Episode::unstarted();
        assert_eq!(episode.conclude(TerminationCause::Timeout), None);
        assert_eq!(episode.outcome(), Outcome::Pending);
    }
}
