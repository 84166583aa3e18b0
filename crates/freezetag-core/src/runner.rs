//! Training loop runner.
//!
//! [`run_training`] performs the initial reset, then ticks the controller
//! until the episode limit is reached or a stop is requested, sleeping the
//! configured real-time interval between ticks.

use std::sync::Arc;

use tracing::{info, warn};

use crate::control::{TrainingControl, TrainingEndReason};
use crate::controller::{EpisodeController, TickError, TickSummary};
use crate::decision::DecisionSource;
use crate::events::EventSink;
use freezetag_types::Outcome;

/// Errors that can occur during a training run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick or reset failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },
}

/// Result of a training run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainingResult {
    /// Why the run ended.
    pub end_reason: TrainingEndReason,
    /// Episodes that reached a terminal outcome.
    pub episodes_completed: u64,
    /// Ticks executed.
    pub total_ticks: u64,
    /// Episodes won by the runners.
    pub runners_wins: u64,
    /// Episodes won by the taggers.
    pub taggers_wins: u64,
}

/// Callback invoked after each tick completes.
pub trait TickCallback: Send {
    /// Called after a tick completes successfully.
    fn on_tick(&mut self, summary: &TickSummary, controller: &EpisodeController);
}

/// A tick callback that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _controller: &EpisodeController) {}
}

/// Run episodes until the limit is reached or a stop is requested.
///
/// # Errors
///
/// Returns [`RunnerError`] if a tick fails unrecoverably.
pub async fn run_training(
    controller: &mut EpisodeController,
    decisions: &mut dyn DecisionSource,
    events: &mut dyn EventSink,
    control: &Arc<TrainingControl>,
    callback: &mut dyn TickCallback,
) -> Result<TrainingResult, RunnerError> {
    let mut result = TrainingResult {
        end_reason: TrainingEndReason::StopRequested,
        episodes_completed: 0,
        total_ticks: 0,
        runners_wins: 0,
        taggers_wins: 0,
    };

    info!(
        max_episodes = control.max_episodes(),
        tick_interval_ms = control.tick_interval_ms(),
        "training starting"
    );
    controller.reset(&*decisions, events)?;

    loop {
        if control.is_stop_requested() {
            info!("stop requested");
            result.end_reason = TrainingEndReason::StopRequested;
            return Ok(result);
        }

        let summary = controller.tick(decisions, events)?;
        result.total_ticks = result.total_ticks.saturating_add(1);
        callback.on_tick(&summary, controller);

        if let Some(end) = summary.ended {
            result.episodes_completed = result.episodes_completed.saturating_add(1);
            match end.outcome {
                Outcome::RunnersWin => result.runners_wins = result.runners_wins.saturating_add(1),
                Outcome::TaggersWin => result.taggers_wins = result.taggers_wins.saturating_add(1),
                Outcome::Pending => warn!(episode = end.episode, "episode ended without outcome"),
            }
            if control.episode_limit_reached(result.episodes_completed) {
                info!(
                    episodes = result.episodes_completed,
                    "episode limit reached"
                );
                result.end_reason = TrainingEndReason::EpisodeLimitReached;
                return Ok(result);
            }
        }

        let interval_ms = control.tick_interval_ms();
        if interval_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(interval_ms)).await;
        }
    }
}

/// Log the outcome of a training run.
pub fn log_training_end(result: &TrainingResult, control: &TrainingControl) {
    info!(
        reason = ?result.end_reason,
        episodes = result.episodes_completed,
        total_ticks = result.total_ticks,
        runners_wins = result.runners_wins,
        taggers_wins = result.taggers_wins,
        elapsed_seconds = control.elapsed_seconds(),
        "training ended"
    );
    if result.episodes_completed == 0 {
        warn!("training ended before any episode finished");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::decision::IdleDecisionSource;
    use crate::events::RecordingSink;
    use crate::params::ParameterResolver;
    use crate::physics::KinematicPhysics;

    fn controller(yaml: &str) -> EpisodeController {
        let config = SimulationConfig::parse(yaml).unwrap();
        EpisodeController::new(
            &config,
            ParameterResolver::manual(config.manual.clone()),
            Box::new(KinematicPhysics::new(config.world.arena)),
        )
        .unwrap()
    }

    struct CountingCallback {
        ticks: u64,
    }

    impl TickCallback for CountingCallback {
        fn on_tick(&mut self, _summary: &TickSummary, _controller: &EpisodeController) {
            self.ticks = self.ticks.saturating_add(1);
        }
    }

    #[tokio::test]
    async fn runs_until_episode_limit() {
        // Forage level, one-second episodes: 50 ticks each plus the settle
        // delay of 5 ticks before the next reset.
        let mut controller = controller(
            "world:\n  tick_ms: 20\n  settle_delay_ms: 100\nmanual:\n  num_runners: 2\n  time_limit_secs: 1.0\n",
        );
        let mut decisions = IdleDecisionSource::new();
        let mut sink = RecordingSink::new();
        let control = Arc::new(TrainingControl::new(0, 2));
        let mut callback = CountingCallback { ticks: 0 };

        let result = run_training(
            &mut controller,
            &mut decisions,
            &mut sink,
            &control,
            &mut callback,
        )
        .await
        .unwrap();

        assert_eq!(result.end_reason, TrainingEndReason::EpisodeLimitReached);
        assert_eq!(result.episodes_completed, 2);
        assert_eq!(result.runners_wins, 2);
        assert_eq!(result.taggers_wins, 0);
        assert_eq!(result.total_ticks, 105);
        assert_eq!(callback.ticks, result.total_ticks);
        assert_eq!(sink.count("episode_started"), 2);
        assert_eq!(sink.count("episode_ended"), 2);
    }

    #[tokio::test]
    async fn stop_before_first_tick() {
        let mut controller = controller("");
        let mut decisions = IdleDecisionSource::new();
        let mut sink = RecordingSink::new();
        let control = Arc::new(TrainingControl::new(0, 0));
        control.request_stop();

        let result = run_training(
            &mut controller,
            &mut decisions,
            &mut sink,
            &control,
            &mut NoOpCallback,
        )
        .await
        .unwrap();

        assert_eq!(result.end_reason, TrainingEndReason::StopRequested);
        assert_eq!(result.total_ticks, 0);
        assert_eq!(controller.episode().number(), 1);
    }
}
