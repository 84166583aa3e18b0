//! Metrics aggregation over the controller's event stream.
//!
//! [`MetricsSink`] counts gameplay events per episode and across the run,
//! and writes a one-line summary for every finished episode through
//! `tracing`. [`EpisodeLogCallback`] adds per-team reward totals read from
//! the ledger at the end of each episode.

use rust_decimal::Decimal;
use tracing::{debug, info};

use freezetag_core::{EpisodeController, EventSink, TickCallback, TickSummary};
use freezetag_types::{EpisodeEvent, ItemKind, Level, Outcome, Role};

/// Counters for one episode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpisodeCounters {
    /// Runners frozen.
    pub freezes: u32,
    /// Rescues completed.
    pub rescues: u32,
    /// Rescues started.
    pub rescue_attempts: u32,
    /// Rescues abandoned before completion.
    pub rescues_abandoned: u32,
    /// Food items collected.
    pub food_collected: u32,
    /// Freeze charges collected.
    pub charges_collected: u32,
    /// Sum of active time before each capture.
    pub survived_ms: u64,
    /// Sum of frozen time before each rescue.
    pub frozen_ms: u64,
}

/// Run-wide totals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunTotals {
    /// Episodes finished.
    pub episodes: u64,
    /// Episodes won by the runners.
    pub runners_wins: u64,
    /// Episodes won by the taggers.
    pub taggers_wins: u64,
    /// Level changes seen.
    pub level_changes: u64,
    /// Runners frozen over the whole run.
    pub freezes: u64,
    /// Rescues completed over the whole run.
    pub rescues: u64,
}

/// Event sink that aggregates and logs metrics.
#[derive(Debug, Clone, Default)]
pub struct MetricsSink {
    level: Option<Level>,
    episode: EpisodeCounters,
    totals: RunTotals,
}

impl MetricsSink {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters for the episode in progress.
    pub const fn episode(&self) -> &EpisodeCounters {
        &self.episode
    }

    /// Totals across the run.
    pub const fn totals(&self) -> &RunTotals {
        &self.totals
    }

    /// Log the run-wide totals.
    pub fn log_totals(&self) {
        info!(
            episodes = self.totals.episodes,
            runners_wins = self.totals.runners_wins,
            taggers_wins = self.totals.taggers_wins,
            level_changes = self.totals.level_changes,
            freezes = self.totals.freezes,
            rescues = self.totals.rescues,
            "run metrics"
        );
    }
}

fn bump(counter: &mut u32) {
    *counter = counter.saturating_add(1);
}

impl EventSink for MetricsSink {
    fn emit(&mut self, event: &EpisodeEvent) {
        match *event {
            EpisodeEvent::EpisodeStarted { level, .. } => {
                self.level = Some(level);
                self.episode = EpisodeCounters::default();
            }
            EpisodeEvent::LevelChanged { episode, from, to } => {
                self.totals.level_changes = self.totals.level_changes.saturating_add(1);
                info!(episode, from, to, "level changed");
            }
            EpisodeEvent::RunnerFrozen { survived_ms, .. } => {
                bump(&mut self.episode.freezes);
                self.episode.survived_ms = self.episode.survived_ms.saturating_add(survived_ms);
            }
            EpisodeEvent::RunnerRescued { frozen_ms, .. } => {
                bump(&mut self.episode.rescues);
                self.episode.frozen_ms = self.episode.frozen_ms.saturating_add(frozen_ms);
            }
            EpisodeEvent::RescueStarted { .. } => bump(&mut self.episode.rescue_attempts),
            EpisodeEvent::RescueEnded { success, .. } => {
                if !success {
                    bump(&mut self.episode.rescues_abandoned);
                }
            }
            EpisodeEvent::ItemCollected { kind, .. } => match kind {
                ItemKind::Food => bump(&mut self.episode.food_collected),
                ItemKind::FreezeCharge => bump(&mut self.episode.charges_collected),
            },
            EpisodeEvent::EpisodeEnded {
                episode,
                outcome,
                elapsed_ms,
                frozen_runners,
                total_runners,
            } => {
                let totals = &mut self.totals;
                totals.episodes = totals.episodes.saturating_add(1);
                match outcome {
                    Outcome::RunnersWin => {
                        totals.runners_wins = totals.runners_wins.saturating_add(1);
                    }
                    Outcome::TaggersWin => {
                        totals.taggers_wins = totals.taggers_wins.saturating_add(1);
                    }
                    Outcome::Pending => {}
                }
                totals.freezes = totals.freezes.saturating_add(u64::from(self.episode.freezes));
                totals.rescues = totals.rescues.saturating_add(u64::from(self.episode.rescues));

                let c = &self.episode;
                info!(
                    episode,
                    level = ?self.level,
                    %outcome,
                    elapsed_ms,
                    frozen_runners,
                    total_runners,
                    freezes = c.freezes,
                    rescues = c.rescues,
                    rescue_attempts = c.rescue_attempts,
                    rescues_abandoned = c.rescues_abandoned,
                    food = c.food_collected,
                    charges = c.charges_collected,
                    "episode metrics"
                );
            }
        }
    }
}

/// Tick callback that logs per-team reward totals when an episode ends.
#[derive(Debug, Clone, Copy, Default)]
pub struct EpisodeLogCallback;

impl TickCallback for EpisodeLogCallback {
    fn on_tick(&mut self, summary: &TickSummary, controller: &EpisodeController) {
        if let Some(report) = &summary.reset {
            debug!(
                episode = report.episode,
                level = %report.level,
                source = ?report.source,
                runners = report.runners.len(),
                taggers = report.taggers.len(),
                "episode prepared"
            );
        }
        let Some(end) = summary.ended else {
            return;
        };

        let ledger = controller.ledger();
        let team_total = |role: Role| {
            controller
                .roster()
                .iter()
                .filter(|agent| agent.role() == role)
                .fold(Decimal::ZERO, |sum, agent| {
                    sum.saturating_add(ledger.episode_total(agent.id))
                })
        };
        info!(
            episode = end.episode,
            outcome = %end.outcome,
            runner_reward = %team_total(Role::Runner),
            tagger_reward = %team_total(Role::Tagger),
            "episode rewards"
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use freezetag_types::{AgentId, ItemId};

    use super::*;

    fn id(raw: u64) -> AgentId {
        AgentId::from_raw(raw)
    }

    #[test]
    fn counts_events_per_episode() {
        let mut sink = MetricsSink::new();
        sink.emit(&EpisodeEvent::EpisodeStarted {
            episode: 1,
            level: Level::Pursuit,
            runners: 2,
            taggers: 1,
            time_limit_ms: 60_000,
        });
        sink.emit(&EpisodeEvent::RunnerFrozen {
            runner: id(0),
            tagger: id(2),
            survived_ms: 400,
        });
        sink.emit(&EpisodeEvent::RescueStarted {
            runner: id(0),
            rescuer: id(1),
        });
        sink.emit(&EpisodeEvent::RescueEnded {
            runner: id(0),
            rescuer: id(1),
            success: false,
        });
        sink.emit(&EpisodeEvent::ItemCollected {
            item: ItemId::from_raw(3),
            kind: ItemKind::FreezeCharge,
            collector: id(2),
            lifetime_ms: 20,
        });

        let c = sink.episode();
        assert_eq!(c.freezes, 1);
        assert_eq!(c.rescue_attempts, 1);
        assert_eq!(c.rescues_abandoned, 1);
        assert_eq!(c.charges_collected, 1);
        assert_eq!(c.survived_ms, 400);
    }

    #[test]
    fn totals_survive_episode_boundaries() {
        let mut sink = MetricsSink::new();
        for (episode, outcome) in [(1, Outcome::TaggersWin), (2, Outcome::RunnersWin)] {
            sink.emit(&EpisodeEvent::EpisodeStarted {
                episode,
                level: Level::Pursuit,
                runners: 1,
                taggers: 1,
                time_limit_ms: 1000,
            });
            sink.emit(&EpisodeEvent::RunnerFrozen {
                runner: id(0),
                tagger: id(1),
                survived_ms: 10,
            });
            sink.emit(&EpisodeEvent::EpisodeEnded {
                episode,
                outcome,
                elapsed_ms: 1000,
                frozen_runners: 1,
                total_runners: 1,
            });
        }
        sink.emit(&EpisodeEvent::LevelChanged {
            episode: 3,
            from: 1,
            to: 0,
        });

        let t = sink.totals();
        assert_eq!(t.episodes, 2);
        assert_eq!(t.runners_wins, 1);
        assert_eq!(t.taggers_wins, 1);
        assert_eq!(t.freezes, 2);
        assert_eq!(t.level_changes, 1);
        assert_eq!(sink.episode().freezes, 1);
    }
}
