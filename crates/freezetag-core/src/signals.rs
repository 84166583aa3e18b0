//! Episode-level signals exposed to policies, and observation assembly.

use std::collections::BTreeMap;

use freezetag_agents::{RoleState, Roster};
use freezetag_types::{AgentId, Observation, unit_fraction};

use crate::clock::EpisodeClock;
use crate::decision::AgentView;

/// Fraction of the time limit still remaining, in `[0, 1]`.
pub fn normalized_time_remaining(clock: &EpisodeClock) -> f64 {
    clock.normalized_time_remaining()
}

/// Fraction of runners currently frozen, in `[0, 1]`. Zero with no
/// runners.
pub fn percent_runners_frozen(roster: &Roster) -> f64 {
    let frozen = u64::try_from(roster.frozen_runner_count()).unwrap_or(u64::MAX);
    let total = u64::try_from(roster.runner_count()).unwrap_or(u64::MAX);
    unit_fraction(frozen, total)
}

/// How evenly charges are spread across taggers, in `[0, 1]`.
///
/// One minus the largest deviation from the mean charge count, relative to
/// the total charges held. An empty team or zero charges counts as
/// perfectly even.
pub fn charge_distribution_balance(charges: &[u32]) -> f64 {
    let total: f64 = charges.iter().copied().map(f64::from).sum();
    let Ok(count) = u32::try_from(charges.len()) else {
        return 1.0;
    };
    if count == 0 || total <= 0.0 {
        return 1.0;
    }
    let mean = total / f64::from(count);
    let max_deviation = charges
        .iter()
        .map(|&c| (f64::from(c) - mean).abs())
        .fold(0.0, f64::max);
    (1.0 - max_deviation / total).clamp(0.0, 1.0)
}

/// Build a view for every enabled agent.
pub fn agent_views(
    roster: &Roster,
    clock: &EpisodeClock,
    rescue_threshold_ms: u64,
) -> BTreeMap<AgentId, AgentView> {
    let time_remaining = normalized_time_remaining(clock);
    let percent_frozen = percent_runners_frozen(roster);
    let charge_balance = charge_distribution_balance(&roster.charge_counts());

    roster
        .iter()
        .filter(|agent| agent.enabled)
        .map(|agent| {
            let mut observation = Observation {
                time_remaining,
                percent_frozen,
                charge_balance,
                ..Observation::default()
            };
            match &agent.state {
                RoleState::Runner(runner) => {
                    observation.frozen = runner.is_frozen();
                    observation.being_rescued = runner.rescuer().is_some();
                    observation.rescue_progress = runner.rescue_progress(rescue_threshold_ms);
                }
                RoleState::Tagger(tagger) => {
                    observation.charges = tagger.charges();
                }
            }
            (
                agent.id,
                AgentView {
                    role: agent.role(),
                    observation,
                },
            )
        })
        .collect()
}
