//! Reward rules: continuous per-tick accruals and terminal rewards.
//!
//! Continuous rewards are per-second rates converted to the tick length
//! with exact decimal arithmetic. Only enabled agents accrue anything.

use rust_decimal::Decimal;

use freezetag_ledger::{RewardKind, RewardLedger, per_tick};
use freezetag_types::{AgentId, Level, RunnerPhase, TerminationCause};

use crate::config::RewardConfig;
use crate::error::AgentError;
use crate::roster::{Agent, RoleState, Roster};

/// One reward to grant.
pub type Grant = (AgentId, RewardKind, Decimal);

/// Record this tick's continuous rewards.
///
/// - Every enabled, unfrozen runner: survival.
/// - Every enabled rescuer of a runner being rescued: rescue progress.
/// - Every enabled tagger, while any runner is unfrozen: pressure.
/// - Every enabled tagger flagged as interfering: interference.
///
/// # Errors
///
/// Returns [`AgentError::Ledger`] if a conversion or sum overflows.
pub fn accrue_continuous(
    roster: &Roster,
    ledger: &mut RewardLedger,
    tick: u64,
    dt_ms: u64,
    rewards: &RewardConfig,
) -> Result<(), AgentError> {
    let survival = per_tick(rewards.survival_per_second, dt_ms)?;
    let progress = per_tick(rewards.rescue_progress_per_second, dt_ms)?;
    let pressure = per_tick(rewards.tagger_pressure_per_second, dt_ms)?;
    let interference = per_tick(rewards.interference_per_second, dt_ms)?;
    let runners_at_large = roster.any_runner_unfrozen();

    for agent in roster.iter().filter(|a| a.enabled) {
        match &agent.state {
            RoleState::Runner(runner) => match runner.phase() {
                RunnerPhase::Active => {
                    ledger.record(tick, agent.id, RewardKind::Survival, survival)?;
                }
                RunnerPhase::BeingRescued => {
                    if let Some(rescuer) = runner.rescuer().filter(|r| is_enabled(roster, *r)) {
                        ledger.record(tick, rescuer, RewardKind::RescueProgress, progress)?;
                    }
                }
                RunnerPhase::Frozen => {}
            },
            RoleState::Tagger(tagger) => {
                if runners_at_large {
                    ledger.record(tick, agent.id, RewardKind::TaggerPressure, pressure)?;
                }
                if tagger.is_interfering() {
                    ledger.record(
                        tick,
                        agent.id,
                        RewardKind::RescueInterference,
                        interference,
                    )?;
                }
            }
        }
    }
    Ok(())
}

fn is_enabled(roster: &Roster, id: AgentId) -> bool {
    roster.get(id).is_some_and(|a| a.enabled)
}

fn enabled_taggers(roster: &Roster) -> impl Iterator<Item = &Agent> {
    roster
        .iter()
        .filter(|a| a.enabled && matches!(a.state, RoleState::Tagger(_)))
}

/// The one-time penalty every enabled tagger receives when a rescue
/// succeeds, wherever they are.
pub fn rescue_success_penalties(roster: &Roster, rewards: &RewardConfig) -> Vec<Grant> {
    enabled_taggers(roster)
        .map(|a| {
            (
                a.id,
                RewardKind::RescueSuccessPenalty,
                rewards.rescue_success_penalty,
            )
        })
        .collect()
}

/// Terminal rewards for an episode ending by `cause` at `level`.
///
/// Must be computed before agents are disabled.
///
/// - All runners frozen: every enabled tagger gets the capture win.
/// - Timeout at pursuit: every enabled tagger gets the timeout loss, every
///   enabled unfrozen runner the timeout survival reward.
/// - Timeout at forage: nothing.
pub fn terminal_rewards(
    roster: &Roster,
    cause: TerminationCause,
    level: Level,
    rewards: &RewardConfig,
) -> Vec<Grant> {
    match (cause, level) {
        (TerminationCause::AllFrozen, _) => enabled_taggers(roster)
            .map(|a| (a.id, RewardKind::CaptureWin, rewards.capture_win))
            .collect(),
        (TerminationCause::Timeout, Level::Pursuit) => roster
            .iter()
            .filter(|a| a.enabled)
            .filter_map(|a| match &a.state {
                RoleState::Tagger(_) => Some((a.id, RewardKind::TimeoutLoss, rewards.timeout_loss)),
                RoleState::Runner(r) if !r.is_frozen() => Some((
                    a.id,
                    RewardKind::TimeoutSurvival,
                    rewards.timeout_survival,
                )),
                RoleState::Runner(_) => None,
            })
            .collect(),
        (TerminationCause::Timeout, Level::Forage) => Vec::new(),
    }
}
