//! The roster: every agent of the live episode, keyed by id.
//!
//! Agents are a common record (id, physics body, enabled flag, behaviour)
//! around a role payload. Cross-agent transitions (freezing, starting and
//! cancelling rescues) go through the roster so that both sides of a
//! relationship are updated together: a runner being rescued always
//! names exactly one rescuer, and that rescuer always names it back.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use freezetag_types::{AgentId, Behavior, BodyHandle, Role, RunnerPhase};

use crate::error::AgentError;
use crate::runner::{FreezeOutcome, RescueProgress, RunnerState};
use crate::tagger::TaggerState;

/// Role-specific state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleState {
    /// Runner payload.
    Runner(RunnerState),
    /// Tagger payload.
    Tagger(TaggerState),
}

/// One agent in the episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    /// Identifier, unique within the run.
    pub id: AgentId,
    /// Physics body driven by this agent.
    pub body: BodyHandle,
    /// Disabled agents receive no observations and never move. All agents
    /// are disabled when an episode terminates.
    pub enabled: bool,
    /// Where this agent's actions come from.
    pub behavior: Behavior,
    /// Role payload.
    pub state: RoleState,
}

impl Agent {
    /// The agent's role.
    pub const fn role(&self) -> Role {
        match self.state {
            RoleState::Runner(_) => Role::Runner,
            RoleState::Tagger(_) => Role::Tagger,
        }
    }

    /// Runner payload, if this is a runner.
    pub const fn runner(&self) -> Option<&RunnerState> {
        match &self.state {
            RoleState::Runner(r) => Some(r),
            RoleState::Tagger(_) => None,
        }
    }

    /// Tagger payload, if this is a tagger.
    pub const fn tagger(&self) -> Option<&TaggerState> {
        match &self.state {
            RoleState::Tagger(t) => Some(t),
            RoleState::Runner(_) => None,
        }
    }

    /// Whether the agent may act this tick: enabled and not frozen.
    pub const fn can_move(&self) -> bool {
        if !self.enabled {
            return false;
        }
        match &self.state {
            RoleState::Runner(r) => !r.is_frozen(),
            RoleState::Tagger(_) => true,
        }
    }
}

/// A completed rescue reported by [`Roster::advance_rescues`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletedRescue {
    /// The runner that is active again.
    pub runner: AgentId,
    /// The teammate that rescued it.
    pub rescuer: AgentId,
    /// How long the runner had been frozen.
    pub frozen_ms: u64,
}

/// All agents of the live episode.
#[derive(Debug)]
pub struct Roster {
    agents: BTreeMap<AgentId, Agent>,
    next_id: AgentId,
}

impl Default for Roster {
    fn default() -> Self {
        Self::new()
    }
}

impl Roster {
    /// Create an empty roster.
    pub const fn new() -> Self {
        Self {
            agents: BTreeMap::new(),
            next_id: AgentId::from_raw(0),
        }
    }

    /// Number of agents.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether the roster is empty.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Add an agent driving `body`. Runners join frozen; taggers join with
    /// no charges.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::IdExhausted`] if identifiers run out.
    pub fn add(
        &mut self,
        role: Role,
        behavior: Behavior,
        body: BodyHandle,
        now_ms: u64,
    ) -> Result<AgentId, AgentError> {
        let id = self.next_id;
        self.next_id = id.next().ok_or(AgentError::IdExhausted)?;
        let state = match role {
            Role::Runner => RoleState::Runner(RunnerState::spawned(now_ms)),
            Role::Tagger => RoleState::Tagger(TaggerState::new()),
        };
        self.agents.insert(
            id,
            Agent {
                id,
                body,
                enabled: true,
                behavior,
                state,
            },
        );
        Ok(id)
    }

    /// Look up an agent.
    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    /// Iterate over all agents in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    /// Iterate over runners in id order.
    pub fn runners(&self) -> impl Iterator<Item = (AgentId, &RunnerState)> {
        self.agents
            .values()
            .filter_map(|a| a.runner().map(|r| (a.id, r)))
    }

    /// Iterate over taggers in id order.
    pub fn taggers(&self) -> impl Iterator<Item = (AgentId, &TaggerState)> {
        self.agents
            .values()
            .filter_map(|a| a.tagger().map(|t| (a.id, t)))
    }

    /// Runner state of `id`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::AgentNotFound`] or [`AgentError::WrongRole`].
    pub fn runner(&self, id: AgentId) -> Result<&RunnerState, AgentError> {
        let agent = self.get(id).ok_or(AgentError::AgentNotFound(id))?;
        agent.runner().ok_or(AgentError::WrongRole {
            agent: id,
            expected: Role::Runner,
        })
    }

    fn runner_mut(&mut self, id: AgentId) -> Result<&mut RunnerState, AgentError> {
        let agent = self
            .agents
            .get_mut(&id)
            .ok_or(AgentError::AgentNotFound(id))?;
        match &mut agent.state {
            RoleState::Runner(r) => Ok(r),
            RoleState::Tagger(_) => Err(AgentError::WrongRole {
                agent: id,
                expected: Role::Runner,
            }),
        }
    }

    /// Mutable tagger state of `id`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::AgentNotFound`] or [`AgentError::WrongRole`].
    pub fn tagger_mut(&mut self, id: AgentId) -> Result<&mut TaggerState, AgentError> {
        let agent = self
            .agents
            .get_mut(&id)
            .ok_or(AgentError::AgentNotFound(id))?;
        match &mut agent.state {
            RoleState::Tagger(t) => Ok(t),
            RoleState::Runner(_) => Err(AgentError::WrongRole {
                agent: id,
                expected: Role::Tagger,
            }),
        }
    }

    /// Number of runners.
    pub fn runner_count(&self) -> usize {
        self.runners().count()
    }

    /// Number of taggers.
    pub fn tagger_count(&self) -> usize {
        self.taggers().count()
    }

    /// Number of runners frozen or being rescued.
    pub fn frozen_runner_count(&self) -> usize {
        self.runners().filter(|(_, r)| r.is_frozen()).count()
    }

    /// Whether at least one runner is unfrozen.
    pub fn any_runner_unfrozen(&self) -> bool {
        self.runners().any(|(_, r)| !r.is_frozen())
    }

    /// Whether any rescue is currently in progress.
    pub fn any_rescue_in_progress(&self) -> bool {
        self.runners()
            .any(|(_, r)| r.phase() == RunnerPhase::BeingRescued)
    }

    /// Charge counts of all taggers, in id order.
    pub fn charge_counts(&self) -> Vec<u32> {
        self.taggers().map(|(_, t)| t.charges()).collect()
    }

    /// Whether any agent is driven by a heuristic policy.
    pub fn any_heuristic(&self) -> bool {
        self.agents
            .values()
            .any(|a| a.behavior == Behavior::Heuristic)
    }

    /// Set the rescue-interference flag on every tagger.
    pub fn set_interference(&mut self, interfering: bool) {
        for agent in self.agents.values_mut() {
            if let RoleState::Tagger(t) = &mut agent.state {
                t.set_interfering(interfering);
            }
        }
    }

    /// Disable every agent.
    pub fn deactivate_all(&mut self) {
        for agent in self.agents.values_mut() {
            agent.enabled = false;
        }
    }

    /// Remove every agent, returning them so their bodies can be released.
    /// Identifiers keep counting up across episodes.
    pub fn clear(&mut self) -> Vec<Agent> {
        core::mem::take(&mut self.agents).into_values().collect()
    }

    // -----------------------------------------------------------------------
    // Cross-agent transitions
    // -----------------------------------------------------------------------

    /// Freeze runner `id`. If it was rescuing a teammate, that rescue is
    /// cancelled and the teammate is named in the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::AgentNotFound`] or [`AgentError::WrongRole`].
    pub fn freeze_runner(&mut self, id: AgentId, now_ms: u64) -> Result<FreezeOutcome, AgentError> {
        let outcome = self.runner_mut(id)?.freeze(now_ms);
        if let FreezeOutcome::Frozen {
            abandoned: Some(target),
            ..
        } = outcome
        {
            self.runner_mut(target)?.cancel_rescue();
            debug!(runner = %id, target = %target, "frozen rescuer abandoned its rescue");
        }
        Ok(outcome)
    }

    /// Start a rescue of `target` by `rescuer`.
    ///
    /// Returns `false` (and changes nothing) unless the rescuer is an
    /// enabled, active runner that is not already rescuing someone, and the
    /// target is a frozen runner with no rescuer.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::AgentNotFound`] or [`AgentError::WrongRole`].
    pub fn start_rescue(&mut self, target: AgentId, rescuer: AgentId) -> Result<bool, AgentError> {
        if target == rescuer {
            return Ok(false);
        }
        let rescuer_enabled = self.get(rescuer).is_some_and(|a| a.enabled);
        let free = self.runner(rescuer)?;
        if !rescuer_enabled || free.is_frozen() || free.rescuing().is_some() {
            return Ok(false);
        }
        if !self.runner_mut(target)?.begin_rescue(target, rescuer) {
            return Ok(false);
        }
        self.runner_mut(rescuer)?.set_rescuing(Some(target));
        Ok(true)
    }

    /// Cancel the rescue of `target`, if one is running. Returns the
    /// rescuer.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::AgentNotFound`] or [`AgentError::WrongRole`].
    pub fn cancel_rescue(&mut self, target: AgentId) -> Result<Option<AgentId>, AgentError> {
        let Some(rescuer) = self.runner_mut(target)?.cancel_rescue() else {
            return Ok(None);
        };
        let side = self.runner_mut(rescuer)?;
        if side.rescuing() == Some(target) {
            side.set_rescuing(None);
        }
        Ok(Some(rescuer))
    }

    /// Advance every running rescue by `dt_ms` and report completions.
    ///
    /// # Errors
    ///
    /// Propagates timer overflow and lookup errors.
    pub fn advance_rescues(
        &mut self,
        dt_ms: u64,
        threshold_ms: u64,
        now_ms: u64,
    ) -> Result<Vec<CompletedRescue>, AgentError> {
        let targets: Vec<AgentId> = self
            .runners()
            .filter(|(_, r)| r.rescuer().is_some())
            .map(|(id, _)| id)
            .collect();

        let mut completed = Vec::new();
        for runner in targets {
            if let RescueProgress::Completed { rescuer, frozen_ms } =
                self.runner_mut(runner)?
                    .advance_rescue(dt_ms, threshold_ms, now_ms)?
            {
                self.runner_mut(rescuer)?.set_rescuing(None);
                completed.push(CompletedRescue {
                    runner,
                    rescuer,
                    frozen_ms,
                });
            }
        }
        Ok(completed)
    }

    /// Force runner `id` to active. Used for the initial unfreeze.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::AgentNotFound`] or [`AgentError::WrongRole`].
    pub fn force_activate(&mut self, id: AgentId, now_ms: u64) -> Result<(), AgentError> {
        if let Some(rescuer) = self.runner_mut(id)?.force_activate(now_ms) {
            self.runner_mut(rescuer)?.set_rescuing(None);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn roster_with(runners: u64, taggers: u64) -> Roster {
        let mut roster = Roster::new();
        for n in 0..runners {
            roster
                .add(Role::Runner, Behavior::Learned, BodyHandle(n), 0)
                .unwrap();
        }
        for n in 0..taggers {
            roster
                .add(Role::Tagger, Behavior::Learned, BodyHandle(100 + n), 0)
                .unwrap();
        }
        roster
    }

    #[test]
    fn runners_join_frozen_taggers_empty() {
        let roster = roster_with(3, 2);
        assert_eq!(roster.runner_count(), 3);
        assert_eq!(roster.tagger_count(), 2);
        assert_eq!(roster.frozen_runner_count(), 3);
        assert_eq!(roster.charge_counts(), vec![0, 0]);
    }

    #[test]
    fn rescue_links_both_sides() {
        let mut roster = roster_with(2, 0);
        let (a, b) = (AgentId(0), AgentId(1));
        roster.force_activate(b, 0).unwrap();

        assert!(roster.start_rescue(a, b).unwrap());
        assert_eq!(roster.runner(a).unwrap().rescuer(), Some(b));
        assert_eq!(roster.runner(b).unwrap().rescuing(), Some(a));
        assert!(roster.any_rescue_in_progress());

        assert_eq!(roster.cancel_rescue(a).unwrap(), Some(b));
        assert_eq!(roster.runner(a).unwrap().phase(), RunnerPhase::Frozen);
        assert_eq!(roster.runner(b).unwrap().rescuing(), None);
    }

    #[test]
    fn rescuer_handles_one_rescue_at_a_time() {
        let mut roster = roster_with(3, 0);
        let rescuer = AgentId(2);
        roster.force_activate(rescuer, 0).unwrap();

        assert!(roster.start_rescue(AgentId(0), rescuer).unwrap());
        assert!(!roster.start_rescue(AgentId(1), rescuer).unwrap());
        assert_eq!(roster.runner(AgentId(1)).unwrap().phase(), RunnerPhase::Frozen);
    }

    #[test]
    fn frozen_or_disabled_runner_cannot_rescue() {
        let mut roster = roster_with(2, 0);
        assert!(!roster.start_rescue(AgentId(0), AgentId(1)).unwrap());

        roster.force_activate(AgentId(1), 0).unwrap();
        roster.deactivate_all();
        assert!(!roster.start_rescue(AgentId(0), AgentId(1)).unwrap());
    }

    #[test]
    fn freezing_the_rescuer_cancels_its_rescue() {
        let mut roster = roster_with(2, 0);
        let (target, rescuer) = (AgentId(0), AgentId(1));
        roster.force_activate(rescuer, 0).unwrap();
        roster.start_rescue(target, rescuer).unwrap();

        let outcome = roster.freeze_runner(rescuer, 100).unwrap();
        assert!(matches!(
            outcome,
            FreezeOutcome::Frozen {
                abandoned: Some(t),
                ..
            } if t == target
        ));
        assert_eq!(roster.runner(target).unwrap().phase(), RunnerPhase::Frozen);
        assert!(!roster.any_rescue_in_progress());
    }

    #[test]
    fn advance_reports_completion_and_unlinks() {
        let mut roster = roster_with(2, 0);
        let (target, rescuer) = (AgentId(0), AgentId(1));
        roster.force_activate(rescuer, 0).unwrap();
        roster.start_rescue(target, rescuer).unwrap();

        assert!(roster.advance_rescues(4000, 5000, 4000).unwrap().is_empty());
        let done = roster.advance_rescues(1000, 5000, 5000).unwrap();
        assert_eq!(
            done,
            vec![CompletedRescue {
                runner: target,
                rescuer,
                frozen_ms: 5000
            }]
        );
        assert_eq!(roster.runner(rescuer).unwrap().rescuing(), None);
        assert_eq!(roster.frozen_runner_count(), 0);
    }

    #[test]
    fn wrong_role_lookups_fail() {
        let mut roster = roster_with(1, 1);
        assert!(matches!(
            roster.runner(AgentId(1)),
            Err(AgentError::WrongRole { .. })
        ));
        assert!(matches!(
            roster.tagger_mut(AgentId(0)),
            Err(AgentError::WrongRole { .. })
        ));
        assert!(matches!(
            roster.runner(AgentId(9)),
            Err(AgentError::AgentNotFound(_))
        ));
    }

    #[test]
    fn clear_keeps_id_sequence() {
        let mut roster = roster_with(2, 0);
        assert_eq!(roster.clear().len(), 2);
        let id = roster
            .add(Role::Runner, Behavior::Heuristic, BodyHandle(7), 0)
            .unwrap();
        assert_eq!(id, AgentId(2));
        assert!(roster.any_heuristic());
    }
}
