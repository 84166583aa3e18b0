//! Baseline decision source: seeded random actions.
//!
//! Each agent draws a fresh random action every `decision_period` ticks
//! and repeats it in between, which gives wandering rather than jitter.
//! It stands in for a learned policy when the engine runs headless.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use tracing::debug;

use freezetag_core::{AgentView, DecisionError, DecisionSource};
use freezetag_types::{AgentAction, AgentId, Outcome};

#[derive(Debug, Clone, Copy)]
struct Held {
    action: AgentAction,
    remaining: u32,
}

/// Random policy with a fixed decision period.
#[derive(Debug)]
pub struct RandomDecisionSource {
    rng: StdRng,
    decision_period: u32,
    held: BTreeMap<AgentId, Held>,
    returns: BTreeMap<AgentId, Decimal>,
}

impl RandomDecisionSource {
    /// Create a policy seeded with `seed` that re-decides every
    /// `decision_period` ticks (at least every tick).
    pub fn new(seed: u64, decision_period: u32) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            decision_period: decision_period.max(1),
            held: BTreeMap::new(),
            returns: BTreeMap::new(),
        }
    }

    /// Reward accumulated by `agent` in the current episode.
    pub fn episode_return(&self, agent: AgentId) -> Decimal {
        self.returns.get(&agent).copied().unwrap_or_default()
    }

    fn draw(&mut self, agent: AgentId) -> Result<AgentAction, DecisionError> {
        let branches = [
            self.rng.random_range(0..3),
            self.rng.random_range(0..3),
            self.rng.random_range(0..2),
        ];
        AgentAction::from_discrete(branches)
            .map_err(|source| DecisionError::InvalidAction { agent, source })
    }
}

impl DecisionSource for RandomDecisionSource {
    fn collect_decisions(
        &mut self,
        _tick: u64,
        views: &BTreeMap<AgentId, AgentView>,
    ) -> Result<BTreeMap<AgentId, AgentAction>, DecisionError> {
        self.held.retain(|agent, _| views.contains_key(agent));

        let mut actions = BTreeMap::new();
        for &agent in views.keys() {
            let action = match self.held.get_mut(&agent) {
                Some(held) if held.remaining > 0 => {
                    held.remaining = held.remaining.saturating_sub(1);
                    held.action
                }
                _ => {
                    let action = self.draw(agent)?;
                    self.held.insert(
                        agent,
                        Held {
                            action,
                            remaining: self.decision_period.saturating_sub(1),
                        },
                    );
                    action
                }
            };
            actions.insert(agent, action);
        }
        Ok(actions)
    }

    fn receive_rewards(&mut self, _tick: u64, rewards: &BTreeMap<AgentId, Decimal>) {
        for (&agent, &amount) in rewards {
            let total = self.returns.entry(agent).or_default();
            *total = total.saturating_add(amount);
        }
    }

    fn episode_ended(&mut self, agents: &[AgentId], outcome: Outcome) {
        for agent in agents {
            let total = self.returns.remove(agent).unwrap_or_default();
            debug!(%agent, %outcome, episode_return = %total, "agent episode closed");
        }
        self.returns.clear();
        self.held.clear();
    }
}
