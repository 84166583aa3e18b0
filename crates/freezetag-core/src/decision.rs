//! Decision source trait and the idle implementation.
//!
//! Each tick the controller presents every enabled agent with an
//! [`AgentView`] and asks for an [`AgentAction`] in return. The
//! [`DecisionSource`] trait abstracts how those actions are produced: a
//! trained policy, a training process on the other end of a pipe, manual
//! input, or a test script. Learned and heuristic sources are
//! interchangeable.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use freezetag_types::{AgentAction, AgentId, Observation, Outcome, Role};

/// Errors that can occur while collecting decisions.
#[derive(Debug, thiserror::Error)]
pub enum DecisionError {
    /// The policy produced an action the core cannot decode.
    #[error("invalid action for {agent}: {source}")]
    InvalidAction {
        /// The agent whose action was rejected.
        agent: AgentId,
        /// The decode failure.
        source: freezetag_types::ActionDecodeError,
    },

    /// An internal error in the decision source.
    #[error("decision source error: {message}")]
    Internal {
        /// Description of the error.
        message: String,
    },
}

/// What one agent sees this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentView {
    /// The agent's role, which selects the observation layout.
    pub role: Role,
    /// The observation.
    pub observation: Observation,
}

impl AgentView {
    /// The flattened observation vector for this agent's role.
    pub fn to_vector(&self) -> Vec<f64> {
        self.observation.to_vector(self.role)
    }
}

/// A source of agent decisions.
///
/// The controller calls [`collect_decisions`] once per running tick with
/// a view for every enabled agent. Agents missing from the returned map
/// idle for the tick.
///
/// [`collect_decisions`]: DecisionSource::collect_decisions
pub trait DecisionSource {
    /// Collect actions for the given tick.
    ///
    /// # Errors
    ///
    /// Returns [`DecisionError`] if the decision process fails entirely.
    fn collect_decisions(
        &mut self,
        tick: u64,
        views: &BTreeMap<AgentId, AgentView>,
    ) -> Result<BTreeMap<AgentId, AgentAction>, DecisionError>;

    /// Whether actions come from manual input rather than a learned
    /// policy. A heuristic source forces manual episode parameters.
    fn is_heuristic(&self) -> bool {
        false
    }

    /// Rewards drained for the tick, keyed by agent.
    fn receive_rewards(&mut self, _tick: u64, _rewards: &BTreeMap<AgentId, Decimal>) {}

    /// The episode ended; `agents` lists every agent that took part.
    fn episode_ended(&mut self, _agents: &[AgentId], _outcome: Outcome) {}
}

/// A decision source that never acts: every agent idles every tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdleDecisionSource;

impl IdleDecisionSource {
    /// Create a new idle decision source.
    pub const fn new() -> Self {
        Self
    }
}

impl DecisionSource for IdleDecisionSource {
    fn collect_decisions(
        &mut self,
        _tick: u64,
        views: &BTreeMap<AgentId, AgentView>,
    ) -> Result<BTreeMap<AgentId, AgentAction>, DecisionError> {
        Ok(views
            .keys()
            .map(|&agent| (agent, AgentAction::IDLE))
            .collect())
    }
}
