//! Error types for the freezetag-agents crate.
//!
//! Invalid game transitions (freezing with no charge, rescuing a runner who
//! already has a rescuer) are not errors; they are reported as no-op
//! outcomes. The variants here cover roster bookkeeping and arithmetic.

use freezetag_ledger::LedgerError;
use freezetag_types::{AgentId, Role};

/// Errors that can occur during agent state operations.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// Agent with the given ID was not found in the roster.
    #[error("agent not found: {0}")]
    AgentNotFound(AgentId),

    /// The agent exists but plays a different role.
    #[error("agent {agent} is not a {expected}")]
    WrongRole {
        /// The agent.
        agent: AgentId,
        /// The role the caller required.
        expected: Role,
    },

    /// The roster ran out of agent identifiers.
    #[error("agent identifiers exhausted")]
    IdExhausted,

    /// An arithmetic overflow occurred in a counter.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: &'static str,
    },

    /// Recording a reward failed.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}
