//! Per-agent reward bookkeeping for the freeze tag training environment.
//!
//! Every reward an agent receives, whether a one-time bonus or a slice of a
//! continuous per-second rate, is appended to the [`RewardLedger`] as a
//! [`RewardEntry`]. At the end of each tick the controller drains the
//! pending per-agent totals and hands them to the decision source.
//!
//! # Modules
//!
//! - [`ledger`] -- The [`RewardLedger`] and its entry types.
//! - [`balance`] -- Tick balance verification.
//!
//! # Balance Law
//!
//! For every tick T and every agent A:
//!
//! ```text
//! drained(A, T) == sum(entry.amount for entry in T where entry.agent == A)
//! ```
//!
//! A violation produces a [`RewardAnomaly`]. The ledger never panics; it
//! returns errors.
//!
//! # Usage
//!
//! ```
//! use freezetag_ledger::{RewardKind, RewardLedger};
//! use freezetag_ledger::balance::BalanceResult;
//! use freezetag_types::AgentId;
//! use rust_decimal::Decimal;
//!
//! let mut ledger = RewardLedger::new();
//! let runner = AgentId::from_raw(0);
//!
//! ledger.record(1, runner, RewardKind::FoodCollected, Decimal::new(2, 1)).ok();
//! ledger.record(1, runner, RewardKind::Survival, Decimal::new(2, 4)).ok();
//!
//! let drained = ledger.drain_tick();
//! assert_eq!(drained.get(&runner).copied(), Some(Decimal::new(2002, 4)));
//! assert_eq!(ledger.verify_tick(1, &drained), BalanceResult::Balanced);
//! ```

pub mod balance;
pub mod ledger;

// Re-export primary types at crate root.
pub use balance::BalanceResult;
pub use ledger::{RewardEntry, RewardKind, RewardLedger, per_tick};

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use freezetag_types::AgentId;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when recording rewards.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Accumulating an agent's reward overflowed the decimal range.
    #[error("reward accumulation overflowed for {agent}")]
    Overflow {
        /// The agent whose total overflowed.
        agent: AgentId,
    },

    /// Converting a per-second rate to a per-tick amount overflowed.
    #[error("per-tick reward overflowed for rate {rate} over {dt_ms} ms")]
    RateOverflow {
        /// The per-second rate.
        rate: Decimal,
        /// The tick length in milliseconds.
        dt_ms: u64,
    },
}

// ---------------------------------------------------------------------------
// Anomaly type
// ---------------------------------------------------------------------------

/// A mismatch between drained per-agent totals and the ledger's entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardAnomaly {
    /// The tick where the anomaly was detected.
    pub tick: u64,
    /// Per-agent mismatch: (`entry_total`, `drained_total`).
    pub mismatches: BTreeMap<AgentId, (Decimal, Decimal)>,
    /// Human-readable description of the anomaly.
    pub message: String,
}

impl core::fmt::Display for RewardAnomaly {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.message)
    }
}
