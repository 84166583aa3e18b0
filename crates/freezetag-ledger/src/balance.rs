//! Tick balance verification for the reward ledger.
//!
//! The controller drains per-agent totals once per tick. This module checks
//! that those totals equal the sum of the entries recorded for that tick,
//! agent by agent: no reward silently dropped, none counted twice.
//!
//! ```text
//! drained(A, T) == sum(entry.amount for entry in T where entry.agent == A)
//! ```

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;

use freezetag_types::AgentId;

use crate::RewardAnomaly;
use crate::ledger::RewardEntry;

/// The result of a balance check for a single tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceResult {
    /// Drained totals match the entries.
    Balanced,
    /// One or more agents' totals disagree with the entries.
    Anomaly(RewardAnomaly),
}

/// Verify that `drained` equals the per-agent sum of `entries` in `tick`.
pub fn verify_tick(
    tick: u64,
    entries: &[RewardEntry],
    drained: &BTreeMap<AgentId, Decimal>,
) -> BalanceResult {
    let mut recorded: BTreeMap<AgentId, Decimal> = BTreeMap::new();

    for entry in entries {
        if entry.tick != tick {
            continue;
        }
        let sum = recorded.entry(entry.agent).or_insert(Decimal::ZERO);
        *sum = match sum.checked_add(entry.amount) {
            Some(val) => val,
            None => return overflow_anomaly(tick, entry.agent),
        };
    }

    let agents: BTreeSet<AgentId> = recorded.keys().chain(drained.keys()).copied().collect();

    let mut mismatches: BTreeMap<AgentId, (Decimal, Decimal)> = BTreeMap::new();
    for agent in &agents {
        let entry_total = recorded.get(agent).copied().unwrap_or(Decimal::ZERO);
        let drained_total = drained.get(agent).copied().unwrap_or(Decimal::ZERO);
        if entry_total != drained_total {
            mismatches.insert(*agent, (entry_total, drained_total));
        }
    }

    if mismatches.is_empty() {
        BalanceResult::Balanced
    } else {
        let count = mismatches.len();
        BalanceResult::Anomaly(RewardAnomaly {
            tick,
            mismatches,
            message: format!("REWARD_ANOMALY at tick {tick}: {count} agent(s) out of balance"),
        })
    }
}

/// Construct an anomaly result for arithmetic overflow during summation.
fn overflow_anomaly(tick: u64, agent: AgentId) -> BalanceResult {
    let mut mismatches = BTreeMap::new();
    mismatches.insert(agent, (Decimal::ZERO, Decimal::ZERO));
    BalanceResult::Anomaly(RewardAnomaly {
        tick,
        mismatches,
        message: format!("REWARD_ANOMALY at tick {tick}: arithmetic overflow while summing {agent}"),
    })
}
