//! The reward ledger: an append-only log of every reward granted in the
//! current episode.
//!
//! # Design
//!
//! - **Append-only** within an episode; [`RewardLedger::reset`] clears it
//!   when the next episode begins.
//! - **Additive**: terminal rewards are entries like any other, never an
//!   overwrite of what the agent already earned this tick.
//! - **Precision**: all amounts use [`Decimal`] -- no floating point drift
//!   over thousands of ticks.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use freezetag_types::AgentId;

use crate::LedgerError;
use crate::balance::{BalanceResult, verify_tick};

// ---------------------------------------------------------------------------
// Entry types
// ---------------------------------------------------------------------------

/// What triggered a reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardKind {
    /// Continuous reward for an unfrozen runner.
    Survival,
    /// A runner collected food.
    FoodCollected,
    /// A tagger collected a freeze charge.
    ChargeCollected,
    /// A tagger froze a runner.
    FreezeBonus,
    /// Continuous reward for a rescuer while the rescue progresses.
    RescueProgress,
    /// One-time reward for completing a rescue.
    RescueBonus,
    /// Continuous penalty for taggers while any runner is unfrozen.
    TaggerPressure,
    /// Continuous team penalty for taggers while any rescue is in progress.
    RescueInterference,
    /// One-time penalty for every active tagger when a rescue succeeds.
    RescueSuccessPenalty,
    /// Terminal reward for taggers when every runner is frozen.
    CaptureWin,
    /// Terminal penalty for taggers when the pursuit time limit expires.
    TimeoutLoss,
    /// Terminal reward for unfrozen runners when the pursuit time limit
    /// expires.
    TimeoutSurvival,
}

impl RewardKind {
    /// Whether this reward is granted once per episode at termination.
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::CaptureWin | Self::TimeoutLoss | Self::TimeoutSurvival
        )
    }
}

/// One reward granted to one agent in one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardEntry {
    /// Global tick in which the reward was granted.
    pub tick: u64,
    /// The receiving agent.
    pub agent: AgentId,
    /// What triggered it.
    pub kind: RewardKind,
    /// Signed amount.
    pub amount: Decimal,
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// Reward bookkeeping for the live episode.
///
/// Rewards accumulate in a pending per-agent map until [`drain_tick`]
/// hands them out. Nothing is dropped between recording and draining, and
/// nothing is counted twice.
///
/// [`drain_tick`]: RewardLedger::drain_tick
#[derive(Debug, Default)]
pub struct RewardLedger {
    /// All entries of the episode, in insertion order.
    entries: Vec<RewardEntry>,
    /// Sum per agent since the last drain.
    pending: BTreeMap<AgentId, Decimal>,
    /// Sum per agent of everything already drained this episode.
    drained: BTreeMap<AgentId, Decimal>,
    /// Index range into `entries` covered by the most recent drain.
    last_drain: core::ops::Range<usize>,
}

impl RewardLedger {
    /// Create a new empty ledger.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            pending: BTreeMap::new(),
            drained: BTreeMap::new(),
            last_drain: 0..0,
        }
    }

    /// Number of entries recorded this episode.
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no reward has been recorded this episode.
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Grant `amount` to `agent`.
    ///
    /// A zero amount is skipped: it cannot change any total and would
    /// only pad the log (a reward disabled through configuration).
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Overflow`] if the agent's pending total
    /// leaves the decimal range. Nothing is recorded in that case.
    pub fn record(
        &mut self,
        tick: u64,
        agent: AgentId,
        kind: RewardKind,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        if amount.is_zero() {
            return Ok(());
        }

        let current = self.pending.get(&agent).copied().unwrap_or(Decimal::ZERO);
        let updated = current
            .checked_add(amount)
            .ok_or(LedgerError::Overflow { agent })?;
        self.pending.insert(agent, updated);
        self.entries.push(RewardEntry {
            tick,
            agent,
            kind,
            amount,
        });
        Ok(())
    }

    /// Hand out every pending per-agent total and clear the pending map.
    ///
    /// Agents with no reward since the last drain are absent from the
    /// returned map.
    pub fn drain_tick(&mut self) -> BTreeMap<AgentId, Decimal> {
        self.last_drain = self.last_drain.end..self.entries.len();
        let out = core::mem::take(&mut self.pending);
        for (agent, amount) in &out {
            let total = self.drained.entry(*agent).or_insert(Decimal::ZERO);
            // Every drained amount was already range-checked by `record`.
            *total = total.checked_add(*amount).unwrap_or(*total);
        }
        out
    }

    /// Pending (not yet drained) reward for `agent`.
    pub fn pending_for(&self, agent: AgentId) -> Decimal {
        self.pending.get(&agent).copied().unwrap_or(Decimal::ZERO)
    }

    /// Everything `agent` has earned this episode, drained or not.
    pub fn episode_total(&self, agent: AgentId) -> Decimal {
        let drained = self.drained.get(&agent).copied().unwrap_or(Decimal::ZERO);
        drained
            .checked_add(self.pending_for(agent))
            .unwrap_or(drained)
    }

    /// Sum of all entries of `kind` granted to `agent` this episode.
    pub fn total_by_kind(&self, agent: AgentId, kind: RewardKind) -> Decimal {
        self.entries
            .iter()
            .filter(|e| e.agent == agent && e.kind == kind)
            .fold(Decimal::ZERO, |acc, e| {
                acc.checked_add(e.amount).unwrap_or(acc)
            })
    }

    /// Number of entries of `kind` granted to `agent` this episode.
    pub fn count_by_kind(&self, agent: AgentId, kind: RewardKind) -> usize {
        self.entries
            .iter()
            .filter(|e| e.agent == agent && e.kind == kind)
            .count()
    }

    /// All entries of the episode.
    pub fn all_entries(&self) -> &[RewardEntry] {
        &self.entries
    }

    /// Entries covered by the most recent [`drain_tick`].
    ///
    /// [`drain_tick`]: RewardLedger::drain_tick
    pub fn last_drained_entries(&self) -> &[RewardEntry] {
        self.entries.get(self.last_drain.clone()).unwrap_or_default()
    }

    /// Check that `drained` matches this ledger's entries for `tick`.
    ///
    /// Only the entries covered by the most recent drain are scanned, so
    /// the cost does not grow with episode length.
    pub fn verify_tick(&self, tick: u64, drained: &BTreeMap<AgentId, Decimal>) -> BalanceResult {
        verify_tick(tick, self.last_drained_entries(), drained)
    }

    /// Forget the episode. Called by the reset protocol.
    pub fn reset(&mut self) {
        debug!(entries = self.entries.len(), "reward ledger reset");
        self.entries.clear();
        self.pending.clear();
        self.drained.clear();
        self.last_drain = 0..0;
    }
}

/// Convert a per-second `rate` into the amount for one tick of `dt_ms`.
///
/// # Errors
///
/// Returns [`LedgerError::RateOverflow`] if the multiplication overflows.
pub fn per_tick(rate: Decimal, dt_ms: u64) -> Result<Decimal, LedgerError> {
    let overflow = || LedgerError::RateOverflow { rate, dt_ms };
    let millis = i64::try_from(dt_ms).map_err(|_err| overflow())?;
    rate.checked_mul(Decimal::new(millis, 3)).ok_or_else(overflow)
}
