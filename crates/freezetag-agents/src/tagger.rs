//! Tagger charge bookkeeping.
//!
//! A tagger holds a non-negative number of freeze charges. Each capture
//! spends exactly one; contact without a charge does nothing. The
//! interference flag is set on every tagger for as long as any rescue is
//! in progress and drives a continuous team penalty.

use serde::{Deserialize, Serialize};

use crate::error::AgentError;

/// Per-tagger state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggerState {
    charges: u32,
    interfering: bool,
}

impl TaggerState {
    /// A fresh tagger with no charges.
    pub const fn new() -> Self {
        Self {
            charges: 0,
            interfering: false,
        }
    }

    /// Charges currently held.
    pub const fn charges(&self) -> u32 {
        self.charges
    }

    /// Pick up one freeze charge. Returns the new count.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ArithmeticOverflow`] if the count overflows.
    pub fn collect_charge(&mut self) -> Result<u32, AgentError> {
        self.charges = self
            .charges
            .checked_add(1)
            .ok_or(AgentError::ArithmeticOverflow {
                context: "tagger charges",
            })?;
        Ok(self.charges)
    }

    /// Spend one charge if any is held. Returns whether a charge was spent.
    pub const fn try_spend_charge(&mut self) -> bool {
        match self.charges.checked_sub(1) {
            Some(left) => {
                self.charges = left;
                true
            }
            None => false,
        }
    }

    /// Whether the rescue-interference penalty applies.
    pub const fn is_interfering(&self) -> bool {
        self.interfering
    }

    /// Set the rescue-interference flag.
    pub const fn set_interfering(&mut self, interfering: bool) {
        self.interfering = interfering;
    }
}
