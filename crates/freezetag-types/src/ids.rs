//! Type-safe identifier wrappers.
//!
//! Every entity in an episode has a strongly-typed ID to prevent accidental
//! mixing of identifiers at compile time. Agent and item IDs are sequential
//! integers handed out by their owners (the roster and the spawn pools), so
//! two runs with the same seed produce the same identifiers. The training
//! run itself is identified by a UUID v7 ([`RunId`]).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a newtype wrapper around a sequential `u64` with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident, $prefix:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl $name {
            /// Wrap a raw sequence number.
            pub const fn from_raw(raw: u64) -> Self {
                Self(raw)
            }

            /// Return the inner sequence number.
            pub const fn into_inner(self) -> u64 {
                self.0
            }

            /// Return the identifier that follows this one, or `None` on overflow.
            pub const fn next(self) -> Option<Self> {
                match self.0.checked_add(1) {
                    Some(raw) => Some(Self(raw)),
                    None => None,
                }
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }
    };
}

define_id! {
    /// Unique identifier for a runner or tagger within the roster.
    AgentId, "agent"
}

define_id! {
    /// Unique identifier for a collectible item (food or freeze charge).
    ItemId, "item"
}

define_id! {
    /// Handle to a body owned by the physics subsystem.
    BodyHandle, "body"
}

/// Identifier for a training run (one process lifetime of the engine).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Create a new run identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for RunId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}
