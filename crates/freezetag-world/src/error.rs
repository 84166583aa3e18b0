//! Error types for the `freezetag-world` crate.
//!
//! All fallible operations in this crate return [`WorldError`] through the
//! standard [`Result`] type.

use freezetag_types::ItemKind;

/// Errors that can occur during arena and spawn-pool operations.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The pool has no item template configured, so nothing can be spawned.
    #[error("no item template configured for {kind}")]
    MissingTemplate {
        /// The pool's item kind.
        kind: ItemKind,
    },

    /// The pool ran out of item identifiers.
    #[error("item identifiers exhausted for {kind}")]
    IdExhausted {
        /// The pool's item kind.
        kind: ItemKind,
    },

    /// Arena dimensions are negative or not finite.
    #[error("invalid arena size: {reason}")]
    InvalidArena {
        /// What is wrong with it.
        reason: &'static str,
    },
}
