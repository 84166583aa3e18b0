//! Arena geometry, item spawn pools, and proximity queries for the freeze
//! tag environment.
//!
//! # Modules
//!
//! - [`arena`] -- Arena bounds and random spawn placement.
//! - [`error`] -- Error types for arena and pool operations.
//! - [`pool`] -- [`SpawnPool`]: bounded-capacity item collections.
//! - [`proximity`] -- Radius queries over agent and item positions.

pub mod arena;
pub mod error;
pub mod pool;
pub mod proximity;

// Re-export primary types at crate root.
pub use arena::Arena;
pub use error::WorldError;
pub use pool::{Item, SpawnPool};
pub use proximity::{nearest_within, within_radius};
