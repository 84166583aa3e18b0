//! Bounded-capacity pools of collectible items.
//!
//! A [`SpawnPool`] owns every live item of one kind. It never holds more
//! than `capacity` active items, and collecting an item that is already
//! gone is a safe no-op rather than an error. The controller calls
//! [`SpawnPool::spawn`] once after every successful collection to keep the
//! population steady.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use freezetag_types::{ItemId, ItemKind, Vec3};

use crate::arena::Arena;
use crate::error::WorldError;

/// A live collectible.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Identifier, unique within the pool.
    pub id: ItemId,
    /// Food or freeze charge.
    pub kind: ItemKind,
    /// Where the item sits.
    pub position: Vec3,
    /// Episode time at which the item appeared.
    pub spawned_at_ms: u64,
}

impl Item {
    /// How long the item has existed at `now_ms`.
    pub const fn lifetime_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.spawned_at_ms)
    }
}

/// Active items of one kind, bounded by `capacity`.
#[derive(Debug, Clone)]
pub struct SpawnPool {
    /// Which item kind this pool produces.
    kind: ItemKind,
    /// Template the items are instantiated from; `None` means unset.
    template: Option<String>,
    /// Maximum simultaneously active items.
    capacity: u32,
    /// Whether the pool produces items at the current level.
    enabled: bool,
    /// Active items keyed by id.
    items: BTreeMap<ItemId, Item>,
    /// Next identifier to hand out.
    next_id: ItemId,
}

impl SpawnPool {
    /// Create an empty pool with zero capacity.
    pub const fn new(kind: ItemKind, template: Option<String>) -> Self {
        Self {
            kind,
            template,
            capacity: 0,
            enabled: true,
            items: BTreeMap::new(),
            next_id: ItemId::from_raw(0),
        }
    }

    /// Item kind produced by this pool.
    pub const fn kind(&self) -> ItemKind {
        self.kind
    }

    /// Maximum simultaneously active items.
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Whether spawning is enabled.
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Number of active items.
    pub fn active_count(&self) -> usize {
        self.items.len()
    }

    /// Iterate over active items in id order.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    /// Look up an active item.
    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    /// Set capacity and enablement for the next episode.
    ///
    /// Only valid on a cleared pool; existing items are not trimmed.
    pub const fn configure(&mut self, capacity: u32, enabled: bool) {
        self.capacity = capacity;
        self.enabled = enabled;
    }

    fn has_room(&self) -> bool {
        self.enabled && u32::try_from(self.items.len()).is_ok_and(|n| n < self.capacity)
    }

    /// Spawn one item at a random point if there is room.
    ///
    /// Returns `Ok(None)` when the pool is full or disabled.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::MissingTemplate`] when the pool has no item
    /// template, and [`WorldError::IdExhausted`] if identifiers run out.
    pub fn spawn(
        &mut self,
        arena: &Arena,
        rng: &mut impl Rng,
        now_ms: u64,
    ) -> Result<Option<ItemId>, WorldError> {
        if !self.has_room() {
            return Ok(None);
        }
        if self.template.is_none() {
            return Err(WorldError::MissingTemplate { kind: self.kind });
        }

        let id = self.next_id;
        self.next_id = id
            .next()
            .ok_or(WorldError::IdExhausted { kind: self.kind })?;

        let item = Item {
            id,
            kind: self.kind,
            position: arena.random_point(rng),
            spawned_at_ms: now_ms,
        };
        self.items.insert(id, item);
        debug!(kind = %self.kind, item = %id, "item spawned");
        Ok(Some(id))
    }

    /// Spawn until the pool is at capacity. Returns how many were added.
    ///
    /// # Errors
    ///
    /// Propagates the first [`SpawnPool::spawn`] error.
    pub fn fill(
        &mut self,
        arena: &Arena,
        rng: &mut impl Rng,
        now_ms: u64,
    ) -> Result<u32, WorldError> {
        let mut added: u32 = 0;
        while self.spawn(arena, rng, now_ms)?.is_some() {
            added = added.saturating_add(1);
        }
        Ok(added)
    }

    /// Remove an item from active tracking.
    ///
    /// Returns the removed item, or `None` if it was already collected.
    pub fn collect(&mut self, id: ItemId) -> Option<Item> {
        self.items.remove(&id)
    }

    /// Remove every active item. Used only by the reset protocol.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}
