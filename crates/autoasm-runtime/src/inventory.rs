#![forbid(unsafe_code)]

//! Grid-wide item totals.

use std::cell::OnceCell;
use std::collections::BTreeMap;

use autoasm_core::{Amount, InventoryRef, ItemId, Platform, RawStack};

use crate::registry::{BlockRegistry, GridFilter};

/// Total amount per item across a set of inventories.
///
/// Items that were never seen read as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventorySnapshot {
    counts: BTreeMap<ItemId, Amount>,
}

impl InventorySnapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold raw stacks, normalizing each stack's identity.
    pub fn from_stacks<'a>(stacks: impl IntoIterator<Item = &'a RawStack>) -> Self {
        let mut snapshot = Self::new();
        for stack in stacks {
            snapshot.add(ItemId::normalize(&stack.type_id, &stack.subtype), stack.amount);
        }
        snapshot
    }

    pub fn add(&mut self, id: ItemId, amount: Amount) {
        *self.counts.entry(id).or_insert(Amount::ZERO) += amount;
    }

    #[must_use]
    pub fn count(&self, id: &ItemId) -> Amount {
        self.counts.get(id).copied().unwrap_or(Amount::ZERO)
    }

    /// Entries in canonical id order.
    pub fn iter(&self) -> impl Iterator<Item = (&ItemId, Amount)> {
        self.counts.iter().map(|(id, amount)| (id, *amount))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Combine with another snapshot, summing shared items.
    #[must_use]
    pub fn merge(mut self, other: &Self) -> Self {
        for (id, amount) in other.iter() {
            self.add(id.clone(), amount);
        }
        self
    }
}

/// Read and total every listed inventory.
///
/// Inventories the platform cannot resolve are skipped.
pub fn aggregate<P: Platform + ?Sized>(
    platform: &P,
    inventories: &[InventoryRef],
) -> InventorySnapshot {
    let mut snapshot = InventorySnapshot::new();
    let mut skipped = 0usize;
    for &inventory in inventories {
        match platform.inventory(inventory) {
            Some(stacks) => {
                for stack in &stacks {
                    snapshot.add(ItemId::normalize(&stack.type_id, &stack.subtype), stack.amount);
                }
            }
            None => skipped += 1,
        }
    }
    tracing::debug!(
        inventories = inventories.len(),
        skipped,
        items = snapshot.len(),
        "aggregated inventories"
    );
    snapshot
}

/// Snapshot computed at most once per invocation.
#[derive(Debug, Default)]
pub struct InventoryCache {
    snapshot: OnceCell<InventorySnapshot>,
}

impl InventoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current-grid snapshot, scanning on first use.
    pub fn get_or_scan<P: Platform + ?Sized>(
        &self,
        platform: &P,
        registry: &BlockRegistry,
    ) -> &InventorySnapshot {
        self.snapshot
            .get_or_init(|| aggregate(platform, &registry.inventories(GridFilter::Current)))
    }

    #[must_use]
    pub fn is_scanned(&self) -> bool {
        self.snapshot.get().is_some()
    }
}
