// In crates/engine/src/ledger.rs

use crate::error::{Error, Result};
use core_types::{position_key, Symbol, Timeframe, TrackedPosition};
use std::collections::BTreeMap;

/// The open-position set, one entry per (symbol, timeframe) key.
///
/// Loading and `replace_all` both run the same defensive merge: should the
/// persisted document ever contain two entries for one key, the one opened
/// latest wins and the other is dropped on the next write.
#[derive(Debug, Default)]
pub struct Ledger {
    positions: BTreeMap<String, TrackedPosition>,
}

impl Ledger {
    /// Rebuilds the ledger from the persisted open set.
    pub fn load(positions: Vec<TrackedPosition>) -> Self {
        Self {
            positions: merge(positions),
        }
    }

    pub fn contains(&self, symbol: &Symbol, timeframe: Timeframe) -> bool {
        self.positions.contains_key(&position_key(symbol, timeframe))
    }

    /// Adds a new position. Fails with `DuplicateKey` when one is already
    /// open for the key; the single-open-position invariant lives here.
    pub fn add(&mut self, position: TrackedPosition) -> Result<()> {
        let key = position.key();
        if self.positions.contains_key(&key) {
            return Err(Error::DuplicateKey { key });
        }
        self.positions.insert(key, position);
        Ok(())
    }

    /// Replaces the whole open set, collapsing duplicate keys.
    pub fn replace_all(&mut self, positions: Vec<TrackedPosition>) {
        self.positions = merge(positions);
    }

    /// The current open set, in key order.
    pub fn snapshot(&self) -> Vec<TrackedPosition> {
        self.positions.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

fn merge(positions: Vec<TrackedPosition>) -> BTreeMap<String, TrackedPosition> {
    let mut merged: BTreeMap<String, TrackedPosition> = BTreeMap::new();
    for position in positions {
        match merged.entry(position.key()) {
            std::collections::btree_map::Entry::Vacant(entry) => {
                entry.insert(position);
            }
            std::collections::btree_map::Entry::Occupied(mut entry) => {
                if position.opened_at > entry.get().opened_at {
                    entry.insert(position);
                }
            }
        }
    }
    merged
}
