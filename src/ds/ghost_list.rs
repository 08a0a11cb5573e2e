//! Bounded recency list for ghost entries.
//!
//! Used by the ARC core to remember keys that were recently evicted from its
//! resident lists without keeping their values. Recency is tracked with a
//! monotonically increasing stamp per record, so the oldest key is always the
//! first entry of an ordered map.
//!
//! ## Architecture
//!
//! ```text
//!   index: FxHashMap<K, u64>          order: BTreeMap<u64, K>
//!   ┌─────────┬───────┐               ┌───────┬─────────┐
//!   │  key A  │   7   │               │   3   │  key C  │ ◄── LRU (evicted first)
//!   │  key B  │   5   │               │   5   │  key B  │
//!   │  key C  │   3   │               │   7   │  key A  │ ◄── MRU
//!   └─────────┴───────┘               └───────┴─────────┘
//! ```
//!
//! ## Behavior
//! - `record(k)`: moves key to MRU, evicts LRU if at capacity
//! - `remove(k)`: deletes from order and index
//! - `clear()`: resets both maps (the stamp counter keeps running)
//!
//! ## Performance
//! - `contains`: O(1) average
//! - `record` / `remove`: O(log n)
use std::collections::BTreeMap;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::error::InvariantError;

/// Bounded recency list of keys (no values), used for ARC ghost tracking.
#[derive(Debug)]
pub struct GhostList<K> {
    index: FxHashMap<K, u64>,
    order: BTreeMap<u64, K>,
    next_stamp: u64,
    capacity: usize,
}

impl<K> GhostList<K>
where
    K: Eq + Hash + Clone,
{
    /// Creates a new ghost list with a maximum of `capacity` keys.
    ///
    /// No storage is reserved up front; ghost entries only appear once the
    /// owning cache starts evicting.
    pub fn new(capacity: usize) -> Self {
        Self {
            index: FxHashMap::default(),
            order: BTreeMap::new(),
            next_stamp: 0,
            capacity,
        }
    }

    /// Returns the configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of keys currently tracked.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if there are no keys tracked.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns `true` if `key` is present.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Records `key` as most-recently-seen, evicting the least recent if needed.
    pub fn record(&mut self, key: K) {
        if self.capacity == 0 {
            return;
        }

        let stamp = self.bump();
        if let Some(old) = self.index.insert(key.clone(), stamp) {
            self.order.remove(&old);
            self.order.insert(stamp, key);
            return;
        }

        self.order.insert(stamp, key);
        if self.order.len() > self.capacity
            && let Some((_, oldest)) = self.order.pop_first()
        {
            self.index.remove(&oldest);
        }
    }

    /// Removes `key` from the ghost list; returns `true` if it was present.
    pub fn remove(&mut self, key: &K) -> bool {
        match self.index.remove(key) {
            Some(stamp) => {
                self.order.remove(&stamp);
                true
            },
            None => false,
        }
    }

    /// Drops the least recently recorded key and returns it.
    pub fn pop_oldest(&mut self) -> Option<K> {
        let (_, key) = self.order.pop_first()?;
        self.index.remove(&key);
        Some(key)
    }

    /// Clears all tracked keys.
    pub fn clear(&mut self) {
        self.index.clear();
        self.order.clear();
    }

    /// Verifies that the index and the recency order describe the same keys.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.index.len() != self.order.len() {
            return Err(InvariantError::new(format!(
                "ghost index has {} keys but order has {}",
                self.index.len(),
                self.order.len()
            )));
        }
        if self.index.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "ghost list holds {} keys, capacity {}",
                self.index.len(),
                self.capacity
            )));
        }
        for (stamp, key) in &self.order {
            if self.index.get(key) != Some(stamp) {
                return Err(InvariantError::new(format!(
                    "ghost stamp {stamp} does not match its index entry"
                )));
            }
        }
        Ok(())
    }

    fn bump(&mut self) -> u64 {
        let stamp = self.next_stamp;
        self.next_stamp += 1;
        stamp
    }
}
