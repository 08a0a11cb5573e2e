//! Adaptive Replacement Cache (ARC) replacement policy.
//!
//! Balances recency against frequency with two resident lists and two ghost
//! lists, steering a target size `p` for the recency side from ghost hits.
//! This is the per-shard engine behind
//! [`ConcurrentArcCache`](crate::policy::concurrent_arc::ConcurrentArcCache).
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────────┐
//! │                           ArcCore<K, V> Layout                           │
//! │                                                                          │
//! │   map: FxHashMap<K, Resident<V>>       Resident { value, list, stamp }   │
//! │                                                                          │
//! │   T1: BTreeMap<stamp, K>  (seen once)     T2: BTreeMap<stamp, K>  (reused)│
//! │   ┌──────────────────────────────┐        ┌──────────────────────────────┐│
//! │   │ first = LRU ...... last = MRU│        │ first = LRU ...... last = MRU││
//! │   └──────────────────────────────┘        └──────────────────────────────┘│
//! │                                                                          │
//! │   B1: GhostList<K> (evicted from T1)      B2: GhostList<K> (from T2)      │
//! │                                                                          │
//! │   p: target size of T1                                                   │
//! │   • hit in B1 → grow p (favor recency)                                   │
//! │   • hit in B2 → shrink p (favor frequency)                               │
//! └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every access takes a fresh stamp from a counter, so the first entry of a
//! list's `BTreeMap` is always its least recently used key. Moving a key to
//! the MRU end is a remove plus an insert under the new stamp.
//!
//! ## Operations
//!
//! | Operation   | Time       | Notes                                   |
//! |-------------|------------|-----------------------------------------|
//! | `get`       | O(log n)   | Promotes T1→T2 or refreshes within T2   |
//! | `peek`      | O(1)       | No promotion                            |
//! | `insert`    | O(log n)   | May evict into a ghost list             |
//! | `contains`  | O(1)       | Index lookup only                       |
//! | `clear`     | O(n)       | Resets p to `capacity / 2`              |
//!
//! ## Example Usage
//!
//! ```
//! use wordhash::policy::arc::ArcCore;
//! use wordhash::traits::CoreCache;
//!
//! let mut cache = ArcCore::new(100);
//! cache.insert("page1", "content1");
//! assert_eq!(cache.t1_len(), 1);
//!
//! // Re-access promotes to the frequency side.
//! assert_eq!(cache.get(&"page1"), Some(&"content1"));
//! assert_eq!(cache.t2_len(), 1);
//! ```
//!
//! ## Thread Safety
//!
//! `ArcCore` is single-threaded; the concurrent cache puts one behind each
//! shard lock.
//!
//! ## References
//!
//! - Megiddo & Modha, "ARC: A Self-Tuning, Low Overhead Replacement Cache",
//!   FAST 2003

use std::collections::{BTreeMap, TryReserveError};
use std::fmt;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::GhostList;
use crate::error::InvariantError;
use crate::traits::CoreCache;

/// Which resident list an entry is in.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum ListKind {
    /// Seen once since it was (re)admitted.
    T1,
    /// Seen at least twice.
    T2,
}

struct Resident<V> {
    value: V,
    list: ListKind,
    stamp: u64,
}

/// Single-threaded Adaptive Replacement Cache.
pub struct ArcCore<K, V>
where
    K: Clone + Eq + Hash,
{
    map: FxHashMap<K, Resident<V>>,
    t1: BTreeMap<u64, K>,
    t2: BTreeMap<u64, K>,
    b1: GhostList<K>,
    b2: GhostList<K>,
    p: usize,
    capacity: usize,
    next_stamp: u64,
}

impl<K, V> ArcCore<K, V>
where
    K: Clone + Eq + Hash,
{
    /// Creates an ARC cache holding at most `capacity` resident entries.
    ///
    /// Ghost lists can each remember up to `capacity` evicted keys. The
    /// adaptation target `p` starts at `capacity / 2`.
    pub fn new(capacity: usize) -> Self {
        Self::with_index(
            FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            capacity,
        )
    }

    /// Like [`new`](Self::new), but reports a failed index reservation
    /// instead of aborting the process.
    pub fn try_new(capacity: usize) -> Result<Self, TryReserveError> {
        let mut map = FxHashMap::default();
        map.try_reserve(capacity)?;
        Ok(Self::with_index(map, capacity))
    }

    fn with_index(map: FxHashMap<K, Resident<V>>, capacity: usize) -> Self {
        Self {
            map,
            t1: BTreeMap::new(),
            t2: BTreeMap::new(),
            b1: GhostList::new(capacity),
            b2: GhostList::new(capacity),
            p: capacity / 2,
            capacity,
            next_stamp: 0,
        }
    }

    /// Returns the value for `key` without touching recency.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.map.get(key).map(|resident| &resident.value)
    }

    /// Current target size of T1. Higher values favor recency.
    pub fn p_value(&self) -> usize {
        self.p
    }

    /// Number of entries seen once.
    pub fn t1_len(&self) -> usize {
        self.t1.len()
    }

    /// Number of entries seen at least twice.
    pub fn t2_len(&self) -> usize {
        self.t2.len()
    }

    /// Number of ghost keys evicted from T1.
    pub fn b1_len(&self) -> usize {
        self.b1.len()
    }

    /// Number of ghost keys evicted from T2.
    pub fn b2_len(&self) -> usize {
        self.b2.len()
    }

    fn bump(&mut self) -> u64 {
        let stamp = self.next_stamp;
        self.next_stamp += 1;
        stamp
    }

    /// Moves a resident key to the MRU end of T2.
    fn promote(&mut self, key: &K) -> Option<&mut Resident<V>> {
        let stamp = self.bump();
        let resident = self.map.get_mut(key)?;
        let owned = match resident.list {
            ListKind::T1 => self.t1.remove(&resident.stamp),
            ListKind::T2 => self.t2.remove(&resident.stamp),
        };
        if let Some(owned) = owned {
            self.t2.insert(stamp, owned);
        }
        resident.list = ListKind::T2;
        resident.stamp = stamp;
        Some(resident)
    }

    fn admit(&mut self, key: K, value: V, list: ListKind) {
        let stamp = self.bump();
        match list {
            ListKind::T1 => self.t1.insert(stamp, key.clone()),
            ListKind::T2 => self.t2.insert(stamp, key.clone()),
        };
        self.map.insert(key, Resident { value, list, stamp });
    }

    /// Evicts one resident entry into its ghost list, choosing the side by `p`.
    fn replace(&mut self, hit_in_b2: bool) {
        let t1_len = self.t1.len();
        let from_t1 = t1_len > 0 && (t1_len > self.p || (hit_in_b2 && t1_len == self.p));
        let from_t1 = from_t1 || self.t2.is_empty();

        if from_t1 {
            if let Some((_, key)) = self.t1.pop_first() {
                self.map.remove(&key);
                self.b1.record(key);
            }
        } else if let Some((_, key)) = self.t2.pop_first() {
            self.map.remove(&key);
            self.b2.record(key);
        }
    }

    fn make_room(&mut self, hit_in_b2: bool) {
        if self.map.len() >= self.capacity {
            self.replace(hit_in_b2);
        }
    }

    fn adapt_for_b1_hit(&mut self) {
        let (b1, b2) = (self.b1.len().max(1), self.b2.len());
        let delta = if b1 >= b2 { 1 } else { b2 / b1 };
        self.p = (self.p + delta).min(self.capacity);
    }

    fn adapt_for_b2_hit(&mut self) {
        let (b1, b2) = (self.b1.len(), self.b2.len().max(1));
        let delta = if b2 >= b1 { 1 } else { b1 / b2 };
        self.p = self.p.saturating_sub(delta);
    }

    /// Bookkeeping for a key that is neither resident nor a ghost.
    fn make_room_for_new_key(&mut self) {
        let l1 = self.t1.len() + self.b1.len();
        if l1 >= self.capacity {
            if self.t1.len() < self.capacity {
                self.b1.pop_oldest();
                self.make_room(false);
            } else if let Some((_, key)) = self.t1.pop_first() {
                // T1 alone fills the cache: drop its LRU without a ghost.
                self.map.remove(&key);
            }
            return;
        }

        let total = self.map.len() + self.b1.len() + self.b2.len();
        if total >= self.capacity {
            if total >= 2 * self.capacity {
                self.b2.pop_oldest();
            }
            self.make_room(false);
        }
    }

    /// Validates list, index, and ghost bookkeeping.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let resident = self.t1.len() + self.t2.len();
        if self.map.len() != resident {
            return Err(InvariantError::new(format!(
                "index holds {} keys but T1 + T2 hold {}",
                self.map.len(),
                resident
            )));
        }
        if resident > self.capacity {
            return Err(InvariantError::new(format!(
                "{resident} resident entries exceed capacity {}",
                self.capacity
            )));
        }
        if self.p > self.capacity {
            return Err(InvariantError::new(format!(
                "p ({}) exceeds capacity ({})",
                self.p, self.capacity
            )));
        }

        for (kind, list) in [(ListKind::T1, &self.t1), (ListKind::T2, &self.t2)] {
            for (stamp, key) in list {
                match self.map.get(key) {
                    Some(r) if r.list == kind && r.stamp == *stamp => {},
                    Some(_) => {
                        return Err(InvariantError::new(format!(
                            "{kind:?} entry at stamp {stamp} disagrees with the index"
                        )));
                    },
                    None => {
                        return Err(InvariantError::new(format!(
                            "{kind:?} entry at stamp {stamp} is missing from the index"
                        )));
                    },
                }
            }
        }

        self.b1.check_invariants()?;
        self.b2.check_invariants()?;
        if self
            .map
            .keys()
            .any(|key| self.b1.contains(key) || self.b2.contains(key))
        {
            return Err(InvariantError::new("a resident key is also a ghost"));
        }
        Ok(())
    }
}

impl<K, V> fmt::Debug for ArcCore<K, V>
where
    K: Clone + Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArcCore")
            .field("capacity", &self.capacity)
            .field("t1_len", &self.t1.len())
            .field("t2_len", &self.t2.len())
            .field("b1_len", &self.b1.len())
            .field("b2_len", &self.b2.len())
            .field("p", &self.p)
            .finish()
    }
}

impl<K, V> CoreCache<K, V> for ArcCore<K, V>
where
    K: Clone + Eq + Hash,
{
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        if self.capacity == 0 {
            return None;
        }

        if let Some(resident) = self.promote(&key) {
            return Some(std::mem::replace(&mut resident.value, value));
        }

        if self.b1.contains(&key) {
            self.adapt_for_b1_hit();
            self.b1.remove(&key);
            self.make_room(false);
            self.admit(key, value, ListKind::T2);
            return None;
        }

        if self.b2.contains(&key) {
            self.adapt_for_b2_hit();
            self.b2.remove(&key);
            self.make_room(true);
            self.admit(key, value, ListKind::T2);
            return None;
        }

        self.make_room_for_new_key();
        self.admit(key, value, ListKind::T1);
        None
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        self.promote(key).map(|resident| &resident.value)
    }

    fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn clear(&mut self) {
        self.map.clear();
        self.t1.clear();
        self.t2.clear();
        self.b1.clear();
        self.b2.clear();
        self.p = self.capacity / 2;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arc_new_cache() {
        let cache: ArcCore<String, i32> = ArcCore::new(100);
        assert_eq!(cache.capacity(), 100);
        assert!(cache.is_empty());
        assert_eq!(cache.b1_len(), 0);
        assert_eq!(cache.b2_len(), 0);
        assert_eq!(cache.p_value(), 50);
    }

    #[test]
    fn arc_try_new_matches_new() {
        let cache: ArcCore<u64, u64> = ArcCore::try_new(64).unwrap();
        assert_eq!(cache.capacity(), 64);
        assert_eq!(cache.p_value(), 32);
    }

    #[test]
    fn arc_try_new_reports_impossible_reservation() {
        assert!(ArcCore::<u64, u64>::try_new(usize::MAX).is_err());
    }

    #[test]
    fn arc_insert_and_get_promotes() {
        let mut cache = ArcCore::new(10);

        cache.insert("key1", "value1");
        assert_eq!(cache.t1_len(), 1);
        assert_eq!(cache.t2_len(), 0);

        assert_eq!(cache.get(&"key1"), Some(&"value1"));
        assert_eq!(cache.t1_len(), 0);
        assert_eq!(cache.t2_len(), 1);

        assert_eq!(cache.get(&"key1"), Some(&"value1"));
        assert_eq!(cache.t2_len(), 1);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn arc_peek_does_not_promote() {
        let mut cache = ArcCore::new(10);
        cache.insert(1, 10);
        assert_eq!(cache.peek(&1), Some(&10));
        assert_eq!(cache.t1_len(), 1);
        assert_eq!(cache.peek(&2), None);
    }

    #[test]
    fn arc_update_existing_returns_old_value() {
        let mut cache = ArcCore::new(10);

        cache.insert("key1", "value1");
        assert_eq!(cache.insert("key1", "new_value"), Some("value1"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.t2_len(), 1);
        assert_eq!(cache.get(&"key1"), Some(&"new_value"));
    }

    /// Builds T1 = [2, 4, 5], T2 = [3], B1 = [1] with capacity 4 and p = 2.
    fn cache_with_b1_ghost() -> ArcCore<u32, u32> {
        let mut cache = ArcCore::new(4);
        cache.insert(1, 1);
        cache.insert(2, 2);
        cache.insert(3, 3);
        cache.get(&3);
        cache.insert(4, 4);
        cache.insert(5, 5);
        cache
    }

    #[test]
    fn arc_eviction_fills_ghost_list() {
        let cache = cache_with_b1_ghost();

        assert_eq!(cache.len(), 4);
        assert!(!cache.contains(&1));
        assert_eq!(cache.t1_len(), 3);
        assert_eq!(cache.t2_len(), 1);
        assert_eq!(cache.b1_len(), 1);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn arc_b1_ghost_hit_grows_p() {
        let mut cache = cache_with_b1_ghost();
        assert_eq!(cache.p_value(), 2);

        cache.insert(1, 10);

        assert_eq!(cache.p_value(), 3);
        assert!(cache.contains(&1));
        assert_eq!(cache.peek(&1), Some(&10));
        // T1 is not above the new target, so T2's LRU (3) gave way.
        assert!(!cache.contains(&3));
        assert_eq!(cache.b1_len(), 0);
        assert_eq!(cache.b2_len(), 1);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn arc_b2_ghost_hit_shrinks_p() {
        let mut cache = cache_with_b1_ghost();
        cache.insert(1, 10);
        assert_eq!(cache.p_value(), 3);

        cache.insert(3, 30);

        assert_eq!(cache.p_value(), 2);
        assert!(cache.contains(&3));
        assert!(!cache.contains(&2));
        assert_eq!(cache.b1_len(), 1);
        assert_eq!(cache.b2_len(), 0);
        assert_eq!(cache.t2_len(), 2);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn arc_full_t1_drops_lru_without_ghost() {
        let mut cache = ArcCore::new(2);
        cache.insert("a", 1);
        cache.insert("b", 2);
        cache.insert("c", 3);

        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(&"a"));
        assert!(cache.contains(&"b"));
        assert!(cache.contains(&"c"));
        assert_eq!(cache.b1_len(), 0);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn arc_clear_resets_lists_and_target() {
        let mut cache = ArcCore::new(10);
        cache.insert("key1", "value1");
        cache.insert("key2", "value2");
        cache.get(&"key2");
        assert_eq!((cache.t1_len(), cache.t2_len()), (1, 1));
        cache.check_invariants().unwrap();

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.t1_len() + cache.t2_len(), 0);
        assert_eq!(cache.p_value(), 5);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn arc_zero_capacity_rejects_inserts() {
        let mut cache = ArcCore::new(0);
        cache.insert("key", "value");
        assert_eq!(cache.len(), 0);
        assert!(!cache.contains(&"key"));
    }

    #[test]
    fn arc_invariants_hold_under_mixed_workload() {
        let mut cache = ArcCore::new(16);
        for round in 0..2_000u64 {
            let key = (round * 7919) % 61;
            if round % 3 == 0 {
                cache.get(&key);
            } else {
                cache.insert(key, round);
            }
            if round % 500 == 0 {
                cache.clear();
            }
            cache.check_invariants().unwrap();
            assert!(cache.len() <= 16);
            assert!(cache.b1_len() <= 16 && cache.b2_len() <= 16);
        }
    }
}
