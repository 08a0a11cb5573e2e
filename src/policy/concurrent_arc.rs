//! Sharded, thread-safe ARC cache.
//!
//! Splits the capacity across `concurrency` independent [`ArcCore`] shards,
//! each behind its own `parking_lot::Mutex`. A key always lives in the shard
//! chosen by [`ShardSelector`], so `get` and `insert_if_absent` on one key are
//! serialized by one lock while unrelated keys proceed in parallel.
//!
//! ```text
//!   key ──► ShardSelector ──► shards[i].lock() ──► ArcCore (capacity / n)
//! ```
//!
//! `clear` visits the shards one at a time. A reader can therefore observe a
//! partially cleared cache, and an insert can land in an already cleared
//! shard before `clear` returns; both outcomes are valid cache states.
//!
//! Eviction is ARC per shard, which approximates ARC over the whole key
//! space when keys spread evenly.

use std::fmt;
use std::hash::Hash;

use parking_lot::Mutex;

use crate::ds::ShardSelector;
use crate::error::{CacheAllocError, InvariantError};
use crate::policy::arc::ArcCore;
use crate::traits::{ConcurrentCache, CoreCache};

/// Thread-safe bounded cache made of ARC shards.
pub struct ConcurrentArcCache<K, V>
where
    K: Clone + Eq + Hash,
{
    shards: Box<[Mutex<ArcCore<K, V>>]>,
    selector: ShardSelector,
}

impl<K, V> ConcurrentArcCache<K, V>
where
    K: Clone + Eq + Hash,
{
    /// Builds a cache for `capacity` entries split over `concurrency` shards.
    ///
    /// Each shard reserves its index up front, so an allocation failure is
    /// reported here rather than on a later insert.
    pub fn try_new(capacity: usize, concurrency: usize) -> Result<Self, CacheAllocError> {
        let selector = ShardSelector::new(concurrency, 0);
        let per_shard = selector.per_shard_capacity(capacity);

        let mut shards = Vec::new();
        shards
            .try_reserve_exact(selector.shard_count())
            .map_err(|source| CacheAllocError {
                capacity,
                shards: selector.shard_count(),
                source,
            })?;
        for _ in 0..selector.shard_count() {
            let core = ArcCore::try_new(per_shard).map_err(|source| CacheAllocError {
                capacity,
                shards: selector.shard_count(),
                source,
            })?;
            shards.push(Mutex::new(core));
        }

        Ok(Self {
            shards: shards.into_boxed_slice(),
            selector,
        })
    }

    /// Number of independently locked shards.
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Returns `true` if `key` is resident, without touching recency.
    pub fn contains(&self, key: &K) -> bool {
        self.shard(key).lock().contains(key)
    }

    fn shard(&self, key: &K) -> &Mutex<ArcCore<K, V>> {
        &self.shards[self.selector.shard_for_key(key)]
    }

    /// Validates every shard; stops at the first violation.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        for (idx, shard) in self.shards.iter().enumerate() {
            shard
                .lock()
                .check_invariants()
                .map_err(|err| InvariantError::new(format!("shard {idx}: {}", err.message())))?;
        }
        Ok(())
    }
}

impl<K, V> ConcurrentCache<K, V> for ConcurrentArcCache<K, V>
where
    K: Clone + Eq + Hash + Send,
    V: Clone + Send,
{
    fn get(&self, key: &K) -> Option<V> {
        self.shard(key).lock().get(key).cloned()
    }

    fn insert_if_absent(&self, key: K, value: V) -> bool {
        let mut shard = self.shard(&key).lock();
        if shard.contains(&key) {
            return false;
        }
        shard.insert(key, value);
        true
    }

    fn clear(&self) {
        for shard in self.shards.iter() {
            shard.lock().clear();
        }
    }

    fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.lock().len()).sum()
    }

    /// Sum of the shard capacities; can exceed the requested capacity by
    /// less than one entry per shard because of rounding.
    fn capacity(&self) -> usize {
        self.shards.iter().map(|shard| shard.lock().capacity()).sum()
    }
}

impl<K, V> fmt::Debug for ConcurrentArcCache<K, V>
where
    K: Clone + Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrentArcCache")
            .field("shards", &self.shards.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn splits_capacity_across_shards() {
        let cache: ConcurrentArcCache<u64, u64> = ConcurrentArcCache::try_new(64, 4).unwrap();
        assert_eq!(cache.shard_count(), 4);
        assert_eq!(cache.capacity(), 64);

        let rounded: ConcurrentArcCache<u64, u64> = ConcurrentArcCache::try_new(10, 4).unwrap();
        assert_eq!(rounded.capacity(), 12);
    }

    #[test]
    fn zero_concurrency_means_one_shard() {
        let cache: ConcurrentArcCache<u64, u64> = ConcurrentArcCache::try_new(8, 0).unwrap();
        assert_eq!(cache.shard_count(), 1);
    }

    #[test]
    fn insert_if_absent_keeps_first_value() {
        let cache = ConcurrentArcCache::try_new(16, 2).unwrap();
        assert!(cache.insert_if_absent("k", 1));
        assert!(!cache.insert_if_absent("k", 2));
        assert_eq!(cache.get(&"k"), Some(1));
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(&"k"));
    }

    #[test]
    fn clear_empties_every_shard_and_is_idempotent() {
        let cache = ConcurrentArcCache::try_new(256, 8).unwrap();
        for i in 0..100u32 {
            cache.insert_if_absent(i, i * 2);
        }
        assert_eq!(cache.len(), 100);

        cache.clear();
        assert!(cache.is_empty());
        cache.clear();
        assert!(cache.is_empty());

        assert!(cache.insert_if_absent(7, 14));
        assert_eq!(cache.get(&7), Some(14));
        cache.check_invariants().unwrap();
    }

    #[test]
    fn stays_within_capacity_under_churn() {
        let cache = ConcurrentArcCache::try_new(32, 4).unwrap();
        for i in 0..10_000u32 {
            cache.insert_if_absent(i, i);
            if i % 5 == 0 {
                cache.get(&(i / 2));
            }
        }
        assert!(cache.len() <= cache.capacity());
        cache.check_invariants().unwrap();
    }

    #[test]
    fn impossible_capacity_is_an_error() {
        let err = ConcurrentArcCache::<u64, u64>::try_new(usize::MAX, 1).unwrap_err();
        assert_eq!(err.capacity, usize::MAX);
        assert_eq!(err.shards, 1);
    }

    #[test]
    fn parallel_writers_agree_on_one_value() {
        let cache = Arc::new(ConcurrentArcCache::try_new(1_024, 8).unwrap());
        let handles: Vec<_> = (0..8u64)
            .map(|t| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    let mut won = 0;
                    for key in 0..200u64 {
                        if cache.insert_if_absent(key, t) {
                            won += 1;
                        }
                    }
                    won
                })
            })
            .collect();

        let total_wins: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(total_wins, 200);
        assert_eq!(cache.len(), 200);
        cache.check_invariants().unwrap();
    }
}
