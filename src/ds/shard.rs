//! Deterministic key-to-shard mapping for the sharded hash cache.
//!
//! The selector hashes `(seed, key)` with SipHash rather than the Fx hasher
//! used inside each shard, so the keys routed to one shard do not all share
//! the low bits the shard's own table indexes by.
//!
//! ```text
//!   "hello" ──► SipHash(seed, key) % shards ──► shard 3
//!
//!   ┌─────────┬─────────┬─────────┬─────────┐
//!   │ Shard 0 │ Shard 1 │ Shard 2 │ Shard 3 │   each shard: capacity / shards
//!   └─────────┴─────────┴─────────┴─────────┘   (rounded up)
//! ```
//!
//! ## Example Usage
//!
//! ```
//! use wordhash::ds::ShardSelector;
//!
//! let selector = ShardSelector::new(4, 0);
//! let shard = selector.shard_for_key(&"hello");
//! assert!(shard < 4);
//! assert_eq!(selector.shard_for_key(&"hello"), shard);
//! assert_eq!(selector.per_shard_capacity(10), 3);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Deterministic shard selector using a seeded hash.
///
/// The same `(key, seed, shards)` tuple always produces the same shard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardSelector {
    shards: usize,
    seed: u64,
}

impl ShardSelector {
    /// Creates a selector for `shards` shards with the given `seed`.
    ///
    /// The shard count is clamped to at least 1.
    pub fn new(shards: usize, seed: u64) -> Self {
        Self {
            shards: shards.max(1),
            seed,
        }
    }

    /// Returns the number of shards.
    pub fn shard_count(&self) -> usize {
        self.shards
    }

    /// Maps a key to a shard index in `[0, shards)`.
    pub fn shard_for_key<K: Hash + ?Sized>(&self, key: &K) -> usize {
        if self.shards == 1 {
            return 0;
        }
        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        key.hash(&mut hasher);
        (hasher.finish() as usize) % self.shards
    }

    /// Splits a total capacity evenly across shards, rounding up so the
    /// shards together never hold fewer than `total` entries.
    pub fn per_shard_capacity(&self, total: usize) -> usize {
        total.div_ceil(self.shards)
    }
}

impl Default for ShardSelector {
    /// Creates a single-shard selector with seed 0.
    fn default() -> Self {
        Self::new(1, 0)
    }
}
