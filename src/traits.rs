//! # Cache Trait Hierarchy
//!
//! Two layers of cache traits are used by the word hasher:
//!
//! ```text
//!   ┌─────────────────────────────────────────┐
//!   │            CoreCache<K, V>              │   single-threaded, &mut self
//!   │  insert / get / contains / len          │   (implemented by ArcCore)
//!   │  capacity / clear                       │
//!   └─────────────────────────────────────────┘
//!
//!   ┌─────────────────────────────────────────┐
//!   │        ConcurrentCache<K, V>            │   Send + Sync, &self
//!   │  get → Option<V> (copy of the value)    │   (implemented by
//!   │  insert_if_absent → bool                │    ConcurrentArcCache)
//!   │  clear / len / capacity                 │
//!   └─────────────────────────────────────────┘
//! ```
//!
//! `ConcurrentCache` is the seam the [`WordHasher`](crate::word::hasher::WordHasher)
//! is written against. Every method is individually atomic; callers never
//! hold a lock across two calls, so a get-compute-insert sequence can race
//! with other callers. `insert_if_absent` keeps whichever value landed first.
//!
//! ## Thread Safety
//!
//! - `CoreCache` implementations are not thread-safe; wrap them in a lock.
//! - `ConcurrentCache` implementations synchronize internally.

/// Core cache operations that all single-threaded caches support.
///
/// # Example
///
/// ```
/// use wordhash::policy::arc::ArcCore;
/// use wordhash::traits::CoreCache;
///
/// fn warm_cache<C: CoreCache<u64, String>>(cache: &mut C, data: &[(u64, String)]) {
///     for (key, value) in data {
///         cache.insert(*key, value.clone());
///     }
/// }
///
/// let mut cache = ArcCore::new(100);
/// warm_cache(&mut cache, &[(1, "one".to_string()), (2, "two".to_string())]);
/// assert_eq!(cache.len(), 2);
/// ```
pub trait CoreCache<K, V> {
    /// Inserts a key-value pair, returning the previous value if it existed.
    ///
    /// If the cache is at capacity, an entry may be evicted according to the
    /// cache's eviction policy before the new entry is inserted.
    fn insert(&mut self, key: K, value: V) -> Option<V>;

    /// Gets a reference to a value by key.
    ///
    /// May update internal state (recency, frequency) depending on the
    /// eviction policy. Use [`contains`](Self::contains) if you only need
    /// to check existence without affecting eviction order.
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Checks if a key exists without updating access state.
    fn contains(&self, key: &K) -> bool;

    /// Returns the current number of entries in the cache.
    fn len(&self) -> usize;

    /// Returns `true` if the cache contains no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the maximum capacity of the cache.
    fn capacity(&self) -> usize;

    /// Removes all entries from the cache.
    fn clear(&mut self);
}

/// Bounded cache that is safe to share between threads.
///
/// Values are returned by copy so no lock outlives a call.
///
/// # Example
///
/// ```
/// use wordhash::policy::concurrent_arc::ConcurrentArcCache;
/// use wordhash::traits::ConcurrentCache;
///
/// let cache = ConcurrentArcCache::try_new(64, 4).unwrap();
/// assert!(cache.insert_if_absent("k", 1));
/// assert!(!cache.insert_if_absent("k", 2));
/// assert_eq!(cache.get(&"k"), Some(1));
///
/// cache.clear();
/// assert_eq!(cache.get(&"k"), None);
/// ```
pub trait ConcurrentCache<K, V>: Send + Sync {
    /// Returns a copy of the value for `key`, if present.
    fn get(&self, key: &K) -> Option<V>;

    /// Stores `value` only if `key` has no value yet.
    ///
    /// Returns `true` if this call stored the value, `false` if another value
    /// was already present (that value is left untouched). Either way the
    /// cache holds a valid mapping for `key` afterwards, unless it was
    /// evicted or cleared concurrently.
    fn insert_if_absent(&self, key: K, value: V) -> bool;

    /// Removes every entry. Safe to call concurrently with `get` and
    /// `insert_if_absent`.
    fn clear(&self);

    /// Current number of entries (may be stale under concurrent writes).
    fn len(&self) -> usize;

    /// Returns `true` if the cache holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries across the whole cache.
    fn capacity(&self) -> usize;
}
