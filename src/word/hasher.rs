//! Word hash orchestration.
//!
//! [`WordHasher`] turns raw tokens into word hashes and memoizes the result:
//!
//! ```text
//!   raw ──► canonicalize ──► cache.get ──hit──► code
//!                               │
//!                              miss
//!                               ▼
//!                      pipeline.short_code     (no lock held)
//!                               │
//!                  memory low? ─┴─ yes ──► cache.clear()      ──► code
//!                               │
//!                               no ──► cache.insert_if_absent ──► code
//! ```
//!
//! Two callers that miss on the same key both digest it and race to insert;
//! the first insert wins and the loser returns its own, identical, code.
//! A purge drops every entry but changes no answers: the next lookup simply
//! recomputes.
//!
//! ## Example
//!
//! ```
//! use wordhash::word::hasher::WordHasher;
//! use wordhash::word::memory::FixedMemory;
//! use wordhash::word::planner::PlannerConfig;
//!
//! let config = PlannerConfig {
//!     min_entries: 1_000,
//!     max_entries: 1_000,
//!     ..PlannerConfig::default()
//! };
//! let hasher = WordHasher::with_memory(FixedMemory::new(0), &config).unwrap();
//!
//! assert_eq!(hasher.hash_of("Hello").to_string(), "XUFAKrxLKna5");
//! assert_eq!(hasher.hash_of("HELLO"), hasher.hash_of("hello"));
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::warn;

use crate::error::InitError;
use crate::metrics::{HasherMetrics, HasherMetricsSnapshot};
use crate::traits::ConcurrentCache;
use crate::word::canonical::{CanonicalKey, canonicalize};
use crate::word::digest::{DigestPipeline, Md5Base64Pipeline, ShortCode};
use crate::word::handles::{BatchHashes, HandleSet};
use crate::word::memory::{MemoryMonitor, SystemMemory};
use crate::word::planner::{PlannerConfig, WordCache, build_cache};

/// Observable cache lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Serving and filling the cache.
    Normal,
    /// Emptied by a low-memory purge; left on the next insert.
    Purged,
}

/// Memoizing word hasher.
///
/// Shared by reference (or behind an `Arc`) between any number of threads.
#[derive(Debug)]
pub struct WordHasher<C = WordCache, D = Md5Base64Pipeline, M = SystemMemory> {
    cache: C,
    pipeline: D,
    memory: M,
    metrics: HasherMetrics,
    purged: AtomicBool,
}

impl WordHasher {
    /// Hasher with a host-sized cache, the MD5 pipeline and host memory
    /// readings.
    pub fn with_defaults() -> Result<Self, InitError> {
        Self::with_memory(SystemMemory::new(), &PlannerConfig::default())
    }
}

impl<M: MemoryMonitor> WordHasher<WordCache, Md5Base64Pipeline, M> {
    /// Plans and builds the cache from `memory`, then wires it up with the
    /// MD5 pipeline.
    pub fn with_memory(memory: M, config: &PlannerConfig) -> Result<Self, InitError> {
        let cache = build_cache(&memory, config)?;
        Ok(Self::new(cache, Md5Base64Pipeline, memory))
    }
}

impl<C, D, M> WordHasher<C, D, M>
where
    C: ConcurrentCache<CanonicalKey, ShortCode>,
    D: DigestPipeline,
    M: MemoryMonitor,
{
    pub fn new(cache: C, pipeline: D, memory: M) -> Self {
        Self {
            cache,
            pipeline,
            memory,
            metrics: HasherMetrics::default(),
            purged: AtomicBool::new(false),
        }
    }

    /// Word hash of `raw`, case-insensitively.
    ///
    /// Never fails; the cache only decides whether the digest is recomputed.
    pub fn hash_of(&self, raw: &str) -> ShortCode {
        let key = canonicalize(raw);
        if let Some(code) = self.cache.get(&key) {
            self.metrics.inc_hit();
            return code;
        }
        self.metrics.inc_miss();

        let code = self.pipeline.short_code(&key);
        if self.memory.is_memory_low() {
            self.purge();
        } else if self.cache.insert_if_absent(key, code) {
            self.metrics.inc_insert();
            self.purged.store(false, Ordering::Relaxed);
        } else {
            self.metrics.inc_lost_race();
        }
        code
    }

    /// Hashes every word into a set of at most `budget` distinct codes.
    ///
    /// Stops at the first code that does not fit and returns what was
    /// collected, marked incomplete.
    pub fn hash_all<I, S>(&self, words: I, budget: usize) -> BatchHashes
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = HandleSet::new(budget);
        for word in words {
            if let Err(err) = set.put(self.hash_of(word.as_ref())) {
                warn!(error = %err, kept = set.len(), "word hash batch truncated");
                return BatchHashes::new(set, false);
            }
        }
        BatchHashes::new(set, true)
    }

    fn purge(&self) {
        let dropped = self.cache.len();
        self.cache.clear();
        self.purged.store(true, Ordering::Relaxed);
        let purges = self.metrics.inc_purge();
        warn!(dropped, purges, "memory low, word hash cache purged");
    }

    pub fn cache_state(&self) -> CacheState {
        if self.purged.load(Ordering::Relaxed) {
            CacheState::Purged
        } else {
            CacheState::Normal
        }
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn memory(&self) -> &M {
        &self.memory
    }

    pub fn metrics(&self) -> HasherMetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use parking_lot::Mutex;
    use rustc_hash::FxHashSet;

    use super::*;
    use crate::word::memory::FixedMemory;

    /// MD5 pipeline that panics if asked for the same key twice.
    #[derive(Debug, Default)]
    struct OncePipeline {
        seen: Mutex<FxHashSet<CanonicalKey>>,
    }

    impl DigestPipeline for OncePipeline {
        fn short_code(&self, key: &CanonicalKey) -> ShortCode {
            assert!(
                self.seen.lock().insert(key.clone()),
                "pipeline invoked twice for {key}"
            );
            Md5Base64Pipeline.short_code(key)
        }
    }

    fn small_cache() -> WordCache {
        WordCache::try_new(64, 4).unwrap()
    }

    fn hasher_with<D: DigestPipeline>(pipeline: D) -> WordHasher<WordCache, D, Arc<FixedMemory>> {
        WordHasher::new(small_cache(), pipeline, Arc::new(FixedMemory::new(0)))
    }

    #[test]
    fn case_variants_share_one_digest() {
        let hasher = hasher_with(OncePipeline::default());

        let first = hasher.hash_of("Hello");
        assert_eq!(first.to_string(), "XUFAKrxLKna5");
        assert_eq!(hasher.hash_of("hello"), first);
        assert_eq!(hasher.hash_of("HELLO"), first);

        assert_eq!(hasher.cache().len(), 1);
        let metrics = hasher.metrics();
        assert_eq!((metrics.hits, metrics.misses, metrics.inserts), (2, 1, 1));
    }

    #[test]
    fn owned_buffers_hash_like_slices() {
        let hasher = hasher_with(Md5Base64Pipeline);
        let owned = String::from("Example");
        assert_eq!(hasher.hash_of(&owned), hasher.hash_of("example"));
        assert_eq!(hasher.hash_of(&owned).to_string(), "Gnmk1g3mcY6O");
    }

    #[test]
    fn low_memory_purges_without_changing_answers() {
        let hasher = hasher_with(Md5Base64Pipeline);
        let before: Vec<ShortCode> = ["alpha", "beta", "gamma"]
            .iter()
            .map(|w| hasher.hash_of(w))
            .collect();
        assert_eq!(hasher.cache().len(), 3);
        assert_eq!(hasher.cache_state(), CacheState::Normal);

        hasher.memory().set_low(true);
        let delta = hasher.hash_of("delta");
        assert!(hasher.cache().is_empty());
        assert_eq!(hasher.cache_state(), CacheState::Purged);
        assert_eq!(hasher.metrics().purges, 1);

        hasher.memory().set_low(false);
        let after: Vec<ShortCode> = ["alpha", "beta", "gamma"]
            .iter()
            .map(|w| hasher.hash_of(w))
            .collect();
        assert_eq!(before, after);
        assert_eq!(hasher.hash_of("delta"), delta);
        assert_eq!(hasher.cache_state(), CacheState::Normal);
    }

    #[test]
    fn repeated_purges_are_harmless() {
        let hasher = hasher_with(Md5Base64Pipeline);
        hasher.memory().set_low(true);

        let first = hasher.hash_of("word");
        let second = hasher.hash_of("word");
        assert_eq!(first, second);
        assert!(hasher.cache().is_empty());
        assert_eq!(hasher.metrics().purges, 2);
        assert_eq!(hasher.metrics().inserts, 0);
    }

    #[test]
    fn hits_do_not_probe_memory() {
        let hasher = hasher_with(Md5Base64Pipeline);
        hasher.hash_of("stable");
        hasher.memory().set_low(true);

        hasher.hash_of("stable");
        assert_eq!(hasher.cache().len(), 1);
        assert_eq!(hasher.metrics().purges, 0);
    }

    #[test]
    fn unreadable_host_memory_keeps_the_cache() {
        let memory = SystemMemory::new().with_probe(|| None).with_recheck(Duration::ZERO);
        let hasher = WordHasher::new(small_cache(), Md5Base64Pipeline, memory);
        for word in ["a", "b", "c", "d"] {
            hasher.hash_of(word);
        }

        assert_eq!(hasher.cache().len(), 4);
        let metrics = hasher.metrics();
        assert_eq!((metrics.inserts, metrics.purges), (4, 0));
        assert_eq!(hasher.cache_state(), CacheState::Normal);
    }

    #[test]
    fn hash_all_collects_distinct_codes() {
        let hasher = hasher_with(Md5Base64Pipeline);
        let batch = hasher.hash_all(["Hello", "hello", "example"], 10);

        assert!(batch.is_complete());
        assert_eq!(batch.len(), 2);
        assert!(batch.contains(&hasher.hash_of("HELLO")));
        assert!(batch.contains(&ShortCode::parse("Gnmk1g3mcY6O").unwrap()));
    }

    #[test]
    fn hash_all_stops_at_budget() {
        let hasher = hasher_with(Md5Base64Pipeline);
        let words = vec!["one".to_string(), "two".into(), "three".into(), "four".into()];
        let batch = hasher.hash_all(&words, 2);

        assert!(!batch.is_complete());
        assert_eq!(batch.len(), 2);
        assert!(batch.contains(&hasher.hash_of("one")));
        assert!(batch.contains(&hasher.hash_of("two")));
    }

    #[test]
    fn with_memory_builds_planned_cache() {
        let config = PlannerConfig {
            min_entries: 128,
            max_entries: 128,
            concurrency_floor: 2,
            concurrency_per_cpu: 0,
            ..PlannerConfig::default()
        };
        let hasher = WordHasher::with_memory(FixedMemory::new(0), &config).unwrap();
        assert_eq!(hasher.cache().capacity(), 128);
        assert_eq!(hasher.cache().shard_count(), 2);
    }

    #[test]
    fn with_memory_reports_bad_config() {
        let config = PlannerConfig {
            bytes_per_entry: 0,
            ..PlannerConfig::default()
        };
        let result = WordHasher::with_memory(FixedMemory::new(0), &config);
        assert!(matches!(result, Err(InitError::Config(_))));
    }
}
