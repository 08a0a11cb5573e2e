//! Elastic capacity planning for the word hash cache.
//!
//! The cache is sized once, at construction, from the memory available at
//! that moment and the number of processors:
//!
//! ```text
//!   max_entries = clamp(available / bytes_per_entry, min_entries, max_entries)
//!   concurrency = max(concurrency_floor, concurrency_per_cpu * cpus)
//! ```
//!
//! With the defaults that is `clamp(available / 20_000, 200_000, 10_000_000)`
//! entries and `max(32, 4 * cpus)` shards. The per-entry figure is far above
//! the size of a 12-byte code; it budgets for keys, index slots and ARC
//! bookkeeping.
//!
//! If the cache cannot be allocated at the planned size, [`build_cache`]
//! retries once with a small fallback plan (`1_000` entries,
//! `max(8, 2 * cpus)` shards). A second failure is returned to the caller as
//! a fatal [`InitError`].

use std::thread;

use tracing::{info, warn};

use crate::error::{ConfigError, InitError};
use crate::policy::concurrent_arc::ConcurrentArcCache;
use crate::word::canonical::CanonicalKey;
use crate::word::digest::ShortCode;
use crate::word::memory::MemoryMonitor;

/// The cache type the planner builds.
pub type WordCache = ConcurrentArcCache<CanonicalKey, ShortCode>;

/// Tuning constants for capacity planning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerConfig {
    /// Memory budgeted per cache entry, in bytes.
    pub bytes_per_entry: u64,
    /// Lower clamp for the planned entry count.
    pub min_entries: usize,
    /// Upper clamp for the planned entry count.
    pub max_entries: usize,
    pub concurrency_floor: usize,
    pub concurrency_per_cpu: usize,
    /// Entry count of the fallback plan.
    pub fallback_entries: usize,
    pub fallback_concurrency_floor: usize,
    pub fallback_concurrency_per_cpu: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            bytes_per_entry: 20_000,
            min_entries: 200_000,
            max_entries: 10_000_000,
            concurrency_floor: 32,
            concurrency_per_cpu: 4,
            fallback_entries: 1_000,
            fallback_concurrency_floor: 8,
            fallback_concurrency_per_cpu: 2,
        }
    }
}

impl PlannerConfig {
    /// Rejects configurations that cannot produce a working cache.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bytes_per_entry == 0 {
            return Err(ConfigError::new("bytes_per_entry must be > 0"));
        }
        if self.min_entries > self.max_entries {
            return Err(ConfigError::new(format!(
                "min_entries ({}) must not exceed max_entries ({})",
                self.min_entries, self.max_entries
            )));
        }
        if self.max_entries == 0 {
            return Err(ConfigError::new("max_entries must be > 0"));
        }
        if self.fallback_entries == 0 {
            return Err(ConfigError::new("fallback_entries must be > 0"));
        }
        Ok(())
    }
}

/// Entry budget and shard count for one cache instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityPlan {
    pub max_entries: usize,
    pub concurrency: usize,
}

impl CapacityPlan {
    /// The memory-scaled plan.
    pub fn full(available_bytes: u64, processors: usize, config: &PlannerConfig) -> Self {
        let by_memory = available_bytes / config.bytes_per_entry.max(1);
        let by_memory = usize::try_from(by_memory).unwrap_or(usize::MAX);
        Self {
            max_entries: by_memory.clamp(config.min_entries, config.max_entries),
            concurrency: config
                .concurrency_floor
                .max(config.concurrency_per_cpu.saturating_mul(processors)),
        }
    }

    /// The last-resort plan used after the full plan failed to allocate.
    pub fn fallback(processors: usize, config: &PlannerConfig) -> Self {
        Self {
            max_entries: config.fallback_entries,
            concurrency: config
                .fallback_concurrency_floor
                .max(config.fallback_concurrency_per_cpu.saturating_mul(processors)),
        }
    }
}

/// Processors available to this process, at least 1.
pub fn processor_count() -> usize {
    thread::available_parallelism()
        .map(|count| count.get())
        .unwrap_or(1)
}

/// Reads memory and processor count once and returns the full plan.
pub fn plan(memory: &dyn MemoryMonitor, config: &PlannerConfig) -> CapacityPlan {
    CapacityPlan::full(memory.available_memory(), processor_count(), config)
}

/// Builds the word cache from the full plan, falling back once on
/// allocation failure.
pub fn build_cache(memory: &dyn MemoryMonitor, config: &PlannerConfig) -> Result<WordCache, InitError> {
    build_cache_for(memory.available_memory(), processor_count(), config)
}

/// [`build_cache`] with the host readings supplied by the caller.
pub fn build_cache_for(
    available_bytes: u64,
    processors: usize,
    config: &PlannerConfig,
) -> Result<WordCache, InitError> {
    config.validate()?;

    let full = CapacityPlan::full(available_bytes, processors, config);
    match WordCache::try_new(full.max_entries, full.concurrency) {
        Ok(cache) => {
            info!(
                max_entries = full.max_entries,
                concurrency = full.concurrency,
                available_bytes,
                "word hash cache sized"
            );
            Ok(cache)
        },
        Err(err) => {
            let fallback = CapacityPlan::fallback(processors, config);
            warn!(
                error = %err,
                max_entries = fallback.max_entries,
                concurrency = fallback.concurrency,
                "word hash cache allocation failed, using fallback plan"
            );
            let cache = WordCache::try_new(fallback.max_entries, fallback.concurrency)?;
            Ok(cache)
        },
    }
}
