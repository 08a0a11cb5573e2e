//! Counters for the word hasher.
//!
//! All counters are relaxed atomics; they are observational and never feed
//! back into hashing or eviction.

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of hasher counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HasherMetricsSnapshot {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that ran the digest pipeline.
    pub misses: u64,
    /// Misses whose code was stored in the cache.
    pub inserts: u64,
    /// Misses that found another caller's code already stored.
    pub lost_races: u64,
    /// Full cache purges triggered by low memory.
    pub purges: u64,
}

impl HasherMetricsSnapshot {
    /// Fraction of lookups served from the cache, 0.0 when idle.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Default)]
pub struct HasherMetrics {
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
    lost_races: AtomicU64,
    purges: AtomicU64,
}

impl HasherMetrics {
    pub fn snapshot(&self) -> HasherMetricsSnapshot {
        HasherMetricsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            lost_races: self.lost_races.load(Ordering::Relaxed),
            purges: self.purges.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn inc_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_insert(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_lost_race(&self) {
        self.lost_races.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the purge count including this one.
    pub(crate) fn inc_purge(&self) -> u64 {
        self.purges.fetch_add(1, Ordering::Relaxed) + 1
    }
}
