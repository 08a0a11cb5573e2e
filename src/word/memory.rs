//! Memory accounting collaborators.
//!
//! The hasher asks two separate questions, and they need not be backed by
//! the same counter:
//!
//! - [`MemoryMonitor::available_memory`]: read once when the cache is sized.
//! - [`MemoryMonitor::is_memory_low`]: asked on every cache miss; a `true`
//!   answer purges the whole cache.
//!
//! [`SystemMemory`] answers both from the host (`/proc/meminfo`, narrowed by
//! the cgroup v2 limit when one is set) and rate-limits the low-memory probe.
//! Hosts it cannot read are treated as having plenty of memory.
//! [`FixedMemory`] is a settable stand-in for tests and embedders that track
//! memory themselves.

use std::fs;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Source of memory figures for planning and pressure checks.
pub trait MemoryMonitor: Send + Sync {
    /// Bytes the process may still allocate.
    fn available_memory(&self) -> u64;

    /// `true` when the process is close enough to its budget that cached
    /// work should be dropped.
    fn is_memory_low(&self) -> bool;
}

/// Default threshold below which [`SystemMemory`] reports low memory.
pub const DEFAULT_LOW_WATERMARK: u64 = 64 * 1024 * 1024;

/// Default interval between two host probes for the low-memory signal.
pub const DEFAULT_RECHECK: Duration = Duration::from_millis(250);

/// Planning figure [`SystemMemory`] reports when the host cannot be read.
pub const UNKNOWN_HOST_MEMORY: u64 = 8 * 1024 * 1024 * 1024;

/// Reads available bytes from the host, `None` when it cannot tell.
pub type HostProbe = fn() -> Option<u64>;

/// Host-backed memory monitor.
///
/// `is_memory_low` re-reads the host at most once per `recheck` interval and
/// serves the cached answer in between; concurrent callers may both probe
/// when the interval expires, which is harmless.
///
/// A host that cannot be read is never low, and plans with
/// [`UNKNOWN_HOST_MEMORY`].
#[derive(Debug)]
pub struct SystemMemory {
    low_watermark: u64,
    recheck: Duration,
    probe: HostProbe,
    origin: Instant,
    /// Milliseconds since `origin` of the last probe, `u64::MAX` = never.
    last_probe_ms: AtomicU64,
    low: AtomicBool,
}

impl SystemMemory {
    pub fn new() -> Self {
        Self::with_low_watermark(DEFAULT_LOW_WATERMARK)
    }

    /// Reports low memory once fewer than `bytes` are available.
    pub fn with_low_watermark(bytes: u64) -> Self {
        Self {
            low_watermark: bytes,
            recheck: DEFAULT_RECHECK,
            probe: host_available_bytes,
            origin: Instant::now(),
            last_probe_ms: AtomicU64::new(u64::MAX),
            low: AtomicBool::new(false),
        }
    }

    /// Sets how long a low-memory answer is reused.
    pub fn with_recheck(mut self, recheck: Duration) -> Self {
        self.recheck = recheck;
        self
    }

    /// Replaces the host reader, e.g. for platforms without `/proc`.
    pub fn with_probe(mut self, probe: HostProbe) -> Self {
        self.probe = probe;
        self
    }

    pub fn low_watermark(&self) -> u64 {
        self.low_watermark
    }

    fn probe_due(&self, now_ms: u64) -> bool {
        let last = self.last_probe_ms.load(Ordering::Acquire);
        last == u64::MAX || now_ms.saturating_sub(last) >= self.recheck.as_millis() as u64
    }
}

impl Default for SystemMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryMonitor for SystemMemory {
    fn available_memory(&self) -> u64 {
        (self.probe)().unwrap_or(UNKNOWN_HOST_MEMORY)
    }

    fn is_memory_low(&self) -> bool {
        let now_ms = self.origin.elapsed().as_millis() as u64;
        if self.probe_due(now_ms) {
            let low = (self.probe)().is_some_and(|bytes| bytes < self.low_watermark);
            self.low.store(low, Ordering::Release);
            self.last_probe_ms.store(now_ms, Ordering::Release);
            return low;
        }
        self.low.load(Ordering::Acquire)
    }
}

/// Available bytes on this host: `MemAvailable` narrowed by the cgroup v2
/// headroom. `None` when neither can be read.
pub fn host_available_bytes() -> Option<u64> {
    match (read_meminfo_available(), read_cgroup_headroom()) {
        (Some(host), Some(cgroup)) => Some(host.min(cgroup)),
        (host, cgroup) => host.or(cgroup),
    }
}

fn read_meminfo_available() -> Option<u64> {
    let contents = fs::read_to_string("/proc/meminfo").ok()?;
    parse_meminfo_available(&contents)
}

/// Extracts `MemAvailable` (or `MemFree` on old kernels) in bytes.
fn parse_meminfo_available(contents: &str) -> Option<u64> {
    let field = |name: &str| {
        contents.lines().find_map(|line| {
            let rest = line.strip_prefix(name)?.strip_prefix(':')?;
            let kb = rest.split_whitespace().next()?.parse::<u64>().ok()?;
            Some(kb * 1024)
        })
    };
    field("MemAvailable").or_else(|| field("MemFree"))
}

fn read_cgroup_headroom() -> Option<u64> {
    let max = fs::read_to_string("/sys/fs/cgroup/memory.max").ok()?;
    let current = fs::read_to_string("/sys/fs/cgroup/memory.current").ok()?;
    parse_cgroup_headroom(&max, &current)
}

/// Headroom under a cgroup v2 limit; `None` when the limit is `max`.
fn parse_cgroup_headroom(max: &str, current: &str) -> Option<u64> {
    let max = max.trim().parse::<u64>().ok()?;
    let current = current.trim().parse::<u64>().ok()?;
    Some(max.saturating_sub(current))
}

/// Memory monitor with values set by the owner.
#[derive(Debug)]
pub struct FixedMemory {
    available: AtomicU64,
    low: AtomicBool,
}

impl FixedMemory {
    pub fn new(available: u64) -> Self {
        Self {
            available: AtomicU64::new(available),
            low: AtomicBool::new(false),
        }
    }

    pub fn set_available(&self, bytes: u64) {
        self.available.store(bytes, Ordering::Relaxed);
    }

    pub fn set_low(&self, low: bool) {
        self.low.store(low, Ordering::Relaxed);
    }
}

impl MemoryMonitor for FixedMemory {
    fn available_memory(&self) -> u64 {
        self.available.load(Ordering::Relaxed)
    }

    fn is_memory_low(&self) -> bool {
        self.low.load(Ordering::Relaxed)
    }
}

impl<M: MemoryMonitor + ?Sized> MemoryMonitor for std::sync::Arc<M> {
    fn available_memory(&self) -> u64 {
        (**self).available_memory()
    }

    fn is_memory_low(&self) -> bool {
        (**self).is_memory_low()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEMINFO: &str = "MemTotal:       16318480 kB\n\
                           MemFree:          402112 kB\n\
                           MemAvailable:    8123456 kB\n\
                           Buffers:          123456 kB\n";

    const MIB: u64 = 1024 * 1024;

    #[test]
    fn parses_mem_available() {
        assert_eq!(parse_meminfo_available(MEMINFO), Some(8_123_456 * 1024));
    }

    #[test]
    fn falls_back_to_mem_free() {
        let old = "MemTotal: 1000 kB\nMemFree: 300 kB\n";
        assert_eq!(parse_meminfo_available(old), Some(300 * 1024));
        assert_eq!(parse_meminfo_available("garbage"), None);
    }

    #[test]
    fn cgroup_headroom() {
        assert_eq!(parse_cgroup_headroom("1000\n", "400\n"), Some(600));
        assert_eq!(parse_cgroup_headroom("max\n", "400\n"), None);
        assert_eq!(parse_cgroup_headroom("100", "400"), Some(0));
    }

    #[test]
    fn fixed_memory_is_settable() {
        let memory = FixedMemory::new(42);
        assert_eq!(memory.available_memory(), 42);
        assert!(!memory.is_memory_low());

        memory.set_available(7);
        memory.set_low(true);
        assert_eq!(memory.available_memory(), 7);
        assert!(memory.is_memory_low());
    }

    #[test]
    fn impossible_watermark_never_reports_low() {
        let memory = SystemMemory::with_low_watermark(0);
        assert!(!memory.is_memory_low());
    }

    #[test]
    fn below_watermark_reports_low() {
        let memory = SystemMemory::with_low_watermark(64 * MIB)
            .with_probe(|| Some(16 * MIB))
            .with_recheck(Duration::ZERO);
        assert!(memory.is_memory_low());
        assert!(memory.is_memory_low());
        assert_eq!(memory.available_memory(), 16 * MIB);
    }

    #[test]
    fn above_watermark_is_not_low() {
        let memory = SystemMemory::with_low_watermark(64 * MIB).with_probe(|| Some(4096 * MIB));
        assert!(!memory.is_memory_low());
    }

    #[test]
    fn unreadable_host_is_never_low() {
        let memory = SystemMemory::with_low_watermark(u64::MAX)
            .with_probe(|| None)
            .with_recheck(Duration::ZERO);
        assert!(!memory.is_memory_low());
        assert!(!memory.is_memory_low());
    }

    #[test]
    fn unreadable_host_plans_with_fixed_figure() {
        let memory = SystemMemory::new().with_probe(|| None);
        assert_eq!(memory.available_memory(), UNKNOWN_HOST_MEMORY);
    }

    #[test]
    fn low_answer_is_reused_within_recheck_interval() {
        let memory = SystemMemory::with_low_watermark(64 * MIB)
            .with_probe(|| Some(MIB))
            .with_recheck(Duration::from_secs(3600));
        assert!(memory.is_memory_low());
        assert!(!memory.probe_due(memory.origin.elapsed().as_millis() as u64));
        assert!(memory.is_memory_low());
    }
}
