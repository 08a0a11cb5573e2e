//! Word hashing: case folding, digesting, cache sizing and per-document
//! statistics.

pub mod canonical;
pub mod digest;
pub mod handles;
pub mod hasher;
pub mod memory;
pub mod planner;
pub mod stats;

pub use canonical::{CanonicalKey, canonicalize};
pub use digest::{DigestPipeline, Md5Base64Pipeline, SHORT_CODE_LEN, ShortCode};
pub use handles::{BatchHashes, HandleSet};
pub use hasher::{CacheState, WordHasher};
pub use memory::{FixedMemory, MemoryMonitor, SystemMemory};
pub use planner::{CapacityPlan, PlannerConfig, WordCache};
pub use stats::{TokenStatistics, WordFlags};
