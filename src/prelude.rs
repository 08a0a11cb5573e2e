pub use crate::ds::{GhostList, ShardSelector};
pub use crate::error::{
    CacheAllocError, ConfigError, InitError, InvariantError, ShortCodeError, SpaceExceeded,
};
pub use crate::metrics::HasherMetricsSnapshot;
pub use crate::policy::arc::ArcCore;
pub use crate::policy::concurrent_arc::ConcurrentArcCache;
pub use crate::traits::{ConcurrentCache, CoreCache};
pub use crate::word::canonical::{CanonicalKey, canonicalize};
pub use crate::word::digest::{DigestPipeline, Md5Base64Pipeline, ShortCode};
pub use crate::word::handles::{BatchHashes, HandleSet};
pub use crate::word::hasher::{CacheState, WordHasher};
pub use crate::word::memory::{FixedMemory, MemoryMonitor, SystemMemory};
pub use crate::word::planner::{PlannerConfig, WordCache};
pub use crate::word::stats::{TokenStatistics, WordFlags};
