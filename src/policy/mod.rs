pub mod arc;
pub mod concurrent_arc;

pub use arc::ArcCore;
pub use concurrent_arc::ConcurrentArcCache;
