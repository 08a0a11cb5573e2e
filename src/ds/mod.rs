pub mod ghost_list;
pub mod shard;

pub use ghost_list::GhostList;
pub use shard::ShardSelector;
