//! wordhash: case-insensitive word hashes behind a memory-aware ARC cache.
//!
//! See `DESIGN.md` for internal architecture and invariants.

pub mod ds;
pub mod error;
pub mod metrics;
pub mod policy;
pub mod prelude;
pub mod traits;
pub mod word;
