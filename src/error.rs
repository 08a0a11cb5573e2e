//! Error types for the wordhash crate.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when planner configuration parameters are
//!   invalid (e.g. zero bytes-per-entry, `min_entries > max_entries`).
//! - [`InvariantError`]: Returned by `check_invariants` methods on the ARC
//!   core and ghost list when internal bookkeeping has drifted.
//! - [`CacheAllocError`]: The hash cache could not reserve memory for its
//!   planned capacity.
//! - [`InitError`]: Fatal startup failure; the hasher cannot run without a
//!   cache.
//! - [`ShortCodeError`]: Bytes rejected when converting into a
//!   [`ShortCode`](crate::word::digest::ShortCode).
//! - [`SpaceExceeded`]: A [`HandleSet`](crate::word::handles::HandleSet) ran
//!   out of rows during batch hashing.
//!
//! ## Example Usage
//!
//! ```
//! use wordhash::error::ConfigError;
//! use wordhash::word::planner::PlannerConfig;
//!
//! let config = PlannerConfig {
//!     bytes_per_entry: 0,
//!     ..PlannerConfig::default()
//! };
//! let err: ConfigError = config.validate().unwrap_err();
//! assert!(err.to_string().contains("bytes_per_entry"));
//! ```

use std::collections::TryReserveError;
use std::fmt;

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
///
/// Produced by [`ArcCore::check_invariants`](crate::policy::arc::ArcCore::check_invariants)
/// and [`GhostList::check_invariants`](crate::ds::GhostList::check_invariants).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when planner configuration parameters are invalid.
///
/// Carries a human-readable description of which parameter failed
/// validation.
///
/// # Example
///
/// ```
/// use wordhash::word::planner::PlannerConfig;
///
/// let config = PlannerConfig {
///     min_entries: 10,
///     max_entries: 5,
///     ..PlannerConfig::default()
/// };
/// assert!(config.validate().unwrap_err().to_string().contains("min_entries"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Allocation and startup
// ---------------------------------------------------------------------------

/// The hash cache could not reserve storage for `capacity` entries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot allocate hash cache for {capacity} entries across {shards} shards: {source}")]
pub struct CacheAllocError {
    pub capacity: usize,
    pub shards: usize,
    #[source]
    pub source: TryReserveError,
}

/// Fatal failure while building the hasher.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    /// The planner configuration was rejected before any allocation.
    #[error("invalid planner configuration: {0}")]
    Config(#[from] ConfigError),

    /// Both the full plan and the fallback plan failed to allocate.
    #[error("hash cache allocation failed after fallback")]
    Allocation(#[from] CacheAllocError),
}

// ---------------------------------------------------------------------------
// SpaceExceeded
// ---------------------------------------------------------------------------

/// A handle set refused a new row because its budget is used up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("handle set is full ({limit} rows)")]
pub struct SpaceExceeded {
    pub limit: usize,
}

// ---------------------------------------------------------------------------
// ShortCodeError
// ---------------------------------------------------------------------------

/// Bytes that do not form a word hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ShortCodeError {
    #[error("{len} characters, expected 12")]
    Length { len: usize },
    #[error("'@' at reserved position {position}")]
    Reserved { position: usize },
    #[error("byte {byte:#04x} at position {position} is outside the alphabet")]
    Alphabet { byte: u8, position: usize },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
