//! Canonical lookup keys for words.
//!
//! Two tokens that differ only in letter case share one key, and therefore
//! one word hash and one cache entry. Case folding uses the Unicode default
//! lower-case mapping from `str::to_lowercase`, which does not depend on the
//! host locale (including the context-sensitive final sigma rule).

use std::borrow::Borrow;
use std::fmt;

/// Case-folded form of a token, used as the hash cache key.
///
/// Only [`canonicalize`] constructs one, so every `CanonicalKey` is already
/// lower-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    /// The folded text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The UTF-8 bytes that get digested.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Gives back the folded text.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CanonicalKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Folds `raw` into its canonical key.
///
/// ```
/// use wordhash::word::canonical::canonicalize;
///
/// assert_eq!(canonicalize("HeLLo").as_str(), "hello");
/// assert_eq!(canonicalize("Straße"), canonicalize("STRAßE"));
/// ```
pub fn canonicalize(raw: &str) -> CanonicalKey {
    if raw.is_ascii() {
        return CanonicalKey(raw.to_ascii_lowercase());
    }
    CanonicalKey(raw.to_lowercase())
}
