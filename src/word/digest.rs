//! Digest pipeline: canonical key → 12-character word hash.
//!
//! ```text
//!   "hello" ──► MD5 (16 bytes) ──► base64, ordered alphabet ──► first 12 chars
//!                                   A-Z a-z 0-9 - _               "XUFAKrxLKna5"
//! ```
//!
//! The alphabet is the URL-safe base64 alphabet without padding, read as an
//! ordering: `A` sorts lowest and `_` highest. Twelve characters carry 72 of
//! the digest's 128 bits. Codes match the word hashes of existing indexes
//! built with the same digest and alphabet, so they are stable across
//! processes and releases.
//!
//! The pipeline is pure and is the expensive step that
//! [`WordHasher`](crate::word::hasher::WordHasher) caches.

use std::cmp::Ordering;
use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use md5::{Digest, Md5};

use crate::error::ShortCodeError;
use crate::word::canonical::CanonicalKey;

/// Number of characters in a word hash.
pub const SHORT_CODE_LEN: usize = 12;

/// The ordered encoding alphabet; a character's index is its sort rank.
pub const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Position that must never hold `@`.
const RESERVED_POS: usize = 2;

/// Sort rank of an alphabet character, `None` for anything else.
#[inline]
pub fn rank(c: u8) -> Option<u8> {
    match c {
        b'A'..=b'Z' => Some(c - b'A'),
        b'a'..=b'z' => Some(c - b'a' + 26),
        b'0'..=b'9' => Some(c - b'0' + 52),
        b'-' => Some(62),
        b'_' => Some(63),
        _ => None,
    }
}

/// Encodes `bytes` with the ordered alphabet and keeps the first `len`
/// characters (fewer if the encoding is shorter).
///
/// ```
/// use wordhash::word::digest::encode_prefix;
///
/// assert_eq!(encode_prefix(b"hello", 4), b"aGVs".to_vec());
/// assert_eq!(encode_prefix(b"hi", 10), b"aGk".to_vec());
/// ```
pub fn encode_prefix(bytes: &[u8], len: usize) -> Vec<u8> {
    // 3 input bytes make 4 output characters; encode only what is kept.
    let needed = len.div_ceil(4) * 3;
    let input = &bytes[..needed.min(bytes.len())];
    let mut encoded = URL_SAFE_NO_PAD.encode(input).into_bytes();
    encoded.truncate(len);
    encoded
}

/// A 12-character word hash.
///
/// Ordered by alphabet rank, not by raw byte value, so sorted sets of codes
/// line up with the ordering the alphabet defines.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShortCode([u8; SHORT_CODE_LEN]);

impl ShortCode {
    /// Wraps encoder output, asserting the encoding invariants.
    ///
    /// # Panics
    ///
    /// Panics if `encoded` is not exactly 12 alphabet characters or holds `@`
    /// at the reserved position. Either means the pipeline is broken, not
    /// that the input word was bad.
    pub fn from_encoded(encoded: &[u8]) -> Self {
        match Self::try_from(encoded) {
            Ok(code) => code,
            Err(err) => panic!("encoder produced an invalid word hash: {err}"),
        }
    }

    /// Parses a stored word hash, returning `None` if it is malformed.
    pub fn parse(text: &str) -> Option<Self> {
        Self::try_from(text.as_bytes()).ok()
    }

    /// The code as text.
    #[inline]
    pub fn as_str(&self) -> &str {
        // Every byte passed the alphabet check, so this is ASCII.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }

    /// The ASCII characters of the code.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; SHORT_CODE_LEN] {
        &self.0
    }

    /// Always 12.
    #[inline]
    pub fn len(&self) -> usize {
        SHORT_CODE_LEN
    }

    /// Never true; present for symmetry with `len`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl TryFrom<&[u8]> for ShortCode {
    type Error = ShortCodeError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let code: [u8; SHORT_CODE_LEN] = bytes
            .try_into()
            .map_err(|_| ShortCodeError::Length { len: bytes.len() })?;
        if code[RESERVED_POS] == b'@' {
            return Err(ShortCodeError::Reserved {
                position: RESERVED_POS,
            });
        }
        if let Some(position) = code.iter().position(|&c| rank(c).is_none()) {
            return Err(ShortCodeError::Alphabet {
                byte: code[position],
                position,
            });
        }
        Ok(Self(code))
    }
}

impl Ord for ShortCode {
    fn cmp(&self, other: &Self) -> Ordering {
        let ranks = |code: &Self| code.0.map(|c| rank(c).unwrap_or(u8::MAX));
        ranks(self).cmp(&ranks(other))
    }
}

impl PartialOrd for ShortCode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ShortCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for ShortCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShortCode({self})")
    }
}

/// Maps a canonical key to its word hash.
///
/// Implementations must be deterministic: the same key always yields the
/// same code. The cache relies on this to let racing callers keep their own
/// freshly computed values.
pub trait DigestPipeline: Send + Sync {
    fn short_code(&self, key: &CanonicalKey) -> ShortCode;
}

/// MD5 followed by the ordered base64 alphabet, truncated to 12 characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Md5Base64Pipeline;

impl DigestPipeline for Md5Base64Pipeline {
    fn short_code(&self, key: &CanonicalKey) -> ShortCode {
        let digest = Md5::digest(key.as_bytes());
        ShortCode::from_encoded(&encode_prefix(&digest, SHORT_CODE_LEN))
    }
}
