//! Bounded sets of word hashes.
//!
//! A document's distinct words are collected as a [`HandleSet`]: the word
//! hashes in alphabet order, capped at a row budget. [`BatchHashes`] is what
//! [`WordHasher::hash_all`](crate::word::hasher::WordHasher::hash_all) hands
//! back, including whether the budget cut the batch short.

use std::collections::BTreeSet;
use std::collections::btree_set;

use crate::error::SpaceExceeded;
use crate::word::digest::ShortCode;

/// Ordered set of word hashes with a fixed row budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandleSet {
    codes: BTreeSet<ShortCode>,
    limit: usize,
}

impl HandleSet {
    /// Creates an empty set that accepts at most `limit` distinct codes.
    pub fn new(limit: usize) -> Self {
        Self {
            codes: BTreeSet::new(),
            limit,
        }
    }

    /// Adds `code`, returning `Ok(false)` if it was already present.
    ///
    /// A duplicate never counts against the budget, even on a full set.
    pub fn put(&mut self, code: ShortCode) -> Result<bool, SpaceExceeded> {
        if self.codes.contains(&code) {
            return Ok(false);
        }
        if self.codes.len() >= self.limit {
            return Err(SpaceExceeded { limit: self.limit });
        }
        Ok(self.codes.insert(code))
    }

    pub fn contains(&self, code: &ShortCode) -> bool {
        self.codes.contains(code)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Codes in alphabet order.
    pub fn iter(&self) -> btree_set::Iter<'_, ShortCode> {
        self.codes.iter()
    }
}

impl<'a> IntoIterator for &'a HandleSet {
    type Item = &'a ShortCode;
    type IntoIter = btree_set::Iter<'a, ShortCode>;

    fn into_iter(self) -> Self::IntoIter {
        self.codes.iter()
    }
}

/// Word hashes of a batch of tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchHashes {
    set: HandleSet,
    complete: bool,
}

impl BatchHashes {
    pub(crate) fn new(set: HandleSet, complete: bool) -> Self {
        Self { set, complete }
    }

    /// `false` when the row budget ran out before every token was added.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn contains(&self, code: &ShortCode) -> bool {
        self.set.contains(code)
    }

    pub fn handles(&self) -> &HandleSet {
        &self.set
    }

    pub fn into_set(self) -> HandleSet {
        self.set
    }
}
