//! Per-document occurrence statistics for a word.
//!
//! A [`TokenStatistics`] is created the first time a word shows up while a
//! document is analysed, updated in place for every repeat, and dropped with
//! the rest of the analysis. It is never cached or shared across documents.

use std::fmt;

use rustc_hash::FxHashSet;

/// Phrase numbers of ordinary text phrases start here; lower numbers are
/// reserved for titles, headlines and other structural phrases.
pub const FIRST_TEXT_PHRASE: u32 = 100;

/// Small bitfield of per-word flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct WordFlags(u32);

impl WordFlags {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// # Panics
    ///
    /// Panics if `bit >= 32`.
    pub fn set(&mut self, bit: u32) {
        self.0 |= Self::mask(bit);
    }

    pub fn clear(&mut self, bit: u32) {
        self.0 &= !Self::mask(bit);
    }

    pub fn get(self, bit: u32) -> bool {
        self.0 & Self::mask(bit) != 0
    }

    fn mask(bit: u32) -> u32 {
        assert!(bit < u32::BITS, "word flag bit {bit} out of range");
        1 << bit
    }
}

/// Occurrence bookkeeping for one word within one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenStatistics {
    count: u32,
    pos_in_text: u32,
    pos_in_phrase: u32,
    num_of_phrase: u32,
    phrases: FxHashSet<u32>,
    flags: Option<WordFlags>,
}

impl TokenStatistics {
    /// Statistics for a first sighting; the count starts at 1.
    ///
    /// `pos_in_text` is the word's handle (its position among distinct words)
    /// and is fixed from here on.
    pub fn new(pos_in_text: u32, pos_in_phrase: u32, num_of_phrase: u32) -> Self {
        Self {
            count: 1,
            pos_in_text,
            pos_in_phrase,
            num_of_phrase,
            phrases: FxHashSet::default(),
            flags: None,
        }
    }

    /// Counts one more occurrence.
    pub fn increment(&mut self) {
        self.count = self.count.saturating_add(1);
    }

    pub fn occurrence_count(&self) -> u32 {
        self.count
    }

    /// Notes that the word appears in phrase `handle`. Repeats are ignored.
    pub fn record_phrase(&mut self, handle: u32) {
        self.phrases.insert(handle);
    }

    /// Handles of all phrases the word appears in, in no particular order.
    ///
    /// Each call starts a fresh pass over the current set.
    pub fn phrase_membership(&self) -> impl Iterator<Item = u32> + '_ {
        self.phrases.iter().copied()
    }

    pub fn pos_in_text(&self) -> u32 {
        self.pos_in_text
    }

    pub fn pos_in_phrase(&self) -> u32 {
        self.pos_in_phrase
    }

    pub fn num_of_phrase(&self) -> u32 {
        self.num_of_phrase
    }

    pub fn set_pos_in_phrase(&mut self, pos: u32) {
        self.pos_in_phrase = pos;
    }

    pub fn set_num_of_phrase(&mut self, num: u32) {
        self.num_of_phrase = num;
    }

    pub fn flags(&self) -> Option<WordFlags> {
        self.flags
    }

    pub fn set_flags(&mut self, flags: WordFlags) {
        self.flags = Some(flags);
    }
}

impl fmt::Display for TokenStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{count={}, posInText={}, posInPhrase={}, numOfPhrase={}}}",
            self.count, self.pos_in_text, self.pos_in_phrase, self.num_of_phrase
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_and_deduplicates_phrases() {
        let mut stats = TokenStatistics::new(5, 1, 100);
        stats.increment();
        stats.increment();
        stats.record_phrase(100);
        stats.record_phrase(100);

        assert_eq!(stats.occurrence_count(), 3);
        assert_eq!(stats.phrase_membership().collect::<Vec<_>>(), vec![100]);
    }

    #[test]
    fn new_statistics_start_at_one() {
        let stats = TokenStatistics::new(0, 0, FIRST_TEXT_PHRASE);
        assert_eq!(stats.occurrence_count(), 1);
        assert_eq!(stats.phrase_membership().count(), 0);
        assert_eq!(stats.flags(), None);
    }

    #[test]
    fn membership_is_restartable_and_current() {
        let mut stats = TokenStatistics::new(1, 0, 100);
        stats.record_phrase(100);
        stats.record_phrase(101);
        assert_eq!(stats.phrase_membership().count(), 2);
        assert_eq!(stats.phrase_membership().count(), 2);

        stats.record_phrase(102);
        let mut seen: Vec<_> = stats.phrase_membership().collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![100, 101, 102]);
    }

    #[test]
    fn positions_are_kept() {
        let mut stats = TokenStatistics::new(7, 3, 104);
        assert_eq!(stats.pos_in_text(), 7);
        assert_eq!(stats.pos_in_phrase(), 3);
        assert_eq!(stats.num_of_phrase(), 104);

        stats.set_pos_in_phrase(4);
        stats.set_num_of_phrase(105);
        assert_eq!(stats.pos_in_phrase(), 4);
        assert_eq!(stats.num_of_phrase(), 105);
        assert_eq!(stats.pos_in_text(), 7);
    }

    #[test]
    fn display_lists_counts_and_positions() {
        let stats = TokenStatistics::new(5, 1, 100);
        assert_eq!(
            stats.to_string(),
            "{count=1, posInText=5, posInPhrase=1, numOfPhrase=100}"
        );
    }

    #[test]
    fn flags_set_get_clear() {
        let mut flags = WordFlags::empty();
        flags.set(0);
        flags.set(31);
        assert!(flags.get(0));
        assert!(flags.get(31));
        assert!(!flags.get(5));

        flags.clear(0);
        assert!(!flags.get(0));
        assert_eq!(flags.bits(), 1 << 31);

        let mut stats = TokenStatistics::new(0, 0, 100);
        stats.set_flags(flags);
        assert_eq!(stats.flags(), Some(WordFlags::from_bits(1 << 31)));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn flag_bit_out_of_range_panics() {
        WordFlags::empty().set(32);
    }
}
