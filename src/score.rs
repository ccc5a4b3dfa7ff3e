//! The multi-field score vector and its packed 64-bit form.
//!
//! A matched item is ranked by nine fields of strictly decreasing
//! significance. The whole vector packs into one `u64` that compares as an
//! unsigned integer in the same greater-is-better direction, so the driver
//! only ever sorts on a single word. Fields where lower is better are
//! stored inverted against their width's maximum.

/// Character/length counter. Path lengths fit comfortably in 16 bits on the
/// major platforms (PATH_MAX is 4096 on Linux, 1024 on macOS).
pub type CharCount = u16;

/// How strongly the query's tail attaches to word boundaries in the item
/// basename.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum PrefixLevel {
    /// The right-to-left component pass failed; only a plain subsequence
    /// match exists.
    #[default]
    None = 0,
    /// The query matched across path components, anchored right.
    Component = 1,
    /// The query's basename part matched entirely at word prefixes of the
    /// item basename.
    BasenameWord = 2,
}

/// The score vector for one matched item. See the crate docs for the field
/// semantics; `better` direction is noted per field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    /// Higher is better.
    pub prefix_level: PrefixLevel,
    /// True iff the whole query basename matched inside the item basename.
    pub whole_basename_match: bool,
    /// Longest run of consecutive query characters matched in the item
    /// basename. Higher is better.
    pub basename_longest_submatch: CharCount,
    /// Number of query characters consumed inside the item basename.
    /// Higher is better.
    pub basename_match_count: CharCount,
    /// Words of the item basename entered without contributing a match.
    /// Lower is better.
    pub basename_word_gaps: CharCount,
    /// Leading whole-word steps shared between the item basename and the
    /// current file's basename. Higher is better.
    pub crfile_shared_words: CharCount,
    /// Directory hops between the item and the current file. Lower is
    /// better.
    pub crfile_path_distance: CharCount,
    /// Characters after the last match inside the item basename. Lower is
    /// better.
    pub unmatched_suffix_len: CharCount,
    /// Total item length; lower is weakly better as a stable content
    /// tiebreak.
    pub item_len: CharCount,
}

const LONGEST_BITS: u32 = 7;
const COUNT_BITS: u32 = 7;
const GAPS_BITS: u32 = 7;
const SHARED_BITS: u32 = 7;
const DISTANCE_BITS: u32 = 11;
const UNMATCHED_BITS: u32 = 8;
const LEN_BITS: u32 = 14;

#[inline]
fn field(value: CharCount, bits: u32, invert: bool) -> u64 {
    let cap = (1u64 << bits) - 1;
    let v = (value as u64).min(cap);
    if invert { cap - v } else { v }
}

impl Score {
    /// Packs the vector into a monotone `u64`: for any two scores,
    /// `a.packed() > b.packed()` iff `a` is strictly better under the
    /// lexicographic field order.
    pub fn packed(&self) -> u64 {
        let mut acc = self.prefix_level as u64;
        acc = (acc << 1) | self.whole_basename_match as u64;
        acc = (acc << LONGEST_BITS) | field(self.basename_longest_submatch, LONGEST_BITS, false);
        acc = (acc << COUNT_BITS) | field(self.basename_match_count, COUNT_BITS, false);
        acc = (acc << GAPS_BITS) | field(self.basename_word_gaps, GAPS_BITS, true);
        acc = (acc << SHARED_BITS) | field(self.crfile_shared_words, SHARED_BITS, false);
        acc = (acc << DISTANCE_BITS) | field(self.crfile_path_distance, DISTANCE_BITS, true);
        acc = (acc << UNMATCHED_BITS) | field(self.unmatched_suffix_len, UNMATCHED_BITS, true);
        (acc << LEN_BITS) | field(self.item_len, LEN_BITS, true)
    }

    /// Human-readable field dump for debugging and the CLI.
    pub fn debug_string(&self) -> String {
        format!(
            "prefix_level={:?}, whole_basename_match={}, basename_longest_submatch={}, \
             basename_match_count={}, basename_word_gaps={}, crfile_shared_words={}, \
             crfile_path_distance={}, unmatched_suffix_len={}, item_len={}",
            self.prefix_level,
            self.whole_basename_match,
            self.basename_longest_submatch,
            self.basename_match_count,
            self.basename_word_gaps,
            self.crfile_shared_words,
            self.crfile_path_distance,
            self.unmatched_suffix_len,
            self.item_len,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_priority() {
        // Each field must dominate everything below it.
        let base = Score::default();
        let mut scores = Vec::new();

        let mut s = base;
        s.prefix_level = PrefixLevel::BasenameWord;
        scores.push(s);
        let mut s = base;
        s.whole_basename_match = true;
        scores.push(s);
        let mut s = base;
        s.basename_longest_submatch = 5;
        scores.push(s);
        let mut s = base;
        s.basename_match_count = 5;
        scores.push(s);
        let mut s = base;
        s.basename_word_gaps = 0; // lower better; base already 0
        s.crfile_shared_words = 3;
        scores.push(s);
        let mut s = base;
        s.crfile_path_distance = 1;
        scores.push(s);

        // In listed order each score should beat the next: an improvement in
        // a more significant field wins even when less significant fields
        // are pessimal.
        for pair in scores.windows(2) {
            let (mut hi, lo) = (pair[0], pair[1]);
            hi.item_len = CharCount::MAX;
            hi.unmatched_suffix_len = CharCount::MAX;
            assert!(
                hi.packed() > lo.packed(),
                "{} should outrank {}",
                hi.debug_string(),
                lo.debug_string()
            );
        }
    }

    #[test]
    fn test_lower_is_better_fields() {
        let base = Score {
            basename_match_count: 2,
            ..Score::default()
        };
        let mut worse = base;
        worse.basename_word_gaps = 1;
        assert!(base.packed() > worse.packed());

        let mut worse = base;
        worse.crfile_path_distance = 3;
        assert!(base.packed() > worse.packed());

        let mut worse = base;
        worse.unmatched_suffix_len = 4;
        assert!(base.packed() > worse.packed());

        let mut worse = base;
        worse.item_len = 100;
        assert!(base.packed() > worse.packed());
    }

    #[test]
    fn test_clamping_saturates() {
        let mut a = Score::default();
        a.item_len = CharCount::MAX;
        let mut b = Score::default();
        b.item_len = (1 << LEN_BITS) - 1;
        assert_eq!(a.packed(), b.packed());
    }

    #[test]
    fn test_debug_string_lists_fields() {
        let s = Score {
            prefix_level: PrefixLevel::Component,
            basename_match_count: 2,
            ..Score::default()
        };
        let dump = s.debug_string();
        assert!(dump.contains("prefix_level=Component"));
        assert!(dump.contains("basename_match_count=2"));
    }
}
