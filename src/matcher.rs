//! The per-query matching engine.
//!
//! A [`Matcher`] holds immutable state derived from the query and the
//! options (decoded query, smartcase flag, current-file decomposition) and
//! decides, per item, whether the query matches and how well. It is built
//! once per invocation and shared by reference across worker threads; all
//! per-item scratch lives in thread-local buffers so matching never
//! allocates in the steady state.
//!
//! Matching runs in phases over the decoded item:
//!
//! 1. a greedy subsequence scan that alone decides match/no-match;
//! 2. current-file gating and metrics (path distance, shared words);
//! 3. a right-to-left component pass that anchors the query to the right
//!    edge of the path, splitting it into a directory part and a basename
//!    part;
//! 4. a word-prefix pass over the basename, with a greedy fallback, that
//!    produces the fine-grained ranking metrics.
//!
//! Match positions are reconstructed on demand by replaying the same
//! phases and lifting code-point indices to byte offsets.

use std::cell::RefCell;

use thread_local::ThreadLocal;

use crate::path;
use crate::score::{CharCount, PrefixLevel, Score};
use crate::strings::{CodePoint, StringHandler};

/// How query path separators constrain component matches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[cfg_attr(feature = "cli", clap(rename_all = "lower"))]
pub enum QueryPathMode {
    /// Query separators match like any other character.
    Normal,
    /// Every query part between separators must match within a single item
    /// component, anchored at the component's separator.
    Strict,
    /// Strict iff the query contains a separator.
    #[default]
    Auto,
}

/// Options fixed at matcher construction.
#[derive(Debug, Clone)]
pub struct MatcherOptions {
    /// Treat the query and all items as paths.
    pub is_path: bool,
    pub query_path_mode: QueryPathMode,
    /// The currently open file; empty disables the current-file metrics.
    pub crfile: Vec<u8>,
    /// If false, the current file itself never matches.
    pub match_crfile: bool,
    /// Decode items as UTF-8 instead of raw bytes.
    pub unicode: bool,
}

impl Default for MatcherOptions {
    fn default() -> Self {
        Self {
            is_path: true,
            query_path_mode: QueryPathMode::default(),
            crfile: Vec::new(),
            match_crfile: false,
            unicode: false,
        }
    }
}

/// The outcome of a successful match when the caller asked for match info.
#[derive(Debug, Clone)]
pub struct MatchInfo {
    score: Score,
    positions: Vec<usize>,
}

impl MatchInfo {
    /// The packed score; higher is better.
    pub fn score(&self) -> u64 {
        self.score.packed()
    }

    /// The unpacked score vector.
    pub fn score_fields(&self) -> &Score {
        &self.score
    }

    /// Sorted, deduplicated byte offsets into the match key at which query
    /// characters matched. Every byte of a matched code point is included.
    pub fn match_positions(&self) -> &[usize] {
        &self.positions
    }

    /// Human-readable score breakdown.
    pub fn score_debug_string(&self) -> String {
        self.score.debug_string()
    }
}

/// One accepted component from the right-to-left pass: query characters
/// `q_lo..q_hi` matched inside item characters `begin..end`, with the
/// leftmost match at `inner_start`.
#[derive(Debug, Clone, Copy)]
struct CompMatch {
    begin: usize,
    end: usize,
    inner_start: usize,
    q_lo: usize,
    q_hi: usize,
}

/// Per-thread, per-item scratch, reused across items to avoid allocation
/// churn.
#[derive(Default)]
struct Scratch {
    /// Decoded item; case-folded in place once the item is known to match.
    chars: Vec<CodePoint>,
    /// Byte offset of each code point's first byte.
    byte_pos: Vec<usize>,
    /// Pre-fold character properties.
    upper: Vec<bool>,
    alnum: Vec<bool>,
    comps: Vec<(usize, usize)>,
    comp_matches: Vec<CompMatch>,
    /// Query cursor at the entry of each basename word (word-prefix pass).
    milestones: Vec<usize>,
    /// Basename match positions (item code-point indices) from the scoring
    /// replay; whole-item positions when the component pass failed.
    bpos: Vec<usize>,
    byte_len: usize,
    key_begin: usize,
}

/// Basename metrics produced by the scoring replays.
#[derive(Debug, Default, Clone, Copy)]
struct KeyMetrics {
    longest: usize,
    gaps: usize,
    unmatched: usize,
    count_in_key: usize,
}

/// Immutable view of the decoded item and its key (rightmost component).
#[derive(Clone, Copy)]
struct KeyView<'a> {
    chars: &'a [CodePoint],
    upper: &'a [bool],
    alnum: &'a [bool],
    begin: usize,
}

impl KeyView<'_> {
    fn end(&self) -> usize {
        self.chars.len()
    }

    /// Word starts: the key's first position, an alphanumeric after a
    /// non-alphanumeric, or an uppercase after a non-uppercase.
    fn is_word_start(&self, i: usize) -> bool {
        if i == self.begin {
            return true;
        }
        (self.alnum[i] && !self.alnum[i - 1]) || (self.upper[i] && !self.upper[i - 1])
    }

    fn next_word_start(&self, from: usize) -> usize {
        let mut i = from + 1;
        while i < self.end() && !self.is_word_start(i) {
            i += 1;
        }
        i
    }
}

/// The per-query matching engine. See the module docs.
pub struct Matcher {
    strings: StringHandler,
    is_path: bool,
    match_crfile: bool,
    require_full_part: bool,
    case_sensitive: bool,
    query: Vec<CodePoint>,
    /// Index of the first query character after its rightmost separator.
    query_basename_start: usize,
    crfile: Vec<CodePoint>,
    crfile_basename: Vec<CodePoint>,
    /// End index of each whole word in the crfile basename's stem.
    crfile_word_ends: Vec<usize>,
    scratch: ThreadLocal<RefCell<Scratch>>,
}

impl Matcher {
    pub fn new(query: &[u8], opts: &MatcherOptions) -> Self {
        let strings = StringHandler::new(opts.unicode);
        let mut query_chars = Vec::new();
        strings.decode(query, &mut query_chars, None);

        let (query_basename_start, require_full_part) = if opts.is_path {
            let start = path::basename_start(&query_chars);
            let has_separator = query_chars.iter().any(|&c| path::is_path_separator(c));
            let strict = match opts.query_path_mode {
                QueryPathMode::Normal => false,
                QueryPathMode::Strict => true,
                QueryPathMode::Auto => has_separator,
            };
            (start, strict)
        } else {
            (0, false)
        };

        // Smartcase: case-sensitive iff the query has any uppercase.
        let case_sensitive = query_chars.iter().any(|&c| strings.is_uppercase(c));

        let mut crfile = Vec::new();
        strings.decode(&opts.crfile, &mut crfile, None);
        let crfile_bstart = if opts.is_path {
            path::basename_start(&crfile)
        } else {
            0
        };
        let crfile_basename: Vec<CodePoint> = crfile[crfile_bstart..].to_vec();
        let stem_end = path::extension_start(&crfile_basename);
        let crfile_word_ends = word_ends(&crfile_basename[..stem_end], &strings);

        debug!(
            "matcher: query_len={}, case_sensitive={}, require_full_part={}, crfile_len={}",
            query_chars.len(),
            case_sensitive,
            require_full_part,
            crfile.len()
        );

        Self {
            strings,
            is_path: opts.is_path,
            match_crfile: opts.match_crfile,
            require_full_part,
            case_sensitive,
            query: query_chars,
            query_basename_start,
            crfile,
            crfile_basename,
            crfile_word_ends,
            scratch: ThreadLocal::new(),
        }
    }

    /// Matches one item, returning its score vector on success.
    pub fn match_item(&self, key: &[u8]) -> Option<Score> {
        let cell = self.scratch.get_or_default();
        let mut sc = cell.borrow_mut();
        self.run(key, &mut sc)
    }

    /// Matches one item and reconstructs its match positions.
    pub fn match_info(&self, key: &[u8]) -> Option<MatchInfo> {
        let cell = self.scratch.get_or_default();
        let mut sc = cell.borrow_mut();
        let score = self.run(key, &mut sc)?;
        let positions = self.collect_positions(&sc, score.prefix_level);
        Some(MatchInfo { score, positions })
    }

    fn run(&self, key: &[u8], sc: &mut Scratch) -> Option<Score> {
        // Decode and record pre-fold character properties.
        sc.chars.clear();
        sc.byte_pos.clear();
        self.strings.decode(key, &mut sc.chars, Some(&mut sc.byte_pos));
        sc.byte_len = key.len();
        sc.upper.clear();
        sc.alnum.clear();
        for &c in &sc.chars {
            sc.upper.push(self.strings.is_uppercase(c));
            sc.alnum.push(self.strings.is_alphanumeric(c));
        }

        sc.comps.clear();
        if self.is_path {
            path::component_spans(&sc.chars, &mut sc.comps);
        } else if !sc.chars.is_empty() {
            sc.comps.push((0, sc.chars.len()));
        }
        let key_begin = sc.comps.last().map_or(0, |&(b, _)| b);
        sc.key_begin = key_begin;

        // The subsequence scan alone decides match/no-match.
        if !self.is_subsequence(&sc.chars) {
            return None;
        }

        // Current-file gating and metrics, on pre-fold characters. An empty
        // crfile disables them entirely.
        let mut crfile_path_distance = 0;
        let mut crfile_shared_words = 0;
        if !self.crfile.is_empty() {
            crfile_path_distance = if self.is_path {
                path::path_distance(&sc.chars, &self.crfile)
            } else if sc.chars == self.crfile {
                0
            } else {
                1
            };
            if crfile_path_distance == 0 {
                if !self.match_crfile {
                    trace!("hiding current file from matches");
                    return None;
                }
                // The current file may match but must not outrank its
                // siblings on the shared-words metric.
            } else {
                let bstart = if self.is_path {
                    path::basename_start(&sc.chars)
                } else {
                    0
                };
                crfile_shared_words = self.shared_words(&sc.chars[bstart..]);
            }
        }

        if self.query.is_empty() {
            // Everything matches an empty query with an identical basename
            // score; only the current-file fields differentiate.
            sc.comp_matches.clear();
            sc.milestones.clear();
            sc.bpos.clear();
            return Some(Score {
                crfile_shared_words: cc(crfile_shared_words),
                crfile_path_distance: cc(crfile_path_distance),
                ..Score::default()
            });
        }

        // From here the item is a confirmed match; the rest is ranking.
        // Fold case in place (idempotent for case-sensitive queries).
        if !self.case_sensitive {
            for c in sc.chars.iter_mut() {
                if self.strings.is_uppercase(*c) {
                    *c = self.strings.to_lowercase(*c);
                }
            }
        }

        let comp_result = self.component_pass(sc);
        let (mut prefix_level, qit_basename) = match comp_result {
            Some(qit) => (PrefixLevel::Component, qit),
            None => (PrefixLevel::None, self.query.len()),
        };

        let view = KeyView {
            chars: &sc.chars,
            upper: &sc.upper,
            alnum: &sc.alnum,
            begin: key_begin,
        };
        sc.bpos.clear();
        let metrics = match prefix_level {
            PrefixLevel::None => {
                // Only a plain subsequence exists; score the basename from
                // a greedy whole-item replay.
                self.greedy_pass(&view, 0, 0, &mut sc.bpos)
            }
            PrefixLevel::Component if qit_basename < self.query.len() => {
                if self.word_pass(&view, qit_basename, &mut sc.milestones) {
                    prefix_level = PrefixLevel::BasenameWord;
                    self.word_replay(&view, &sc.milestones, &mut sc.bpos)
                } else {
                    self.greedy_pass(&view, key_begin, qit_basename, &mut sc.bpos)
                }
            }
            _ => {
                // No query characters landed in the basename.
                KeyMetrics {
                    unmatched: view.end() - key_begin,
                    ..KeyMetrics::default()
                }
            }
        };

        let basename_match_count = match prefix_level {
            PrefixLevel::None => metrics.count_in_key,
            _ => self.query.len() - qit_basename,
        };

        Some(Score {
            prefix_level,
            whole_basename_match: qit_basename == self.query_basename_start,
            basename_longest_submatch: cc(metrics.longest),
            basename_match_count: cc(basename_match_count),
            basename_word_gaps: cc(metrics.gaps),
            crfile_shared_words: cc(crfile_shared_words),
            crfile_path_distance: cc(crfile_path_distance),
            unmatched_suffix_len: cc(metrics.unmatched),
            item_len: cc(sc.chars.len()),
        })
    }

    fn match_char(&self, mut item: CodePoint, query: CodePoint) -> bool {
        if !self.case_sensitive && self.strings.is_uppercase(item) {
            // The query has no uppercase (smartcase), so folding the item
            // character suffices.
            item = self.strings.to_lowercase(item);
        }
        item == query
    }

    fn is_subsequence(&self, chars: &[CodePoint]) -> bool {
        let mut qi = 0;
        for &c in chars {
            if qi == self.query.len() {
                break;
            }
            if self.match_char(c, self.query[qi]) {
                qi += 1;
            }
        }
        qi == self.query.len()
    }

    /// Counts the leading whole-word steps shared between the item basename
    /// and the current file's basename. A word boundary is not counted when
    /// the item continues with a lowercase alphanumeric; `mem` must not
    /// claim a shared word against `memcontrol`.
    fn shared_words(&self, item_basename: &[CodePoint]) -> usize {
        let crfile = &self.crfile_basename;
        let limit = item_basename.len().min(crfile.len());
        let mut count = 0;
        let mut i = 0;
        for &end in &self.crfile_word_ends {
            while i < end {
                if i >= limit || item_basename[i] != crfile[i] {
                    return count;
                }
                i += 1;
            }
            let continues = item_basename
                .get(end)
                .is_some_and(|&c| self.strings.is_alphanumeric(c) && !self.strings.is_uppercase(c));
            if !continues {
                count += 1;
            }
        }
        count
    }

    /// Right-to-left component pass. Walks components from the right; in
    /// each, query characters are consumed greedily right-to-left so that
    /// matches cling to the component's separator. Under strict path mode a
    /// component whose match does not run back to a query separator is
    /// rolled back. Returns the query cursor at the basename boundary, or
    /// `None` if roll-backs exhausted the item without consuming the query.
    fn component_pass(&self, sc: &mut Scratch) -> Option<usize> {
        sc.comp_matches.clear();
        let q = &self.query;
        let mut qi = q.len();
        let mut qit_basename = q.len();
        for (idx, &(begin, end)) in sc.comps.iter().rev().enumerate() {
            if qi > 0 {
                let qi_prev = qi;
                let mut inner_start = end;
                let mut i = end;
                while i > begin && qi > 0 {
                    i -= 1;
                    if sc.chars[i] == q[qi - 1] {
                        qi -= 1;
                        inner_start = i;
                    }
                }
                let rolled_back =
                    self.require_full_part && qi > 0 && !path::is_path_separator(q[qi - 1]);
                if rolled_back {
                    qi = qi_prev;
                } else if qi != qi_prev {
                    sc.comp_matches.push(CompMatch {
                        begin,
                        end,
                        inner_start,
                        q_lo: qi,
                        q_hi: qi_prev,
                    });
                }
            }
            if idx == 0 {
                qit_basename = qi;
            }
            if qi == 0 {
                break;
            }
        }
        if qi > 0 { None } else { Some(qit_basename) }
    }

    /// Word-prefix consumption inside one word span `[begin..end)`:
    /// alphanumeric query characters must extend the word's contiguous
    /// matched prefix; other query characters may match any equal character
    /// in the span. Consumes from `qi` up to `q_hi`, optionally emitting
    /// matched item indices.
    fn consume_word(
        &self,
        view: &KeyView,
        begin: usize,
        end: usize,
        mut qi: usize,
        q_hi: usize,
        mut out: Option<&mut Vec<usize>>,
    ) -> usize {
        let mut contiguous = 0;
        for i in begin..end {
            if qi == q_hi {
                break;
            }
            let qc = self.query[qi];
            let matched = if self.strings.is_alphanumeric(qc) {
                i == begin + contiguous && view.chars[i] == qc
            } else {
                view.chars[i] == qc
            };
            if matched {
                if i == begin + contiguous {
                    contiguous += 1;
                }
                qi += 1;
                if let Some(positions) = out.as_mut() {
                    positions.push(i);
                }
            }
        }
        qi
    }

    /// Word-prefix pass over the key. Records the query cursor at each
    /// entered word in `milestones` and returns true iff the query tail was
    /// fully consumed. When a word offers no match for the pending query
    /// character, a suffix of the previous word's matches (never its first)
    /// may be recovered and retried in the current word.
    fn word_pass(&self, view: &KeyView, qi0: usize, milestones: &mut Vec<usize>) -> bool {
        milestones.clear();
        let q_len = self.query.len();
        let mut qi = qi0;
        let mut prev_consumed = 0;
        let mut word_begin = view.begin;
        while word_begin < view.end() {
            let word_end = view.next_word_start(word_begin);
            milestones.push(qi);
            let mut end_qi = self.consume_word(view, word_begin, word_end, qi, q_len, None);
            if end_qi == qi && prev_consumed > 1 {
                for recover in 1..prev_consumed {
                    let retry_qi = qi - recover;
                    let retried =
                        self.consume_word(view, word_begin, word_end, retry_qi, q_len, None);
                    if retried > qi {
                        if let Some(last) = milestones.last_mut() {
                            *last = retry_qi;
                        }
                        qi = retry_qi;
                        end_qi = retried;
                        break;
                    }
                }
            }
            prev_consumed = end_qi - qi;
            qi = end_qi;
            if qi == q_len {
                return true;
            }
            word_begin = word_end;
        }
        false
    }

    /// Scoring replay of a successful word-prefix pass: re-consumes each
    /// word within its recorded query range, emitting positions and
    /// counting gap words, the longest consecutive run, and the trailing
    /// unmatched suffix.
    fn word_replay(&self, view: &KeyView, milestones: &[usize], out: &mut Vec<usize>) -> KeyMetrics {
        let mut metrics = KeyMetrics::default();
        let mut word_begin = view.begin;
        for (k, &lo) in milestones.iter().enumerate() {
            let word_end = view.next_word_start(word_begin);
            let hi = milestones.get(k + 1).copied().unwrap_or(self.query.len());
            if lo == hi {
                metrics.gaps += 1;
            } else {
                let consumed =
                    self.consume_word(view, word_begin, word_end, lo, hi, Some(&mut *out));
                debug_assert_eq!(consumed, hi, "replay must reproduce the pass");
            }
            word_begin = word_end;
        }
        finish_metrics(&mut metrics, out, view);
        metrics
    }

    /// Greedy scoring replay: left-to-right subsequence match from
    /// `start_i` with query cursor `start_qi`, emitting positions and
    /// tracking metrics over the key span.
    fn greedy_pass(
        &self,
        view: &KeyView,
        start_i: usize,
        start_qi: usize,
        out: &mut Vec<usize>,
    ) -> KeyMetrics {
        let mut qi = start_qi;
        for i in start_i..view.end() {
            if qi == self.query.len() {
                break;
            }
            if view.chars[i] == self.query[qi] {
                qi += 1;
                out.push(i);
            }
        }
        let mut metrics = KeyMetrics::default();
        finish_metrics(&mut metrics, out, view);
        metrics
    }

    /// Replays the match phases to produce sorted byte positions inside the
    /// original item. `sc.bpos` already holds the basename (or, for a
    /// failed component pass, whole-item) code-point positions from the
    /// scoring replay.
    fn collect_positions(&self, sc: &Scratch, prefix_level: PrefixLevel) -> Vec<usize> {
        let mut char_positions: Vec<usize> = Vec::with_capacity(self.query.len());
        if prefix_level != PrefixLevel::None {
            // Directory components: emit greedily from each component's
            // inner match start towards its separator.
            for cm in &sc.comp_matches {
                if cm.begin == sc.key_begin {
                    continue;
                }
                let mut qi = cm.q_lo;
                for i in cm.inner_start..cm.end {
                    if qi == cm.q_hi {
                        break;
                    }
                    if sc.chars[i] == self.query[qi] {
                        char_positions.push(i);
                        qi += 1;
                    }
                }
                debug_assert_eq!(qi, cm.q_hi, "component replay must reproduce the pass");
            }
        }
        char_positions.extend_from_slice(&sc.bpos);

        // Lift code-point indices to byte offsets, covering every byte of
        // each matched code point.
        let mut bytes: Vec<usize> = Vec::with_capacity(char_positions.len());
        for &ci in &char_positions {
            let begin = sc.byte_pos[ci];
            let end = sc.byte_pos.get(ci + 1).copied().unwrap_or(sc.byte_len);
            bytes.extend(begin..end);
        }
        bytes.sort_unstable();
        bytes.dedup();
        bytes
    }
}

#[inline]
fn cc(n: usize) -> CharCount {
    n.min(CharCount::MAX as usize) as CharCount
}

/// Longest consecutive run and trailing unmatched suffix over emitted key
/// positions. Positions outside the key span (possible for a whole-item
/// greedy replay) count toward neither.
fn finish_metrics(metrics: &mut KeyMetrics, positions: &[usize], view: &KeyView) {
    let mut run = 0;
    let mut last: Option<usize> = None;
    for &i in positions {
        if i < view.begin {
            continue;
        }
        metrics.count_in_key += 1;
        run = match last {
            Some(prev) if prev + 1 == i => run + 1,
            _ => 1,
        };
        metrics.longest = metrics.longest.max(run);
        last = Some(i);
    }
    metrics.unmatched = match last {
        Some(i) => view.end() - 1 - i,
        None => view.end() - view.begin,
    };
}

/// End index of each whole word in `stem`: positions just past a maximal
/// alphanumeric run, splitting additionally at interior word starts
/// (CamelCase).
fn word_ends(stem: &[CodePoint], strings: &StringHandler) -> Vec<usize> {
    let mut ends = Vec::new();
    for i in 1..=stem.len() {
        if !strings.is_alphanumeric(stem[i - 1]) {
            continue;
        }
        let boundary = i == stem.len()
            || !strings.is_alphanumeric(stem[i])
            || (strings.is_uppercase(stem[i]) && !strings.is_uppercase(stem[i - 1]));
        if boundary {
            ends.push(i);
        }
    }
    ends
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(query: &str) -> Matcher {
        Matcher::new(query.as_bytes(), &MatcherOptions::default())
    }

    fn matcher_with(query: &str, opts: MatcherOptions) -> Matcher {
        Matcher::new(query.as_bytes(), &opts)
    }

    fn score(m: &Matcher, item: &str) -> Score {
        m.match_item(item.as_bytes())
            .unwrap_or_else(|| panic!("expected {item:?} to match"))
    }

    #[test]
    fn test_subsequence_decides_match() {
        let m = matcher("fb");
        assert!(m.match_item(b"foo/bar").is_some());
        assert!(m.match_item(b"fab").is_some());
        assert!(m.match_item(b"barfoo").is_none());
        assert!(m.match_item(b"").is_none());
    }

    #[test]
    fn test_smartcase() {
        let m = matcher("fb");
        assert!(m.match_item(b"FooBar").is_some());
        let m = matcher("FB");
        assert!(m.match_item(b"FooBar").is_some());
        assert!(m.match_item(b"foobar").is_none());
    }

    #[test]
    fn test_empty_query_matches_everything_identically() {
        let m = matcher("");
        let a = score(&m, "short").packed();
        let b = score(&m, "a/much/longer/path.c").packed();
        assert_eq!(a, b);
    }

    #[test]
    fn test_word_prefix_beats_greedy() {
        let m = matcher("fb");
        assert_eq!(score(&m, "foo/foo_bar").prefix_level, PrefixLevel::BasenameWord);
        assert_eq!(score(&m, "foo/FooBar").prefix_level, PrefixLevel::BasenameWord);
        assert_eq!(score(&m, "foo/foobar").prefix_level, PrefixLevel::Component);
    }

    #[test]
    fn test_whole_basename_match_flag() {
        let m = matcher("fb");
        assert!(score(&m, "fbar").whole_basename_match);
        assert!(score(&m, "foo/fbar").whole_basename_match);
        // The 'f' matched in the directory part.
        assert!(!score(&m, "foo/bar").whole_basename_match);
    }

    #[test]
    fn test_longest_submatch_counts_consecutive_runs() {
        let m = matcher("fb");
        assert_eq!(score(&m, "fbar").basename_longest_submatch, 2);
        assert_eq!(score(&m, "foo_bar").basename_longest_submatch, 1);
    }

    #[test]
    fn test_word_gaps_include_leading_words() {
        let m = matcher("foo");
        let front = score(&m, "foo_bar");
        let back = score(&m, "bar_foo");
        assert_eq!(front.basename_word_gaps, 0);
        assert_eq!(back.basename_word_gaps, 1);
        assert!(front.packed() > back.packed());
    }

    #[test]
    fn test_word_pass_partial_backtrack() {
        // "f" and "o" land in the first word, then "b" forces the "o" to be
        // recovered and re-matched at the second word's start.
        let m = matcher("fob");
        let s = score(&m, "fo_obar");
        assert_eq!(s.prefix_level, PrefixLevel::BasenameWord);
        let info = m.match_info(b"fo_obar").unwrap();
        assert_eq!(info.match_positions(), &[0, 3, 4]);
    }

    #[test]
    fn test_strict_path_mode() {
        let opts = MatcherOptions {
            query_path_mode: QueryPathMode::Strict,
            ..MatcherOptions::default()
        };
        let m = matcher_with("ab", opts);
        // Still a match (the subsequence holds), but the split across
        // components cannot anchor, so no component prefix survives.
        let s = score(&m, "a/b_x/c");
        assert_eq!(s.prefix_level, PrefixLevel::None);
        // Anchored within one component is fine.
        let s = score(&m, "x/ab");
        assert_eq!(s.prefix_level, PrefixLevel::BasenameWord);
    }

    #[test]
    fn test_auto_path_mode_requires_separator() {
        let m = matcher("x86/");
        let s = score(&m, "arch/x86/um/signal.c");
        assert_eq!(s.prefix_level, PrefixLevel::Component);
        assert!(m.match_item(b"arch/x8/6/um").is_some());
    }

    #[test]
    fn test_crfile_hidden_by_default() {
        let opts = MatcherOptions {
            crfile: b"mm/memcontrol.c".to_vec(),
            ..MatcherOptions::default()
        };
        let m = matcher_with("", opts);
        assert!(m.match_item(b"mm/memcontrol.c").is_none());
        assert!(m.match_item(b"mm/vmscan.c").is_some());
    }

    #[test]
    fn test_crfile_match_crfile_demotes_shared_words() {
        let opts = MatcherOptions {
            crfile: b"mm/memcontrol.c".to_vec(),
            match_crfile: true,
            ..MatcherOptions::default()
        };
        let m = matcher_with("", opts);
        let own = score(&m, "mm/memcontrol.c");
        let sibling = score(&m, "mm/memcontrol_test.c");
        assert_eq!(own.crfile_shared_words, 0);
        assert!(sibling.crfile_shared_words > 0);
    }

    #[test]
    fn test_shared_words_ignores_continuations() {
        let opts = MatcherOptions {
            crfile: b"mm/mem.c".to_vec(),
            ..MatcherOptions::default()
        };
        let m = matcher_with("", opts);
        // "memory" continues the word "mem", so no shared word.
        assert_eq!(score(&m, "mm/memory.c").crfile_shared_words, 0);
        assert_eq!(score(&m, "mm/mem_cache.c").crfile_shared_words, 1);
        assert_eq!(score(&m, "mm/mem.h").crfile_shared_words, 1);
    }

    #[test]
    fn test_crfile_path_distance() {
        let opts = MatcherOptions {
            crfile: b"kernel/signal.c".to_vec(),
            ..MatcherOptions::default()
        };
        let m = matcher_with("", opts);
        assert_eq!(score(&m, "kernel/sys.c").crfile_path_distance, 1);
        assert_eq!(score(&m, "arch/x86/um/signal.c").crfile_path_distance, 5);
    }

    #[test]
    fn test_match_positions_ascii() {
        let m = matcher("fb");
        let info = m.match_info(b"foo/bar").unwrap();
        assert_eq!(info.match_positions(), &[0, 4]);
        let info = m.match_info(b"fbar").unwrap();
        assert_eq!(info.match_positions(), &[0, 1]);
    }

    #[test]
    fn test_match_positions_cling_to_separator() {
        // The 'o' must highlight next to the separator, not at its first
        // occurrence.
        let m = matcher("ob");
        let info = m.match_info(b"foo/bar").unwrap();
        assert_eq!(info.match_positions(), &[2, 4]);
    }

    #[test]
    fn test_match_positions_utf8() {
        let opts = MatcherOptions {
            unicode: true,
            ..MatcherOptions::default()
        };
        let m = Matcher::new("é".as_bytes(), &opts);
        let info = m.match_info("café".as_bytes()).unwrap();
        // Both bytes of the matched code point.
        assert_eq!(info.match_positions(), &[3, 4]);
    }

    #[test]
    fn test_malformed_utf8_still_matches() {
        let opts = MatcherOptions {
            unicode: true,
            ..MatcherOptions::default()
        };
        let m = Matcher::new(b"ab", &opts);
        let info = m.match_info(b"a\xFF\xFEb").unwrap();
        assert_eq!(info.match_positions(), &[0, 3]);
    }

    #[test]
    fn test_special_paths() {
        let m = matcher("a");
        assert!(m.match_item(b"").is_none());
        assert!(m.match_item(b"/").is_none());
        assert!(m.match_item(b"a/").is_some());
        assert!(m.match_item(b"/a").is_some());
    }

    #[test]
    fn test_non_path_mode() {
        let opts = MatcherOptions {
            is_path: false,
            ..MatcherOptions::default()
        };
        let m = matcher_with("ab", opts);
        let s = score(&m, "x a/b");
        // Separators carry no meaning: the whole item is the key.
        assert_eq!(s.basename_match_count, 2);
    }

    #[test]
    fn test_score_debug_string_round_trip() {
        let m = matcher("fb");
        let info = m.match_info(b"foo_bar").unwrap();
        assert!(info.score_debug_string().contains("prefix_level=BasenameWord"));
    }

    #[test]
    fn test_word_ends() {
        let s = StringHandler::new(false);
        let to = |t: &str| t.chars().map(|c| c as CodePoint).collect::<Vec<_>>();
        assert_eq!(word_ends(&to("memcontrol"), &s), vec![10]);
        assert_eq!(word_ends(&to("foo_bar"), &s), vec![3, 7]);
        assert_eq!(word_ends(&to("FooBar"), &s), vec![3, 6]);
        assert_eq!(word_ends(&to(""), &s), Vec::<usize>::new());
    }
}
