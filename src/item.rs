//! Items offered to the matcher and the better-than order over matches.

use std::cmp::Ordering;

/// A candidate offered to the matching pipeline.
///
/// `match_key` is the byte string the query is matched against;
/// `sort_key` breaks score ties in ascending natural order. For plain
/// strings the two coincide; the [`ModedItem`](crate::mode::ModedItem)
/// wrapper narrows `match_key` while leaving `sort_key` intact.
pub trait Item: Send {
    fn match_key(&self) -> &[u8];
    fn sort_key(&self) -> &[u8];
}

impl Item for String {
    fn match_key(&self) -> &[u8] {
        self.as_bytes()
    }
    fn sort_key(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl Item for &str {
    fn match_key(&self) -> &[u8] {
        self.as_bytes()
    }
    fn sort_key(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl Item for Vec<u8> {
    fn match_key(&self) -> &[u8] {
        self
    }
    fn sort_key(&self) -> &[u8] {
        self
    }
}

impl Item for &[u8] {
    fn match_key(&self) -> &[u8] {
        self
    }
    fn sort_key(&self) -> &[u8] {
        self
    }
}

/// A matched item bound to its packed score.
///
/// The `Ord` implementation is the better-than order: a greater `Matched`
/// is a better match (higher score, then lower sort key). Sorting
/// descending therefore yields descending match quality.
#[derive(Debug, Clone)]
pub struct Matched<I> {
    pub score: u64,
    pub item: I,
}

impl<I: Item> PartialEq for Matched<I> {
    fn eq(&self, other: &Self) -> bool {
        self.score == other.score && self.item.sort_key() == other.item.sort_key()
    }
}

impl<I: Item> Eq for Matched<I> {}

impl<I: Item> PartialOrd for Matched<I> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<I: Item> Ord for Matched<I> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .cmp(&other.score)
            .then_with(|| other.item.sort_key().cmp(self.item.sort_key()))
    }
}

/// Sorts `matches` into descending match quality. When `limit` is nonzero
/// and smaller than the input, only the top `limit` entries are selected
/// and sorted; the rest are discarded.
pub fn sort_limit<I: Item>(matches: &mut Vec<Matched<I>>, limit: usize) {
    if limit > 0 && limit < matches.len() {
        matches.select_nth_unstable_by(limit - 1, |a, b| b.cmp(a));
        matches.truncate(limit);
    }
    matches.sort_unstable_by(|a, b| b.cmp(a));
}
