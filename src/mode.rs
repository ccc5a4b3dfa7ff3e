//! Match-mode wrappers: choose which slice of an item the matcher sees.
//!
//! The wrapped item's `sort_key` and output text are untouched; only the
//! `match_key` is narrowed. Match positions are reported relative to the
//! narrowed key, so [`ModedItem::key_offset`] gives the byte delta to add
//! when highlighting inside the full item.

use crate::item::Item;
use crate::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchMode {
    /// Match against the entire item.
    #[default]
    FullLine,
    /// Match only the filename: from after the last path separator to the
    /// end.
    FilenameOnly,
    /// Match the part before the first tab.
    FirstNonTab,
    /// Match the part after the last tab, if any.
    UntilLastTab,
}

impl MatchMode {
    /// Parses a match-mode name. An empty name selects `FullLine`.
    pub fn parse(name: &str) -> Result<Self, Error> {
        match name {
            "" | "full-line" => Ok(Self::FullLine),
            "filename-only" => Ok(Self::FilenameOnly),
            "first-non-tab" => Ok(Self::FirstNonTab),
            "until-last-tab" => Ok(Self::UntilLastTab),
            _ => Err(Error::InvalidOption(format!("unknown match mode '{name}'"))),
        }
    }

    /// The slice of `item` offered to the matcher.
    pub fn apply<'a>(&self, item: &'a [u8]) -> &'a [u8] {
        let (begin, end) = self.key_span(item);
        &item[begin..end]
    }

    /// Byte offset of the match key within `item`.
    pub fn key_offset(&self, item: &[u8]) -> usize {
        self.key_span(item).0
    }

    fn key_span(&self, item: &[u8]) -> (usize, usize) {
        match self {
            Self::FullLine => (0, item.len()),
            Self::FilenameOnly => {
                let begin = item
                    .iter()
                    .rposition(|&b| b == b'/')
                    .map_or(0, |i| i + 1);
                (begin, item.len())
            }
            Self::FirstNonTab => {
                let end = item.iter().position(|&b| b == b'\t').unwrap_or(item.len());
                (0, end)
            }
            Self::UntilLastTab => {
                let begin = item
                    .iter()
                    .rposition(|&b| b == b'\t')
                    .map_or(0, |i| i + 1);
                (begin, item.len())
            }
        }
    }
}

/// Item wrapper applying a [`MatchMode`] to the inner item's `match_key`.
#[derive(Debug, Clone)]
pub struct ModedItem<I> {
    mode: MatchMode,
    inner: I,
}

impl<I: Item> ModedItem<I> {
    pub fn new(mode: MatchMode, inner: I) -> Self {
        Self { mode, inner }
    }

    pub fn inner(&self) -> &I {
        &self.inner
    }

    pub fn into_inner(self) -> I {
        self.inner
    }

    /// Byte offset to add to reported match positions so they index into
    /// the full item rather than the narrowed key.
    pub fn key_offset(&self) -> usize {
        self.mode.key_offset(self.inner.match_key())
    }
}

impl<I: Item> Item for ModedItem<I> {
    fn match_key(&self) -> &[u8] {
        self.mode.apply(self.inner.match_key())
    }

    fn sort_key(&self) -> &[u8] {
        self.inner.sort_key()
    }
}
