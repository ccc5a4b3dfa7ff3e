//! pare is a fuzzy path matcher: given a query and a stream of candidate
//! items (typically file paths), it returns the top-K items ranked by how
//! well each matches the query, with optional per-match metadata.
//!
//! The ranking is tuned for source trees: the rightmost path component
//! dominates, matches at word prefixes beat matches inside words, and
//! paths near the currently open file rank above unrelated ones.
//!
//! # Example
//!
//! ```
//! use pare::{for_each_match, IterSource, OptionsBuilder};
//!
//! let items = vec!["src/main.rs", "src/matcher.rs", "README.md"];
//! let source = IterSource::new(items);
//! let opts = OptionsBuilder::default().limit(10).build().unwrap();
//!
//! let mut winners = Vec::new();
//! for_each_match(b"mat", &opts, &source, |item: &str, _info| {
//!     winners.push(item);
//! })
//! .unwrap();
//! assert_eq!(winners[0], "src/matcher.rs");
//! ```

#[macro_use]
extern crate log;

use derive_builder::Builder;

mod driver;
pub mod item;
pub mod matcher;
pub mod mode;
pub mod path;
pub mod score;
pub mod source;
pub mod strings;

pub use crate::driver::for_each_match;
pub use crate::item::{Item, Matched};
pub use crate::matcher::{MatchInfo, Matcher, MatcherOptions, QueryPathMode};
pub use crate::mode::{MatchMode, ModedItem};
pub use crate::score::{PrefixLevel, Score};
pub use crate::source::{IterSource, LineSource, Source};

/// Errors surfaced by the matching pipeline.
///
/// Malformed input bytes are never an error: the decoder substitutes them
/// and matching proceeds.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An option failed validation at the call boundary; no work was done.
    #[error("invalid option: {0}")]
    InvalidOption(String),
    /// A worker thread panicked while matching.
    #[error("worker thread failed: {0}")]
    Worker(String),
    /// The item source reported a failure.
    #[error("item source failed: {0}")]
    Source(String),
    /// An internal invariant was violated; this is a bug.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Options for one `for_each_match` invocation.
#[derive(Debug, Clone, Builder)]
#[builder(default)]
pub struct Options {
    /// The currently open file; empty for none.
    pub crfile: Vec<u8>,
    /// Maximum number of matches to return; 0 for unlimited.
    pub limit: usize,
    /// Allow the currently open file itself to match.
    pub match_crfile: bool,
    /// Number of worker threads; must be at least 1.
    pub nr_threads: usize,
    /// Treat the query and all items as paths.
    pub path: bool,
    /// Decode the query and all items as UTF-8 instead of raw bytes.
    pub unicode: bool,
    /// Pass match positions and score breakdowns to the sink.
    pub want_match_info: bool,
    /// How query path separators constrain component matches.
    pub query_path_mode: QueryPathMode,
    /// Single-byte delimiter; query parts around it are re-joined in
    /// reverse order before matching. Empty disables inversion.
    pub query_inverting_delimiter: Vec<u8>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            crfile: Vec::new(),
            limit: 0,
            match_crfile: false,
            nr_threads: 1,
            path: true,
            unicode: false,
            want_match_info: false,
            query_path_mode: QueryPathMode::default(),
            query_inverting_delimiter: Vec::new(),
        }
    }
}
