//! Turns free text into candidate items.
//!
//! Every URL in the input becomes one [`CandidateItem`] of the requested
//! kind. URLs that fail validation are reported in
//! [`ParseResult::invalid`]; non-empty lines without any URL land in
//! [`ParseResult::skipped`].
//!
//! # Example
//!
//! ```
//! use batchq_core::parser::parse_candidates;
//! use batchq_core::ItemKind;
//!
//! let result = parse_candidates("Mirror: https://example.com/disk.iso", ItemKind::Link);
//! assert_eq!(result.len(), 1);
//! assert_eq!(result.items[0].url, "https://example.com/disk.iso");
//! ```

mod error;
mod url;

pub use error::{MAX_URL_LENGTH, ParseError, SUPPORTED_SCHEMES};

use tracing::{debug, instrument};

use crate::queue::{CandidateItem, ItemKind};

/// Outcome of parsing one input text.
#[derive(Debug, Default)]
pub struct ParseResult {
    pub items: Vec<CandidateItem>,
    /// Non-empty lines without a URL.
    pub skipped: Vec<String>,
    pub invalid: Vec<ParseError>,
}

impl ParseResult {
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Extracts candidates of `kind` from `input`, one per URL, in input order.
#[instrument(skip(input), fields(input_len = input.len(), kind = %kind))]
#[must_use]
pub fn parse_candidates(input: &str, kind: ItemKind) -> ParseResult {
    let mut result = ParseResult::default();
    for line in input.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let found = self::url::find_urls(line);
        if found.is_empty() {
            result.skipped.push(line.to_string());
            continue;
        }
        for outcome in found {
            match outcome {
                Ok(url) => result.items.push(candidate(url, kind)),
                Err(err) => result.invalid.push(err),
            }
        }
    }
    debug!(
        items = result.items.len(),
        skipped = result.skipped.len(),
        invalid = result.invalid.len(),
        "input parsed"
    );
    result
}

fn candidate(url: String, kind: ItemKind) -> CandidateItem {
    match kind {
        ItemKind::Link => CandidateItem::link(url),
        ItemKind::Media => CandidateItem::media(url),
    }
}
