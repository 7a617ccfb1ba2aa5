//! Type filtering of candidate items.
//!
//! The turbo path keeps only the candidates the active filters accept for the
//! remembered type. [`ExtensionFilter`] is the bundled implementation; it
//! matches regular expressions against the file name of each URL.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, instrument};
use url::Url;

use crate::queue::{CandidateItem, ItemKind};

/// Default patterns applied to link candidates: archives, software, documents.
pub const DEFAULT_LINK_PATTERNS: &[&str] = &[
    r"(?i)\.(?:z(?:ip|[0-9]{2})|r(?:ar|[0-9]{2})|jar|bz2|gz|tar|tgz|rpm|7z(?:ip)?|lzma|xz|zst)$",
    r"(?i)\.(?:exe|msi|dmg|pkg|bin|iso|deb|appimage|apk|xpi)$",
    r"(?i)\.(?:pdf|docx?|xlsx?|pptx?|odt|ods|odp|rtf|txt|epub|csv)$",
];

/// Default patterns applied to media candidates: images, audio, video.
pub const DEFAULT_MEDIA_PATTERNS: &[&str] = &[
    r"(?i)\.(?:jp(?:e?g|e|2)|gif|png|tiff?|bmp|ico|webp|svg|avif)$",
    r"(?i)\.(?:mp3|ogg|opus|flac|wav|m4a|aac|wma)$",
    r"(?i)\.(?:mpe?g|mp4|mkv|webm|avi|mov|wmv|flv|m4v|3gp)$",
];

#[allow(clippy::expect_used)]
static DEFAULT_FILTER: LazyLock<ExtensionFilter> = LazyLock::new(|| {
    ExtensionFilter::with_patterns(DEFAULT_LINK_PATTERNS, DEFAULT_MEDIA_PATTERNS)
        .expect("default filter patterns are valid") // Static patterns, safe to panic
});

/// Classification contract consumed by the turbo path.
#[async_trait]
pub trait TypeFilter: Send + Sync {
    /// Returns the candidates accepted for `kind`, in input order.
    async fn filter_items_by_type(&self, items: &[CandidateItem], kind: ItemKind)
    -> Vec<CandidateItem>;
}

/// Filter matching file-name patterns per item kind.
#[derive(Debug, Clone)]
pub struct ExtensionFilter {
    link: Vec<Regex>,
    media: Vec<Regex>,
}

impl Default for ExtensionFilter {
    fn default() -> Self {
        DEFAULT_FILTER.clone()
    }
}

impl ExtensionFilter {
    /// Builds a filter from user patterns.
    ///
    /// # Errors
    ///
    /// Returns [`regex::Error`] for the first pattern that does not compile.
    pub fn with_patterns(link: &[&str], media: &[&str]) -> Result<Self, regex::Error> {
        Ok(Self {
            link: compile(link)?,
            media: compile(media)?,
        })
    }

    /// True if `item` is accepted for `kind`.
    #[must_use]
    pub fn matches(&self, item: &CandidateItem, kind: ItemKind) -> bool {
        let patterns = match kind {
            ItemKind::Link => &self.link,
            ItemKind::Media => &self.media,
        };
        let name = file_name(&item.url);
        patterns.iter().any(|pattern| pattern.is_match(&name))
    }
}

fn compile(patterns: &[&str]) -> Result<Vec<Regex>, regex::Error> {
    patterns.iter().map(|p| Regex::new(p)).collect()
}

/// Last path segment of `raw`, ignoring query and fragment.
fn file_name(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back().map(str::to_string))
            .unwrap_or_default(),
        Err(_) => raw
            .split(|c: char| c == '?' || c == '#')
            .next()
            .and_then(|path| path.rsplit('/').next())
            .unwrap_or_default()
            .to_string(),
    }
}

#[async_trait]
impl TypeFilter for ExtensionFilter {
    #[instrument(skip(self, items), fields(items = items.len(), kind = %kind))]
    async fn filter_items_by_type(
        &self,
        items: &[CandidateItem],
        kind: ItemKind,
    ) -> Vec<CandidateItem> {
        let accepted: Vec<CandidateItem> = items
            .iter()
            .filter(|item| self.matches(item, kind))
            .cloned()
            .collect();
        debug!(accepted = accepted.len(), "type filter applied");
        accepted
    }
}
