//! Candidate and queue record types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use url::Url;

use crate::resolve::ResolvedOptions;

/// Type tag used by the type filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// A plain link found on a page.
    #[default]
    Link,
    /// An embedded media resource (image, audio, video).
    Media,
}

impl ItemKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Link => "link",
            Self::Media => "media",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ItemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "link" => Ok(Self::Link),
            "media" => Ok(Self::Media),
            _ => Err(format!("invalid item kind: {s}")),
        }
    }
}

/// A downloadable reference discovered upstream.
///
/// The core only looks at `kind` (for filtering) and `url` (for dedup
/// identity); everything else is carried through to the queue record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateItem {
    pub url: String,
    #[serde(default)]
    pub kind: ItemKind,
    #[serde(default)]
    pub referrer: Option<String>,
    #[serde(default)]
    pub usable_referrer: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub post_data: Option<String>,
    /// Caller-supplied sequence index. Always discarded when queuing.
    #[serde(default)]
    pub idx: Option<u32>,
}

impl CandidateItem {
    /// Creates a link candidate for `url`.
    #[must_use]
    pub fn link(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind: ItemKind::Link,
            ..Self::default()
        }
    }

    /// Creates a media candidate for `url`.
    #[must_use]
    pub fn media(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind: ItemKind::Media,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_referrer(mut self, referrer: impl Into<String>) -> Self {
        let referrer = referrer.into();
        self.usable_referrer = Some(referrer.clone());
        self.referrer = Some(referrer);
        self
    }

    /// Key used to detect duplicates: the URL without its fragment.
    ///
    /// Unparseable URLs compare by their trimmed text.
    #[must_use]
    pub fn identity(&self) -> String {
        match Url::parse(self.url.trim()) {
            Ok(mut parsed) => {
                parsed.set_fragment(None);
                parsed.to_string()
            }
            Err(_) => self.url.trim().to_string(),
        }
    }
}

/// A queue record before its batch id is known.
///
/// Building records is two-phase: drafts are created for every candidate, then
/// one batch id is allocated and stamped into all of them.
#[derive(Debug, Clone)]
pub struct RecordDraft {
    idx: u32,
    item: CandidateItem,
    resolved: ResolvedOptions,
    start_date: DateTime<Utc>,
    date: i64,
}

impl RecordDraft {
    /// Builds the draft for the candidate at 1-based position `idx`.
    ///
    /// Any caller-supplied index on `item` is dropped.
    #[must_use]
    pub fn new(
        mut item: CandidateItem,
        idx: u32,
        resolved: &ResolvedOptions,
        now: DateTime<Utc>,
    ) -> Self {
        item.idx = None;
        let start_date = item.start_date.unwrap_or(now);
        Self {
            idx,
            item,
            resolved: resolved.clone(),
            start_date,
            date: now.timestamp_millis(),
        }
    }

    /// Finalizes the draft with the shared batch id.
    #[must_use]
    pub fn stamp(self, batch: u32) -> QueueRecord {
        let CandidateItem {
            url,
            referrer,
            usable_referrer,
            file_name,
            title,
            description,
            private,
            post_data,
            ..
        } = self.item;
        QueueRecord {
            idx: self.idx,
            batch,
            url,
            referrer,
            usable_referrer,
            file_name,
            title: title.unwrap_or_default(),
            description: description.unwrap_or_default(),
            start_date: self.start_date,
            private,
            post_data,
            mask: self.resolved.mask,
            subfolder: self.resolved.subfolder,
            server: self.resolved.server,
            date: self.date,
            paused: self.resolved.paused,
            cookies: self.resolved.cookies,
        }
    }
}

/// The finalized, immutable unit handed to the download manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueRecord {
    idx: u32,
    batch: u32,
    url: String,
    referrer: Option<String>,
    usable_referrer: Option<String>,
    file_name: Option<String>,
    title: String,
    description: String,
    start_date: DateTime<Utc>,
    private: bool,
    post_data: Option<String>,
    mask: String,
    subfolder: String,
    server: String,
    date: i64,
    paused: bool,
    cookies: bool,
}

impl QueueRecord {
    /// 1-based position within the queuing call.
    #[must_use]
    pub fn idx(&self) -> u32 {
        self.idx
    }

    /// Batch id shared by every record of the call.
    #[must_use]
    pub fn batch(&self) -> u32 {
        self.batch
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn referrer(&self) -> Option<&str> {
        self.referrer.as_deref()
    }

    #[must_use]
    pub fn usable_referrer(&self) -> Option<&str> {
        self.usable_referrer.as_deref()
    }

    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn start_date(&self) -> DateTime<Utc> {
        self.start_date
    }

    #[must_use]
    pub fn private(&self) -> bool {
        self.private
    }

    #[must_use]
    pub fn post_data(&self) -> Option<&str> {
        self.post_data.as_deref()
    }

    #[must_use]
    pub fn mask(&self) -> &str {
        &self.mask
    }

    #[must_use]
    pub fn subfolder(&self) -> &str {
        &self.subfolder
    }

    #[must_use]
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Creation time in milliseconds since the Unix epoch.
    #[must_use]
    pub fn date(&self) -> i64 {
        self.date
    }

    #[must_use]
    pub fn paused(&self) -> bool {
        self.paused
    }

    #[must_use]
    pub fn cookies(&self) -> bool {
        self.cookies
    }
}

impl fmt::Display for QueueRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "QueueRecord {{ batch: {}, idx: {}, url: {} }}",
            self.batch, self.idx, self.url
        )
    }
}

/// A queue record as persisted by [`super::DownloadQueue`].
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StoredDownload {
    pub id: i64,
    pub batch: i64,
    pub idx: i64,
    pub url: String,
    pub referrer: Option<String>,
    pub usable_referrer: Option<String>,
    pub file_name: Option<String>,
    pub title: String,
    pub description: String,
    /// RFC 3339 text; see [`StoredDownload::parsed_start_date`].
    pub start_date: String,
    pub private: bool,
    pub post_data: Option<String>,
    pub mask: String,
    pub subfolder: String,
    pub server: String,
    pub date: i64,
    pub paused: bool,
    pub cookies: bool,
    pub created_at: String,
}

impl StoredDownload {
    /// Parses the stored start date, `None` if the column was tampered with.
    #[must_use]
    pub fn parsed_start_date(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.start_date)
            .ok()
            .map(|date| date.with_timezone(&Utc))
    }
}
