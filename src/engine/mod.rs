//! Admission engine: turns candidate sets into queued download batches.
//!
//! # Overview
//!
//! Two pathways lead to the same queue operation:
//!
//! - **turbo** ([`QueueEngine::turbo`]): no interaction; candidates of the
//!   remembered type are filtered, deduplicated and queued. When nothing
//!   survives the filter the engine moves on to the regular pathway.
//! - **regular** ([`QueueEngine::regular`]): the [`Selector`] lets the user
//!   pick items and options; the choices become the new current selections.
//!
//! The queue operation resolves options, builds one record per item with a
//! shared batch id, persists the batch counter and hands the records to the
//! [`Manager`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use batchq_core::{
//!     CandidateItem, Collaborators, Database, DownloadQueue, ExtensionFilter, Prefs,
//!     PresetSelector, QueueEngine, SelectionState, SqlitePrefs, TracingNotifier,
//! };
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new(Path::new("batchq.db")).await?;
//! let prefs = Prefs::new(Arc::new(SqlitePrefs::new(db.clone())));
//! let selection = SelectionState::recent(&prefs, 15);
//! let engine = QueueEngine::new(
//!     prefs,
//!     selection,
//!     Collaborators {
//!         filter: Arc::new(ExtensionFilter::default()),
//!         selector: Arc::new(PresetSelector::default()),
//!         manager: Arc::new(DownloadQueue::new(db)),
//!         notifier: Arc::new(TracingNotifier),
//!         window: None,
//!     },
//! );
//! let links = vec![CandidateItem::link("https://example.com/file.zip")];
//! let outcome = engine.turbo(links, Vec::new()).await?;
//! println!("queued: {}", outcome.is_queued());
//! # Ok(())
//! # }
//! ```

mod turbo;

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::batch::BatchCounter;
use crate::filter::TypeFilter;
use crate::gate::sanity;
use crate::notify::{Notice, Notifier};
use crate::prefs::{Prefs, PrefsError};
use crate::queue::{CandidateItem, Manager, ManagerWindow, QueueError, QueueRecord, RecordDraft};
use crate::resolve::{QueueOptions, ResolvedOptions, remember, resolve};
use crate::select::{SelectError, Selection, Selector};
use crate::selection::{SelectionError, SelectionState};

pub use turbo::TurboState;

/// Whether queuing should surface the manager window.
///
/// The `open-manager-on-queue` preference is read and logged, but this guard
/// keeps it from ever opening the window.
pub const OPEN_MANAGER_ON_QUEUE_ENABLED: bool = false;

/// Error type for engine operations.
///
/// An empty candidate set is not an error; it yields [`Outcome::Rejected`].
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Preference store failed.
    #[error("preference error: {0}")]
    Prefs(#[from] PrefsError),

    /// A selection stack failed.
    #[error("selection state error: {0}")]
    Selection(#[from] SelectionError),

    /// The interactive selector failed or was dismissed.
    #[error("selector error: {0}")]
    Select(#[from] SelectError),

    /// The manager rejected the hand-off.
    #[error("manager error: {0}")]
    Manager(#[from] QueueError),
}

/// External collaborators the engine delegates to.
#[derive(Clone)]
pub struct Collaborators {
    pub filter: Arc<dyn TypeFilter>,
    pub selector: Arc<dyn Selector>,
    pub manager: Arc<dyn Manager>,
    pub notifier: Arc<dyn Notifier>,
    /// Never invoked while [`OPEN_MANAGER_ON_QUEUE_ENABLED`] is false.
    pub window: Option<Arc<dyn ManagerWindow>>,
}

/// What a queue operation produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueSummary {
    /// Number of records handed to the manager.
    pub count: usize,
    /// Shared batch id, `None` when no record was built.
    pub batch: Option<u32>,
    pub resolved: ResolvedOptions,
}

/// Result of an admission attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// Both candidate sets were empty.
    Rejected,
    /// Records were handed to the manager.
    Queued(QueueSummary),
}

impl Outcome {
    #[must_use]
    pub fn is_queued(&self) -> bool {
        matches!(self, Self::Queued(_))
    }

    #[must_use]
    pub fn summary(&self) -> Option<&QueueSummary> {
        match self {
            Self::Queued(summary) => Some(summary),
            Self::Rejected => None,
        }
    }
}

/// Admission engine over a preference store, selection state and collaborators.
#[derive(Clone)]
pub struct QueueEngine {
    prefs: Prefs,
    selection: SelectionState,
    collaborators: Collaborators,
}

impl std::fmt::Debug for QueueEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueEngine")
            .field("prefs", &self.prefs)
            .finish_non_exhaustive()
    }
}

impl QueueEngine {
    #[must_use]
    pub fn new(prefs: Prefs, selection: SelectionState, collaborators: Collaborators) -> Self {
        Self {
            prefs,
            selection,
            collaborators,
        }
    }

    #[must_use]
    pub fn prefs(&self) -> &Prefs {
        &self.prefs
    }

    #[must_use]
    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Queues `items` with `options`.
    ///
    /// Caller-supplied indices are discarded; records are numbered from 1 in
    /// input order and share one batch id. The batch counter is advanced and
    /// persisted only when at least one record is built. The manager receives
    /// the record sequence even when it is empty.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] if option resolution, the preference store or
    /// the manager fails.
    #[instrument(skip(self, items, options), fields(items = items.len()))]
    pub async fn queue(
        &self,
        items: Vec<CandidateItem>,
        options: &QueueOptions,
    ) -> Result<QueueSummary, EngineError> {
        let resolved = resolve(options, &self.selection).await?;
        let mut counter = BatchCounter::load(&self.prefs).await?;
        let now = Utc::now();

        let drafts: Vec<RecordDraft> = items
            .into_iter()
            .zip(1u32..)
            .map(|(item, idx)| RecordDraft::new(item, idx, &resolved, now))
            .collect();

        let records: Vec<QueueRecord> = if drafts.is_empty() {
            Vec::new()
        } else {
            let batch = counter.allocate();
            drafts.into_iter().map(|draft| draft.stamp(batch)).collect()
        };

        counter.persist(&self.prefs).await?;

        self.collaborators
            .manager
            .add_new_downloads(&records)
            .await?;
        info!(
            count = records.len(),
            batch = counter.assigned(),
            "downloads queued"
        );

        if self.prefs.queue_notification().await?
            && let Some(notice) = Notice::queued(records.len())
        {
            self.collaborators.notifier.notify(notice);
        }

        self.maybe_open_manager().await?;

        Ok(QueueSummary {
            count: records.len(),
            batch: counter.assigned(),
            resolved,
        })
    }

    /// The preference is not read while the feature is switched off.
    async fn maybe_open_manager(&self) -> Result<(), EngineError> {
        if !OPEN_MANAGER_ON_QUEUE_ENABLED {
            return Ok(());
        }
        let requested = match self.prefs.open_manager_on_queue().await {
            Ok(requested) => requested,
            Err(error) => {
                warn!(%error, "ignoring unreadable open-manager-on-queue");
                false
            }
        };
        if requested && let Some(window) = &self.collaborators.window {
            window.open_manager(false).await?;
        }
        Ok(())
    }

    /// Regular pathway: sanity check, interactive selection, queue.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] if the selector, selection state, preference
    /// store or manager fails.
    #[instrument(skip_all, fields(links = links.len(), media = media.len()))]
    pub async fn regular(
        &self,
        links: Vec<CandidateItem>,
        media: Vec<CandidateItem>,
    ) -> Result<Outcome, EngineError> {
        if !sanity(&links, &media, self.collaborators.notifier.as_ref()) {
            return Ok(Outcome::Rejected);
        }
        self.select_and_queue(&links, &media).await
    }

    /// Regular pathway after the sanity check passed.
    async fn select_and_queue(
        &self,
        links: &[CandidateItem],
        media: &[CandidateItem],
    ) -> Result<Outcome, EngineError> {
        let selection = self.collaborators.selector.select(links, media).await?;
        self.finish_regular(selection).await
    }

    /// Resolve-and-stack, record the chosen type, queue.
    async fn finish_regular(&self, selection: Selection) -> Result<Outcome, EngineError> {
        let Selection { items, options } = selection;
        remember(&options, &self.selection).await?;
        if let Some(last_type) = options.last_type() {
            self.prefs.set_last_type(last_type).await?;
        }
        let summary = self.queue(items, &options.queue).await?;
        Ok(Outcome::Queued(summary))
    }

    /// Queues exactly one item without filtering, paused per `add-paused`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] if the preference store or manager fails.
    #[instrument(skip_all, fields(url = %item.url))]
    pub async fn single_turbo(&self, item: CandidateItem) -> Result<Outcome, EngineError> {
        let paused = self.prefs.add_paused().await?;
        let summary = self.queue(vec![item], &QueueOptions::paused(paused)).await?;
        Ok(Outcome::Queued(summary))
    }

    /// Lets the user edit one item (or create one when `item` is `None`), then queues it.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] if the selector, selection state, preference
    /// store or manager fails.
    #[instrument(skip_all, fields(blank = item.is_none()))]
    pub async fn single_regular(
        &self,
        item: Option<CandidateItem>,
    ) -> Result<Outcome, EngineError> {
        let selection = self.collaborators.selector.single(item.as_ref()).await?;
        self.finish_regular(selection).await
    }
}
