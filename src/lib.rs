//! Batch queuing core.
//!
//! This library decides which candidate downloads get queued, with which
//! options, and under which batch number. Candidates arrive as two sets,
//! links and media, and reach the download manager through one of two
//! pathways: turbo (filtered, no interaction) or regular (user selection).
//!
//! # Architecture
//!
//! - [`batch`] - Batch number allocation and persistence
//! - [`resolve`] - Merging per-call options with the current selections
//! - [`selection`] - Stacks of recently used mask, subfolder, server and fast filter
//! - [`gate`] - Sanity check and deduplication
//! - [`engine`] - The turbo and regular pathways and the queue operation
//! - [`prefs`] - Preference storage
//! - [`queue`] - Records, the manager contract and the SQLite-backed manager
//! - [`filter`], [`select`], [`notify`] - Collaborator contracts with bundled implementations
//! - [`parser`] - Extracting candidates from free text
//! - [`db`] - Database connection and schema management

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod batch;
pub mod db;
pub mod engine;
pub mod filter;
pub mod gate;
pub mod notify;
pub mod parser;
pub mod prefs;
pub mod queue;
pub mod resolve;
pub mod select;
pub mod selection;

// Re-export commonly used types
pub use batch::{BatchCounter, MAX_BATCH, next_batch};
pub use db::{Database, DbError, DbErrorKind};
pub use engine::{
    Collaborators, EngineError, OPEN_MANAGER_ON_QUEUE_ENABLED, Outcome, QueueEngine, QueueSummary,
    TurboState,
};
pub use filter::{ExtensionFilter, TypeFilter};
pub use gate::{make_unique, sanity};
pub use notify::{Message, Notice, Notifier, TracingNotifier};
pub use parser::{ParseError, ParseResult, parse_candidates};
pub use prefs::{LastType, MemoryPrefs, PrefDefaults, PrefStore, Prefs, PrefsError, SqlitePrefs};
pub use queue::{
    CandidateItem, DownloadQueue, ItemKind, Manager, ManagerWindow, QueueError, QueueRecord,
    RecordDraft, StoredDownload,
};
pub use resolve::{QueueOptions, ResolvedOptions, SelectionOptions, remember, resolve};
pub use select::{PresetSelector, SelectError, Selection, Selector};
pub use selection::{
    DEFAULT_STACK_LIMIT, RecentList, SelectionError, SelectionStack, SelectionState,
};
