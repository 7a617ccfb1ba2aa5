//! Recording collaborators for engine tests.
//!
//! Each double records its calls behind a `std::sync::Mutex` so tests can
//! assert on what the engine asked for.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use batchq_core::{
    CandidateItem, Collaborators, ItemKind, Manager, ManagerWindow, MemoryPrefs, Notice, Notifier,
    Prefs, QueueEngine, QueueError, QueueRecord, SelectError, Selection, SelectionOptions,
    SelectionState, Selector, TypeFilter, DEFAULT_STACK_LIMIT,
};
use serde_json::Value;

/// Manager that keeps every hand-off, or fails every one.
#[derive(Default)]
pub struct RecordingManager {
    pub handoffs: Mutex<Vec<Vec<QueueRecord>>>,
    pub fail: bool,
}

impl RecordingManager {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn handoffs(&self) -> Vec<Vec<QueueRecord>> {
        self.handoffs.lock().expect("manager lock").clone()
    }
}

#[async_trait]
impl Manager for RecordingManager {
    async fn add_new_downloads(&self, records: &[QueueRecord]) -> Result<(), QueueError> {
        if self.fail {
            return Err(QueueError::Unavailable("manager offline".to_string()));
        }
        self.handoffs
            .lock()
            .expect("manager lock")
            .push(records.to_vec());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().expect("notifier lock").clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().expect("notifier lock").push(notice);
    }
}

/// Selector that records what it was offered and answers with fixed options.
///
/// `select` keeps every offered item unless `items` is set.
#[derive(Default)]
pub struct RecordingSelector {
    pub options: SelectionOptions,
    pub items: Option<Vec<CandidateItem>>,
    pub offered: Mutex<Vec<(Vec<String>, Vec<String>)>>,
    pub singles: Mutex<Vec<Option<String>>>,
}

impl RecordingSelector {
    pub fn answering(options: SelectionOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn offered(&self) -> Vec<(Vec<String>, Vec<String>)> {
        self.offered.lock().expect("selector lock").clone()
    }

    pub fn singles(&self) -> Vec<Option<String>> {
        self.singles.lock().expect("selector lock").clone()
    }
}

fn urls(items: &[CandidateItem]) -> Vec<String> {
    items.iter().map(|item| item.url.clone()).collect()
}

#[async_trait]
impl Selector for RecordingSelector {
    async fn select(
        &self,
        links: &[CandidateItem],
        media: &[CandidateItem],
    ) -> Result<Selection, SelectError> {
        self.offered
            .lock()
            .expect("selector lock")
            .push((urls(links), urls(media)));
        let items = self
            .items
            .clone()
            .unwrap_or_else(|| links.iter().chain(media).cloned().collect());
        Ok(Selection {
            items,
            options: self.options.clone(),
        })
    }

    async fn single(&self, item: Option<&CandidateItem>) -> Result<Selection, SelectError> {
        self.singles
            .lock()
            .expect("selector lock")
            .push(item.map(|i| i.url.clone()));
        let item = item
            .cloned()
            .unwrap_or_else(|| CandidateItem::link("https://example.com/blank"));
        Ok(Selection {
            items: vec![item],
            options: self.options.clone(),
        })
    }
}

/// Filter that accepts items whose URL contains `needle`, recording each call.
pub struct RecordingFilter {
    pub needle: String,
    pub calls: Mutex<Vec<(Vec<String>, ItemKind)>>,
}

impl RecordingFilter {
    pub fn accepting(needle: &str) -> Self {
        Self {
            needle: needle.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(Vec<String>, ItemKind)> {
        self.calls.lock().expect("filter lock").clone()
    }
}

#[async_trait]
impl TypeFilter for RecordingFilter {
    async fn filter_items_by_type(
        &self,
        items: &[CandidateItem],
        kind: ItemKind,
    ) -> Vec<CandidateItem> {
        self.calls
            .lock()
            .expect("filter lock")
            .push((urls(items), kind));
        items
            .iter()
            .filter(|item| item.url.contains(&self.needle))
            .cloned()
            .collect()
    }
}

#[derive(Default)]
pub struct RecordingWindow {
    pub opened: AtomicUsize,
}

#[async_trait]
impl ManagerWindow for RecordingWindow {
    async fn open_manager(&self, _focus: bool) -> Result<(), QueueError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// An engine wired to recording doubles over an in-memory preference store.
pub struct Harness {
    pub store: Arc<MemoryPrefs>,
    pub prefs: Prefs,
    pub selection: SelectionState,
    pub manager: Arc<RecordingManager>,
    pub notifier: Arc<RecordingNotifier>,
    pub selector: Arc<RecordingSelector>,
    pub filter: Arc<RecordingFilter>,
    pub window: Arc<RecordingWindow>,
    pub engine: QueueEngine,
}

impl Harness {
    pub fn new(prefs: &[(&str, Value)]) -> Self {
        Self::with(
            prefs,
            RecordingSelector::default(),
            RecordingFilter::accepting(""),
            RecordingManager::default(),
        )
    }

    pub fn with(
        prefs: &[(&str, Value)],
        selector: RecordingSelector,
        filter: RecordingFilter,
        manager: RecordingManager,
    ) -> Self {
        let store = Arc::new(MemoryPrefs::with_entries(
            prefs
                .iter()
                .map(|(key, value)| ((*key).to_string(), value.clone())),
        ));
        let prefs = Prefs::new(store.clone());
        let selection = SelectionState::recent(&prefs, DEFAULT_STACK_LIMIT);
        let manager = Arc::new(manager);
        let notifier = Arc::new(RecordingNotifier::default());
        let selector = Arc::new(selector);
        let filter = Arc::new(filter);
        let window = Arc::new(RecordingWindow::default());

        let engine = QueueEngine::new(
            prefs.clone(),
            selection.clone(),
            Collaborators {
                filter: filter.clone(),
                selector: selector.clone(),
                manager: manager.clone(),
                notifier: notifier.clone(),
                window: Some(window.clone()),
            },
        );

        Self {
            store,
            prefs,
            selection,
            manager,
            notifier,
            selector,
            filter,
            window,
            engine,
        }
    }

    /// Every record handed to the manager, across calls.
    pub fn records(&self) -> Vec<QueueRecord> {
        self.manager.handoffs().into_iter().flatten().collect()
    }
}

pub fn links(urls: &[&str]) -> Vec<CandidateItem> {
    urls.iter().map(|url| CandidateItem::link(*url)).collect()
}

pub fn media(urls: &[&str]) -> Vec<CandidateItem> {
    urls.iter().map(|url| CandidateItem::media(*url)).collect()
}
