//! "Current selection" stacks for mask, subfolder, server and fast filter.
//!
//! Each dimension remembers its recently used values, most recent first. The
//! front value is the one applied when a queuing call does not name one
//! explicitly. Stacks live in a [`SelectionState`] that is passed to the
//! engine rather than held globally.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::prefs::{Prefs, PrefsError};

/// Maximum number of remembered values per stack.
pub const DEFAULT_STACK_LIMIT: usize = 15;

/// Built-in renaming masks offered before the user picked any.
pub const DEFAULT_MASKS: &[&str] = &[
    "*name*.*ext*",
    "*num*_*name*.*ext*",
    "*url*-*name*.*ext*",
    "*name* (*text*).*ext*",
    "*name* (*hh*-*mm*).*ext*",
];

/// Errors raised by selection stacks.
#[derive(Debug, Error)]
pub enum SelectionError {
    /// A stack was read or pushed before `init()`.
    #[error("selection stack '{0}' used before init()")]
    NotInitialized(&'static str),

    /// Loading or persisting the stack failed.
    #[error(transparent)]
    Prefs(#[from] PrefsError),
}

/// A configuration dimension with a "currently active" value.
#[async_trait]
pub trait SelectionStack: Send + Sync {
    /// Loads persisted state. Safe to call repeatedly.
    async fn init(&self) -> Result<(), SelectionError>;

    /// The active value.
    async fn current(&self) -> Result<String, SelectionError>;

    /// Makes `value` the active value.
    async fn push(&self, value: &str) -> Result<(), SelectionError>;
}

/// Bounded most-recent-first list persisted under `recent-<name>`.
#[derive(Debug)]
pub struct RecentList {
    name: &'static str,
    defaults: Vec<String>,
    limit: usize,
    prefs: Prefs,
    values: Mutex<Option<Vec<String>>>,
}

impl RecentList {
    /// Creates an uninitialized list. `defaults` seed it when nothing was persisted.
    #[must_use]
    pub fn new(name: &'static str, defaults: &[&str], limit: usize, prefs: Prefs) -> Self {
        let mut defaults: Vec<String> = defaults.iter().map(|v| (*v).to_string()).collect();
        if defaults.is_empty() {
            defaults.push(String::new());
        }
        Self {
            name,
            defaults,
            limit: limit.max(1),
            prefs,
            values: Mutex::new(None),
        }
    }

    /// Preference key the list is stored under.
    #[must_use]
    pub fn pref_key(&self) -> String {
        format!("recent-{}", self.name)
    }

    /// Snapshot of the remembered values, `None` before `init()`.
    pub async fn values(&self) -> Option<Vec<String>> {
        self.values.lock().await.clone()
    }
}

#[async_trait]
impl SelectionStack for RecentList {
    #[instrument(skip(self), fields(stack = self.name))]
    async fn init(&self) -> Result<(), SelectionError> {
        let mut values = self.values.lock().await;
        if values.is_some() {
            return Ok(());
        }
        let stored: Option<Vec<String>> = self.prefs.get_opt(&self.pref_key()).await?;
        let loaded = match stored {
            Some(mut list) if !list.is_empty() => {
                list.truncate(self.limit);
                list
            }
            _ => self.defaults.clone(),
        };
        debug!(count = loaded.len(), "selection stack loaded");
        *values = Some(loaded);
        Ok(())
    }

    async fn current(&self) -> Result<String, SelectionError> {
        let values = self.values.lock().await;
        let values = values
            .as_ref()
            .ok_or(SelectionError::NotInitialized(self.name))?;
        Ok(values.first().cloned().unwrap_or_default())
    }

    #[instrument(skip(self), fields(stack = self.name))]
    async fn push(&self, value: &str) -> Result<(), SelectionError> {
        let mut guard = self.values.lock().await;
        let values = guard
            .as_mut()
            .ok_or(SelectionError::NotInitialized(self.name))?;
        values.retain(|existing| existing != value);
        values.insert(0, value.to_string());
        values.truncate(self.limit);
        self.prefs.set(&self.pref_key(), &*values).await?;
        Ok(())
    }
}

/// The four selection stacks consulted when resolving queue options.
#[derive(Clone)]
pub struct SelectionState {
    mask: Arc<dyn SelectionStack>,
    subfolder: Arc<dyn SelectionStack>,
    server: Arc<dyn SelectionStack>,
    fast_filter: Arc<dyn SelectionStack>,
}

impl std::fmt::Debug for SelectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionState").finish_non_exhaustive()
    }
}

impl SelectionState {
    /// Builds the standard recent-value stacks on top of `prefs`.
    #[must_use]
    pub fn recent(prefs: &Prefs, limit: usize) -> Self {
        Self {
            mask: Arc::new(RecentList::new("mask", DEFAULT_MASKS, limit, prefs.clone())),
            subfolder: Arc::new(RecentList::new("subfolder", &[""], limit, prefs.clone())),
            server: Arc::new(RecentList::new("server", &[""], limit, prefs.clone())),
            fast_filter: Arc::new(RecentList::new("fastfilter", &[""], limit, prefs.clone())),
        }
    }

    /// Uses caller-provided stacks.
    #[must_use]
    pub fn from_stacks(
        mask: Arc<dyn SelectionStack>,
        subfolder: Arc<dyn SelectionStack>,
        server: Arc<dyn SelectionStack>,
        fast_filter: Arc<dyn SelectionStack>,
    ) -> Self {
        Self {
            mask,
            subfolder,
            server,
            fast_filter,
        }
    }

    #[must_use]
    pub fn mask(&self) -> &dyn SelectionStack {
        self.mask.as_ref()
    }

    #[must_use]
    pub fn subfolder(&self) -> &dyn SelectionStack {
        self.subfolder.as_ref()
    }

    #[must_use]
    pub fn server(&self) -> &dyn SelectionStack {
        self.server.as_ref()
    }

    #[must_use]
    pub fn fast_filter(&self) -> &dyn SelectionStack {
        self.fast_filter.as_ref()
    }
}
