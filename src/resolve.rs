//! Resolution of per-call queue options.
//!
//! Precedence: explicit option, then the current value of the matching
//! selection stack, then the static default (`paused = false`,
//! `cookies = false`). Mask, subfolder and server have no static default.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::prefs::LastType;
use crate::selection::{SelectionError, SelectionState, SelectionStack};

/// Options supplied by the caller of a queuing operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueOptions {
    #[serde(default)]
    pub mask: Option<String>,
    #[serde(default)]
    pub subfolder: Option<String>,
    #[serde(default)]
    pub server: Option<String>,
    #[serde(default)]
    pub paused: Option<bool>,
    #[serde(default)]
    pub cookies: Option<bool>,
}

impl QueueOptions {
    /// Options carrying only a paused flag, as used by turbo queuing.
    #[must_use]
    pub fn paused(paused: bool) -> Self {
        Self {
            paused: Some(paused),
            ..Self::default()
        }
    }
}

/// Options returned by the interactive selector.
///
/// Besides the queue options it carries "once" flags, which keep a value from
/// becoming the new current selection, plus the fast filter and item type the
/// user picked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionOptions {
    #[serde(flatten)]
    pub queue: QueueOptions,
    #[serde(default)]
    pub mask_once: bool,
    #[serde(default)]
    pub subfolder_once: bool,
    #[serde(default)]
    pub server_once: bool,
    #[serde(default)]
    pub fast_once: bool,
    /// Raw fast-filter value; only textual values are remembered.
    #[serde(default)]
    pub fast: Option<Value>,
    /// Raw item type; only `"links"` / `"media"` are remembered.
    #[serde(default, rename = "type")]
    pub item_type: Option<String>,
}

impl SelectionOptions {
    /// The fast filter, if it is a textual value.
    #[must_use]
    pub fn fast_text(&self) -> Option<&str> {
        self.fast.as_ref().and_then(Value::as_str)
    }

    /// The item type, if it names a known candidate set.
    ///
    /// Other values are logged and dropped, so `last-type` only ever holds
    /// `links` or `media`.
    #[must_use]
    pub fn last_type(&self) -> Option<LastType> {
        let raw = self.item_type.as_deref()?;
        match raw.parse() {
            Ok(last_type) => Some(last_type),
            Err(reason) => {
                warn!(%reason, "selector returned unknown item type");
                None
            }
        }
    }
}

/// Finalized configuration for one queuing call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedOptions {
    pub mask: String,
    pub subfolder: String,
    pub server: String,
    pub paused: bool,
    pub cookies: bool,
}

async fn explicit_or_current(
    explicit: Option<&String>,
    stack: &dyn SelectionStack,
) -> Result<String, SelectionError> {
    stack.init().await?;
    match explicit {
        Some(value) => Ok(value.clone()),
        None => stack.current().await,
    }
}

/// Resolves `options` against the current selection state.
///
/// # Errors
///
/// Returns [`SelectionError`] if a stack cannot be initialized or read.
#[instrument(skip_all)]
pub async fn resolve(
    options: &QueueOptions,
    state: &SelectionState,
) -> Result<ResolvedOptions, SelectionError> {
    let resolved = ResolvedOptions {
        mask: explicit_or_current(options.mask.as_ref(), state.mask()).await?,
        subfolder: explicit_or_current(options.subfolder.as_ref(), state.subfolder()).await?,
        server: explicit_or_current(options.server.as_ref(), state.server()).await?,
        paused: options.paused.unwrap_or(false),
        cookies: options.cookies.unwrap_or(false),
    };
    debug!(?resolved, "queue options resolved");
    Ok(resolved)
}

async fn push_onto(stack: &dyn SelectionStack, value: &str) -> Result<(), SelectionError> {
    stack.init().await?;
    stack.push(value).await
}

/// Makes the selector's choices the new current selections.
///
/// A mask is remembered only when non-empty; subfolder, server and fast filter
/// are remembered whenever they are textual, the empty string included. A set
/// "once" flag suppresses remembering for that field.
///
/// # Errors
///
/// Returns [`SelectionError`] if a stack cannot be initialized or persisted.
#[instrument(skip_all)]
pub async fn remember(
    options: &SelectionOptions,
    state: &SelectionState,
) -> Result<(), SelectionError> {
    if let Some(mask) = options.queue.mask.as_deref()
        && !mask.is_empty()
        && !options.mask_once
    {
        push_onto(state.mask(), mask).await?;
    }
    if let Some(fast) = options.fast_text()
        && !options.fast_once
    {
        push_onto(state.fast_filter(), fast).await?;
    }
    if let Some(subfolder) = options.queue.subfolder.as_deref()
        && !options.subfolder_once
    {
        push_onto(state.subfolder(), subfolder).await?;
    }
    if let Some(server) = options.queue.server.as_deref()
        && !options.server_once
    {
        push_onto(state.server(), server).await?;
    }
    Ok(())
}
