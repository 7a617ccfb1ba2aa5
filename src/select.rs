//! Selection seam: the step where a user picks items and options.
//!
//! Interactive front ends implement [`Selector`]; [`PresetSelector`] is the
//! non-interactive implementation used by the command line.

use async_trait::async_trait;
use thiserror::Error;

use crate::queue::CandidateItem;
use crate::resolve::SelectionOptions;

/// Errors a selector can report.
#[derive(Debug, Clone, Error)]
pub enum SelectError {
    /// The user dismissed the selection.
    #[error("selection cancelled")]
    Cancelled,

    /// The selector could not be shown or answered with garbage.
    #[error("selector failed: {0}")]
    Failed(String),
}

/// Items and options chosen by the user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub items: Vec<CandidateItem>,
    pub options: SelectionOptions,
}

/// Interactive selection contract. Both calls may wait on the user.
#[async_trait]
pub trait Selector: Send + Sync {
    /// Lets the user choose among the offered links and media.
    async fn select(
        &self,
        links: &[CandidateItem],
        media: &[CandidateItem],
    ) -> Result<Selection, SelectError>;

    /// Lets the user edit one item; `None` asks for a new blank item.
    async fn single(&self, item: Option<&CandidateItem>) -> Result<Selection, SelectError>;
}

/// Selector that answers without asking anyone.
///
/// `select` takes every link followed by every media item; `single` returns
/// the given item, or a blank link for `blank_url` when no item is given.
#[derive(Debug, Clone, Default)]
pub struct PresetSelector {
    options: SelectionOptions,
    blank_url: Option<String>,
}

impl PresetSelector {
    #[must_use]
    pub fn new(options: SelectionOptions) -> Self {
        Self {
            options,
            blank_url: None,
        }
    }

    /// URL used when `single` is asked for a blank item.
    #[must_use]
    pub fn with_blank_url(mut self, url: impl Into<String>) -> Self {
        self.blank_url = Some(url.into());
        self
    }
}

#[async_trait]
impl Selector for PresetSelector {
    async fn select(
        &self,
        links: &[CandidateItem],
        media: &[CandidateItem],
    ) -> Result<Selection, SelectError> {
        Ok(Selection {
            items: links.iter().chain(media).cloned().collect(),
            options: self.options.clone(),
        })
    }

    async fn single(&self, item: Option<&CandidateItem>) -> Result<Selection, SelectError> {
        let item = match (item, &self.blank_url) {
            (Some(item), _) => item.clone(),
            (None, Some(url)) => CandidateItem::link(url.clone()),
            (None, None) => return Err(SelectError::Cancelled),
        };
        Ok(Selection {
            items: vec![item],
            options: self.options.clone(),
        })
    }
}
