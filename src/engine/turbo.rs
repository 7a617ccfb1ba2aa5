//! Turbo pathway as an explicit state machine.
//!
//! ```text
//! SanityCheck -> TypeSelect -> TypeFilter -> Dedup -> Decide -> Queue
//!                                                          \-> FallbackRegular
//! ```
//!
//! `Decide` takes the fallback edge when the filtered set is empty after
//! deduplication. The fallback hands the original candidate sets to the
//! regular pathway without repeating the sanity check.

use tracing::{debug, info, instrument};

use super::{EngineError, Outcome, QueueEngine};
use crate::gate::{make_unique, sanity};
use crate::prefs::LastType;
use crate::queue::CandidateItem;
use crate::resolve::QueueOptions;

/// States visited by one turbo invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurboState {
    SanityCheck,
    TypeSelect,
    TypeFilter(LastType),
    Dedup(Vec<CandidateItem>),
    Decide(Vec<CandidateItem>),
    Queue(Vec<CandidateItem>),
    FallbackRegular,
}

impl TurboState {
    /// Short state name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::SanityCheck => "sanity_check",
            Self::TypeSelect => "type_select",
            Self::TypeFilter(_) => "type_filter",
            Self::Dedup(_) => "dedup",
            Self::Decide(_) => "decide",
            Self::Queue(_) => "queue",
            Self::FallbackRegular => "fallback_regular",
        }
    }
}

/// Guard on the `Decide -> FallbackRegular` edge.
fn filtered_set_empty_after_dedup(selected: &[CandidateItem]) -> bool {
    selected.is_empty()
}

impl QueueEngine {
    /// Turbo pathway: queue the remembered type's candidates without asking.
    ///
    /// Falls back to the regular pathway with the unfiltered `links` and
    /// `media` when nothing of the remembered type survives filtering.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] if a collaborator, the preference store or the
    /// selection state fails.
    #[instrument(skip_all, fields(links = links.len(), media = media.len()))]
    pub async fn turbo(
        &self,
        links: Vec<CandidateItem>,
        media: Vec<CandidateItem>,
    ) -> Result<Outcome, EngineError> {
        let mut state = TurboState::SanityCheck;
        loop {
            debug!(state = state.name(), "turbo step");
            state = match state {
                TurboState::SanityCheck => {
                    if !sanity(&links, &media, self.collaborators.notifier.as_ref()) {
                        return Ok(Outcome::Rejected);
                    }
                    TurboState::TypeSelect
                }
                TurboState::TypeSelect => TurboState::TypeFilter(self.prefs.last_type().await?),
                TurboState::TypeFilter(last_type) => {
                    let source = match last_type {
                        LastType::Links => &links,
                        LastType::Media => &media,
                    };
                    let filtered = self
                        .collaborators
                        .filter
                        .filter_items_by_type(source, last_type.item_kind())
                        .await;
                    TurboState::Dedup(filtered)
                }
                TurboState::Dedup(filtered) => {
                    TurboState::Decide(make_unique(&[filtered.as_slice()]))
                }
                TurboState::Decide(selected) => {
                    if filtered_set_empty_after_dedup(&selected) {
                        TurboState::FallbackRegular
                    } else {
                        TurboState::Queue(selected)
                    }
                }
                TurboState::Queue(selected) => {
                    let paused = self.prefs.add_paused().await?;
                    let summary = self
                        .queue(selected, &QueueOptions::paused(paused))
                        .await?;
                    return Ok(Outcome::Queued(summary));
                }
                TurboState::FallbackRegular => {
                    info!("nothing matched the remembered type, falling back to selection");
                    return self.select_and_queue(&links, &media).await;
                }
            };
        }
    }
}
