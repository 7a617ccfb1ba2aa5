//! Batch id allocation.
//!
//! Every queuing call reads the persisted counter once, advances it at most
//! once (only when at least one record is built) and writes it back only if it
//! moved. The read and the write are separate store operations: two
//! overlapping calls can observe the same counter and hand out the same id.
//! Batch ids group related downloads and are not required to be unique.

use tracing::debug;

use crate::prefs::{Prefs, PrefsError};

/// Batch ids cycle through `0..MAX_BATCH`.
pub const MAX_BATCH: u32 = 10_000;

/// Advances `current` by one, wrapping to `0` when it reaches [`MAX_BATCH`].
///
/// Returns `(assigned, new_current)`; both are the same value.
#[must_use]
pub fn next_batch(current: u32) -> (u32, u32) {
    let mut next = current.saturating_add(1);
    if next >= MAX_BATCH {
        next = 0;
    }
    (next, next)
}

/// Counter state for one queuing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchCounter {
    initial: u32,
    current: u32,
    assigned: Option<u32>,
}

impl BatchCounter {
    /// Starts a call from a counter value already read.
    #[must_use]
    pub fn starting_at(current: u32) -> Self {
        Self {
            initial: current,
            current,
            assigned: None,
        }
    }

    /// Reads the persisted counter.
    ///
    /// # Errors
    ///
    /// Returns [`PrefsError`] if the preference store fails.
    pub async fn load(prefs: &Prefs) -> Result<Self, PrefsError> {
        Ok(Self::starting_at(prefs.current_batch().await?))
    }

    /// Returns the batch id of this call, allocating it on first use.
    pub fn allocate(&mut self) -> u32 {
        if let Some(batch) = self.assigned {
            return batch;
        }
        let (assigned, current) = next_batch(self.current);
        self.current = current;
        self.assigned = Some(assigned);
        assigned
    }

    /// The id handed out by [`allocate`](Self::allocate), if any.
    #[must_use]
    pub fn assigned(&self) -> Option<u32> {
        self.assigned
    }

    /// Counter value to be persisted.
    #[must_use]
    pub fn current(&self) -> u32 {
        self.current
    }

    /// True if the counter moved since it was read.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.initial != self.current
    }

    /// Writes the counter back if it moved. Returns whether a write happened.
    ///
    /// # Errors
    ///
    /// Returns [`PrefsError`] if the preference store fails.
    pub async fn persist(&self, prefs: &Prefs) -> Result<bool, PrefsError> {
        if !self.is_dirty() {
            return Ok(false);
        }
        prefs.set_current_batch(self.current).await?;
        debug!(batch = self.current, "batch counter persisted");
        Ok(true)
    }
}
