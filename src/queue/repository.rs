//! Manager seams the admission engine hands records to.
//!
//! The engine depends only on these traits; [`DownloadQueue`] is the bundled
//! SQLite implementation, while host applications plug in their own manager.

use async_trait::async_trait;

use super::{DownloadQueue, QueueRecord, Result};

/// Ingestion contract of the download manager.
#[async_trait]
pub trait Manager: Send + Sync {
    /// Takes ownership of a finalized record sequence for persistence and execution.
    ///
    /// Queuing ends when this returns; managers must not reject on content.
    async fn add_new_downloads(&self, records: &[QueueRecord]) -> Result<()>;
}

/// Window helper able to surface the manager UI.
#[async_trait]
pub trait ManagerWindow: Send + Sync {
    /// Opens (and optionally focuses) the manager.
    async fn open_manager(&self, focus: bool) -> Result<()>;
}

#[async_trait]
impl Manager for DownloadQueue {
    async fn add_new_downloads(&self, records: &[QueueRecord]) -> Result<()> {
        DownloadQueue::add_new_downloads(self, records)
            .await
            .map(|_| ())
    }
}
