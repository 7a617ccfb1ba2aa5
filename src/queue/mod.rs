//! Queue records and the download-manager hand-off.
//!
//! # Overview
//!
//! - [`CandidateItem`] - a downloadable reference supplied by the caller
//! - [`RecordDraft`] / [`QueueRecord`] - two-phase construction of finalized records
//! - [`Manager`] - ingestion contract of the download manager
//! - [`DownloadQueue`] - SQLite-backed manager bundled with the crate
//!
//! # Example
//!
//! ```ignore
//! use batchq_core::queue::DownloadQueue;
//! use batchq_core::Database;
//! use std::path::Path;
//!
//! let db = Database::new(Path::new("batchq.db")).await?;
//! let queue = DownloadQueue::new(db);
//! let rows = queue.list_batch(42).await?;
//! ```

mod error;
mod item;
mod repository;

pub use error::QueueError;
pub use item::{CandidateItem, ItemKind, QueueRecord, RecordDraft, StoredDownload};
pub use repository::{Manager, ManagerWindow};

use tracing::{debug, instrument};

use crate::db::Database;

/// Result type for queue operations.
pub type Result<T> = std::result::Result<T, QueueError>;

/// Download manager that persists queued records to SQLite.
#[derive(Debug, Clone)]
pub struct DownloadQueue {
    db: Database,
}

impl DownloadQueue {
    /// Creates a new manager with the given database connection.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Inserts every record in one transaction, returning the new row ids in order.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Database`] if any insert fails; nothing is stored then.
    #[instrument(skip(self, records), fields(records = records.len()))]
    pub async fn add_new_downloads(&self, records: &[QueueRecord]) -> Result<Vec<i64>> {
        let mut tx = self.db.pool().begin().await?;
        let mut ids = Vec::with_capacity(records.len());

        for record in records {
            let (id,): (i64,) = sqlx::query_as(
                r"INSERT INTO downloads (
                    batch,
                    idx,
                    url,
                    referrer,
                    usable_referrer,
                    file_name,
                    title,
                    description,
                    start_date,
                    private,
                    post_data,
                    mask,
                    subfolder,
                    server,
                    date,
                    paused,
                    cookies
                  )
                  VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                  RETURNING id",
            )
            .bind(i64::from(record.batch()))
            .bind(i64::from(record.idx()))
            .bind(record.url())
            .bind(record.referrer())
            .bind(record.usable_referrer())
            .bind(record.file_name())
            .bind(record.title())
            .bind(record.description())
            .bind(record.start_date().to_rfc3339())
            .bind(record.private())
            .bind(record.post_data())
            .bind(record.mask())
            .bind(record.subfolder())
            .bind(record.server())
            .bind(record.date())
            .bind(record.paused())
            .bind(record.cookies())
            .fetch_one(&mut *tx)
            .await?;
            ids.push(id);
        }

        tx.commit().await?;
        debug!(stored = ids.len(), "records stored");
        Ok(ids)
    }

    /// Lists the records of one batch in sequence order.
    ///
    /// A batch id can be reused once the counter wraps; older rows come first.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Database`] if the query fails.
    #[instrument(skip(self))]
    pub async fn list_batch(&self, batch: u32) -> Result<Vec<StoredDownload>> {
        let rows = sqlx::query_as::<_, StoredDownload>(
            r"SELECT * FROM downloads
              WHERE batch = ?
              ORDER BY id ASC",
        )
        .bind(i64::from(batch))
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows)
    }

    /// Returns the batch id of the most recently stored record.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Database`] if the query fails.
    #[instrument(skip(self))]
    pub async fn latest_batch(&self) -> Result<Option<u32>> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT batch FROM downloads ORDER BY id DESC LIMIT 1")
                .fetch_optional(self.db.pool())
                .await?;

        Ok(row.and_then(|(batch,)| u32::try_from(batch).ok()))
    }

    /// Returns the total number of stored records.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Database`] if the query fails.
    #[instrument(skip(self))]
    pub async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM downloads")
            .fetch_one(self.db.pool())
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::resolve::ResolvedOptions;
    use chrono::Utc;

    fn records(batch: u32, urls: &[&str]) -> Vec<QueueRecord> {
        let resolved = ResolvedOptions {
            mask: "*name*.*ext*".to_string(),
            subfolder: "sub".to_string(),
            server: "mirror".to_string(),
            paused: true,
            cookies: true,
        };
        let now = Utc::now();
        urls.iter()
            .zip(1u32..)
            .map(|(url, idx)| {
                RecordDraft::new(CandidateItem::link(*url), idx, &resolved, now).stamp(batch)
            })
            .collect()
    }

    #[tokio::test]
    async fn test_add_new_downloads_stores_all_fields() {
        let db = Database::new_in_memory().await.unwrap();
        let queue = DownloadQueue::new(db);

        let batch = records(5, &["https://example.com/a.zip", "https://example.com/b.zip"]);
        let ids = queue.add_new_downloads(&batch).await.unwrap();
        assert_eq!(ids.len(), 2);

        let stored = queue.list_batch(5).await.unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].idx, 1);
        assert_eq!(stored[1].idx, 2);
        assert_eq!(stored[0].subfolder, "sub");
        assert_eq!(stored[0].server, "mirror");
        assert!(stored[0].paused);
        assert!(stored[0].cookies);
        assert_eq!(
            stored[0].parsed_start_date(),
            Some(batch[0].start_date())
        );
    }

    #[tokio::test]
    async fn test_add_new_downloads_empty_is_noop() {
        let db = Database::new_in_memory().await.unwrap();
        let queue = DownloadQueue::new(db);

        let ids = queue.add_new_downloads(&[]).await.unwrap();
        assert!(ids.is_empty());
        assert_eq!(queue.count().await.unwrap(), 0);
        assert_eq!(queue.latest_batch().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_latest_batch_tracks_last_insert() {
        let db = Database::new_in_memory().await.unwrap();
        let queue = DownloadQueue::new(db);

        queue
            .add_new_downloads(&records(9999, &["https://example.com/a.zip"]))
            .await
            .unwrap();
        queue
            .add_new_downloads(&records(0, &["https://example.com/b.zip"]))
            .await
            .unwrap();

        assert_eq!(queue.latest_batch().await.unwrap(), Some(0));
        assert_eq!(queue.count().await.unwrap(), 2);
    }
}
