//! SQLite-backed preference store.

use async_trait::async_trait;
use serde_json::Value;
use tracing::instrument;

use super::{PrefStore, PrefsError};
use crate::db::Database;

/// Preference store persisted in the `prefs` table, one JSON document per key.
#[derive(Debug, Clone)]
pub struct SqlitePrefs {
    db: Database,
}

impl SqlitePrefs {
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PrefStore for SqlitePrefs {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Option<Value>, PrefsError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM prefs WHERE key = ?")
            .bind(key)
            .fetch_optional(self.db.pool())
            .await?;

        row.map(|(raw,)| serde_json::from_str(&raw).map_err(|e| PrefsError::decode(key, e)))
            .transpose()
    }

    #[instrument(skip(self, value))]
    async fn set(&self, key: &str, value: Value) -> Result<(), PrefsError> {
        sqlx::query(
            r"INSERT INTO prefs (key, value)
              VALUES (?, ?)
              ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = datetime('now')",
        )
        .bind(key)
        .bind(value.to_string())
        .execute(self.db.pool())
        .await?;

        Ok(())
    }
}
