//! In-process preference store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{PrefStore, PrefsError};

/// Preference store held entirely in memory.
///
/// Useful for embedding and tests; counts writes so callers can assert that a
/// value was (or was not) persisted.
#[derive(Debug, Default)]
pub struct MemoryPrefs {
    values: RwLock<HashMap<String, Value>>,
    writes: AtomicUsize,
}

impl MemoryPrefs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `entries`. Seeding does not count as writes.
    #[must_use]
    pub fn with_entries(entries: impl IntoIterator<Item = (String, Value)>) -> Self {
        Self {
            values: RwLock::new(entries.into_iter().collect()),
            writes: AtomicUsize::new(0),
        }
    }

    /// Number of `set` calls served so far.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PrefStore for MemoryPrefs {
    async fn get(&self, key: &str) -> Result<Option<Value>, PrefsError> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), PrefsError> {
        self.values.write().await.insert(key.to_string(), value);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_prefs_get_missing_is_none() {
        let store = MemoryPrefs::new();
        assert_eq!(store.get("nope").await.unwrap(), None);
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_memory_prefs_set_overwrites_and_counts() {
        let store = MemoryPrefs::with_entries([("a".to_string(), json!(1))]);
        store.set("a", json!(2)).await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), Some(json!(2)));
        assert_eq!(store.writes(), 1);
    }
}
