//! Preference storage for the admission engine.
//!
//! The engine only needs a key/value store with JSON values ([`PrefStore`]).
//! [`Prefs`] layers typed accessors and configurable defaults on top of any
//! store, so callers never deal with raw JSON.
//!
//! # Keys
//!
//! | key | type | default |
//! |-----|------|---------|
//! | `currentBatch` | integer | `0` |
//! | `last-type` | `"links"` \| `"media"` | `"links"` |
//! | `add-paused` | bool | `false` |
//! | `queue-notification` | bool | `true` |
//! | `open-manager-on-queue` | bool | `true` (read, never acted on) |
//! | `recent-<stack>` | array of strings | stack defaults |

mod error;
mod memory;
mod sqlite;

pub use error::PrefsError;
pub use memory::MemoryPrefs;
pub use sqlite::SqlitePrefs;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::queue::ItemKind;

/// Persisted batch counter.
pub const CURRENT_BATCH: &str = "currentBatch";
/// Candidate set the turbo path filters ("links" or "media").
pub const LAST_TYPE: &str = "last-type";
/// Whether turbo-queued items start paused.
pub const ADD_PAUSED: &str = "add-paused";
/// Whether a notification is shown after queuing.
pub const QUEUE_NOTIFICATION: &str = "queue-notification";
/// Stored but inert; see `QueueEngine`.
pub const OPEN_MANAGER_ON_QUEUE: &str = "open-manager-on-queue";

/// Data-access contract for preference persistence.
#[async_trait]
pub trait PrefStore: Send + Sync {
    /// Returns the stored value for `key`, or `None` if it was never set.
    async fn get(&self, key: &str) -> Result<Option<Value>, PrefsError>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: Value) -> Result<(), PrefsError>;
}

/// Which candidate set the turbo path draws from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LastType {
    #[default]
    Links,
    Media,
}

impl LastType {
    /// Returns the stored string representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Links => "links",
            Self::Media => "media",
        }
    }

    /// Returns the type tag handed to the type filter.
    #[must_use]
    pub fn item_kind(self) -> ItemKind {
        match self {
            Self::Links => ItemKind::Link,
            Self::Media => ItemKind::Media,
        }
    }
}

impl fmt::Display for LastType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LastType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "links" => Ok(Self::Links),
            "media" => Ok(Self::Media),
            _ => Err(format!("invalid last type: {s} (expected links or media)")),
        }
    }
}

/// Values returned for keys that were never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefDefaults {
    pub last_type: LastType,
    pub add_paused: bool,
    pub queue_notification: bool,
    pub open_manager_on_queue: bool,
}

impl Default for PrefDefaults {
    fn default() -> Self {
        Self {
            last_type: LastType::Links,
            add_paused: false,
            queue_notification: true,
            open_manager_on_queue: true,
        }
    }
}

/// Typed view over a [`PrefStore`].
#[derive(Clone)]
pub struct Prefs {
    store: Arc<dyn PrefStore>,
    defaults: PrefDefaults,
}

impl fmt::Debug for Prefs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Prefs")
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

impl Prefs {
    /// Wraps `store` with the built-in defaults.
    #[must_use]
    pub fn new(store: Arc<dyn PrefStore>) -> Self {
        Self::with_defaults(store, PrefDefaults::default())
    }

    /// Wraps `store` with caller-provided defaults (e.g. from a config file).
    #[must_use]
    pub fn with_defaults(store: Arc<dyn PrefStore>, defaults: PrefDefaults) -> Self {
        Self { store, defaults }
    }

    /// Returns the defaults applied to unset keys.
    #[must_use]
    pub fn defaults(&self) -> &PrefDefaults {
        &self.defaults
    }

    /// Reads `key` decoded as `T`, or `default` if unset.
    ///
    /// # Errors
    ///
    /// Returns [`PrefsError`] if the store fails or the value has the wrong shape.
    pub async fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> Result<T, PrefsError> {
        match self.store.get(key).await? {
            None | Some(Value::Null) => Ok(default),
            Some(value) => serde_json::from_value(value).map_err(|e| PrefsError::decode(key, e)),
        }
    }

    /// Reads `key` decoded as `T`, or `None` if unset.
    ///
    /// # Errors
    ///
    /// Returns [`PrefsError`] if the store fails or the value has the wrong shape.
    pub async fn get_opt<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, PrefsError> {
        match self.store.get(key).await? {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| PrefsError::decode(key, e)),
        }
    }

    /// Stores `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`PrefsError`] if encoding or the store fails.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), PrefsError> {
        let value = serde_json::to_value(value).map_err(|e| PrefsError::decode(key, e))?;
        self.store.set(key, value).await
    }

    /// Reads the persisted batch counter (default `0`).
    ///
    /// # Errors
    ///
    /// Returns [`PrefsError`] if the store fails or the value is not an integer.
    pub async fn current_batch(&self) -> Result<u32, PrefsError> {
        self.get_or(CURRENT_BATCH, 0).await
    }

    /// Persists the batch counter.
    ///
    /// # Errors
    ///
    /// Returns [`PrefsError`] if the store fails.
    pub async fn set_current_batch(&self, value: u32) -> Result<(), PrefsError> {
        self.set(CURRENT_BATCH, &value).await
    }

    /// Reads the remembered candidate type for the turbo path.
    ///
    /// Unknown stored strings fall back to the configured default.
    ///
    /// # Errors
    ///
    /// Returns [`PrefsError`] if the store fails or the value is not a string.
    pub async fn last_type(&self) -> Result<LastType, PrefsError> {
        let Some(raw) = self.get_opt::<String>(LAST_TYPE).await? else {
            return Ok(self.defaults.last_type);
        };
        match raw.parse() {
            Ok(last_type) => Ok(last_type),
            Err(reason) => {
                warn!(%reason, "ignoring stored last-type");
                Ok(self.defaults.last_type)
            }
        }
    }

    /// Remembers the candidate type chosen on the regular path.
    ///
    /// # Errors
    ///
    /// Returns [`PrefsError`] if the store fails.
    pub async fn set_last_type(&self, value: LastType) -> Result<(), PrefsError> {
        self.set(LAST_TYPE, value.as_str()).await
    }

    /// # Errors
    ///
    /// Returns [`PrefsError`] if the store fails or the value is not a bool.
    pub async fn add_paused(&self) -> Result<bool, PrefsError> {
        self.get_or(ADD_PAUSED, self.defaults.add_paused).await
    }

    /// # Errors
    ///
    /// Returns [`PrefsError`] if the store fails or the value is not a bool.
    pub async fn queue_notification(&self) -> Result<bool, PrefsError> {
        self.get_or(QUEUE_NOTIFICATION, self.defaults.queue_notification)
            .await
    }

    /// # Errors
    ///
    /// Returns [`PrefsError`] if the store fails or the value is not a bool.
    pub async fn open_manager_on_queue(&self) -> Result<bool, PrefsError> {
        self.get_or(OPEN_MANAGER_ON_QUEUE, self.defaults.open_manager_on_queue)
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn prefs_with(entries: &[(&str, Value)]) -> Prefs {
        Prefs::new(Arc::new(MemoryPrefs::with_entries(
            entries.iter().map(|(k, v)| ((*k).to_string(), v.clone())),
        )))
    }

    #[tokio::test]
    async fn test_prefs_defaults_when_unset() {
        let prefs = prefs_with(&[]);
        assert_eq!(prefs.current_batch().await.unwrap(), 0);
        assert_eq!(prefs.last_type().await.unwrap(), LastType::Links);
        assert!(!prefs.add_paused().await.unwrap());
        assert!(prefs.queue_notification().await.unwrap());
        assert!(prefs.open_manager_on_queue().await.unwrap());
    }

    #[tokio::test]
    async fn test_prefs_reads_stored_values() {
        let prefs = prefs_with(&[
            (CURRENT_BATCH, json!(42)),
            (LAST_TYPE, json!("media")),
            (ADD_PAUSED, json!(true)),
            (QUEUE_NOTIFICATION, json!(false)),
        ]);
        assert_eq!(prefs.current_batch().await.unwrap(), 42);
        assert_eq!(prefs.last_type().await.unwrap(), LastType::Media);
        assert!(prefs.add_paused().await.unwrap());
        assert!(!prefs.queue_notification().await.unwrap());
    }

    #[tokio::test]
    async fn test_prefs_unknown_last_type_falls_back_to_default() {
        let prefs = prefs_with(&[(LAST_TYPE, json!("torrents"))]);
        assert_eq!(prefs.last_type().await.unwrap(), LastType::Links);
    }

    #[tokio::test]
    async fn test_prefs_wrong_shape_is_decode_error() {
        let prefs = prefs_with(&[(CURRENT_BATCH, json!("seven"))]);
        let err = prefs.current_batch().await.unwrap_err();
        assert!(matches!(err, PrefsError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_prefs_custom_defaults_apply() {
        let defaults = PrefDefaults {
            last_type: LastType::Media,
            add_paused: true,
            queue_notification: false,
            open_manager_on_queue: false,
        };
        let prefs = Prefs::with_defaults(Arc::new(MemoryPrefs::new()), defaults);
        assert_eq!(prefs.last_type().await.unwrap(), LastType::Media);
        assert!(prefs.add_paused().await.unwrap());
        assert!(!prefs.queue_notification().await.unwrap());
    }

    #[tokio::test]
    async fn test_prefs_set_last_type_round_trips_as_string() {
        let store = Arc::new(MemoryPrefs::new());
        let prefs = Prefs::new(store.clone());
        prefs.set_last_type(LastType::Media).await.unwrap();
        assert_eq!(store.get(LAST_TYPE).await.unwrap(), Some(json!("media")));
    }

    #[test]
    fn test_last_type_parse_and_kind() {
        assert_eq!("links".parse::<LastType>().unwrap(), LastType::Links);
        assert_eq!("media".parse::<LastType>().unwrap(), LastType::Media);
        assert!("video".parse::<LastType>().is_err());
        assert_eq!(LastType::Media.item_kind(), ItemKind::Media);
    }
}
