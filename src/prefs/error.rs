//! Error types for preference storage.

use thiserror::Error;

use crate::db::DbErrorKind;

/// Errors that can occur while reading or writing preferences.
#[derive(Debug, Error)]
pub enum PrefsError {
    /// Backing database operation failed.
    #[error("preference storage error ({kind}): {message}")]
    Database {
        /// Typed classification of the database failure.
        kind: DbErrorKind,
        /// Human-readable database error text.
        message: String,
    },

    /// A stored value could not be decoded into the requested type.
    #[error("preference '{key}' holds an unexpected value: {source}")]
    Decode {
        /// Preference key that was read.
        key: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The store is not reachable (used by non-database stores).
    #[error("preference store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for PrefsError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database {
            kind: DbErrorKind::from_sqlx(&err),
            message: err.to_string(),
        }
    }
}

impl PrefsError {
    /// Wraps a JSON decoding failure for `key`.
    #[must_use]
    pub fn decode(key: &str, source: serde_json::Error) -> Self {
        Self::Decode {
            key: key.to_string(),
            source,
        }
    }
}
