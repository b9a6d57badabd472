//! Key-value persistence for events, chat history and logs.
//!
//! Every collaborator stores a single JSON document per key and updates it
//! with a read-modify-write cycle. The [`KeyValueStore`] trait hides whether
//! the documents live in SQLite ([`sqlite::SqliteStore`]) or in memory
//! ([`memory::MemoryStore`], used by tests).

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub mod memory;
pub mod sqlite;

/// Key holding the stored event list.
pub const EVENTS_KEY: &str = "events";
/// Key holding the day-grouped conversation history.
pub const CHAT_HISTORY_KEY: &str = "chat_history";
/// Key holding system log lines.
pub const SYSTEM_LOGS_KEY: &str = "system_logs";
/// Key holding detailed event log blocks.
pub const EVENT_LOGS_KEY: &str = "event_logs";

/// Errors returned by storage backends and the JSON helpers.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The SQLite backend failed.
    #[error("storage backend error: {0}")]
    Backend(#[from] sqlx::Error),
    /// A stored document could not be decoded.
    #[error("stored value under '{key}' is not valid JSON: {source}")]
    Corrupt {
        /// Key of the damaged document.
        key: String,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },
    /// A value could not be encoded for storage.
    #[error("failed to encode value for '{key}': {source}")]
    Encode {
        /// Key being written.
        key: String,
        /// Encoder error.
        #[source]
        source: serde_json::Error,
    },
    /// The backend refused the operation.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// String key-value storage with whole-document reads and writes.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the raw document under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backend fails.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the document under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backend fails.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the document under `key`. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backend fails.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Decode the document under `key`, or `T::default()` when absent.
///
/// # Errors
///
/// Returns [`StorageError::Corrupt`] when the stored JSON does not decode.
pub async fn load_json<T>(store: &dyn KeyValueStore, key: &str) -> Result<T, StorageError>
where
    T: DeserializeOwned + Default,
{
    match store.get(key).await? {
        Some(raw) => serde_json::from_str(&raw).map_err(|source| StorageError::Corrupt {
            key: key.to_owned(),
            source,
        }),
        None => Ok(T::default()),
    }
}

/// Encode `value` and store it under `key`.
///
/// # Errors
///
/// Returns [`StorageError`] when encoding or the write fails.
pub async fn save_json<T>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<(), StorageError>
where
    T: Serialize + Sync,
{
    let raw = serde_json::to_string(value).map_err(|source| StorageError::Encode {
        key: key.to_owned(),
        source,
    })?;
    store.set(key, &raw).await
}
