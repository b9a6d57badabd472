//! Persistence of completed event records.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use super::{EventRecord, StoredEvent};
use crate::storage::{load_json, save_json, KeyValueStore, StorageError, EVENTS_KEY};

/// Storage contract for completed events.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Persist a record, stamping it with the current time.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the read-modify-write cycle fails.
    async fn save(&self, record: &EventRecord) -> Result<StoredEvent, StorageError>;

    /// Up to `limit` events, newest first by save time.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the stored list cannot be read.
    async fn list(&self, limit: usize) -> Result<Vec<StoredEvent>, StorageError>;

    /// Every event in save order.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the stored list cannot be read.
    async fn all(&self) -> Result<Vec<StoredEvent>, StorageError>;

    /// Remove every stored event.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backend fails.
    async fn clear(&self) -> Result<(), StorageError>;
}

/// [`EventStore`] keeping the whole event list as one JSON document.
pub struct KvEventStore {
    store: Arc<dyn KeyValueStore>,
}

impl KvEventStore {
    /// Wrap a key-value backend.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

/// Order events newest first; among equal timestamps the later save wins.
pub fn newest_first(events: Vec<StoredEvent>) -> Vec<StoredEvent> {
    let mut indexed: Vec<(usize, StoredEvent)> = events.into_iter().enumerate().collect();
    indexed.sort_by(|(ia, a), (ib, b)| b.created_at.cmp(&a.created_at).then(ib.cmp(ia)));
    indexed.into_iter().map(|(_, event)| event).collect()
}

#[async_trait]
impl EventStore for KvEventStore {
    async fn save(&self, record: &EventRecord) -> Result<StoredEvent, StorageError> {
        let mut events: Vec<StoredEvent> = load_json(self.store.as_ref(), EVENTS_KEY).await?;
        let stored = StoredEvent {
            record: record.clone(),
            created_at: Utc::now(),
        };
        events.push(stored.clone());
        save_json(self.store.as_ref(), EVENTS_KEY, &events).await?;
        debug!(event_id = %record.id, total = events.len(), "event saved");
        Ok(stored)
    }

    async fn list(&self, limit: usize) -> Result<Vec<StoredEvent>, StorageError> {
        let events: Vec<StoredEvent> = load_json(self.store.as_ref(), EVENTS_KEY).await?;
        Ok(newest_first(events).into_iter().take(limit).collect())
    }

    async fn all(&self) -> Result<Vec<StoredEvent>, StorageError> {
        load_json(self.store.as_ref(), EVENTS_KEY).await
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(EVENTS_KEY).await
    }
}
