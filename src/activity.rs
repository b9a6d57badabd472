//! Persistent activity log: leveled system lines plus detailed event blocks.
//!
//! Both lists are capped; the oldest entries are dropped first. Every system
//! line is mirrored to `tracing` so the rolling JSON file sees it too.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::events::{EventField, EventRecord};
use crate::storage::{
    load_json, save_json, KeyValueStore, StorageError, EVENT_LOGS_KEY, SYSTEM_LOGS_KEY,
};

/// Severity of a system log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Routine activity.
    Info,
    /// Degraded but recovered.
    Warn,
    /// A stage failed.
    Error,
    /// An event lifecycle change.
    Event,
}

impl LogLevel {
    /// Uppercase label used in exported text.
    pub fn label(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Event => "EVENT",
        }
    }
}

/// One system log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// When the line was written.
    pub timestamp: DateTime<Utc>,
    /// Severity.
    pub level: LogLevel,
    /// Free text.
    pub message: String,
}

/// One detailed event block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLogEntry {
    /// When the block was written.
    pub timestamp: DateTime<Utc>,
    /// Multi-line block text.
    pub entry: String,
}

/// Storage contract for the activity log.
#[async_trait]
pub trait ActivityLog: Send + Sync {
    /// Append a system line.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the write fails.
    async fn log(&self, level: LogLevel, message: &str) -> Result<(), StorageError>;

    /// Record an event lifecycle change: one `event` line plus a detailed block.
    ///
    /// Returns the block text.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when either write fails.
    async fn record_event(&self, record: &EventRecord, action: &str)
        -> Result<String, StorageError>;

    /// All system lines, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the list cannot be read.
    async fn entries(&self) -> Result<Vec<LogEntry>, StorageError>;

    /// All event blocks, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the list cannot be read.
    async fn event_entries(&self) -> Result<Vec<EventLogEntry>, StorageError>;

    /// Drop both lists.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backend fails.
    async fn clear(&self) -> Result<(), StorageError>;
}

/// [`ActivityLog`] over a key-value backend.
pub struct ActivityLogger {
    store: Arc<dyn KeyValueStore>,
    max_entries: usize,
    max_event_entries: usize,
}

impl ActivityLogger {
    /// Wrap a key-value backend with retention caps.
    pub fn new(store: Arc<dyn KeyValueStore>, max_entries: usize, max_event_entries: usize) -> Self {
        Self {
            store,
            max_entries: max_entries.max(1),
            max_event_entries: max_event_entries.max(1),
        }
    }
}

fn keep_newest<T>(items: &mut Vec<T>, cap: usize) {
    if items.len() > cap {
        let excess = items.len().saturating_sub(cap);
        items.drain(..excess);
    }
}

fn iso(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Render the detailed block for an event action.
pub fn event_block(record: &EventRecord, action: &str, at: DateTime<Utc>) -> String {
    let stamp = iso(at);
    let mut lines = vec![
        format!("EVENT {} - {stamp}", action.to_uppercase()),
        "===========================================".to_owned(),
    ];
    for field in EventField::ALL {
        let value = record.value(field);
        let shown = if value.is_empty() { "N/A" } else { value };
        lines.push(format!("{}: {shown}", field.column()));
    }
    lines.push(format!("Created At: {stamp}"));
    lines.push("-------------------------------------------".to_owned());
    lines.join("\n")
}

#[async_trait]
impl ActivityLog for ActivityLogger {
    async fn log(&self, level: LogLevel, message: &str) -> Result<(), StorageError> {
        match level {
            LogLevel::Error => error!(target: "activity", "{message}"),
            LogLevel::Warn => warn!(target: "activity", "{message}"),
            LogLevel::Info | LogLevel::Event => {
                info!(target: "activity", level = level.label(), "{message}");
            }
        }

        let mut logs: Vec<LogEntry> = load_json(self.store.as_ref(), SYSTEM_LOGS_KEY).await?;
        logs.push(LogEntry {
            timestamp: Utc::now(),
            level,
            message: message.to_owned(),
        });
        keep_newest(&mut logs, self.max_entries);
        save_json(self.store.as_ref(), SYSTEM_LOGS_KEY, &logs).await
    }

    async fn record_event(
        &self,
        record: &EventRecord,
        action: &str,
    ) -> Result<String, StorageError> {
        let now = Utc::now();
        let block = event_block(record, action, now);

        self.log(
            LogLevel::Event,
            &format!("Event {action}: {} (ID: {})", record.name, record.id),
        )
        .await?;

        let mut blocks: Vec<EventLogEntry> = load_json(self.store.as_ref(), EVENT_LOGS_KEY).await?;
        blocks.push(EventLogEntry {
            timestamp: now,
            entry: block.clone(),
        });
        keep_newest(&mut blocks, self.max_event_entries);
        save_json(self.store.as_ref(), EVENT_LOGS_KEY, &blocks).await?;

        Ok(block)
    }

    async fn entries(&self) -> Result<Vec<LogEntry>, StorageError> {
        load_json(self.store.as_ref(), SYSTEM_LOGS_KEY).await
    }

    async fn event_entries(&self) -> Result<Vec<EventLogEntry>, StorageError> {
        load_json(self.store.as_ref(), EVENT_LOGS_KEY).await
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(SYSTEM_LOGS_KEY).await?;
        self.store.remove(EVENT_LOGS_KEY).await?;
        self.log(LogLevel::Info, "All logs cleared").await
    }
}

// ---------------------------------------------------------------------------
// Text exports
// ---------------------------------------------------------------------------

/// `[<timestamp>] <LEVEL>: <message>` per line.
pub fn format_system_log(entries: &[LogEntry]) -> String {
    entries
        .iter()
        .map(|e| format!("[{}] {}: {}", iso(e.timestamp), e.level.label(), e.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Event blocks separated by a blank line, or `None` when there are none.
pub fn format_event_log(entries: &[EventLogEntry]) -> Option<String> {
    if entries.is_empty() {
        return None;
    }
    Some(
        entries
            .iter()
            .map(|e| e.entry.as_str())
            .collect::<Vec<_>>()
            .join("\n\n"),
    )
}

/// Both logs in one document with section headers.
pub fn format_all_logs(system: &[LogEntry], events: &[EventLogEntry]) -> String {
    let mut out = String::from("=== SYSTEM LOGS ===\n\n");
    out.push_str(&format_system_log(system));
    out.push_str("\n\n=== EVENT LOGS ===\n\n");
    out.push_str(&format_event_log(events).unwrap_or_default());
    out
}
