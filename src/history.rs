//! Day-grouped conversation history.
//!
//! Turns are grouped by UTC calendar day, most recent day first. Only the
//! newest [`MAX_DAY_GROUPS`] days are kept; older days are evicted on append.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::{load_json, save_json, KeyValueStore, StorageError, CHAT_HISTORY_KEY};

/// Number of day groups retained.
pub const MAX_DAY_GROUPS: usize = 7;

/// Who wrote a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The person chatting.
    User,
    /// The assistant.
    Bot,
}

impl Sender {
    /// Lowercase label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Bot => "bot",
        }
    }
}

/// A single message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Message text.
    pub text: String,
    /// Author.
    pub sender: Sender,
    /// When the message was shown.
    pub timestamp: DateTime<Utc>,
}

/// All turns of one calendar day, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayGroup {
    /// The calendar day.
    pub date: NaiveDate,
    /// Turns in append order.
    pub messages: Vec<ConversationTurn>,
}

impl DayGroup {
    /// Short preview of the last message with markup stripped.
    pub fn preview(&self, max_chars: usize) -> String {
        let Some(last) = self.messages.last() else {
            return "No messages".to_owned();
        };
        let plain = strip_tags(&last.text);
        if plain.chars().count() > max_chars {
            let truncated: String = plain.chars().take(max_chars).collect();
            format!("{truncated}...")
        } else {
            plain
        }
    }
}

fn strip_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

/// Storage contract for conversation history.
#[async_trait]
pub trait ConversationLog: Send + Sync {
    /// Append one turn to the group for its day.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the read-modify-write cycle fails.
    async fn append(
        &self,
        text: &str,
        sender: Sender,
        timestamp: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// Up to `days` day groups (never more than [`MAX_DAY_GROUPS`]), most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the history cannot be read.
    async fn recent(&self, days: usize) -> Result<Vec<DayGroup>, StorageError>;

    /// Drop all history.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backend fails.
    async fn clear(&self) -> Result<(), StorageError>;
}

/// [`ConversationLog`] stored as one JSON document.
pub struct ChatHistory {
    store: Arc<dyn KeyValueStore>,
}

impl ChatHistory {
    /// Wrap a key-value backend.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

/// Insert `turn` into `groups`, keeping day order and the retention cap.
pub fn insert_turn(groups: &mut Vec<DayGroup>, turn: ConversationTurn) {
    let day = turn.timestamp.date_naive();
    if let Some(group) = groups.iter_mut().find(|g| g.date == day) {
        group.messages.push(turn);
    } else {
        let at = groups.iter().position(|g| g.date < day).unwrap_or(groups.len());
        groups.insert(
            at,
            DayGroup {
                date: day,
                messages: vec![turn],
            },
        );
    }
    groups.truncate(MAX_DAY_GROUPS);
}

#[async_trait]
impl ConversationLog for ChatHistory {
    async fn append(
        &self,
        text: &str,
        sender: Sender,
        timestamp: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut groups: Vec<DayGroup> = load_json(self.store.as_ref(), CHAT_HISTORY_KEY).await?;
        insert_turn(
            &mut groups,
            ConversationTurn {
                text: text.to_owned(),
                sender,
                timestamp,
            },
        );
        save_json(self.store.as_ref(), CHAT_HISTORY_KEY, &groups).await
    }

    async fn recent(&self, days: usize) -> Result<Vec<DayGroup>, StorageError> {
        let groups: Vec<DayGroup> = load_json(self.store.as_ref(), CHAT_HISTORY_KEY).await?;
        Ok(groups
            .into_iter()
            .take(days.min(MAX_DAY_GROUPS))
            .collect())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(CHAT_HISTORY_KEY).await
    }
}
