//! The chat controller and its question flow.
//!
//! [`ChatController`] turns one line of user input into a [`Reply`]. It owns
//! the [`flow::QuestionFlow`] and talks to every other component through
//! injected trait objects (see [`Collaborators`]).

use std::time::Duration;

pub mod controller;
pub mod flow;
pub mod questions;
pub mod replies;

pub use controller::{ChatController, Collaborators};

/// Typing pause before a canned reply or a question.
pub const CANNED_DELAY: Duration = Duration::from_millis(1000);
/// Typing pause before a free-text reply.
pub const FREE_TALK_DELAY: Duration = Duration::from_millis(1500);
/// Typing pause before the completion summary.
pub const SUMMARY_DELAY: Duration = Duration::from_millis(2000);

/// One bot message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotMessage {
    /// Regular text.
    Text(String),
    /// Example answers rendered under a question.
    Example(String),
}

impl BotMessage {
    /// The message text.
    pub fn text(&self) -> &str {
        match self {
            Self::Text(t) | Self::Example(t) => t,
        }
    }
}

/// Everything the bot says in response to one input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reply {
    /// Messages in display order.
    pub messages: Vec<BotMessage>,
    /// Suggested next inputs.
    pub suggestions: Vec<String>,
    /// Simulated typing pause before display.
    pub typing: Duration,
}

impl Reply {
    /// A single text message.
    pub fn text(text: impl Into<String>, typing: Duration) -> Self {
        Self {
            messages: vec![BotMessage::Text(text.into())],
            suggestions: Vec::new(),
            typing,
        }
    }

    /// Attach suggestion chips.
    pub fn with_suggestions(mut self, chips: &[&str]) -> Self {
        self.suggestions = chips.iter().map(|c| (*c).to_owned()).collect();
        self
    }

    /// Append a message.
    pub fn push(&mut self, message: BotMessage) {
        self.messages.push(message);
    }

    /// All message texts joined by newlines.
    pub fn joined(&self) -> String {
        self.messages
            .iter()
            .map(BotMessage::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
