//! Chat controller: routes each input through the flow or the classifier.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::flow::{QuestionFlow, Step};
use super::questions::Question;
use super::replies::{self, chips};
use super::{BotMessage, Reply, CANNED_DELAY, FREE_TALK_DELAY, SUMMARY_DELAY};
use crate::activity::{
    format_all_logs, format_event_log, format_system_log, ActivityLog, LogLevel,
};
use crate::events::store::EventStore;
use crate::events::EventRecord;
use crate::export::Exporter;
use crate::history::{ConversationLog, DayGroup, Sender};
use crate::intent::{Intent, IntentClassifier};
use crate::responder::{fallback, ResponseGenerator};

/// Everything the controller talks to, injected at construction.
#[derive(Clone)]
pub struct Collaborators {
    /// Intent classifier for idle input.
    pub classifier: Arc<dyn IntentClassifier>,
    /// Completed-event persistence.
    pub store: Arc<dyn EventStore>,
    /// Conversation history.
    pub history: Arc<dyn ConversationLog>,
    /// System and event activity log.
    pub activity: Arc<dyn ActivityLog>,
    /// Free-text and summary generation.
    pub responder: Arc<dyn ResponseGenerator>,
}

/// Drives one conversation.
///
/// Inputs are processed strictly one at a time: every entry point that can
/// change the flow takes `&mut self` and finishes its side effects before
/// returning.
pub struct ChatController {
    flow: QuestionFlow,
    deps: Collaborators,
    session_id: Uuid,
    recent_events_limit: usize,
}

impl ChatController {
    /// Create an idle controller.
    pub fn new(deps: Collaborators, recent_events_limit: usize) -> Self {
        Self {
            flow: QuestionFlow::new(),
            deps,
            session_id: Uuid::new_v4(),
            recent_events_limit,
        }
    }

    /// The question flow, for inspection.
    pub fn flow(&self) -> &QuestionFlow {
        &self.flow
    }

    /// Identifier attached to this conversation's tracing spans.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Opening suggestions shown before the first input.
    pub fn welcome(&self) -> Reply {
        Reply::default().with_suggestions(chips::WELCOME)
    }

    /// Handle one line of user input. Blank input yields `None`.
    #[instrument(skip(self, raw), fields(session = %self.session_id))]
    pub async fn handle_input(&mut self, raw: &str) -> Option<Reply> {
        let message = raw.trim();
        if message.is_empty() {
            return None;
        }

        self.record_turn(message, Sender::User).await;

        let reply = if self.flow.is_collecting() {
            self.handle_answer(message).await
        } else {
            let intent = self.deps.classifier.classify(message);
            debug!(intent = intent.as_str(), "classified input");
            self.handle_intent(intent, message).await
        };

        self.record_reply(&reply).await;
        Some(reply)
    }

    async fn handle_intent(&mut self, intent: Intent, message: &str) -> Reply {
        match intent {
            Intent::StartEvent => {
                info!("starting event intake");
                let question = self.flow.start();
                question_reply(question, None)
            }
            Intent::ViewEvents => self.list_events().await,
            Intent::Explain => {
                Reply::text(replies::EXPLANATION, CANNED_DELAY).with_suggestions(chips::EXPLAIN)
            }
            Intent::Greet => {
                Reply::text(replies::GREETING, CANNED_DELAY).with_suggestions(chips::GREET)
            }
            Intent::Help => Reply::text(replies::HELP, CANNED_DELAY).with_suggestions(chips::HELP),
            Intent::Thanks => {
                Reply::text(replies::THANKS, CANNED_DELAY).with_suggestions(chips::THANKS)
            }
            Intent::FreeTalk => {
                let text = self.deps.responder.free_text_reply(message).await;
                Reply::text(text, FREE_TALK_DELAY).with_suggestions(chips::FREE_TALK)
            }
        }
    }

    async fn handle_answer(&mut self, message: &str) -> Reply {
        match self.flow.answer(message) {
            Step::Rejected { question } => {
                self.log(
                    LogLevel::Info,
                    &format!("Validation failed for {}: {message}", question.field),
                )
                .await;
                question_reply(question, Some(replies::INVALID_PREFIX))
            }
            Step::Next { question } => question_reply(question, None),
            Step::Completed(record) => self.complete(record).await,
            Step::NotCollecting => {
                warn!("answer arrived while idle");
                Reply::text(fallback::DEFAULT_REPLY, CANNED_DELAY)
            }
        }
    }

    /// Persist, log and summarize a completed record. Each stage fails alone.
    async fn complete(&mut self, record: EventRecord) -> Reply {
        let saved = match self.deps.store.save(&record).await {
            Ok(stored) => {
                info!(event_id = %record.id, created_at = %stored.created_at, "event saved");
                self.log(LogLevel::Info, &format!("Event saved: {}", record.name))
                    .await;
                true
            }
            Err(e) => {
                error!(event_id = %record.id, error = %e, "failed to save event");
                self.log(LogLevel::Error, &format!("Error saving event: {e}"))
                    .await;
                false
            }
        };

        if let Err(e) = self.deps.activity.record_event(&record, "created").await {
            warn!(event_id = %record.id, error = %e, "failed to write event log");
        }

        let summary = self.deps.responder.completion_summary(&record).await;
        let mut reply = Reply::text(summary, SUMMARY_DELAY).with_suggestions(chips::COMPLETED);
        if !saved {
            reply.push(BotMessage::Text(replies::SAVE_FAILED_NOTICE.to_owned()));
        }

        let snapshot = serde_json::to_string(&record).unwrap_or_else(|_| record.name.clone());
        self.log(LogLevel::Info, &format!("Event created: {snapshot}"))
            .await;
        reply
    }

    async fn list_events(&self) -> Reply {
        match self.deps.store.list(self.recent_events_limit).await {
            Ok(events) if events.is_empty() => {
                Reply::text(replies::NO_EVENTS, CANNED_DELAY).with_suggestions(chips::NO_EVENTS)
            }
            Ok(events) => Reply::text(replies::format_event_list(&events), CANNED_DELAY)
                .with_suggestions(chips::EVENTS_LISTED),
            Err(e) => {
                error!(error = %e, "failed to list events");
                Reply::text(replies::EVENTS_UNAVAILABLE, CANNED_DELAY)
                    .with_suggestions(chips::NO_EVENTS)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Toolbar actions
    // -----------------------------------------------------------------------

    /// Export every event as a spreadsheet plus the detailed event log.
    pub async fn export_events(&mut self, exporter: &Exporter) -> Reply {
        let events = match self.deps.store.all().await {
            Ok(events) => events,
            Err(e) => {
                error!(error = %e, "failed to read events for export");
                return self.say(replies::EVENTS_UNAVAILABLE).await;
            }
        };
        if events.is_empty() {
            return self
                .say("You don't have any events to export yet. Create some events first!")
                .await;
        }

        let mut reply = match exporter.write_events(&events) {
            Ok(path) => Reply::text(
                format!(
                    "I've prepared a spreadsheet with all your events: {} 📊",
                    path.display()
                ),
                Default::default(),
            ),
            Err(e) => {
                error!(error = %e, "spreadsheet export failed");
                self.log(LogLevel::Error, &format!("Error exporting events: {e}"))
                    .await;
                Reply::text(
                    "I couldn't write the spreadsheet. Check the exports directory and try again.",
                    Default::default(),
                )
            }
        };

        if let Ok(blocks) = self.deps.activity.event_entries().await {
            if let Some(text) = format_event_log(&blocks) {
                match exporter.write_log("events", &text) {
                    Ok(path) => reply.push(BotMessage::Text(format!(
                        "I've also exported a detailed log file of all your event activities: {} 📝",
                        path.display()
                    ))),
                    Err(e) => warn!(error = %e, "event log export failed"),
                }
            }
        }

        self.record_reply(&reply).await;
        reply
    }

    /// Export the system log, or with `all` the system and event logs together.
    pub async fn export_logs(&mut self, exporter: &Exporter, all: bool) -> Reply {
        let system = self.deps.activity.entries().await.unwrap_or_default();
        let events = if all {
            self.deps.activity.event_entries().await.unwrap_or_default()
        } else {
            Vec::new()
        };
        if system.is_empty() && events.is_empty() {
            return self.say("There are no logs to export yet.").await;
        }

        let (stem, contents) = if all {
            ("all_logs", format_all_logs(&system, &events))
        } else {
            ("logs", format_system_log(&system))
        };
        match exporter.write_log(stem, &contents) {
            Ok(path) => {
                self.say(&format!(
                    "I've exported {} as a log file: {} 📝",
                    if all { "all logs" } else { "the system logs" },
                    path.display()
                ))
                .await
            }
            Err(e) => {
                error!(error = %e, "log export failed");
                self.say("I couldn't write the log file. Check the exports directory and try again.")
                    .await
            }
        }
    }

    /// Up to `days` day groups of history, most recent first. Empty on read failure.
    pub async fn history(&self, days: usize) -> Vec<DayGroup> {
        match self.deps.history.recent(days).await {
            Ok(groups) => groups,
            Err(e) => {
                warn!(error = %e, "failed to read history");
                Vec::new()
            }
        }
    }

    /// Drop conversation history.
    pub async fn clear_history(&mut self) -> Reply {
        if let Err(e) = self.deps.history.clear().await {
            error!(error = %e, "failed to clear history");
        }
        self.say("Chat history has been cleared. How can I help you today?")
            .await
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    async fn say(&self, text: &str) -> Reply {
        let reply = Reply::text(text, Default::default());
        self.record_reply(&reply).await;
        reply
    }

    async fn log(&self, level: LogLevel, message: &str) {
        if let Err(e) = self.deps.activity.log(level, message).await {
            warn!(error = %e, "failed to write activity log");
        }
    }

    async fn record_turn(&self, text: &str, sender: Sender) {
        if let Err(e) = self.deps.history.append(text, sender, Utc::now()).await {
            warn!(error = %e, sender = sender.as_str(), "failed to record conversation turn");
        }
    }

    async fn record_reply(&self, reply: &Reply) {
        for message in &reply.messages {
            self.record_turn(message.text(), Sender::Bot).await;
        }
    }
}

fn question_reply(question: Question, prefix: Option<&str>) -> Reply {
    let text = match prefix {
        Some(prefix) => format!("{prefix} {}", question.prompt),
        None => question.prompt.to_owned(),
    };
    let mut reply = Reply::text(text, CANNED_DELAY);
    reply.push(BotMessage::Example(question.example.to_owned()));
    reply
}
