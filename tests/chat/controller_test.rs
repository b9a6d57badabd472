//! Chat controller coverage with in-memory collaborators.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use eventmanager::activity::{ActivityLog, ActivityLogger, LogLevel};
use eventmanager::chat::replies::{self, chips};
use eventmanager::chat::{BotMessage, ChatController, Collaborators, CANNED_DELAY, SUMMARY_DELAY};
use eventmanager::events::store::{EventStore, KvEventStore};
use eventmanager::events::{EventRecord, StoredEvent};
use eventmanager::export::Exporter;
use eventmanager::history::{ChatHistory, ConversationLog, Sender};
use eventmanager::intent::KeywordClassifier;
use eventmanager::providers::{GenerationRequest, ProviderError, TextGenerator};
use eventmanager::responder::{OfflineResponder, RemoteResponder, ResponseGenerator};
use eventmanager::storage::memory::MemoryStore;
use eventmanager::storage::{KeyValueStore, StorageError};

const TECH_CONF: [&str; 6] = [
    "Tech Conf",
    "TECH-01",
    "UTC",
    "2023-12-15 14:30",
    "Main Hall",
    "A gathering of engineers",
];

struct Harness {
    controller: ChatController,
    store: Arc<dyn EventStore>,
    history: Arc<dyn ConversationLog>,
    activity: Arc<dyn ActivityLog>,
}

fn harness_with(
    store: Option<Arc<dyn EventStore>>,
    responder: Arc<dyn ResponseGenerator>,
) -> Harness {
    let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let store =
        store.unwrap_or_else(|| Arc::new(KvEventStore::new(Arc::clone(&kv))) as Arc<dyn EventStore>);
    let history: Arc<dyn ConversationLog> = Arc::new(ChatHistory::new(Arc::clone(&kv)));
    let activity: Arc<dyn ActivityLog> = Arc::new(ActivityLogger::new(kv, 1000, 50));

    let controller = ChatController::new(
        Collaborators {
            classifier: Arc::new(KeywordClassifier),
            store: Arc::clone(&store),
            history: Arc::clone(&history),
            activity: Arc::clone(&activity),
            responder,
        },
        10,
    );
    Harness {
        controller,
        store,
        history,
        activity,
    }
}

fn harness() -> Harness {
    harness_with(None, Arc::new(OfflineResponder))
}

/// Generator that always fails, standing in for an unreachable endpoint.
struct DownGenerator;

#[async_trait]
impl TextGenerator for DownGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String, ProviderError> {
        Err(ProviderError::NoText("model is loading".to_owned()))
    }

    fn endpoint(&self) -> &str {
        "http://127.0.0.1:9/down"
    }
}

/// Event store whose writes always fail.
struct BrokenStore;

#[async_trait]
impl EventStore for BrokenStore {
    async fn save(&self, _record: &EventRecord) -> Result<StoredEvent, StorageError> {
        Err(StorageError::Unavailable("quota exceeded".to_owned()))
    }

    async fn list(&self, _limit: usize) -> Result<Vec<StoredEvent>, StorageError> {
        Err(StorageError::Unavailable("quota exceeded".to_owned()))
    }

    async fn all(&self) -> Result<Vec<StoredEvent>, StorageError> {
        Err(StorageError::Unavailable("quota exceeded".to_owned()))
    }

    async fn clear(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

async fn send(controller: &mut ChatController, text: &str) -> eventmanager::chat::Reply {
    match controller.handle_input(text).await {
        Some(reply) => reply,
        None => panic!("input {text:?} should produce a reply"),
    }
}

async fn create_tech_conf(controller: &mut ChatController) -> eventmanager::chat::Reply {
    send(controller, "I want to create an event").await;
    for answer in &TECH_CONF[..5] {
        send(controller, answer).await;
    }
    send(controller, TECH_CONF[5]).await
}

#[tokio::test]
async fn blank_input_is_ignored() {
    let mut h = harness();
    assert!(h.controller.handle_input("   ").await.is_none());
    let groups = h.history.recent(7).await.expect("history readable");
    assert!(groups.is_empty());
}

#[tokio::test]
async fn welcome_offers_opening_chips() {
    let h = harness();
    let reply = h.controller.welcome();
    assert!(reply.messages.is_empty());
    assert_eq!(reply.suggestions, chips::WELCOME);
}

#[tokio::test]
async fn start_intent_asks_first_question_with_example() {
    let mut h = harness();
    let reply = send(&mut h.controller, "Create a new event").await;
    assert_eq!(reply.messages.len(), 2);
    assert_eq!(reply.messages[0].text(), "What is the name of your event?");
    assert!(matches!(reply.messages[1], BotMessage::Example(_)));
    assert_eq!(reply.typing, CANNED_DELAY);
    assert!(h.controller.flow().is_collecting());
}

#[tokio::test]
async fn invalid_answer_is_reasked_and_logged() {
    let mut h = harness();
    send(&mut h.controller, "create an event").await;
    let reply = send(&mut h.controller, "ab").await;

    assert!(reply.messages[0].text().starts_with(replies::INVALID_PREFIX));
    assert!(reply.messages[0]
        .text()
        .ends_with("What is the name of your event?"));
    assert_eq!(h.controller.flow().pending_index(), 1);

    let entries = h.activity.entries().await.expect("logs readable");
    assert!(entries
        .iter()
        .any(|e| e.level == LogLevel::Info && e.message == "Validation failed for name: ab"));
}

#[tokio::test]
async fn tech_conf_completion_saves_once_and_logs_once() {
    let responder = Arc::new(RemoteResponder::new(
        Arc::new(DownGenerator),
        Arc::new(DownGenerator),
        Duration::from_secs(1),
    ));
    let mut h = harness_with(None, responder);

    let reply = create_tech_conf(&mut h.controller).await;

    assert!(!reply.joined().trim().is_empty());
    assert!(reply.joined().contains("EVENT CREATED SUCCESSFULLY"));
    assert_eq!(reply.typing, SUMMARY_DELAY);
    assert_eq!(reply.suggestions, chips::COMPLETED);
    assert!(!h.controller.flow().is_collecting());
    assert!(h.controller.flow().draft().is_empty());

    let stored = h.store.all().await.expect("events readable");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].record.name, "Tech Conf");
    assert_eq!(stored[0].record.description, "A gathering of engineers");

    let entries = h.activity.entries().await.expect("logs readable");
    let event_lines: Vec<_> = entries
        .iter()
        .filter(|e| e.level == LogLevel::Event)
        .collect();
    assert_eq!(event_lines.len(), 1);
    assert_eq!(event_lines[0].message, "Event created: Tech Conf (ID: TECH-01)");

    let blocks = h.activity.event_entries().await.expect("event logs readable");
    assert_eq!(blocks.len(), 1);
}

#[tokio::test]
async fn save_failure_still_shows_summary_with_notice() {
    let mut h = harness_with(Some(Arc::new(BrokenStore)), Arc::new(OfflineResponder));

    let reply = create_tech_conf(&mut h.controller).await;

    assert!(reply.messages[0].text().contains("EVENT CREATED SUCCESSFULLY"));
    assert_eq!(
        reply.messages.last().map(BotMessage::text),
        Some(replies::SAVE_FAILED_NOTICE)
    );
    let entries = h.activity.entries().await.expect("logs readable");
    assert!(entries
        .iter()
        .any(|e| e.level == LogLevel::Error && e.message.starts_with("Error saving event")));
    assert!(!h.controller.flow().is_collecting());
}

#[tokio::test]
async fn view_events_lists_newest_first() {
    let mut h = harness();
    create_tech_conf(&mut h.controller).await;

    let reply = send(&mut h.controller, "show my events").await;
    let text = reply.joined();
    assert!(text.starts_with("Here are your recently created events:"));
    assert!(text.contains("📅 Tech Conf (ID: TECH-01)"));
    assert!(text.ends_with("Total events: 1"));
    assert_eq!(reply.suggestions, chips::EVENTS_LISTED);
}

#[tokio::test]
async fn view_events_when_empty() {
    let mut h = harness();
    let reply = send(&mut h.controller, "show my events").await;
    assert_eq!(reply.joined(), replies::NO_EVENTS);
}

#[tokio::test]
async fn view_events_when_store_fails() {
    let mut h = harness_with(Some(Arc::new(BrokenStore)), Arc::new(OfflineResponder));
    let reply = send(&mut h.controller, "view events").await;
    assert_eq!(reply.joined(), replies::EVENTS_UNAVAILABLE);
}

#[tokio::test]
async fn canned_intents_reply_with_their_chips() {
    let mut h = harness();

    let greet = send(&mut h.controller, "hello").await;
    assert_eq!(greet.joined(), replies::GREETING);
    assert_eq!(greet.suggestions, chips::GREET);

    let explain = send(&mut h.controller, "how does it work?").await;
    assert_eq!(explain.joined(), replies::EXPLANATION);

    let thanks = send(&mut h.controller, "much appreciated, thank you").await;
    assert_eq!(thanks.joined(), replies::THANKS);
}

#[tokio::test]
async fn free_talk_uses_fallback_when_remote_is_down() {
    let responder = Arc::new(RemoteResponder::new(
        Arc::new(DownGenerator),
        Arc::new(DownGenerator),
        Duration::from_secs(1),
    ));
    let mut h = harness_with(None, responder);
    let reply = send(&mut h.controller, "what's the weather like").await;
    assert!(!reply.joined().is_empty());
    assert_eq!(reply.suggestions, chips::FREE_TALK);
}

#[tokio::test]
async fn answers_are_not_classified_mid_flow() {
    let mut h = harness();
    send(&mut h.controller, "create an event").await;
    send(&mut h.controller, "Show my events").await;
    assert_eq!(
        h.controller.flow().draft().get(eventmanager::events::EventField::Name),
        Some("Show my events")
    );
}

#[tokio::test]
async fn turns_are_recorded_in_history() {
    let mut h = harness();
    send(&mut h.controller, "hello").await;

    let groups = h.history.recent(7).await.expect("history readable");
    assert_eq!(groups.len(), 1);
    let senders: Vec<Sender> = groups[0].messages.iter().map(|m| m.sender).collect();
    assert_eq!(senders, vec![Sender::User, Sender::Bot]);
    assert_eq!(groups[0].messages[0].text, "hello");
}

#[tokio::test]
async fn clear_history_empties_the_log() {
    let mut h = harness();
    send(&mut h.controller, "hello").await;
    let reply = h.controller.clear_history().await;
    assert!(reply.joined().starts_with("Chat history has been cleared."));

    let groups = h.history.recent(7).await.expect("history readable");
    // Only the confirmation itself remains.
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].messages.len(), 1);
}

#[tokio::test]
async fn export_without_events_says_so() {
    let mut h = harness();
    let dir = tempfile::tempdir().expect("temp dir");
    let exporter = Exporter::new(dir.path());
    let reply = h.controller.export_events(&exporter).await;
    assert!(reply.joined().starts_with("You don't have any events to export yet."));
    assert!(!dir.path().join(eventmanager::export::EVENTS_FILE).exists());
}

#[tokio::test]
async fn export_writes_spreadsheet_and_event_log() {
    let mut h = harness();
    create_tech_conf(&mut h.controller).await;

    let dir = tempfile::tempdir().expect("temp dir");
    let exporter = Exporter::new(dir.path());
    let reply = h.controller.export_events(&exporter).await;
    assert_eq!(reply.messages.len(), 2);

    let csv = std::fs::read_to_string(dir.path().join(eventmanager::export::EVENTS_FILE))
        .expect("spreadsheet written");
    assert!(csv.starts_with("Event Name,Event ID,Timezone,Date,Location,Description,Created At"));
    assert!(csv.contains("Tech Conf,TECH-01,UTC,2023-12-15 14:30,Main Hall,A gathering of engineers"));

    let logs: Vec<_> = std::fs::read_dir(dir.path())
        .expect("dir readable")
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().starts_with("eventmanager_events_"))
        .collect();
    assert_eq!(logs.len(), 1);
}

#[tokio::test]
async fn export_logs_writes_combined_file() {
    let mut h = harness();
    create_tech_conf(&mut h.controller).await;

    let dir = tempfile::tempdir().expect("temp dir");
    let exporter = Exporter::new(dir.path());
    let reply = h.controller.export_logs(&exporter, true).await;
    assert!(reply.joined().starts_with("I've exported all logs"));

    let file = std::fs::read_dir(dir.path())
        .expect("dir readable")
        .filter_map(Result::ok)
        .find(|e| e.file_name().to_string_lossy().starts_with("eventmanager_all_logs_"))
        .expect("combined log written");
    let text = std::fs::read_to_string(file.path()).expect("log readable");
    assert!(text.contains("=== SYSTEM LOGS ==="));
    assert!(text.contains("=== EVENT LOGS ==="));
    assert!(text.contains("EVENT CREATED"));
}
