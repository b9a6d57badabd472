//! Canned bot text and suggestion chips.

use crate::events::StoredEvent;

/// Greeting reply.
pub const GREETING: &str =
    "Hello there! 👋 I'm EventManager, your event planning assistant. How can I help you today?";

/// Help reply.
pub const HELP: &str = "I can help you create and manage events! Just say something like 'I want to create an event' and I'll guide you through the process. 🎉";

/// Thanks reply.
pub const THANKS: &str = "You're welcome! 😊 Is there anything else I can help you with?";

/// Shown when "show my events" finds nothing.
pub const NO_EVENTS: &str =
    "You haven't created any events yet. Would you like to create one now?";

/// Shown when the event list cannot be read.
pub const EVENTS_UNAVAILABLE: &str =
    "I couldn't load your events right now. Please try again in a moment.";

/// Appended after the summary when the record could not be stored.
pub const SAVE_FAILED_NOTICE: &str = "⚠️ Heads up: I couldn't save this event to storage, so it won't appear in your event list or exports. Please try creating it again.";

/// Prefix for a re-asked question.
pub const INVALID_PREFIX: &str = "I'm sorry, that doesn't seem valid.";

/// How-it-works explanation.
pub const EXPLANATION: &str = "Sure! Here's how I can help you create and manage events:

1. To create an event, just say \"Create an event\" or similar
2. I'll ask you for details like:
   - Event name
   - Event ID
   - Timezone
   - Date and time
   - Location
   - Description

3. After collecting all details, I'll generate a comprehensive event summary with step-by-step instructions for triggering the event
4. Your event will be saved and can be exported as a spreadsheet
5. You can view all your events anytime by saying \"Show my events\"

Would you like to create an event now? 🎉";

/// Suggestion chips per reply kind.
pub mod chips {
    /// Shown when the conversation opens.
    pub const WELCOME: &[&str] = &[
        "Create a new event",
        "How does this work?",
        "Show my recent events",
    ];
    /// After a greeting.
    pub const GREET: &[&str] = &["Create a new event", "How does this work?", "Show my events"];
    /// After help.
    pub const HELP: &[&str] = &["Create a new event", "What information do you need?"];
    /// After thanks.
    pub const THANKS: &[&str] = &["Create another event", "No, that's all"];
    /// After the explanation.
    pub const EXPLAIN: &[&str] = &["Create an event", "View my events"];
    /// After listing events.
    pub const EVENTS_LISTED: &[&str] = &["Create another event", "How does it work?"];
    /// When no events exist.
    pub const NO_EVENTS: &[&str] = &["Create an event", "How does it work?"];
    /// After a free-text reply.
    pub const FREE_TALK: &[&str] = &["Create an event", "How does this work?"];
    /// After an event is created.
    pub const COMPLETED: &[&str] = &["Create another event", "View my events", "No, thanks"];
}

/// Render stored events as a chat message.
pub fn format_event_list(events: &[StoredEvent]) -> String {
    let mut out = String::from("Here are your recently created events:\n\n");
    for event in events {
        let r = &event.record;
        out.push_str(&format!("📅 {} (ID: {})\n", r.name, r.id));
        out.push_str(&format!("   ⏰ Date: {}\n", r.date));
        out.push_str(&format!("   🌐 Timezone: {}\n", r.timezone));
        out.push_str(&format!("   📍 Location: {}\n", r.location));
        out.push_str(&format!("   📝 Description: {}\n\n", r.description));
    }
    out.push_str(&format!("Total events: {}", events.len()));
    out
}
