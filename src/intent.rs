//! Keyword intent classification.
//!
//! Matching is plain substring search over the lowercased input. When several
//! intents match, the first in [`Intent::PRIORITY`] wins, so
//! "create a new event and view events" starts a new event.

/// What the user wants from a line of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    /// Begin the six-question flow.
    StartEvent,
    /// List stored events.
    ViewEvents,
    /// Explain how the assistant works.
    Explain,
    /// Say hello.
    Greet,
    /// Ask for help.
    Help,
    /// Say thanks.
    Thanks,
    /// Anything else; answered by the response generator.
    FreeTalk,
}

impl Intent {
    /// Evaluation order; the first matching intent wins.
    pub const PRIORITY: [Intent; 7] = [
        Self::StartEvent,
        Self::ViewEvents,
        Self::Explain,
        Self::Greet,
        Self::Help,
        Self::Thanks,
        Self::FreeTalk,
    ];

    /// Snake-case name for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StartEvent => "start_event",
            Self::ViewEvents => "view_events",
            Self::Explain => "explain",
            Self::Greet => "greet",
            Self::Help => "help",
            Self::Thanks => "thanks",
            Self::FreeTalk => "free_talk",
        }
    }

    /// Whether already-lowercased `text` carries this intent's keywords.
    fn matches(self, text: &str) -> bool {
        let has = |needle: &str| text.contains(needle);
        match self {
            Self::StartEvent => {
                (has("create") && has("event"))
                    || has("new event")
                    || has("make event")
                    || has("trigger event")
            }
            Self::ViewEvents => {
                (has("view") && has("event"))
                    || (has("show") && has("event"))
                    || has("my event")
                    || has("list event")
                    || has("recent event")
            }
            Self::Explain => (has("how") && has("work")) || has("what can you do") || has("explain"),
            Self::Greet => has("hello") || has("hi") || has("hey") || has("greeting"),
            Self::Help => has("help") || has("how does this work"),
            Self::Thanks => has("thank") || has("thanks"),
            Self::FreeTalk => true,
        }
    }
}

/// Maps raw text to an [`Intent`].
pub trait IntentClassifier: Send + Sync {
    /// Classify one line of user input.
    fn classify(&self, text: &str) -> Intent;
}

/// The keyword-set classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl IntentClassifier for KeywordClassifier {
    fn classify(&self, text: &str) -> Intent {
        classify(text)
    }
}

/// Classify `text` with the fixed keyword sets and priority order.
pub fn classify(text: &str) -> Intent {
    let lowered = text.to_lowercase();
    Intent::PRIORITY
        .into_iter()
        .find(|intent| intent.matches(&lowered))
        .unwrap_or(Intent::FreeTalk)
}
