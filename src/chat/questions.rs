//! The fixed six-question schedule.

use crate::events::EventField;

/// A question asked for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Question {
    /// Field the answer fills.
    pub field: EventField,
    /// Question text.
    pub prompt: &'static str,
    /// Example answers shown below the question.
    pub example: &'static str,
}

/// The question for `field`.
pub fn question(field: EventField) -> Question {
    let (prompt, example) = match field {
        EventField::Name => (
            "What is the name of your event?",
            "e.g., Annual Tech Conference, Product Launch Party",
        ),
        EventField::Id => (
            "Please provide an event ID:",
            "e.g., TECH-2023, PROD-LAUNCH-Q4",
        ),
        EventField::Timezone => (
            "What timezone will the event be in?",
            "e.g., UTC, EST, PST, GMT+5:30",
        ),
        EventField::Date => (
            "When is the event? (Please provide date and time)",
            "e.g., 2023-12-15 14:30, December 15, 2023 at 2:30 PM",
        ),
        EventField::Location => (
            "Where will the event take place?",
            "e.g., Convention Center, Virtual Meeting, Office Building",
        ),
        EventField::Description => (
            "Could you describe the event?",
            "e.g., A conference for tech enthusiasts with keynote speakers and workshops",
        ),
    };
    Question {
        field,
        prompt,
        example,
    }
}

/// All six questions in asking order.
pub fn schedule() -> [Question; 6] {
    EventField::ALL.map(question)
}
