//! Prompt templates sent to the summary endpoint.

use crate::events::{EventField, EventRecord};

/// Confirmation prompt with `{name}` ... `{description}` placeholders.
pub const COMPLETION_PROMPT: &str = "Based on the following event details, generate a friendly and comprehensive confirmation message:

Event Name: {name}
Event ID: {id}
Timezone: {timezone}
Date: {date}
Location: {location}
Description: {description}

Your response should:
1. Thank the user for creating the event
2. Summarize all the event details in a clear, organized way
3. Add a positive, encouraging closing statement
4. Use emojis where appropriate to make it engaging
5. Offer assistance with anything else they might need";

/// Fill [`COMPLETION_PROMPT`] from a record; empty values read `Not provided`.
pub fn completion_prompt(record: &EventRecord) -> String {
    EventField::ALL
        .iter()
        .fold(COMPLETION_PROMPT.to_owned(), |prompt, field| {
            let value = record.value(*field);
            let shown = if value.trim().is_empty() {
                "Not provided"
            } else {
                value
            };
            prompt.replace(&format!("{{{}}}", field.as_str()), shown)
        })
}
