//! Deterministic replies used whenever the remote generator is unavailable.
//!
//! Everything here is a pure function of its input so the offline path can
//! be tested without a network.

use crate::events::EventRecord;

/// Default steer-to-events line.
pub const DEFAULT_REPLY: &str =
    "I'm here to help you manage events. You can say something like 'I want to create an event' to get started!";

/// Canned reply to a free-text message.
pub fn fallback_reply(message: &str) -> String {
    let lower = message.to_lowercase();
    let has = |needle: &str| lower.contains(needle);

    let reply = if has("hello") || has("hi") || has("hey") {
        "Hello! I'm EventManager, your event planning assistant. How can I help you today?"
    } else if has("event") && has("create") {
        "I'd be happy to help you create an event! Let me ask you a few questions to get started."
    } else if has("thank") {
        "You're welcome! Is there anything else I can help you with today?"
    } else if has("how") && has("work") {
        "I help you create and manage events! Just tell me you want to create an event, and I'll guide you through the process step by step. I'll ask for details like event name, ID, timezone, date, location, and description. Once I have all the information, I'll create a comprehensive event plan with detailed triggering instructions for you!"
    } else if (has("view") || has("show")) && has("event") {
        "I can show you your created events. Let me check what events you have..."
    } else {
        DEFAULT_REPLY
    };
    reply.to_owned()
}

fn any_of(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| text.contains(n))
}

/// Short phrase describing what the event is for.
pub fn event_purpose(description: &str) -> &'static str {
    let d = description.to_lowercase();
    if any_of(&d, &["conference", "meeting"]) {
        "knowledge sharing and networking"
    } else if any_of(&d, &["training", "workshop"]) {
        "skill development and education"
    } else if any_of(&d, &["party", "celebration"]) {
        "celebration and social connection"
    } else if any_of(&d, &["product", "launch"]) {
        "product introduction and market engagement"
    } else {
        "achieving specific goals through organized activities"
    }
}

fn objectives(description: &str) -> [&'static str; 3] {
    let d = description.to_lowercase();
    let first = if any_of(&d, &["network", "connect"]) {
        "Facilitating meaningful connections between participants"
    } else if any_of(&d, &["learn", "education"]) {
        "Providing valuable learning experiences and knowledge transfer"
    } else if any_of(&d, &["celebrate", "social"]) {
        "Creating enjoyable experiences and strengthening relationships"
    } else {
        "Achieving the primary goals outlined in your event description"
    };
    let second = if any_of(&d, &["discuss", "idea"]) {
        "Generating new ideas and solutions through collaborative discussion"
    } else if any_of(&d, &["demonstrate", "showcase"]) {
        "Effectively presenting products, services, or concepts"
    } else {
        "Ensuring smooth execution and positive participant experience"
    };
    [
        first,
        second,
        "Creating lasting value and measurable results from the event",
    ]
}

fn outcomes(description: &str) -> [&'static str; 3] {
    let d = description.to_lowercase();
    let first = if any_of(&d, &["technical", "technology"]) {
        "Enhanced understanding of technical concepts and applications"
    } else if any_of(&d, &["business", "professional"]) {
        "Improved professional capabilities and business insights"
    } else {
        "Meaningful engagement with the event content and other participants"
    };
    let second = if any_of(&d, &["community", "team"]) {
        "Stronger community bonds and team cohesion"
    } else {
        "Practical knowledge or skills they can apply after the event"
    };
    [
        first,
        second,
        "Positive overall experience that meets or exceeds expectations",
    ]
}

/// Venue advice keyed on the location text.
pub fn venue_considerations(location: &str) -> &'static str {
    let l = location.to_lowercase();
    if any_of(&l, &["virtual", "online"]) {
        "Ensure all participants have the necessary technology and access information"
    } else if any_of(&l, &["office", "building"]) {
        "Coordinate with facility management for access and setup requirements"
    } else {
        "Confirm all logistics with the venue management including setup times and equipment"
    }
}

/// Full confirmation and execution plan for a completed record.
pub fn fallback_summary(record: &EventRecord) -> String {
    let EventRecord {
        name,
        id,
        timezone,
        date,
        location,
        description,
    } = record;
    let [objective1, objective2, objective3] = objectives(description);
    let [outcome1, outcome2, outcome3] = outcomes(description);
    let purpose = event_purpose(description);
    let venue = venue_considerations(location);

    format!(
        "🎉 **EVENT CREATED SUCCESSFULLY!**

I've created your event based on all the details you provided. Here's a comprehensive summary:

## 📋 EVENT OVERVIEW
**Event Name:** {name}
**Event ID:** {id}
**Date & Time:** {date} (Timezone: {timezone})
**Location:** {location}

## 🎯 EVENT PURPOSE & OBJECTIVES
Based on your description \"{description}\", this event appears to be focused on {purpose}. The primary objectives likely include:
- {objective1}
- {objective2}
- {objective3}

## 📝 DETAILED EXECUTION PLAN

### Pre-Event Preparation (1-2 Weeks Before)
1. **Finalize Logistics:** Confirm {location} booking and setup requirements
2. **Participant Communication:** Send detailed invitations with event ID {id}
3. **Timezone Coordination:** Ensure all participants in {timezone} are aware of the timing
4. **Material Preparation:** Develop resources specific to \"{name}\"

### Event Day Execution
1. **Setup (2-3 Hours Before):** Arrive at {location} to prepare the venue
2. **Registration:** Use event ID {id} for participant check-in
3. **Event Flow:** Follow the agenda based on {date} schedule
4. **Engagement:** Implement activities as described: {description}

### Post-Event Activities (Within 1 Week)
1. **Feedback Collection:** Gather participant insights
2. **Follow-up Communication:** Share resources and next steps
3. **Success Measurement:** Evaluate against event objectives
4. **Documentation:** Archive materials for future reference

## 🎪 EXPECTED OUTCOMES
Based on your event description, participants should experience:
- {outcome1}
- {outcome2}
- {outcome3}

## ⚠️ SPECIAL CONSIDERATIONS
- **Timezone Awareness:** All timing references should be clearly marked as {timezone}
- **Venue Specifics:** {venue}
- **Content Focus:** Ensure all activities align with: {description}

## ✅ CONCLUSION
Your event \"{name}\" has been successfully planned and is ready for execution. The event ID {id} will help you track all related activities and communications.

Remember to:
- Double-check all timing references for {timezone}
- Confirm final details with {location}
- Keep your event description in mind: \"{description}\"

Let me know if you need any adjustments or additional planning assistance!"
    )
}
