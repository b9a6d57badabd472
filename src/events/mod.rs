//! Event records collected by the question flow.
//!
//! An [`EventDraft`] starts with every field unset and is filled one field at
//! a time in [`EventField::ALL`] order. Only a draft whose six fields have all
//! passed their validators converts into an [`EventRecord`], which is what
//! the [`store::EventStore`] persists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod store;
pub mod validate;

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

/// One of the six fields of an event, in question order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventField {
    /// Human-readable event name.
    Name,
    /// Short identifier.
    Id,
    /// Timezone label.
    Timezone,
    /// Date and time.
    Date,
    /// Venue.
    Location,
    /// Free-form description.
    Description,
}

impl EventField {
    /// All fields in the order they are asked.
    pub const ALL: [EventField; 6] = [
        Self::Name,
        Self::Id,
        Self::Timezone,
        Self::Date,
        Self::Location,
        Self::Description,
    ];

    /// Zero-based position in the question schedule.
    pub fn position(self) -> usize {
        match self {
            Self::Name => 0,
            Self::Id => 1,
            Self::Timezone => 2,
            Self::Date => 3,
            Self::Location => 4,
            Self::Description => 5,
        }
    }

    /// Lowercase field key, as used in log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Id => "id",
            Self::Timezone => "timezone",
            Self::Date => "date",
            Self::Location => "location",
            Self::Description => "description",
        }
    }

    /// Spreadsheet column header.
    pub fn column(self) -> &'static str {
        match self {
            Self::Name => "Event Name",
            Self::Id => "Event ID",
            Self::Timezone => "Timezone",
            Self::Date => "Date",
            Self::Location => "Location",
            Self::Description => "Description",
        }
    }

    /// Whether `value` satisfies this field's rule.
    pub fn validate(self, value: &str) -> bool {
        match self {
            Self::Name => validate::is_valid_name(value),
            Self::Id => validate::is_valid_id(value),
            Self::Timezone => validate::is_valid_timezone(value),
            Self::Date => validate::is_valid_date(value),
            Self::Location => validate::is_valid_location(value),
            Self::Description => validate::is_valid_description(value),
        }
    }
}

impl std::fmt::Display for EventField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Draft and record
// ---------------------------------------------------------------------------

/// A partially filled event. Owned by the question flow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventDraft {
    values: [Option<String>; 6],
}

impl EventDraft {
    /// Create a draft with every field unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Value stored for `field`, if answered.
    pub fn get(&self, field: EventField) -> Option<&str> {
        self.values
            .get(field.position())
            .and_then(|slot| slot.as_deref())
    }

    /// Store an already validated answer.
    pub fn set(&mut self, field: EventField, value: String) {
        if let Some(slot) = self.values.get_mut(field.position()) {
            *slot = Some(value);
        }
    }

    /// True when no field has been answered.
    pub fn is_empty(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }

    /// Convert into a record once all six fields are present.
    ///
    /// # Errors
    ///
    /// Returns the first unanswered field.
    pub fn complete(&self) -> Result<EventRecord, EventField> {
        let value = |field: EventField| self.get(field).map(str::to_owned).ok_or(field);
        Ok(EventRecord {
            name: value(EventField::Name)?,
            id: value(EventField::Id)?,
            timezone: value(EventField::Timezone)?,
            date: value(EventField::Date)?,
            location: value(EventField::Location)?,
            description: value(EventField::Description)?,
        })
    }
}

/// A fully validated event.
///
/// Serialized with the spreadsheet column names so stored documents and
/// exports share one vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Event name.
    #[serde(rename = "Event Name")]
    pub name: String,
    /// Event identifier.
    #[serde(rename = "Event ID")]
    pub id: String,
    /// Timezone label.
    #[serde(rename = "Timezone")]
    pub timezone: String,
    /// Date and time as typed by the user.
    #[serde(rename = "Date")]
    pub date: String,
    /// Venue.
    #[serde(rename = "Location")]
    pub location: String,
    /// Description.
    #[serde(rename = "Description")]
    pub description: String,
}

impl EventRecord {
    /// Value of a single field.
    pub fn value(&self, field: EventField) -> &str {
        match field {
            EventField::Name => &self.name,
            EventField::Id => &self.id,
            EventField::Timezone => &self.timezone,
            EventField::Date => &self.date,
            EventField::Location => &self.location,
            EventField::Description => &self.description,
        }
    }
}

/// A persisted event with its creation timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEvent {
    /// The six collected fields.
    #[serde(flatten)]
    pub record: EventRecord,
    /// When the store accepted the record.
    #[serde(rename = "Created At")]
    pub created_at: DateTime<Utc>,
}
