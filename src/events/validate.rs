//! Per-field answer rules.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;

static ID_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").ok());

static TIMEZONE_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9/_+:-]+$").ok());

static DATE_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2}$").ok());

static WEEKDAY_PREFIX: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)^(mon|tue|wed|thu|fri|sat|sun)[a-z]*\.?\s+").ok()
});

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %I:%M %p",
    "%Y-%m-%d %I:%M%p",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M %p",
    "%B %d %Y %I:%M %p",
    "%B %d %Y %I:%M%p",
    "%B %d %Y %I %p",
    "%B %d %Y %H:%M",
    "%B %d %Y %H:%M:%S",
    "%d %B %Y %I:%M %p",
    "%d %B %Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%B %d %Y", "%d %B %Y"];

fn matches(pattern: &LazyLock<Option<Regex>>, value: &str) -> bool {
    pattern.as_ref().is_some_and(|re| re.is_match(value))
}

/// Name: at least 3 characters.
pub fn is_valid_name(value: &str) -> bool {
    value.chars().count() >= 3
}

/// Id: letters, digits, `_` and `-` only.
pub fn is_valid_id(value: &str) -> bool {
    matches(&ID_PATTERN, value)
}

/// Timezone: letters, digits and `/ _ + : -` only.
pub fn is_valid_timezone(value: &str) -> bool {
    matches(&TIMEZONE_PATTERN, value)
}

/// Date: `YYYY-MM-DD HH:MM` or anything [`parse_date_time`] understands.
pub fn is_valid_date(value: &str) -> bool {
    matches(&DATE_PATTERN, value) || parse_date_time(value).is_some()
}

/// Location: at least 3 characters.
pub fn is_valid_location(value: &str) -> bool {
    value.chars().count() >= 3
}

/// Description: at least 10 characters.
pub fn is_valid_description(value: &str) -> bool {
    value.chars().count() >= 10
}

/// Parse the date-time shapes people type into a chat box.
///
/// Accepts RFC 3339, RFC 2822, ISO dates with optional time, US numeric
/// dates, and long-form month names with optional weekday, commas, `at` and
/// 12- or 24-hour times. Date-only inputs resolve to midnight.
pub fn parse_date_time(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt.naive_utc());
    }

    let normalized = normalize(trimmed);
    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&normalized, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(&normalized, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Drop weekday, commas and a connecting "at"; collapse whitespace.
fn normalize(value: &str) -> String {
    let without_commas = value.replace(',', " ");
    let without_weekday = match WEEKDAY_PREFIX.as_ref() {
        Some(re) => re.replace(&without_commas, "").into_owned(),
        None => without_commas,
    };
    without_weekday
        .split_whitespace()
        .filter(|word| !word.eq_ignore_ascii_case("at"))
        .collect::<Vec<_>>()
        .join(" ")
}
