//! Event records built from resolved rows

use crate::corrections::detect_dances;
use crate::extract::FieldSet;
use crate::locale::Locale;
use chrono::{DateTime, Datelike, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DATE_TEXT_FORMAT: &str = "%d/%m/%Y";
pub const TIME_TEXT_FORMAT: &str = "%H:%M";

/// One extracted calendar event.
///
/// Two events are equal when start, end and description match; the other
/// fields are derived or informational.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    /// Weekday of `start`, capitalized in the planning's locale
    pub day_label: String,
    pub description: String,
    pub location: String,
    pub dances: Vec<String>,
    /// Words of the recognized line the event came from
    pub source_fragments: Vec<String>,
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start && self.end == other.end && self.description == other.description
    }
}

impl Eq for Event {}

/// Storage-ready projection of an [`Event`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub day: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub description: String,
    pub location: String,
    pub dances: Vec<String>,
    /// JSON array of the source line's words
    pub raw: String,
}

impl Event {
    /// Assemble an event from a row's fields and its resolved times
    pub fn assemble(
        fields: &FieldSet,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
        locale: &Locale,
        source_fragments: Vec<String>,
    ) -> Self {
        Self {
            day_label: locale.day_label(start.weekday()),
            dances: detect_dances(&fields.description),
            description: fields.description.clone(),
            location: String::new(),
            source_fragments,
            start,
            end,
        }
    }

    /// Structural projection handed to storage
    #[must_use]
    pub fn record(&self) -> EventRecord {
        EventRecord {
            day: self.day_label.clone(),
            start: self.start,
            end: self.end,
            description: self.description.clone(),
            location: self.location.clone(),
            dances: self.dances.clone(),
            raw: serde_json::to_string(&self.source_fragments).unwrap_or_default(),
        }
    }

    /// `dd/MM/yyyy HH:mm-HH:mm | description`
    #[must_use]
    pub fn short_infos(&self) -> String {
        format!(
            "{} {}-{} | {}",
            self.start.format(DATE_TEXT_FORMAT),
            self.start.format(TIME_TEXT_FORMAT),
            self.end.format(TIME_TEXT_FORMAT),
            self.description
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.day_label, self.short_infos())
    }
}

impl EventRecord {
    /// Same summary as [`Event::short_infos`]
    #[must_use]
    pub fn short_infos(&self) -> String {
        format!(
            "{} {}-{} | {}",
            self.start.format(DATE_TEXT_FORMAT),
            self.start.format(TIME_TEXT_FORMAT),
            self.end.format(TIME_TEXT_FORMAT),
            self.description
        )
    }
}
