//! Ordered collection of unique events for one run

use crate::event::Event;
use serde::Serialize;
use tracing::warn;

/// Append-only, insertion-ordered set of events.
///
/// Owned by the caller and passed to the parser explicitly.
#[derive(Debug, Default, Clone, Serialize)]
pub struct Planning {
    events: Vec<Event>,
}

impl Planning {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an event unless an equal one is already present.
    ///
    /// Returns whether the event was inserted; a duplicate is not an error.
    pub fn add(&mut self, event: Event) -> bool {
        if self.events.contains(&event) {
            warn!("Event already exists: {}", event.short_infos());
            return false;
        }
        self.events.push(event);
        true
    }

    /// Add each event in order; returns how many were inserted
    pub fn add_all<I>(&mut self, events: I) -> usize
    where
        I: IntoIterator<Item = Event>,
    {
        let mut inserted = 0;
        for event in events {
            if self.add(event) {
                inserted += 1;
            }
        }
        inserted
    }

    /// Remove the event equal to `event`; returns whether one was found
    pub fn remove(&mut self, event: &Event) -> bool {
        match self.events.iter().position(|e| e == event) {
            Some(idx) => {
                self.events.remove(idx);
                true
            }
            None => {
                warn!("Could not find event to remove: {}", event.short_infos());
                false
            }
        }
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }
}

impl<'a> IntoIterator for &'a Planning {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
