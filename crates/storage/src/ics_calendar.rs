//! iCalendar (RFC 5545) file calendar
//!
//! Each event becomes a `VEVENT` with UTC times and a UID derived from its
//! start, end and description, so publishing the same event again is
//! detected even across runs. The whole file is rewritten after every new
//! event.
//!
//! Existing files are read back with the `ical` parser, which handles line
//! unfolding; only the `VEVENT` properties are kept.

use crate::{CalendarService, StorageError, StorageResult};
use chrono::{DateTime, FixedOffset, Utc};
use ical::parser::ical::component::IcalEvent;
use ical::property::Property;
use poster_planning::EventRecord;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

const PRODID: &str = "-//poster-events//poster-extract//EN";
const UTC_FORMAT: &str = "%Y%m%dT%H%M%SZ";
/// Content lines longer than this many octets are folded
const MAX_LINE_OCTETS: usize = 75;

struct StoredEvent {
    uid: String,
    /// Unfolded content lines from `BEGIN:VEVENT` to `END:VEVENT`
    lines: Vec<String>,
}

pub struct IcsCalendar {
    path: PathBuf,
    name: String,
    events: Mutex<Vec<StoredEvent>>,
}

impl IcsCalendar {
    /// Open the calendar file at `path`, keeping the events it already holds.
    ///
    /// A file that is not valid iCalendar fails with [`StorageError::Calendar`].
    pub async fn open(path: impl AsRef<Path>, name: String) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let events = match tokio::fs::read_to_string(&path).await {
            Ok(content) => read_events(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        debug!("Calendar {} holds {} events", name, events.len());

        Ok(Self {
            path,
            name,
            events: Mutex::new(events),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn write(&self, events: &[StoredEvent]) -> StorageResult<()> {
        let mut lines = vec![
            "BEGIN:VCALENDAR".to_string(),
            "VERSION:2.0".to_string(),
            format!("PRODID:{}", PRODID),
            "CALSCALE:GREGORIAN".to_string(),
            format!("X-WR-CALNAME:{}", escape_text(&self.name)),
        ];
        for event in events {
            lines.extend(event.lines.iter().cloned());
        }
        lines.push("END:VCALENDAR".to_string());

        let mut out = String::new();
        for line in &lines {
            out.push_str(&fold_line(line));
        }
        tokio::fs::write(&self.path, out).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl CalendarService for IcsCalendar {
    fn name(&self) -> &str {
        &self.name
    }

    async fn create_event(&self, record: &EventRecord) -> StorageResult<bool> {
        let uid = event_uid(record);
        let mut events = self.events.lock().await;
        if events.iter().any(|e| e.uid == uid) {
            debug!("Already in calendar: {}", record.short_infos());
            return Ok(false);
        }

        events.push(StoredEvent {
            lines: render_event(record, &uid, Utc::now()),
            uid,
        });
        self.write(&events).await?;
        Ok(true)
    }
}

fn to_utc(dt: &DateTime<FixedOffset>) -> String {
    dt.with_timezone(&Utc).format(UTC_FORMAT).to_string()
}

fn event_uid(record: &EventRecord) -> String {
    let mut hasher = Sha256::new();
    hasher.update(record.description.as_bytes());
    let digest = hasher.finalize();
    let short: String = digest[..8].iter().map(|b| format!("{:02x}", b)).collect();

    format!(
        "{}-{}-{}@poster-events",
        to_utc(&record.start),
        to_utc(&record.end),
        short
    )
}

fn render_event(record: &EventRecord, uid: &str, stamp: DateTime<Utc>) -> Vec<String> {
    let mut lines = vec![
        "BEGIN:VEVENT".to_string(),
        format!("UID:{}", uid),
        format!("DTSTAMP:{}", stamp.format(UTC_FORMAT)),
        format!("DTSTART:{}", to_utc(&record.start)),
        format!("DTEND:{}", to_utc(&record.end)),
        format!("SUMMARY:{}", escape_text(&record.description)),
    ];
    if !record.location.is_empty() {
        lines.push(format!("LOCATION:{}", escape_text(&record.location)));
    }
    if !record.dances.is_empty() {
        let categories: Vec<String> = record.dances.iter().map(|d| escape_text(d)).collect();
        lines.push(format!("CATEGORIES:{}", categories.join(",")));
    }
    lines.push(format!("DESCRIPTION:{}", escape_text(&record.raw)));
    lines.push("END:VEVENT".to_string());
    lines
}

/// TEXT value escaping
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}

/// Fold a content line at octet boundaries that fall between characters,
/// terminating every physical line with CRLF.
fn fold_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len() + 8);
    let mut width = 0;
    for c in line.chars() {
        let len = c.len_utf8();
        // Continuation lines start with a space that counts toward the limit
        if width + len > MAX_LINE_OCTETS {
            out.push_str("\r\n ");
            width = 1;
        }
        out.push(c);
        width += len;
    }
    out.push_str("\r\n");
    out
}

/// Collect the `VEVENT` blocks of an existing file; events without a UID
/// cannot be matched and are dropped.
fn read_events(content: &str) -> StorageResult<Vec<StoredEvent>> {
    let mut events = Vec::new();
    for calendar in ical::IcalParser::new(content.as_bytes()) {
        let calendar =
            calendar.map_err(|e| StorageError::Calendar(format!("ICS parse error: {}", e)))?;
        events.extend(calendar.events.iter().filter_map(stored_event));
    }
    Ok(events)
}

fn stored_event(event: &IcalEvent) -> Option<StoredEvent> {
    let uid = event
        .properties
        .iter()
        .find(|p| p.name == "UID")
        .and_then(|p| p.value.clone())?;

    let mut lines = vec!["BEGIN:VEVENT".to_string()];
    lines.extend(event.properties.iter().map(render_property));
    lines.push("END:VEVENT".to_string());
    Some(StoredEvent { uid, lines })
}

/// Content line for a parsed property; values are kept in their escaped form
fn render_property(property: &Property) -> String {
    let mut line = property.name.clone();
    if let Some(params) = &property.params {
        for (key, values) in params {
            line.push(';');
            line.push_str(key);
            line.push('=');
            line.push_str(&values.join(","));
        }
    }
    line.push(':');
    if let Some(value) = &property.value {
        line.push_str(value);
    }
    line
}
