//! Persistence and calendar publication of extracted events
//!
//! Two collaborators sit behind capability traits so the pipeline never
//! depends on a concrete backend:
//! - **Event storage**: existence check plus insert, keyed on the full record
//! - **Calendar**: publication of each event to a named calendar
//!
//! Providers are picked from configuration. Local providers are included:
//! an in-memory store, an append-only JSON-lines file and an iCalendar file.
//!
//! # Example
//!
//! ```rust,no_run
//! use poster_planning::Planning;
//! use poster_storage::{ingest, StorageConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = StorageConfig::JsonLines { path: "events.jsonl".into() };
//!     let planning = Planning::new();
//!
//!     if let Some(storage) = config.open().await? {
//!         let report = ingest(storage.as_ref(), &planning).await?;
//!         println!("{} inserted, {} skipped", report.inserted, report.skipped);
//!     }
//!     Ok(())
//! }
//! ```

use poster_planning::{EventRecord, Planning};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

pub mod ics_calendar;
pub mod json_lines;
pub mod memory;

pub use ics_calendar::IcsCalendar;
pub use json_lines::JsonLinesStorage;
pub use memory::MemoryStorage;

/// Storage layer errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Calendar error: {0}")]
    Calendar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Event store
#[async_trait::async_trait]
pub trait StorageService: Send + Sync {
    /// Whether an identical record is already stored
    async fn exists(&self, record: &EventRecord) -> StorageResult<bool>;

    /// Store a record unconditionally
    async fn insert(&self, record: &EventRecord) -> StorageResult<()>;

    /// Number of stored records
    async fn count(&self) -> StorageResult<usize>;
}

/// Calendar publication
#[async_trait::async_trait]
pub trait CalendarService: Send + Sync {
    /// Calendar the events are published to
    fn name(&self) -> &str;

    /// Publish one event; returns `false` when it was already present
    async fn create_event(&self, record: &EventRecord) -> StorageResult<bool>;
}

/// Event store selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "kebab-case")]
pub enum StorageConfig {
    /// Append-only file of one JSON record per line
    JsonLines { path: PathBuf },
    /// Process-local store, lost at exit
    Memory,
    /// No storage; ingestion is skipped
    #[serde(rename = "none")]
    Disabled,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::JsonLines {
            path: PathBuf::from("./output/events.jsonl"),
        }
    }
}

impl StorageConfig {
    /// Open the configured store; `None` when storage is disabled
    pub async fn open(&self) -> StorageResult<Option<Box<dyn StorageService>>> {
        match self {
            StorageConfig::JsonLines { path } => {
                let storage = JsonLinesStorage::open(path).await?;
                Ok(Some(Box::new(storage)))
            }
            StorageConfig::Memory => Ok(Some(Box::new(MemoryStorage::new()))),
            StorageConfig::Disabled => Ok(None),
        }
    }
}

fn default_calendar_name() -> String {
    "DancePlanning".to_string()
}

/// Calendar selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "kebab-case")]
pub enum CalendarConfig {
    /// iCalendar file, rewritten after each new event
    Ics {
        path: PathBuf,
        #[serde(default = "default_calendar_name")]
        name: String,
    },
    /// No calendar publication
    #[default]
    #[serde(rename = "none")]
    Disabled,
}

impl CalendarConfig {
    /// Open the configured calendar; `None` when publication is disabled
    pub async fn open(&self) -> StorageResult<Option<Box<dyn CalendarService>>> {
        match self {
            CalendarConfig::Ics { path, name } => {
                if name.trim().is_empty() {
                    return Err(StorageError::InvalidConfig(
                        "calendar name must not be empty".to_string(),
                    ));
                }
                let calendar = IcsCalendar::open(path, name.clone()).await?;
                Ok(Some(Box::new(calendar)))
            }
            CalendarConfig::Disabled => Ok(None),
        }
    }
}

/// Outcome of an ingestion pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub inserted: usize,
    pub skipped: usize,
}

/// Store every event of `planning` that the store does not hold yet.
///
/// Running it twice over the same planning inserts nothing the second time.
pub async fn ingest(
    storage: &dyn StorageService,
    planning: &Planning,
) -> StorageResult<IngestReport> {
    let mut report = IngestReport::default();

    for event in planning {
        let record = event.record();
        if storage.exists(&record).await? {
            info!("Skipping: {}", record.short_infos());
            report.skipped += 1;
        } else {
            info!("Inserting: {}", record.short_infos());
            storage.insert(&record).await?;
            report.inserted += 1;
        }
    }

    Ok(report)
}

/// Publish every event of `planning`; returns how many were new.
///
/// A failure on one event is logged and does not stop the others.
pub async fn publish(calendar: &dyn CalendarService, planning: &Planning) -> usize {
    let mut created = 0;
    for event in planning {
        let record = event.record();
        match calendar.create_event(&record).await {
            Ok(true) => created += 1,
            Ok(false) => {}
            Err(e) => warn!(
                "Failed to publish {} to {}: {}",
                record.short_infos(),
                calendar.name(),
                e
            ),
        }
    }
    info!(">> Published {} events to {}", created, calendar.name());
    created
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::DateTime;
    use poster_planning::Event;

    pub(crate) fn event(start: &str, end: &str, description: &str) -> Event {
        Event {
            start: DateTime::parse_from_rfc3339(start).unwrap(),
            end: DateTime::parse_from_rfc3339(end).unwrap(),
            day_label: "Vendredi".to_string(),
            description: description.to_string(),
            location: String::new(),
            dances: vec!["WCS".to_string()],
            source_fragments: vec!["Vendredi".to_string(), description.to_string()],
        }
    }

    pub(crate) fn sample_planning() -> Planning {
        let mut planning = Planning::new();
        planning.add(event(
            "2024-05-10T14:30:00+02:00",
            "2024-05-10T16:00:00+02:00",
            "Soirée WCS à L'Impasse",
        ));
        planning.add(event(
            "2024-05-10T21:00:00+02:00",
            "2024-05-11T01:00:00+02:00",
            "Bal Rock",
        ));
        planning
    }

    #[test]
    fn test_storage_config_tags() {
        let json: StorageConfig =
            serde_json::from_str(r#"{"provider":"json-lines","path":"/tmp/e.jsonl"}"#).unwrap();
        assert_eq!(
            json,
            StorageConfig::JsonLines {
                path: PathBuf::from("/tmp/e.jsonl")
            }
        );
        let memory: StorageConfig = serde_json::from_str(r#"{"provider":"memory"}"#).unwrap();
        assert_eq!(memory, StorageConfig::Memory);
        let none: StorageConfig = serde_json::from_str(r#"{"provider":"none"}"#).unwrap();
        assert_eq!(none, StorageConfig::Disabled);
    }

    #[test]
    fn test_calendar_config_default_name() {
        let config: CalendarConfig =
            serde_json::from_str(r#"{"provider":"ics","path":"planning.ics"}"#).unwrap();
        assert_eq!(
            config,
            CalendarConfig::Ics {
                path: PathBuf::from("planning.ics"),
                name: "DancePlanning".to_string()
            }
        );
        assert_eq!(CalendarConfig::default(), CalendarConfig::Disabled);
    }

    #[tokio::test]
    async fn test_ingest_twice_inserts_once() {
        let storage = MemoryStorage::new();
        let planning = sample_planning();

        let first = ingest(&storage, &planning).await.unwrap();
        assert_eq!(first, IngestReport { inserted: 2, skipped: 0 });

        let second = ingest(&storage, &planning).await.unwrap();
        assert_eq!(second, IngestReport { inserted: 0, skipped: 2 });
        assert_eq!(storage.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_disabled_providers_open_to_none() {
        assert!(StorageConfig::Disabled.open().await.unwrap().is_none());
        assert!(CalendarConfig::Disabled.open().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_calendar_name_is_rejected() {
        let config = CalendarConfig::Ics {
            path: PathBuf::from("planning.ics"),
            name: "  ".to_string(),
        };
        assert!(matches!(
            config.open().await,
            Err(StorageError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn test_publish_counts_new_events() {
        let dir = tempfile::tempdir().unwrap();
        let calendar = IcsCalendar::open(dir.path().join("p.ics"), "DancePlanning".to_string())
            .await
            .unwrap();
        let planning = sample_planning();
        assert_eq!(publish(&calendar, &planning).await, 2);
        assert_eq!(publish(&calendar, &planning).await, 0);
    }
}
