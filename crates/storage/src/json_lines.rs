//! Append-only JSON-lines event store
//!
//! One serialized [`EventRecord`] per line. Existing records are loaded
//! when the store is opened; inserts append to the file and update the
//! cached copy.

use crate::{StorageError, StorageResult, StorageService};
use poster_planning::EventRecord;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

pub struct JsonLinesStorage {
    path: PathBuf,
    records: Mutex<Vec<EventRecord>>,
}

impl JsonLinesStorage {
    /// Open the store at `path`, creating parent directories as needed.
    ///
    /// A missing file is an empty store. Unreadable lines are skipped with a
    /// warning so one bad line does not lose the rest of the history.
    pub async fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let records = match tokio::fs::read_to_string(&path).await {
            Ok(content) => parse_lines(&content, &path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(StorageError::Io(e)),
        };
        debug!("Loaded {} records from {}", records.len(), path.display());

        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn parse_lines(content: &str, path: &Path) -> Vec<EventRecord> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(n, line)| match serde_json::from_str(line) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("{}:{}: ignoring unreadable record: {}", path.display(), n + 1, e);
                None
            }
        })
        .collect()
}

#[async_trait::async_trait]
impl StorageService for JsonLinesStorage {
    async fn exists(&self, record: &EventRecord) -> StorageResult<bool> {
        Ok(self.records.lock().await.contains(record))
    }

    async fn insert(&self, record: &EventRecord) -> StorageResult<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        // Hold the lock across the write so appends stay in cache order
        let mut records = self.records.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        records.push(record.clone());
        Ok(())
    }

    async fn count(&self) -> StorageResult<usize> {
        Ok(self.records.lock().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{event, sample_planning};
    use crate::{ingest, IngestReport};

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db").join("events.jsonl");

        let planning = sample_planning();
        let storage = JsonLinesStorage::open(&path).await.unwrap();
        let report = ingest(&storage, &planning).await.unwrap();
        assert_eq!(report, IngestReport { inserted: 2, skipped: 0 });

        let reopened = JsonLinesStorage::open(&path).await.unwrap();
        assert_eq!(reopened.count().await.unwrap(), 2);
        let report = ingest(&reopened, &planning).await.unwrap();
        assert_eq!(report, IngestReport { inserted: 0, skipped: 2 });

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[tokio::test]
    async fn test_record_line_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let storage = JsonLinesStorage::open(&path).await.unwrap();

        let record = event("2024-05-10T14:30:00+02:00", "2024-05-10T16:00:00+02:00", "Bal").record();
        storage.insert(&record).await.unwrap();

        let line = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(value["day"], "Vendredi");
        assert_eq!(value["start"], "2024-05-10T14:30:00+02:00");
        assert_eq!(value["raw"], r#"["Vendredi","Bal"]"#);
    }

    #[tokio::test]
    async fn test_unreadable_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let record = event("2024-05-10T14:30:00+02:00", "2024-05-10T16:00:00+02:00", "Bal").record();
        let content = format!("not json\n\n{}\n", serde_json::to_string(&record).unwrap());
        std::fs::write(&path, content).unwrap();

        let storage = JsonLinesStorage::open(&path).await.unwrap();
        assert_eq!(storage.count().await.unwrap(), 1);
        assert!(storage.exists(&record).await.unwrap());
    }
}
