//! Folder-driven extraction run
//!
//! classify downloaded images -> sort into tier folders -> OCR the top tier
//! -> parse into one planning -> CSV export -> storage -> calendar
//!
//! Per-image failures are logged and skipped. Only setup problems (config,
//! engine, storage connection) stop the run.

use crate::config::{AppConfig, ConfigError};
use anyhow::{Context as _, Result};
use poster_classifier::{classify_batch, Classification, HsvBounds, MatchTier, TierThresholds};
use poster_common::{load_image, ProcessingError, WordToken};
use poster_ocr::{preprocess, recognize_with_timeout, OCRError, Recognizer};
use poster_planning::{write_csv, Planning, PlanningParser};
use poster_storage::{ingest, publish, IngestReport};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Processing(#[from] ProcessingError),

    #[error(transparent)]
    Ocr(#[from] OCRError),
}

#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Move classified files into their tier folders
    pub sort: bool,
    /// Treat every image as a top-tier candidate
    pub force_candidate: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            sort: true,
            force_candidate: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub files: usize,
    pub low: usize,
    pub medium: usize,
    pub top: usize,
    /// Files that could not be decoded or moved
    pub failed: usize,
    pub events_added: usize,
    pub total_events: usize,
    pub export_path: PathBuf,
    pub ingest: Option<IngestReport>,
    pub published: Option<usize>,
}

/// Per-file classification log line
#[must_use]
pub fn candidate_line(classification: &Classification) -> String {
    let name = classification
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| classification.path.display().to_string());
    let verdict = if classification.tier.is_candidate() {
        "Candidate !"
    } else {
        "Not Candidate !"
    };
    format!("File: {} - {:>6.2} % - {}", name, classification.presence, verdict)
}

pub struct Pipeline {
    config: AppConfig,
    bounds: HsvBounds,
    thresholds: TierThresholds,
    parser: PlanningParser,
    recognizer: Arc<dyn Recognizer>,
}

impl Pipeline {
    pub fn new(config: AppConfig, recognizer: Arc<dyn Recognizer>) -> Result<Self, ConfigError> {
        let bounds = config.bounds()?;
        let thresholds = config.thresholds()?;
        let parser = PlanningParser::new(config.resolver()?);

        Ok(Self {
            config,
            bounds,
            thresholds,
            parser,
            recognizer,
        })
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[must_use]
    pub fn parser(&self) -> &PlanningParser {
        &self.parser
    }

    /// Classify files in parallel; failures are logged and counted
    pub fn classify(&self, paths: &[PathBuf], force_candidate: bool) -> (Vec<Classification>, usize) {
        let results = classify_batch(
            paths,
            &self.bounds,
            self.config.parser.classify_width,
            &self.thresholds,
            force_candidate,
        );

        let mut classified = Vec::with_capacity(results.len());
        let mut failed = 0;
        for (path, result) in paths.iter().zip(results) {
            match result {
                Ok(classification) => {
                    info!("{}", candidate_line(&classification));
                    classified.push(classification);
                }
                Err(e) => {
                    warn!("Failed to classify {}: {}", path.display(), e);
                    failed += 1;
                }
            }
        }
        (classified, failed)
    }

    fn tier_folder(&self, tier: MatchTier) -> PathBuf {
        let folders = &self.config.folders;
        match tier {
            MatchTier::Top => folders.matched_top(),
            MatchTier::Medium => folders.matched_med(),
            MatchTier::Low => folders.matched_low(),
        }
    }

    /// Move a classified file into its tier folder; returns the new path
    pub fn sort_into_tier(&self, classification: &Classification) -> std::io::Result<PathBuf> {
        let folder = self.tier_folder(classification.tier);
        let name = classification.path.file_name().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} has no file name", classification.path.display()),
            )
        })?;
        let target = folder.join(name);
        move_file(&classification.path, &target)?;
        debug!("Moved {} -> {}", classification.path.display(), target.display());
        Ok(target)
    }

    /// Load, preprocess and recognize one image
    pub async fn recognize_file(&self, path: &Path) -> Result<Vec<WordToken>, PipelineError> {
        let image = load_image(path)?;
        let prepared = preprocess(&image.pixels, &self.config.preprocess_config());
        let tokens = recognize_with_timeout(
            Arc::clone(&self.recognizer),
            prepared,
            self.config.ocr_timeout(),
        )
        .await?;
        Ok(tokens)
    }

    /// OCR one image and add its events to `planning`; returns the number added.
    ///
    /// A timeout counts as an empty text stream.
    pub async fn extract_file(&self, path: &Path, planning: &mut Planning) -> usize {
        info!("Parsing: {}", path.display());
        match self.recognize_file(path).await {
            Ok(tokens) => self.parser.process(tokens, planning),
            Err(PipelineError::Ocr(OCRError::Timeout(secs))) => {
                warn!("OCR timed out after {}s on {}, no events", secs, path.display());
                0
            }
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                0
            }
        }
    }

    /// Run the whole pipeline over the downloaded folder
    pub async fn run(&self, options: RunOptions) -> Result<RunSummary> {
        let started = Instant::now();
        let folders = &self.config.folders;
        for folder in [
            folders.downloaded(),
            folders.matched_low(),
            folders.matched_med(),
            folders.matched_top(),
        ] {
            std::fs::create_dir_all(&folder)
                .with_context(|| format!("Failed to create folder {}", folder.display()))?;
        }

        info!("================= FIND MATCHES =================");
        let files = list_files(&folders.downloaded()).with_context(|| {
            format!("Failed to list {}", folders.downloaded().display())
        })?;
        info!("Found {} files to analyze.", files.len());

        let force = options.force_candidate || self.config.parser.force_candidate;
        let (classified, mut failed) = self.classify(&files, force);

        let mut summary = RunSummary {
            files: files.len(),
            ..RunSummary::default()
        };
        let mut candidates = Vec::new();
        for classification in &classified {
            match classification.tier {
                MatchTier::Top => summary.top += 1,
                MatchTier::Medium => summary.medium += 1,
                MatchTier::Low => summary.low += 1,
            }

            let path = if options.sort {
                match self.sort_into_tier(classification) {
                    Ok(target) => target,
                    Err(e) => {
                        warn!("Failed to move {}: {}", classification.path.display(), e);
                        failed += 1;
                        continue;
                    }
                }
            } else {
                classification.path.clone()
            };

            if classification.tier.is_candidate() {
                candidates.push(path);
            }
        }
        summary.failed = failed;

        info!("=============== IMAGE PARSER ===================");
        let mut planning = Planning::new();
        for path in &candidates {
            summary.events_added += self.extract_file(path, &mut planning).await;
        }
        summary.total_events = planning.len();

        summary.export_path = folders.export_file();
        write_csv(&summary.export_path, &planning).with_context(|| {
            format!("Failed to write export {}", summary.export_path.display())
        })?;

        info!("=============== DATA INTEGRATION ===============");
        let storage = self
            .config
            .storage
            .open()
            .await
            .context("Failed to open event storage")?;
        match storage {
            Some(storage) => {
                let report = ingest(storage.as_ref(), &planning)
                    .await
                    .context("Failed to store events")?;
                info!(
                    ">> Inserted {} events, skipped {} already stored",
                    report.inserted, report.skipped
                );
                summary.ingest = Some(report);
            }
            None => debug!("Storage disabled"),
        }

        let calendar = self
            .config
            .calendar
            .open()
            .await
            .context("Failed to open calendar")?;
        if let Some(calendar) = calendar {
            info!("=============== CALENDAR =======================");
            summary.published = Some(publish(calendar.as_ref(), &planning).await);
        }

        info!(
            "Done in {:.2}s: {} files ({} top, {} medium, {} low, {} failed), {} events",
            started.elapsed().as_secs_f64(),
            summary.files,
            summary.top,
            summary.medium,
            summary.low,
            summary.failed,
            summary.total_events
        );
        Ok(summary)
    }
}

/// Regular, non-hidden files of `dir`, sorted by name
pub fn list_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if !hidden && entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Rename, falling back to copy and delete across filesystems
fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    if let Some(parent) = to.parent() {
        std::fs::create_dir_all(parent)?;
    }
    match std::fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(_) => {
            std::fs::copy(from, to)?;
            std::fs::remove_file(from)
        }
    }
}
