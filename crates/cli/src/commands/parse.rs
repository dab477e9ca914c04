//! Extract events from a single image or a saved TSV dump

use crate::config::AppConfig;
use crate::pipeline::Pipeline;
use anyhow::{Context as _, Result};
use clap::Args;
use poster_ocr::{decode_tsv, TesseractRecognizer};
use poster_planning::{Event, PlanningParser};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Args)]
pub struct ParseCommand {
    /// Poster image, or Tesseract TSV output with --tsv
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Read the input as Tesseract TSV instead of running OCR
    #[arg(long)]
    tsv: bool,
}

impl ParseCommand {
    pub async fn execute(self, config: AppConfig) -> Result<()> {
        let events = if self.tsv {
            let content = std::fs::read_to_string(&self.input)
                .with_context(|| format!("Failed to read {}", self.input.display()))?;
            let parser = PlanningParser::new(config.resolver()?);
            parser.parse_tokens(decode_tsv(&content))
        } else {
            let recognizer = TesseractRecognizer::new(config.ocr_config())
                .context("Failed to initialize OCR engine")?;
            let pipeline = Pipeline::new(config, Arc::new(recognizer))?;
            let tokens = pipeline
                .recognize_file(&self.input)
                .await
                .with_context(|| format!("Failed to recognize {}", self.input.display()))?;
            pipeline.parser().parse_tokens(tokens)
        };

        info!("Extracted {} events from {}", events.len(), self.input.display());
        print_events(&events)
    }
}

fn print_events(events: &[Event]) -> Result<()> {
    for event in events {
        println!("{}", serde_json::to_string(event)?);
    }
    Ok(())
}
