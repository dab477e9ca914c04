//! Full run over the downloaded folder

use crate::config::AppConfig;
use crate::pipeline::{Pipeline, RunOptions};
use anyhow::{Context as _, Result};
use clap::Args;
use poster_ocr::TesseractRecognizer;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Args)]
pub struct RunCommand {
    /// Leave files in the downloaded folder instead of sorting them by tier
    #[arg(long)]
    no_sort: bool,

    /// Treat every image as a candidate, whatever its color presence
    #[arg(long)]
    force_candidate: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
}

impl RunCommand {
    pub async fn execute(self, config: AppConfig) -> Result<()> {
        info!("=== Poster Extract Run ({}) ===", config.app.environment);

        let recognizer = match TesseractRecognizer::new(config.ocr_config()) {
            Ok(recognizer) => recognizer,
            Err(e) => {
                error!("OCR engine unavailable: {}", e);
                return Err(e).context("Failed to initialize OCR engine");
            }
        };
        let pipeline =
            Pipeline::new(config, Arc::new(recognizer)).context("Invalid configuration")?;

        let summary = pipeline
            .run(RunOptions {
                sort: !self.no_sort,
                force_candidate: self.force_candidate,
            })
            .await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Ok(())
    }
}
