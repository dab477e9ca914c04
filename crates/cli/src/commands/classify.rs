//! Score files without moving them

use crate::config::AppConfig;
use crate::pipeline::candidate_line;
use anyhow::{Context as _, Result};
use clap::Args;
use poster_classifier::classify_batch;
use std::path::PathBuf;
use tracing::warn;

#[derive(Args)]
pub struct ClassifyCommand {
    /// Image files to classify
    #[arg(value_name = "FILES", required = true)]
    inputs: Vec<PathBuf>,

    /// Output format: text (default) or jsonl (JSON lines)
    #[arg(long, default_value = "text")]
    format: String,
}

impl ClassifyCommand {
    pub async fn execute(self, config: AppConfig) -> Result<()> {
        let bounds = config.bounds().context("Invalid detection colors")?;
        let thresholds = config.thresholds().context("Invalid tier thresholds")?;

        let results = classify_batch(
            &self.inputs,
            &bounds,
            config.parser.classify_width,
            &thresholds,
            config.parser.force_candidate,
        );

        let output_jsonl = self.format == "jsonl";
        for (path, result) in self.inputs.iter().zip(results) {
            match result {
                Ok(c) if output_jsonl => println!(
                    "{}",
                    serde_json::json!({
                        "file": c.path.display().to_string(),
                        "presence": c.presence,
                        "tier": c.tier,
                    })
                ),
                Ok(c) => println!("{} [{}]", candidate_line(&c), c.tier),
                Err(e) => warn!("Failed to classify {}: {}", path.display(), e),
            }
        }
        Ok(())
    }
}
