//! Poster Extract CLI - dance event posters to calendar entries
//!
//! Command-line interface for the classification, OCR and planning pipeline.

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use poster_cli::commands::classify::ClassifyCommand;
use poster_cli::commands::parse::ParseCommand;
use poster_cli::commands::run::RunCommand;
use poster_cli::{AppConfig, DEFAULT_CONFIG_PATH};
use rayon::ThreadPoolBuilder;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(
    name = "poster-extract",
    version,
    about = "Extract dance events from planning posters",
    long_about = "Scores downloaded images by color presence, sorts them into match tiers,\n\
                  runs OCR on the top tier and turns the schedule rows into calendar events.\n\n\
                  Results go to a CSV export, the configured event storage and, optionally,\n\
                  an iCalendar file.",
    after_help = "EXAMPLES:\n  \
                  # Process everything in the downloaded folder\n  \
                  poster-extract run\n\n  \
                  # Re-run without moving files, OCR on every image\n  \
                  poster-extract run --no-sort --force-candidate\n\n  \
                  # Check the scores of a few files\n  \
                  poster-extract classify poster1.jpg poster2.jpg\n\n  \
                  # Extract events from one poster, or from a saved Tesseract TSV dump\n  \
                  poster-extract parse poster.jpg\n  \
                  poster-extract parse --tsv poster.tsv"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify, sort, OCR and publish the downloaded images
    Run(RunCommand),

    /// Print presence ratio and tier for each file
    Classify(ClassifyCommand),

    /// Print the events found in one image as JSON lines
    Parse(ParseCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Lets tests and small machines cap classification parallelism
    if let Ok(threads_str) = std::env::var("POSTER_EXTRACT_THREADS") {
        if let Ok(num_threads) = threads_str.parse::<usize>() {
            ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build_global()
                .ok();
        }
    }

    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("Failed loading configuration {}", cli.config.display()))?;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level(cli.verbose))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    // Config loading happens before any subscriber exists
    debug!("Loaded configuration from {}", cli.config.display());

    match cli.command {
        Commands::Run(cmd) => cmd.execute(config).await,
        Commands::Classify(cmd) => cmd.execute(config).await,
        Commands::Parse(cmd) => cmd.execute(config).await,
    }
}
