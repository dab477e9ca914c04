//! Poster extraction orchestrator
//!
//! Library half of the `poster-extract` binary: settings, the folder-driven
//! pipeline and the subcommands built on it.

pub mod commands;
pub mod config;
pub mod pipeline;

pub use config::{AppConfig, ConfigError, DEFAULT_CONFIG_PATH};
pub use pipeline::{candidate_line, Pipeline, PipelineError, RunOptions, RunSummary};
