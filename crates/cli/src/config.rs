//! YAML settings for the extraction run
//!
//! Every section has defaults, so a partial file (or an empty one) is
//! valid. Values that cannot work together are rejected at load time.

use poster_classifier::{ClassifierError, Hsv, HsvBounds, TierThresholds};
use poster_ocr::{OCRConfig, PreprocessConfig};
use poster_planning::{TemporalError, TemporalResolver};
use poster_storage::{CalendarConfig, StorageConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::Level;

pub const DEFAULT_CONFIG_PATH: &str = "./config/settings.yml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<ClassifierError> for ConfigError {
    fn from(err: ClassifierError) -> Self {
        ConfigError::Invalid(err.to_string())
    }
}

impl From<TemporalError> for ConfigError {
    fn from(err: TemporalError) -> Self {
        ConfigError::Invalid(err.to_string())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AppConfig {
    pub app: AppSection,
    pub parser: ParserSection,
    pub locale: LocaleSection,
    pub folders: FoldersSection,
    pub storage: StorageConfig,
    pub calendar: CalendarConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AppSection {
    pub environment: String,
    pub debug: bool,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            environment: "dev".to_string(),
            debug: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ParserSection {
    /// `None` falls back to `TESSDATA_PREFIX`, then the engine default
    pub tessdata_dir: Option<String>,
    pub language: String,
    pub page_segmentation_mode: u32,
    pub engine_mode: u32,
    pub resize_width: Option<u32>,
    pub grayscale: bool,
    pub threshold: Option<u8>,
    pub ocr_timeout_secs: u64,
    pub classify_width: u32,
    pub match_top_threshold: f64,
    pub match_med_threshold: f64,
    pub detection_lower_color_hsv: [u8; 3],
    pub detection_upper_color_hsv: [u8; 3],
    pub force_candidate: bool,
}

impl Default for ParserSection {
    fn default() -> Self {
        let ocr = OCRConfig::default();
        let preprocess = PreprocessConfig::default();
        Self {
            tessdata_dir: None,
            language: ocr.language,
            page_segmentation_mode: ocr.page_segmentation_mode,
            engine_mode: ocr.engine_mode,
            resize_width: preprocess.resize_width,
            grayscale: preprocess.grayscale,
            threshold: preprocess.threshold,
            ocr_timeout_secs: 120,
            classify_width: poster_classifier::DEFAULT_CLASSIFY_WIDTH,
            match_top_threshold: 10.0,
            match_med_threshold: 5.0,
            detection_lower_color_hsv: [0, 0, 0],
            detection_upper_color_hsv: [179, 255, 255],
            force_candidate: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LocaleSection {
    pub language: String,
    pub timezone: String,
}

impl Default for LocaleSection {
    fn default() -> Self {
        Self {
            language: "fr_FR".to_string(),
            timezone: "Europe/Paris".to_string(),
        }
    }
}

/// Working folders; relative entries are resolved against `output`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FoldersSection {
    pub output: PathBuf,
    pub images_downloaded: PathBuf,
    pub images_matched_low: PathBuf,
    pub images_matched_med: PathBuf,
    pub images_matched_top: PathBuf,
    pub export_file: PathBuf,
}

impl Default for FoldersSection {
    fn default() -> Self {
        Self {
            output: PathBuf::from("./output"),
            images_downloaded: PathBuf::from("downloaded"),
            images_matched_low: PathBuf::from("matched-low"),
            images_matched_med: PathBuf::from("matched-med"),
            images_matched_top: PathBuf::from("matched-top"),
            export_file: PathBuf::from("export.csv"),
        }
    }
}

impl FoldersSection {
    fn resolve(&self, path: &Path) -> PathBuf {
        // join keeps absolute paths as they are
        self.output.join(path)
    }

    #[must_use]
    pub fn downloaded(&self) -> PathBuf {
        self.resolve(&self.images_downloaded)
    }

    #[must_use]
    pub fn matched_low(&self) -> PathBuf {
        self.resolve(&self.images_matched_low)
    }

    #[must_use]
    pub fn matched_med(&self) -> PathBuf {
        self.resolve(&self.images_matched_med)
    }

    #[must_use]
    pub fn matched_top(&self) -> PathBuf {
        self.resolve(&self.images_matched_top)
    }

    #[must_use]
    pub fn export_file(&self) -> PathBuf {
        self.resolve(&self.export_file)
    }
}

impl AppConfig {
    /// Read, parse and validate a settings file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Parse and validate settings from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to null, which is not a mapping
        let mut config: AppConfig = if content.trim().is_empty() {
            AppConfig::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?
        };

        if config.parser.tessdata_dir.is_none() {
            config.parser.tessdata_dir = std::env::var("TESSDATA_PREFIX").ok();
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that every derived component can be built
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.thresholds()?;
        self.bounds()?;
        self.resolver()?;

        if self.parser.classify_width == 0 {
            return Err(ConfigError::Invalid("classify-width must be positive".to_string()));
        }
        if self.parser.resize_width == Some(0) {
            return Err(ConfigError::Invalid("resize-width must be positive".to_string()));
        }
        if self.parser.ocr_timeout_secs == 0 {
            return Err(ConfigError::Invalid("ocr-timeout-secs must be positive".to_string()));
        }
        if self.parser.engine_mode != poster_ocr::DEFAULT_ENGINE_MODE {
            return Err(ConfigError::Invalid(format!(
                "engine-mode {} is not supported, only {}",
                self.parser.engine_mode,
                poster_ocr::DEFAULT_ENGINE_MODE
            )));
        }
        Ok(())
    }

    pub fn thresholds(&self) -> Result<TierThresholds, ConfigError> {
        Ok(TierThresholds::new(
            self.parser.match_top_threshold,
            self.parser.match_med_threshold,
        )?)
    }

    pub fn bounds(&self) -> Result<HsvBounds, ConfigError> {
        let [lh, ls, lv] = self.parser.detection_lower_color_hsv;
        let [uh, us, uv] = self.parser.detection_upper_color_hsv;
        Ok(HsvBounds::new(Hsv::new(lh, ls, lv), Hsv::new(uh, us, uv))?)
    }

    pub fn resolver(&self) -> Result<TemporalResolver, ConfigError> {
        Ok(TemporalResolver::from_names(
            &self.locale.language,
            &self.locale.timezone,
        )?)
    }

    #[must_use]
    pub fn ocr_config(&self) -> OCRConfig {
        OCRConfig {
            language: self.parser.language.clone(),
            page_segmentation_mode: self.parser.page_segmentation_mode,
            engine_mode: self.parser.engine_mode,
            tessdata_dir: self.parser.tessdata_dir.clone(),
        }
    }

    #[must_use]
    pub fn preprocess_config(&self) -> PreprocessConfig {
        PreprocessConfig {
            resize_width: self.parser.resize_width,
            grayscale: self.parser.grayscale,
            threshold: self.parser.threshold,
        }
    }

    /// `DEBUG` when asked for on the command line or in `app.debug`
    #[must_use]
    pub fn log_level(&self, verbose: bool) -> Level {
        if verbose || self.app.debug {
            Level::DEBUG
        } else {
            Level::INFO
        }
    }

    #[must_use]
    pub fn ocr_timeout(&self) -> Duration {
        Duration::from_secs(self.parser.ocr_timeout_secs)
    }
}
