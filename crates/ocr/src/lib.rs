//! OCR module using Tesseract 5.x
//!
//! Turns a poster bitmap into a flat word-token stream in reading order.
//! Tesseract's TSV output lists page, block, paragraph, line and word rows;
//! only word rows carry text, so every structural row becomes an empty
//! boundary token between lines.
//!
//! # Example
//! ```no_run
//! use poster_ocr::{OCRConfig, Recognizer, TesseractRecognizer};
//! use image::RgbImage;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let recognizer = TesseractRecognizer::new(OCRConfig::default())?;
//! let img = RgbImage::new(100, 100);
//! for token in recognizer.recognize(&img)? {
//!     println!("{:>4} {:?}", token.sequence_index, token.text);
//! }
//! # Ok(())
//! # }
//! ```

pub mod preprocess;
pub mod tsv;

pub use preprocess::{preprocess, PreprocessConfig};
pub use tsv::decode_tsv;

use image::RgbImage;
use leptess::{LepTess, Variable};
use poster_common::WordToken;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Tesseract engine mode selected when the engine is initialized
/// without an explicit mode (LSTM with legacy fallback).
pub const DEFAULT_ENGINE_MODE: u32 = 3;

/// Configuration for OCR processing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OCRConfig {
    /// Tesseract language codes (e.g., "eng", "eng+fra")
    pub language: String,
    /// Page segmentation mode (see Tesseract PSM)
    pub page_segmentation_mode: u32,
    /// OCR engine mode (see Tesseract OEM)
    pub engine_mode: u32,
    /// Directory containing `*.traineddata`; `None` uses the engine's search path
    pub tessdata_dir: Option<String>,
}

impl Default for OCRConfig {
    fn default() -> Self {
        Self {
            language: "eng+fra".to_string(),
            page_segmentation_mode: 6, // single uniform block of text
            engine_mode: DEFAULT_ENGINE_MODE,
            tessdata_dir: std::env::var("TESSDATA_PREFIX").ok(),
        }
    }
}

/// Errors that can occur during OCR processing
#[derive(Error, Debug)]
pub enum OCRError {
    #[error("Failed to initialize Tesseract: {0}")]
    InitError(String),

    #[error("Failed to run OCR: {0}")]
    RecognitionError(String),

    #[error("Invalid image dimensions: {0}")]
    InvalidImageDimensions(String),

    #[error("OCR timed out after {0}s")]
    Timeout(u64),
}

/// Text recognition engine boundary.
///
/// Implementations return tokens in raster order with empty-text tokens
/// as line separators. An empty stream is a valid result.
pub trait Recognizer: Send + Sync {
    fn recognize(&self, image: &RgbImage) -> Result<Vec<WordToken>, OCRError>;
}

/// Recognizer backed by Tesseract via leptess
pub struct TesseractRecognizer {
    config: OCRConfig,
}

impl TesseractRecognizer {
    /// Create a new recognizer.
    ///
    /// Verifies that Tesseract can initialize with the configured language
    /// data so that a missing installation fails the run up front.
    pub fn new(config: OCRConfig) -> Result<Self, OCRError> {
        if config.engine_mode != DEFAULT_ENGINE_MODE {
            return Err(OCRError::InitError(format!(
                "engine mode {} is not supported, only {} (engine default)",
                config.engine_mode, DEFAULT_ENGINE_MODE
            )));
        }

        let _test_init = Self::init_engine(&config)?;

        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &OCRConfig {
        &self.config
    }

    fn init_engine(config: &OCRConfig) -> Result<LepTess, OCRError> {
        LepTess::new(config.tessdata_dir.as_deref(), &config.language).map_err(|e| {
            OCRError::InitError(format!(
                "Failed to initialize Tesseract with language '{}': {}. \
                 Make sure language data is installed (e.g., 'apt install tesseract-ocr-fra')",
                config.language, e
            ))
        })
    }
}

impl Recognizer for TesseractRecognizer {
    fn recognize(&self, image: &RgbImage) -> Result<Vec<WordToken>, OCRError> {
        let (width, height) = image.dimensions();

        if width == 0 || height == 0 {
            return Err(OCRError::InvalidImageDimensions(format!(
                "Image dimensions must be non-zero (got {}x{})",
                width, height
            )));
        }

        let mut lt = Self::init_engine(&self.config)?;

        lt.set_variable(
            Variable::TesseditPagesegMode,
            &self.config.page_segmentation_mode.to_string(),
        )
        .map_err(|e| OCRError::InitError(format!("Failed to set PSM: {}", e)))?;

        // leptess expects encoded image data
        let mut png_buf = std::io::Cursor::new(Vec::new());
        image
            .write_to(&mut png_buf, image::ImageFormat::Png)
            .map_err(|e| {
                OCRError::RecognitionError(format!("Failed to encode image to PNG: {}", e))
            })?;

        lt.set_image_from_mem(png_buf.get_ref()).map_err(|e| {
            OCRError::RecognitionError(format!("Failed to set image from memory: {}", e))
        })?;

        let tsv = lt
            .get_tsv_text(0)
            .map_err(|e| OCRError::RecognitionError(format!("Failed to read TSV output: {}", e)))?;

        let tokens = decode_tsv(&tsv);
        debug!(
            "OCR produced {} tokens ({} words) for {}x{} image",
            tokens.len(),
            tokens.iter().filter(|t| !t.is_boundary()).count(),
            width,
            height
        );

        Ok(tokens)
    }
}

/// Run a blocking recognizer on the tokio blocking pool with a deadline.
///
/// Expiry surfaces as [`OCRError::Timeout`]; the engine thread is left to
/// finish on its own and its result is discarded.
pub async fn recognize_with_timeout(
    recognizer: Arc<dyn Recognizer>,
    image: RgbImage,
    timeout: Duration,
) -> Result<Vec<WordToken>, OCRError> {
    let task = tokio::task::spawn_blocking(move || recognizer.recognize(&image));

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(OCRError::RecognitionError(format!(
            "OCR task failed: {}",
            join_err
        ))),
        Err(_) => Err(OCRError::Timeout(timeout.as_secs())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use poster_common::tokens_from_words;

    struct SlowRecognizer(Duration);

    impl Recognizer for SlowRecognizer {
        fn recognize(&self, _image: &RgbImage) -> Result<Vec<WordToken>, OCRError> {
            std::thread::sleep(self.0);
            Ok(tokens_from_words(["late"]))
        }
    }

    struct FixedRecognizer;

    impl Recognizer for FixedRecognizer {
        fn recognize(&self, _image: &RgbImage) -> Result<Vec<WordToken>, OCRError> {
            Ok(tokens_from_words(["", "Samedi", "10/05/2024", "14h00", ""]))
        }
    }

    #[test]
    fn test_ocr_config_default() {
        let config = OCRConfig::default();
        assert_eq!(config.language, "eng+fra");
        assert_eq!(config.page_segmentation_mode, 6);
        assert_eq!(config.engine_mode, 3);
    }

    #[test]
    fn test_unsupported_engine_mode_is_rejected() {
        let config = OCRConfig {
            engine_mode: 1,
            ..Default::default()
        };
        let err = TesseractRecognizer::new(config).err().unwrap();
        assert!(matches!(err, OCRError::InitError(_)));
    }

    #[test]
    #[ignore = "requires Tesseract with eng+fra language data"]
    fn test_detector_creation() {
        let result = TesseractRecognizer::new(OCRConfig::default());
        assert!(
            result.is_ok(),
            "Failed to create recognizer. Make sure Tesseract is installed with eng+fra data."
        );
    }

    #[test]
    #[ignore = "requires Tesseract installation"]
    fn test_detector_invalid_language() {
        let config = OCRConfig {
            language: "invalid_lang_xyz".to_string(),
            ..Default::default()
        };
        assert!(TesseractRecognizer::new(config).is_err());
    }

    #[test]
    #[ignore = "requires Tesseract with eng+fra language data"]
    fn test_blank_image_yields_no_words() {
        let recognizer = TesseractRecognizer::new(OCRConfig::default()).unwrap();
        let img = RgbImage::from_pixel(200, 100, Rgb([255, 255, 255]));
        let tokens = recognizer.recognize(&img).unwrap();
        assert!(tokens.iter().all(WordToken::is_boundary));
    }

    #[tokio::test]
    async fn test_timeout_expires() {
        let recognizer: Arc<dyn Recognizer> = Arc::new(SlowRecognizer(Duration::from_millis(500)));
        let img = RgbImage::new(4, 4);
        let result = recognize_with_timeout(recognizer, img, Duration::from_millis(20)).await;
        assert!(matches!(result, Err(OCRError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_timeout_passes_result_through() {
        let recognizer: Arc<dyn Recognizer> = Arc::new(FixedRecognizer);
        let img = RgbImage::new(4, 4);
        let tokens = recognize_with_timeout(recognizer, img, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(tokens.len(), 5);
        assert_eq!(tokens[1].text, "Samedi");
    }
}
