//! Pre-recognition image transforms

use image::{DynamicImage, RgbImage};
use imageproc::contrast::{threshold, ThresholdType};
use poster_common::resize_to_width;
use serde::{Deserialize, Serialize};

/// Toggles for the transforms applied before recognition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Target width; more pixels per character helps recognition
    pub resize_width: Option<u32>,
    /// Convert to grayscale
    pub grayscale: bool,
    /// Binary threshold (0-255); implies grayscale
    pub threshold: Option<u8>,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            resize_width: Some(2000),
            grayscale: false,
            threshold: None,
        }
    }
}

/// Apply the configured transforms; the output is always RGB.
#[must_use]
pub fn preprocess(image: &RgbImage, config: &PreprocessConfig) -> RgbImage {
    let resized = match config.resize_width {
        Some(width) => resize_to_width(image, width),
        None => image.clone(),
    };

    if !config.grayscale && config.threshold.is_none() {
        return resized;
    }

    let mut gray = image::imageops::grayscale(&resized);
    if let Some(level) = config.threshold {
        gray = threshold(&gray, level, ThresholdType::Binary);
    }

    DynamicImage::ImageLuma8(gray).to_rgb8()
}
