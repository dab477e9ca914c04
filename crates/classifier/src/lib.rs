//! Poster classification by color presence
//!
//! Event posters from the same organizer share a dominant color. An image
//! is scored by the share of its pixels falling inside a configured HSV
//! range, after resizing to a fixed working width so that scores from
//! different source resolutions are comparable.
//!
//! # Example
//! ```no_run
//! use poster_classifier::{classify, HsvBounds, Hsv};
//! use poster_common::load_image;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bounds = HsvBounds::new(Hsv::new(100, 80, 80), Hsv::new(130, 255, 255))?;
//! let image = load_image("poster.jpg")?;
//! let ratio = classify(&image.pixels, &bounds, 2000);
//! println!("{:.2} %", ratio);
//! # Ok(())
//! # }
//! ```

pub mod hsv;
pub mod tier;

pub use hsv::{rgb_to_hsv, Hsv};
pub use tier::{MatchTier, TierThresholds};

use image::RgbImage;
use poster_common::{load_image, resize_to_width, ProcessingError};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Default working width for classification
pub const DEFAULT_CLASSIFY_WIDTH: u32 = 2000;

/// Errors that can occur during classification
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Invalid HSV bounds: {0}")]
    InvalidBounds(String),

    #[error("Invalid tier thresholds: {0}")]
    InvalidThresholds(String),

    #[error("Processing error: {0}")]
    Processing(#[from] ProcessingError),
}

/// Inclusive per-channel HSV range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsvBounds {
    pub lower: Hsv,
    pub upper: Hsv,
}

impl HsvBounds {
    /// Create bounds, checking channel ranges and `lower <= upper`
    pub fn new(lower: Hsv, upper: Hsv) -> Result<Self, ClassifierError> {
        for (name, bound) in [("lower", lower), ("upper", upper)] {
            if bound.h > hsv::HUE_MAX {
                return Err(ClassifierError::InvalidBounds(format!(
                    "{} hue {} exceeds {}",
                    name,
                    bound.h,
                    hsv::HUE_MAX
                )));
            }
        }

        if lower.h > upper.h || lower.s > upper.s || lower.v > upper.v {
            return Err(ClassifierError::InvalidBounds(format!(
                "lower {:?} is not below upper {:?} on every channel",
                lower, upper
            )));
        }

        Ok(Self { lower, upper })
    }

    /// Inclusive range test on all three channels
    #[inline]
    #[must_use]
    pub fn contains(&self, hsv: Hsv) -> bool {
        (self.lower.h..=self.upper.h).contains(&hsv.h)
            && (self.lower.s..=self.upper.s).contains(&hsv.s)
            && (self.lower.v..=self.upper.v).contains(&hsv.v)
    }
}

/// Boolean mask of pixels whose HSV value lies inside `bounds`
#[must_use]
pub fn color_mask(image: &RgbImage, bounds: &HsvBounds) -> Vec<bool> {
    image
        .pixels()
        .map(|p| bounds.contains(rgb_to_hsv(p.0)))
        .collect()
}

/// Presence ratio in percent, rounded to two decimals.
///
/// The image is first resized to `working_width`. An empty image scores 0.
#[must_use]
pub fn classify(image: &RgbImage, bounds: &HsvBounds, working_width: u32) -> f64 {
    let resized = resize_to_width(image, working_width);
    let mask = color_mask(&resized, bounds);

    if mask.is_empty() {
        return 0.0;
    }

    let matching = mask.iter().filter(|&&m| m).count();
    let ratio = matching as f64 / mask.len() as f64 * 100.0;

    debug!(
        "Color mask: {}/{} pixels in range ({}x{})",
        matching,
        mask.len(),
        resized.width(),
        resized.height()
    );

    round2(ratio)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Outcome of classifying one file
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub path: PathBuf,
    pub presence: f64,
    pub tier: MatchTier,
}

/// Load and classify one file
pub fn classify_file(
    path: &Path,
    bounds: &HsvBounds,
    working_width: u32,
    thresholds: &TierThresholds,
    force_top: bool,
) -> Result<Classification, ClassifierError> {
    let image = load_image(path)?;
    let presence = classify(&image.pixels, bounds, working_width);
    let tier = MatchTier::assign(presence, thresholds, force_top);

    Ok(Classification {
        path: path.to_path_buf(),
        presence,
        tier,
    })
}

/// Classify many files in parallel.
///
/// Classification has no side effects, so files are scored on the rayon
/// pool; results come back in input order and a decode failure only
/// affects its own entry.
pub fn classify_batch(
    paths: &[PathBuf],
    bounds: &HsvBounds,
    working_width: u32,
    thresholds: &TierThresholds,
    force_top: bool,
) -> Vec<Result<Classification, ClassifierError>> {
    paths
        .par_iter()
        .map(|path| classify_file(path, bounds, working_width, thresholds, force_top))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn blue_bounds() -> HsvBounds {
        HsvBounds::new(Hsv::new(100, 100, 100), Hsv::new(130, 255, 255)).unwrap()
    }

    #[test]
    fn test_all_matching_image_scores_100() {
        let img = RgbImage::from_pixel(64, 48, Rgb([0, 0, 255]));
        assert_eq!(classify(&img, &blue_bounds(), 200), 100.0);
    }

    #[test]
    fn test_non_matching_image_scores_0() {
        let img = RgbImage::from_pixel(64, 48, Rgb([255, 0, 0]));
        assert_eq!(classify(&img, &blue_bounds(), 200), 0.0);
    }

    #[test]
    fn test_half_matching_image() {
        let mut img = RgbImage::from_pixel(10, 10, Rgb([255, 0, 0]));
        for y in 0..5 {
            for x in 0..10 {
                img.put_pixel(x, y, Rgb([0, 0, 255]));
            }
        }
        // Same width, no resampling
        assert_eq!(classify(&img, &blue_bounds(), 10), 50.0);
    }

    #[test]
    fn test_ratio_is_rounded_to_two_decimals() {
        let mut img = RgbImage::from_pixel(3, 1, Rgb([255, 0, 0]));
        img.put_pixel(0, 0, Rgb([0, 0, 255]));
        assert_eq!(classify(&img, &blue_bounds(), 3), 33.33);
    }

    #[test]
    fn test_ratio_stays_in_range_for_full_bounds() {
        let full = HsvBounds::new(Hsv::new(0, 0, 0), Hsv::new(179, 255, 255)).unwrap();
        let mut img = RgbImage::new(16, 16);
        for (x, y, p) in img.enumerate_pixels_mut() {
            *p = Rgb([(x * 16) as u8, (y * 16) as u8, ((x + y) * 8) as u8]);
        }
        let ratio = classify(&img, &full, 16);
        assert!((0.0..=100.0).contains(&ratio));
        assert_eq!(ratio, 100.0);
    }

    #[test]
    fn test_bounds_reject_inverted_range() {
        let err = HsvBounds::new(Hsv::new(120, 0, 0), Hsv::new(100, 255, 255)).unwrap_err();
        assert!(matches!(err, ClassifierError::InvalidBounds(_)));
    }

    #[test]
    fn test_bounds_reject_hue_above_opencv_range() {
        assert!(HsvBounds::new(Hsv::new(0, 0, 0), Hsv::new(200, 255, 255)).is_err());
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let bounds = HsvBounds::new(Hsv::new(120, 255, 255), Hsv::new(120, 255, 255)).unwrap();
        assert!(bounds.contains(Hsv::new(120, 255, 255)));
        assert!(!bounds.contains(Hsv::new(119, 255, 255)));
    }

    #[test]
    fn test_classify_batch_isolates_decode_failures() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.png");
        let bad = dir.path().join("bad.png");
        RgbImage::from_pixel(20, 20, Rgb([0, 0, 255]))
            .save(&good)
            .unwrap();
        std::fs::write(&bad, b"garbage").unwrap();

        let thresholds = TierThresholds::new(10.0, 5.0).unwrap();
        let results = classify_batch(
            &[good.clone(), bad],
            &blue_bounds(),
            20,
            &thresholds,
            false,
        );

        assert_eq!(results.len(), 2);
        let first = results[0].as_ref().unwrap();
        assert_eq!(first.path, good);
        assert_eq!(first.tier, MatchTier::Top);
        assert!(results[1].is_err());
    }
}
