//! Image loading and width normalization
//!
//! Posters arrive in heterogeneous resolutions. Both the classifier and the
//! recognizer work on a copy resized to a fixed width so pixel counts and
//! per-character pixel density are comparable across sources.

use crate::{ProcessingError, Result};
use image::imageops::FilterType;
use image::RgbImage;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A decoded bitmap together with the file it came from
#[derive(Debug, Clone)]
pub struct PosterImage {
    /// Source file path
    pub path: PathBuf,
    /// Decoded RGB pixels
    pub pixels: RgbImage,
}

impl PosterImage {
    pub fn new(path: impl Into<PathBuf>, pixels: RgbImage) -> Self {
        Self {
            path: path.into(),
            pixels,
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// File name for log lines, falling back to the full path
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Load an image from a file path, automatically detecting format
///
/// # Errors
/// Returns [`ProcessingError::Decode`] if the file cannot be read or decoded.
/// The caller treats this as fatal to that one image only.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<PosterImage> {
    let path = path.as_ref();

    let img = image::open(path).map_err(|e| ProcessingError::Decode {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let pixels = img.to_rgb8();
    if pixels.width() == 0 || pixels.height() == 0 {
        return Err(ProcessingError::InvalidDimensions(format!(
            "{} has zero-sized dimensions ({}x{})",
            path.display(),
            pixels.width(),
            pixels.height()
        )));
    }

    debug!(
        "Loaded {} ({}x{})",
        path.display(),
        pixels.width(),
        pixels.height()
    );

    Ok(PosterImage::new(path, pixels))
}

/// Resize to `width` keeping the aspect ratio.
///
/// The new height is `floor(height * width / original_width)`, never less
/// than one pixel. An image already at the target width is returned as a
/// plain copy.
#[must_use]
pub fn resize_to_width(image: &RgbImage, width: u32) -> RgbImage {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 || width == 0 || w == width {
        return image.clone();
    }

    let ratio = f64::from(width) / f64::from(w);
    let height = ((f64::from(h) * ratio) as u32).max(1);

    image::imageops::resize(image, width, height, FilterType::Triangle)
}
