/// Common types and utilities for poster event extraction
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod image_io;

pub use image_io::{load_image, resize_to_width, PosterImage};

/// Processing errors
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("Failed to decode image {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("Invalid image dimensions: {0}")]
    InvalidDimensions(String),

    #[error("Image processing error: {0}")]
    ImageError(String),
}

impl From<image::ImageError> for ProcessingError {
    fn from(err: image::ImageError) -> Self {
        ProcessingError::ImageError(err.to_string())
    }
}

/// Result type for processing operations
pub type Result<T> = std::result::Result<T, ProcessingError>;

/// One recognized word in reading order.
///
/// An empty `text` is a line-boundary sentinel emitted by the recognizer
/// between lines and paragraphs, not a real word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordToken {
    pub text: String,
    pub sequence_index: usize,
}

impl WordToken {
    pub fn new(text: impl Into<String>, sequence_index: usize) -> Self {
        Self {
            text: text.into(),
            sequence_index,
        }
    }

    /// Line-boundary sentinel at the given position
    pub fn boundary(sequence_index: usize) -> Self {
        Self::new(String::new(), sequence_index)
    }

    #[must_use]
    pub fn is_boundary(&self) -> bool {
        self.text.is_empty()
    }
}

/// Build a token stream from plain strings, numbering them in order.
pub fn tokens_from_words<I, S>(words: I) -> Vec<WordToken>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    words
        .into_iter()
        .enumerate()
        .map(|(i, w)| WordToken::new(w, i))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_token() {
        let token = WordToken::boundary(3);
        assert!(token.is_boundary());
        assert_eq!(token.sequence_index, 3);
        assert!(!WordToken::new("Samedi", 0).is_boundary());
    }

    #[test]
    fn test_tokens_from_words_numbers_in_order() {
        let tokens = tokens_from_words(["", "Samedi", "", "Dimanche"]);
        assert_eq!(tokens.len(), 4);
        assert!(tokens[0].is_boundary());
        assert_eq!(tokens[3].text, "Dimanche");
        assert_eq!(tokens[3].sequence_index, 3);
    }

    #[test]
    fn test_image_error_conversion() {
        let err: ProcessingError = image::ImageError::Limits(
            image::error::LimitError::from_kind(image::error::LimitErrorKind::DimensionError),
        )
        .into();
        assert!(matches!(err, ProcessingError::ImageError(_)));
    }
}
