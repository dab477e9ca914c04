//! Shared helpers for the integration suites

#![allow(dead_code)]

use image::{Rgb, RgbImage};
use poster_cli::AppConfig;
use poster_common::{tokens_from_words, WordToken};
use poster_ocr::{OCRError, Recognizer};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Blue, inside the detection range of [`test_config`]
pub const POSTER_BLUE: [u8; 3] = [20, 40, 230];
/// Red, outside of it
pub const PHOTO_RED: [u8; 3] = [220, 30, 30];

/// Returns one scripted page per call, in order, then empty pages
pub struct ScriptedRecognizer {
    pages: Vec<Vec<&'static str>>,
    calls: AtomicUsize,
}

impl ScriptedRecognizer {
    pub fn new(pages: Vec<Vec<&'static str>>) -> Self {
        Self {
            pages,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Recognizer for ScriptedRecognizer {
    fn recognize(&self, _image: &RgbImage) -> Result<Vec<WordToken>, OCRError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let page = self.pages.get(call).cloned().unwrap_or_default();
        Ok(tokens_from_words(page))
    }
}

/// Page with two schedule rows, framed the way Tesseract frames lines
pub fn weekend_page() -> Vec<&'static str> {
    vec![
        "", "", "", "",
        "Samedi", "1O/O5/2O24", "14h3O-16hOO", "Soirée", "wes", "a", "l'Impasse",
        "",
        "Samedi", "1O/O5/2O24", "23h3O-OIhOO", "Bal", "rock",
        "",
        "PLANNING",
    ]
}

/// Page repeating the first row of [`weekend_page`] plus a new one
pub fn sunday_page() -> Vec<&'static str> {
    vec![
        "", "",
        "Samedi", "1O/O5/2O24", "14h3O-16hOO", "Soirée", "wes", "a", "l'Impasse",
        "", "",
        "Dimanche", "I2/O5/2O24", "I5h", "stage", "sbk",
        "",
    ]
}

pub fn test_config(output: &Path, storage: &str, calendar: &str) -> AppConfig {
    let yaml = format!(
        "parser:\n  classify-width: 64\n  resize-width: null\n  \
         detection-lower-color-hsv: [100, 100, 100]\n  \
         detection-upper-color-hsv: [130, 255, 255]\n\
         folders:\n  output: {output}\n\
         storage:\n{storage}\n\
         calendar:\n{calendar}\n",
        output = output.display(),
        storage = storage,
        calendar = calendar,
    );
    AppConfig::from_yaml_str(&yaml).expect("valid test configuration")
}

pub fn write_image(path: &Path, color: [u8; 3]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    RgbImage::from_pixel(48, 64, Rgb(color)).save(path).unwrap();
}
