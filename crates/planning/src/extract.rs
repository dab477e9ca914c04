//! Positional field extraction from a recognized line
//!
//! A schedule row reads `day date time description...`. Each position gets
//! its own OCR repairs before the row is handed to the temporal resolver.

use crate::corrections::{
    fix_date_digits, normalize_description_word, normalize_time, split_time_range,
};
use crate::segment::Line;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fewest words a row needs: day, date and time
pub const MIN_WORDS: usize = 3;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Line has {found} words, at least {MIN_WORDS} are required")]
    TooFewWords { found: usize },
}

/// Semantic fields of one row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSet {
    /// Day label as printed, untouched
    pub day: String,
    /// Date after digit repair; month names are left as written
    pub date_raw: String,
    /// Time field after digit repair and format normalization
    pub time_raw: String,
    /// Start part of the time field
    pub start_time_raw: String,
    /// End part of the time field, `00:00` when the row gives no end
    pub end_time_raw: String,
    /// Normalized description words joined by spaces
    pub description: String,
}

/// Map a line's words to fields by position.
pub fn extract(line: &Line) -> Result<FieldSet, ExtractError> {
    let words = line.words();
    if words.len() < MIN_WORDS {
        return Err(ExtractError::TooFewWords { found: words.len() });
    }

    let day = words[0].text.clone();
    let date_raw = fix_date_digits(&words[1].text);
    let time_raw = normalize_time(&words[2].text);
    let (start_time_raw, end_time_raw) = split_time_range(&time_raw);

    let mut description = String::new();
    for word in &words[MIN_WORDS..] {
        let fixed = normalize_description_word(&word.text, description.is_empty());
        if fixed.is_empty() {
            continue;
        }
        if !description.is_empty() {
            description.push(' ');
        }
        description.push_str(&fixed);
    }

    Ok(FieldSet {
        day,
        date_raw,
        time_raw,
        start_time_raw,
        end_time_raw,
        description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use poster_common::tokens_from_words;

    fn line(words: &[&str]) -> Line {
        Line::new(tokens_from_words(words.iter().copied())).unwrap()
    }

    #[test]
    fn test_extract_poster_row() {
        let fields = extract(&line(&[
            "Samedi",
            "1O/O5/2O24",
            "14h3O-16hOO",
            "Soirée",
            "wes",
            "a",
            "l'Impasse",
        ]))
        .unwrap();

        assert_eq!(fields.day, "Samedi");
        assert_eq!(fields.date_raw, "10/05/2024");
        assert_eq!(fields.time_raw, "14:30-16:00");
        assert_eq!(fields.start_time_raw, "14:30");
        assert_eq!(fields.end_time_raw, "16:00");
        assert_eq!(fields.description, "Soirée WCS à L'Impasse");
    }

    #[test]
    fn test_month_name_survives_date_repair() {
        let fields = extract(&line(&["Jeudi", "3I/Octobre/2O24", "2Oh", "bal"])).unwrap();
        assert_eq!(fields.date_raw, "31/Octobre/2024");
    }

    #[test]
    fn test_single_time_gets_unknown_end() {
        let fields = extract(&line(&["Vendredi", "17/05/2024", "2Ih", "bal", "rock"])).unwrap();
        assert_eq!(fields.start_time_raw, "21:");
        assert_eq!(fields.end_time_raw, "00:00");
        assert_eq!(fields.description, "Bal Rock");
    }

    #[test]
    fn test_three_words_give_empty_description() {
        let fields = extract(&line(&["Lundi", "13/05/2024", "19h-22h"])).unwrap();
        assert!(fields.description.is_empty());
    }

    #[test]
    fn test_two_words_are_rejected() {
        assert_eq!(
            extract(&line(&["Samedi", "10/05/2024"])),
            Err(ExtractError::TooFewWords { found: 2 })
        );
    }

    #[test]
    fn test_first_description_word_apostrophe_repair() {
        let fields = extract(&line(&["Jeudi", "16/05/2024", "20h", "'atelier", "'swing"])).unwrap();
        // Second word is not repaired, only title-cased
        assert_eq!(fields.description, "L'atelier 'Swing");
    }

    #[test]
    fn test_empty_words_after_repair_are_skipped() {
        let fields = extract(&line(&["Jeudi", "16/05/2024", "20h", "'", "stage"])).unwrap();
        assert_eq!(fields.description, "Stage");
    }
}
