//! OCR correction tables and the per-field normalizers built on them
//!
//! Every correction is a plain lookup table so it can be checked on its own.
//! Words that no rule recognizes pass through untouched.

use once_cell::sync::Lazy;
use regex::Regex;

/// Letters Tesseract returns in place of digits in date and time fields
pub const DIGIT_SUBSTITUTIONS: &[(char, char)] = &[
    ('S', '5'),
    ('I', '1'),
    ('O', '0'),
    ('§', '5'),
    ('T', '7'),
];

/// Hour/minute separator printed on posters, rewritten for the time parser
pub const TIME_SEPARATOR: (&str, &str) = ("h", ":");

/// Midnight written as the end of the day
pub const WRAPAROUND_MIDNIGHT: (&str, &str) = ("24:00", "00:00");

/// End time used when the time field has no range
pub const UNKNOWN_END_TIME: &str = "00:00";

/// Whole-word fixes, matched case-insensitively. Their output is final.
pub const WORD_FIXES: &[(&str, &str)] = &[
    ("wes", "WCS"),
    ("dj", "DJ"),
    ("sbk", "SBK"),
    ("a", "à"),
];

/// Typographic quotes folded to plain ones
pub const QUOTE_FIXES: &[(char, char)] = &[
    ('\u{2018}', '\''),
    ('\u{2019}', '\''),
    ('\u{201C}', '"'),
    ('\u{201D}', '"'),
];

/// Substring misreads
pub const MISREAD_FIXES: &[(&str, &str)] = &[("I'", "L'"), ("lmpasse", "Impasse")];

/// Dance styles recognized in descriptions, keyed by lowercase word
pub const DANCE_STYLES: &[(&str, &str)] = &[
    ("wcs", "WCS"),
    ("sbk", "SBK"),
    ("rock", "Rock"),
    ("salsa", "Salsa"),
    ("bachata", "Bachata"),
    ("kizomba", "Kizomba"),
    ("swing", "Swing"),
    ("lindy", "Lindy"),
];

static CONSONANT_APOSTROPHE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z]'").expect("valid regex"));

static LEADING_APOSTROPHE_VOWEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^'[aeiouyAEIOUY\u{00C0}-\u{017F}]").expect("valid regex"));

/// Rewrite digit look-alikes
#[must_use]
pub fn fix_digits(word: &str) -> String {
    word.chars()
        .map(|c| {
            DIGIT_SUBSTITUTIONS
                .iter()
                .find(|(from, _)| *from == c)
                .map_or(c, |(_, to)| *to)
        })
        .collect()
}

/// Digit fixes for a date field.
///
/// A run of letters is only rewritten when every letter in it is a digit
/// look-alike, so month names (`Octobre`, `SEPT`) survive.
#[must_use]
pub fn fix_date_digits(word: &str) -> String {
    let is_lookalike = |c: char| DIGIT_SUBSTITUTIONS.iter().any(|(from, _)| *from == c);

    let mut out = String::with_capacity(word.len());
    let mut run = String::new();
    for c in word.chars().chain(std::iter::once(' ')) {
        if c.is_alphabetic() || is_lookalike(c) {
            run.push(c);
            continue;
        }
        if run.chars().all(is_lookalike) {
            out.push_str(&fix_digits(&run));
        } else {
            out.push_str(&run);
        }
        run.clear();
        out.push(c);
    }
    out.pop();
    out
}

/// Digit fixes plus separator and midnight rewrites for a time field
#[must_use]
pub fn normalize_time(word: &str) -> String {
    fix_digits(word)
        .replace(TIME_SEPARATOR.0, TIME_SEPARATOR.1)
        .replace(WRAPAROUND_MIDNIGHT.0, WRAPAROUND_MIDNIGHT.1)
}

/// Split a normalized time field into start and end.
///
/// Without a dash the end is [`UNKNOWN_END_TIME`]. Parts beyond the second
/// are ignored.
#[must_use]
pub fn split_time_range(normalized: &str) -> (String, String) {
    if normalized.contains('-') {
        let mut parts = normalized.split('-');
        let start = parts.next().unwrap_or_default().to_string();
        let end = parts.next().unwrap_or_default().to_string();
        (start, end)
    } else {
        (normalized.to_string(), UNKNOWN_END_TIME.to_string())
    }
}

/// Look up a whole-word fix
#[must_use]
pub fn word_fix(word: &str) -> Option<&'static str> {
    let lower = word.to_lowercase();
    WORD_FIXES
        .iter()
        .find(|(from, _)| *from == lower)
        .map(|(_, to)| *to)
}

#[must_use]
pub fn fix_quotes(word: &str) -> String {
    word.chars()
        .map(|c| {
            QUOTE_FIXES
                .iter()
                .find(|(from, _)| *from == c)
                .map_or(c, |(_, to)| *to)
        })
        .collect()
}

#[must_use]
pub fn fix_misreads(word: &str) -> String {
    MISREAD_FIXES
        .iter()
        .fold(word.to_string(), |acc, &(from, to)| acc.replace(from, to))
}

/// `l'impasse` -> `L'impasse`
#[must_use]
pub fn fix_consonant_apostrophe(word: &str) -> String {
    if !CONSONANT_APOSTROPHE.is_match(word) {
        return word.to_string();
    }
    // The match guarantees an ASCII letter then an apostrophe
    let (head, tail) = word.split_at(2);
    format!("{}{}", head.to_ascii_uppercase(), tail)
}

/// A dropped leading consonant before a vowel is assumed to be `L`;
/// otherwise the stray apostrophes are removed.
#[must_use]
pub fn fix_leading_apostrophe(word: &str) -> String {
    if !word.starts_with('\'') {
        return word.to_string();
    }
    if LEADING_APOSTROPHE_VOWEL.is_match(word) {
        format!("L{}", word)
    } else {
        word.trim_start_matches('\'').to_string()
    }
}

/// Upper-case the first letter of every run of letters, lower-case the rest.
#[must_use]
pub fn title_case(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut previous_is_letter = false;
    for c in word.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(c);
            previous_is_letter = false;
        }
    }
    out
}

/// Normalize one description word.
///
/// `is_first` enables the leading-apostrophe repair, which only applies to
/// the first word of a description.
#[must_use]
pub fn normalize_description_word(word: &str, is_first: bool) -> String {
    let (fixed, final_case) = match word_fix(word) {
        Some(fix) => (fix.to_string(), true),
        None => (word.to_string(), false),
    };

    let mut fixed = fix_misreads(&fix_quotes(&fixed));
    fixed = fix_consonant_apostrophe(&fixed);
    if is_first {
        fixed = fix_leading_apostrophe(&fixed);
    }

    if !final_case && fixed.to_lowercase() == fixed {
        fixed = title_case(&fixed);
    }
    fixed
}

/// Dance styles named in a description, in order of first appearance
#[must_use]
pub fn detect_dances(description: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for word in description.split_whitespace() {
        let key = word
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        if let Some((_, style)) = DANCE_STYLES.iter().find(|(k, _)| *k == key) {
            if !found.iter().any(|f| f == style) {
                found.push((*style).to_string());
            }
        }
    }
    found
}
