//! Locale tables for date parsing and day labels

use chrono::Weekday;

/// Month and weekday vocabulary for one language
#[derive(Debug)]
pub struct Locale {
    /// Locale identifier, e.g. `fr_FR`
    pub code: &'static str,
    /// Accepted codes, compared case-insensitively
    aliases: &'static [&'static str],
    /// Accent-folded month names and abbreviations with their number
    months: &'static [(&'static str, u32)],
    /// Weekday names, Monday first
    weekdays: [&'static str; 7],
}

pub static FRENCH: Locale = Locale {
    code: "fr_FR",
    aliases: &["fr_fr", "fr-fr", "fr"],
    months: &[
        ("janvier", 1),
        ("janv", 1),
        ("jan", 1),
        ("fevrier", 2),
        ("fevr", 2),
        ("fev", 2),
        ("mars", 3),
        ("mar", 3),
        ("avril", 4),
        ("avr", 4),
        ("mai", 5),
        ("juin", 6),
        ("juillet", 7),
        ("juil", 7),
        ("aout", 8),
        ("septembre", 9),
        ("sept", 9),
        ("sep", 9),
        ("octobre", 10),
        ("oct", 10),
        ("novembre", 11),
        ("nov", 11),
        ("decembre", 12),
        ("dec", 12),
    ],
    weekdays: [
        "lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi", "dimanche",
    ],
};

static SUPPORTED: &[&Locale] = &[&FRENCH];

impl Locale {
    /// Find a supported locale by code
    #[must_use]
    pub fn from_code(code: &str) -> Option<&'static Locale> {
        let code = code.to_lowercase();
        SUPPORTED
            .iter()
            .copied()
            .find(|l| l.aliases.iter().any(|a| *a == code))
    }

    /// Month number for a month word (accents, case and a trailing dot ignored)
    #[must_use]
    pub fn month(&self, word: &str) -> Option<u32> {
        let key = fold(word.trim_end_matches('.'));
        self.months
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, n)| *n)
    }

    #[must_use]
    pub fn is_weekday(&self, word: &str) -> bool {
        let key = fold(word.trim_end_matches([',', '.']));
        self.weekdays.iter().any(|d| *d == key)
    }

    /// Lowercase weekday name
    #[must_use]
    pub fn weekday_name(&self, day: Weekday) -> &'static str {
        self.weekdays[day.num_days_from_monday() as usize]
    }

    /// Capitalized weekday name, as shown in the planning (`Samedi`)
    #[must_use]
    pub fn day_label(&self, day: Weekday) -> String {
        let name = self.weekday_name(day);
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// Lowercase and strip the accents used in French month and day names
fn fold(word: &str) -> String {
    word.to_lowercase()
        .chars()
        .map(|c| match c {
            'à' | 'â' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'î' | 'ï' => 'i',
            'ô' | 'ö' => 'o',
            'û' | 'ù' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code() {
        assert_eq!(Locale::from_code("fr_FR").unwrap().code, "fr_FR");
        assert!(Locale::from_code("FR").is_some());
        assert!(Locale::from_code("en_US").is_none());
    }

    #[test]
    fn test_month_lookup_folds_accents_and_dots() {
        assert_eq!(FRENCH.month("Février"), Some(2));
        assert_eq!(FRENCH.month("févr."), Some(2));
        assert_eq!(FRENCH.month("AOÛT"), Some(8));
        assert_eq!(FRENCH.month("décembre"), Some(12));
        assert_eq!(FRENCH.month("mardi"), None);
    }

    #[test]
    fn test_weekdays() {
        assert!(FRENCH.is_weekday("Samedi"));
        assert!(FRENCH.is_weekday("dimanche,"));
        assert!(!FRENCH.is_weekday("mai"));
        assert_eq!(FRENCH.day_label(Weekday::Fri), "Vendredi");
        assert_eq!(FRENCH.weekday_name(Weekday::Mon), "lundi");
    }
}
