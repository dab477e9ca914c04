//! Resolution of poster date and time fragments into timestamps
//!
//! A row gives one calendar date and a start/end time of day. Both times
//! are attached to that date in the configured time zone. When the end
//! hour is smaller than the start hour the event is taken to run past
//! midnight and the end moves to the next day. Only hours are compared and
//! the span never exceeds one day.

use crate::locale::Locale;
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

static NUMERIC_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})[/.\-](\d{1,2})(?:[/.\-](\d{4}|\d{2}))?$").expect("valid regex")
});

/// Month name inside a single word: `10/mai/2024`, `1erjuin`, `3févr.2025`
static MONTH_NAME_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})(?:er)?[/.\-]?(\p{L}+)\.?(?:[/.\-]?(\d{4}|\d{2}))?$")
        .expect("valid regex")
});

static DAY_OF_MONTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})(?:er)?$").expect("valid regex"));

static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4}|\d{2})$").expect("valid regex"));

static TIME_OF_DAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})(?::(?:(\d{2})(?::(\d{2}))?)?)?$").expect("valid regex")
});

/// Errors raised while resolving one row
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Unparseable date: {0:?}")]
    InvalidDate(String),

    #[error("Unparseable time: {0:?}")]
    InvalidTime(String),

    #[error("Unknown time zone: {0}")]
    UnknownTimezone(String),

    #[error("Unsupported locale: {0}")]
    UnsupportedLocale(String),

    #[error("Local time {0} does not exist in the configured time zone")]
    NonexistentLocalTime(String),

    #[error("Date out of range after {0}")]
    DateOverflow(String),
}

/// Parses locale-specific fragments and attaches the time zone
#[derive(Debug, Clone)]
pub struct TemporalResolver {
    locale: &'static Locale,
    timezone: Tz,
    /// Supplies the year when a date omits it
    reference_date: NaiveDate,
}

impl TemporalResolver {
    pub fn new(locale: &'static Locale, timezone: Tz) -> Self {
        let reference_date = Utc::now().with_timezone(&timezone).date_naive();
        Self {
            locale,
            timezone,
            reference_date,
        }
    }

    /// Build from a locale code and an IANA zone name
    pub fn from_names(locale: &str, timezone: &str) -> Result<Self, TemporalError> {
        let locale = Locale::from_code(locale)
            .ok_or_else(|| TemporalError::UnsupportedLocale(locale.to_string()))?;
        let timezone: Tz = timezone
            .parse()
            .map_err(|_| TemporalError::UnknownTimezone(timezone.to_string()))?;
        Ok(Self::new(locale, timezone))
    }

    #[must_use]
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = date;
        self
    }

    #[must_use]
    pub fn locale(&self) -> &'static Locale {
        self.locale
    }

    #[must_use]
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Parse a day-month-year date, numeric or with a month name.
    ///
    /// The month name may be glued to the numbers or set off by `/`, `.`,
    /// `-` or spaces.
    pub fn parse_date(&self, raw: &str) -> Result<NaiveDate, TemporalError> {
        let invalid = || TemporalError::InvalidDate(raw.to_string());
        let text = raw.trim();

        let (day, month, year) = if let Some(caps) = NUMERIC_DATE.captures(text) {
            let day: u32 = caps[1].parse().map_err(|_| invalid())?;
            let month: u32 = caps[2].parse().map_err(|_| invalid())?;
            let year = caps.get(3).map(|m| m.as_str());
            (day, month, year)
        } else if let Some(caps) = MONTH_NAME_DATE.captures(text) {
            let day: u32 = caps[1].parse().map_err(|_| invalid())?;
            let month = self.locale.month(&caps[2]).ok_or_else(invalid)?;
            let year = caps.get(3).map(|m| m.as_str());
            (day, month, year)
        } else {
            self.parse_textual_date(text).ok_or_else(invalid)?
        };

        let year = match year {
            Some(y) => expand_year(y).ok_or_else(invalid)?,
            None => self.reference_date.year(),
        };

        NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
    }

    /// `[weekday] day month [year]`, e.g. `samedi 1er juin 2024`
    fn parse_textual_date<'a>(&self, text: &'a str) -> Option<(u32, u32, Option<&'a str>)> {
        let mut words = text
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|w| !w.is_empty())
            .peekable();

        if words.peek().is_some_and(|w| self.locale.is_weekday(w)) {
            words.next();
        }

        let day = DAY_OF_MONTH.captures(words.next()?)?[1].parse().ok()?;
        let month = self.locale.month(words.next()?)?;
        let year = match words.next() {
            Some(y) if YEAR.is_match(y) => Some(y),
            Some(_) => return None,
            None => None,
        };
        if words.next().is_some() {
            return None;
        }
        Some((day, month, year))
    }

    /// Parse a time of day; any date part is ignored by construction.
    pub fn parse_time(&self, raw: &str) -> Result<NaiveTime, TemporalError> {
        let invalid = || TemporalError::InvalidTime(raw.to_string());
        let caps = TIME_OF_DAY.captures(raw.trim()).ok_or_else(invalid)?;

        let field = |i: usize| -> Result<u32, TemporalError> {
            caps.get(i)
                .map_or(Ok(0), |m| m.as_str().parse().map_err(|_| invalid()))
        };

        NaiveTime::from_hms_opt(field(1)?, field(2)?, field(3)?).ok_or_else(invalid)
    }

    /// Resolve a row's date and times into a start/end pair.
    pub fn resolve(
        &self,
        date_raw: &str,
        start_time_raw: &str,
        end_time_raw: &str,
    ) -> Result<(DateTime<FixedOffset>, DateTime<FixedOffset>), TemporalError> {
        let date = self.parse_date(date_raw)?;
        let start_time = self.parse_time(start_time_raw)?;
        let end_time = self.parse_time(end_time_raw)?;

        let end_date = if end_time.hour() < start_time.hour() {
            debug!(
                "End {} before start {}, rolling over to next day",
                end_time, start_time
            );
            date.succ_opt()
                .ok_or_else(|| TemporalError::DateOverflow(date.to_string()))?
        } else {
            date
        };

        let start = self.localize(date, start_time)?;
        let end = self.localize(end_date, end_time)?;
        Ok((start, end))
    }

    fn localize(
        &self,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<DateTime<FixedOffset>, TemporalError> {
        let naive = date.and_time(time);
        self.timezone
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.fixed_offset())
            .ok_or_else(|| TemporalError::NonexistentLocalTime(naive.to_string()))
    }
}

/// Two-digit years are in the 2000s
fn expand_year(year: &str) -> Option<i32> {
    let value: i32 = year.parse().ok()?;
    match year.len() {
        2 => Some(2000 + value),
        4 => Some(value),
        _ => None,
    }
}
