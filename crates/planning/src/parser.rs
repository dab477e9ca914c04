//! Token stream to events: segment, extract, resolve, assemble

use crate::event::Event;
use crate::extract::extract;
use crate::planning::Planning;
use crate::segment::{segment, Line};
use crate::temporal::TemporalResolver;
use crate::ParseError;
use poster_common::WordToken;
use tracing::{debug, info, warn};

/// Extracts schedule rows from one image's token stream
#[derive(Debug, Clone)]
pub struct PlanningParser {
    resolver: TemporalResolver,
}

impl PlanningParser {
    pub fn new(resolver: TemporalResolver) -> Self {
        Self { resolver }
    }

    #[must_use]
    pub fn resolver(&self) -> &TemporalResolver {
        &self.resolver
    }

    /// Turn one line into an event
    pub fn parse_line(&self, line: &Line) -> Result<Event, ParseError> {
        let fields = extract(line)?;
        let (start, end) = self.resolver.resolve(
            &fields.date_raw,
            &fields.start_time_raw,
            &fields.end_time_raw,
        )?;

        Ok(Event::assemble(
            &fields,
            start,
            end,
            self.resolver.locale(),
            line.texts(),
        ))
    }

    /// Parse every line of a token stream.
    ///
    /// A line that cannot be parsed is logged and dropped; the rest of the
    /// stream is still processed.
    pub fn parse_tokens<I>(&self, tokens: I) -> Vec<Event>
    where
        I: IntoIterator<Item = WordToken>,
    {
        let lines = segment(tokens);
        debug!("Segmented {} lines", lines.len());

        let mut events = Vec::with_capacity(lines.len());
        for line in &lines {
            match self.parse_line(line) {
                Ok(event) => {
                    debug!("Parsed: {}", event);
                    events.push(event);
                }
                Err(ParseError::Extract(e)) => {
                    debug!("Skipping line {:?}: {}", line.texts(), e);
                }
                Err(e) => {
                    warn!("Failed to generate event from {:?}: {}", line.texts(), e);
                }
            }
        }
        events
    }

    /// Parse a token stream and add its events to `planning`.
    ///
    /// Returns how many events were new.
    pub fn process<I>(&self, tokens: I, planning: &mut Planning) -> usize
    where
        I: IntoIterator<Item = WordToken>,
    {
        let events = self.parse_tokens(tokens);
        let parsed = events.len();
        let added = planning.add_all(events);

        info!(">> Added Events: {} ({} parsed)", added, parsed);
        info!(">> Total Events: {}", planning.len());
        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::FRENCH;
    use crate::TemporalError;
    use chrono::NaiveDate;
    use poster_common::tokens_from_words;

    fn parser() -> PlanningParser {
        PlanningParser::new(
            TemporalResolver::new(&FRENCH, chrono_tz::Europe::Paris)
                .with_reference_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
        )
    }

    fn stream() -> Vec<WordToken> {
        tokens_from_words([
            "", "", "",
            "Samedi", "1O/O5/2O24", "14h3O-16hOO", "Soirée", "wes", "a", "l'Impasse",
            "", "",
            "Samedi", "11/05/2024",
            "",
            "Vendredi", "1O/O5/2O24", "23h3O-OIhOO", "Bal", "rock",
            "",
            "Dimanche", "32/05/2024", "20h", "Broken",
            "",
        ])
    }

    #[test]
    fn test_parse_tokens_keeps_good_rows() {
        let events = parser().parse_tokens(stream());
        assert_eq!(events.len(), 2);

        assert_eq!(events[0].description, "Soirée WCS à L'Impasse");
        assert_eq!(events[0].start.to_rfc3339(), "2024-05-10T14:30:00+02:00");
        assert_eq!(events[0].end.to_rfc3339(), "2024-05-10T16:00:00+02:00");
        assert_eq!(events[0].source_fragments[1], "1O/O5/2O24");

        assert_eq!(events[1].description, "Bal Rock");
        assert_eq!(events[1].end.to_rfc3339(), "2024-05-11T01:00:00+02:00");
    }

    #[test]
    fn test_parse_line_reports_temporal_failure() {
        let line = Line::new(tokens_from_words(["Dimanche", "32/05/2024", "20h", "x"])).unwrap();
        assert!(matches!(
            parser().parse_line(&line),
            Err(ParseError::Temporal(TemporalError::InvalidDate(_)))
        ));
    }

    #[test]
    fn test_month_name_dates_reach_the_planning() {
        let events = parser().parse_tokens(tokens_from_words([
            "Samedi", "II/mai/2O24", "2Ih-O2h", "bal", "rock", "",
            "Jeudi", "3I/Octobre/2O24", "I9h-2Ih", "stage", "salsa",
        ]));
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].start.to_rfc3339(), "2024-05-11T21:00:00+02:00");
        assert_eq!(events[0].end.to_rfc3339(), "2024-05-12T02:00:00+02:00");
        assert_eq!(events[0].day_label, "Samedi");
        assert_eq!(events[1].start.to_rfc3339(), "2024-10-31T19:00:00+01:00");
        assert_eq!(events[1].description, "Stage Salsa");
    }

    #[test]
    fn test_two_word_line_is_skipped() {
        let events = parser().parse_tokens(tokens_from_words(["Samedi", "10/05/2024"]));
        assert!(events.is_empty());
    }

    #[test]
    fn test_empty_stream_yields_nothing() {
        assert!(parser().parse_tokens(Vec::new()).is_empty());
    }

    #[test]
    fn test_process_twice_adds_nothing_new() {
        let parser = parser();
        let mut planning = Planning::new();
        assert_eq!(parser.process(stream(), &mut planning), 2);
        assert_eq!(parser.process(stream(), &mut planning), 0);
        assert_eq!(planning.len(), 2);
    }
}
