//! Planning extraction: from an OCR word stream to calendar events
//!
//! The stream is cut into lines, each line is read positionally as
//! `day date time description...`, OCR misreads are repaired field by field,
//! and the date/time fragments are resolved in the configured locale and
//! time zone. Events accumulate in a [`Planning`] that drops duplicates,
//! which is what makes reprocessing the same poster harmless.
//!
//! # Example
//! ```
//! use poster_common::tokens_from_words;
//! use poster_planning::{Planning, PlanningParser, TemporalResolver, FRENCH};
//!
//! let parser = PlanningParser::new(TemporalResolver::new(&FRENCH, chrono_tz::Europe::Paris));
//! let tokens = tokens_from_words(["Samedi", "1O/O5/2O24", "14h3O-16hOO", "Soirée", "wes"]);
//!
//! let mut planning = Planning::new();
//! parser.process(tokens, &mut planning);
//! assert_eq!(planning.events()[0].description, "Soirée WCS");
//! ```

pub mod corrections;
pub mod event;
pub mod export;
pub mod extract;
pub mod locale;
pub mod parser;
pub mod planning;
pub mod segment;
pub mod temporal;

pub use event::{Event, EventRecord};
pub use export::{write_csv, write_csv_to, ExportError, CSV_HEADER};
pub use extract::{extract, ExtractError, FieldSet};
pub use locale::{Locale, FRENCH};
pub use parser::PlanningParser;
pub use planning::Planning;
pub use segment::{segment, Line, Segmenter};
pub use temporal::{TemporalError, TemporalResolver};

use thiserror::Error;

/// Why a line produced no event
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Temporal(#[from] TemporalError),
}
