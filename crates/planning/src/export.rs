//! Canonical CSV interchange file
//!
//! UTF-8 with BOM, `;` delimiter, CRLF line ends, minimal quoting with
//! doubled quote characters. Downstream consumers depend on this exact
//! byte layout.

use crate::event::{Event, DATE_TEXT_FORMAT, TIME_TEXT_FORMAT};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;
use tracing::info;

pub const CSV_HEADER: [&str; 5] = ["day", "date", "start_time", "end_time", "event"];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Write events to any writer
pub fn write_csv_to<'a, W, I>(mut writer: W, events: I) -> Result<usize, ExportError>
where
    W: Write,
    I: IntoIterator<Item = &'a Event>,
{
    writer.write_all(UTF8_BOM)?;

    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .terminator(csv::Terminator::CRLF)
        .quote_style(csv::QuoteStyle::Necessary)
        .double_quote(true)
        .from_writer(writer);

    wtr.write_record(CSV_HEADER)?;

    let mut rows = 0;
    for event in events {
        wtr.write_record([
            event.day_label.clone(),
            event.start.format(DATE_TEXT_FORMAT).to_string(),
            event.start.format(TIME_TEXT_FORMAT).to_string(),
            event.end.format(TIME_TEXT_FORMAT).to_string(),
            event.description.clone(),
        ])?;
        rows += 1;
    }

    wtr.flush()?;
    Ok(rows)
}

/// Write events to `path`, replacing any existing file
pub fn write_csv<'a, P, I>(path: P, events: I) -> Result<usize, ExportError>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = &'a Event>,
{
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = BufWriter::new(File::create(path)?);
    let rows = write_csv_to(file, events)?;
    info!("Wrote {} rows to {}", rows, path.display());
    Ok(rows)
}
