//! CSV ingestion and cleaning.
//!
//! The input is a row-oriented table with exactly four logical columns in
//! order: year, month, transaction volume, transaction value. Header text is
//! ignored entirely; columns are reassigned by position. Rows that fail
//! numeric coercion are dropped, not fatal — the only fatal condition is an
//! unopenable input file.

use std::fs::File;
use std::path::Path;

use tracing::{debug, info};

use crate::core::{first_of_month, MonthlySeries, Observation};
use crate::error::{PipelineError, Result};

/// Counts describing what the cleaning pass kept and discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    /// Data rows read from the file (header excluded).
    pub rows_read: usize,
    /// Rows discarded for missing/unparseable fields or invalid dates.
    pub rows_dropped: usize,
}

impl LoadSummary {
    pub fn rows_retained(&self) -> usize {
        self.rows_read - self.rows_dropped
    }
}

/// Load the raw CSV at `path` into a validated [`MonthlySeries`].
///
/// Retained rows are sorted by period before series construction, so the
/// period is the ordering key for every downstream step. Duplicate periods
/// or calendar gaps among the retained rows are construction errors, not
/// silent corruption.
pub fn load_series(path: &Path) -> Result<(MonthlySeries, LoadSummary)> {
    let file = File::open(path).map_err(|source| PipelineError::InputUnreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut observations = Vec::new();
    let mut rows_read = 0usize;
    let mut rows_dropped = 0usize;

    for record in reader.records() {
        let record = record?;
        rows_read += 1;

        match coerce_row(&record) {
            Some(observation) => observations.push(observation),
            None => {
                rows_dropped += 1;
                debug!(row = rows_read, "dropped row with missing or invalid fields");
            }
        }
    }

    observations.sort_by_key(|o| o.period);
    let series = MonthlySeries::from_observations(observations)?;

    let summary = LoadSummary {
        rows_read,
        rows_dropped,
    };
    info!(
        retained = summary.rows_retained(),
        dropped = rows_dropped,
        "input data loaded and cleaned"
    );

    Ok((series, summary))
}

/// Coerce one positional record into an observation.
///
/// Returns `None` when any field is missing, unparseable, non-finite, or
/// the (year, month) pair does not name a real calendar month — the
/// row-level defect policy is drop, never abort.
fn coerce_row(record: &csv::StringRecord) -> Option<Observation> {
    let year: i32 = parse_field(record, 0)?;
    let month: u32 = parse_field(record, 1)?;
    let volume: f64 = parse_field(record, 2)?;
    let value: f64 = parse_field(record, 3)?;

    let period = first_of_month(year, month)?;
    if !volume.is_finite() || volume < 0.0 || !value.is_finite() || value < 0.0 {
        return None;
    }

    Some(Observation {
        period,
        volume,
        value,
    })
}

fn parse_field<T: std::str::FromStr>(record: &csv::StringRecord, index: usize) -> Option<T> {
    record
        .get(index)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse().ok())
}
