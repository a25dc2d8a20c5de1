//! Error types for the pipeline.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that can occur while running the pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The input file could not be opened. Fatal: nothing is processed
    /// and no output files are written.
    #[error("cannot open input file '{path}': {source}")]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV reader failed at the record level.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// No valid rows remained after cleaning.
    #[error("no valid rows remain after cleaning")]
    EmptySeries,

    /// Parallel columns of a series disagree in length.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// A period repeats or goes backwards.
    #[error("periods must be strictly increasing (violation at {period})")]
    NonMonotonicPeriod { period: NaiveDate },

    /// The cleaned series skips one or more calendar months.
    #[error("monthly gap in series: expected {expected}, found {found}")]
    PeriodGap {
        expected: NaiveDate,
        found: NaiveDate,
    },

    /// A period is not anchored to the first day of its month.
    #[error("period {period} is not a first-of-month date")]
    UnanchoredPeriod { period: NaiveDate },

    /// An observation is negative or non-finite.
    #[error("invalid {field} at {period}: {got}")]
    InvalidObservation {
        period: NaiveDate,
        field: &'static str,
        got: f64,
    },

    /// Not enough history for the requested operation.
    #[error("insufficient history: need at least {needed} months, got {got}")]
    InsufficientHistory { needed: usize, got: usize },

    /// Model has not been fitted yet.
    #[error("model must be fitted before prediction")]
    FitRequired,

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A chart artifact could not be rendered.
    #[error("chart rendering failed: {0}")]
    ChartRender(String),

    /// An output file could not be written.
    #[error("failed to write '{path}': {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
