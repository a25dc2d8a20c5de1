//! # upi-forecast
//!
//! Analysis and forecasting pipeline for monthly UPI transaction data.
//!
//! Reads raw (year, month, volume, value) rows, cleans them into a
//! validated monthly series, derives per-period metrics, renders seasonal
//! EDA charts, scores a yearly-seasonality forecasting model on a trailing
//! 12-month holdout, and extends the series 24 months ahead with
//! uncertainty bounds.

pub mod core;
pub mod decompose;
pub mod error;
pub mod eval;
pub mod features;
pub mod ingest;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod utils;

pub use error::{PipelineError, Result};

pub mod prelude {
    pub use crate::core::{ForecastTable, MonthlySeries};
    pub use crate::error::{PipelineError, Result};
    pub use crate::eval::{evaluate, AccuracyMetrics, EvaluationReport};
    pub use crate::models::{Forecaster, YearlySeasonalSmoothing};
    pub use crate::pipeline::{run, PipelineConfig, RunSummary};
}
