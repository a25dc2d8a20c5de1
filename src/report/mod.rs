//! Reporting sink boundary.
//!
//! The pipeline core hands the sink period-indexed numeric series and
//! nothing more; how (or whether) they become image artifacts is the
//! sink's concern. The shipped implementation renders SVG charts.

mod charts;

pub use charts::SvgCharts;

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::core::ForecastTable;
use crate::decompose::Decomposition;
use crate::error::Result;

/// A prepared, period-indexed numeric series.
#[derive(Debug, Clone, Copy)]
pub struct SeriesView<'a> {
    pub periods: &'a [NaiveDate],
    pub values: &'a [f64],
    pub label: &'a str,
}

impl<'a> SeriesView<'a> {
    pub fn new(periods: &'a [NaiveDate], values: &'a [f64], label: &'a str) -> Self {
        Self {
            periods,
            values,
            label,
        }
    }
}

/// Consumer of prepared series; produces one artifact per call and returns
/// its path.
pub trait ReportingSink {
    /// Volume over time with value on a secondary axis.
    fn volume_growth_chart(
        &self,
        volume: SeriesView<'_>,
        value: SeriesView<'_>,
    ) -> Result<PathBuf>;

    /// Month-of-year × year grid of volumes.
    fn seasonal_heatmap(&self, volume: SeriesView<'_>) -> Result<PathBuf>;

    /// Observed / trend / seasonal / residual panels.
    fn decomposition_chart(&self, decomposition: &Decomposition) -> Result<PathBuf>;

    /// History overlaid with the point forecast and its interval band.
    fn forecast_chart(
        &self,
        history: SeriesView<'_>,
        forecast: &ForecastTable,
    ) -> Result<PathBuf>;
}
