//! The pluggable forecasting capability.
//!
//! The pipeline core depends only on [`Forecaster`]; any model satisfying
//! the contract (fit on a series, predict points with uncertainty bounds
//! for a horizon) is substitutable.

mod seasonal;

pub use seasonal::YearlySeasonalSmoothing;

use crate::core::MonthlySeries;
use crate::error::{PipelineError, Result};
use crate::utils::quantile_normal;

/// Point forecasts with lower/upper interval bounds, index-aligned.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalForecast {
    pub point: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

impl IntervalForecast {
    pub fn len(&self) -> usize {
        self.point.len()
    }

    pub fn is_empty(&self) -> bool {
        self.point.is_empty()
    }
}

/// Common interface for forecasting models.
///
/// Object-safe; usable as `Box<dyn Forecaster>`.
pub trait Forecaster {
    /// Fit the model to the volume column of `series`.
    fn fit(&mut self, series: &MonthlySeries) -> Result<()>;

    /// Point predictions for the next `horizon` months.
    fn predict(&self, horizon: usize) -> Result<Vec<f64>>;

    /// Point predictions plus interval bounds at confidence `level`
    /// (e.g. 0.95).
    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<IntervalForecast>;

    /// In-sample predictions, one per training period.
    fn fitted_values(&self) -> Option<&[f64]>;

    /// Training residuals (actual − fitted).
    fn residuals(&self) -> Option<&[f64]>;

    /// Display name of the model.
    fn name(&self) -> &str;

    fn is_fitted(&self) -> bool {
        self.fitted_values().is_some()
    }

    /// In-sample re-prediction with bands derived from the residual
    /// spread, so a consumer can overlay fit-vs-actual with uncertainty.
    fn fitted_with_intervals(&self, level: f64) -> Result<IntervalForecast> {
        let fitted = self.fitted_values().ok_or(PipelineError::FitRequired)?;
        let residuals = self.residuals().ok_or(PipelineError::FitRequired)?;

        let n = residuals.len().max(1);
        let sd = (residuals.iter().map(|r| r * r).sum::<f64>() / n as f64).sqrt();
        let z = quantile_normal((1.0 + level) / 2.0);

        Ok(IntervalForecast {
            point: fitted.to_vec(),
            lower: fitted.iter().map(|f| f - z * sd).collect(),
            upper: fitted.iter().map(|f| f + z * sd).collect(),
        })
    }
}

/// Type alias for boxed forecaster trait objects.
pub type BoxedForecaster = Box<dyn Forecaster>;
