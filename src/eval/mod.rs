//! Held-out accuracy evaluation.
//!
//! The series is partitioned by count into a training prefix and the
//! trailing twelve months. The model is fitted on the prefix only and asked
//! to predict exactly the holdout span; the holdout volumes never reach the
//! model, so the resulting MAE/RMSE is a leakage-free estimate of forecast
//! accuracy one year out.

mod metrics;

pub use metrics::{calculate_metrics, AccuracyMetrics};

use tracing::info;

use crate::core::{ForecastTable, MonthlySeries, MONTHS_PER_YEAR};
use crate::error::{PipelineError, Result};
use crate::models::Forecaster;

/// Months withheld from training for scoring.
pub const HOLDOUT_MONTHS: usize = MONTHS_PER_YEAR;

/// Confidence level used for interval bounds throughout the pipeline.
pub const CONFIDENCE_LEVEL: f64 = 0.95;

/// Outcome of the evaluation step.
#[derive(Debug, Clone)]
pub struct EvaluationReport {
    /// Accuracy over the twelve holdout months.
    pub metrics: AccuracyMetrics,
    /// The holdout-period forecasts that produced the metrics.
    pub holdout_forecast: ForecastTable,
}

/// Split `series` into its training prefix and trailing holdout.
///
/// The split point is fixed by count (`N - 12`), not by date. Fails when
/// the series is too short to leave a non-empty training prefix.
pub fn split_train_holdout(
    series: &MonthlySeries,
) -> Result<(MonthlySeries, MonthlySeries)> {
    let n = series.len();
    if n <= HOLDOUT_MONTHS {
        return Err(PipelineError::InsufficientHistory {
            needed: HOLDOUT_MONTHS + 1,
            got: n,
        });
    }
    let train = series.slice(0, n - HOLDOUT_MONTHS)?;
    let holdout = series.slice(n - HOLDOUT_MONTHS, n)?;
    Ok((train, holdout))
}

/// Fit a fresh model on the training prefix and score it on the holdout.
///
/// `make_model` must return an unfitted instance; evaluation never reuses
/// a model fitted elsewhere, and nothing fitted here is reused elsewhere.
pub fn evaluate<M, F>(series: &MonthlySeries, make_model: F) -> Result<EvaluationReport>
where
    M: Forecaster,
    F: FnOnce() -> M,
{
    let (train, holdout) = split_train_holdout(series)?;

    let mut model = make_model();
    model.fit(&train)?;

    let forecast = model.predict_with_intervals(HOLDOUT_MONTHS, CONFIDENCE_LEVEL)?;
    let metrics = calculate_metrics(holdout.volume(), &forecast.point)?;

    let holdout_forecast = ForecastTable::new(
        holdout.periods().to_vec(),
        forecast.point,
        forecast.lower,
        forecast.upper,
    )?;

    info!(
        mae = metrics.mae,
        rmse = metrics.rmse,
        holdout_months = HOLDOUT_MONTHS,
        model = model.name(),
        "holdout evaluation complete"
    );

    Ok(EvaluationReport {
        metrics,
        holdout_forecast,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{first_of_month, next_month};
    use crate::models::YearlySeasonalSmoothing;
    use chrono::NaiveDate;

    fn make_series(n: usize, volume_at: impl Fn(usize) -> f64) -> MonthlySeries {
        let mut periods: Vec<NaiveDate> = vec![first_of_month(2019, 4).unwrap()];
        while periods.len() < n {
            periods.push(next_month(*periods.last().unwrap()));
        }
        let volume: Vec<f64> = (0..n).map(volume_at).collect();
        let value: Vec<f64> = volume.iter().map(|v| v * 2.0).collect();
        MonthlySeries::new(periods, volume, value).unwrap()
    }

    #[test]
    fn split_takes_last_twelve_by_count() {
        let series = make_series(40, |i| 100.0 + i as f64);
        let (train, holdout) = split_train_holdout(&series).unwrap();

        assert_eq!(train.len(), 28);
        assert_eq!(holdout.len(), 12);
        assert_eq!(train.last_period(), series.periods()[27]);
        assert_eq!(holdout.periods()[0], series.periods()[28]);
        assert_eq!(holdout.volume()[11], 139.0);
    }

    #[test]
    fn split_fails_for_short_series() {
        let series = make_series(12, |_| 10.0);
        assert!(matches!(
            split_train_holdout(&series),
            Err(PipelineError::InsufficientHistory {
                needed: 13,
                got: 12
            })
        ));
    }

    #[test]
    fn evaluation_scores_near_linear_trend_tightly() {
        // Strictly increasing volume, +10 per month: the model should track
        // it closely, giving a small MAE relative to the mean level.
        let series = make_series(48, |i| 500.0 + 10.0 * i as f64);
        let report = evaluate(&series, YearlySeasonalSmoothing::new).unwrap();

        let mean_volume = 500.0 + 10.0 * 47.0 / 2.0;
        assert!(report.metrics.mae >= 0.0);
        assert!(report.metrics.rmse >= report.metrics.mae);
        assert!(
            report.metrics.mae < 0.05 * mean_volume,
            "mae {} too large for a clean trend",
            report.metrics.mae
        );
    }

    #[test]
    fn holdout_forecast_covers_exactly_the_holdout_periods() {
        let series = make_series(45, |i| 200.0 + 5.0 * i as f64);
        let report = evaluate(&series, YearlySeasonalSmoothing::new).unwrap();

        assert_eq!(report.holdout_forecast.len(), 12);
        assert_eq!(
            report.holdout_forecast.periods(),
            &series.periods()[45 - 12..]
        );
    }

    #[test]
    fn training_never_sees_holdout_volumes() {
        // Corrupt the holdout with an absurd level; if training saw it the
        // forecast for earlier periods would shift by orders of magnitude.
        let clean = make_series(48, |i| 100.0 + i as f64);
        let poisoned = make_series(48, |i| {
            if i >= 36 {
                1_000_000.0
            } else {
                100.0 + i as f64
            }
        });

        let mut clean_model = YearlySeasonalSmoothing::with_params(0.3, 0.05, 0.1);
        let mut poisoned_model = YearlySeasonalSmoothing::with_params(0.3, 0.05, 0.1);

        let (clean_train, _) = split_train_holdout(&clean).unwrap();
        let (poisoned_train, _) = split_train_holdout(&poisoned).unwrap();

        clean_model.fit(&clean_train).unwrap();
        poisoned_model.fit(&poisoned_train).unwrap();

        // Identical training prefixes → identical forecasts.
        assert_eq!(
            clean_model.predict(12).unwrap(),
            poisoned_model.predict(12).unwrap()
        );
    }

    #[test]
    fn evaluation_needs_enough_training_for_the_model() {
        // 30 months splits into 18 train + 12 holdout, but the model wants
        // two full cycles of training data.
        let series = make_series(30, |i| 100.0 + i as f64);
        let result = evaluate(&series, YearlySeasonalSmoothing::new);
        assert!(matches!(
            result,
            Err(PipelineError::InsufficientHistory { needed: 24, .. })
        ));
    }
}
