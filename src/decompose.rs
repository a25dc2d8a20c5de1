//! Classical multiplicative seasonal decomposition.
//!
//! Splits a monthly series into trend × seasonal × residual:
//! the trend is a centered moving average over one full cycle, the seasonal
//! component is the per-month mean of detrended ratios normalized to mean
//! 1, and the residual is the ratio left over. The trend (and with it the
//! residual) is undefined for the half-cycle at each edge, which is
//! represented as an explicit `None` rather than a sentinel number.

use chrono::NaiveDate;

use crate::core::MonthlySeries;
use crate::error::{PipelineError, Result};
use crate::utils::variance;

const EPS: f64 = 1e-10;

/// Result of a multiplicative decomposition.
#[derive(Debug, Clone)]
pub struct Decomposition {
    periods: Vec<NaiveDate>,
    observed: Vec<f64>,
    trend: Vec<Option<f64>>,
    seasonal: Vec<f64>,
    residual: Vec<Option<f64>>,
}

impl Decomposition {
    pub fn periods(&self) -> &[NaiveDate] {
        &self.periods
    }

    pub fn observed(&self) -> &[f64] {
        &self.observed
    }

    /// Centered moving-average trend; `None` at the edges.
    pub fn trend(&self) -> &[Option<f64>] {
        &self.trend
    }

    /// Seasonal scaling factor per period (mean 1 over a cycle).
    pub fn seasonal(&self) -> &[f64] {
        &self.seasonal
    }

    /// `observed / (trend × seasonal)`; `None` where the trend is.
    pub fn residual(&self) -> &[Option<f64>] {
        &self.residual
    }

    /// Strength of the seasonal component in [0, 1], computed in log space
    /// over the positions where the residual is defined.
    pub fn seasonal_strength(&self) -> f64 {
        let (mut log_residual, mut log_both) = (Vec::new(), Vec::new());
        for (i, residual) in self.residual.iter().enumerate() {
            if let Some(r) = residual {
                if *r > EPS && self.seasonal[i] > EPS {
                    log_residual.push(r.ln());
                    log_both.push(r.ln() + self.seasonal[i].ln());
                }
            }
        }
        component_strength(&log_residual, &log_both)
    }

    /// Strength of the trend component in [0, 1].
    pub fn trend_strength(&self) -> f64 {
        let (mut log_residual, mut log_both) = (Vec::new(), Vec::new());
        for (residual, trend) in self.residual.iter().zip(&self.trend) {
            if let (Some(r), Some(t)) = (residual, trend) {
                if *r > EPS && *t > EPS {
                    log_residual.push(r.ln());
                    log_both.push(r.ln() + t.ln());
                }
            }
        }
        component_strength(&log_residual, &log_both)
    }
}

fn component_strength(log_residual: &[f64], log_with_component: &[f64]) -> f64 {
    let var_residual = variance(log_residual);
    let var_with = variance(log_with_component);
    if !var_residual.is_finite() || !var_with.is_finite() || var_with < EPS {
        return 0.0;
    }
    (1.0 - var_residual / var_with).clamp(0.0, 1.0)
}

/// Decompose the volume column of `series` with the given cycle length.
///
/// Requires at least two full cycles and strictly positive volumes (ratios
/// to the trend are meaningless otherwise).
pub fn decompose_multiplicative(series: &MonthlySeries, period: usize) -> Result<Decomposition> {
    if period < 2 {
        return Err(PipelineError::InvalidParameter(
            "decomposition period must be at least 2".to_string(),
        ));
    }
    let observed = series.volume().to_vec();
    let n = observed.len();
    if n < 2 * period {
        return Err(PipelineError::InsufficientHistory {
            needed: 2 * period,
            got: n,
        });
    }
    if observed.iter().any(|&v| v <= 0.0) {
        return Err(PipelineError::InvalidParameter(
            "multiplicative decomposition requires strictly positive volumes".to_string(),
        ));
    }

    let trend = centered_moving_average(&observed, period);

    // Per-month mean of detrended ratios.
    let mut ratio_sums = vec![0.0; period];
    let mut ratio_counts = vec![0usize; period];
    for (i, trend_value) in trend.iter().enumerate() {
        if let Some(t) = trend_value {
            ratio_sums[i % period] += observed[i] / t;
            ratio_counts[i % period] += 1;
        }
    }
    let mut indices: Vec<f64> = ratio_sums
        .iter()
        .zip(&ratio_counts)
        .map(|(&sum, &count)| if count > 0 { sum / count as f64 } else { 1.0 })
        .collect();
    let mean: f64 = indices.iter().sum::<f64>() / period as f64;
    if mean > EPS {
        for index in &mut indices {
            *index /= mean;
        }
    }

    let seasonal: Vec<f64> = (0..n).map(|i| indices[i % period]).collect();
    let residual: Vec<Option<f64>> = (0..n)
        .map(|i| {
            trend[i].and_then(|t| {
                let denom = t * seasonal[i];
                if denom.abs() > EPS {
                    Some(observed[i] / denom)
                } else {
                    None
                }
            })
        })
        .collect();

    Ok(Decomposition {
        periods: series.periods().to_vec(),
        observed,
        trend,
        seasonal,
        residual,
    })
}

/// Moving average centered on each position, spanning one full cycle.
///
/// For an even cycle length the window is the classical 2×p average: full
/// weight on the inner points, half weight on the two outermost.
fn centered_moving_average(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let half = period / 2;
    let mut trend = vec![None; n];

    if period % 2 == 0 {
        for i in half..n.saturating_sub(half) {
            let mut sum = 0.5 * values[i - half] + 0.5 * values[i + half];
            for &v in &values[i - half + 1..i + half] {
                sum += v;
            }
            trend[i] = Some(sum / period as f64);
        }
    } else {
        for i in half..n.saturating_sub(half) {
            let sum: f64 = values[i - half..=i + half].iter().sum();
            trend[i] = Some(sum / period as f64);
        }
    }

    trend
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{first_of_month, next_month};
    use approx::assert_relative_eq;

    fn make_series(volume: Vec<f64>) -> MonthlySeries {
        let mut periods = vec![first_of_month(2019, 1).unwrap()];
        while periods.len() < volume.len() {
            periods.push(next_month(*periods.last().unwrap()));
        }
        let value: Vec<f64> = volume.iter().map(|v| v * 2.0).collect();
        MonthlySeries::new(periods, volume, value).unwrap()
    }

    fn multiplicative_data(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let trend = 100.0 + 2.0 * i as f64;
                let season = 1.0 + 0.25 * (2.0 * std::f64::consts::PI * i as f64 / 12.0).sin();
                trend * season
            })
            .collect()
    }

    #[test]
    fn requires_two_full_cycles() {
        let result = decompose_multiplicative(&make_series(vec![10.0; 20]), 12);
        assert!(matches!(
            result,
            Err(PipelineError::InsufficientHistory {
                needed: 24,
                got: 20
            })
        ));
    }

    #[test]
    fn rejects_non_positive_values() {
        let mut volume = multiplicative_data(36);
        volume[7] = 0.0;
        let result = decompose_multiplicative(&make_series(volume), 12);
        assert!(matches!(result, Err(PipelineError::InvalidParameter(_))));
    }

    #[test]
    fn trend_is_undefined_at_edges_only() {
        let d = decompose_multiplicative(&make_series(multiplicative_data(36)), 12).unwrap();
        for (i, trend) in d.trend().iter().enumerate() {
            if (6..30).contains(&i) {
                assert!(trend.is_some(), "trend at {i} should be defined");
            } else {
                assert!(trend.is_none(), "trend at {i} should be undefined");
            }
        }
        assert_eq!(d.residual().iter().filter(|r| r.is_some()).count(), 24);
    }

    #[test]
    fn seasonal_indices_average_to_one() {
        let d = decompose_multiplicative(&make_series(multiplicative_data(48)), 12).unwrap();
        let mean: f64 = d.seasonal()[..12].iter().sum::<f64>() / 12.0;
        assert_relative_eq!(mean, 1.0, epsilon = 1e-9);

        // Seasonal repeats with the cycle.
        for i in 12..48 {
            assert_relative_eq!(d.seasonal()[i], d.seasonal()[i - 12], epsilon = 1e-12);
        }
    }

    #[test]
    fn residual_is_close_to_one_on_clean_data() {
        let d = decompose_multiplicative(&make_series(multiplicative_data(48)), 12).unwrap();
        for residual in d.residual().iter().flatten() {
            assert!(
                (residual - 1.0).abs() < 0.05,
                "residual {residual} far from 1"
            );
        }
    }

    #[test]
    fn reconstruction_matches_observed_where_defined() {
        let d = decompose_multiplicative(&make_series(multiplicative_data(40)), 12).unwrap();
        for i in 0..40 {
            if let (Some(t), Some(r)) = (d.trend()[i], d.residual()[i]) {
                assert_relative_eq!(
                    t * d.seasonal()[i] * r,
                    d.observed()[i],
                    epsilon = 1e-9
                );
            }
        }
    }

    #[test]
    fn strong_seasonality_is_detected() {
        let d = decompose_multiplicative(&make_series(multiplicative_data(60)), 12).unwrap();
        assert!(d.seasonal_strength() > 0.9);
        assert!(d.trend_strength() > 0.9);
    }

    #[test]
    fn odd_period_uses_plain_window() {
        let values: Vec<f64> = (0..15).map(|i| 10.0 + i as f64).collect();
        let trend = centered_moving_average(&values, 3);
        assert!(trend[0].is_none());
        assert_relative_eq!(trend[1].unwrap(), 11.0, epsilon = 1e-12);
        assert!(trend[14].is_none());
    }
}
