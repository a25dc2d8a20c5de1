//! Derived per-period metrics.
//!
//! Augments the cleaned series with the average value per transaction and
//! the year-over-year volume growth. Where a metric has no defined value
//! (zero-volume month, no prior-year month) it is an explicit `None`, never
//! infinity and never a crash.

use tracing::info;

use crate::core::{MonthlySeries, MONTHS_PER_YEAR};

/// The cleaned series plus its derived metric columns.
///
/// Derivation is non-destructive: the original volume/value columns remain
/// available through [`FeaturedSeries::series`].
#[derive(Debug, Clone)]
pub struct FeaturedSeries {
    series: MonthlySeries,
    avg_value_per_unit: Vec<Option<f64>>,
    yoy_volume_growth_pct: Vec<Option<f64>>,
}

impl FeaturedSeries {
    pub fn series(&self) -> &MonthlySeries {
        &self.series
    }

    /// `value / volume` per period, rounded to 2 decimals; `None` for
    /// zero-volume months.
    pub fn avg_value_per_unit(&self) -> &[Option<f64>] {
        &self.avg_value_per_unit
    }

    /// `(volume[t] / volume[t-12] - 1) × 100`, rounded to 2 decimals;
    /// `None` for the first twelve periods and wherever the prior-year
    /// volume is zero.
    pub fn yoy_volume_growth_pct(&self) -> &[Option<f64>] {
        &self.yoy_volume_growth_pct
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Round to two decimal places.
fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Compute the derived metrics for every period of `series`.
pub fn derive_features(series: MonthlySeries) -> FeaturedSeries {
    let volume = series.volume();
    let value = series.value();
    let n = series.len();

    let avg_value_per_unit: Vec<Option<f64>> = (0..n)
        .map(|i| {
            if volume[i] == 0.0 {
                None
            } else {
                Some(round2(value[i] / volume[i]))
            }
        })
        .collect();

    let yoy_volume_growth_pct: Vec<Option<f64>> = (0..n)
        .map(|i| {
            if i < MONTHS_PER_YEAR {
                return None;
            }
            let prior = volume[i - MONTHS_PER_YEAR];
            if prior == 0.0 {
                return None;
            }
            Some(round2((volume[i] / prior - 1.0) * 100.0))
        })
        .collect();

    info!(periods = n, "feature derivation complete");

    FeaturedSeries {
        series,
        avg_value_per_unit,
        yoy_volume_growth_pct,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{first_of_month, next_month};
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn make_series(volume: Vec<f64>, value: Vec<f64>) -> MonthlySeries {
        let mut periods: Vec<NaiveDate> = vec![first_of_month(2020, 1).unwrap()];
        while periods.len() < volume.len() {
            periods.push(next_month(*periods.last().unwrap()));
        }
        MonthlySeries::new(periods, volume, value).unwrap()
    }

    #[test]
    fn average_value_is_rounded_ratio() {
        let featured = derive_features(make_series(
            vec![3.0, 7.0, 100.0],
            vec![10.0, 10.0, 250.0],
        ));

        let avg = featured.avg_value_per_unit();
        assert_relative_eq!(avg[0].unwrap(), 3.33, epsilon = 1e-10);
        assert_relative_eq!(avg[1].unwrap(), 1.43, epsilon = 1e-10);
        assert_relative_eq!(avg[2].unwrap(), 2.5, epsilon = 1e-10);
    }

    #[test]
    fn zero_volume_yields_undefined_ratio() {
        let featured = derive_features(make_series(vec![0.0, 5.0], vec![100.0, 100.0]));
        assert_eq!(featured.avg_value_per_unit()[0], None);
        assert!(featured.avg_value_per_unit()[1].is_some());
    }

    #[test]
    fn ratio_times_volume_recovers_value() {
        let volume: Vec<f64> = (1..=30).map(|i| 10.0 * i as f64).collect();
        let value: Vec<f64> = volume.iter().map(|v| v * 2.37).collect();
        let featured = derive_features(make_series(volume.clone(), value.clone()));

        for i in 0..30 {
            let avg = featured.avg_value_per_unit()[i].unwrap();
            // Rounding to 2 decimals bounds the reconstruction error.
            assert!((avg * volume[i] - value[i]).abs() <= 0.005 * volume[i]);
        }
    }

    #[test]
    fn yoy_growth_undefined_for_first_year() {
        let volume: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        let value = volume.clone();
        let featured = derive_features(make_series(volume, value));

        let yoy = featured.yoy_volume_growth_pct();
        for (i, item) in yoy.iter().enumerate() {
            if i < 12 {
                assert_eq!(*item, None, "period {i} should be undefined");
            } else {
                assert!(item.is_some(), "period {i} should be defined");
            }
        }
    }

    #[test]
    fn yoy_growth_matches_formula() {
        let volume: Vec<f64> = (0..24).map(|i| 100.0 * 1.05f64.powi(i)).collect();
        let value = volume.clone();
        let featured = derive_features(make_series(volume.clone(), value));

        let yoy = featured.yoy_volume_growth_pct();
        for i in 12..24 {
            let expected = (volume[i] / volume[i - 12] - 1.0) * 100.0;
            let expected = (expected * 100.0).round() / 100.0;
            assert_relative_eq!(yoy[i].unwrap(), expected, epsilon = 1e-10);
            // 1.05^12 - 1 ≈ 79.59%
            assert_relative_eq!(yoy[i].unwrap(), 79.59, epsilon = 1e-10);
        }
    }

    #[test]
    fn zero_prior_year_volume_yields_undefined_growth() {
        let mut volume: Vec<f64> = vec![10.0; 14];
        volume[1] = 0.0;
        let value = volume.clone();
        let featured = derive_features(make_series(volume, value));

        let yoy = featured.yoy_volume_growth_pct();
        assert_eq!(yoy[13], None); // lookback hits the zero month
        assert!(yoy[12].is_some());
    }

    #[test]
    fn no_rows_are_dropped() {
        let featured = derive_features(make_series(vec![0.0; 13], vec![1.0; 13]));
        assert_eq!(featured.len(), 13);
        assert_eq!(featured.avg_value_per_unit().len(), 13);
        assert_eq!(featured.yoy_volume_growth_pct().len(), 13);
    }
}
