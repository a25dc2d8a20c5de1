//! Property-based tests for the pipeline invariants.

use chrono::Datelike;
use proptest::prelude::*;

use upi_forecast::core::{first_of_month, next_month, MonthlySeries};
use upi_forecast::eval::{calculate_metrics, split_train_holdout};
use upi_forecast::features::derive_features;
use upi_forecast::models::{Forecaster, YearlySeasonalSmoothing};

fn make_series(start_year: i32, start_month: u32, volume: Vec<f64>) -> MonthlySeries {
    let mut periods = vec![first_of_month(start_year, start_month).unwrap()];
    while periods.len() < volume.len() {
        periods.push(next_month(*periods.last().unwrap()));
    }
    let value: Vec<f64> = volume.iter().map(|v| v * 2.0).collect();
    MonthlySeries::new(periods, volume, value).unwrap()
}

/// Positive volumes with mild variation, safe for the multiplicative model.
fn volume_strategy(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    (min_len..max_len)
        .prop_flat_map(|len| prop::collection::vec(50.0..5000.0_f64, len))
        .prop_map(|mut v| {
            for (i, x) in v.iter_mut().enumerate() {
                *x += i as f64 * 0.01;
            }
            v
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn period_grid_is_strictly_monthly(
        start_year in 2000i32..2030,
        start_month in 1u32..=12,
        len in 1usize..60,
        horizon in 0usize..36
    ) {
        let series = make_series(start_year, start_month, vec![100.0; len]);
        let grid = series.period_grid(horizon);

        prop_assert_eq!(grid.len(), len + horizon);
        for pair in grid.windows(2) {
            prop_assert!(pair[0] < pair[1]);
            prop_assert_eq!(next_month(pair[0]), pair[1]);
        }
        for period in &grid {
            prop_assert_eq!(period.day(), 1);
        }
    }

    #[test]
    fn split_always_holds_out_exactly_twelve(volume in volume_strategy(13, 80)) {
        let n = volume.len();
        let series = make_series(2018, 6, volume);
        let (train, holdout) = split_train_holdout(&series).unwrap();

        prop_assert_eq!(holdout.len(), 12);
        prop_assert_eq!(train.len() + holdout.len(), n);
        prop_assert_eq!(next_month(train.last_period()), holdout.periods()[0]);
    }

    #[test]
    fn yoy_is_undefined_for_exactly_the_first_year(volume in volume_strategy(13, 60)) {
        let featured = derive_features(make_series(2018, 1, volume.clone()));
        let yoy = featured.yoy_volume_growth_pct();

        for (i, item) in yoy.iter().enumerate() {
            if i < 12 {
                prop_assert!(item.is_none());
            } else {
                // Volumes are strictly positive here, so every later
                // period has a defined growth value.
                prop_assert!(item.is_some());
                let expected = (volume[i] / volume[i - 12] - 1.0) * 100.0;
                let expected = (expected * 100.0).round() / 100.0;
                prop_assert!((item.unwrap() - expected).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn avg_value_reconstructs_value_within_rounding(volume in volume_strategy(1, 40)) {
        let featured = derive_features(make_series(2020, 1, volume.clone()));
        let series = featured.series();

        for i in 0..series.len() {
            let avg = featured.avg_value_per_unit()[i].unwrap();
            let reconstructed = avg * series.volume()[i];
            // round2 on the ratio bounds the error by half a cent per unit.
            prop_assert!((reconstructed - series.value()[i]).abs() <= 0.005 * series.volume()[i] + 1e-9);
        }
    }

    #[test]
    fn rmse_never_below_mae(
        errors in prop::collection::vec(-100.0..100.0_f64, 1..40)
    ) {
        let actual = vec![0.0; errors.len()];
        let metrics = calculate_metrics(&actual, &errors).unwrap();

        prop_assert!(metrics.mae >= 0.0);
        prop_assert!(metrics.rmse >= 0.0);
        prop_assert!(metrics.rmse >= metrics.mae - 1e-12);
    }

    #[test]
    fn forecast_length_matches_horizon(
        volume in volume_strategy(24, 60),
        horizon in 1usize..30
    ) {
        let series = make_series(2019, 1, volume);
        let mut model = YearlySeasonalSmoothing::with_params(0.3, 0.05, 0.1);
        model.fit(&series).unwrap();

        let forecast = model.predict(horizon).unwrap();
        prop_assert_eq!(forecast.len(), horizon);

        let intervals = model.predict_with_intervals(horizon, 0.95).unwrap();
        prop_assert_eq!(intervals.len(), horizon);
        for i in 0..horizon {
            prop_assert!(intervals.lower[i] <= intervals.point[i]);
            prop_assert!(intervals.upper[i] >= intervals.point[i]);
        }
    }
}
