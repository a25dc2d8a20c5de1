//! Flat-file outputs: processed-data and forecast-data CSVs.

use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::core::ForecastTable;
use crate::error::{PipelineError, Result};
use crate::features::FeaturedSeries;

#[derive(Debug, Serialize)]
struct ProcessedRow {
    period: NaiveDate,
    volume: f64,
    value: f64,
    avg_value_per_unit: Option<f64>,
    yoy_volume_growth_pct: Option<f64>,
}

#[derive(Debug, Serialize)]
struct ForecastCsvRow {
    period: NaiveDate,
    point: f64,
    lower: f64,
    upper: f64,
}

fn create(path: &Path) -> Result<File> {
    File::create(path).map_err(|source| PipelineError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Write one row per period of the featured series. Undefined metrics
/// become empty cells.
pub fn write_processed_csv(path: &Path, featured: &FeaturedSeries) -> Result<()> {
    let mut writer = csv::Writer::from_writer(create(path)?);

    let series = featured.series();
    for i in 0..featured.len() {
        writer.serialize(ProcessedRow {
            period: series.periods()[i],
            volume: series.volume()[i],
            value: series.value()[i],
            avg_value_per_unit: featured.avg_value_per_unit()[i],
            yoy_volume_growth_pct: featured.yoy_volume_growth_pct()[i],
        })?;
    }
    writer.flush().map_err(|source| PipelineError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })?;

    info!(path = %path.display(), rows = featured.len(), "processed data written");
    Ok(())
}

/// Write one row per period of the full forecast grid.
pub fn write_forecast_csv(path: &Path, forecast: &ForecastTable) -> Result<()> {
    let mut writer = csv::Writer::from_writer(create(path)?);

    for row in forecast.rows() {
        writer.serialize(ForecastCsvRow {
            period: row.period,
            point: row.point,
            lower: row.lower,
            upper: row.upper,
        })?;
    }
    writer.flush().map_err(|source| PipelineError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })?;

    info!(path = %path.display(), rows = forecast.len(), "forecast data written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{first_of_month, next_month, MonthlySeries};
    use crate::features::derive_features;

    fn featured(n: usize) -> FeaturedSeries {
        let mut periods = vec![first_of_month(2021, 1).unwrap()];
        while periods.len() < n {
            periods.push(next_month(*periods.last().unwrap()));
        }
        let volume: Vec<f64> = (0..n).map(|i| 100.0 + i as f64).collect();
        let value: Vec<f64> = volume.iter().map(|v| v * 2.0).collect();
        derive_features(MonthlySeries::new(periods, volume, value).unwrap())
    }

    #[test]
    fn processed_csv_has_header_and_one_row_per_period() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed.csv");
        let featured = featured(15);

        write_processed_csv(&path, &featured).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 16);
        assert_eq!(
            lines[0],
            "period,volume,value,avg_value_per_unit,yoy_volume_growth_pct"
        );
        assert_eq!(lines[1], "2021-01-01,100.0,200.0,2.0,");
        // Month 13 has a defined YoY value.
        assert!(lines[13].starts_with("2022-01-01,112.0,224.0,2.0,12.0"));
    }

    #[test]
    fn undefined_metrics_are_empty_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed.csv");
        write_processed_csv(&path, &featured(5)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        for line in content.lines().skip(1) {
            assert!(line.ends_with(','), "YoY cell should be empty: {line}");
        }
    }

    #[test]
    fn forecast_csv_round_trips_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forecast.csv");

        let periods = vec![
            first_of_month(2024, 1).unwrap(),
            first_of_month(2024, 2).unwrap(),
        ];
        let table = ForecastTable::new(
            periods,
            vec![100.0, 110.0],
            vec![90.0, 95.0],
            vec![110.0, 125.0],
        )
        .unwrap();

        write_forecast_csv(&path, &table).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "period,point,lower,upper");
        assert_eq!(lines[1], "2024-01-01,100.0,90.0,110.0");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn unwritable_path_is_an_output_error() {
        let table = ForecastTable::new(
            vec![first_of_month(2024, 1).unwrap()],
            vec![1.0],
            vec![0.0],
            vec![2.0],
        )
        .unwrap();
        let result = write_forecast_csv(Path::new("/nonexistent/out.csv"), &table);
        assert!(matches!(result, Err(PipelineError::OutputWrite { .. })));
    }
}
