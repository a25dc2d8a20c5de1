//! End-to-end pipeline orchestration.
//!
//! One invocation: load and clean the raw CSV, derive features, write the
//! processed CSV, render the EDA charts, evaluate forecast accuracy on a
//! trailing 12-month holdout, refit on the full history, extend 24 months
//! ahead, and write the forecast CSV and overlay chart. Every step blocks
//! until complete and any failure aborts the run.

use std::path::PathBuf;

use tracing::info;

use crate::core::{ForecastTable, MonthlySeries, MONTHS_PER_YEAR};
use crate::decompose::decompose_multiplicative;
use crate::error::{PipelineError, Result};
use crate::eval::{evaluate, EvaluationReport, CONFIDENCE_LEVEL};
use crate::features::derive_features;
use crate::ingest::{load_series, LoadSummary};
use crate::models::{Forecaster, YearlySeasonalSmoothing};
use crate::output::{write_forecast_csv, write_processed_csv};
use crate::report::{ReportingSink, SeriesView, SvgCharts};

/// Months to extend beyond the last observed period.
pub const FORECAST_HORIZON_MONTHS: usize = 24;

const VOLUME_LABEL: &str = "Transaction Volume (Cr)";
const VALUE_LABEL: &str = "Transaction Value (Rs Cr)";

/// Run configuration: the two paths the operator controls.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Raw input CSV.
    pub input: PathBuf,
    /// Directory receiving every output artifact.
    pub output_dir: PathBuf,
}

/// What a completed run produced.
#[derive(Debug)]
pub struct RunSummary {
    pub load: LoadSummary,
    pub evaluation: EvaluationReport,
    pub full_forecast: ForecastTable,
    pub processed_csv: PathBuf,
    pub forecast_csv: PathBuf,
    pub charts: Vec<PathBuf>,
}

/// Run the pipeline with the default SVG chart sink.
pub fn run(config: &PipelineConfig) -> Result<RunSummary> {
    let sink = SvgCharts::new(&config.output_dir);
    run_with_sink(config, &sink)
}

/// Run the pipeline against a caller-supplied reporting sink.
pub fn run_with_sink(config: &PipelineConfig, sink: &dyn ReportingSink) -> Result<RunSummary> {
    // 1. Ingestion & validation. An unopenable input aborts here, before
    //    anything is written.
    let (series, load) = load_series(&config.input)?;

    std::fs::create_dir_all(&config.output_dir).map_err(|source| {
        PipelineError::OutputWrite {
            path: config.output_dir.clone(),
            source,
        }
    })?;

    // 2. Feature derivation and the processed-data artifact.
    let featured = derive_features(series);
    let processed_csv = config.output_dir.join("upi_processed_data.csv");
    write_processed_csv(&processed_csv, &featured)?;

    let series = featured.series();
    let volume = SeriesView::new(series.periods(), series.volume(), VOLUME_LABEL);
    let value = SeriesView::new(series.periods(), series.value(), VALUE_LABEL);

    // 3. Exploratory charts.
    let mut charts = Vec::with_capacity(4);
    charts.push(sink.volume_growth_chart(volume, value)?);
    charts.push(sink.seasonal_heatmap(volume)?);

    let decomposition = decompose_multiplicative(series, MONTHS_PER_YEAR)?;
    info!(
        seasonal_strength = decomposition.seasonal_strength(),
        trend_strength = decomposition.trend_strength(),
        "seasonal decomposition complete"
    );
    charts.push(sink.decomposition_chart(&decomposition)?);

    // 4. Held-out accuracy estimate.
    let evaluation = evaluate(series, YearlySeasonalSmoothing::new)?;

    // 5. Full-horizon forecast from a fresh model; nothing carries over
    //    from the evaluation fit.
    let mut model = YearlySeasonalSmoothing::new();
    model.fit(series)?;
    let full_forecast = full_horizon_forecast(series, &model)?;

    charts.push(sink.forecast_chart(volume, &full_forecast)?);

    let forecast_csv = config.output_dir.join("upi_forecast_data.csv");
    write_forecast_csv(&forecast_csv, &full_forecast)?;

    info!("pipeline complete");

    Ok(RunSummary {
        load,
        evaluation,
        full_forecast,
        processed_csv,
        forecast_csv,
        charts,
    })
}

/// Predictions over the whole grid: every historical period re-predicted
/// in-sample, then `FORECAST_HORIZON_MONTHS` future months.
pub fn full_horizon_forecast(
    series: &MonthlySeries,
    model: &dyn Forecaster,
) -> Result<ForecastTable> {
    let grid = series.period_grid(FORECAST_HORIZON_MONTHS);

    let in_sample = model.fitted_with_intervals(CONFIDENCE_LEVEL)?;
    let future = model.predict_with_intervals(FORECAST_HORIZON_MONTHS, CONFIDENCE_LEVEL)?;

    let point: Vec<f64> = in_sample.point.into_iter().chain(future.point).collect();
    let lower: Vec<f64> = in_sample.lower.into_iter().chain(future.lower).collect();
    let upper: Vec<f64> = in_sample.upper.into_iter().chain(future.upper).collect();

    ForecastTable::new(grid, point, lower, upper)
}
