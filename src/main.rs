//! Command-line entry point.
//!
//! ```text
//! upi-forecast data/upi_raw_data.csv --output-dir results
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use upi_forecast::pipeline::{run, PipelineConfig};

#[derive(Parser)]
#[command(name = "upi-forecast")]
#[command(about = "Monthly UPI transaction volume analysis and forecasting")]
#[command(version)]
struct Cli {
    /// Path to the raw input CSV (year, month, volume, value)
    #[arg(default_value = "upi_raw_data.csv")]
    input: PathBuf,

    /// Directory for output CSVs and chart artifacts
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Enable verbose (debug-level) logging
    #[arg(long)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = PipelineConfig {
        input: cli.input,
        output_dir: cli.output_dir,
    };
    let summary = run(&config).context("pipeline failed")?;

    info!(
        retained = summary.load.rows_retained(),
        dropped = summary.load.rows_dropped,
        forecast_rows = summary.full_forecast.len(),
        "run complete"
    );

    println!("Model performance on the last 12 months:");
    println!("  MAE:  {:.2}", summary.evaluation.metrics.mae);
    println!("  RMSE: {:.2}", summary.evaluation.metrics.rmse);
    println!("Processed data: {}", summary.processed_csv.display());
    println!("Forecast data:  {}", summary.forecast_csv.display());
    for chart in &summary.charts {
        println!("Chart:          {}", chart.display());
    }

    Ok(())
}
