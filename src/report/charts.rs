//! SVG chart rendering with plotters.

use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use plotters::prelude::*;
use tracing::info;

use crate::core::ForecastTable;
use crate::decompose::Decomposition;
use crate::error::{PipelineError, Result};
use crate::report::{ReportingSink, SeriesView};

const CHART_SIZE: (u32, u32) = (1400, 700);
const PANEL_SIZE: (u32, u32) = (1400, 1000);

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn render_err(e: impl std::fmt::Display) -> PipelineError {
    PipelineError::ChartRender(e.to_string())
}

fn value_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let pad = 0.05 * (max - min).max(1e-9);
    (min - pad, max + pad)
}

/// Renders the pipeline's chart artifacts as SVG files in one directory.
#[derive(Debug, Clone)]
pub struct SvgCharts {
    out_dir: PathBuf,
}

impl SvgCharts {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    fn artifact(&self, name: &str) -> PathBuf {
        self.out_dir.join(name)
    }
}

impl ReportingSink for SvgCharts {
    fn volume_growth_chart(
        &self,
        volume: SeriesView<'_>,
        value: SeriesView<'_>,
    ) -> Result<PathBuf> {
        let path = self.artifact("upi_volume_growth.svg");
        draw_volume_growth(&path, volume, value)?;
        info!(path = %path.display(), "volume growth chart written");
        Ok(path)
    }

    fn seasonal_heatmap(&self, volume: SeriesView<'_>) -> Result<PathBuf> {
        let path = self.artifact("upi_seasonal_heatmap.svg");
        draw_heatmap(&path, volume)?;
        info!(path = %path.display(), "seasonal heatmap written");
        Ok(path)
    }

    fn decomposition_chart(&self, decomposition: &Decomposition) -> Result<PathBuf> {
        let path = self.artifact("upi_decomposition_plot.svg");
        draw_decomposition(&path, decomposition)?;
        info!(path = %path.display(), "decomposition chart written");
        Ok(path)
    }

    fn forecast_chart(
        &self,
        history: SeriesView<'_>,
        forecast: &ForecastTable,
    ) -> Result<PathBuf> {
        let path = self.artifact("upi_forecast_plot.svg");
        draw_forecast(&path, history, forecast)?;
        info!(path = %path.display(), "forecast chart written");
        Ok(path)
    }
}

fn date_span(periods: &[NaiveDate]) -> (NaiveDate, NaiveDate) {
    let first = *periods.first().expect("chart input is never empty");
    let last = *periods.last().expect("chart input is never empty");
    (first, last)
}

fn draw_volume_growth(
    path: &Path,
    volume: SeriesView<'_>,
    value: SeriesView<'_>,
) -> Result<()> {
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let (first, last) = date_span(volume.periods);
    let (_, volume_max) = value_range(volume.values.iter().copied());
    let (_, value_max) = value_range(value.values.iter().copied());

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption("UPI Transaction Volume Growth", ("sans-serif", 30))
        .x_label_area_size(45)
        .y_label_area_size(70)
        .right_y_label_area_size(70)
        .build_cartesian_2d(first..last, 0.0..volume_max)
        .map_err(render_err)?
        .set_secondary_coord(first..last, 0.0..value_max);

    chart
        .configure_mesh()
        .x_desc("Month")
        .y_desc(volume.label)
        .x_label_formatter(&|d| d.format("%Y-%m").to_string())
        .draw()
        .map_err(render_err)?;
    chart
        .configure_secondary_axes()
        .y_desc(value.label)
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(LineSeries::new(
            volume
                .periods
                .iter()
                .zip(volume.values)
                .map(|(d, v)| (*d, *v)),
            BLUE.stroke_width(2),
        ))
        .map_err(render_err)?
        .label(volume.label)
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.stroke_width(2)));

    chart
        .draw_secondary_series(LineSeries::new(
            value
                .periods
                .iter()
                .zip(value.values)
                .map(|(d, v)| (*d, *v)),
            RED.stroke_width(2),
        ))
        .map_err(render_err)?
        .label(value.label)
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .draw()
        .map_err(render_err)?;

    root.present().map_err(render_err)
}

fn draw_heatmap(path: &Path, volume: SeriesView<'_>) -> Result<()> {
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let year_min = volume.periods.iter().map(|d| d.year()).min().unwrap_or(0);
    let year_max = volume.periods.iter().map(|d| d.year()).max().unwrap_or(0);
    let volume_min = volume.values.iter().copied().fold(f64::INFINITY, f64::min);
    let volume_max = volume
        .values
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    let spread = (volume_max - volume_min).max(1e-9);

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption("Monthly UPI Transaction Volume - Heatmap", ("sans-serif", 30))
        .x_label_area_size(45)
        .y_label_area_size(55)
        .build_cartesian_2d(year_min..year_max + 1, 0..12)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("Year")
        .y_desc("Month")
        .x_labels((year_max - year_min + 1) as usize)
        .y_labels(12)
        .x_label_formatter(&|y| y.to_string())
        .y_label_formatter(&|m| {
            MONTH_NAMES
                .get(*m as usize)
                .map(|s| s.to_string())
                .unwrap_or_default()
        })
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(volume.periods.iter().zip(volume.values).map(|(d, v)| {
            // Light-to-dark blue ramp over the observed volume range.
            let intensity = ((v - volume_min) / spread).clamp(0.0, 1.0);
            let color = RGBColor(
                (240.0 - 190.0 * intensity) as u8,
                (245.0 - 150.0 * intensity) as u8,
                255,
            );
            let year = d.year();
            let month = d.month() as i32 - 1;
            Rectangle::new([(year, month), (year + 1, month + 1)], color.filled())
        }))
        .map_err(render_err)?;

    root.present().map_err(render_err)
}

fn draw_decomposition(path: &Path, decomposition: &Decomposition) -> Result<()> {
    let root = SVGBackend::new(path, PANEL_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;
    let titled = root
        .titled("Time-Series Decomposition of UPI Volume", ("sans-serif", 30))
        .map_err(render_err)?;

    let panels = titled.split_evenly((4, 1));
    let periods = decomposition.periods();
    let (first, last) = date_span(periods);

    // Fully-defined series panels.
    let observed: Vec<(NaiveDate, f64)> = periods
        .iter()
        .zip(decomposition.observed())
        .map(|(d, v)| (*d, *v))
        .collect();
    let seasonal: Vec<(NaiveDate, f64)> = periods
        .iter()
        .zip(decomposition.seasonal())
        .map(|(d, v)| (*d, *v))
        .collect();
    // Edge-undefined series keep only their defined span.
    let trend: Vec<(NaiveDate, f64)> = periods
        .iter()
        .zip(decomposition.trend())
        .filter_map(|(d, v)| v.map(|v| (*d, v)))
        .collect();
    let residual: Vec<(NaiveDate, f64)> = periods
        .iter()
        .zip(decomposition.residual())
        .filter_map(|(d, v)| v.map(|v| (*d, v)))
        .collect();

    let series = [
        ("Observed", &observed, &BLUE),
        ("Trend", &trend, &RED),
        ("Seasonal", &seasonal, &GREEN),
        ("Residual", &residual, &BLACK),
    ];

    for (panel, (label, points, color)) in panels.iter().zip(series) {
        let (y_min, y_max) = value_range(points.iter().map(|(_, v)| *v));
        let mut chart = ChartBuilder::on(panel)
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(70)
            .build_cartesian_2d(first..last, y_min..y_max)
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .y_desc(label)
            .x_label_formatter(&|d| d.format("%Y-%m").to_string())
            .draw()
            .map_err(render_err)?;

        chart
            .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))
            .map_err(render_err)?;
    }

    root.present().map_err(render_err)
}

fn draw_forecast(
    path: &Path,
    history: SeriesView<'_>,
    forecast: &ForecastTable,
) -> Result<()> {
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let first = *history.periods.first().expect("history is never empty");
    let last = *forecast
        .periods()
        .last()
        .expect("forecast grid is never empty");
    let (y_min, y_max) = value_range(
        history
            .values
            .iter()
            .copied()
            .chain(forecast.upper().iter().copied())
            .chain(forecast.lower().iter().copied()),
    );

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption(
            "UPI Transaction Volume Forecast (Next 24 Months)",
            ("sans-serif", 30),
        )
        .x_label_area_size(45)
        .y_label_area_size(70)
        .build_cartesian_2d(first..last, y_min..y_max)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .x_desc("Month")
        .y_desc(history.label)
        .x_label_formatter(&|d| d.format("%Y-%m").to_string())
        .draw()
        .map_err(render_err)?;

    // Interval band: upper bound forward, lower bound back.
    let band: Vec<(NaiveDate, f64)> = forecast
        .periods()
        .iter()
        .zip(forecast.upper())
        .map(|(d, v)| (*d, *v))
        .chain(
            forecast
                .periods()
                .iter()
                .zip(forecast.lower())
                .rev()
                .map(|(d, v)| (*d, *v)),
        )
        .collect();
    chart
        .draw_series(std::iter::once(Polygon::new(band, BLUE.mix(0.15).filled())))
        .map_err(render_err)?
        .label("95% interval")
        .legend(|(x, y)| Rectangle::new([(x, y - 4), (x + 20, y + 4)], BLUE.mix(0.15).filled()));

    chart
        .draw_series(LineSeries::new(
            forecast
                .periods()
                .iter()
                .zip(forecast.point())
                .map(|(d, v)| (*d, *v)),
            BLUE.stroke_width(2),
        ))
        .map_err(render_err)?
        .label("forecast")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.stroke_width(2)));

    chart
        .draw_series(
            history
                .periods
                .iter()
                .zip(history.values)
                .map(|(d, v)| Circle::new((*d, *v), 2, BLACK.filled())),
        )
        .map_err(render_err)?
        .label("observed")
        .legend(|(x, y)| Circle::new((x + 10, y), 3, BLACK.filled()));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .draw()
        .map_err(render_err)?;

    root.present().map_err(render_err)
}
