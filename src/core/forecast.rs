//! Period-aligned forecast table with interval bounds.

use chrono::NaiveDate;

use crate::error::{PipelineError, Result};

/// One forecast row: a period with its point estimate and bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastRow {
    pub period: NaiveDate,
    pub point: f64,
    pub lower: f64,
    pub upper: f64,
}

/// A forecast over an explicit period grid.
///
/// Unlike a bare horizon-length vector, every estimate here is bound to the
/// calendar month it predicts, so consumers (CSV writer, charts, scorer)
/// never have to re-derive the alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastTable {
    periods: Vec<NaiveDate>,
    point: Vec<f64>,
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl ForecastTable {
    /// Build a table from parallel columns.
    pub fn new(
        periods: Vec<NaiveDate>,
        point: Vec<f64>,
        lower: Vec<f64>,
        upper: Vec<f64>,
    ) -> Result<Self> {
        for (name, len) in [
            ("point", point.len()),
            ("lower", lower.len()),
            ("upper", upper.len()),
        ] {
            if len != periods.len() {
                return Err(PipelineError::InvalidParameter(format!(
                    "{name} column has {len} entries for {} periods",
                    periods.len()
                )));
            }
        }
        Ok(Self {
            periods,
            point,
            lower,
            upper,
        })
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn periods(&self) -> &[NaiveDate] {
        &self.periods
    }

    pub fn point(&self) -> &[f64] {
        &self.point
    }

    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    /// Iterate over rows in period order.
    pub fn rows(&self) -> impl Iterator<Item = ForecastRow> + '_ {
        (0..self.len()).map(move |i| ForecastRow {
            period: self.periods[i],
            point: self.point[i],
            lower: self.lower[i],
            upper: self.upper[i],
        })
    }

    /// The trailing `n` rows as a new table.
    pub fn tail(&self, n: usize) -> ForecastTable {
        let start = self.len().saturating_sub(n);
        ForecastTable {
            periods: self.periods[start..].to_vec(),
            point: self.point[start..].to_vec(),
            lower: self.lower[start..].to_vec(),
            upper: self.upper[start..].to_vec(),
        }
    }
}
