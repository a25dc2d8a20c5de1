//! Validated monthly series of transaction volume/value observations.

use chrono::{Datelike, Months, NaiveDate};

use crate::error::{PipelineError, Result};

/// Build the first-of-month date for a (year, month) pair.
///
/// Returns `None` for months outside 1..=12 or years chrono cannot
/// represent.
pub fn first_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// The first day of the month following `period`.
pub fn next_month(period: NaiveDate) -> NaiveDate {
    // Safe for any date the pipeline can construct: adding one month to a
    // first-of-month date is always representable until year 262143.
    period + Months::new(1)
}

/// A single cleaned observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    /// Calendar month, identified by its first day.
    pub period: NaiveDate,
    /// Transaction volume for the month (crore transactions).
    pub volume: f64,
    /// Transaction value for the month (crore rupees).
    pub value: f64,
}

/// A strictly-monthly time series of volume/value observations.
///
/// Invariants, enforced at construction:
/// - periods are first-of-month dates,
/// - periods are strictly increasing (unique),
/// - consecutive periods are exactly one calendar month apart,
/// - volume and value are finite and non-negative.
///
/// Downstream steps (the 12-month YoY lookback and the count-based
/// evaluation split) rely on contiguity, so a gap is rejected here rather
/// than silently corrupting them later.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySeries {
    periods: Vec<NaiveDate>,
    volume: Vec<f64>,
    value: Vec<f64>,
}

impl MonthlySeries {
    /// Construct a series from parallel columns, validating all invariants.
    pub fn new(periods: Vec<NaiveDate>, volume: Vec<f64>, value: Vec<f64>) -> Result<Self> {
        if periods.is_empty() {
            return Err(PipelineError::EmptySeries);
        }
        if volume.len() != periods.len() {
            return Err(PipelineError::DimensionMismatch {
                expected: periods.len(),
                got: volume.len(),
            });
        }
        if value.len() != periods.len() {
            return Err(PipelineError::DimensionMismatch {
                expected: periods.len(),
                got: value.len(),
            });
        }

        for (i, &period) in periods.iter().enumerate() {
            if period.day() != 1 {
                return Err(PipelineError::UnanchoredPeriod { period });
            }
            if i > 0 {
                let prev = periods[i - 1];
                if period <= prev {
                    return Err(PipelineError::NonMonotonicPeriod { period });
                }
                let expected = next_month(prev);
                if period != expected {
                    return Err(PipelineError::PeriodGap {
                        expected,
                        found: period,
                    });
                }
            }
            for (field, &v) in [("volume", &volume[i]), ("value", &value[i])] {
                if !v.is_finite() || v < 0.0 {
                    return Err(PipelineError::InvalidObservation {
                        period,
                        field,
                        got: v,
                    });
                }
            }
        }

        Ok(Self {
            periods,
            volume,
            value,
        })
    }

    /// Construct from cleaned observations (must already be sorted).
    pub fn from_observations(observations: Vec<Observation>) -> Result<Self> {
        let periods = observations.iter().map(|o| o.period).collect();
        let volume = observations.iter().map(|o| o.volume).collect();
        let value = observations.iter().map(|o| o.value).collect();
        Self::new(periods, volume, value)
    }

    /// Number of observed months.
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    /// Whether the series holds no observations. Construction rejects the
    /// empty case, so this is `false` for any built series; kept for
    /// idiomatic pairing with `len`.
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Observed periods, ascending.
    pub fn periods(&self) -> &[NaiveDate] {
        &self.periods
    }

    /// Monthly transaction volumes, period-aligned.
    pub fn volume(&self) -> &[f64] {
        &self.volume
    }

    /// Monthly transaction values, period-aligned.
    pub fn value(&self) -> &[f64] {
        &self.value
    }

    /// The last observed period.
    pub fn last_period(&self) -> NaiveDate {
        *self.periods.last().expect("series is never empty")
    }

    /// Observation at `index`.
    pub fn observation(&self, index: usize) -> Option<Observation> {
        Some(Observation {
            period: *self.periods.get(index)?,
            volume: self.volume[index],
            value: self.value[index],
        })
    }

    /// A sub-series covering `[start, end)`.
    pub fn slice(&self, start: usize, end: usize) -> Result<MonthlySeries> {
        if start > end {
            return Err(PipelineError::InvalidParameter(
                "slice start must be <= end".to_string(),
            ));
        }
        if end > self.len() {
            return Err(PipelineError::DimensionMismatch {
                expected: self.len(),
                got: end,
            });
        }
        if start == end {
            return Err(PipelineError::EmptySeries);
        }
        Ok(MonthlySeries {
            periods: self.periods[start..end].to_vec(),
            volume: self.volume[start..end].to_vec(),
            value: self.value[start..end].to_vec(),
        })
    }

    /// All historical periods followed by `horizon` future months, each a
    /// first-of-month date one calendar month after its predecessor.
    pub fn period_grid(&self, horizon: usize) -> Vec<NaiveDate> {
        let mut grid = self.periods.clone();
        let mut cursor = self.last_period();
        for _ in 0..horizon {
            cursor = next_month(cursor);
            grid.push(cursor);
        }
        grid
    }
}
