//! Core data structures for the monthly pipeline.

mod forecast;
mod series;

pub use forecast::{ForecastRow, ForecastTable};
pub use series::{first_of_month, next_month, MonthlySeries, Observation};

/// Months per seasonal cycle. The data is monthly with yearly seasonality,
/// so every lookback, split, and seasonal index in the pipeline is built on
/// this period.
pub const MONTHS_PER_YEAR: usize = 12;
