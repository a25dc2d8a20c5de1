//! Seasonal exponential smoothing with yearly multiplicative seasonality.
//!
//! The model tracks a level, a linear trend, and twelve seasonal factors
//! that scale the trend level multiplicatively:
//!
//! - forecast: `ŷ_{t+h} = (l_t + h·b_t) · s_{(t+h) mod 12}`
//! - level:    `l_t = α·(y_t / s) + (1−α)·(l_{t-1} + b_{t-1})`
//! - trend:    `b_t = β·(l_t − l_{t-1}) + (1−β)·b_{t-1}`
//! - seasonal: `s ← γ·(y_t / l_t) + (1−γ)·s`
//!
//! Only sub-yearly structure the data can express is modeled: there is no
//! weekly or daily component, the observations being monthly aggregates.

use crate::core::{MonthlySeries, MONTHS_PER_YEAR};
use crate::error::{PipelineError, Result};
use crate::models::{Forecaster, IntervalForecast};
use crate::utils::{linear_fit, minimize_bounded, quantile_normal, SimplexOptions};

const PARAM_BOUNDS: (f64, f64) = (1e-4, 0.9999);
const EPS: f64 = 1e-10;

/// Smoothing parameters, either fixed by the caller or optimized at fit
/// time.
#[derive(Debug, Clone, Copy)]
struct Params {
    alpha: f64,
    beta: f64,
    gamma: f64,
}

/// Output of one smoothing pass over the training data.
struct SmoothingPass {
    sse: f64,
    fitted: Vec<f64>,
    residuals: Vec<f64>,
    level: f64,
    trend: f64,
    seasonals: Vec<f64>,
}

/// Holt-Winters-family model fixed to a twelve-month multiplicative cycle.
#[derive(Debug, Clone)]
pub struct YearlySeasonalSmoothing {
    params: Option<Params>,
    optimize: bool,
    // Fitted state.
    level: Option<f64>,
    trend: Option<f64>,
    seasonals: Option<Vec<f64>>,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
    residual_variance: f64,
    n: usize,
}

impl YearlySeasonalSmoothing {
    /// Model with smoothing parameters chosen by SSE minimization at fit
    /// time.
    pub fn new() -> Self {
        Self {
            params: None,
            optimize: true,
            level: None,
            trend: None,
            seasonals: None,
            fitted: None,
            residuals: None,
            residual_variance: 0.0,
            n: 0,
        }
    }

    /// Model with fixed smoothing parameters (mainly for tests and
    /// reproducibility experiments).
    pub fn with_params(alpha: f64, beta: f64, gamma: f64) -> Self {
        let clamp = |x: f64| x.clamp(PARAM_BOUNDS.0, PARAM_BOUNDS.1);
        Self {
            params: Some(Params {
                alpha: clamp(alpha),
                beta: clamp(beta),
                gamma: clamp(gamma),
            }),
            optimize: false,
            ..Self::new()
        }
    }

    /// Seasonal factors after fitting, one per cycle position.
    pub fn seasonals(&self) -> Option<&[f64]> {
        self.seasonals.as_deref()
    }

    /// Initial state from the training data.
    ///
    /// Seasonal factors must be estimated on detrended values: on trending
    /// data the raw within-cycle ratios would absorb the ramp itself and
    /// leave a sawtooth the level/trend recursion cannot follow. A linear
    /// baseline is fitted first, each observation is expressed as a ratio
    /// to the baseline, and the per-month ratios are averaged and
    /// normalized to mean 1.
    fn initial_state(values: &[f64]) -> (f64, f64, Vec<f64>) {
        let m = MONTHS_PER_YEAR;
        let (intercept, slope) = linear_fit(values);

        let mut ratio_sums = vec![0.0; m];
        let mut ratio_counts = vec![0usize; m];
        for (t, &y) in values.iter().enumerate() {
            let baseline = intercept + slope * t as f64;
            if baseline.abs() > EPS {
                ratio_sums[t % m] += y / baseline;
                ratio_counts[t % m] += 1;
            }
        }

        let mut seasonals: Vec<f64> = ratio_sums
            .iter()
            .zip(&ratio_counts)
            .map(|(&sum, &count)| if count > 0 { sum / count as f64 } else { 1.0 })
            .collect();

        let mean: f64 = seasonals.iter().sum::<f64>() / m as f64;
        if mean.abs() > EPS {
            for s in &mut seasonals {
                *s /= mean;
            }
        } else {
            seasonals.fill(1.0);
        }

        // The recursion starts at month `m`; seed the state at the end of
        // the first cycle.
        let level = intercept + slope * (m - 1) as f64;
        (level, slope, seasonals)
    }

    /// Run the smoothing recursion over `values` with fixed parameters.
    ///
    /// The first cycle seeds the state: its fitted values are the actuals
    /// with zero residual, and the recursion starts at the thirteenth
    /// month.
    fn smooth(values: &[f64], params: Params) -> SmoothingPass {
        let m = MONTHS_PER_YEAR;
        let (mut level, mut trend, mut seasonals) = Self::initial_state(values);

        let mut fitted = Vec::with_capacity(values.len());
        let mut residuals = Vec::with_capacity(values.len());
        fitted.extend_from_slice(&values[..m]);
        residuals.extend(std::iter::repeat(0.0).take(m));

        let mut sse = 0.0;
        for (t, &y) in values.iter().enumerate().skip(m) {
            let idx = t % m;
            let s = seasonals[idx];

            let prediction = (level + trend) * s;
            let error = y - prediction;
            fitted.push(prediction);
            residuals.push(error);
            sse += error * error;

            let deseasonalized = if s.abs() > EPS { y / s } else { y };
            let level_prev = level;
            level = params.alpha * deseasonalized + (1.0 - params.alpha) * (level_prev + trend);
            trend = params.beta * (level - level_prev) + (1.0 - params.beta) * trend;
            if level.abs() > EPS {
                seasonals[idx] = params.gamma * (y / level) + (1.0 - params.gamma) * s;
            }
        }

        SmoothingPass {
            sse,
            fitted,
            residuals,
            level,
            trend,
            seasonals,
        }
    }

    fn optimize_params(values: &[f64]) -> Params {
        let bounds = [PARAM_BOUNDS; 3];
        let best = minimize_bounded(
            |p| {
                Self::smooth(
                    values,
                    Params {
                        alpha: p[0],
                        beta: p[1],
                        gamma: p[2],
                    },
                )
                .sse
            },
            &[0.3, 0.05, 0.1],
            &bounds,
            SimplexOptions::default(),
        );
        Params {
            alpha: best[0],
            beta: best[1],
            gamma: best[2],
        }
    }
}

impl Default for YearlySeasonalSmoothing {
    fn default() -> Self {
        Self::new()
    }
}

impl Forecaster for YearlySeasonalSmoothing {
    fn fit(&mut self, series: &MonthlySeries) -> Result<()> {
        let values = series.volume();
        let needed = 2 * MONTHS_PER_YEAR;
        if values.len() < needed {
            return Err(PipelineError::InsufficientHistory {
                needed,
                got: values.len(),
            });
        }
        if values.iter().any(|&v| v <= 0.0) {
            return Err(PipelineError::InvalidParameter(
                "multiplicative seasonality requires strictly positive volumes".to_string(),
            ));
        }

        if self.optimize {
            self.params = Some(Self::optimize_params(values));
        }
        let params = self.params.ok_or(PipelineError::FitRequired)?;

        let pass = Self::smooth(values, params);

        self.n = values.len();
        let settled = &pass.residuals[MONTHS_PER_YEAR..];
        self.residual_variance = if settled.is_empty() {
            0.0
        } else {
            settled.iter().map(|r| r * r).sum::<f64>() / settled.len() as f64
        };
        self.level = Some(pass.level);
        self.trend = Some(pass.trend);
        self.seasonals = Some(pass.seasonals);
        self.fitted = Some(pass.fitted);
        self.residuals = Some(pass.residuals);

        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Vec<f64>> {
        let level = self.level.ok_or(PipelineError::FitRequired)?;
        let trend = self.trend.ok_or(PipelineError::FitRequired)?;
        let seasonals = self.seasonals.as_ref().ok_or(PipelineError::FitRequired)?;

        Ok((1..=horizon)
            .map(|h| {
                let s = seasonals[(self.n + h - 1) % MONTHS_PER_YEAR];
                (level + h as f64 * trend) * s
            })
            .collect())
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<IntervalForecast> {
        let point = self.predict(horizon)?;
        let z = quantile_normal((1.0 + level) / 2.0);

        let mut lower = Vec::with_capacity(horizon);
        let mut upper = Vec::with_capacity(horizon);
        for (h, &p) in point.iter().enumerate() {
            // Uncertainty grows once per seasonal cycle crossed.
            let cycles_ahead = (h / MONTHS_PER_YEAR) + 1;
            let se = (self.residual_variance * cycles_ahead as f64).sqrt();
            lower.push(p - z * se);
            upper.push(p + z * se);
        }

        Ok(IntervalForecast {
            point,
            lower,
            upper,
        })
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn name(&self) -> &str {
        "YearlySeasonalSmoothing"
    }
}
