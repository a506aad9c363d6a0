//! Additive trend + seasonality model
//!
//! `y(t) = trend(t) + Σ seasonal_k(t) + ε`, where the trend is piecewise linear
//! with hinges at fixed changepoints and each seasonality is a truncated Fourier
//! series. Coefficients are the MAP estimate under Normal priors on the base
//! trend and seasonal terms and a Laplace prior on the changepoint deltas. The
//! Laplace prior is handled by iteratively reweighted ridge regression.

use super::config::{ModelConfig, Seasonality};
use super::features::{changepoint_positions, epoch_days, fourier_terms, trend_terms};
use super::{FittedForecast, ForecastModel};
use crate::data::forecast_table::Components;
use crate::data::{write_atomically, ForecastTable, HistoricalSeries};
use crate::error::{ForecastError, Result};
use crate::types::ForecastPoint;
use chrono::{DateTime, NaiveDate, Utc};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use std::fs;
use std::path::Path;

/// Prior scale of the base slope. The offset is left unpenalised.
const TREND_PRIOR_SCALE: f64 = 5.0;
const IRLS_ITERATIONS: usize = 10;
const DELTA_FLOOR: f64 = 1e-6;
const SIGMA2_FLOOR: f64 = 1e-12;
const DIAGONAL_JITTER: f64 = 1e-10;

/// Unfitted additive model
#[derive(Debug, Clone)]
pub struct AdditiveModel {
    name: String,
    config: ModelConfig,
}

/// Fitted coefficients of one seasonal component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalFit {
    pub seasonality: Seasonality,
    pub coefficients: Vec<f64>,
}

/// Fitted additive model. Coefficients are stored on the scaled axes
/// (`y / y_scale`, `t` in `[0, 1]` over the training span).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedAdditiveModel {
    name: String,
    pub config: ModelConfig,
    pub history_start: NaiveDate,
    pub history_end: NaiveDate,
    pub history_len: usize,
    pub fitted_at: DateTime<Utc>,
    t_span_days: f64,
    y_scale: f64,
    changepoints: Vec<f64>,
    offset: f64,
    slope: f64,
    deltas: Vec<f64>,
    seasonal: Vec<SeasonalFit>,
    sigma: f64,
}

impl AdditiveModel {
    /// Create a model, validating the configuration
    pub fn new(config: ModelConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::named(config))
    }

    fn named(config: ModelConfig) -> Self {
        Self {
            name: format!(
                "Additive seasonal (changepoint_prior_scale={})",
                config.changepoint_prior_scale
            ),
            config,
        }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }
}

impl Default for AdditiveModel {
    fn default() -> Self {
        Self::named(ModelConfig::default())
    }
}

impl ForecastModel for AdditiveModel {
    type Fitted = FittedAdditiveModel;

    /// Seasonalities whose period is longer than the training span are left out
    /// of the fit, since on a shorter history their Fourier columns only soak up
    /// level and slope.
    fn fit(&self, history: &HistoricalSeries) -> Result<Self::Fitted> {
        let obs = history.observations();
        if obs.len() < 2 {
            return Err(ForecastError::InsufficientData {
                required: 2,
                available: obs.len(),
            });
        }

        let start = obs[0].date;
        let end = obs[obs.len() - 1].date;
        let t_span_days = (end - start).num_days() as f64;
        if t_span_days <= 0.0 {
            return Err(ForecastError::ModelError(
                "History must span more than one date".to_string(),
            ));
        }

        let y_scale = obs.iter().map(|o| o.rate.abs()).fold(0.0, f64::max);
        if !(y_scale > 0.0 && y_scale.is_finite()) {
            return Err(ForecastError::ModelError(format!(
                "Cannot scale series with max |y| = {}",
                y_scale
            )));
        }

        let t: Vec<f64> = obs
            .iter()
            .map(|o| (o.date - start).num_days() as f64 / t_span_days)
            .collect();
        let y = DVector::from_iterator(obs.len(), obs.iter().map(|o| o.rate / y_scale));

        let changepoints = changepoint_positions(
            &t,
            self.config.n_changepoints,
            self.config.changepoint_range,
        );
        let (seasonalities, skipped): (Vec<_>, Vec<_>) = self
            .config
            .seasonalities()
            .into_iter()
            .partition(|s| s.period <= t_span_days);
        for s in &skipped {
            log::debug!(
                "Skipping {} seasonality: history spans {} days, period is {}",
                s.name,
                t_span_days,
                s.period
            );
        }
        let n_cp = changepoints.len();
        let width = 2 + n_cp + seasonalities.iter().map(Seasonality::width).sum::<usize>();

        let mut flat = Vec::with_capacity(obs.len() * width);
        for (o, &ti) in obs.iter().zip(&t) {
            flat.extend(trend_terms(ti, &changepoints));
            let days = epoch_days(o.date);
            for s in &seasonalities {
                flat.extend(fourier_terms(days, s.period, s.order));
            }
        }
        let x = DMatrix::from_row_slice(obs.len(), width, &flat);
        let xt = x.transpose();
        let xtx = &xt * &x;
        let xty = &xt * &y;

        // Prior precisions (1 / variance) per column; deltas are reweighted each pass.
        // A zero offset precision keeps the level out of the seasonal terms when some
        // weekdays are never observed.
        let laplace_scale = self.config.changepoint_prior_scale;
        let seasonal_precision = 1.0 / self.config.seasonality_prior_scale.powi(2);
        let mut precision = vec![0.0, 1.0 / TREND_PRIOR_SCALE.powi(2)];
        precision.extend(std::iter::repeat(1.0 / (2.0 * laplace_scale.powi(2))).take(n_cp));
        precision.resize(width, seasonal_precision);

        let y_mean = y.mean();
        let mut sigma2 = (y.iter().map(|v| (v - y_mean).powi(2)).sum::<f64>()
            / obs.len() as f64)
            .max(SIGMA2_FLOOR);
        let mut beta = DVector::zeros(width);

        for iteration in 0..IRLS_ITERATIONS {
            let mut a = xtx.clone();
            for (j, p) in precision.iter().enumerate() {
                a[(j, j)] += sigma2 * p + DIAGONAL_JITTER;
            }
            let chol = a.cholesky().ok_or_else(|| {
                ForecastError::ModelError("Normal equations are not positive definite".to_string())
            })?;
            beta = chol.solve(&xty);

            let residual = &y - &x * &beta;
            sigma2 = (residual.norm_squared() / obs.len() as f64).max(SIGMA2_FLOOR);

            for j in 0..n_cp {
                let delta = beta[2 + j].abs().max(DELTA_FLOOR);
                precision[2 + j] = 1.0 / (laplace_scale * delta);
            }

            log::debug!(
                "IRLS pass {}: sigma = {:.6}, |delta|_1 = {:.6}",
                iteration + 1,
                sigma2.sqrt(),
                (0..n_cp).map(|j| beta[2 + j].abs()).sum::<f64>()
            );
        }

        let mut column = 2 + n_cp;
        let seasonal = seasonalities
            .into_iter()
            .map(|s| {
                let coefficients = beta.rows(column, s.width()).iter().copied().collect();
                column += s.width();
                SeasonalFit {
                    seasonality: s,
                    coefficients,
                }
            })
            .collect();

        let fitted = FittedAdditiveModel {
            name: self.name.clone(),
            config: self.config.clone(),
            history_start: start,
            history_end: end,
            history_len: obs.len(),
            fitted_at: Utc::now(),
            t_span_days,
            y_scale,
            offset: beta[0],
            slope: beta[1],
            deltas: (0..n_cp).map(|j| beta[2 + j]).collect(),
            changepoints,
            seasonal,
            sigma: sigma2.sqrt(),
        };

        log::info!(
            "Fitted {} on {} observations ({} changepoints, residual sd {:.4})",
            fitted.name,
            fitted.history_len,
            n_cp,
            fitted.sigma * y_scale
        );
        Ok(fitted)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl FittedAdditiveModel {
    /// Residual standard deviation in rate units
    pub fn residual_sd(&self) -> f64 {
        self.sigma * self.y_scale
    }

    /// Number of trend changepoints
    pub fn changepoint_count(&self) -> usize {
        self.changepoints.len()
    }

    pub fn seasonal_fits(&self) -> &[SeasonalFit] {
        &self.seasonal
    }

    /// Scaled time of a date
    fn scaled_t(&self, date: NaiveDate) -> f64 {
        (date - self.history_start).num_days() as f64 / self.t_span_days
    }

    fn trend_at(&self, t: f64) -> f64 {
        let hinges: f64 = self
            .changepoints
            .iter()
            .zip(&self.deltas)
            .map(|(s, d)| d * (t - s).max(0.0))
            .sum();
        self.offset + self.slope * t + hinges
    }

    fn seasonal_at(&self, fit: &SeasonalFit, days: f64) -> f64 {
        let s = &fit.seasonality;
        fourier_terms(days, s.period, s.order)
            .iter()
            .zip(&fit.coefficients)
            .map(|(x, b)| x * b)
            .sum()
    }

    /// Variance of the trend at scaled time `t` from changepoints that may occur
    /// after the training range, at the historical changepoint rate with Laplace
    /// magnitude equal to the mean absolute fitted delta.
    fn trend_variance(&self, t: f64) -> f64 {
        if t <= 1.0 || self.changepoints.is_empty() {
            return 0.0;
        }
        let rate = self.changepoints.len() as f64;
        let lambda =
            self.deltas.iter().map(|d| d.abs()).sum::<f64>() / self.deltas.len() as f64 + 1e-8;
        rate * 2.0 * lambda.powi(2) * (t - 1.0).powi(3) / 3.0
    }

    /// Save as pretty JSON, replacing any existing file
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(self)?;
        write_atomically(path, &bytes)?;
        log::debug!("Saved model to {}", path.display());
        Ok(())
    }

    pub fn load_json(path: &Path) -> Result<Self> {
        crate::data::ensure_exists(path)?;
        let contents = fs::read_to_string(path)?;
        let model: Self = serde_json::from_str(&contents)?;
        Ok(model)
    }
}

impl FittedForecast for FittedAdditiveModel {
    fn predict(&self, dates: &[NaiveDate]) -> Result<ForecastTable> {
        let z = Normal::new(0.0, 1.0)
            .map_err(|e| ForecastError::ModelError(format!("Normal distribution: {}", e)))?
            .inverse_cdf(0.5 + self.config.interval_width / 2.0);

        let mut points = Vec::with_capacity(dates.len());
        let mut components = Vec::with_capacity(dates.len());
        for &date in dates {
            let t = self.scaled_t(date);
            let days = epoch_days(date);

            let trend = self.trend_at(t);
            let mut parts = Components {
                trend: trend * self.y_scale,
                ..Components::default()
            };
            let mut seasonal_total = 0.0;
            for fit in &self.seasonal {
                let value = self.seasonal_at(fit, days);
                seasonal_total += value;
                match fit.seasonality.name.as_str() {
                    "weekly" => parts.weekly = value * self.y_scale,
                    "yearly" => parts.yearly = value * self.y_scale,
                    _ => {}
                }
            }

            let yhat = (trend + seasonal_total) * self.y_scale;
            let sd = (self.sigma.powi(2) + self.trend_variance(t)).sqrt() * self.y_scale;
            points.push(ForecastPoint::new(date, yhat, yhat - z * sd, yhat + z * sd));
            components.push(parts);
        }

        ForecastTable::with_components(points, components)
    }

    fn make_future_dates(&self, horizon: usize) -> Vec<NaiveDate> {
        self.history_end.iter_days().skip(1).take(horizon).collect()
    }

    fn name(&self) -> &str {
        &self.name
    }
}
