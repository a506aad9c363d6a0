//! Model configuration

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};

/// A periodic component expressed as a Fourier series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seasonality {
    pub name: String,
    /// Period in days
    pub period: f64,
    /// Number of sine/cosine pairs
    pub order: usize,
}

impl Seasonality {
    pub fn weekly() -> Self {
        Self {
            name: "weekly".to_string(),
            period: 7.0,
            order: 3,
        }
    }

    pub fn yearly() -> Self {
        Self {
            name: "yearly".to_string(),
            period: 365.25,
            order: 10,
        }
    }

    pub fn daily() -> Self {
        Self {
            name: "daily".to_string(),
            period: 1.0,
            order: 4,
        }
    }

    /// Number of design-matrix columns this component adds
    pub fn width(&self) -> usize {
        2 * self.order
    }
}

/// Configuration of the additive model.
///
/// The pipeline always trains with [`ModelConfig::default`]; the struct exists so
/// the fitted model can record what it was trained with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub weekly_seasonality: bool,
    pub yearly_seasonality: bool,
    pub daily_seasonality: bool,
    /// Scale of the Laplace prior on trend changes. Higher bends the trend more readily.
    pub changepoint_prior_scale: f64,
    pub n_changepoints: usize,
    /// Fraction of the history in which changepoints may be placed
    pub changepoint_range: f64,
    pub seasonality_prior_scale: f64,
    /// Coverage of the uncertainty interval
    pub interval_width: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            weekly_seasonality: true,
            yearly_seasonality: true,
            daily_seasonality: false,
            changepoint_prior_scale: 0.05,
            n_changepoints: 25,
            changepoint_range: 0.8,
            seasonality_prior_scale: 10.0,
            interval_width: 0.8,
        }
    }
}

impl ModelConfig {
    /// Check parameter ranges
    pub fn validate(&self) -> Result<()> {
        if !(self.changepoint_prior_scale > 0.0) {
            return Err(ForecastError::ModelError(
                "changepoint_prior_scale must be positive".to_string(),
            ));
        }
        if !(self.seasonality_prior_scale > 0.0) {
            return Err(ForecastError::ModelError(
                "seasonality_prior_scale must be positive".to_string(),
            ));
        }
        if !(self.changepoint_range > 0.0 && self.changepoint_range <= 1.0) {
            return Err(ForecastError::ModelError(
                "changepoint_range must be in (0, 1]".to_string(),
            ));
        }
        if !(self.interval_width > 0.0 && self.interval_width < 1.0) {
            return Err(ForecastError::ModelError(
                "interval_width must be between 0 and 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Enabled seasonal components in design-matrix order
    pub fn seasonalities(&self) -> Vec<Seasonality> {
        let mut out = Vec::new();
        if self.weekly_seasonality {
            out.push(Seasonality::weekly());
        }
        if self.yearly_seasonality {
            out.push(Seasonality::yearly());
        }
        if self.daily_seasonality {
            out.push(Seasonality::daily());
        }
        out
    }
}
