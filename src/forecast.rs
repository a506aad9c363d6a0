//! Forecasting models for daily rate series
//!
//! The pipeline fits one model family: an additive decomposition into a
//! piecewise-linear trend plus Fourier seasonalities. [`Forecaster`] wraps a
//! model into the training stage that persists the fitted model and the
//! forecast table.

pub mod additive;
pub mod config;
pub mod features;
pub mod trainer;

pub use additive::{AdditiveModel, FittedAdditiveModel};
pub use config::{ModelConfig, Seasonality};
pub use trainer::{Forecaster, TrainingOutput, TrainingReport};

use crate::data::{ForecastTable, HistoricalSeries};
use crate::error::Result;
use chrono::NaiveDate;
use std::fmt::Debug;

/// Fitted model able to produce forecasts
pub trait FittedForecast: Debug {
    /// Point estimate and bounds for each date. Dates must be strictly ascending.
    fn predict(&self, dates: &[NaiveDate]) -> Result<ForecastTable>;

    /// The `horizon` calendar days following the last training date
    fn make_future_dates(&self, horizon: usize) -> Vec<NaiveDate>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be fit on a historical series
pub trait ForecastModel: Debug + Clone {
    /// The type of fitted model produced
    type Fitted: FittedForecast;

    /// Fit the model on a historical series
    fn fit(&self, history: &HistoricalSeries) -> Result<Self::Fitted>;

    /// Get the name of the model
    fn name(&self) -> &str;
}
