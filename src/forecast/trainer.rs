//! Forecaster stage: fit on the historical table, persist model and forecast

use super::{AdditiveModel, FittedForecast, ForecastModel};
use crate::config::ArtifactPaths;
use crate::data::{write_atomically, ForecastTable, HistoricalSeries, SeriesSummary};
use crate::error::{ForecastError, Result};
use crate::presenter::Direction;
use crate::types::{ForecastPoint, Observation, FORECAST_HORIZON_DAYS, SHORT_LOOKAHEAD_DAYS};
use serde::Serialize;
use std::path::Path;

/// Fitted model together with its forecast over history + horizon
#[derive(Debug, Clone)]
pub struct TrainingOutput<F> {
    pub fitted: F,
    pub forecast: ForecastTable,
}

/// What a training run produced, for logging and console output
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub model_name: String,
    pub summary: SeriesSummary,
    pub latest: Observation,
    /// First days of the forecast horizon
    pub next_days: Vec<ForecastPoint>,
    /// Last day of the forecast horizon
    pub horizon_point: ForecastPoint,
    pub change: f64,
    pub change_pct: f64,
    pub direction: Direction,
}

impl TrainingReport {
    fn new(model_name: &str, history: &HistoricalSeries, forecast: &ForecastTable) -> Result<Self> {
        let summary = history
            .summary()
            .ok_or(ForecastError::InsufficientData {
                required: 1,
                available: 0,
            })?;
        let latest = *history.latest().ok_or(ForecastError::InsufficientData {
            required: 1,
            available: 0,
        })?;

        let future = forecast.after(latest.date);
        let horizon_point = *future.last().ok_or_else(|| ForecastError::InsufficientForecast {
            required: 1,
            available: 0,
            latest_date: latest.date,
        })?;

        let change = horizon_point.yhat - latest.rate;
        Ok(Self {
            model_name: model_name.to_string(),
            summary,
            latest,
            next_days: future.iter().take(SHORT_LOOKAHEAD_DAYS).copied().collect(),
            horizon_point,
            change,
            change_pct: change / latest.rate * 100.0,
            direction: Direction::from_change(change),
        })
    }
}

/// Trains a forecast model and writes the model and forecast artifacts
#[derive(Debug, Clone)]
pub struct Forecaster<M: ForecastModel = AdditiveModel> {
    model: M,
    horizon: usize,
}

impl Forecaster<AdditiveModel> {
    /// Forecaster with the default additive model and 30-day horizon
    pub fn new() -> Self {
        Self::with_model(AdditiveModel::default())
    }
}

impl Default for Forecaster<AdditiveModel> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Forecaster<M>
where
    M: ForecastModel,
    M::Fitted: Serialize,
{
    pub fn with_model(model: M) -> Self {
        Self {
            model,
            horizon: FORECAST_HORIZON_DAYS,
        }
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Fit and predict over every historical date plus the horizon
    pub fn train(&self, history: &HistoricalSeries) -> Result<TrainingOutput<M::Fitted>> {
        let fitted = self.model.fit(history)?;

        let mut dates = history.dates();
        dates.extend(fitted.make_future_dates(self.horizon));
        let forecast = fitted.predict(&dates)?;

        let violations = forecast.bound_violations();
        if let Some(first) = violations.first() {
            return Err(ForecastError::ModelError(format!(
                "{} forecast rows violate lower <= yhat <= upper (first on {})",
                violations.len(),
                first.date
            )));
        }

        Ok(TrainingOutput { fitted, forecast })
    }

    /// Run the stage: read history, train, write forecast then model
    pub fn run(&self, paths: &ArtifactPaths) -> Result<TrainingReport> {
        log::info!("Loading history from {}", paths.historical.display());
        let history = HistoricalSeries::read_csv(&paths.historical)?;
        if let Some(summary) = history.summary() {
            log::info!(
                "Dataset: {} days from {} to {}, rates {:.2} to {:.2}",
                summary.count,
                summary.start_date,
                summary.end_date,
                summary.min_rate,
                summary.max_rate
            );
        }

        let output = self.train(&history)?;
        output.forecast.write_csv(&paths.forecast)?;
        save_model(&output.fitted, &paths.model)?;
        log::info!(
            "Saved forecast ({} rows) to {} and model to {}",
            output.forecast.len(),
            paths.forecast.display(),
            paths.model.display()
        );

        let report = TrainingReport::new(self.model.name(), &history, &output.forecast)?;
        log::info!(
            "Forecast for {}: {:.2} [{:.2}, {:.2}], change {:+.2} ({:+.2}%), {}",
            report.horizon_point.date,
            report.horizon_point.yhat,
            report.horizon_point.yhat_lower,
            report.horizon_point.yhat_upper,
            report.change,
            report.change_pct,
            report.direction
        );
        Ok(report)
    }
}

fn save_model<F: Serialize>(fitted: &F, path: &Path) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(fitted)?;
    write_atomically(path, &bytes)
}
