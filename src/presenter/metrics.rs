//! Metrics derived from the latest observation and the forecast

use crate::data::{ForecastTable, HistoricalSeries};
use crate::error::{ForecastError, Result};
use crate::types::{ForecastPoint, Observation, Rate, FORECAST_HORIZON_DAYS, SHORT_LOOKAHEAD_DAYS};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Expected move of the quote currency over the horizon.
///
/// A rising rate means more quote currency per base unit, so the quote
/// currency is weakening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Weakening,
    Strengthening,
}

impl Direction {
    /// Classify a horizon change. A change of exactly zero is `Strengthening`.
    pub fn from_change(change: f64) -> Self {
        if change > 0.0 {
            Direction::Weakening
        } else {
            Direction::Strengthening
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Direction::Weakening => "Weakening",
            Direction::Strengthening => "Strengthening",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Current rate, 7- and 30-day forecasts and their deltas
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedMetrics {
    pub latest_rate: Rate,
    pub latest_date: NaiveDate,
    pub forecast_7d: ForecastPoint,
    pub forecast_30d: ForecastPoint,
    pub change_7d: Rate,
    pub change_30d: Rate,
    pub change_pct_7d: f64,
    pub change_pct_30d: f64,
    pub direction: Direction,
}

impl DerivedMetrics {
    /// Derive metrics from the persisted tables.
    ///
    /// The forecast must hold at least 30 rows dated after the latest observation;
    /// the 7th and 30th of them are the +7 and +30 day points.
    pub fn derive(history: &HistoricalSeries, forecast: &ForecastTable) -> Result<Self> {
        let latest = *history
            .latest()
            .ok_or_else(|| ForecastError::DataError("Historical table is empty".to_string()))?;

        let future = forecast.after(latest.date);
        if future.len() < FORECAST_HORIZON_DAYS {
            return Err(ForecastError::InsufficientForecast {
                required: FORECAST_HORIZON_DAYS,
                available: future.len(),
                latest_date: latest.date,
            });
        }

        Self::from_parts(
            latest,
            future[SHORT_LOOKAHEAD_DAYS - 1],
            future[FORECAST_HORIZON_DAYS - 1],
        )
    }

    /// Compute deltas from a latest observation and the two forecast points
    pub fn from_parts(
        latest: Observation,
        forecast_7d: ForecastPoint,
        forecast_30d: ForecastPoint,
    ) -> Result<Self> {
        if !(latest.rate > 0.0 && latest.rate.is_finite()) {
            return Err(ForecastError::DataError(format!(
                "Latest rate must be positive, got {} on {}",
                latest.rate, latest.date
            )));
        }

        let change_7d = forecast_7d.yhat - latest.rate;
        let change_30d = forecast_30d.yhat - latest.rate;

        Ok(Self {
            latest_rate: latest.rate,
            latest_date: latest.date,
            forecast_7d,
            forecast_30d,
            change_7d,
            change_30d,
            change_pct_7d: change_7d / latest.rate * 100.0,
            change_pct_30d: change_30d / latest.rate * 100.0,
            direction: Direction::from_change(change_30d),
        })
    }
}
