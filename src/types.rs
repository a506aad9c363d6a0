//! Core types and constants

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Rate type: quote currency units per one base currency unit
pub type Rate = f64;

/// Length of the trailing fetch window in calendar days
pub const FETCH_WINDOW_DAYS: i64 = 730;

/// Number of future calendar days forecast past the last observation
pub const FORECAST_HORIZON_DAYS: usize = 30;

/// Short-range lookahead shown next to the horizon forecast
pub const SHORT_LOOKAHEAD_DAYS: usize = 7;

/// A single daily closing rate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub rate: Rate,
}

impl Observation {
    pub fn new(date: NaiveDate, rate: Rate) -> Self {
        Self { date, rate }
    }
}

/// One row of the forecast table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    /// Point estimate
    pub yhat: Rate,
    pub yhat_lower: Rate,
    pub yhat_upper: Rate,
}

impl ForecastPoint {
    pub fn new(date: NaiveDate, yhat: Rate, yhat_lower: Rate, yhat_upper: Rate) -> Self {
        Self {
            date,
            yhat,
            yhat_lower,
            yhat_upper,
        }
    }

    /// `yhat_lower <= yhat <= yhat_upper`
    pub fn bounds_hold(&self) -> bool {
        self.yhat_lower <= self.yhat && self.yhat <= self.yhat_upper
    }

    /// Width of the confidence band
    pub fn band_width(&self) -> Rate {
        self.yhat_upper - self.yhat_lower
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forecast_point_bounds() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 8).unwrap();
        let point = ForecastPoint::new(date, 1510.0, 1490.0, 1530.0);

        assert!(point.bounds_hold());
        assert_eq!(point.band_width(), 40.0);

        let inverted = ForecastPoint::new(date, 1510.0, 1520.0, 1530.0);
        assert!(!inverted.bounds_hold());
    }
}
