//! External market-data sources
//!
//! - Yahoo Finance: daily FX closes from the public chart API (`async` feature)
//! - In-memory: fixed rows for tests and offline runs

pub mod in_memory;
#[cfg(feature = "async")]
pub mod yahoo;

pub use in_memory::InMemoryRateSource;
#[cfg(feature = "async")]
pub use yahoo::YahooFinanceSource;

use crate::error::Result;
use crate::types::Rate;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Raw provider row. `close` is `None` when the provider has no price for the day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyClose {
    pub date: NaiveDate,
    pub close: Option<Rate>,
}

impl DailyClose {
    pub fn new(date: NaiveDate, close: Option<Rate>) -> Self {
        Self { date, close }
    }
}

/// Trait for providers of daily closing rates
pub trait RateSource: Send + Sync {
    /// Fetch daily closes for `symbol` between `start` and `end`
    fn fetch_daily_closes(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<DailyClose>>> + Send;

    /// Get the source name
    fn name(&self) -> &str;
}
