//! In-memory rate source

use super::{DailyClose, RateSource};
use crate::error::{ForecastError, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Serves pre-loaded closes per symbol. Can be set to fail every request.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRateSource {
    closes: HashMap<String, Vec<DailyClose>>,
    failure: Option<String>,
}

impl InMemoryRateSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// A source whose every fetch fails with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            closes: HashMap::new(),
            failure: Some(message.into()),
        }
    }

    /// Add rows for a symbol
    pub fn add_closes(&mut self, symbol: &str, closes: impl IntoIterator<Item = DailyClose>) {
        self.closes
            .entry(symbol.to_string())
            .or_default()
            .extend(closes);
    }

    pub fn with_closes(
        mut self,
        symbol: &str,
        closes: impl IntoIterator<Item = DailyClose>,
    ) -> Self {
        self.add_closes(symbol, closes);
        self
    }
}

impl RateSource for InMemoryRateSource {
    async fn fetch_daily_closes(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<DailyClose>> {
        if let Some(message) = &self.failure {
            return Err(ForecastError::FetchFailed(message.clone()));
        }

        let (first, last) = (start.date_naive(), end.date_naive());
        let rows = self
            .closes
            .get(symbol)
            .ok_or_else(|| ForecastError::FetchFailed(format!("No data for symbol {}", symbol)))?
            .iter()
            .filter(|c| c.date >= first && c.date <= last)
            .copied()
            .collect();

        Ok(rows)
    }

    fn name(&self) -> &str {
        "in-memory"
    }
}
