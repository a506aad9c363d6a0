//! Rate fetcher stage
//!
//! Pulls a trailing window of daily closes for one pair and replaces the
//! historical table. Every failure surfaces as [`ForecastError::FetchFailed`];
//! nothing is written unless the whole fetch succeeded.

use crate::currency::CurrencyPair;
use crate::data::sources::RateSource;
use crate::data::HistoricalSeries;
use crate::error::{ForecastError, Result};
use crate::types::FETCH_WINDOW_DAYS;
use chrono::{DateTime, Duration, Utc};
use std::path::Path;

/// Fetches daily closes for a fixed pair over a fixed trailing window
pub struct RateFetcher<S: RateSource> {
    source: S,
    pair: CurrencyPair,
    window_days: i64,
}

impl<S: RateSource> RateFetcher<S> {
    /// Fetcher for USD/NGN over the standard 730-day window
    pub fn new(source: S) -> Self {
        Self {
            source,
            pair: CurrencyPair::USD_NGN,
            window_days: FETCH_WINDOW_DAYS,
        }
    }

    pub fn pair(&self) -> CurrencyPair {
        self.pair
    }

    pub fn window_days(&self) -> i64 {
        self.window_days
    }

    /// Fetch and normalize the window ending at `now`
    pub async fn fetch(&self, now: DateTime<Utc>) -> Result<HistoricalSeries> {
        let start = now - Duration::days(self.window_days);
        let symbol = self.pair.yahoo_symbol();
        log::info!(
            "Fetching {} ({}) from {} between {} and {}",
            self.pair,
            symbol,
            self.source.name(),
            start.date_naive(),
            now.date_naive()
        );

        let closes = self
            .source
            .fetch_daily_closes(&symbol, start, now)
            .await
            .map_err(into_fetch_failure)?;

        let series = HistoricalSeries::from_closes(closes);
        if series.is_empty() {
            return Err(ForecastError::FetchFailed(format!(
                "No closing prices returned for {}",
                symbol
            )));
        }

        log::info!("Fetched {} data points", series.len());
        Ok(series)
    }

    /// Fetch the window ending now and overwrite the table at `path`
    pub async fn fetch_and_store(&self, path: &Path) -> Result<HistoricalSeries> {
        self.fetch_and_store_at(path, Utc::now()).await
    }

    /// Failures are logged and returned as `FetchFailed`; `path` is only
    /// replaced after a complete fetch.
    pub async fn fetch_and_store_at(
        &self,
        path: &Path,
        now: DateTime<Utc>,
    ) -> Result<HistoricalSeries> {
        let stored = self
            .fetch(now)
            .await
            .and_then(|series| series.write_csv(path).map(|_| series));
        match stored.map_err(into_fetch_failure) {
            Ok(series) => {
                log::info!("Saved {} rows to {}", series.len(), path.display());
                Ok(series)
            }
            Err(e) => {
                log::error!("{}; {} left unchanged", e, path.display());
                Err(e)
            }
        }
    }
}

fn into_fetch_failure(err: ForecastError) -> ForecastError {
    match err {
        ForecastError::FetchFailed(_) => err,
        other => ForecastError::FetchFailed(other.to_string()),
    }
}
