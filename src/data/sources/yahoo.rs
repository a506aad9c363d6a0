//! Yahoo Finance data source integration
//!
//! Reads daily closes from the public chart API. FX tickers use the `NGN=X` form.

use super::{DailyClose, RateSource};
use crate::error::{ForecastError, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Yahoo Finance data source (no API key required)
pub struct YahooFinanceSource {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    symbol: String,
    #[serde(default, rename = "gmtoffset")]
    gmt_offset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

impl YahooFinanceSource {
    /// Create a new Yahoo Finance data source
    pub fn new() -> Result<Self> {
        Self::with_options(YAHOO_BASE_URL, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a source against a custom endpoint and timeout
    pub fn with_options(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| {
                ForecastError::FetchFailed(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn chart_url(&self, symbol: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> String {
        format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d&events=history",
            self.base_url,
            symbol,
            start.timestamp(),
            end.timestamp()
        )
    }
}

/// Parse a chart API response body into daily closes.
///
/// Timestamps are shifted by the exchange GMT offset before taking the date.
pub fn parse_chart_response(body: &str) -> Result<Vec<DailyClose>> {
    let envelope: ChartEnvelope = serde_json::from_str(body)
        .map_err(|e| ForecastError::FetchFailed(format!("Malformed chart response: {}", e)))?;

    if let Some(err) = envelope.chart.error {
        return Err(ForecastError::FetchFailed(format!(
            "Yahoo Finance error {}: {}",
            err.code, err.description
        )));
    }

    let result = envelope
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| ForecastError::FetchFailed("Empty chart result".to_string()))?;

    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();

    let mut rows = Vec::with_capacity(result.timestamp.len());
    for (i, ts) in result.timestamp.iter().enumerate() {
        let local = ts
            .checked_add(result.meta.gmt_offset)
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .ok_or_else(|| {
                ForecastError::FetchFailed(format!(
                    "Invalid timestamp in chart response: {} (gmtoffset {})",
                    ts, result.meta.gmt_offset
                ))
            })?;
        let close = closes.get(i).copied().flatten();
        rows.push(DailyClose::new(local.date_naive(), close));
    }

    log::debug!(
        "Parsed {} chart rows for {}",
        rows.len(),
        result.meta.symbol
    );
    Ok(rows)
}

impl RateSource for YahooFinanceSource {
    async fn fetch_daily_closes(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<DailyClose>> {
        let url = self.chart_url(symbol, start, end);
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ForecastError::FetchFailed(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ForecastError::FetchFailed(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            // The chart API reports unknown symbols as 404 with a JSON error body
            return match parse_chart_response(&text) {
                Err(e) => Err(e),
                Ok(_) => Err(ForecastError::FetchFailed(format!(
                    "Yahoo Finance returned error: {}",
                    status
                ))),
            };
        }

        parse_chart_response(&text)
    }

    fn name(&self) -> &str {
        "yahoo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    const SAMPLE: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"currency": "NGN", "symbol": "NGN=X", "gmtoffset": 3600},
                "timestamp": [1735689600, 1735776000, 1735862400],
                "indicators": {"quote": [{"close": [1535.5, null, 1541.25]}]}
            }],
            "error": null
        }
    }"#;

    #[test]
    fn test_yahoo_source_creation() {
        let source = YahooFinanceSource::new();
        assert!(source.is_ok());
        assert_eq!(source.unwrap().name(), "yahoo");
    }

    #[test]
    fn test_chart_url() {
        let source =
            YahooFinanceSource::with_options("http://localhost:9000/", Duration::from_secs(1))
                .unwrap();
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 1, 31, 0, 0, 0).unwrap();

        let url = source.chart_url("NGN=X", start, end);
        assert_eq!(
            url,
            "http://localhost:9000/v8/finance/chart/NGN=X?period1=1735689600&period2=1738281600&interval=1d&events=history"
        );
    }

    #[test]
    fn test_chart_parsing() {
        let rows = parse_chart_response(SAMPLE).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(rows[0].close, Some(1535.5));
        assert_eq!(rows[1].close, None);
        assert_eq!(rows[2].date, NaiveDate::from_ymd_opt(2025, 1, 3).unwrap());
    }

    #[test]
    fn test_chart_parsing_negative_offset_shifts_date() {
        let body = r#"{"chart": {"result": [{
            "meta": {"symbol": "NGN=X", "gmtoffset": -3600},
            "timestamp": [1735689600],
            "indicators": {"quote": [{"close": [1535.5]}]}
        }], "error": null}}"#;

        let rows = parse_chart_response(body).unwrap();
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
    }

    #[test]
    fn test_chart_error_is_fetch_failure() {
        let body = r#"{"chart": {"result": null, "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}}}"#;
        let err = parse_chart_response(body).unwrap_err();

        assert!(matches!(err, ForecastError::FetchFailed(_)));
        assert!(err.to_string().contains("delisted"));
    }

    #[test]
    fn test_malformed_body_is_fetch_failure() {
        assert!(matches!(
            parse_chart_response("<html>rate limited</html>"),
            Err(ForecastError::FetchFailed(_))
        ));
        assert!(matches!(
            parse_chart_response(r#"{"chart": {"result": [], "error": null}}"#),
            Err(ForecastError::FetchFailed(_))
        ));
    }

    #[test]
    fn test_overflowing_timestamp_is_fetch_failure() {
        let body = r#"{"chart": {"result": [{
            "meta": {"symbol": "NGN=X", "gmtoffset": 3600},
            "timestamp": [9223372036854775807],
            "indicators": {"quote": [{"close": [1535.5]}]}
        }], "error": null}}"#;

        assert!(matches!(
            parse_chart_response(body),
            Err(ForecastError::FetchFailed(_))
        ));
    }
}
