//! Persisted tables and market data sources
//!
//! - [`history`]: the historical `date,rate` table written by the fetcher
//! - [`forecast_table`]: the `ds,yhat,yhat_lower,yhat_upper` table written by the forecaster
//! - [`sources`]: market-data providers

pub mod forecast_table;
pub mod history;
pub mod sources;

pub use forecast_table::ForecastTable;
pub use history::{HistoricalSeries, SeriesSummary};

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

/// Date format used in every persisted table
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Find column index by name
pub(crate) fn find_column(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| ForecastError::DataError(format!("Column '{}' not found", name)))
}

/// Parse a table date. Date-time strings (`2024-03-01 00:00:00+00:00`) keep their date part.
pub(crate) fn parse_date(value: &str) -> Result<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .or_else(|_| {
            value
                .get(..10)
                .ok_or(())
                .and_then(|prefix| NaiveDate::parse_from_str(prefix, DATE_FORMAT).map_err(|_| ()))
        })
        .map_err(|_| ForecastError::ParseError(format!("Invalid date: {}", value)))
}

pub(crate) fn parse_f64(value: Option<&str>, column: &str) -> Result<f64> {
    let raw = value.ok_or_else(|| ForecastError::DataError(format!("Missing {}", column)))?;
    raw.trim()
        .parse()
        .map_err(|_| ForecastError::ParseError(format!("Invalid {} value: {}", column, raw)))
}

/// Fail with `ArtifactNotFound` instead of a bare IO error
pub(crate) fn ensure_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(ForecastError::ArtifactNotFound(path.to_path_buf()))
    }
}

/// Write `contents` next to `path`, then rename over it so readers never see a partial file.
pub(crate) fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp = temp_sibling(path);
    fs::write(&tmp, contents)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
