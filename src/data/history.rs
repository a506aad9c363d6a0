//! Historical rate table
//!
//! The fetcher writes this table and both the forecaster and presenter read it.
//! Rows are kept strictly ascending by date with no duplicates.

use super::sources::DailyClose;
use super::{ensure_exists, find_column, parse_date, parse_f64, write_atomically, DATE_FORMAT};
use crate::error::{ForecastError, Result};
use crate::types::{Observation, Rate};
use chrono::NaiveDate;
use csv::{ReaderBuilder, WriterBuilder};
use serde::Serialize;
use statrs::statistics::Statistics;
use std::path::Path;

/// Daily closing rates ordered by date
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoricalSeries {
    observations: Vec<Observation>,
}

/// Descriptive statistics of a series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub count: usize,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub min_rate: Rate,
    pub max_rate: Rate,
    pub mean_rate: Rate,
    pub std_dev: Rate,
}

#[derive(Serialize)]
struct HistoryRow {
    date: String,
    rate: Rate,
}

impl HistoricalSeries {
    /// Build a series from arbitrary observations.
    ///
    /// Non-finite rates are dropped, rows are sorted by date and the last row wins
    /// when a date repeats.
    pub fn from_observations(mut observations: Vec<Observation>) -> Self {
        observations.retain(|o| o.rate.is_finite());
        observations.sort_by_key(|o| o.date);

        let mut deduped: Vec<Observation> = Vec::with_capacity(observations.len());
        for obs in observations {
            match deduped.last_mut() {
                Some(last) if last.date == obs.date => *last = obs,
                _ => deduped.push(obs),
            }
        }

        Self {
            observations: deduped,
        }
    }

    /// Build a series from raw provider rows, dropping rows without a close
    pub fn from_closes(closes: Vec<DailyClose>) -> Self {
        let total = closes.len();
        let observations: Vec<Observation> = closes
            .into_iter()
            .filter_map(|c| c.close.map(|rate| Observation::new(c.date, rate)))
            .filter(|o| o.rate.is_finite())
            .collect();

        let dropped = total - observations.len();
        if dropped > 0 {
            log::warn!("Dropped {} rows with missing close price", dropped);
        }

        Self::from_observations(observations)
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Most recent observation, the source of the "current rate"
    pub fn latest(&self) -> Option<&Observation> {
        self.observations.last()
    }

    pub fn first(&self) -> Option<&Observation> {
        self.observations.first()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.observations.iter().map(|o| o.date).collect()
    }

    pub fn rates(&self) -> Vec<Rate> {
        self.observations.iter().map(|o| o.rate).collect()
    }

    /// The first `n` observations
    pub fn head(&self, n: usize) -> &[Observation] {
        &self.observations[..n.min(self.len())]
    }

    /// The last `n` observations
    pub fn tail(&self, n: usize) -> &[Observation] {
        &self.observations[self.len().saturating_sub(n)..]
    }

    /// Summary statistics, `None` for an empty series
    pub fn summary(&self) -> Option<SeriesSummary> {
        let first = self.first()?;
        let last = self.latest()?;
        let rates = self.rates();

        Some(SeriesSummary {
            count: self.len(),
            start_date: first.date,
            end_date: last.date,
            min_rate: Statistics::min(rates.iter()),
            max_rate: Statistics::max(rates.iter()),
            mean_rate: Statistics::mean(rates.iter()),
            std_dev: if rates.len() > 1 {
                Statistics::std_dev(rates.iter())
            } else {
                0.0
            },
        })
    }

    /// Load a `date,rate` CSV table
    pub fn read_csv(path: &Path) -> Result<Self> {
        ensure_exists(path)?;
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .map_err(|e| ForecastError::DataError(format!("Failed to open CSV: {}", e)))?;

        let headers = rdr
            .headers()
            .map_err(|e| ForecastError::DataError(format!("Failed to read headers: {}", e)))?
            .clone();
        let date_idx = find_column(&headers, "date")?;
        let rate_idx = find_column(&headers, "rate")?;

        let mut observations = Vec::new();
        for result in rdr.records() {
            let record = result
                .map_err(|e| ForecastError::DataError(format!("Failed to read record: {}", e)))?;

            let date_str = record
                .get(date_idx)
                .ok_or_else(|| ForecastError::DataError("Missing date".to_string()))?;
            let date = parse_date(date_str)?;
            let rate = parse_f64(record.get(rate_idx), "rate")?;

            observations.push(Observation::new(date, rate));
        }

        let series = Self::from_observations(observations);
        log::debug!("Loaded {} observations from {}", series.len(), path.display());
        Ok(series)
    }

    /// Serialize to CSV bytes. Floats are written in shortest round-trip form.
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>> {
        let mut wtr = WriterBuilder::new().from_writer(Vec::new());
        for obs in &self.observations {
            wtr.serialize(HistoryRow {
                date: obs.date.format(DATE_FORMAT).to_string(),
                rate: obs.rate,
            })?;
        }
        if self.observations.is_empty() {
            wtr.write_record(["date", "rate"])?;
        }
        wtr.into_inner()
            .map_err(|e| ForecastError::DataError(format!("Failed to flush CSV: {}", e)))
    }

    /// Replace the table at `path` with this series
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let bytes = self.to_csv_bytes()?;
        write_atomically(path, &bytes)?;
        log::debug!("Wrote {} observations to {}", self.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_from_observations_sorts_and_dedupes() {
        let series = HistoricalSeries::from_observations(vec![
            Observation::new(date(2024, 1, 3), 1450.0),
            Observation::new(date(2024, 1, 1), 1400.0),
            Observation::new(date(2024, 1, 2), 1420.0),
            Observation::new(date(2024, 1, 3), 1455.0),
            Observation::new(date(2024, 1, 4), f64::NAN),
        ]);

        assert_eq!(series.len(), 3);
        assert_eq!(
            series.dates(),
            vec![date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 3)]
        );
        assert_eq!(series.latest().unwrap().rate, 1455.0);
    }

    #[test]
    fn test_from_closes_drops_missing() {
        let series = HistoricalSeries::from_closes(vec![
            DailyClose::new(date(2024, 1, 1), Some(1400.0)),
            DailyClose::new(date(2024, 1, 2), None),
            DailyClose::new(date(2024, 1, 3), Some(1410.0)),
        ]);

        assert_eq!(series.len(), 2);
        assert_eq!(series.rates(), vec![1400.0, 1410.0]);
    }

    #[test]
    fn test_summary() {
        let series = HistoricalSeries::from_observations(vec![
            Observation::new(date(2024, 1, 1), 1400.0),
            Observation::new(date(2024, 1, 2), 1500.0),
            Observation::new(date(2024, 1, 3), 1600.0),
        ]);

        let summary = series.summary().unwrap();
        assert_eq!(summary.count, 3);
        assert_eq!(summary.start_date, date(2024, 1, 1));
        assert_eq!(summary.end_date, date(2024, 1, 3));
        assert_eq!(summary.min_rate, 1400.0);
        assert_eq!(summary.max_rate, 1600.0);
        assert!((summary.mean_rate - 1500.0).abs() < 1e-9);
        assert!((summary.std_dev - 100.0).abs() < 1e-9);

        assert!(HistoricalSeries::default().summary().is_none());
    }

    #[test]
    fn test_head_and_tail() {
        let series = HistoricalSeries::from_observations(
            (1..=10)
                .map(|d| Observation::new(date(2024, 1, d), 1400.0 + d as f64))
                .collect(),
        );

        assert_eq!(series.head(3).len(), 3);
        assert_eq!(series.head(3)[0].date, date(2024, 1, 1));
        assert_eq!(series.tail(2)[1].date, date(2024, 1, 10));
        assert_eq!(series.tail(50).len(), 10);
    }

    #[test]
    fn test_csv_round_trip_is_exact() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("exchange_rates.csv");
        let series = HistoricalSeries::from_observations(vec![
            Observation::new(date(2024, 1, 1), 1398.123456789012),
            Observation::new(date(2024, 1, 2), 0.1 + 0.2),
            Observation::new(date(2024, 1, 3), 1500.0),
        ]);

        series.write_csv(&path).unwrap();
        let loaded = HistoricalSeries::read_csv(&path).unwrap();

        assert_eq!(loaded, series);
    }

    #[test]
    fn test_read_csv_with_datetime_dates() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "date,rate\n\
             2024-01-02 00:00:00+00:00,1410.5\n\
             2024-01-01 00:00:00+00:00,1400.25"
        )
        .unwrap();
        file.flush().unwrap();

        let series = HistoricalSeries::read_csv(file.path()).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.first().unwrap().date, date(2024, 1, 1));
    }

    #[test]
    fn test_read_csv_missing_column() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "date,close\n2024-01-01,1400.0").unwrap();
        file.flush().unwrap();

        let result = HistoricalSeries::read_csv(file.path());
        assert!(matches!(result, Err(ForecastError::DataError(_))));
    }
}
