//! Forecast table
//!
//! One row per date covering the historical range plus the forecast horizon.
//! Column names follow the usual additive-model convention (`ds`, `yhat`,
//! `yhat_lower`, `yhat_upper`); component columns are optional on read.

use super::{ensure_exists, find_column, parse_date, parse_f64, write_atomically, DATE_FORMAT};
use crate::error::{ForecastError, Result};
use crate::types::{ForecastPoint, Rate};
use chrono::NaiveDate;
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Additive components behind a point estimate
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    pub trend: Rate,
    pub weekly: Rate,
    pub yearly: Rate,
}

/// Point estimates and bounds ordered by date
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastTable {
    points: Vec<ForecastPoint>,
    components: Option<Vec<Components>>,
}

#[derive(Serialize)]
struct FullRow {
    ds: String,
    trend: Rate,
    weekly: Rate,
    yearly: Rate,
    yhat_lower: Rate,
    yhat_upper: Rate,
    yhat: Rate,
}

#[derive(Serialize)]
struct PointRow {
    ds: String,
    yhat_lower: Rate,
    yhat_upper: Rate,
    yhat: Rate,
}

impl ForecastTable {
    /// Build a table from points in any order
    pub fn from_points(mut points: Vec<ForecastPoint>) -> Self {
        points.sort_by_key(|p| p.date);
        Self {
            points,
            components: None,
        }
    }

    /// Build a table carrying the component breakdown of each point
    pub fn with_components(
        points: Vec<ForecastPoint>,
        components: Vec<Components>,
    ) -> Result<Self> {
        if points.len() != components.len() {
            return Err(ForecastError::DataError(format!(
                "Points length ({}) doesn't match components length ({})",
                points.len(),
                components.len()
            )));
        }
        if points.windows(2).any(|w| w[0].date >= w[1].date) {
            return Err(ForecastError::DataError(
                "Forecast points must be strictly ascending by date".to_string(),
            ));
        }

        Ok(Self {
            points,
            components: Some(components),
        })
    }

    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    pub fn components(&self) -> Option<&[Components]> {
        self.components.as_deref()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&ForecastPoint> {
        self.points.last()
    }

    /// Rows dated strictly after `date`
    pub fn after(&self, date: NaiveDate) -> &[ForecastPoint] {
        let start = self.points.partition_point(|p| p.date <= date);
        &self.points[start..]
    }

    /// Rows violating `yhat_lower <= yhat <= yhat_upper`
    pub fn bound_violations(&self) -> Vec<&ForecastPoint> {
        self.points.iter().filter(|p| !p.bounds_hold()).collect()
    }

    /// True when the rows after `date` are exactly the next `horizon` calendar days
    pub fn is_contiguous_after(&self, date: NaiveDate, horizon: usize) -> bool {
        let future = self.after(date);
        future.len() == horizon
            && future
                .iter()
                .zip(date.iter_days().skip(1))
                .all(|(p, expected)| p.date == expected)
    }

    /// Load a forecast CSV
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
        let ds_idx = find_column(&headers, "ds")?;
        let yhat_idx = find_column(&headers, "yhat")?;
        let lower_idx = find_column(&headers, "yhat_lower")?;
        let upper_idx = find_column(&headers, "yhat_upper")?;
        let component_idx = match (
            find_column(&headers, "trend"),
            find_column(&headers, "weekly"),
            find_column(&headers, "yearly"),
        ) {
            (Ok(t), Ok(w), Ok(y)) => Some((t, w, y)),
            _ => None,
        };

        let mut points = Vec::new();
        let mut components = Vec::new();
        for result in rdr.records() {
            let record = result
                .map_err(|e| ForecastError::DataError(format!("Failed to read record: {}", e)))?;

            let ds = record
                .get(ds_idx)
                .ok_or_else(|| ForecastError::DataError("Missing ds".to_string()))?;
            points.push(ForecastPoint::new(
                parse_date(ds)?,
                parse_f64(record.get(yhat_idx), "yhat")?,
                parse_f64(record.get(lower_idx), "yhat_lower")?,
                parse_f64(record.get(upper_idx), "yhat_upper")?,
            ));

            if let Some((t, w, y)) = component_idx {
                components.push(Components {
                    trend: parse_f64(record.get(t), "trend")?,
                    weekly: parse_f64(record.get(w), "weekly")?,
                    yearly: parse_f64(record.get(y), "yearly")?,
                });
            }
        }

        let table = match component_idx {
            Some(_) => Self::with_components(points, components)?,
            None => Self::from_points(points),
        };
        log::debug!("Loaded {} forecast rows from {}", table.len(), path.display());
        Ok(table)
    }

    /// Serialize to CSV bytes
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>> {
        let mut wtr = WriterBuilder::new().from_writer(Vec::new());

        match &self.components {
            Some(components) => {
                for (p, c) in self.points.iter().zip(components) {
                    wtr.serialize(FullRow {
                        ds: p.date.format(DATE_FORMAT).to_string(),
                        trend: c.trend,
                        weekly: c.weekly,
                        yearly: c.yearly,
                        yhat_lower: p.yhat_lower,
                        yhat_upper: p.yhat_upper,
                        yhat: p.yhat,
                    })?;
                }
            }
            None => {
                for p in &self.points {
                    wtr.serialize(PointRow {
                        ds: p.date.format(DATE_FORMAT).to_string(),
                        yhat_lower: p.yhat_lower,
                        yhat_upper: p.yhat_upper,
                        yhat: p.yhat,
                    })?;
                }
            }
        }
        if self.points.is_empty() {
            wtr.write_record(["ds", "yhat_lower", "yhat_upper", "yhat"])?;
        }

        wtr.into_inner()
            .map_err(|e| ForecastError::DataError(format!("Failed to flush CSV: {}", e)))
    }

    /// Replace the table at `path`
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let bytes = self.to_csv_bytes()?;
        write_atomically(path, &bytes)?;
        log::debug!("Wrote {} forecast rows to {}", self.len(), path.display());
        Ok(())
    }
}
