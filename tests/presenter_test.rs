//! Presenter tests over hand-written artifact files

use approx::assert_relative_eq;
use chrono::NaiveDate;
use fx_forecast::config::ArtifactPaths;
use fx_forecast::data::{ForecastTable, HistoricalSeries};
use fx_forecast::error::ForecastError;
use fx_forecast::forecast::Forecaster;
use fx_forecast::presenter::{ArtifactCache, Dashboard, DerivedMetrics, Direction, Presenter};
use fx_forecast::types::{ForecastPoint, Observation};
use std::fs;
use tempfile::tempdir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// History ending Jan 01, 2025 at 1500, forecast rising linearly to 1575 on day 30
fn example_tables(future_rows: usize) -> (HistoricalSeries, ForecastTable) {
    let latest = date(2025, 1, 1);
    let history = HistoricalSeries::from_observations(
        (0..60)
            .map(|i| Observation::new(latest - chrono::Duration::days(59 - i), 1441.0 + i as f64))
            .collect(),
    );

    let mut points: Vec<ForecastPoint> = history
        .observations()
        .iter()
        .map(|o| ForecastPoint::new(o.date, o.rate, o.rate - 5.0, o.rate + 5.0))
        .collect();
    points.extend((1..=future_rows).map(|k| {
        let yhat = 1500.0 + 2.5 * k as f64;
        ForecastPoint::new(
            latest + chrono::Duration::days(k as i64),
            yhat,
            yhat - k as f64,
            yhat + k as f64,
        )
    }));
    (history, ForecastTable::from_points(points))
}

#[test]
fn test_example_metrics() {
    let (history, forecast) = example_tables(30);
    let metrics = DerivedMetrics::derive(&history, &forecast).unwrap();

    assert_relative_eq!(metrics.latest_rate, 1500.0);
    assert_relative_eq!(metrics.forecast_30d.yhat, 1575.0);
    assert_relative_eq!(metrics.change_30d, 75.0);
    assert_relative_eq!(metrics.change_pct_30d, 5.0);
    assert_eq!(metrics.direction, Direction::Weakening);
    assert_eq!(format!("{:.2}", metrics.change_30d), "75.00");
    assert_eq!(format!("{:.2}%", metrics.change_pct_30d), "5.00%");
}

#[test]
fn test_forecast_shorter_than_horizon_is_an_error() {
    let (history, forecast) = example_tables(12);
    let err = DerivedMetrics::derive(&history, &forecast).unwrap_err();

    assert!(matches!(
        err,
        ForecastError::InsufficientForecast {
            required: 30,
            available: 12,
            ..
        }
    ));
    assert!(err.to_string().contains("2025-01-01"));
}

#[test]
fn test_dashboard_from_files() {
    let dir = tempdir().unwrap();
    let paths = ArtifactPaths::in_dir(dir.path());

    // The model artifact comes from a real training run; the tables are replaced afterwards
    let (history, forecast) = example_tables(30);
    history.write_csv(&paths.historical).unwrap();
    Forecaster::new().run(&paths).unwrap();
    forecast.write_csv(&paths.forecast).unwrap();

    let mut cache = ArtifactCache::new(paths.clone());
    let artifacts = cache.get().unwrap();
    let dashboard = Dashboard::build(&artifacts, fx_forecast::currency::CurrencyPair::USD_NGN)
        .unwrap();

    let cards = dashboard.cards();
    assert_eq!(cards[0].value, "₦1500.00");
    assert_eq!(cards[0].delta, "As of Jan 01, 2025");
    assert_eq!(cards[1].value, "₦1517.50");
    assert_eq!(cards[1].delta, "+1.17%");
    assert_eq!(cards[2].value, "₦1575.00");
    assert_eq!(cards[2].delta, "+5.00%");
    assert_eq!(cards[3].value, "Weakening");
    assert_eq!(cards[3].delta, "₦75.00");

    assert_eq!(dashboard.guidance.headline, "Naira Expected to Weaken by 5.00%");
    assert!(dashboard
        .guidance
        .businesses
        .iter()
        .any(|b| b == "Budget for a 5.0% increase in dollar-denominated costs"));

    let rows = dashboard.forecast_rows();
    assert_eq!(rows.len(), 30);
    assert_eq!(rows[0].date, "Jan 02, 2025");
    assert_eq!(rows[0].predicted, "₦1502.50");
    assert_eq!(rows[0].lower, "₦1501.50");
    assert_eq!(rows[0].upper, "₦1503.50");
    assert_eq!(rows[29].date, "Jan 31, 2025");
}

#[test]
fn test_corrupt_artifact_surfaces_error() {
    let dir = tempdir().unwrap();
    let paths = ArtifactPaths::in_dir(dir.path());
    let (history, forecast) = example_tables(30);
    history.write_csv(&paths.historical).unwrap();
    forecast.write_csv(&paths.forecast).unwrap();
    fs::write(&paths.model, "{ not json").unwrap();

    let mut presenter = Presenter::new(paths);
    assert!(matches!(
        presenter.dashboard(),
        Err(ForecastError::SerdeError(_))
    ));
    assert!(!presenter.cache().is_loaded());
}

#[test]
fn test_cache_invalidate() {
    let dir = tempdir().unwrap();
    let paths = ArtifactPaths::in_dir(dir.path());
    let (history, _) = example_tables(30);
    history.write_csv(&paths.historical).unwrap();
    Forecaster::new().run(&paths).unwrap();

    let mut cache = ArtifactCache::new(paths);
    let first = cache.get().unwrap();
    let second = cache.get().unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert_eq!(cache.load_count(), 1);

    cache.invalidate();
    assert!(!cache.is_loaded());
    let third = cache.get().unwrap();
    assert!(!std::sync::Arc::ptr_eq(&first, &third));
    assert_eq!(first.history, third.history);
    assert_eq!(cache.load_count(), 2);
}
