//! Error construction and message formatting

use chrono::NaiveDate;
use fx_forecast::error::{ForecastError, Result};
use std::path::PathBuf;

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn test_fetch_failed() {
        let err = ForecastError::FetchFailed("HTTP 404 Not Found".to_string());
        assert_eq!(err.to_string(), "Fetch failed: HTTP 404 Not Found");
    }

    #[test]
    fn test_insufficient_forecast() {
        let err = ForecastError::InsufficientForecast {
            required: 30,
            available: 7,
            latest_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        };

        let msg = err.to_string();
        assert!(msg.contains("30"));
        assert!(msg.contains("7"));
        assert!(msg.contains("2025-01-01"));
    }

    #[test]
    fn test_insufficient_data() {
        let err = ForecastError::InsufficientData {
            required: 2,
            available: 1,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient data: need at least 2 observations, found 1"
        );
    }

    #[test]
    fn test_artifact_not_found() {
        let err = ForecastError::ArtifactNotFound(PathBuf::from("/data/model.json"));
        assert_eq!(err.to_string(), "Artifact not found: /data/model.json");
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ForecastError = io.into();
        assert!(matches!(err, ForecastError::IoError(_)));
        assert!(err.to_string().starts_with("IO error:"));
    }

    #[test]
    fn test_from_serde_error() {
        fn parse() -> Result<serde_json::Value> {
            Ok(serde_json::from_str("{")?)
        }
        let err = parse().unwrap_err();
        assert!(matches!(err, ForecastError::SerdeError(_)));
    }

    #[test]
    fn test_errors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync + 'static>() {}
        assert_send_sync::<ForecastError>();
    }
}
