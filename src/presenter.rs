//! Presenter stage: load artifacts, derive metrics, render the dashboard
//!
//! A [`Presenter`] is one viewing session. It owns the [`ArtifactCache`], so
//! repeated renders read the artifacts once until [`Presenter::refresh`].

pub mod cache;
pub mod dashboard;
pub mod guidance;
pub mod metrics;

pub use cache::{ArtifactCache, Artifacts};
pub use dashboard::{Dashboard, ForecastRow, MetricCard, Tone};
pub use guidance::{guidance, Guidance};
pub use metrics::{DerivedMetrics, Direction};

use crate::config::ArtifactPaths;
use crate::currency::CurrencyPair;
use crate::error::Result;

/// A dashboard session over one set of artifact paths
#[derive(Debug)]
pub struct Presenter {
    cache: ArtifactCache,
    pair: CurrencyPair,
}

impl Presenter {
    pub fn new(paths: ArtifactPaths) -> Self {
        Self::with_pair(paths, CurrencyPair::USD_NGN)
    }

    pub fn with_pair(paths: ArtifactPaths, pair: CurrencyPair) -> Self {
        Self {
            cache: ArtifactCache::new(paths),
            pair,
        }
    }

    pub fn cache(&self) -> &ArtifactCache {
        &self.cache
    }

    /// Build the dashboard from cached artifacts
    pub fn dashboard(&mut self) -> Result<Dashboard> {
        let artifacts = self.cache.get()?;
        Dashboard::build(&artifacts, self.pair)
    }

    /// Re-read the artifacts, then build
    pub fn refresh(&mut self) -> Result<Dashboard> {
        let artifacts = self.cache.reload()?;
        Dashboard::build(&artifacts, self.pair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::HistoricalSeries;
    use crate::error::ForecastError;
    use crate::forecast::Forecaster;
    use crate::types::Observation;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn write_history(paths: &ArtifactPaths, slope: f64) {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        HistoricalSeries::from_observations(
            start
                .iter_days()
                .take(150)
                .enumerate()
                .map(|(i, d)| Observation::new(d, 1500.0 + slope * i as f64))
                .collect(),
        )
        .write_csv(&paths.historical)
        .unwrap();
    }

    #[test]
    fn test_session_cache_is_reused_until_refresh() {
        let dir = tempdir().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path());
        write_history(&paths, 1.0);
        Forecaster::new().run(&paths).unwrap();

        let mut presenter = Presenter::new(paths.clone());
        assert!(!presenter.cache().is_loaded());

        let first = presenter.dashboard().unwrap();
        assert_eq!(first.metrics.direction, Direction::Weakening);

        // Artifacts change on disk; the session keeps its cached copy
        write_history(&paths, -1.0);
        Forecaster::new().run(&paths).unwrap();
        let cached = presenter.dashboard().unwrap();
        assert_eq!(cached.metrics.direction, Direction::Weakening);
        assert_eq!(presenter.cache().load_count(), 1);

        let refreshed = presenter.refresh().unwrap();
        assert_eq!(refreshed.metrics.direction, Direction::Strengthening);
        assert_eq!(presenter.cache().load_count(), 2);
    }

    #[test]
    fn test_missing_artifacts() {
        let dir = tempdir().unwrap();
        let mut presenter = Presenter::new(ArtifactPaths::in_dir(dir.path()));

        assert!(matches!(
            presenter.dashboard(),
            Err(ForecastError::ArtifactNotFound(_))
        ));
        assert!(!presenter.cache().is_loaded());
    }
}
