//! Session-scoped artifact cache
//!
//! The three artifacts are read once and shared until the session invalidates
//! the cache. File modification times are not consulted.

use crate::config::ArtifactPaths;
use crate::data::{ForecastTable, HistoricalSeries};
use crate::error::Result;
use crate::forecast::FittedAdditiveModel;
use std::sync::Arc;

/// Everything the presenter reads from disk
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub history: HistoricalSeries,
    pub forecast: ForecastTable,
    pub model: FittedAdditiveModel,
}

impl Artifacts {
    pub fn load(paths: &ArtifactPaths) -> Result<Self> {
        let history = HistoricalSeries::read_csv(&paths.historical)?;
        let forecast = ForecastTable::read_csv(&paths.forecast)?;
        let model = FittedAdditiveModel::load_json(&paths.model)?;
        log::info!(
            "Loaded artifacts: {} observations, {} forecast rows",
            history.len(),
            forecast.len()
        );

        Ok(Self {
            history,
            forecast,
            model,
        })
    }
}

/// Memoized, manually invalidated load of [`Artifacts`]
#[derive(Debug)]
pub struct ArtifactCache {
    paths: ArtifactPaths,
    cached: Option<Arc<Artifacts>>,
    loads: usize,
}

impl ArtifactCache {
    pub fn new(paths: ArtifactPaths) -> Self {
        Self {
            paths,
            cached: None,
            loads: 0,
        }
    }

    pub fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }

    pub fn is_loaded(&self) -> bool {
        self.cached.is_some()
    }

    /// Number of times the artifacts were read from disk
    pub fn load_count(&self) -> usize {
        self.loads
    }

    /// Cached artifacts, loading them on first use. A failed load caches nothing.
    pub fn get(&mut self) -> Result<Arc<Artifacts>> {
        if let Some(artifacts) = &self.cached {
            return Ok(Arc::clone(artifacts));
        }

        let artifacts = Arc::new(Artifacts::load(&self.paths)?);
        self.loads += 1;
        self.cached = Some(Arc::clone(&artifacts));
        Ok(artifacts)
    }

    /// Drop the cached artifacts; the next `get` reads from disk
    pub fn invalidate(&mut self) {
        if self.cached.take().is_some() {
            log::debug!("Artifact cache invalidated");
        }
    }

    /// Invalidate and load again
    pub fn reload(&mut self) -> Result<Arc<Artifacts>> {
        self.invalidate();
        self.get()
    }
}
