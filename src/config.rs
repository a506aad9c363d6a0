//! Configuration file and artifact locations
//!
//! Looked up at `--config PATH`, else `~/.fx-forecast/config.toml`. Every field
//! has a default, so a missing or partial file is fine.
//!
//! ```toml
//! data_dir = "/var/lib/fx-forecast"
//! dashboard_file = "index.html"
//! request_timeout_secs = 10
//! ```

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_PROVIDER_URL: &str = "https://query1.finance.yahoo.com";
pub const HISTORICAL_FILE: &str = "exchange_rates.csv";
pub const FORECAST_FILE: &str = "forecast.csv";
pub const MODEL_FILE: &str = "model.json";
pub const DASHBOARD_FILE: &str = "dashboard.html";

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_historical_file")]
    pub historical_file: String,
    #[serde(default = "default_forecast_file")]
    pub forecast_file: String,
    #[serde(default = "default_model_file")]
    pub model_file: String,
    #[serde(default = "default_dashboard_file")]
    pub dashboard_file: String,
    #[serde(default = "default_provider_url")]
    pub provider_url: String,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".fx-forecast")
}

fn default_data_dir() -> PathBuf {
    app_dir().join("data")
}

fn default_historical_file() -> String {
    HISTORICAL_FILE.to_string()
}

fn default_forecast_file() -> String {
    FORECAST_FILE.to_string()
}

fn default_model_file() -> String {
    MODEL_FILE.to_string()
}

fn default_dashboard_file() -> String {
    DASHBOARD_FILE.to_string()
}

fn default_provider_url() -> String {
    DEFAULT_PROVIDER_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            historical_file: default_historical_file(),
            forecast_file: default_forecast_file(),
            model_file: default_model_file(),
            dashboard_file: default_dashboard_file(),
            provider_url: default_provider_url(),
            request_timeout_secs: default_timeout(),
        }
    }
}

impl Config {
    /// `~/.fx-forecast/config.toml`
    pub fn default_path() -> PathBuf {
        app_dir().join("config.toml")
    }

    /// Parse a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| ForecastError::ConfigError(e.to_string()))
    }

    /// Read and parse a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            ForecastError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Load from `path` or the default location, falling back to defaults with a warning
    pub fn load(path: Option<&Path>) -> Self {
        let explicit = path.is_some();
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::default_path);

        if !path.exists() {
            if explicit {
                log::warn!("Config file {} not found, using defaults", path.display());
            }
            return Config::default();
        }

        match Self::from_file(&path) {
            Ok(config) => {
                log::debug!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("{}; using defaults", e);
                Config::default()
            }
        }
    }

    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.data_dir)
    }

    /// Artifact locations under `data_dir`
    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths {
            historical: self.data_dir.join(&self.historical_file),
            forecast: self.data_dir.join(&self.forecast_file),
            model: self.data_dir.join(&self.model_file),
            dashboard: self.data_dir.join(&self.dashboard_file),
        }
    }
}

/// Locations of the files the stages exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub historical: PathBuf,
    pub forecast: PathBuf,
    pub model: PathBuf,
    pub dashboard: PathBuf,
}

impl ArtifactPaths {
    /// Default file names inside `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            historical: dir.join(HISTORICAL_FILE),
            forecast: dir.join(FORECAST_FILE),
            model: dir.join(MODEL_FILE),
            dashboard: dir.join(DASHBOARD_FILE),
        }
    }
}
