//! # fx-forecast
//!
//! A USD/NGN exchange-rate forecasting pipeline.
//!
//! Three stages communicate only through files:
//!
//! 1. [`fetcher`] downloads two years of daily closes and writes the historical table.
//! 2. [`forecast`] fits an additive trend + seasonality model and writes the
//!    model and a forecast table reaching 30 days past the last observation.
//! 3. [`presenter`] loads the artifacts and builds the dashboard.
//!
//! ## Example
//!
//! ```rust,no_run
//! use fx_forecast::prelude::*;
//!
//! # fn main() -> fx_forecast::error::Result<()> {
//! let paths = Config::default().artifact_paths();
//! let report = Forecaster::new().run(&paths)?;
//! println!("30-day outlook: {} ({:+.2}%)", report.direction, report.change_pct);
//!
//! let dashboard = Presenter::new(paths.clone()).dashboard()?;
//! dashboard.save_html(&paths.dashboard)?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod currency;
pub mod data;
pub mod error;
pub mod fetcher;
pub mod forecast;
pub mod presenter;
pub mod types;

pub mod prelude {
    //! Commonly used types and traits
    pub use crate::config::{ArtifactPaths, Config};
    pub use crate::currency::{Currency, CurrencyPair};
    pub use crate::data::sources::{DailyClose, RateSource};
    pub use crate::data::{ForecastTable, HistoricalSeries};
    pub use crate::error::{ForecastError, Result};
    pub use crate::fetcher::RateFetcher;
    pub use crate::forecast::{
        AdditiveModel, FittedAdditiveModel, FittedForecast, ForecastModel, Forecaster,
    };
    pub use crate::presenter::{Dashboard, DerivedMetrics, Direction, Presenter};
    pub use crate::types::*;
}
