//! Core library for the `smartweather` CLI.
//!
//! This crate defines:
//! - The weather snapshot model and lenient OpenWeather parsing
//! - Daily min/max aggregation of 3-hour forecast samples
//! - A per-city snapshot cache with a fixed freshness window
//! - Alert rules and their evaluation
//! - CSV export of the daily forecast
//! - Configuration & credentials handling
//!
//! It is used by `smartweather-cli`, but can also be reused by other binaries or services.

pub mod aggregate;
pub mod alerts;
pub mod cache;
pub mod config;
pub mod export;
pub mod forecaster;
pub mod model;
pub mod provider;

pub use aggregate::{DailySummary, FORECAST_DAYS, aggregate_daily};
pub use alerts::{AlertBook, AlertRule};
pub use cache::{CacheError, CacheStore, FreshnessCache, MemoryCacheStore, SqliteCacheStore};
pub use config::Config;
pub use export::{ExportOutcome, export_snapshot};
pub use forecaster::{Forecaster, Lookup, Source};
pub use model::{ForecastSample, WeatherSnapshot};
pub use provider::{WeatherProvider, provider_from_config};
