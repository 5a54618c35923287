//! Session state shared by the one-shot subcommands and the interactive prompt.
//!
//! Every action returns the text to print; nothing here ends the session.

use std::{fs, path::PathBuf};

use anyhow::Context;
use smartweather_core::{
    AlertBook, CacheStore, Config, Forecaster, FreshnessCache, MemoryCacheStore, Source,
    SqliteCacheStore, WeatherSnapshot, aggregate_daily, export_snapshot, provider_from_config,
};

use crate::render;

/// Cache key the built-in sample is stored under.
const SAMPLE_KEY: &str = "sample";

pub struct App {
    forecaster: Forecaster<Box<dyn CacheStore>>,
    alerts: AlertBook,
    export_dir: PathBuf,
}

impl App {
    /// Wire up cache, provider and alert book from `config`.
    ///
    /// A cache database that cannot be opened falls back to an in-memory
    /// cache, and a missing API key leaves the session offline.
    pub fn open(config: &Config) -> Self {
        let store: Box<dyn CacheStore> = match open_sqlite_store(config) {
            Ok(store) => Box::new(store),
            Err(err) => {
                tracing::warn!(error = %format!("{err:#}"), "using in-memory cache");
                Box::new(MemoryCacheStore::default())
            }
        };
        let cache = FreshnessCache::new(store);

        let forecaster = match provider_from_config(config) {
            Ok(provider) => Forecaster::new(provider, cache),
            Err(err) => {
                tracing::debug!(error = %err, "no provider, cached data only");
                Forecaster::offline(cache)
            }
        };

        let alerts = match config.alerts_path() {
            Ok(path) => AlertBook::open(path),
            Err(err) => {
                tracing::warn!(error = %err, "alerts will not be saved");
                AlertBook::in_memory()
            }
        };

        Self::with_parts(forecaster, alerts, config.export_dir())
    }

    pub fn with_parts(
        forecaster: Forecaster<Box<dyn CacheStore>>,
        alerts: AlertBook,
        export_dir: PathBuf,
    ) -> Self {
        Self {
            forecaster,
            alerts,
            export_dir,
        }
    }

    /// Summary and alerts for `city`, from cache when fresh.
    pub async fn show(&mut self, city: &str) -> anyhow::Result<String> {
        let lookup = self.forecaster.lookup(city).await?;

        let mut out = String::new();
        if lookup.source == Source::Cache {
            out.push_str("Using cached data (fresh).\n");
        }
        out.push_str(&render::summary(&lookup.snapshot, &lookup.daily));
        out.push_str(&self.alert_lines(&lookup.snapshot));
        Ok(out)
    }

    pub fn sample(&mut self) -> String {
        let snapshot = WeatherSnapshot::sample();
        self.forecaster.remember(SAMPLE_KEY, &snapshot);

        let daily = aggregate_daily(&snapshot.forecast);
        let mut out = render::summary(&snapshot, &daily);
        out.push_str(&self.alert_lines(&snapshot));
        out
    }

    /// Export only works for cities with fresh cached data.
    pub fn export(&self, city: &str) -> String {
        match self.forecaster.cached(city) {
            Some(snapshot) => export_snapshot(city, &snapshot, &self.export_dir).to_string(),
            None => "City not found in cache. Please fetch it first by typing the city name."
                .to_string(),
        }
    }

    pub fn add_alert(&mut self, rule: &str) -> String {
        if self.alerts.add_rule(rule) {
            format!("Alert added: {}", rule.trim().to_lowercase())
        } else {
            "Alert already exists or invalid.".to_string()
        }
    }

    pub fn list_alerts(&self) -> String {
        render::alert_list(self.alerts.rules())
    }

    pub fn remove_alert(&mut self, index: usize) -> String {
        if self.alerts.remove_rule(index) {
            format!("Removed alert #{index}")
        } else {
            "Invalid alert index.".to_string()
        }
    }

    fn alert_lines(&self, snapshot: &WeatherSnapshot) -> String {
        self.alerts
            .evaluate(snapshot)
            .iter()
            .map(|msg| render::alert_line(msg) + "\n")
            .collect()
    }
}

fn open_sqlite_store(config: &Config) -> anyhow::Result<SqliteCacheStore> {
    let path = config.cache_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create data directory: {}", parent.display()))?;
    }
    SqliteCacheStore::open(&path)
        .with_context(|| format!("Failed to open cache database: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartweather_core::ForecastSample;

    #[derive(Debug)]
    struct FixedProvider;

    #[async_trait::async_trait]
    impl smartweather_core::WeatherProvider for FixedProvider {
        async fn fetch(&self, city: &str) -> anyhow::Result<WeatherSnapshot> {
            Ok(WeatherSnapshot {
                city: city.to_string(),
                temperature_c: Some(12.0),
                condition: "light rain".into(),
                forecast: vec![ForecastSample::new(1_700_000_000, 12.0, "light rain")],
                ..WeatherSnapshot::default()
            })
        }
    }

    fn app(dir: &std::path::Path) -> App {
        let store: Box<dyn CacheStore> = Box::new(MemoryCacheStore::default());
        App::with_parts(
            Forecaster::new(Box::new(FixedProvider), FreshnessCache::new(store)),
            AlertBook::in_memory(),
            dir.to_path_buf(),
        )
    }

    #[tokio::test]
    async fn show_reports_cache_use_and_alerts() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut app = app(dir.path());
        app.add_alert("rain");
        app.add_alert("temp<20");

        let first = app.show("Bergen").await.expect("show");
        assert!(!first.contains("Using cached data"));
        assert!(first.contains("Rain Alert: Rain expected in Bergen"));
        assert!(first.contains("Temp Alert: Bergen current 12.0°C < 20.0°C"));

        let second = app.show("bergen").await.expect("show");
        assert!(second.starts_with("Using cached data (fresh)."));
    }

    #[tokio::test]
    async fn export_requires_cached_city() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut app = app(dir.path());

        assert!(app.export("Bergen").starts_with("City not found in cache"));

        app.show("Bergen").await.expect("show");
        let msg = app.export("Bergen");
        assert!(msg.starts_with("CSV exported:"));
        assert!(dir.path().join("bergen_forecast.csv").exists());
    }

    #[test]
    fn sample_is_cached_under_sample_key() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut app = app(dir.path());

        let out = app.sample();
        assert!(out.contains("SampleCity"));
        assert!(app.export("sample").starts_with("CSV exported:"));
        assert!(dir.path().join("sample_forecast.csv").exists());
    }

    #[test]
    fn alert_commands_report_outcome() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut app = app(dir.path());

        assert_eq!(app.add_alert(" Temp>30 "), "Alert added: temp>30");
        assert_eq!(app.add_alert("temp>30"), "Alert already exists or invalid.");
        assert!(app.list_alerts().contains("1) temp>30"));
        assert_eq!(app.remove_alert(2), "Invalid alert index.");
        assert_eq!(app.remove_alert(1), "Removed alert #1");
        assert_eq!(app.list_alerts(), "No alerts set.");
    }
}
