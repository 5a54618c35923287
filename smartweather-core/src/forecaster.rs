//! Cache-first lookup pipeline: fresh cache entry, else fetch and store.

use anyhow::{Result, anyhow};

use crate::{
    aggregate::{DailySummary, aggregate_daily},
    cache::{CacheStore, FreshnessCache},
    model::WeatherSnapshot,
    provider::{WeatherProvider, missing_key_message},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Cache,
    Fetched,
}

#[derive(Debug, Clone)]
pub struct Lookup {
    pub snapshot: WeatherSnapshot,
    pub daily: Vec<DailySummary>,
    pub source: Source,
}

impl Lookup {
    fn new(snapshot: WeatherSnapshot, source: Source) -> Self {
        let daily = aggregate_daily(&snapshot.forecast);
        Self { snapshot, daily, source }
    }
}

/// Owns the provider and the cache for one interactive session.
///
/// Without a provider only fresh cached data is served.
pub struct Forecaster<S> {
    provider: Option<Box<dyn WeatherProvider>>,
    cache: FreshnessCache<S>,
}

impl<S: CacheStore> Forecaster<S> {
    pub fn new(provider: Box<dyn WeatherProvider>, cache: FreshnessCache<S>) -> Self {
        Self {
            provider: Some(provider),
            cache,
        }
    }

    pub fn offline(cache: FreshnessCache<S>) -> Self {
        Self {
            provider: None,
            cache,
        }
    }

    pub fn is_offline(&self) -> bool {
        self.provider.is_none()
    }

    pub async fn lookup(&mut self, city: &str) -> Result<Lookup> {
        if let Some(snapshot) = self.cache.get(city) {
            return Ok(Lookup::new(snapshot, Source::Cache));
        }

        let provider = self.provider.as_ref().ok_or_else(|| anyhow!(missing_key_message()))?;
        let snapshot = provider.fetch(city).await?;
        // A failed write only costs a refetch next time; it is logged by the cache.
        let _ = self.cache.put(city, &snapshot);

        Ok(Lookup::new(snapshot, Source::Fetched))
    }

    /// Fresh cached snapshot only, never fetches.
    pub fn cached(&self, city: &str) -> Option<WeatherSnapshot> {
        self.cache.get(city)
    }

    /// Store a snapshot obtained elsewhere (e.g. the built-in sample).
    pub fn remember(&mut self, key: &str, snapshot: &WeatherSnapshot) {
        let _ = self.cache.put(key, snapshot);
    }
}
