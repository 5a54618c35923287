//! Per-city snapshot cache with a fixed time-to-live.
//!
//! Entries are keyed by the lowercased city name and are never deleted; an
//! entry older than [`CACHE_TTL_SECS`] is simply treated as absent. Storage
//! failures never abort the caller: reads degrade to a miss and writes
//! report an error the caller is free to ignore.

use std::{collections::HashMap, path::Path};

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

use crate::model::WeatherSnapshot;

/// 30 minutes.
pub const CACHE_TTL_SECS: i64 = 30 * 60;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("cache payload error: {0}")]
    Payload(#[from] serde_json::Error),
}

/// One stored row.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub city: String,
    pub json: String,
    /// Unix epoch seconds.
    pub fetched_at: i64,
}

/// Durable backing for [`FreshnessCache`].
pub trait CacheStore {
    fn load(&self, key: &str) -> Result<Option<CacheEntry>, CacheError>;

    /// Insert or replace the row for `entry.city`.
    fn upsert(&mut self, entry: &CacheEntry) -> Result<(), CacheError>;
}

impl<T: CacheStore + ?Sized> CacheStore for Box<T> {
    fn load(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        (**self).load(key)
    }

    fn upsert(&mut self, entry: &CacheEntry) -> Result<(), CacheError> {
        (**self).upsert(entry)
    }
}

/// SQLite-backed store (one `cache` table, city is the primary key).
pub struct SqliteCacheStore {
    conn: Connection,
}

impl SqliteCacheStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CacheError> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self, CacheError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, CacheError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS cache (
                city TEXT PRIMARY KEY,
                json TEXT NOT NULL,
                fetched_at INTEGER NOT NULL
            );",
        )?;
        Ok(Self { conn })
    }
}

impl CacheStore for SqliteCacheStore {
    fn load(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        let row = self
            .conn
            .query_row(
                "SELECT city, json, fetched_at FROM cache WHERE city = ?1",
                params![key],
                |row| {
                    Ok(CacheEntry {
                        city: row.get(0)?,
                        json: row.get(1)?,
                        fetched_at: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    fn upsert(&mut self, entry: &CacheEntry) -> Result<(), CacheError> {
        self.conn.execute(
            "INSERT INTO cache (city, json, fetched_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(city) DO UPDATE SET
                 json = excluded.json,
                 fetched_at = excluded.fetched_at",
            params![entry.city, entry.json, entry.fetched_at],
        )?;
        Ok(())
    }
}

/// Non-persistent store, used when no data directory is available and in tests.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    rows: HashMap<String, CacheEntry>,
}

impl CacheStore for MemoryCacheStore {
    fn load(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        Ok(self.rows.get(key).cloned())
    }

    fn upsert(&mut self, entry: &CacheEntry) -> Result<(), CacheError> {
        self.rows.insert(entry.city.clone(), entry.clone());
        Ok(())
    }
}

/// Lowercased lookup key for a city name.
pub fn cache_key(city: &str) -> String {
    city.trim().to_lowercase()
}

pub struct FreshnessCache<S> {
    store: S,
    ttl_secs: i64,
}

impl<S: CacheStore> FreshnessCache<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            ttl_secs: CACHE_TTL_SECS,
        }
    }

    pub fn get(&self, city: &str) -> Option<WeatherSnapshot> {
        self.get_at(city, Utc::now().timestamp())
    }

    pub fn put(&mut self, city: &str, snapshot: &WeatherSnapshot) -> Result<(), CacheError> {
        self.put_at(city, snapshot, Utc::now().timestamp())
    }

    /// Fresh snapshot for `city` as of `now`; an entry exactly `ttl` old is still fresh.
    pub fn get_at(&self, city: &str, now: i64) -> Option<WeatherSnapshot> {
        let key = cache_key(city);

        let entry = match self.store.load(&key) {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                tracing::debug!(city = %key, "cache miss");
                return None;
            }
            Err(err) => {
                tracing::warn!(city = %key, error = %err, "cache read failed, treating as miss");
                return None;
            }
        };

        let age = now - entry.fetched_at;
        if age > self.ttl_secs {
            tracing::debug!(city = %key, age, "cache entry is stale");
            return None;
        }

        match serde_json::from_str(&entry.json) {
            Ok(snapshot) => {
                tracing::debug!(city = %key, age, "cache hit");
                Some(snapshot)
            }
            Err(err) => {
                tracing::warn!(city = %key, error = %err, "cached payload unreadable, treating as miss");
                None
            }
        }
    }

    pub fn put_at(
        &mut self,
        city: &str,
        snapshot: &WeatherSnapshot,
        now: i64,
    ) -> Result<(), CacheError> {
        let result = serde_json::to_string(snapshot)
            .map_err(CacheError::from)
            .and_then(|json| {
                self.store.upsert(&CacheEntry {
                    city: cache_key(city),
                    json,
                    fetched_at: now,
                })
            });

        if let Err(err) = &result {
            tracing::warn!(city = %cache_key(city), error = %err, "cache write failed");
        }
        result
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ForecastSample;

    const NOW: i64 = 1_700_000_000;

    fn snapshot(city: &str, temp: f64) -> WeatherSnapshot {
        WeatherSnapshot {
            city: city.to_string(),
            temperature_c: Some(temp),
            forecast: vec![ForecastSample::new(NOW, temp, "light rain")],
            ..WeatherSnapshot::default()
        }
    }

    /// Store whose every operation fails.
    struct BrokenStore;

    impl CacheStore for BrokenStore {
        fn load(&self, _key: &str) -> Result<Option<CacheEntry>, CacheError> {
            Err(CacheError::Storage(rusqlite::Error::InvalidQuery))
        }

        fn upsert(&mut self, _entry: &CacheEntry) -> Result<(), CacheError> {
            Err(CacheError::Storage(rusqlite::Error::InvalidQuery))
        }
    }

    #[test]
    fn put_then_get_any_casing() {
        let mut cache = FreshnessCache::new(MemoryCacheStore::default());
        let snap = snapshot("Tirupati", 31.5);
        cache.put_at("Tirupati", &snap, NOW).expect("memory write");

        assert_eq!(cache.get_at("tirupati", NOW), Some(snap.clone()));
        assert_eq!(cache.get_at("TIRUPATI", NOW), Some(snap));
    }

    #[test]
    fn ttl_boundary_is_inclusive() {
        let mut cache = FreshnessCache::new(MemoryCacheStore::default());
        cache.put_at("Oslo", &snapshot("Oslo", 2.0), NOW).expect("memory write");

        assert!(cache.get_at("Oslo", NOW + 1_800).is_some());
        assert!(cache.get_at("Oslo", NOW + 1_801).is_none());
    }

    #[test]
    fn missing_city_is_absent() {
        let cache = FreshnessCache::new(MemoryCacheStore::default());
        assert!(cache.get_at("Nowhere", NOW).is_none());
    }

    #[test]
    fn put_overwrites_payload_and_timestamp() {
        let mut cache = FreshnessCache::new(MemoryCacheStore::default());
        cache.put_at("Oslo", &snapshot("Oslo", 2.0), NOW).expect("memory write");
        cache
            .put_at("OSLO", &snapshot("Oslo", 5.0), NOW + 3_000)
            .expect("memory write");

        let got = cache.get_at("oslo", NOW + 3_000).expect("fresh after overwrite");
        assert_eq!(got.temperature_c, Some(5.0));
        assert_eq!(cache.store().rows.len(), 1);
    }

    #[test]
    fn broken_store_degrades_to_miss_and_reports_write_error() {
        let mut cache = FreshnessCache::new(BrokenStore);
        assert!(cache.get_at("Oslo", NOW).is_none());
        assert!(cache.put_at("Oslo", &snapshot("Oslo", 1.0), NOW).is_err());
    }

    #[test]
    fn unreadable_payload_is_a_miss() {
        let mut store = MemoryCacheStore::default();
        store
            .upsert(&CacheEntry {
                city: "oslo".into(),
                json: "{not json".into(),
                fetched_at: NOW,
            })
            .expect("memory write");
        let cache = FreshnessCache::new(store);
        assert!(cache.get_at("Oslo", NOW).is_none());
    }

    #[test]
    fn sqlite_store_upserts_single_row_per_city() {
        let mut cache = FreshnessCache::new(SqliteCacheStore::in_memory().expect("sqlite"));
        cache.put_at("Paris", &snapshot("Paris", 10.0), NOW).expect("first write");
        cache
            .put_at(" paris ", &snapshot("Paris", 12.0), NOW + 60)
            .expect("second write");

        let count: i64 = cache
            .store()
            .conn
            .query_row("SELECT COUNT(*) FROM cache", [], |row| row.get(0))
            .expect("count");
        assert_eq!(count, 1);

        let got = cache.get_at("PARIS", NOW + 60).expect("fresh");
        assert_eq!(got.temperature_c, Some(12.0));
        assert!(cache.get_at("Paris", NOW + 60 + 1_801).is_none());
    }

    #[test]
    fn sqlite_store_persists_across_reopen() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("weather_cache.db");

        {
            let mut cache = FreshnessCache::new(SqliteCacheStore::open(&path).expect("open"));
            cache.put_at("Lima", &snapshot("Lima", 19.0), NOW).expect("write");
        }

        let cache = FreshnessCache::new(SqliteCacheStore::open(&path).expect("reopen"));
        assert_eq!(cache.get_at("lima", NOW + 10), Some(snapshot("Lima", 19.0)));
    }
}
