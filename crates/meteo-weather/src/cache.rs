//! In-memory forecast cache keyed by location and date.
//!
//! The cache is a plain value owned by the caller; nothing in the pipeline
//! reads it implicitly.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::HashMap;

use crate::types::Forecast;

/// Coordinate precision of a cache key (1e-4 degrees, about 11 m)
const COORD_SCALE: f64 = 10_000.0;

/// `(location, date)` fingerprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    lat: i64,
    lon: i64,
    date: NaiveDate,
}

impl CacheKey {
    pub fn new(latitude: f64, longitude: f64, date: NaiveDate) -> Self {
        Self {
            lat: (latitude * COORD_SCALE).round() as i64,
            lon: (longitude * COORD_SCALE).round() as i64,
            date,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    forecast: Forecast,
    stored_at: NaiveDateTime,
}

/// Forecasts kept for a fixed time-to-live
#[derive(Debug, Clone)]
pub struct ForecastCache {
    ttl: Duration,
    entries: HashMap<CacheKey, CacheEntry>,
}

impl ForecastCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn with_ttl_minutes(minutes: u32) -> Self {
        Self::new(Duration::minutes(i64::from(minutes)))
    }

    /// Fresh forecast for `key` as of `now`
    pub fn get(&self, key: &CacheKey, now: NaiveDateTime) -> Option<&Forecast> {
        let entry = self.entries.get(key)?;
        if now - entry.stored_at >= self.ttl {
            tracing::debug!("Cache entry for {} is stale", key.date);
            return None;
        }
        Some(&entry.forecast)
    }

    pub fn insert(&mut self, key: CacheKey, forecast: Forecast, now: NaiveDateTime) {
        self.entries.insert(
            key,
            CacheEntry {
                forecast,
                stored_at: now,
            },
        );
    }

    /// Drop stale entries, returning how many were removed
    pub fn purge_expired(&mut self, now: NaiveDateTime) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries.retain(|_, entry| now - entry.stored_at < ttl);
        let removed = before - self.entries.len();
        if removed > 0 {
            tracing::debug!("Purged {} stale forecast(s)", removed);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ForecastCache {
    fn default() -> Self {
        Self::with_ttl_minutes(60)
    }
}
