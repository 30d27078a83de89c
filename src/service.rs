//! Cache-or-fetch flow for current weather
//!
//! A fresh cache entry is returned as-is. A missing, stale or unreadable entry
//! triggers a fetch whose normalized result is written back. When the fetch
//! fails but an older snapshot is still readable, that snapshot is returned
//! flagged as stale instead of failing the query.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::cache::WeatherCache;
use crate::data::city::City;
use crate::data::weather::{WeatherSnapshot, WeatherSource};
use crate::error::{Error, ErrorKind, Result};

/// Where a [`WeatherReport`] came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportSource {
    /// A fresh cache entry
    Cache,
    /// A new fetch, now also written to the cache
    Fetched,
    /// An outdated cache entry served because the fetch failed
    StaleCache,
}

/// Result of a weather query
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub snapshot: WeatherSnapshot,
    pub source: ReportSource,
    /// True when the snapshot is older than the allowed max age
    pub is_stale: bool,
}

impl WeatherReport {
    fn new(snapshot: WeatherSnapshot, source: ReportSource) -> Self {
        Self {
            snapshot,
            source,
            is_stale: source == ReportSource::StaleCache,
        }
    }
}

/// Answers weather queries from the cache, fetching through `S` when needed
#[derive(Debug)]
pub struct WeatherService<S> {
    cache: WeatherCache,
    source: S,
    max_age_override: Option<i64>,
}

impl<S: WeatherSource> WeatherService<S> {
    pub fn new(cache: WeatherCache, source: S) -> Self {
        Self {
            cache,
            source,
            max_age_override: None,
        }
    }

    /// Use a fixed max age instead of each snapshot's own update interval
    pub fn with_max_age(mut self, max_age_secs: Option<i64>) -> Self {
        self.max_age_override = max_age_secs;
        self
    }

    pub fn cache(&self) -> &WeatherCache {
        &self.cache
    }

    /// Current weather for `city`, using the cache when it is fresh enough
    ///
    /// # Errors
    /// `Remote` when nothing usable is cached and the fetch fails,
    /// `InvalidFormat` when the fetched document cannot be parsed,
    /// `InvalidArgument` for a negative max age override.
    pub fn current(&self, city: &City) -> Result<WeatherReport> {
        self.current_at(city, Utc::now())
    }

    /// [`current`](Self::current) against an explicit clock
    pub fn current_at(&self, city: &City, now: DateTime<Utc>) -> Result<WeatherReport> {
        if let Some(max_age) = self.max_age_override.filter(|age| *age < 0) {
            return Err(Error::InvalidArgument(format!(
                "max age must not be negative, got {}",
                max_age
            )));
        }
        let name = city.name();
        let cached = match self.cache.read(name) {
            Ok(snapshot) => {
                let max_age = self.max_age_for(&snapshot);
                if !self.cache.is_stale_at(name, max_age, now)? {
                    debug!(city = name, "Weather cache hit");
                    return Ok(WeatherReport::new(snapshot, ReportSource::Cache));
                }
                debug!(city = name, max_age, "Weather cache entry is stale");
                Some(snapshot)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(city = name, "Weather cache miss");
                None
            }
            Err(e) => {
                warn!(city = name, error = %e, "Ignoring unreadable weather cache entry");
                None
            }
        };

        match self.fetch_and_store(city) {
            Ok(snapshot) => Ok(WeatherReport::new(snapshot, ReportSource::Fetched)),
            Err(e) => match cached {
                Some(snapshot) => {
                    warn!(city = name, error = %e, "Fetch failed, serving stale weather");
                    Ok(WeatherReport::new(snapshot, ReportSource::StaleCache))
                }
                None => Err(e),
            },
        }
    }

    /// Fetches new weather for `city` regardless of the cache state
    pub fn refresh(&self, city: &City) -> Result<WeatherReport> {
        let snapshot = self.fetch_and_store(city)?;
        Ok(WeatherReport::new(snapshot, ReportSource::Fetched))
    }

    fn fetch_and_store(&self, city: &City) -> Result<WeatherSnapshot> {
        info!(city = city.name(), "Fetching current weather");
        let document = self.source.fetch(city.latitude(), city.longitude())?;
        let snapshot = WeatherSnapshot::from_json(&document)?;
        if let Err(e) = self.cache.write(city.name(), &snapshot) {
            warn!(city = city.name(), error = %e, "Failed to cache fetched weather");
        }
        Ok(snapshot)
    }

    fn max_age_for(&self, snapshot: &WeatherSnapshot) -> i64 {
        self.max_age_override.unwrap_or_else(|| snapshot.interval_secs())
    }
}
