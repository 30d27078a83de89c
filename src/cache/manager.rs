//! Weather cache manager persisting one snapshot file per city
//!
//! Provides a `WeatherCache` that stores each city's latest [`WeatherSnapshot`]
//! as `<lowercased-name>.json`, answers existence and staleness queries, and
//! replaces files atomically on write.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::debug;

use super::atomic::write_json_atomic;
use crate::data::city::validate_name;
use crate::data::weather::WeatherSnapshot;
use crate::error::{Error, Result};

/// How a cache entry's age is determined
///
/// One policy is fixed per cache instance; the two are never mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StalenessPolicy {
    /// Age is measured from the snapshot's own `current_weather.time`
    #[default]
    EmbeddedTimestamp,
    /// Age is measured from the cache file's last-modified time
    FileModified,
}

/// Manages reading and writing cached weather snapshots on disk
///
/// Cities are addressed case-insensitively: `"Malmö"` and `"MALMÖ"` share
/// `malmö.json`. Nothing is kept in memory between calls.
#[derive(Debug, Clone)]
pub struct WeatherCache {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
    policy: StalenessPolicy,
}

impl WeatherCache {
    /// Creates a cache rooted at `cache_dir` using the given staleness policy
    pub fn new(cache_dir: impl Into<PathBuf>, policy: StalenessPolicy) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            policy,
        }
    }

    /// Creates a cache with the default (embedded timestamp) policy
    pub fn with_dir(cache_dir: impl Into<PathBuf>) -> Self {
        Self::new(cache_dir, StalenessPolicy::default())
    }

    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn policy(&self) -> StalenessPolicy {
        self.policy
    }

    /// Returns the cache file path for `city_name`
    ///
    /// # Errors
    /// `InvalidFormat` if the name is empty or path-unsafe.
    pub fn path_for(&self, city_name: &str) -> Result<PathBuf> {
        validate_name(city_name)?;
        Ok(self
            .cache_dir
            .join(format!("{}.json", city_name.to_lowercase())))
    }

    /// True iff a parseable cache entry exists for `city_name`
    pub fn exists(&self, city_name: &str) -> bool {
        self.read(city_name).is_ok()
    }

    /// Whether the entry for `city_name` is older than `max_age_secs` right now
    pub fn is_stale(&self, city_name: &str, max_age_secs: i64) -> Result<bool> {
        self.is_stale_at(city_name, max_age_secs, Utc::now())
    }

    /// Staleness check against an explicit clock
    ///
    /// A missing or unparseable entry is always stale. Otherwise the entry is
    /// stale iff its age, measured per [`StalenessPolicy`], is strictly greater
    /// than `max_age_secs`.
    ///
    /// # Errors
    /// `InvalidArgument` for a negative `max_age_secs`; `InvalidFormat` for an
    /// unsafe city name.
    pub fn is_stale_at(
        &self,
        city_name: &str,
        max_age_secs: i64,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        if max_age_secs < 0 {
            return Err(Error::InvalidArgument(format!(
                "max age must not be negative, got {}",
                max_age_secs
            )));
        }
        let path = self.path_for(city_name)?;

        let snapshot = match self.read(city_name) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                debug!(city = city_name, error = %e, "Cache entry unusable, treating as stale");
                return Ok(true);
            }
        };

        let stale = match self.policy {
            StalenessPolicy::EmbeddedTimestamp => snapshot.is_stale_at(max_age_secs, now),
            StalenessPolicy::FileModified => match fs::metadata(&path).and_then(|m| m.modified()) {
                Ok(modified) => {
                    let modified: DateTime<Utc> = modified.into();
                    now.signed_duration_since(modified).num_seconds() > max_age_secs
                }
                Err(_) => true,
            },
        };
        Ok(stale)
    }

    /// Loads the cached snapshot for `city_name`
    ///
    /// # Errors
    /// `NotFound` if there is no entry, `InvalidFormat` if it cannot be parsed,
    /// `Io` for any other read failure.
    pub fn read(&self, city_name: &str) -> Result<WeatherSnapshot> {
        let path = self.path_for(city_name)?;
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::not_found("cache entry", city_name));
            }
            Err(e) => return Err(Error::io(&path, e)),
        };
        WeatherSnapshot::from_json(&content)
    }

    /// Atomically replaces the cache entry for `city_name`
    pub fn write(&self, city_name: &str, snapshot: &WeatherSnapshot) -> Result<()> {
        let path = self.path_for(city_name)?;
        write_json_atomic(&path, snapshot)?;
        debug!(city = city_name, path = %path.display(), "Wrote weather cache entry");
        Ok(())
    }

    /// Normalizes a raw upstream document and stores it
    ///
    /// Returns the canonical snapshot that was written.
    pub fn write_raw(&self, city_name: &str, document: &str) -> Result<WeatherSnapshot> {
        let snapshot = WeatherSnapshot::from_json(document)?;
        self.write(city_name, &snapshot)?;
        Ok(snapshot)
    }

    /// Deletes the entry for `city_name`; returns whether one existed
    pub fn evict(&self, city_name: &str) -> Result<bool> {
        let path = self.path_for(city_name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::io(&path, e)),
        }
    }
}
