//! Runtime configuration for the catalog, cache and fetcher

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;

use crate::cache::{StalenessPolicy, WeatherCache};
use crate::data::cities::{Catalog, DEFAULT_SEED};
use crate::data::weather::OpenMeteoClient;
use crate::error::Result;

/// Default request timeout for weather fetches
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

const APPLICATION: &str = "cityweather";

/// Where data lives and how weather queries behave
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding one `<Name>.json` per catalog city
    pub cities_dir: PathBuf,
    /// Directory holding one `<name>.json` weather snapshot per city
    pub cache_dir: PathBuf,
    /// `name:lat:lon` lines merged into the catalog on startup
    pub seed: String,
    pub staleness: StalenessPolicy,
    /// Fixed max age in seconds; `None` uses each snapshot's own interval
    pub max_age: Option<i64>,
    pub fetch_timeout: Duration,
}

impl Config {
    /// Creates a configuration using XDG-compliant directories
    ///
    /// Uses `~/.local/share/cityweather/cities` and `~/.cache/cityweather/weather`
    /// on Linux, or the equivalent paths on other platforms. Returns `None` if
    /// no home directory can be determined.
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", APPLICATION)?;
        Some(Self::with_dirs(
            project_dirs.data_dir().join("cities"),
            project_dirs.cache_dir().join("weather"),
        ))
    }

    /// Places both directories under `root`
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self::with_dirs(root.join("cities"), root.join("weather"))
    }

    fn with_dirs(cities_dir: PathBuf, cache_dir: PathBuf) -> Self {
        Self {
            cities_dir,
            cache_dir,
            seed: DEFAULT_SEED.to_string(),
            staleness: StalenessPolicy::default(),
            max_age: None,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_seed(mut self, seed: impl Into<String>) -> Self {
        self.seed = seed.into();
        self
    }

    pub fn with_staleness(mut self, policy: StalenessPolicy) -> Self {
        self.staleness = policy;
        self
    }

    pub fn with_max_age(mut self, max_age: Option<i64>) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Uninitialized catalog over the configured directory and seed
    pub fn catalog(&self) -> Catalog {
        Catalog::new(&self.cities_dir, self.seed.clone())
    }

    pub fn weather_cache(&self) -> WeatherCache {
        WeatherCache::new(&self.cache_dir, self.staleness)
    }

    pub fn open_meteo_client(&self) -> Result<OpenMeteoClient> {
        OpenMeteoClient::new(self.fetch_timeout)
    }
}
