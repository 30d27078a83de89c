//! City catalog backed by one JSON file per city
//!
//! The catalog loads the cities persisted on disk. The seed list only
//! bootstraps a directory that holds no loadable city, so a removed city stays
//! removed. Cities without a file are written out after loading.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::city::City;
use crate::cache::write_json_atomic;
use crate::collections::{Iter, NodeRef, OrderedList};
use crate::error::{Error, Result};

/// Built-in seed list used to bootstrap an empty catalog
pub const DEFAULT_SEED: &str = "Stockholm:59.3293:18.0686\n\
Göteborg:57.7089:11.9746\n\
Malmö:55.6050:13.0038\n\
Uppsala:59.8586:17.6389\n\
Västerås:59.6099:16.5448\n\
Örebro:59.2741:15.2066\n\
Linköping:58.4109:15.6216\n\
Helsingborg:56.0465:12.6945\n\
Jönköping:57.7815:14.1562\n\
Norrköping:58.5877:16.1924\n\
Lund:55.7047:13.1910\n\
Gävle:60.6749:17.1413\n\
Sundsvall:62.3908:17.3069\n\
Umeå:63.8258:20.2630\n\
Luleå:65.5848:22.1567\n\
Kiruna:67.8558:20.2253\n";

/// Lifecycle of a [`Catalog`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogState {
    Uninitialized,
    Ready,
}

/// Counts from one [`Catalog::initialize`] run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Cities loaded from the catalog directory
    pub from_disk: usize,
    /// Cities added from the seed list; zero unless the directory was empty
    pub from_seed: usize,
    /// Disk files skipped as malformed or duplicate
    pub skipped: usize,
    /// Files written for cities that had none on disk
    pub persisted: usize,
}

/// Registry of known cities, keyed case-insensitively by name
#[derive(Debug)]
pub struct Catalog {
    dir: PathBuf,
    seed: String,
    cities: OrderedList<City>,
    /// File each city was loaded from or written to, by lowercase name
    sources: HashMap<String, PathBuf>,
    state: CatalogState,
}

impl Catalog {
    /// Creates an empty, uninitialized catalog persisting into `dir`
    pub fn new(dir: impl Into<PathBuf>, seed: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            seed: seed.into(),
            cities: OrderedList::new(),
            sources: HashMap::new(),
            state: CatalogState::Uninitialized,
        }
    }

    /// Creates and initializes a catalog in one step
    pub fn open(dir: impl Into<PathBuf>, seed: impl Into<String>) -> Result<Self> {
        let mut catalog = Self::new(dir, seed);
        catalog.initialize()?;
        Ok(catalog)
    }

    pub fn state(&self) -> CatalogState {
        self.state
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Loads disk entries, seeds an empty directory and writes files for new cities
    ///
    /// Safe to call again: the in-memory list is rebuilt from disk each time,
    /// so repeated runs converge on the same set of cities. Malformed files are
    /// skipped with a warning. A city whose file failed to parse is written
    /// back when the seed list supplies it.
    ///
    /// # Errors
    /// `Io` if the catalog directory cannot be created or listed, or a city
    /// file cannot be written.
    pub fn initialize(&mut self) -> Result<LoadReport> {
        fs::create_dir_all(&self.dir).map_err(|e| Error::io(&self.dir, e))?;
        self.cities.clear();
        self.sources.clear();

        let mut report = LoadReport::default();
        let (from_disk, unreadable) = scan_directory(&self.dir)?;
        report.skipped = unreadable;
        for (path, city) in from_disk {
            let key = city.key();
            match self.add(city) {
                Ok(_) => {
                    self.sources.insert(key, path);
                    report.from_disk += 1;
                }
                Err(e) => {
                    warn!(error = %e, path = %path.display(), "Skipping duplicate city file");
                    report.skipped += 1;
                }
            }
        }

        if report.from_disk == 0 {
            let seed = self.seed.clone();
            report.from_seed = self.load_from_seed_list(&seed);
        } else {
            debug!(dir = %self.dir.display(), "Catalog directory populated, seed list not merged");
        }
        report.persisted = self.persist_missing()?;
        self.state = CatalogState::Ready;

        info!(
            from_disk = report.from_disk,
            from_seed = report.from_seed,
            skipped = report.skipped,
            "City catalog initialized"
        );
        Ok(report)
    }

    /// Merges `text` (`name:lat:lon` lines) into the catalog
    ///
    /// Entries whose name is already present are skipped. Returns how many
    /// cities were added.
    pub fn load_from_seed_list(&mut self, text: &str) -> usize {
        let mut added = 0;
        for city in parse_seed_list(text) {
            match self.add(city) {
                Ok(_) => added += 1,
                Err(e) => debug!(error = %e, "Seed entry already present"),
            }
        }
        added
    }

    /// Adds a city, rejecting names already present (case-insensitively)
    pub fn add(&mut self, city: City) -> Result<NodeRef> {
        if self.contains(city.name()) {
            return Err(Error::DuplicateKey(city.name().to_string()));
        }
        Ok(self.cities.append(city))
    }

    /// Removes a city from memory and deletes the file it was loaded from
    pub fn remove(&mut self, name: &str) -> Result<City> {
        let node = self
            .find_node(name)
            .ok_or_else(|| Error::not_found("city", name))?;

        if let Some(city) = self.cities.get(node) {
            let path = self.file_path(city);
            match fs::remove_file(&path) {
                Ok(()) => debug!(path = %path.display(), "Removed city file"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(Error::io(&path, e)),
            }
        }

        let city = self.cities.remove(node)?;
        self.sources.remove(&city.key());
        Ok(city)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find_node(name).is_some()
    }

    /// Case-insensitive lookup by name
    pub fn get_by_name(&self, name: &str) -> Result<&City> {
        self.find_node(name)
            .and_then(|node| self.cities.get(node))
            .ok_or_else(|| Error::not_found("city", name))
    }

    pub fn get_by_index(&self, index: usize) -> Result<&City> {
        self.cities.get_at(index)
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, City> {
        self.cities.iter()
    }

    /// Stable ascending sort by name, case-sensitive byte order
    pub fn sort_by_name(&mut self) {
        self.cities.sort_by(|a, b| a.name().cmp(b.name()));
    }

    /// Orders cities by squared (lat, lon) distance from `reference`
    pub fn sort_by_distance(&mut self, reference: &str) -> Result<()> {
        let reference = self.get_by_name(reference)?.clone();
        self.cities.sort_by(|a, b| {
            a.distance_squared(&reference)
                .total_cmp(&b.distance_squared(&reference))
        });
        Ok(())
    }

    /// Writes every city into the catalog directory
    ///
    /// Cities loaded from disk are written back to the file they came from.
    pub fn save(&self) -> Result<usize> {
        for city in self.cities.iter() {
            write_json_atomic(&self.file_path(city), city)?;
        }
        debug!(count = self.cities.len(), dir = %self.dir.display(), "Saved city catalog");
        Ok(self.cities.len())
    }

    /// Writes one `<name>.json` file per city into `dir`, replacing existing files
    pub fn persist_all(&self, dir: &Path) -> Result<usize> {
        let mut written = 0;
        for city in self.cities.iter() {
            let path = dir.join(file_name(city));
            write_json_atomic(&path, city)?;
            written += 1;
        }
        debug!(count = written, dir = %dir.display(), "Persisted city catalog");
        Ok(written)
    }

    /// Writes `<Name>.json` for every city that was not loaded from a file
    ///
    /// Overwrites a same-named file that failed to parse.
    fn persist_missing(&mut self) -> Result<usize> {
        let mut written = Vec::new();
        for city in self.cities.iter() {
            if self.sources.contains_key(&city.key()) {
                continue;
            }
            let path = self.dir.join(file_name(city));
            write_json_atomic(&path, city)?;
            written.push((city.key(), path));
        }
        let count = written.len();
        self.sources.extend(written);
        Ok(count)
    }

    fn file_path(&self, city: &City) -> PathBuf {
        self.sources
            .get(&city.key())
            .cloned()
            .unwrap_or_else(|| self.dir.join(file_name(city)))
    }

    fn find_node(&self, name: &str) -> Option<NodeRef> {
        let key = name.to_lowercase();
        self.cities.find(|city| city.key() == key)
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a City;
    type IntoIter = Iter<'a, City>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn file_name(city: &City) -> String {
    format!("{}.json", city.name())
}

/// Reads every `*.json` city file in `dir` (non-recursive)
///
/// Files that cannot be read or parsed are skipped with a warning.
pub fn load_from_directory(dir: &Path) -> Result<Vec<City>> {
    scan_directory(dir).map(|(loaded, _)| loaded.into_iter().map(|(_, city)| city).collect())
}

/// Parsed cities with the file each came from, plus the count of skipped files
fn scan_directory(dir: &Path) -> Result<(Vec<(PathBuf, City)>, usize)> {
    let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;

    let mut paths = Vec::new();
    for entry in entries {
        match entry {
            Ok(entry) => paths.push(entry.path()),
            Err(e) => warn!(error = %e, dir = %dir.display(), "Failed to read directory entry"),
        }
    }
    paths.retain(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"));
    paths.sort();

    let mut cities = Vec::with_capacity(paths.len());
    let mut skipped = 0;
    for path in paths {
        match read_city_file(&path) {
            Ok(city) => cities.push((path, city)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping unreadable city file");
                skipped += 1;
            }
        }
    }
    Ok((cities, skipped))
}

fn read_city_file(path: &Path) -> Result<City> {
    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    Ok(serde_json::from_str(&content)?)
}

/// Parses newline-separated `name:latitude:longitude` records
///
/// Blank lines are ignored; malformed lines are skipped with a warning.
pub fn parse_seed_list(text: &str) -> Vec<City> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match line.parse::<City>() {
            Ok(city) => Some(city),
            Err(e) => {
                warn!(line, error = %e, "Skipping malformed seed entry");
                None
            }
        })
        .collect()
}
