//! City record: a validated name plus coordinates
//!
//! City names are used verbatim as file names by the catalog and (lowercased)
//! by the weather cache, so construction rejects anything that could escape
//! the target directory.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A named location in decimal degrees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CityRecord")]
pub struct City {
    name: String,
    latitude: f64,
    longitude: f64,
}

/// On-disk shape of a city, validated on the way into [`City`]
#[derive(Deserialize)]
struct CityRecord {
    name: String,
    latitude: f64,
    longitude: f64,
}

impl TryFrom<CityRecord> for City {
    type Error = Error;

    fn try_from(record: CityRecord) -> Result<Self> {
        City::new(record.name, record.latitude, record.longitude)
    }
}

impl City {
    /// Creates a city after validating its name and coordinates
    ///
    /// # Errors
    /// `InvalidFormat` if the name is empty or path-unsafe, or if a coordinate
    /// is not finite or outside the valid latitude/longitude range.
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;

        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(Error::InvalidFormat(format!(
                "latitude {} of '{}' is outside [-90, 90]",
                latitude, name
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(Error::InvalidFormat(format!(
                "longitude {} of '{}' is outside [-180, 180]",
                longitude, name
            )));
        }

        Ok(Self {
            name,
            latitude,
            longitude,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Case-insensitive key shared by catalog lookups and the weather cache
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }

    /// Squared Euclidean distance in (lat, lon) space
    ///
    /// Not a great-circle distance; only good enough for ordering nearby cities.
    pub fn distance_squared(&self, other: &City) -> f64 {
        let dlat = self.latitude - other.latitude;
        let dlon = self.longitude - other.longitude;
        dlat * dlat + dlon * dlon
    }

    /// Formats the city as a `name:latitude:longitude` seed line
    pub fn to_seed_line(&self) -> String {
        format!("{}:{}:{}", self.name, self.latitude, self.longitude)
    }
}

/// Rejects names that are empty or unsafe to use as a file name
///
/// Names must also survive a `name:lat:lon` seed line, so `:` and control
/// characters are refused, as is leading or trailing whitespace.
pub fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidFormat("city name is empty".to_string()));
    }
    if name.trim() != name {
        return Err(Error::InvalidFormat(format!(
            "city name '{}' has surrounding whitespace",
            name.escape_debug()
        )));
    }
    if name == "." || name.contains("..") {
        return Err(Error::InvalidFormat(format!(
            "city name '{}' contains a relative path component",
            name
        )));
    }
    if let Some(bad) = name
        .chars()
        .find(|c| matches!(c, '/' | '\\' | ':') || c.is_control())
    {
        return Err(Error::InvalidFormat(format!(
            "city name '{}' contains forbidden character {:?}",
            name.escape_debug(),
            bad
        )));
    }
    Ok(())
}

impl FromStr for City {
    type Err = Error;

    /// Parses a `name:latitude:longitude` seed line
    fn from_str(line: &str) -> Result<Self> {
        let mut fields = line.trim().splitn(3, ':');
        let (Some(name), Some(lat), Some(lon)) = (fields.next(), fields.next(), fields.next())
        else {
            return Err(Error::InvalidFormat(format!(
                "expected name:latitude:longitude, got '{}'",
                line
            )));
        };

        let latitude = parse_coordinate(lat, line)?;
        let longitude = parse_coordinate(lon, line)?;
        City::new(name.trim(), latitude, longitude)
    }
}

fn parse_coordinate(raw: &str, line: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| Error::InvalidFormat(format!("bad coordinate '{}' in '{}'", raw, line)))
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: Latitude: {:.4}, Longitude: {:.4}",
            self.name, self.latitude, self.longitude
        )
    }
}
