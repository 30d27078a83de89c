//! Command-line interface for cityweather
//!
//! This module handles parsing of CLI arguments using clap and runs the parsed
//! command against the catalog and weather service. Output goes to the writer
//! passed to [`run`] so commands can be exercised without spawning the binary.

use std::io::Write;
use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use thiserror::Error;

use crate::config::Config;
use crate::data::city::City;
use crate::data::weather::WeatherSource;
use crate::error::Error;
use crate::service::{ReportSource, WeatherService};

/// Error types for the command-line front end
#[derive(Debug, Error)]
pub enum CliError {
    /// `--sort distance` needs a reference city
    #[error("--sort distance requires --from <CITY>")]
    MissingOrigin,

    /// `--from` only makes sense when sorting by distance
    #[error("--from can only be used with --sort distance")]
    UnexpectedOrigin,

    /// No `--data-dir` was given and no home directory could be found
    #[error("could not determine a data directory; pass --data-dir")]
    NoDataDir,

    /// Writing command output failed
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),

    #[error(transparent)]
    App(#[from] Error),
}

/// cityweather - Keep a catalog of cities and look up their current weather
#[derive(Parser, Debug)]
#[command(name = "cityweather")]
#[command(about = "City catalog with cached current weather")]
#[command(version)]
pub struct Cli {
    /// Directory holding the city catalog and weather cache
    #[arg(long, value_name = "DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List catalog cities
    Cities {
        /// Order of the listing
        #[arg(long, value_enum, default_value_t = SortOrder::Insertion)]
        sort: SortOrder,

        /// Reference city for `--sort distance`
        #[arg(long, value_name = "CITY")]
        from: Option<String>,
    },

    /// Show current weather for a catalog city
    Weather {
        city: String,

        /// Treat cached weather older than this many seconds as stale
        #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(i64).range(0..))]
        max_age: Option<i64>,

        /// Never fetch; only use cached weather
        #[arg(long)]
        offline: bool,
    },

    /// Add a city to the catalog
    #[command(allow_negative_numbers = true)]
    Add {
        name: String,
        latitude: f64,
        longitude: f64,
    },

    /// Remove a city from the catalog
    Remove { name: String },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Order in which cities were added
    #[default]
    Insertion,
    /// Ascending by name
    Name,
    /// Nearest first, relative to `--from`
    Distance,
}

/// Resolved listing order for the `cities` command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    Insertion,
    Name,
    DistanceFrom(String),
}

/// Validates the `--sort`/`--from` combination
pub fn resolve_listing(sort: SortOrder, from: Option<&str>) -> Result<Listing, CliError> {
    match (sort, from) {
        (SortOrder::Distance, Some(origin)) => Ok(Listing::DistanceFrom(origin.to_string())),
        (SortOrder::Distance, None) => Err(CliError::MissingOrigin),
        (_, Some(_)) => Err(CliError::UnexpectedOrigin),
        (SortOrder::Insertion, None) => Ok(Listing::Insertion),
        (SortOrder::Name, None) => Ok(Listing::Name),
    }
}

/// Builds the runtime configuration from the global flags
pub fn config_from_cli(cli: &Cli) -> Result<Config, CliError> {
    let config = match &cli.data_dir {
        Some(dir) => Config::with_root(dir),
        None => Config::new().ok_or(CliError::NoDataDir)?,
    };
    let max_age = match &cli.command {
        Command::Weather { max_age, .. } => *max_age,
        _ => None,
    };
    Ok(config.with_max_age(max_age))
}

/// Weather source used by `--offline`; every fetch fails
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineSource;

impl WeatherSource for OfflineSource {
    fn fetch(&self, _latitude: f64, _longitude: f64) -> crate::Result<String> {
        Err(Error::Remote {
            reason: "offline mode, no cached weather available".to_string(),
            retryable: false,
        })
    }
}

/// Runs the parsed command, writing its output to `out`
pub fn run<W: Write>(cli: &Cli, out: &mut W) -> Result<(), CliError> {
    let config = config_from_cli(cli)?;
    let mut catalog = config.catalog();
    catalog.initialize()?;

    match &cli.command {
        Command::Cities { sort, from } => {
            match resolve_listing(*sort, from.as_deref())? {
                Listing::Insertion => {}
                Listing::Name => catalog.sort_by_name(),
                Listing::DistanceFrom(origin) => catalog.sort_by_distance(&origin)?,
            }
            for city in &catalog {
                writeln!(out, "{}", city)?;
            }
        }
        Command::Weather { city, offline, .. } => {
            let city = catalog.get_by_name(city)?.clone();
            let cache = config.weather_cache();
            if *offline {
                let service =
                    WeatherService::new(cache, OfflineSource).with_max_age(config.max_age);
                print_weather(&service, &city, out)?;
            } else {
                let service = WeatherService::new(cache, config.open_meteo_client()?)
                    .with_max_age(config.max_age);
                print_weather(&service, &city, out)?;
            }
        }
        Command::Add {
            name,
            latitude,
            longitude,
        } => {
            let city = City::new(name.as_str(), *latitude, *longitude)?;
            let line = city.to_string();
            catalog.add(city)?;
            catalog.save()?;
            writeln!(out, "Added {}", line)?;
        }
        Command::Remove { name } => {
            let city = catalog.remove(name)?;
            writeln!(out, "Removed {}", city.name())?;
        }
    }
    Ok(())
}

fn print_weather<S: WeatherSource, W: Write>(
    service: &WeatherService<S>,
    city: &City,
    out: &mut W,
) -> Result<(), CliError> {
    let report = service.current(city)?;
    let note = match report.source {
        ReportSource::Cache => "cached",
        ReportSource::Fetched => "fetched",
        ReportSource::StaleCache => "stale, fetch failed",
    };
    writeln!(out, "{}: {} [{}]", city.name(), report.snapshot.summary(), note)?;
    Ok(())
}
