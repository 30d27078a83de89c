//! Core data models for the city catalog and weather snapshots
//!
//! This module contains the city record, the catalog that owns the ordered
//! city collection, and the weather snapshot types with their fetch source.

pub mod cities;
pub mod city;
pub mod weather;

pub use cities::{
    load_from_directory, parse_seed_list, Catalog, CatalogState, LoadReport, DEFAULT_SEED,
};
pub use city::City;
pub use weather::{
    OpenMeteoClient, WeatherCondition, WeatherSnapshot, WeatherSource, WeatherUnits,
};
