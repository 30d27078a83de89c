//! cityweather library
//!
//! Exposes the catalog, weather cache and CLI modules for the binary and
//! integration tests.

pub mod cache;
pub mod cli;
pub mod collections;
pub mod config;
pub mod data;
pub mod error;
pub mod service;

pub use error::{Error, ErrorKind, Result};
