//! Cache module for storing weather snapshots to disk
//!
//! This module provides a cache manager that keeps one JSON snapshot per city
//! and answers staleness queries against either the snapshot's embedded
//! observation time or the file's modification time. Writes go through an
//! atomic temp-file-and-rename helper that catalog persistence shares.

mod atomic;
mod manager;

pub use atomic::{write_atomic, write_json_atomic};
pub use manager::{StalenessPolicy, WeatherCache};
