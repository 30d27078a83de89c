//! Randomized round trip through the weather cache
//!
//! Snapshots with arbitrary field values must read back exactly as written,
//! and staleness must follow the embedded timestamp.

use chrono::{Duration, NaiveDate};
use cityweather::cache::WeatherCache;
use cityweather::data::weather::{CurrentReading, WeatherSnapshot, TIME_FORMAT};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempfile::TempDir;

/// Four decimal places, like the upstream API reports
fn quantize(value: f64) -> f64 {
    (value * 1e4).round() / 1e4
}

fn random_snapshot(rng: &mut StdRng) -> WeatherSnapshot {
    let base = NaiveDate::from_ymd_opt(2020, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap()
        .and_utc();
    let observed = base + Duration::minutes(rng.gen_range(0..2_000_000));

    let mut snapshot = WeatherSnapshot::from_json("{}").unwrap();
    snapshot.latitude = quantize(rng.gen_range(-90.0..=90.0));
    snapshot.longitude = quantize(rng.gen_range(-180.0..=180.0));
    snapshot.generationtime_ms = quantize(rng.gen_range(0.0..5.0));
    snapshot.utc_offset_seconds = rng.gen_range(-43_200..=50_400);
    snapshot.elevation = quantize(rng.gen_range(-100.0..4000.0));
    snapshot.current = CurrentReading {
        time: Some(observed.format(TIME_FORMAT).to_string()),
        interval: rng.gen_range(60..3600),
        temperature: quantize(rng.gen_range(-40.0..45.0)),
        windspeed: quantize(rng.gen_range(0.0..150.0)),
        winddirection: rng.gen_range(0..360),
        is_day: rng.gen_range(0..=1),
        weathercode: rng.gen_range(0..100),
    };
    snapshot
}

#[test]
fn test_random_snapshots_survive_cache_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let cache = WeatherCache::with_dir(temp_dir.path());
    let mut rng = StdRng::seed_from_u64(0xc17e);

    for i in 0..200 {
        let name = format!("City{}", i % 17);
        let snapshot = random_snapshot(&mut rng);

        cache.write(&name, &snapshot).unwrap();
        let read_back = cache.read(&name.to_uppercase()).unwrap();

        assert_eq!(read_back, snapshot, "iteration {}", i);
    }
}

#[test]
fn test_random_snapshots_follow_embedded_staleness() {
    let temp_dir = TempDir::new().unwrap();
    let cache = WeatherCache::with_dir(temp_dir.path());
    let mut rng = StdRng::seed_from_u64(0x57a1e);

    for i in 0..100 {
        let snapshot = random_snapshot(&mut rng);
        cache.write("Lund", &snapshot).unwrap();
        let observed = snapshot.observed_at().unwrap();
        let max_age = rng.gen_range(0..7200);
        let age = rng.gen_range(0..7200);

        let stale = cache
            .is_stale_at("Lund", max_age, observed + Duration::seconds(age))
            .unwrap();

        assert_eq!(stale, age > max_age, "iteration {}: age {} max {}", i, age, max_age);
    }
}
