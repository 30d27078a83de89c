//! Weather snapshot model and the Open-Meteo weather source
//!
//! A [`WeatherSnapshot`] is the canonical, complete form of one
//! `current_weather` reading. Parsing is lenient about missing or `null`
//! fields (they receive fixed defaults) but strict about wrong types, so the
//! cache always stores a full document regardless of what upstream omitted.

use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Base URL for the Open-Meteo API
const OPEN_METEO_BASE_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Timestamp layout used by `current_weather.time`
pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Sampling interval assumed when a document does not carry one
pub const DEFAULT_INTERVAL_SECS: i64 = 900;

const DEFAULT_TIMEZONE: &str = "GMT";

/// One point-in-time weather reading plus its metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawSnapshot")]
pub struct WeatherSnapshot {
    pub latitude: f64,
    pub longitude: f64,
    pub generationtime_ms: f64,
    pub utc_offset_seconds: i32,
    pub timezone: String,
    pub timezone_abbreviation: String,
    pub elevation: f64,
    #[serde(rename = "current_weather_units")]
    pub units: WeatherUnits,
    #[serde(rename = "current_weather")]
    pub current: CurrentReading,
}

/// Unit labels for each field of [`CurrentReading`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherUnits {
    pub time: String,
    pub interval: String,
    pub temperature: String,
    pub windspeed: String,
    pub winddirection: String,
    pub is_day: String,
    pub weathercode: String,
}

impl Default for WeatherUnits {
    fn default() -> Self {
        Self {
            time: "iso8601".to_string(),
            interval: "seconds".to_string(),
            temperature: "°C".to_string(),
            windspeed: "km/h".to_string(),
            winddirection: "°".to_string(),
            is_day: String::new(),
            weathercode: "wmo code".to_string(),
        }
    }
}

/// The `current_weather` block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentReading {
    /// ISO-8601 `YYYY-MM-DDTHH:MM` in UTC; serialized as `null` when absent
    pub time: Option<String>,
    /// Sampling interval in seconds
    pub interval: i64,
    pub temperature: f64,
    pub windspeed: f64,
    /// Degrees
    pub winddirection: i32,
    /// 1 during daylight, 0 at night
    pub is_day: i32,
    /// WMO weather code
    pub weathercode: i32,
}

impl Default for CurrentReading {
    fn default() -> Self {
        Self {
            time: None,
            interval: DEFAULT_INTERVAL_SECS,
            temperature: 0.0,
            windspeed: 0.0,
            winddirection: 0,
            is_day: 0,
            weathercode: 0,
        }
    }
}

/// Lenient wire shape; every field may be missing or `null`
#[derive(Deserialize)]
struct RawSnapshot {
    latitude: Option<f64>,
    longitude: Option<f64>,
    generationtime_ms: Option<f64>,
    utc_offset_seconds: Option<i32>,
    timezone: Option<String>,
    timezone_abbreviation: Option<String>,
    elevation: Option<f64>,
    current_weather_units: Option<RawUnits>,
    current_weather: Option<RawReading>,
}

#[derive(Deserialize)]
struct RawUnits {
    time: Option<String>,
    interval: Option<String>,
    temperature: Option<String>,
    windspeed: Option<String>,
    winddirection: Option<String>,
    is_day: Option<String>,
    weathercode: Option<String>,
}

#[derive(Deserialize)]
struct RawReading {
    time: Option<String>,
    interval: Option<i64>,
    temperature: Option<f64>,
    windspeed: Option<f64>,
    winddirection: Option<i32>,
    is_day: Option<i32>,
    weathercode: Option<i32>,
}

impl From<RawUnits> for WeatherUnits {
    fn from(raw: RawUnits) -> Self {
        let defaults = WeatherUnits::default();
        Self {
            time: raw.time.unwrap_or(defaults.time),
            interval: raw.interval.unwrap_or(defaults.interval),
            temperature: raw.temperature.unwrap_or(defaults.temperature),
            windspeed: raw.windspeed.unwrap_or(defaults.windspeed),
            winddirection: raw.winddirection.unwrap_or(defaults.winddirection),
            is_day: raw.is_day.unwrap_or(defaults.is_day),
            weathercode: raw.weathercode.unwrap_or(defaults.weathercode),
        }
    }
}

impl From<RawReading> for CurrentReading {
    fn from(raw: RawReading) -> Self {
        Self {
            time: raw.time,
            interval: raw.interval.unwrap_or(DEFAULT_INTERVAL_SECS),
            temperature: raw.temperature.unwrap_or_default(),
            windspeed: raw.windspeed.unwrap_or_default(),
            winddirection: raw.winddirection.unwrap_or_default(),
            is_day: raw.is_day.unwrap_or_default(),
            weathercode: raw.weathercode.unwrap_or_default(),
        }
    }
}

impl From<RawSnapshot> for WeatherSnapshot {
    fn from(raw: RawSnapshot) -> Self {
        Self {
            latitude: raw.latitude.unwrap_or_default(),
            longitude: raw.longitude.unwrap_or_default(),
            generationtime_ms: raw.generationtime_ms.unwrap_or_default(),
            utc_offset_seconds: raw.utc_offset_seconds.unwrap_or_default(),
            timezone: raw.timezone.unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
            timezone_abbreviation: raw
                .timezone_abbreviation
                .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
            elevation: raw.elevation.unwrap_or_default(),
            units: raw.current_weather_units.map(Into::into).unwrap_or_default(),
            current: raw.current_weather.map(Into::into).unwrap_or_default(),
        }
    }
}

impl WeatherSnapshot {
    /// Parses a fetched or cached document, dropping fields outside the schema
    ///
    /// # Errors
    /// `InvalidFormat` for malformed JSON or a recognized field of the wrong type.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the canonical, pretty-printed document
    ///
    /// Float fields are always written with a fraction, so an integer literal
    /// such as `"elevation": 28` comes back as `28.0`. The parsed values are
    /// unchanged.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// When the reading was taken, interpreted as UTC
    ///
    /// # Errors
    /// `InvalidFormat` if `time` is absent or not `YYYY-MM-DDTHH:MM`.
    pub fn observed_at(&self) -> Result<DateTime<Utc>> {
        let time = self
            .current
            .time
            .as_deref()
            .ok_or_else(|| Error::InvalidFormat("snapshot has no timestamp".to_string()))?;
        parse_timestamp(time)
    }

    /// Whether the reading is older than `max_age_secs` at `now`
    ///
    /// Stale iff age > max age (strictly). A missing or unparsable timestamp
    /// always counts as stale.
    pub fn is_stale_at(&self, max_age_secs: i64, now: DateTime<Utc>) -> bool {
        match self.observed_at() {
            Ok(observed) => now.signed_duration_since(observed).num_seconds() > max_age_secs,
            Err(_) => true,
        }
    }

    /// Sampling interval, falling back to the default for non-positive values
    pub fn interval_secs(&self) -> i64 {
        if self.current.interval > 0 {
            self.current.interval
        } else {
            DEFAULT_INTERVAL_SECS
        }
    }

    pub fn condition(&self) -> WeatherCondition {
        weather_code_to_condition(self.current.weathercode)
    }

    pub fn is_daytime(&self) -> bool {
        self.current.is_day != 0
    }

    /// One-line human readable summary
    pub fn summary(&self) -> String {
        format!(
            "{} {:.1} {}, wind {:.1} {} from {}{} ({})",
            self.condition().description(),
            self.current.temperature,
            self.units.temperature,
            self.current.windspeed,
            self.units.windspeed,
            self.current.winddirection,
            self.units.winddirection,
            self.current.time.as_deref().unwrap_or("unknown time"),
        )
    }
}

/// Parse a `YYYY-MM-DDTHH:MM` timestamp as UTC
pub fn parse_timestamp(time: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(time, TIME_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| Error::InvalidFormat(format!("invalid timestamp '{}'", time)))
}

/// Broad weather categories derived from WMO codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherCondition {
    Clear,
    PartlyCloudy,
    Cloudy,
    Fog,
    Drizzle,
    Rain,
    FreezingRain,
    Snow,
    Showers,
    Thunderstorm,
    Unknown,
}

impl WeatherCondition {
    pub fn description(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::PartlyCloudy => "Partly cloudy",
            Self::Cloudy => "Cloudy",
            Self::Fog => "Fog",
            Self::Drizzle => "Drizzle",
            Self::Rain => "Rain",
            Self::FreezingRain => "Freezing rain",
            Self::Snow => "Snow",
            Self::Showers => "Showers",
            Self::Thunderstorm => "Thunderstorm",
            Self::Unknown => "Unknown",
        }
    }
}

/// Map WMO weather code to WeatherCondition enum
///
/// Weather codes from WMO (World Meteorological Organization):
/// - 0: Clear sky
/// - 1-2: Mainly clear, partly cloudy
/// - 3: Overcast
/// - 45, 48: Fog
/// - 51-55: Drizzle
/// - 56-57, 66-67: Freezing drizzle / rain
/// - 61-65: Rain
/// - 71-77, 85-86: Snow
/// - 80-82: Rain showers
/// - 95-99: Thunderstorm
pub fn weather_code_to_condition(code: i32) -> WeatherCondition {
    match code {
        0 => WeatherCondition::Clear,
        1..=2 => WeatherCondition::PartlyCloudy,
        3 => WeatherCondition::Cloudy,
        45 | 48 => WeatherCondition::Fog,
        51..=55 => WeatherCondition::Drizzle,
        56..=57 | 66..=67 => WeatherCondition::FreezingRain,
        61..=65 => WeatherCondition::Rain,
        71..=77 | 85..=86 => WeatherCondition::Snow,
        80..=82 => WeatherCondition::Showers,
        95..=99 => WeatherCondition::Thunderstorm,
        _ => WeatherCondition::Unknown,
    }
}

/// Anything that can fetch a raw weather document for a coordinate pair
pub trait WeatherSource {
    /// Returns the raw JSON document for `(latitude, longitude)`
    ///
    /// # Errors
    /// `Remote` on transport failure, timeout (retryable) or a rejected request.
    fn fetch(&self, latitude: f64, longitude: f64) -> Result<String>;
}

/// Blocking client for the Open-Meteo forecast API
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: Client,
    base_url: String,
}

impl OpenMeteoClient {
    /// Create a client whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Remote {
                reason: format!("failed to build HTTP client: {}", e),
                retryable: false,
            })?;
        Ok(Self {
            client,
            base_url: OPEN_METEO_BASE_URL.to_string(),
        })
    }

    /// Point the client at a different endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn url_for(&self, latitude: f64, longitude: f64) -> String {
        format!(
            "{}?latitude={}&longitude={}&current_weather=true",
            self.base_url, latitude, longitude
        )
    }
}

impl WeatherSource for OpenMeteoClient {
    fn fetch(&self, latitude: f64, longitude: f64) -> Result<String> {
        let url = self.url_for(latitude, longitude);
        debug!(%url, "Requesting current weather");

        let response = self.client.get(&url).send().map_err(remote_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Remote {
                reason: format!("HTTP {} from {}", status, self.base_url),
                retryable: status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS,
            });
        }

        response.text().map_err(remote_error)
    }
}

fn remote_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        return Error::Remote {
            reason: "request timed out".to_string(),
            retryable: true,
        };
    }
    Error::Remote {
        retryable: err.is_connect() || err.is_request() || err.is_body(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use chrono::TimeZone;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Sample Open-Meteo response with `current_weather=true`
    const VALID_RESPONSE: &str = r#"{
        "latitude": 59.33,
        "longitude": 18.07,
        "generationtime_ms": 0.0519,
        "utc_offset_seconds": 0,
        "timezone": "GMT",
        "timezone_abbreviation": "GMT",
        "elevation": 20.0,
        "current_weather_units": {
            "time": "iso8601",
            "interval": "seconds",
            "temperature": "°C",
            "windspeed": "km/h",
            "winddirection": "°",
            "is_day": "",
            "weathercode": "wmo code"
        },
        "current_weather": {
            "time": "2024-07-15T14:00",
            "interval": 900,
            "temperature": 22.5,
            "windspeed": 12.5,
            "winddirection": 270,
            "is_day": 1,
            "weathercode": 2
        }
    }"#;

    #[test]
    fn test_parse_valid_response() {
        let snapshot = WeatherSnapshot::from_json(VALID_RESPONSE).expect("Should parse");

        assert!((snapshot.latitude - 59.33).abs() < 1e-9);
        assert_eq!(snapshot.timezone, "GMT");
        assert_eq!(snapshot.units.temperature, "°C");
        assert_eq!(snapshot.current.time.as_deref(), Some("2024-07-15T14:00"));
        assert_eq!(snapshot.current.interval, 900);
        assert!((snapshot.current.temperature - 22.5).abs() < 0.01);
        assert_eq!(snapshot.current.winddirection, 270);
        assert!(snapshot.is_daytime());
        assert_eq!(snapshot.condition(), WeatherCondition::PartlyCloudy);
    }

    #[test]
    fn test_serialize_reproduces_recognized_fields() {
        let snapshot = WeatherSnapshot::from_json(VALID_RESPONSE).unwrap();
        let original: serde_json::Value = serde_json::from_str(VALID_RESPONSE).unwrap();
        let reserialized: serde_json::Value =
            serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();

        assert_eq!(reserialized, original);
    }

    #[test]
    fn test_integer_literals_in_float_fields_reparse_equal() {
        let json = r#"{
            "latitude": 55,
            "elevation": 28,
            "current_weather": {"time": "2024-07-15T14:00", "temperature": 20, "winddirection": 180}
        }"#;
        let snapshot = WeatherSnapshot::from_json(json).unwrap();
        let written = snapshot.to_json().unwrap();

        assert!(written.contains("\"elevation\": 28.0"));
        assert!(written.contains("\"temperature\": 20.0"));
        assert!(written.contains("\"winddirection\": 180,"));
        assert_eq!(WeatherSnapshot::from_json(&written).unwrap(), snapshot);
    }

    #[test]
    fn test_unrecognized_fields_are_dropped() {
        let json = r#"{
            "latitude": 1.0,
            "hourly": {"time": []},
            "current_weather": {"time": "2024-01-01T00:00", "extra": true}
        }"#;
        let snapshot = WeatherSnapshot::from_json(json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();

        assert!(value.get("hourly").is_none());
        assert!(value["current_weather"].get("extra").is_none());
    }

    #[test]
    fn test_missing_fields_receive_defaults() {
        let snapshot = WeatherSnapshot::from_json("{}").unwrap();

        assert_eq!(snapshot.timezone, "GMT");
        assert_eq!(snapshot.timezone_abbreviation, "GMT");
        assert_eq!(snapshot.units, WeatherUnits::default());
        assert_eq!(snapshot.units.temperature, "°C");
        assert_eq!(snapshot.units.weathercode, "wmo code");
        assert_eq!(snapshot.current.time, None);
        assert_eq!(snapshot.current.interval, DEFAULT_INTERVAL_SECS);

        let value: serde_json::Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();
        assert!(value["current_weather"]["time"].is_null());
        assert_eq!(value["current_weather_units"]["is_day"], "");
    }

    #[test]
    fn test_null_fields_receive_defaults() {
        let json = r#"{"timezone": null, "current_weather": {"temperature": null, "time": null}}"#;
        let snapshot = WeatherSnapshot::from_json(json).unwrap();
        assert_eq!(snapshot.timezone, "GMT");
        assert_eq!(snapshot.current.temperature, 0.0);
    }

    #[test]
    fn test_wrong_field_type_is_invalid_format() {
        let json = r#"{"current_weather": {"temperature": "hot"}}"#;
        let err = WeatherSnapshot::from_json(json).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);
    }

    #[test]
    fn test_malformed_json_is_invalid_format() {
        let err = WeatherSnapshot::from_json("{\"latitude\": ").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);
        assert!(WeatherSnapshot::from_json("[1, 2]").is_err());
    }

    #[test]
    fn test_observed_at_parses_utc() {
        let snapshot = WeatherSnapshot::from_json(VALID_RESPONSE).unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 7, 15, 14, 0, 0).unwrap();
        assert_eq!(snapshot.observed_at().unwrap(), expected);
    }

    #[test]
    fn test_observed_at_rejects_bad_or_missing_time() {
        let mut snapshot = WeatherSnapshot::from_json(VALID_RESPONSE).unwrap();
        snapshot.current.time = Some("15/07/2024 14:00".to_string());
        assert_eq!(snapshot.observed_at().unwrap_err().kind(), ErrorKind::InvalidFormat);

        snapshot.current.time = None;
        assert_eq!(snapshot.observed_at().unwrap_err().kind(), ErrorKind::InvalidFormat);
    }

    #[test]
    fn test_is_stale_at_boundary_is_strict() {
        let snapshot = WeatherSnapshot::from_json(VALID_RESPONSE).unwrap();
        let observed = snapshot.observed_at().unwrap();

        assert!(!snapshot.is_stale_at(900, observed + chrono::Duration::seconds(899)));
        assert!(!snapshot.is_stale_at(900, observed + chrono::Duration::seconds(900)));
        assert!(snapshot.is_stale_at(900, observed + chrono::Duration::seconds(901)));
    }

    #[test]
    fn test_unparsable_timestamp_is_always_stale() {
        let mut snapshot = WeatherSnapshot::from_json(VALID_RESPONSE).unwrap();
        snapshot.current.time = Some("yesterday".to_string());
        let observed = Utc.with_ymd_and_hms(2024, 7, 15, 14, 0, 0).unwrap();
        assert!(snapshot.is_stale_at(i64::MAX, observed));
    }

    #[test]
    fn test_interval_secs_falls_back_for_non_positive() {
        let mut snapshot = WeatherSnapshot::from_json(VALID_RESPONSE).unwrap();
        snapshot.current.interval = 0;
        assert_eq!(snapshot.interval_secs(), DEFAULT_INTERVAL_SECS);
        snapshot.current.interval = 3600;
        assert_eq!(snapshot.interval_secs(), 3600);
    }

    #[test]
    fn test_weather_code_mapping() {
        assert_eq!(weather_code_to_condition(0), WeatherCondition::Clear);
        assert_eq!(weather_code_to_condition(3), WeatherCondition::Cloudy);
        assert_eq!(weather_code_to_condition(45), WeatherCondition::Fog);
        assert_eq!(weather_code_to_condition(53), WeatherCondition::Drizzle);
        assert_eq!(weather_code_to_condition(63), WeatherCondition::Rain);
        assert_eq!(weather_code_to_condition(67), WeatherCondition::FreezingRain);
        assert_eq!(weather_code_to_condition(75), WeatherCondition::Snow);
        assert_eq!(weather_code_to_condition(81), WeatherCondition::Showers);
        assert_eq!(weather_code_to_condition(95), WeatherCondition::Thunderstorm);
        assert_eq!(weather_code_to_condition(-1), WeatherCondition::Unknown);
    }

    #[test]
    fn test_summary_mentions_units_and_condition() {
        let snapshot = WeatherSnapshot::from_json(VALID_RESPONSE).unwrap();
        let summary = snapshot.summary();
        assert!(summary.contains("Partly cloudy"));
        assert!(summary.contains("22.5 °C"));
        assert!(summary.contains("12.5 km/h"));
    }

    #[test]
    fn test_url_formats_coordinates() {
        let client = OpenMeteoClient::new(Duration::from_secs(1))
            .unwrap()
            .with_base_url("http://localhost/forecast");
        assert_eq!(
            client.url_for(59.3293, -18.5),
            "http://localhost/forecast?latitude=59.3293&longitude=-18.5&current_weather=true"
        );
    }

    /// Serves a single canned HTTP response on an ephemeral port
    fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");
        thread::spawn(move || {
            if let Ok((stream, _)) = listener.accept() {
                let mut reader = BufReader::new(stream.try_clone().expect("clone"));
                let mut line = String::new();
                while reader.read_line(&mut line).map(|n| n > 0).unwrap_or(false) {
                    if line == "\r\n" {
                        break;
                    }
                    line.clear();
                }
                let mut stream = stream;
                let _ = stream.write_all(response.as_bytes());
                let _ = stream.flush();
            }
        });
        format!("http://{}/v1/forecast", addr)
    }

    #[test]
    fn test_fetch_returns_body_on_success() {
        let base = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 14\r\nConnection: close\r\n\r\n{\"latitude\":1}",
        );
        let client = OpenMeteoClient::new(Duration::from_secs(5))
            .unwrap()
            .with_base_url(base);

        let body = client.fetch(1.0, 2.0).expect("fetch should succeed");
        assert_eq!(body, "{\"latitude\":1}");
    }

    #[test]
    fn test_fetch_server_error_is_retryable_remote_failure() {
        let base = serve_once(
            "HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        let client = OpenMeteoClient::new(Duration::from_secs(5))
            .unwrap()
            .with_base_url(base);

        let err = client.fetch(1.0, 2.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Remote);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_fetch_client_error_is_not_retryable() {
        let base = serve_once(
            "HTTP/1.1 400 Bad Request\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        let client = OpenMeteoClient::new(Duration::from_secs(5))
            .unwrap()
            .with_base_url(base);

        let err = client.fetch(1.0, 2.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Remote);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_fetch_timeout_is_retryable() {
        // Connections queue in the backlog but nothing ever answers
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let base = format!("http://{}/v1/forecast", listener.local_addr().unwrap());
        let client = OpenMeteoClient::new(Duration::from_millis(200))
            .unwrap()
            .with_base_url(base);

        let err = client.fetch(1.0, 2.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Remote);
        assert!(err.is_retryable());
        drop(listener);
    }
}
