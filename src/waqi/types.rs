use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Pollutant codes the bot projects out of the feed, with their display
/// labels, in the order they appear in a message. Every other `iaqi` entry
/// (dew point, pressure, ...) is ignored.
pub const POLLUTANT_CODES: [(&str, &str); 6] = [
    ("pm25", "PM2.5"),
    ("pm10", "PM10"),
    ("o3", "O3"),
    ("no2", "NO2"),
    ("so2", "SO2"),
    ("co", "CO"),
];

// --- Feed envelope ---

#[derive(Debug, Deserialize)]
pub struct FeedResponse {
    pub status: String,
    #[serde(default)]
    pub data: Option<FeedData>,
}

/// `data` is an observation object when `status` is "ok", but a plain
/// message string on error responses ("Invalid key", "Unknown station").
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum FeedData {
    Observation(Box<FeedObservation>),
    Message(String),
}

#[derive(Debug, Deserialize)]
pub struct FeedObservation {
    /// Usually an integer, but the feed sends "-" (a string) or -1 when a
    /// station has no current data, so this stays raw until validated.
    #[serde(default)]
    pub aqi: serde_json::Value,
    #[serde(default)]
    pub city: Option<FeedCity>,
    /// The provider really does spell it "dominentpol".
    #[serde(default, rename = "dominentpol")]
    pub dominant_pollutant: Option<String>,
    #[serde(default)]
    pub iaqi: BTreeMap<String, IaqiEntry>,
    #[serde(default)]
    pub time: Option<FeedTime>,
}

#[derive(Debug, Deserialize)]
pub struct FeedCity {
    #[serde(default)]
    pub name: Option<String>,
}

/// One sub-index or weather value: `{"v": 57.9}`.
#[derive(Debug, Deserialize)]
pub struct IaqiEntry {
    #[serde(default)]
    pub v: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct FeedTime {
    /// Station-local observation time, e.g. "2026-08-22 14:00:00".
    #[serde(default)]
    pub s: Option<String>,
}

// --- Normalized reading (internal, plus the /aqi JSON body) ---

/// One validated air quality observation. Built fresh per fetch, immutable,
/// discarded after the message goes out.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(test, derive(PartialEq))]
pub struct Reading {
    pub aqi: u32,
    pub city: String,
    pub dominant_pollutant: String,
    /// Recognized pollutant code → sub-index value. Only codes from
    /// [`POLLUTANT_CODES`] and only entries that carried a value.
    pub pollutants: BTreeMap<String, f64>,
    pub weather: WeatherSnapshot,
    /// Station-local observation time as the provider reported it.
    pub observed_at: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[cfg_attr(test, derive(PartialEq))]
pub struct WeatherSnapshot {
    pub temperature_c: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub wind_mps: Option<f64>,
}

impl WeatherSnapshot {
    pub fn is_empty(&self) -> bool {
        self.temperature_c.is_none() && self.humidity_pct.is_none() && self.wind_mps.is_none()
    }
}
