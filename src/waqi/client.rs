use std::collections::BTreeMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::types::{FeedData, FeedResponse, Reading, WeatherSnapshot, POLLUTANT_CODES};
use crate::dispatch::ReadingSource;
use crate::error::AlertError;

#[derive(Clone)]
pub struct WaqiClient {
    http: Client,
    base_url: String,
    location: String,
    token: String,
}

impl WaqiClient {
    pub fn new(base_url: String, location: String, token: String) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url,
            location,
            token,
        })
    }
}

#[async_trait]
impl ReadingSource for WaqiClient {
    /// Fetch the current observation for the configured location.
    /// One GET, no retry; the next trigger is the retry.
    async fn fetch_reading(&self) -> Result<Reading, AlertError> {
        let url = format!("{}/feed/{}/?token={}", self.base_url, self.location, self.token);

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| AlertError::Fetch(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AlertError::Fetch(format!(
                "GET /feed/{} returned {}: {}",
                self.location, status, body
            )));
        }

        let feed: FeedResponse = resp
            .json()
            .await
            .map_err(|e| AlertError::Schema(e.to_string()))?;

        debug!(location = %self.location, "Fetched air quality feed");
        reading_from_feed(feed)
    }
}

/// Validate a feed envelope and project it into a [`Reading`].
///
/// Checks run in order: provider status, required city name, usable AQI.
/// Only the six recognized pollutant codes and the t/h/w weather entries
/// survive projection; everything else in `iaqi` is dropped.
pub fn reading_from_feed(feed: FeedResponse) -> Result<Reading, AlertError> {
    if feed.status != "ok" {
        let detail = match feed.data {
            Some(FeedData::Message(msg)) => format!("{}: {}", feed.status, msg),
            _ => feed.status,
        };
        return Err(AlertError::ApiStatus(detail));
    }

    let obs = match feed.data {
        Some(FeedData::Observation(obs)) => obs,
        _ => {
            return Err(AlertError::Schema(
                "feed data is not an observation object".to_string(),
            ))
        }
    };

    let city = obs
        .city
        .as_ref()
        .and_then(|city| city.name.clone())
        .ok_or_else(|| AlertError::Schema("missing city name in feed".to_string()))?;

    let aqi = match obs.aqi.as_f64() {
        Some(value) if value >= 0.0 => value as u32,
        _ => return Err(AlertError::InvalidIndex(obs.aqi.to_string())),
    };

    let mut pollutants = BTreeMap::new();
    for (code, _) in POLLUTANT_CODES {
        if let Some(value) = obs.iaqi.get(code).and_then(|entry| entry.v) {
            pollutants.insert(code.to_string(), value);
        }
    }

    let weather = WeatherSnapshot {
        temperature_c: obs.iaqi.get("t").and_then(|entry| entry.v),
        humidity_pct: obs.iaqi.get("h").and_then(|entry| entry.v),
        wind_mps: obs.iaqi.get("w").and_then(|entry| entry.v),
    };

    let observed_at = obs
        .time
        .and_then(|time| time.s)
        .unwrap_or_else(|| "unknown".to_string());

    Ok(Reading {
        aqi,
        city,
        dominant_pollutant: obs.dominant_pollutant.unwrap_or_default(),
        pollutants,
        weather,
        observed_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(json: &str) -> FeedResponse {
        serde_json::from_str(json).expect("test body should deserialize")
    }

    #[test]
    fn test_projects_full_feed() {
        let reading =
            reading_from_feed(feed(include_str!("../../tests/fixtures/feed_ok.json"))).unwrap();

        assert_eq!(reading.aqi, 156);
        assert_eq!(reading.city, "Ulaanbaatar");
        assert_eq!(reading.dominant_pollutant, "pm25");
        assert_eq!(reading.observed_at, "2026-08-21 09:00:00");

        // All six recognized codes present, nothing else.
        assert_eq!(reading.pollutants.len(), 6);
        assert_eq!(reading.pollutants["pm25"], 156.0);
        assert_eq!(reading.pollutants["co"], 7.2);
        assert!(!reading.pollutants.contains_key("p"), "pressure is not a pollutant");
        assert!(!reading.pollutants.contains_key("dew"));

        assert_eq!(reading.weather.temperature_c, Some(-2.0));
        assert_eq!(reading.weather.humidity_pct, Some(67.0));
        assert_eq!(reading.weather.wind_mps, Some(3.6));
    }

    #[test]
    fn test_rejects_negative_index() {
        // -1 is the provider's "no data right now" sentinel.
        let err = reading_from_feed(feed(include_str!(
            "../../tests/fixtures/feed_no_data.json"
        )))
        .unwrap_err();
        assert!(matches!(err, AlertError::InvalidIndex(_)), "got {err:?}");
    }

    #[test]
    fn test_rejects_non_numeric_index() {
        let body = r#"{"status":"ok","data":{"aqi":"-","city":{"name":"Somewhere"}}}"#;
        let err = reading_from_feed(feed(body)).unwrap_err();
        assert!(matches!(err, AlertError::InvalidIndex(_)), "got {err:?}");

        let body = r#"{"status":"ok","data":{"city":{"name":"Somewhere"}}}"#;
        let err = reading_from_feed(feed(body)).unwrap_err();
        assert!(matches!(err, AlertError::InvalidIndex(_)), "absent aqi, got {err:?}");
    }

    #[test]
    fn test_zero_index_is_valid() {
        let body = r#"{"status":"ok","data":{"aqi":0,"city":{"name":"Fresh Meadows"}}}"#;
        let reading = reading_from_feed(feed(body)).unwrap();
        assert_eq!(reading.aqi, 0);
    }

    #[test]
    fn test_rejects_provider_error_status() {
        // HTTP 200 with an error envelope still fails.
        let err = reading_from_feed(feed(include_str!(
            "../../tests/fixtures/feed_error_status.json"
        )))
        .unwrap_err();
        match err {
            AlertError::ApiStatus(detail) => assert!(detail.contains("Invalid key")),
            other => panic!("expected ApiStatus, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_missing_city_name() {
        let body = r#"{"status":"ok","data":{"aqi":42}}"#;
        let err = reading_from_feed(feed(body)).unwrap_err();
        assert!(matches!(err, AlertError::Schema(_)), "got {err:?}");

        let body = r#"{"status":"ok","data":{"aqi":42,"city":{}}}"#;
        let err = reading_from_feed(feed(body)).unwrap_err();
        assert!(matches!(err, AlertError::Schema(_)), "got {err:?}");
    }

    #[test]
    fn test_rejects_ok_status_without_observation() {
        let body = r#"{"status":"ok","data":"nothing here"}"#;
        let err = reading_from_feed(feed(body)).unwrap_err();
        assert!(matches!(err, AlertError::Schema(_)), "got {err:?}");

        let body = r#"{"status":"ok"}"#;
        let err = reading_from_feed(feed(body)).unwrap_err();
        assert!(matches!(err, AlertError::Schema(_)), "got {err:?}");
    }

    #[test]
    fn test_missing_time_defaults_to_unknown() {
        let body = r#"{"status":"ok","data":{"aqi":12,"city":{"name":"Somewhere"}}}"#;
        let reading = reading_from_feed(feed(body)).unwrap();
        assert_eq!(reading.observed_at, "unknown");
    }

    #[test]
    fn test_pollutants_without_values_are_omitted() {
        let body = r#"{"status":"ok","data":{
            "aqi":30,
            "city":{"name":"Somewhere"},
            "iaqi":{"pm25":{"v":30},"o3":{},"no2":{"v":null}}
        }}"#;
        let reading = reading_from_feed(feed(body)).unwrap();
        assert_eq!(reading.pollutants.len(), 1);
        assert_eq!(reading.pollutants["pm25"], 30.0);
    }
}
