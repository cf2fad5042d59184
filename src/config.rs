use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub station: StationConfig,
    #[serde(default)]
    pub alert: AlertConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize)]
pub struct StationConfig {
    /// City name or station id as the feed API understands it.
    pub location: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    "https://api.waqi.info".to_string()
}

#[derive(Debug, Deserialize)]
pub struct AlertConfig {
    #[serde(default = "default_threshold")]
    pub threshold: u32,
}

fn default_threshold() -> u32 {
    100
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_hourly_cron")]
    pub hourly_cron: String,
    #[serde(default = "default_daily_cron")]
    pub daily_cron: String,
}

fn default_hourly_cron() -> String {
    "0 * * * *".to_string()
}

fn default_daily_cron() -> String {
    "0 21 * * *".to_string()
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            hourly_cron: default_hourly_cron(),
            daily_cron: default_daily_cron(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        let content =
            std::fs::read_to_string("config.toml").context("Failed to read config.toml")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config.toml")?;
        Ok(config)
    }
}

/// Secrets live in the environment or .env, never in config.toml.
#[derive(Debug)]
pub struct Secrets {
    pub waqi_token: String,
    pub bot_token: String,
    pub chat_id: String,
    pub thread_id: Option<i64>,
}

impl Secrets {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            waqi_token: require("WAQI_TOKEN")?,
            bot_token: require("TELEGRAM_BOT_TOKEN")?,
            chat_id: require("TELEGRAM_CHAT_ID")?,
            thread_id: thread_id_from_env(),
        })
    }
}

fn require(name: &str) -> Result<String> {
    std::env::var(name).with_context(|| format!("{name} not set in environment or .env"))
}

fn thread_id_from_env() -> Option<i64> {
    let raw = std::env::var("TELEGRAM_THREAD_ID").ok()?;
    match raw.parse() {
        Ok(id) => Some(id),
        Err(_) => {
            warn!("TELEGRAM_THREAD_ID {raw:?} is not an integer, ignoring");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [station]
            location = "ulaanbaatar"
            "#,
        )
        .unwrap();

        assert_eq!(config.station.location, "ulaanbaatar");
        assert_eq!(config.station.base_url, "https://api.waqi.info");
        assert_eq!(config.alert.threshold, 100);
        assert_eq!(config.schedule.hourly_cron, "0 * * * *");
        assert_eq!(config.schedule.daily_cron, "0 21 * * *");
        assert_eq!(config.server.bind_addr, "0.0.0.0:8080");
    }

    #[test]
    fn test_explicit_values_override_defaults() {
        let config: Config = toml::from_str(
            r#"
            [station]
            location = "beijing"
            base_url = "http://localhost:9090"

            [alert]
            threshold = 150

            [schedule]
            daily_cron = "30 20 * * *"

            [server]
            bind_addr = "127.0.0.1:3000"
            "#,
        )
        .unwrap();

        assert_eq!(config.station.base_url, "http://localhost:9090");
        assert_eq!(config.alert.threshold, 150);
        assert_eq!(config.schedule.hourly_cron, "0 * * * *");
        assert_eq!(config.schedule.daily_cron, "30 20 * * *");
        assert_eq!(config.server.bind_addr, "127.0.0.1:3000");
    }

    #[test]
    fn test_location_is_required() {
        assert!(toml::from_str::<Config>("[station]\n").is_err());
        assert!(toml::from_str::<Config>("").is_err());
    }
}
