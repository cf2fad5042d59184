//! Client for the World Air Quality Index feed API.

pub mod client;
pub mod types;

pub use client::WaqiClient;
pub use types::{Reading, WeatherSnapshot};
