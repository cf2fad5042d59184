//! Renders a reading into Telegram-ready HTML.

use std::collections::BTreeMap;

use crate::severity;
use crate::waqi::types::{Reading, WeatherSnapshot, POLLUTANT_CODES};

/// Presentation template for one notification variant.
#[derive(Debug, Clone)]
pub struct MessageTemplate {
    pub marker: &'static str,
    pub title: &'static str,
    pub index_label: &'static str,
    pub footer: Option<&'static str>,
}

impl MessageTemplate {
    pub fn alert() -> Self {
        Self {
            marker: "⚠️",
            title: "Air Quality Alert",
            index_label: "AQI",
            footer: None,
        }
    }

    pub fn daily_summary() -> Self {
        Self {
            marker: "📊",
            title: "Daily Air Quality Summary",
            index_label: "Current AQI",
            footer: Some("Stay informed, breathe safe!"),
        }
    }
}

/// Render a reading under the given template. Pure; same inputs always
/// produce the same string.
pub fn format_message(reading: &Reading, template: &MessageTemplate) -> String {
    let tier = severity::classify(reading.aqi);

    let mut sections = Vec::new();

    sections.push(format!("{} <b>{}</b>", template.marker, template.title));
    sections.push(format!(
        "<b>{}: {}</b> - {} {}",
        template.index_label, reading.aqi, tier.label, tier.emoji
    ));

    let mut pollutant_block = String::from("<b>Pollutants:</b>");
    let lines = pollutant_lines(&reading.pollutants);
    if lines.is_empty() {
        pollutant_block.push_str("\nno data available");
    } else {
        for line in &lines {
            pollutant_block.push('\n');
            pollutant_block.push_str(line);
        }
    }
    sections.push(pollutant_block);

    sections.push(format!("<b>Health advisory:</b>\n{}", tier.advisory));

    if let Some(weather) = weather_line(&reading.weather) {
        sections.push(weather);
    }

    if let Some(footer) = template.footer {
        sections.push(footer.to_string());
    }

    sections.push(format!("🕐 {}", reading.observed_at));

    sections.join("\n\n")
}

/// One bullet per pollutant: recognized codes first in display order
/// under their canonical labels, anything else after under its raw code.
fn pollutant_lines(pollutants: &BTreeMap<String, f64>) -> Vec<String> {
    let mut lines = Vec::new();
    for (code, label) in POLLUTANT_CODES {
        if let Some(value) = pollutants.get(code) {
            lines.push(format!("• {label}: {value}"));
        }
    }
    for (code, value) in pollutants {
        if POLLUTANT_CODES.iter().all(|(known, _)| known != code) {
            lines.push(format!("• {code}: {value}"));
        }
    }
    lines
}

fn weather_line(weather: &WeatherSnapshot) -> Option<String> {
    if weather.is_empty() {
        return None;
    }
    let mut parts = Vec::new();
    if let Some(t) = weather.temperature_c {
        parts.push(format!("🌡 {t}°C"));
    }
    if let Some(h) = weather.humidity_pct {
        parts.push(format!("💧 {h}%"));
    }
    if let Some(w) = weather.wind_mps {
        parts.push(format!("💨 {w} m/s"));
    }
    Some(parts.join(" | "))
}
