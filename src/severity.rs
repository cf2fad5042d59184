/// One bracket of the AQI scale with its display bits and health guidance.
#[derive(Debug)]
pub struct SeverityTier {
    /// Inclusive upper bound of the bracket; `None` for the open-ended last tier.
    pub max: Option<u32>,
    pub label: &'static str,
    pub emoji: &'static str,
    pub advisory: &'static str,
}

/// US EPA AQI brackets in ascending order. The table partitions [0, ∞):
/// each tier starts one past the previous bound and the last is unbounded.
/// Source: https://www.airnow.gov/aqi/aqi-basics/
pub static TIERS: [SeverityTier; 6] = [
    SeverityTier {
        max: Some(50),
        label: "Good",
        emoji: "🟢",
        advisory: "Air quality is satisfactory, and air pollution poses little or no risk.",
    },
    SeverityTier {
        max: Some(100),
        label: "Moderate",
        emoji: "🟡",
        advisory: "Air quality is acceptable. However, there may be a risk for some people, \
                   particularly those who are unusually sensitive to air pollution.",
    },
    SeverityTier {
        max: Some(150),
        label: "Unhealthy for Sensitive Groups",
        emoji: "🟠",
        advisory: "Members of sensitive groups may experience health effects. The general \
                   public is less likely to be affected.",
    },
    SeverityTier {
        max: Some(200),
        label: "Unhealthy",
        emoji: "🔴",
        advisory: "Some members of the general public may experience health effects; \
                   members of sensitive groups may experience more serious health effects.",
    },
    SeverityTier {
        max: Some(300),
        label: "Very Unhealthy",
        emoji: "🟣",
        advisory: "Health alert: the risk of health effects is increased for everyone.",
    },
    SeverityTier {
        max: None,
        label: "Hazardous",
        emoji: "🟤",
        advisory: "Health warning of emergency conditions: everyone is more likely to be affected.",
    },
];

/// Map an AQI value to its severity tier: first tier whose bound admits the
/// value wins. The last tier is unbounded, so the scan always matches; the
/// fallback only exists to keep the lookup total if the table ever changes.
pub fn classify(aqi: u32) -> &'static SeverityTier {
    TIERS
        .iter()
        .find(|tier| tier.max.map_or(true, |max| aqi <= max))
        .unwrap_or(&TIERS[TIERS.len() - 1])
}
