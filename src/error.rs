//! Error types for the alert pipeline.

use thiserror::Error;

/// Everything that can go wrong between a trigger firing and a message landing.
#[derive(Debug, Error)]
pub enum AlertError {
    /// The air quality provider could not be reached, or answered with a
    /// failing HTTP status.
    #[error("air quality fetch failed: {0}")]
    Fetch(String),

    /// The provider answered 200 but flagged the request as unsuccessful
    /// in its own status field (bad token, unknown station, ...).
    #[error("air quality provider reported \"{0}\"")]
    ApiStatus(String),

    /// The response body did not have the expected feed shape.
    #[error("malformed air quality response: {0}")]
    Schema(String),

    /// The AQI value was absent, non-numeric, or negative. The provider
    /// encodes "station has no data right now" as -1.
    #[error("no usable AQI in response (provider sent {0})")]
    InvalidIndex(String),

    /// Empty or whitespace-only message; delivery is never attempted.
    #[error("refusing to send an empty message")]
    EmptyMessage,

    /// Telegram rejected the message, or no response arrived at all
    /// (status 0 means the request never produced an HTTP status).
    #[error("telegram delivery failed with status {status}: {body}")]
    Delivery { status: u16, body: String },
}
