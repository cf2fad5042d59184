//! Wires fetching, formatting, and delivery behind the two trigger shapes.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::error::AlertError;
use crate::format::{format_message, MessageTemplate};
use crate::waqi::Reading;

/// Anything that can produce a current air-quality reading.
#[async_trait]
pub trait ReadingSource: Send + Sync {
    async fn fetch_reading(&self) -> Result<Reading, AlertError>;
}

/// Anything that can deliver a finished message.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn deliver(&self, text: &str) -> Result<(), AlertError>;
}

#[derive(Debug, Clone)]
pub struct AlertPolicy {
    /// Alerts fire only when the index strictly exceeds this.
    pub threshold: u32,
    /// The schedule expression that selects the summary variant.
    pub daily_cron: String,
}

#[derive(Clone)]
pub struct Dispatcher {
    source: Arc<dyn ReadingSource>,
    sink: Arc<dyn AlertSink>,
    policy: AlertPolicy,
}

impl Dispatcher {
    pub fn new(source: Arc<dyn ReadingSource>, sink: Arc<dyn AlertSink>, policy: AlertPolicy) -> Self {
        Self {
            source,
            sink,
            policy,
        }
    }

    /// Diagnostic: fetch and return the current reading.
    pub async fn current_reading(&self) -> Result<Reading, AlertError> {
        self.source.fetch_reading().await
    }

    /// Diagnostic: fetch and send the alert variant, threshold ignored.
    pub async fn send_test_alert(&self) -> Result<(), AlertError> {
        let reading = self.source.fetch_reading().await?;
        let text = format_message(&reading, &MessageTemplate::alert());
        self.sink.deliver(&text).await
    }

    /// Diagnostic: fetch and send the daily summary variant.
    pub async fn send_test_summary(&self) -> Result<(), AlertError> {
        let reading = self.source.fetch_reading().await?;
        let text = format_message(&reading, &MessageTemplate::daily_summary());
        self.sink.deliver(&text).await
    }

    /// Scheduled entry point, keyed off the expression that fired.
    /// Failures are logged and swallowed; the next firing is the retry.
    pub async fn handle_tick(&self, expression: &str) {
        if let Err(e) = self.run_scheduled(expression).await {
            error!(expression, error = %e, "Scheduled dispatch failed");
        }
    }

    async fn run_scheduled(&self, expression: &str) -> Result<(), AlertError> {
        if expression == self.policy.daily_cron {
            let reading = self.source.fetch_reading().await?;
            let text = format_message(&reading, &MessageTemplate::daily_summary());
            self.sink.deliver(&text).await?;
            info!(aqi = reading.aqi, "Daily summary sent");
            return Ok(());
        }

        // Anything else is the hourly tick: alert only above the threshold.
        let reading = self.source.fetch_reading().await?;
        if reading.aqi <= self.policy.threshold {
            debug!(
                aqi = reading.aqi,
                threshold = self.policy.threshold,
                "Index within threshold, no alert"
            );
            return Ok(());
        }

        let text = format_message(&reading, &MessageTemplate::alert());
        self.sink.deliver(&text).await?;
        info!(aqi = reading.aqi, threshold = self.policy.threshold, "Alert sent");
        Ok(())
    }
}
