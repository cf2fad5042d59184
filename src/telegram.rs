use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::dispatch::AlertSink;
use crate::error::AlertError;

/// Delivers messages via the Telegram Bot API `sendMessage` call.
pub struct TelegramNotifier {
    http: Client,
    bot_token: String,
    chat_id: String,
    thread_id: Option<i64>,
}

impl TelegramNotifier {
    pub fn new(bot_token: String, chat_id: String, thread_id: Option<i64>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            bot_token,
            chat_id,
            thread_id,
        })
    }
}

/// Request body for `sendMessage`. The thread id is only present when
/// the message targets a forum topic.
fn build_payload(chat_id: &str, thread_id: Option<i64>, text: &str) -> serde_json::Value {
    let mut body = serde_json::json!({
        "chat_id": chat_id,
        "text": text,
        "parse_mode": "HTML",
    });
    if let Some(thread) = thread_id {
        body["message_thread_id"] = serde_json::json!(thread);
    }
    body
}

#[async_trait]
impl AlertSink for TelegramNotifier {
    /// Blank messages are rejected before any network traffic happens.
    async fn deliver(&self, text: &str) -> Result<(), AlertError> {
        if text.trim().is_empty() {
            return Err(AlertError::EmptyMessage);
        }

        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.bot_token);
        let body = build_payload(&self.chat_id, self.thread_id, text);

        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AlertError::Delivery {
                status: 0,
                body: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AlertError::Delivery {
                status: status.as_u16(),
                body,
            });
        }

        debug!(chat_id = %self.chat_id, "Telegram message sent");
        Ok(())
    }
}
