// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Alert delivery through the Telegram Bot API.
//!
//! Sends are serialized and spaced at least `min_interval` apart. A failed
//! send is retried up to `max_retries` attempts in total, waiting `2^attempt`
//! seconds between attempts, or the server's `retry_after` when Telegram
//! rate-limits the bot.

use std::time::Duration;

use async_trait::async_trait;
use herald_config::model::{DeliveryConfig, TelegramConfig};
use herald_core::traits::{AlertSink, PluginAdapter};
use herald_core::{AdapterType, HealthStatus, HeraldError};
use teloxide::RequestError;
use teloxide::prelude::*;
use teloxide::types::{ChatId, LinkPreviewOptions, ParseMode};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::redact::redact;

pub struct TelegramSink {
    bot: Bot,
    token: String,
    chat_id: ChatId,
    max_retries: u32,
    min_interval: Duration,
    /// Held for the duration of a send; records when the last one finished.
    last_sent: Mutex<Option<Instant>>,
}

impl TelegramSink {
    /// Requires `telegram.bot_token` and `telegram.chat_id`.
    pub fn new(config: &TelegramConfig, delivery: &DeliveryConfig) -> Result<Self, HeraldError> {
        let token = config
            .bot_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| HeraldError::Config("telegram.bot_token is required".into()))?;
        let chat_id = config
            .chat_id
            .ok_or_else(|| HeraldError::Config("telegram.chat_id is required".into()))?;

        Ok(Self {
            bot: Bot::new(token),
            token: token.to_string(),
            chat_id: ChatId(chat_id),
            max_retries: delivery.max_retries.max(1),
            min_interval: Duration::from_millis(delivery.min_interval_ms),
            last_sent: Mutex::new(None),
        })
    }

    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    async fn send_once(&self, text: &str) -> Result<(), RequestError> {
        self.bot
            .send_message(self.chat_id, text)
            .parse_mode(ParseMode::Html)
            .link_preview_options(no_preview())
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl PluginAdapter for TelegramSink {
    fn name(&self) -> &str {
        "telegram"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Sink
    }

    async fn health_check(&self) -> Result<HealthStatus, HeraldError> {
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {}",
                redact(&e.to_string(), &self.token)
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), HeraldError> {
        debug!("Telegram sink shutting down");
        Ok(())
    }
}

#[async_trait]
impl AlertSink for TelegramSink {
    async fn deliver(&self, text: &str) -> Result<(), HeraldError> {
        let mut last_sent = self.last_sent.lock().await;
        if let Some(wait) = pacing_delay(*last_sent, self.min_interval, Instant::now()) {
            debug!(wait_ms = wait.as_millis() as u64, "rate limiting alert");
            tokio::time::sleep(wait).await;
        }

        let mut last_error = String::new();
        for attempt in 0..self.max_retries {
            let result = self.send_once(text).await;
            *last_sent = Some(Instant::now());

            let err = match result {
                Ok(()) => {
                    info!(attempt = attempt + 1, "alert sent");
                    return Ok(());
                }
                Err(e) => e,
            };
            last_error = redact(&err.to_string(), &self.token);
            metrics::counter!("herald_sink_retries_total").increment(1);

            if attempt + 1 == self.max_retries {
                break;
            }
            let wait = match &err {
                RequestError::RetryAfter(after) => after.duration(),
                _ => backoff(attempt),
            };
            warn!(
                attempt = attempt + 1,
                max = self.max_retries,
                wait_secs = wait.as_secs(),
                error = %last_error,
                "alert send failed, retrying"
            );
            tokio::time::sleep(wait).await;
        }

        Err(HeraldError::Sink {
            message: format!(
                "failed to send alert after {} attempts: {last_error}",
                self.max_retries
            ),
            source: None,
        })
    }
}

fn no_preview() -> LinkPreviewOptions {
    LinkPreviewOptions {
        is_disabled: true,
        url: None,
        prefer_small_media: false,
        prefer_large_media: false,
        show_above_text: false,
    }
}

/// Wait before attempt `attempt + 1`: 1s, 2s, 4s, ...
fn backoff(attempt: u32) -> Duration {
    Duration::from_secs(1u64 << attempt.min(6))
}

/// How long to wait so that sends stay `min_interval` apart.
fn pacing_delay(last: Option<Instant>, min_interval: Duration, now: Instant) -> Option<Duration> {
    let elapsed = now.saturating_duration_since(last?);
    (elapsed < min_interval).then(|| min_interval - elapsed)
}
