// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Herald priority notifier.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key is
//! reported at startup instead of being silently ignored.

use serde::{Deserialize, Serialize};

/// Top-level Herald configuration.
///
/// Every section is optional and defaults to sensible values; the keys that
/// `herald serve` cannot run without are checked by
/// [`validate_for_serve`](crate::validation::validate_for_serve).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HeraldConfig {
    /// Process-level settings.
    #[serde(default)]
    pub notifier: NotifierConfig,

    /// The monitored account.
    #[serde(default)]
    pub account: AccountConfig,

    /// Telegram Bot API settings for alert delivery and commands.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// State file and retention settings.
    #[serde(default)]
    pub state: StateConfig,

    /// Alert sink retry and pacing.
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Where inbound events are read from.
    #[serde(default)]
    pub source: SourceConfig,
}

/// Process-level settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NotifierConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Seconds between heartbeat log lines with pipeline counters.
    #[serde(default = "default_heartbeat_interval_secs")]
    pub heartbeat_interval_secs: u64,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            heartbeat_interval_secs: default_heartbeat_interval_secs(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_heartbeat_interval_secs() -> u64 {
    3600
}

/// The account whose DMs, mentions and replies are monitored.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AccountConfig {
    /// Numeric user id of the monitored account. Required by `herald serve`.
    #[serde(default)]
    pub user_id: Option<i64>,

    /// Handle of the monitored account, with or without `@`.
    #[serde(default)]
    pub username: Option<String>,
}

/// Telegram Bot API configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Bot API token used to deliver alerts and receive commands.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Chat that receives alerts.
    #[serde(default)]
    pub chat_id: Option<i64>,

    /// User allowed to issue bot commands. Defaults to `chat_id`.
    #[serde(default)]
    pub owner_id: Option<i64>,
}

impl TelegramConfig {
    /// The user allowed to issue commands.
    pub fn effective_owner_id(&self) -> Option<i64> {
        self.owner_id.or(self.chat_id)
    }
}

/// State file and retention configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StateConfig {
    /// Path to the JSON state file.
    #[serde(default = "default_state_path")]
    pub path: String,

    /// Days a processed-message record is kept before the cleanup sweep drops it.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,

    /// Minimum hours between two cleanup sweeps.
    #[serde(default = "default_cleanup_interval_hours")]
    pub cleanup_interval_hours: u32,

    /// Maximum number of alerts held while snoozed in queue mode.
    #[serde(default = "default_queue_limit")]
    pub queue_limit: usize,

    /// Queue occupancy ratio at which a warning is logged.
    #[serde(default = "default_queue_warn_ratio")]
    pub queue_warn_ratio: f64,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            path: default_state_path(),
            retention_days: default_retention_days(),
            cleanup_interval_hours: default_cleanup_interval_hours(),
            queue_limit: default_queue_limit(),
            queue_warn_ratio: default_queue_warn_ratio(),
        }
    }
}

fn default_state_path() -> String {
    "state.json".to_string()
}

fn default_retention_days() -> u32 {
    30
}

fn default_cleanup_interval_hours() -> u32 {
    24
}

fn default_queue_limit() -> usize {
    100
}

fn default_queue_warn_ratio() -> f64 {
    0.8
}

/// Alert delivery configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DeliveryConfig {
    /// Attempts per alert before the sink gives up.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Minimum milliseconds between two sends.
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            min_interval_ms: default_min_interval_ms(),
        }
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_min_interval_ms() -> u64 {
    1000
}

/// Inbound event configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    /// JSON Lines file of normalized events, or `-` for stdin.
    #[serde(default = "default_events")]
    pub events: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            events: default_events(),
        }
    }
}

fn default_events() -> String {
    "-".to_string()
}
