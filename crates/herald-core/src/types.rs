// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the state store, the pipeline and the adapters.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Identifier of a chat, user or channel as assigned by the messaging platform.
pub type SourceId = i64;

/// Composite `chat_id:message_id` key, the sole identity used for
/// exactly-once alerting.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageKey(pub String);

impl MessageKey {
    /// Builds the key for a message in a chat.
    pub fn new(chat_id: SourceId, message_id: i64) -> Self {
        Self(format!("{chat_id}:{message_id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a message is worth an alert. Variants are listed in priority order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum TriggerKind {
    /// A message in a one-to-one private chat.
    #[serde(rename = "DM")]
    #[strum(serialize = "DM")]
    Dm,
    /// The monitored account was mentioned by handle or by entity.
    Mention,
    /// A reply to a message the monitored account wrote.
    Reply,
}

/// The kind of chat a message arrived in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OriginKind {
    Private,
    Group,
    Supergroup,
    Channel,
}

/// A platform-neutral inbound message event produced by an event source.
///
/// Only incoming events reach the pipeline; outgoing messages of the monitored
/// account are filtered upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedMessage {
    pub chat_id: SourceId,
    pub message_id: i64,
    pub sender_id: SourceId,
    /// Display name of the sender ("First Last" or a channel title).
    #[serde(default)]
    pub sender_name: Option<String>,
    /// Sender handle without the leading `@`.
    #[serde(default)]
    pub sender_username: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    /// User ids referenced by mention entities.
    #[serde(default)]
    pub mentions: BTreeSet<SourceId>,
    #[serde(default)]
    pub reply_to_msg_id: Option<i64>,
    /// Author of the replied-to message when the source already knows it.
    #[serde(default)]
    pub reply_to_sender_id: Option<SourceId>,
    pub origin: OriginKind,
    #[serde(default)]
    pub is_from_self: bool,
    /// Service messages (joins, pins, title changes).
    #[serde(default)]
    pub is_service: bool,
    #[serde(default)]
    pub sender_is_bot: bool,
    #[serde(default)]
    pub chat_title: Option<String>,
    /// Public handle of the chat without the leading `@`.
    #[serde(default)]
    pub chat_username: Option<String>,
    /// Whether the message carries forwardable media (photo, document).
    #[serde(default)]
    pub has_media: bool,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: DateTime<Utc>,
}

impl NormalizedMessage {
    /// The composite dedup key of this message.
    pub fn key(&self) -> MessageKey {
        MessageKey::new(self.chat_id, self.message_id)
    }
}

/// The monitored account, used to recognise mentions and replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfIdentity {
    pub user_id: SourceId,
    /// Handle without the leading `@`.
    pub username: Option<String>,
}

impl SelfIdentity {
    pub fn new(user_id: SourceId, username: Option<String>) -> Self {
        let username = username
            .map(|u| u.trim_start_matches('@').to_string())
            .filter(|u| !u.is_empty());
        Self { user_id, username }
    }

    /// The literal `@handle` searched for in message text.
    pub fn mention_handle(&self) -> Option<String> {
        self.username.as_ref().map(|u| format!("@{u}"))
    }
}

/// A source identifier resolved from a human-entered handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    pub id: SourceId,
    pub display_name: String,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the role an adapter plays around the pipeline.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Source,
    Sink,
}
