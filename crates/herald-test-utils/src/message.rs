// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builder for [`NormalizedMessage`] fixtures.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use herald_core::{NormalizedMessage, OriginKind, SourceId};

/// Fluent construction of test messages with sensible defaults.
///
/// Defaults: sender 99 named "Test Sender", text "hello", timestamp
/// 2023-11-14 22:13:20 UTC.
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    msg: NormalizedMessage,
}

impl MessageBuilder {
    pub fn new(origin: OriginKind, chat_id: SourceId, message_id: i64) -> Self {
        Self {
            msg: NormalizedMessage {
                chat_id,
                message_id,
                sender_id: 99,
                sender_name: Some("Test Sender".to_string()),
                sender_username: None,
                text: Some("hello".to_string()),
                mentions: BTreeSet::new(),
                reply_to_msg_id: None,
                reply_to_sender_id: None,
                origin,
                is_from_self: false,
                is_service: false,
                sender_is_bot: false,
                chat_title: None,
                chat_username: None,
                has_media: false,
                timestamp: DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default(),
            },
        }
    }

    /// A one-to-one chat; the chat id is the sender id.
    pub fn private(chat_id: SourceId, message_id: i64) -> Self {
        Self::new(OriginKind::Private, chat_id, message_id).sender(chat_id)
    }

    pub fn group(chat_id: SourceId, message_id: i64) -> Self {
        Self::new(OriginKind::Group, chat_id, message_id).chat_title("Test Group")
    }

    pub fn supergroup(chat_id: SourceId, message_id: i64) -> Self {
        Self::new(OriginKind::Supergroup, chat_id, message_id).chat_title("Test Supergroup")
    }

    pub fn sender(mut self, id: SourceId) -> Self {
        self.msg.sender_id = id;
        self
    }

    pub fn sender_name(mut self, name: &str) -> Self {
        self.msg.sender_name = Some(name.to_string());
        self
    }

    pub fn sender_username(mut self, username: &str) -> Self {
        self.msg.sender_username = Some(username.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.msg.text = Some(text.to_string());
        self
    }

    pub fn no_text(mut self) -> Self {
        self.msg.text = None;
        self
    }

    pub fn mention(mut self, user_id: SourceId) -> Self {
        self.msg.mentions.insert(user_id);
        self
    }

    pub fn reply_to(mut self, message_id: i64) -> Self {
        self.msg.reply_to_msg_id = Some(message_id);
        self
    }

    /// Reply whose author the source already knows.
    pub fn reply_to_author(mut self, message_id: i64, author: SourceId) -> Self {
        self.msg.reply_to_msg_id = Some(message_id);
        self.msg.reply_to_sender_id = Some(author);
        self
    }

    pub fn from_self(mut self) -> Self {
        self.msg.is_from_self = true;
        self
    }

    pub fn service(mut self) -> Self {
        self.msg.is_service = true;
        self
    }

    pub fn bot(mut self) -> Self {
        self.msg.sender_is_bot = true;
        self
    }

    pub fn chat_title(mut self, title: &str) -> Self {
        self.msg.chat_title = Some(title.to_string());
        self
    }

    pub fn chat_username(mut self, username: &str) -> Self {
        self.msg.chat_username = Some(username.to_string());
        self
    }

    pub fn media(mut self) -> Self {
        self.msg.has_media = true;
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.msg.timestamp = timestamp;
        self
    }

    pub fn build(self) -> NormalizedMessage {
        self.msg
    }
}
