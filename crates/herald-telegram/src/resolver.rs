// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Platform lookups backed by the Bot API.

use async_trait::async_trait;
use herald_core::traits::{ReplyLookup, SourceResolver};
use herald_core::{HeraldError, ResolvedSource, SourceId};
use teloxide::prelude::*;
use teloxide::types::Recipient;
use tracing::{debug, warn};

use crate::redact::redact;

/// Resolves `@handle` through `getChat`.
///
/// The Bot API only resolves public groups and channels by handle. Users are
/// added by numeric id, which the command layer accepts without a lookup.
pub struct TelegramResolver {
    bot: Bot,
    token: String,
}

impl TelegramResolver {
    pub fn new(bot: Bot, token: impl Into<String>) -> Self {
        Self {
            bot,
            token: token.into(),
        }
    }
}

#[async_trait]
impl SourceResolver for TelegramResolver {
    async fn resolve(&self, identifier: &str) -> Result<ResolvedSource, HeraldError> {
        let handle = identifier.trim().trim_start_matches('@');
        if handle.is_empty() {
            return Err(HeraldError::Resolution {
                identifier: identifier.to_string(),
                message: "empty handle".into(),
            });
        }

        let chat = self
            .bot
            .get_chat(Recipient::ChannelUsername(format!("@{handle}")))
            .await
            .map_err(|e| {
                let message = redact(&e.to_string(), &self.token);
                warn!(identifier, error = %message, "failed to resolve handle");
                HeraldError::Resolution {
                    identifier: identifier.to_string(),
                    message,
                }
            })?;

        let resolved = ResolvedSource {
            id: chat.id.0,
            display_name: display_name(
                chat.title(),
                chat.first_name(),
                chat.last_name(),
                chat.username(),
                handle,
            ),
        };
        debug!(identifier, id = resolved.id, "resolved handle");
        Ok(resolved)
    }
}

/// Title for chats, first and last name for users, with `(@username)` when
/// known. Falls back to the handle that was looked up.
pub fn display_name(
    title: Option<&str>,
    first_name: Option<&str>,
    last_name: Option<&str>,
    username: Option<&str>,
    fallback: &str,
) -> String {
    let mut name = match (title, first_name) {
        (Some(title), _) => title.to_string(),
        (None, Some(first)) => match last_name.filter(|l| !l.is_empty()) {
            Some(last) => format!("{first} {last}"),
            None => first.to_string(),
        },
        (None, None) => fallback.to_string(),
    };
    if let Some(username) = username.filter(|u| !u.is_empty()) {
        name.push_str(&format!(" (@{username})"));
    }
    name
}

/// Reply lookup for the Bot API, which cannot fetch arbitrary messages.
///
/// Event sources are expected to fill `reply_to_sender_id`; anything left
/// unresolved counts as "not a reply to me".
#[derive(Debug, Default)]
pub struct UnresolvedReplies;

#[async_trait]
impl ReplyLookup for UnresolvedReplies {
    async fn reply_author(
        &self,
        chat_id: SourceId,
        message_id: i64,
    ) -> Result<Option<SourceId>, HeraldError> {
        debug!(chat_id, message_id, "reply author unknown to the event source");
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_title_with_username() {
        assert_eq!(
            display_name(Some("Rust Users"), None, None, Some("rustusers"), "rustusers"),
            "Rust Users (@rustusers)"
        );
    }

    #[test]
    fn user_full_name() {
        assert_eq!(
            display_name(None, Some("Ada"), Some("Lovelace"), None, "ada"),
            "Ada Lovelace"
        );
        assert_eq!(display_name(None, Some("Ada"), Some(""), None, "ada"), "Ada");
    }

    #[test]
    fn falls_back_to_handle() {
        assert_eq!(display_name(None, None, None, None, "mystery"), "mystery");
    }

    #[tokio::test]
    async fn unresolved_replies_answer_none() {
        assert_eq!(UnresolvedReplies.reply_author(-5, 1).await.unwrap(), None);
    }
}
