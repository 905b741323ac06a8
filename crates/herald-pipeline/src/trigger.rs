// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trigger classification.
//!
//! Decides whether a message concerns the monitored account and why. Rules
//! are checked in a fixed order and the first match wins, so a DM that also
//! contains `@handle` is a DM, and a mention that is also a reply is a
//! mention.

use herald_core::traits::ReplyLookup;
use herald_core::{NormalizedMessage, OriginKind, SelfIdentity, TriggerKind};
use tracing::{debug, warn};

/// Result of the checks that need no platform round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalVerdict {
    Decided(Option<TriggerKind>),
    /// Only the author of the replied-to message can settle it.
    NeedsReplyAuthor { reply_to_msg_id: i64 },
}

#[derive(Debug, Clone)]
pub struct TriggerClassifier {
    identity: SelfIdentity,
}

impl TriggerClassifier {
    pub fn new(identity: SelfIdentity) -> Self {
        Self { identity }
    }

    pub fn identity(&self) -> &SelfIdentity {
        &self.identity
    }

    /// Every rule that can be decided from the message alone.
    pub fn classify_local(&self, msg: &NormalizedMessage) -> LocalVerdict {
        if msg.is_service {
            return LocalVerdict::Decided(None);
        }
        if msg.is_from_self || msg.sender_id == self.identity.user_id {
            return LocalVerdict::Decided(None);
        }
        // Bots include the notifier's own bot; alerting on them would loop.
        if msg.sender_is_bot {
            return LocalVerdict::Decided(None);
        }
        if msg.origin == OriginKind::Private {
            return LocalVerdict::Decided(Some(TriggerKind::Dm));
        }
        if self.is_mentioned(msg) {
            return LocalVerdict::Decided(Some(TriggerKind::Mention));
        }

        match (msg.reply_to_msg_id, msg.reply_to_sender_id) {
            (None, _) => LocalVerdict::Decided(None),
            (Some(_), Some(author)) => LocalVerdict::Decided(
                (author == self.identity.user_id).then_some(TriggerKind::Reply),
            ),
            (Some(reply_to_msg_id), None) => LocalVerdict::NeedsReplyAuthor { reply_to_msg_id },
        }
    }

    /// Full classification. A failed reply lookup counts as "not a reply".
    pub async fn classify(
        &self,
        msg: &NormalizedMessage,
        lookup: &dyn ReplyLookup,
    ) -> Option<TriggerKind> {
        match self.classify_local(msg) {
            LocalVerdict::Decided(kind) => kind,
            LocalVerdict::NeedsReplyAuthor { reply_to_msg_id } => {
                match lookup.reply_author(msg.chat_id, reply_to_msg_id).await {
                    Ok(Some(author)) if author == self.identity.user_id => Some(TriggerKind::Reply),
                    Ok(_) => None,
                    Err(e) => {
                        warn!(
                            key = %msg.key(),
                            reply_to = reply_to_msg_id,
                            error = %e,
                            "failed to fetch replied-to message, treating as not a reply"
                        );
                        None
                    }
                }
            }
        }
    }

    fn is_mentioned(&self, msg: &NormalizedMessage) -> bool {
        if msg.mentions.contains(&self.identity.user_id) {
            return true;
        }
        match (self.identity.mention_handle(), msg.text.as_deref()) {
            (Some(handle), Some(text)) if text.contains(&handle) => {
                debug!(key = %msg.key(), "handle mention in text");
                true
            }
            _ => false,
        }
    }
}
