// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event source trait and the capabilities it lends to the classifier.

use async_trait::async_trait;

use crate::error::HeraldError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{NormalizedMessage, ResolvedSource, SourceId};

/// Produces normalized inbound message events.
#[async_trait]
pub trait EventSource: PluginAdapter {
    /// Returns the next event, or `None` once the source is exhausted.
    async fn next_event(&mut self) -> Result<Option<NormalizedMessage>, HeraldError>;
}

/// Fetches the author of a replied-to message.
#[async_trait]
pub trait ReplyLookup: Send + Sync + 'static {
    /// Returns the sender of `message_id` in `chat_id`, or `None` if the
    /// message is unknown or deleted.
    async fn reply_author(
        &self,
        chat_id: SourceId,
        message_id: i64,
    ) -> Result<Option<SourceId>, HeraldError>;
}

/// Resolves a human-entered handle (`@name` or a numeric id) to a source id.
#[async_trait]
pub trait SourceResolver: Send + Sync + 'static {
    async fn resolve(&self, identifier: &str) -> Result<ResolvedSource, HeraldError>;
}
