// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stand-ins for the platform lookups the pipeline and commands depend on.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use herald_core::traits::{ReplyLookup, SourceResolver};
use herald_core::{HeraldError, ResolvedSource, SourceId};

/// Answers reply-author lookups from a fixed table and counts calls.
#[derive(Default)]
pub struct StaticReplyLookup {
    authors: HashMap<(SourceId, i64), SourceId>,
    calls: AtomicUsize,
}

impl StaticReplyLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `message_id` in `chat_id` was written by `author`.
    pub fn with_author(mut self, chat_id: SourceId, message_id: i64, author: SourceId) -> Self {
        self.authors.insert((chat_id, message_id), author);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReplyLookup for StaticReplyLookup {
    async fn reply_author(
        &self,
        chat_id: SourceId,
        message_id: i64,
    ) -> Result<Option<SourceId>, HeraldError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.authors.get(&(chat_id, message_id)).copied())
    }
}

/// A lookup that always fails, as when the replied-to message was deleted
/// or the network is down.
#[derive(Default)]
pub struct FailingLookup;

#[async_trait]
impl ReplyLookup for FailingLookup {
    async fn reply_author(&self, _: SourceId, _: i64) -> Result<Option<SourceId>, HeraldError> {
        Err(HeraldError::Lookup {
            message: "lookup unavailable".to_string(),
            source: None,
        })
    }
}

/// Resolves handles from a fixed table; anything else is a resolution error.
#[derive(Default)]
pub struct StaticResolver {
    entries: HashMap<String, ResolvedSource>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handle` (with or without `@`).
    pub fn with(mut self, handle: &str, id: SourceId, display_name: &str) -> Self {
        self.entries.insert(
            handle.trim_start_matches('@').to_lowercase(),
            ResolvedSource {
                id,
                display_name: display_name.to_string(),
            },
        );
        self
    }
}

#[async_trait]
impl SourceResolver for StaticResolver {
    async fn resolve(&self, identifier: &str) -> Result<ResolvedSource, HeraldError> {
        let handle = identifier.trim_start_matches('@').to_lowercase();
        self.entries
            .get(&handle)
            .cloned()
            .ok_or_else(|| HeraldError::Resolution {
                identifier: identifier.to_string(),
                message: "no such user or chat".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_lookup_counts_calls() {
        let lookup = StaticReplyLookup::new().with_author(-5, 10, 1);
        assert_eq!(lookup.reply_author(-5, 10).await.unwrap(), Some(1));
        assert_eq!(lookup.reply_author(-5, 11).await.unwrap(), None);
        assert_eq!(lookup.calls(), 2);
    }

    #[tokio::test]
    async fn resolver_ignores_at_and_case() {
        let resolver = StaticResolver::new().with("@Alice", 42, "Alice");
        assert_eq!(resolver.resolve("alice").await.unwrap().id, 42);
        assert!(matches!(
            resolver.resolve("@bob").await,
            Err(HeraldError::Resolution { .. })
        ));
    }
}
