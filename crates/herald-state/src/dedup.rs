// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Exactly-once tracking of alerted messages.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use herald_core::{MessageKey, SourceId, TriggerKind};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

/// Written once when a message is alerted (or queued) and never mutated.
///
/// A record missing its timestamp reads as the epoch, so the next sweep
/// removes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedRecord {
    #[serde(with = "crate::timestamp", default)]
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_type: Option<TriggerKind>,
}

/// Processed-message records keyed by `chat_id:message_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DedupStore {
    records: BTreeMap<MessageKey, ProcessedRecord>,
}

/// Records are decoded one at a time; an unreadable one is dropped with a
/// warning instead of failing the whole document.
impl<'de> Deserialize<'de> for DedupStore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<MessageKey, serde_json::Value>::deserialize(deserializer)?;
        let records = raw
            .into_iter()
            .filter_map(|(key, value)| match ProcessedRecord::deserialize(value) {
                Ok(record) => Some((key, record)),
                Err(e) => {
                    warn!(key = %key, error = %e, "dropping unreadable processed record");
                    None
                }
            })
            .collect();
        Ok(Self { records })
    }
}

impl DedupStore {
    pub fn is_processed(&self, chat_id: SourceId, message_id: i64) -> bool {
        self.contains(&MessageKey::new(chat_id, message_id))
    }

    pub fn contains(&self, key: &MessageKey) -> bool {
        self.records.contains_key(key)
    }

    /// Inserts a record, overwriting any previous one for the same key.
    ///
    /// Callers check [`is_processed`](Self::is_processed) first; a repeated
    /// call is idempotent in effect.
    pub fn mark_processed(
        &mut self,
        chat_id: SourceId,
        message_id: i64,
        trigger_type: TriggerKind,
        now: DateTime<Utc>,
    ) -> MessageKey {
        let key = MessageKey::new(chat_id, message_id);
        self.records.insert(
            key.clone(),
            ProcessedRecord {
                timestamp: now,
                trigger_type: Some(trigger_type),
            },
        );
        key
    }

    pub fn get(&self, key: &MessageKey) -> Option<&ProcessedRecord> {
        self.records.get(key)
    }

    /// Drops every record stamped at or before `cutoff`. Returns how many went.
    pub fn sweep(&mut self, cutoff: DateTime<Utc>) -> usize {
        let before = self.records.len();
        self.records.retain(|_, record| record.timestamp > cutoff);
        before - self.records.len()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
