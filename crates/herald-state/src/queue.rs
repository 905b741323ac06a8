// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded FIFO of alerts held back by a queue-mode snooze.

use std::collections::VecDeque;

use herald_core::MessageKey;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

/// A fully formatted alert waiting for the snooze to end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawQueuedAlert")]
pub struct QueuedAlert {
    #[serde(rename = "message")]
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<MessageKey>,
}

impl QueuedAlert {
    pub fn new(text: impl Into<String>, key: MessageKey) -> Self {
        Self {
            text: text.into(),
            key: Some(key),
        }
    }
}

/// Queue entries are either bare strings or `{"message": ..., "key": ...}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawQueuedAlert {
    Text(String),
    Entry {
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        key: Option<MessageKey>,
    },
}

impl TryFrom<RawQueuedAlert> for QueuedAlert {
    type Error = String;

    fn try_from(raw: RawQueuedAlert) -> Result<Self, Self::Error> {
        match raw {
            RawQueuedAlert::Text(text) => Ok(Self { text, key: None }),
            RawQueuedAlert::Entry {
                message: Some(message),
                key,
            } => Ok(Self { text: message, key }),
            RawQueuedAlert::Entry { message: None, .. } => {
                Err("queued alert has no message".to_string())
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AlertQueue {
    alerts: VecDeque<QueuedAlert>,
}

/// Entries are decoded one at a time; an unreadable one is skipped with a
/// warning and the rest keep their order.
impl<'de> Deserialize<'de> for AlertQueue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;
        let alerts = raw
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match QueuedAlert::deserialize(value) {
                Ok(alert) => Some(alert),
                Err(e) => {
                    warn!(index, error = %e, "skipping unreadable queued alert");
                    None
                }
            })
            .collect();
        Ok(Self { alerts })
    }
}

impl AlertQueue {
    /// Appends an alert, evicting the oldest entry first when the queue is
    /// already at `limit`. Returns the evicted alert, if any.
    ///
    /// A warning is logged once occupancy reaches `warn_ratio` of the limit.
    pub fn push(&mut self, alert: QueuedAlert, limit: usize, warn_ratio: f64) -> Option<QueuedAlert> {
        let limit = limit.max(1);
        let mut evicted = None;
        while self.alerts.len() >= limit {
            evicted = self.alerts.pop_front();
            warn!(limit, "snooze queue full, dropped oldest alert");
        }

        self.alerts.push_back(alert);

        let len = self.alerts.len();
        if len as f64 >= limit as f64 * warn_ratio {
            warn!(queued = len, limit, "snooze queue nearing capacity");
        }
        evicted
    }

    /// Removes and returns every alert in arrival order.
    pub fn drain(&mut self) -> Vec<QueuedAlert> {
        self.alerts.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueuedAlert> {
        self.alerts.iter()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn alert(n: usize) -> QueuedAlert {
        QueuedAlert::new(format!("alert {n}"), MessageKey::new(1, n as i64))
    }

    #[test]
    fn evicts_oldest_at_bound() {
        let mut queue = AlertQueue::default();
        for n in 1..=100 {
            assert!(queue.push(alert(n), 100, 0.8).is_none());
        }
        let evicted = queue.push(alert(101), 100, 0.8);

        assert_eq!(evicted, Some(alert(1)));
        assert_eq!(queue.len(), 100);
        assert_eq!(queue.iter().next(), Some(&alert(2)));
        assert_eq!(queue.iter().last(), Some(&alert(101)));
    }

    #[test]
    fn drain_preserves_order_and_empties() {
        let mut queue = AlertQueue::default();
        for n in 1..=3 {
            queue.push(alert(n), 100, 0.8);
        }
        let drained = queue.drain();
        assert_eq!(drained, vec![alert(1), alert(2), alert(3)]);
        assert!(queue.is_empty());
    }

    #[test]
    fn reads_legacy_entries() {
        let json = r#"["plain text", {"message": "from object"}, {"message": "keyed", "key": "1:2"}]"#;
        let queue: AlertQueue = serde_json::from_str(json).unwrap();
        let texts: Vec<&str> = queue.iter().map(|a| a.text.as_str()).collect();
        assert_eq!(texts, vec!["plain text", "from object", "keyed"]);
        assert_eq!(queue.iter().last().unwrap().key, Some(MessageKey::new(1, 2)));
    }

    #[test]
    fn entries_without_message_are_skipped() {
        let json = r#"[{"key": "1:1"}, "kept", 42, {"message": "also kept", "key": "1:3"}]"#;
        let queue: AlertQueue = serde_json::from_str(json).unwrap();
        let texts: Vec<&str> = queue.iter().map(|a| a.text.as_str()).collect();
        assert_eq!(texts, vec!["kept", "also kept"]);
    }

    #[test]
    fn writes_message_objects() {
        let mut queue = AlertQueue::default();
        queue.push(QueuedAlert::new("hi", MessageKey::new(3, 4)), 10, 0.8);
        let json = serde_json::to_string(&queue).unwrap();
        assert_eq!(json, r#"[{"message":"hi","key":"3:4"}]"#);
    }

    proptest! {
        #[test]
        fn never_exceeds_limit_and_keeps_newest(limit in 1usize..20, pushes in 0usize..60) {
            let mut queue = AlertQueue::default();
            for n in 0..pushes {
                queue.push(alert(n), limit, 0.8);
            }
            prop_assert_eq!(queue.len(), pushes.min(limit));
            let expected: Vec<QueuedAlert> = (pushes.saturating_sub(limit)..pushes).map(alert).collect();
            let actual: Vec<QueuedAlert> = queue.iter().cloned().collect();
            prop_assert_eq!(actual, expected);
        }
    }
}
