// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lazy time-driven maintenance.
//!
//! There is no background timer. Every public pipeline entry point calls
//! [`tick`] first, which applies snooze expiry and, when due, the cleanup
//! sweep. An idle process therefore advances neither.

use chrono::{DateTime, Utc};

use crate::document::StateDocument;
use crate::queue::QueuedAlert;
use crate::store::CleanupPolicy;

/// Side effects produced by one [`tick`].
#[derive(Debug, Default)]
pub struct Housekeeping {
    /// Queued alerts released by expiry, to be delivered in order.
    pub drained: Vec<QueuedAlert>,
    /// The snooze window ended during this tick.
    pub expired: bool,
    /// Records removed, if a sweep ran.
    pub swept: Option<usize>,
}

impl Housekeeping {
    /// Whether the document changed and should be persisted.
    pub fn changed(&self) -> bool {
        self.expired || !self.drained.is_empty() || self.swept.is_some()
    }
}

pub fn tick(doc: &mut StateDocument, now: DateTime<Utc>, policy: &CleanupPolicy) -> Housekeeping {
    let evaluation = doc.snooze.evaluate(now);
    let swept = policy
        .is_due(doc, now)
        .then(|| policy.cleanup(doc, now));

    Housekeeping {
        drained: evaluation.drained,
        expired: evaluation.expired,
        swept,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;
    use herald_core::MessageKey;

    use super::*;
    use crate::snooze::SnoozeBehavior;

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn quiet_tick_changes_nothing() {
        let mut doc = StateDocument::fresh(t0());
        let result = tick(&mut doc, t0() + TimeDelta::hours(1), &CleanupPolicy::default());
        assert!(!result.changed());
        assert_eq!(doc.last_cleanup, t0());
    }

    #[test]
    fn tick_expires_snooze_and_sweeps_when_due() {
        let mut doc = StateDocument::fresh(t0());
        doc.snooze
            .activate(TimeDelta::hours(1), SnoozeBehavior::Queue, t0())
            .unwrap();
        doc.snooze.on_message(
            QueuedAlert::new("held", MessageKey::new(1, 1)),
            100,
            0.8,
            t0(),
        );

        let later = t0() + TimeDelta::hours(25);
        let result = tick(&mut doc, later, &CleanupPolicy::default());
        assert!(result.expired);
        assert_eq!(result.drained.len(), 1);
        assert_eq!(result.swept, Some(0));
        assert_eq!(doc.last_cleanup, later);
        assert!(result.changed());
    }
}
