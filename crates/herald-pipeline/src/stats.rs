// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process pipeline counters and the periodic heartbeat line.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use herald_core::TriggerKind;
use serde::Serialize;
use tracing::info;

use crate::coordinator::Outcome;

#[derive(Debug)]
pub struct PipelineStats {
    started: Instant,
    messages: AtomicU64,
    dm: AtomicU64,
    mention: AtomicU64,
    reply: AtomicU64,
    queued: AtomicU64,
    duplicates: AtomicU64,
    blocked_snooze: AtomicU64,
    blocked_priority: AtomicU64,
    blocked_trigger: AtomicU64,
    sink_failures: AtomicU64,
}

/// Point-in-time copy of [`PipelineStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub messages: u64,
    pub dm: u64,
    pub mention: u64,
    pub reply: u64,
    pub queued: u64,
    pub duplicates: u64,
    pub blocked_snooze: u64,
    pub blocked_priority: u64,
    pub blocked_trigger: u64,
    pub sink_failures: u64,
}

impl StatsSnapshot {
    /// Alerts produced, whether delivered right away or queued.
    pub fn alerts(&self) -> u64 {
        self.dm + self.mention + self.reply
    }
}

impl Default for PipelineStats {
    fn default() -> Self {
        Self {
            started: Instant::now(),
            messages: AtomicU64::new(0),
            dm: AtomicU64::new(0),
            mention: AtomicU64::new(0),
            reply: AtomicU64::new(0),
            queued: AtomicU64::new(0),
            duplicates: AtomicU64::new(0),
            blocked_snooze: AtomicU64::new(0),
            blocked_priority: AtomicU64::new(0),
            blocked_trigger: AtomicU64::new(0),
            sink_failures: AtomicU64::new(0),
        }
    }
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn record(&self, outcome: &Outcome) {
        self.messages.fetch_add(1, Ordering::Relaxed);
        let counter = match outcome {
            Outcome::BlockedSnooze => Some(&self.blocked_snooze),
            Outcome::BlockedPriority => Some(&self.blocked_priority),
            Outcome::BlockedTrigger => Some(&self.blocked_trigger),
            Outcome::Duplicate => Some(&self.duplicates),
            Outcome::Queued(_) => Some(&self.queued),
            Outcome::Delivered(_) => None,
        };
        if let Some(counter) = counter {
            counter.fetch_add(1, Ordering::Relaxed);
        }
        if let Some(kind) = outcome.trigger() {
            let by_kind = match kind {
                TriggerKind::Dm => &self.dm,
                TriggerKind::Mention => &self.mention,
                TriggerKind::Reply => &self.reply,
            };
            by_kind.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_sink_failure(&self) {
        self.sink_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            messages: self.messages.load(Ordering::Relaxed),
            dm: self.dm.load(Ordering::Relaxed),
            mention: self.mention.load(Ordering::Relaxed),
            reply: self.reply.load(Ordering::Relaxed),
            queued: self.queued.load(Ordering::Relaxed),
            duplicates: self.duplicates.load(Ordering::Relaxed),
            blocked_snooze: self.blocked_snooze.load(Ordering::Relaxed),
            blocked_priority: self.blocked_priority.load(Ordering::Relaxed),
            blocked_trigger: self.blocked_trigger.load(Ordering::Relaxed),
            sink_failures: self.sink_failures.load(Ordering::Relaxed),
        }
    }

    /// Emits the heartbeat log line.
    pub fn log_heartbeat(&self) {
        let s = self.snapshot();
        info!(
            uptime = %format_uptime(self.uptime()),
            messages = s.messages,
            alerts = s.alerts(),
            dm = s.dm,
            mention = s.mention,
            reply = s.reply,
            queued = s.queued,
            duplicates = s.duplicates,
            blocked_snooze = s.blocked_snooze,
            blocked_priority = s.blocked_priority,
            blocked_trigger = s.blocked_trigger,
            sink_failures = s.sink_failures,
            "heartbeat"
        );
    }
}

/// `3h 25m`.
pub fn format_uptime(uptime: Duration) -> String {
    let secs = uptime.as_secs();
    format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uptime_format() {
        assert_eq!(format_uptime(Duration::from_secs(3 * 3600 + 25 * 60 + 9)), "3h 25m");
        assert_eq!(format_uptime(Duration::from_secs(59)), "0h 0m");
    }

    #[test]
    fn counts_by_outcome_and_kind() {
        let stats = PipelineStats::default();
        stats.record(&Outcome::Delivered(TriggerKind::Dm));
        stats.record(&Outcome::Queued(TriggerKind::Reply));
        stats.record(&Outcome::Duplicate);
        stats.record(&Outcome::BlockedTrigger);
        stats.record_sink_failure();

        let s = stats.snapshot();
        assert_eq!(s.messages, 4);
        assert_eq!(s.alerts(), 2);
        assert_eq!(s.dm, 1);
        assert_eq!(s.reply, 1);
        assert_eq!(s.queued, 1);
        assert_eq!(s.duplicates, 1);
        assert_eq!(s.blocked_trigger, 1);
        assert_eq!(s.sink_failures, 1);
    }
}
