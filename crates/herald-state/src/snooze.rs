// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Snooze gate: a time-bounded pause on alert delivery.
//!
//! Expiry is lazy. Nothing fires when the end time passes; the next call to
//! [`SnoozeGate::evaluate`] notices, turns the gate off and hands back the
//! queued alerts. Readers that only look ([`SnoozeGate::phase`]) already treat
//! an expired window as inactive.

use std::sync::LazyLock;

use chrono::{DateTime, TimeDelta, Utc};
use herald_core::HeraldError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::info;

use crate::queue::{AlertQueue, QueuedAlert};

/// `<digits><unit>`, matched after trimming and lowercasing.
static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)([mhd])$").unwrap());

/// What happens to alerts while snoozed.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SnoozeBehavior {
    #[default]
    Drop,
    Queue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnoozePhase {
    Inactive,
    ActiveDrop,
    ActiveQueue,
}

impl SnoozePhase {
    pub fn is_active(self) -> bool {
        !matches!(self, SnoozePhase::Inactive)
    }
}

/// Outcome of [`SnoozeGate::evaluate`].
#[derive(Debug, Default)]
pub struct Evaluation {
    /// The window ended during this check.
    pub expired: bool,
    /// Alerts released for delivery, oldest first.
    pub drained: Vec<QueuedAlert>,
}

/// Outcome of [`SnoozeGate::on_message`].
#[derive(Debug, PartialEq, Eq)]
pub enum GateAction {
    /// Gate is open; the alert is handed back for immediate delivery.
    Open(QueuedAlert),
    Dropped,
    Queued { evicted: Option<QueuedAlert> },
}

/// Snooze state persisted under `snooze`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnoozeGate {
    active: bool,
    #[serde(with = "crate::timestamp::option")]
    until: Option<DateTime<Utc>>,
    behavior: SnoozeBehavior,
    queue: AlertQueue,
}

impl SnoozeGate {
    /// Current phase without mutating anything. An elapsed window reads as
    /// inactive even before [`evaluate`](Self::evaluate) has run.
    pub fn phase(&self, now: DateTime<Utc>) -> SnoozePhase {
        match (self.active, self.until) {
            (true, Some(end)) if now < end => match self.behavior {
                SnoozeBehavior::Drop => SnoozePhase::ActiveDrop,
                SnoozeBehavior::Queue => SnoozePhase::ActiveQueue,
            },
            _ => SnoozePhase::Inactive,
        }
    }

    /// Applies lazy expiry. When the window has ended (`now >= end`) the gate
    /// turns itself off and returns its queue. A queue left behind by an
    /// inactive gate is released as well.
    pub fn evaluate(&mut self, now: DateTime<Utc>) -> Evaluation {
        let mut evaluation = Evaluation::default();

        if self.active && !self.phase(now).is_active() {
            self.active = false;
            self.until = None;
            evaluation.expired = true;
            info!(queued = self.queue.len(), "snooze expired");
        }

        if !self.active && !self.queue.is_empty() {
            evaluation.drained = self.queue.drain();
        }
        evaluation
    }

    /// Starts or replaces the snooze window. Durations do not stack.
    pub fn activate(
        &mut self,
        duration: TimeDelta,
        behavior: SnoozeBehavior,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, HeraldError> {
        let end = now
            .checked_add_signed(duration)
            .ok_or_else(|| HeraldError::InvalidDuration {
                input: format!("{}s", duration.num_seconds()),
            })?;

        self.active = true;
        self.until = Some(end);
        self.behavior = behavior;
        info!(until = %end, %behavior, "snooze activated");
        Ok(end)
    }

    /// Ends the snooze and returns everything that was queued.
    pub fn deactivate(&mut self, now: DateTime<Utc>) -> Vec<QueuedAlert> {
        let was_active = self.phase(now).is_active();
        self.active = false;
        self.until = None;
        let drained = self.queue.drain();
        info!(was_active, released = drained.len(), "snooze deactivated");
        drained
    }

    /// Routes a qualifying alert through the gate.
    pub fn on_message(
        &mut self,
        alert: QueuedAlert,
        limit: usize,
        warn_ratio: f64,
        now: DateTime<Utc>,
    ) -> GateAction {
        match self.phase(now) {
            SnoozePhase::Inactive => GateAction::Open(alert),
            SnoozePhase::ActiveDrop => GateAction::Dropped,
            SnoozePhase::ActiveQueue => GateAction::Queued {
                evicted: self.queue.push(alert, limit, warn_ratio),
            },
        }
    }

    /// Time left in an active window.
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<TimeDelta> {
        match self.phase(now) {
            SnoozePhase::Inactive => None,
            _ => self.until.map(|end| end - now),
        }
    }

    pub fn until(&self) -> Option<DateTime<Utc>> {
        self.until
    }

    pub fn behavior(&self) -> SnoozeBehavior {
        self.behavior
    }

    pub fn queue(&self) -> &AlertQueue {
        &self.queue
    }
}

/// Parses `<digits><m|h|d>` (case-insensitive, surrounding whitespace ignored).
pub fn parse_duration(input: &str) -> Result<TimeDelta, HeraldError> {
    let invalid = || HeraldError::InvalidDuration {
        input: input.to_string(),
    };

    let normalized = input.trim().to_ascii_lowercase();
    let caps = DURATION_RE.captures(&normalized).ok_or_else(invalid)?;
    let value: i64 = caps[1].parse().map_err(|_| invalid())?;

    let delta = match &caps[2] {
        "m" => TimeDelta::try_minutes(value),
        "h" => TimeDelta::try_hours(value),
        "d" => TimeDelta::try_days(value),
        _ => None,
    };
    delta.ok_or_else(invalid)
}

/// Renders a remaining duration as `1.5h`, `12m` or `40s`.
pub fn format_remaining(remaining: TimeDelta) -> String {
    let secs = remaining.num_milliseconds().max(0) as f64 / 1000.0;
    if secs >= 3600.0 {
        format!("{:.1}h", secs / 3600.0)
    } else if secs >= 60.0 {
        format!("{:.0}m", secs / 60.0)
    } else {
        format!("{secs:.0}s")
    }
}
