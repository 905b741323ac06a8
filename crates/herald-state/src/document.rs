// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The persisted aggregate root.

use chrono::{DateTime, Utc};
use herald_core::HeraldError;
use serde::{Deserialize, Serialize};

use crate::dedup::DedupStore;
use crate::priority::PriorityFilter;
use crate::snooze::SnoozeGate;

/// Current on-disk schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Accepted UTC offsets, in hours.
pub const TIMEZONE_RANGE: std::ops::RangeInclusive<f64> = -12.0..=14.0;

/// Everything the notifier remembers between runs.
///
/// Every field has a default, so a file written by an older build (or with
/// keys missing) still loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateDocument {
    pub version: u32,
    pub processed_messages: DedupStore,
    #[serde(with = "crate::timestamp")]
    pub last_cleanup: DateTime<Utc>,
    pub priority_contacts: PriorityFilter,
    pub snooze: SnoozeGate,
    /// Hours east of UTC used when rendering alert times.
    pub timezone_offset: f64,
}

impl Default for StateDocument {
    fn default() -> Self {
        Self {
            version: SCHEMA_VERSION,
            processed_messages: DedupStore::default(),
            last_cleanup: DateTime::UNIX_EPOCH,
            priority_contacts: PriorityFilter::default(),
            snooze: SnoozeGate::default(),
            timezone_offset: 0.0,
        }
    }
}

impl StateDocument {
    /// An empty document whose cleanup clock starts at `now`.
    pub fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            last_cleanup: now,
            ..Self::default()
        }
    }

    pub fn set_timezone_offset(&mut self, hours: f64) -> Result<(), HeraldError> {
        if !TIMEZONE_RANGE.contains(&hours) {
            return Err(HeraldError::Command(format!(
                "timezone offset must be between {} and +{} hours, got {hours}",
                TIMEZONE_RANGE.start(),
                TIMEZONE_RANGE.end()
            )));
        }
        self.timezone_offset = hours;
        Ok(())
    }
}
