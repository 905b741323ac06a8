// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistent state for the Herald priority notifier.
//!
//! The [`StateDocument`] aggregates everything that survives a restart: the
//! dedup records, the priority filter, the snooze gate with its queue, and
//! the user's timezone offset. [`StateStore`] loads and saves it as JSON.
//! None of these types lock; the pipeline serializes access.

pub mod dedup;
pub mod document;
pub mod housekeeping;
pub mod priority;
pub mod queue;
pub mod snooze;
pub mod store;
mod timestamp;

pub use dedup::{DedupStore, ProcessedRecord};
pub use document::{SCHEMA_VERSION, StateDocument, TIMEZONE_RANGE};
pub use housekeeping::Housekeeping;
pub use priority::{ModeChange, PriorityFilter, PriorityMode};
pub use queue::{AlertQueue, QueuedAlert};
pub use snooze::{
    Evaluation, GateAction, SnoozeBehavior, SnoozeGate, SnoozePhase, format_remaining,
    parse_duration,
};
pub use store::{CleanupPolicy, StateStore};
