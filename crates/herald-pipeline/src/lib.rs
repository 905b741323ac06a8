// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The Herald message pipeline.
//!
//! Wires the state primitives from `herald-state` into the ordered gating
//! sequence: snooze gate, priority filter, trigger classifier, dedup, then
//! commit and delivery. Also hosts the alert formatter, the bot command
//! layer, the JSON Lines event source and the serve loop.

pub mod commands;
pub mod coordinator;
pub mod formatter;
pub mod recording;
pub mod runner;
pub mod source;
pub mod stats;
pub mod trigger;

pub use commands::{Command, CommandHandler, parse_command};
pub use coordinator::{
    ListedSource, Outcome, Pipeline, PrioritySnapshot, QueueSettings, SnoozeStatus, StatusReport,
    UnsnoozeReport,
};
pub use formatter::{AlertFormatter, escape_html};
pub use runner::{RunOptions, run};
pub use source::JsonlEventSource;
pub use stats::{PipelineStats, StatsSnapshot};
pub use trigger::{LocalVerdict, TriggerClassifier};
