// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! The transport layer sits behind these traits: an [`EventSource`] feeds the
//! pipeline, an [`AlertSink`] receives its output, and [`ReplyLookup`] /
//! [`SourceResolver`] answer the few questions only the platform can.

pub mod adapter;
pub mod sink;
pub mod source;

pub use adapter::PluginAdapter;
pub use sink::AlertSink;
pub use source::{EventSource, ReplyLookup, SourceResolver};
