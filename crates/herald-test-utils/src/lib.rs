// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Herald integration tests.
//!
//! Mock adapters and builders for fast, deterministic tests without a
//! Telegram connection.
//!
//! # Components
//!
//! - [`MockSink`] - captures delivered alerts, can be told to fail
//! - [`MockEventSource`] - replays injected messages
//! - [`StaticReplyLookup`], [`FailingLookup`], [`StaticResolver`] - platform lookups
//! - [`MessageBuilder`] - concise [`NormalizedMessage`](herald_core::NormalizedMessage) construction

pub mod message;
pub mod mock_platform;
pub mod mock_sink;
pub mod mock_source;

pub use message::MessageBuilder;
pub use mock_platform::{FailingLookup, StaticReplyLookup, StaticResolver};
pub use mock_sink::MockSink;
pub use mock_source::MockEventSource;
