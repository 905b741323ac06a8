// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram Bot API adapters for Herald.
//!
//! [`TelegramSink`] delivers alerts, [`TelegramResolver`] turns `@handles`
//! into ids for the priority commands, and [`spawn_command_listener`] feeds
//! the owner's bot commands to the pipeline's command handler.

pub mod handler;
pub mod listener;
pub mod redact;
pub mod resolver;
pub mod sink;

pub use listener::spawn_command_listener;
pub use resolver::{TelegramResolver, UnresolvedReplies};
pub use sink::TelegramSink;
