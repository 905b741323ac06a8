// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Alert text rendering (Telegram HTML).
//!
//! DM layout:
//!
//! ```text
//! 🔔 <b>Sender</b>
//!    preview
//!
//!    HH:MM • View →
//! ```
//!
//! Group layout:
//!
//! ```text
//! 💬 <b>Chat</b>
//! Sender: preview
//!
//! HH:MM • View group →
//! ```

use chrono::{DateTime, FixedOffset, Offset, Utc};
use herald_core::{NormalizedMessage, OriginKind, TriggerKind};

/// Maximum preview length in characters before truncation.
pub const PREVIEW_LIMIT: usize = 200;

/// Channel and supergroup ids carry this prefix in their negative form.
const CHANNEL_ID_OFFSET: i64 = 1_000_000_000_000;

const FALLBACK_LINK: &str = "tg://resolve?domain=telegram";

#[derive(Debug, Clone, Copy, Default)]
pub struct AlertFormatter;

impl AlertFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Renders `msg` as an alert, showing times at `utc_offset_hours`.
    pub fn format(&self, msg: &NormalizedMessage, kind: TriggerKind, utc_offset_hours: f64) -> String {
        let sender = escape_html(sender_name(msg));
        let time = format_time(msg.timestamp, utc_offset_hours);
        let link = deep_link(msg);
        let preview = preview(msg).map(|p| escape_html(&p));

        match kind {
            TriggerKind::Dm => match preview {
                Some(p) => format!(
                    "🔔 <b>{sender}</b>\n   {p}\n\n   {time} • <a href=\"{link}\">View →</a>"
                ),
                None => format!("🔔 <b>{sender}</b>\n\n{time} • <a href=\"{link}\">View →</a>"),
            },
            TriggerKind::Mention | TriggerKind::Reply => {
                let chat = escape_html(&chat_name(msg));
                let body = match preview {
                    Some(p) => format!("{sender}: {p}"),
                    None => sender,
                };
                format!("💬 <b>{chat}</b>\n{body}\n\n{time} • <a href=\"{link}\">View group →</a>")
            }
        }
    }
}

/// `&`, `<` and `>` escaped for Telegram's HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Preview text. `None` for media messages, whose caption is not repeated;
/// `[No content]` for messages with neither text nor media.
fn preview(msg: &NormalizedMessage) -> Option<String> {
    if msg.has_media {
        return None;
    }
    match msg.text.as_deref() {
        Some(text) if !text.is_empty() => Some(truncate(text)),
        _ => Some("[No content]".to_string()),
    }
}

fn truncate(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_LIMIT) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn sender_name(msg: &NormalizedMessage) -> &str {
    msg.sender_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or("Unknown")
}

fn chat_name(msg: &NormalizedMessage) -> String {
    if let Some(title) = msg.chat_title.as_deref().filter(|t| !t.is_empty()) {
        return title.to_string();
    }
    match &msg.chat_username {
        Some(username) => format!("@{username}"),
        None => "Unknown Chat".to_string(),
    }
}

fn format_time(at: DateTime<Utc>, utc_offset_hours: f64) -> String {
    at.with_timezone(&user_offset(utc_offset_hours))
        .format("%H:%M")
        .to_string()
}

/// The user's fixed UTC offset. Out-of-range values fall back to UTC.
pub fn user_offset(hours: f64) -> FixedOffset {
    FixedOffset::east_opt((hours * 3600.0).round() as i32).unwrap_or_else(|| Utc.fix())
}

/// `UTC`, `UTC+7`, `UTC-5.5`.
pub fn offset_label(hours: f64) -> String {
    if hours == 0.0 {
        "UTC".to_string()
    } else if hours > 0.0 {
        format!("UTC+{hours}")
    } else {
        format!("UTC{hours}")
    }
}

/// Link that opens the message (or the chat, where messages cannot be
/// addressed) in a Telegram client.
pub fn deep_link(msg: &NormalizedMessage) -> String {
    let username = msg.chat_username.as_deref().filter(|u| !u.is_empty());
    match (msg.origin, username) {
        (OriginKind::Private | OriginKind::Group, Some(user)) => format!("https://t.me/{user}"),
        (OriginKind::Channel | OriginKind::Supergroup, Some(user)) => {
            format!("https://t.me/{user}/{}", msg.message_id)
        }
        (OriginKind::Private, None) => format!("tg://user?id={}", msg.chat_id),
        (OriginKind::Channel | OriginKind::Supergroup, None) => {
            format!("https://t.me/c/{}/{}", bare_channel_id(msg.chat_id), msg.message_id)
        }
        (OriginKind::Group, None) if msg.chat_id != 0 => format!(
            "tg://openmessage?chat_id={}&message_id={}",
            msg.chat_id.unsigned_abs(),
            msg.message_id
        ),
        (OriginKind::Group, None) => FALLBACK_LINK.to_string(),
    }
}

/// Strips the `-100` prefix Bot API ids put in front of channel ids.
fn bare_channel_id(chat_id: i64) -> i64 {
    if chat_id <= -CHANNEL_ID_OFFSET {
        -chat_id - CHANNEL_ID_OFFSET
    } else {
        chat_id.abs()
    }
}
