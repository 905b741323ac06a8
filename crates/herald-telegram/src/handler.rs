// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Filtering of incoming bot updates down to owner commands.

use herald_core::SourceId;
use teloxide::prelude::*;

/// The sender's id, if the message has a user sender.
pub fn sender_id(msg: &Message) -> Option<SourceId> {
    msg.from
        .as_ref()
        .and_then(|user| SourceId::try_from(user.id.0).ok())
}

/// Whether the message was sent by `owner_id`.
///
/// Messages without a sender (e.g. channel posts) never match.
pub fn is_owner(msg: &Message, owner_id: SourceId) -> bool {
    sender_id(msg) == Some(owner_id)
}

/// The message text if it looks like a slash command.
pub fn command_text(msg: &Message) -> Option<&str> {
    msg.text()
        .map(str::trim_start)
        .filter(|text| text.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_message(user_id: Option<u64>, text: &str) -> Message {
        let mut json = serde_json::json!({
            "message_id": 1,
            "date": 1700000000i64,
            "chat": {
                "id": 12345i64,
                "type": "private",
                "first_name": "Test",
            },
            "text": text,
        });
        if let Some(id) = user_id {
            json["from"] = serde_json::json!({
                "id": id,
                "is_bot": false,
                "first_name": "Test",
            });
        }
        serde_json::from_value(json).expect("failed to deserialize mock message")
    }

    #[test]
    fn owner_is_matched_by_id() {
        let msg = make_message(Some(12345), "/status");
        assert!(is_owner(&msg, 12345));
        assert!(!is_owner(&msg, 99999));
    }

    #[test]
    fn no_sender_is_never_owner() {
        let msg = make_message(None, "/status");
        assert_eq!(sender_id(&msg), None);
        assert!(!is_owner(&msg, 12345));
    }

    #[test]
    fn command_text_requires_slash() {
        assert_eq!(command_text(&make_message(Some(1), "  /snooze 2h")), Some("/snooze 2h"));
        assert_eq!(command_text(&make_message(Some(1), "hello")), None);
    }
}
