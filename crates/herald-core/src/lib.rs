// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Herald priority notifier.
//!
//! This crate provides the error type, the platform-neutral message model and
//! the adapter traits used throughout the Herald workspace. Transport
//! integrations implement the traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::HeraldError;
pub use types::{
    AdapterType, HealthStatus, MessageKey, NormalizedMessage, OriginKind, ResolvedSource,
    SelfIdentity, SourceId, TriggerKind,
};

pub use traits::{AlertSink, EventSource, PluginAdapter, ReplyLookup, SourceResolver};

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn message_key_joins_chat_and_message_ids() {
        let key = MessageKey::new(-100123, 42);
        assert_eq!(key.as_str(), "-100123:42");
        assert_eq!(key.to_string(), "-100123:42");
    }

    #[test]
    fn trigger_kind_serializes_with_legacy_labels() {
        let json = serde_json::to_string(&TriggerKind::Dm).expect("should serialize");
        assert_eq!(json, "\"DM\"");
        let parsed: TriggerKind = serde_json::from_str("\"Mention\"").expect("should parse");
        assert_eq!(parsed, TriggerKind::Mention);
        assert_eq!(TriggerKind::Reply.to_string(), "Reply");
        assert_eq!(TriggerKind::from_str("DM").unwrap(), TriggerKind::Dm);
    }

    #[test]
    fn origin_kind_round_trips_lowercase() {
        for origin in [
            OriginKind::Private,
            OriginKind::Group,
            OriginKind::Supergroup,
            OriginKind::Channel,
        ] {
            let s = origin.to_string();
            assert_eq!(s, s.to_lowercase());
            assert_eq!(OriginKind::from_str(&s).unwrap(), origin);
        }
    }

    #[test]
    fn normalized_message_defaults_optional_fields() {
        let json = r#"{
            "chat_id": 10,
            "message_id": 5,
            "sender_id": 99,
            "origin": "private",
            "timestamp": 1700000000
        }"#;
        let msg: NormalizedMessage = serde_json::from_str(json).expect("should parse");
        assert_eq!(msg.key(), MessageKey::new(10, 5));
        assert!(msg.text.is_none());
        assert!(msg.mentions.is_empty());
        assert!(!msg.is_service);
        assert!(!msg.sender_is_bot);
        assert_eq!(msg.timestamp.timestamp(), 1_700_000_000);
    }

    #[test]
    fn self_identity_strips_at_prefix() {
        let me = SelfIdentity::new(1, Some("@alice".into()));
        assert_eq!(me.username.as_deref(), Some("alice"));
        assert_eq!(me.mention_handle().as_deref(), Some("@alice"));

        let anonymous = SelfIdentity::new(1, Some(String::new()));
        assert!(anonymous.mention_handle().is_none());
    }

    #[test]
    fn user_facing_errors_are_flagged() {
        assert!(HeraldError::InvalidDuration { input: "5x".into() }.is_user_facing());
        assert!(
            HeraldError::Resolution {
                identifier: "@nobody".into(),
                message: "not found".into(),
            }
            .is_user_facing()
        );
        assert!(!HeraldError::Internal("boom".into()).is_user_facing());
        assert!(
            !HeraldError::persistence("write failed", std::io::Error::other("disk full"))
                .is_user_facing()
        );
    }

    #[test]
    fn all_traits_are_exported() {
        fn _assert_sink<T: AlertSink>() {}
        fn _assert_source<T: EventSource>() {}
        fn _assert_lookup<T: ReplyLookup>() {}
        fn _assert_resolver<T: SourceResolver>() {}
        fn _assert_plugin<T: PluginAdapter>() {}
    }
}
