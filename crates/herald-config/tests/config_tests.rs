// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Herald configuration system.

use herald_config::diagnostic::{ConfigError, suggest_key};
use herald_config::model::HeraldConfig;
use herald_config::{load_and_validate_str, load_config_from_str};

#[test]
fn valid_toml_deserializes_into_herald_config() {
    let toml = r#"
[notifier]
log_level = "debug"
heartbeat_interval_secs = 60

[account]
user_id = 111
username = "@alice"

[telegram]
bot_token = "123:ABC"
chat_id = 222

[state]
path = "/tmp/herald-state.json"
retention_days = 7
cleanup_interval_hours = 1
queue_limit = 10
queue_warn_ratio = 0.5

[delivery]
max_retries = 5
min_interval_ms = 250

[source]
events = "/tmp/events.jsonl"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.notifier.log_level, "debug");
    assert_eq!(config.notifier.heartbeat_interval_secs, 60);
    assert_eq!(config.account.user_id, Some(111));
    assert_eq!(config.account.username.as_deref(), Some("@alice"));
    assert_eq!(config.telegram.bot_token.as_deref(), Some("123:ABC"));
    assert_eq!(config.telegram.chat_id, Some(222));
    assert_eq!(config.telegram.effective_owner_id(), Some(222));
    assert_eq!(config.state.path, "/tmp/herald-state.json");
    assert_eq!(config.state.retention_days, 7);
    assert_eq!(config.state.cleanup_interval_hours, 1);
    assert_eq!(config.state.queue_limit, 10);
    assert_eq!(config.state.queue_warn_ratio, 0.5);
    assert_eq!(config.delivery.max_retries, 5);
    assert_eq!(config.delivery.min_interval_ms, 250);
    assert_eq!(config.source.events, "/tmp/events.jsonl");
}

#[test]
fn missing_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.notifier.log_level, "info");
    assert_eq!(config.notifier.heartbeat_interval_secs, 3600);
    assert!(config.account.user_id.is_none());
    assert!(config.telegram.bot_token.is_none());
    assert_eq!(config.state.path, "state.json");
    assert_eq!(config.state.retention_days, 30);
    assert_eq!(config.state.cleanup_interval_hours, 24);
    assert_eq!(config.state.queue_limit, 100);
    assert_eq!(config.state.queue_warn_ratio, 0.8);
    assert_eq!(config.delivery.max_retries, 3);
    assert_eq!(config.source.events, "-");
}

#[test]
fn explicit_owner_overrides_chat() {
    let toml = "[telegram]\nchat_id = 1\nowner_id = 2\n";
    let config = load_config_from_str(toml).expect("should parse");
    assert_eq!(config.telegram.effective_owner_id(), Some(2));
}

#[test]
fn unknown_field_in_telegram_produces_error() {
    let toml = "[telegram]\nbot_tken = \"abc\"\n";

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("bot_tken"),
        "error should mention unknown field, got: {err_str}"
    );
}

#[test]
fn unknown_key_diagnostic_carries_suggestion() {
    let toml = "[state]\nqueue_limt = 5\n";

    let errors = load_and_validate_str(toml).expect_err("should reject unknown field");
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key,
            suggestion,
            env_var,
            span,
            ..
        } => {
            assert_eq!(key, "state.queue_limt");
            assert_eq!(suggestion.as_deref(), Some("queue_limit"));
            assert_eq!(*env_var, None);
            let span = span.expect("inline source gets a span");
            assert_eq!(&toml[span.offset()..span.offset() + span.len()], "queue_limt");
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

#[test]
fn unknown_section_is_rejected() {
    let toml = "[anthropic]\napi_key = \"x\"\n";
    assert!(load_and_validate_str(toml).is_err());
}

#[test]
fn wrong_type_reports_invalid_type() {
    let toml = "[state]\nqueue_limit = \"lots\"\n";

    let errors = load_and_validate_str(toml).expect_err("should reject wrong type");
    match &errors[0] {
        ConfigError::InvalidType { key, span, .. } => {
            assert_eq!(key, "state.queue_limit");
            let span = span.expect("invalid value is located");
            assert!(toml[span.offset()..].starts_with("queue_limit = \"lots\""));
        }
        other => panic!("expected InvalidType, got {other:?}"),
    }
}

#[test]
fn same_key_in_later_section_is_not_highlighted() {
    let toml = "[state]
retention_dayz = 3

[notifier]
retention_dayz = 1
";

    let errors = load_and_validate_str(toml).expect_err("should reject unknown field");
    match &errors[0] {
        ConfigError::UnknownKey { key, span, .. } => {
            let offset = span.expect("key is located").offset();
            let section = if key.starts_with("state.") { "[state]" } else { "[notifier]" };
            let header = toml.find(section).unwrap();
            let next = toml[header + 1..].find('[').map_or(toml.len(), |i| header + 1 + i);
            assert!(offset > header && offset < next, "{key} at {offset}");
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

#[test]
fn semantic_validation_runs_after_parse() {
    let toml = "[state]\nretention_days = 0\n";

    let errors = load_and_validate_str(toml).expect_err("zero retention is invalid");
    assert!(matches!(errors[0], ConfigError::Validation { .. }));
}

#[test]
fn dotted_override_maps_to_nested_key() {
    use figment::{Figment, providers::Serialized};

    let config: HeraldConfig = Figment::new()
        .merge(Serialized::defaults(HeraldConfig::default()))
        .merge(("telegram.bot_token", "xyz-from-env"))
        .extract()
        .expect("should set bot_token via dot notation");

    assert_eq!(config.telegram.bot_token.as_deref(), Some("xyz-from-env"));
}

#[test]
fn missing_config_files_silently_skipped() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let config: HeraldConfig = Figment::new()
        .merge(Serialized::defaults(HeraldConfig::default()))
        .merge(Toml::file("/nonexistent/path/herald.toml"))
        .extract()
        .expect("missing file should be silently skipped");

    assert_eq!(config.state.path, "state.json");
}

#[test]
fn suggest_key_covers_common_typos() {
    let telegram = &["bot_token", "chat_id", "owner_id"];
    assert_eq!(suggest_key("chatid", telegram), Some("chat_id".to_string()));
    assert_eq!(suggest_key("owner", telegram), Some("owner_id".to_string()));
}
