// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks the semantic constraints serde cannot express: non-empty paths,
//! positive limits, ratios inside `(0, 1]`, and a known log level.

use crate::diagnostic::ConfigError;
use crate::model::HeraldConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every violation instead of failing fast.
pub fn validate_config(config: &HeraldConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let level = config.notifier.log_level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "notifier.log_level `{}` is not one of {}",
                config.notifier.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.notifier.heartbeat_interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "notifier.heartbeat_interval_secs must be greater than 0".to_string(),
        });
    }

    if config.state.path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "state.path must not be empty".to_string(),
        });
    }

    if config.state.retention_days == 0 {
        errors.push(ConfigError::Validation {
            message: "state.retention_days must be at least 1".to_string(),
        });
    }

    if config.state.cleanup_interval_hours == 0 {
        errors.push(ConfigError::Validation {
            message: "state.cleanup_interval_hours must be at least 1".to_string(),
        });
    }

    if config.state.queue_limit == 0 {
        errors.push(ConfigError::Validation {
            message: "state.queue_limit must be at least 1".to_string(),
        });
    }

    let ratio = config.state.queue_warn_ratio;
    if !(ratio > 0.0 && ratio <= 1.0) {
        errors.push(ConfigError::Validation {
            message: format!("state.queue_warn_ratio must be in (0, 1], got {ratio}"),
        });
    }

    if config.delivery.max_retries == 0 {
        errors.push(ConfigError::Validation {
            message: "delivery.max_retries must be at least 1".to_string(),
        });
    }

    if let Some(token) = &config.telegram.bot_token
        && token.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "telegram.bot_token must not be empty when set".to_string(),
        });
    }

    if config.source.events.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "source.events must be a path or `-`".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Check the keys `herald serve` needs in addition to [`validate_config`].
pub fn validate_for_serve(config: &HeraldConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.telegram.bot_token.is_none() {
        errors.push(ConfigError::MissingKey {
            key: "telegram.bot_token".to_string(),
        });
    }
    if config.telegram.chat_id.is_none() {
        errors.push(ConfigError::MissingKey {
            key: "telegram.chat_id".to_string(),
        });
    }
    if config.account.user_id.is_none() {
        errors.push(ConfigError::MissingKey {
            key: "account.user_id".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&HeraldConfig::default()).is_ok());
    }

    #[test]
    fn collects_all_errors() {
        let mut config = HeraldConfig::default();
        config.state.queue_limit = 0;
        config.state.queue_warn_ratio = 1.5;
        config.notifier.log_level = "loud".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn serve_requires_token_chat_and_account() {
        let errors = validate_for_serve(&HeraldConfig::default()).unwrap_err();
        let keys: Vec<String> = errors
            .iter()
            .filter_map(|e| match e {
                ConfigError::MissingKey { key } => Some(key.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(
            keys,
            vec!["telegram.bot_token", "telegram.chat_id", "account.user_id"]
        );
    }

    #[test]
    fn partial_sections_take_field_defaults() {
        let toml_str = r#"
[state]
queue_limit = 25

[telegram]
chat_id = 555
"#;
        let config: HeraldConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.state.queue_limit, 25);
        assert_eq!(config.state.retention_days, 30);
        assert_eq!(config.state.queue_warn_ratio, 0.8);
        assert_eq!(config.telegram.effective_owner_id(), Some(555));
        assert_eq!(config.delivery.max_retries, 3);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn out_of_range_values_parse_but_fail_validation() {
        let toml_str = r#"
[state]
retention_days = 0
queue_warn_ratio = 0.0

[delivery]
max_retries = 0
"#;
        let config: HeraldConfig = toml::from_str(toml_str).unwrap();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn unknown_nested_key_is_rejected() {
        let toml_str = r#"
[delivery]
max_retries = 2
retry_forever = true
"#;
        assert!(toml::from_str::<HeraldConfig>(toml_str).is_err());
    }

    #[test]
    fn serve_accepts_complete_config() {
        let mut config = HeraldConfig::default();
        config.telegram.bot_token = Some("1:x".to_string());
        config.telegram.chat_id = Some(42);
        config.account.user_id = Some(7);
        assert!(validate_for_serve(&config).is_ok());
    }
}
