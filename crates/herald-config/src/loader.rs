// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `./herald.toml` > `~/.config/herald/herald.toml` >
//! `/etc/herald/herald.toml`, with `HERALD_*` environment variables on top.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::HeraldConfig;

/// Sections recognised in `HERALD_<SECTION>_<KEY>` variables.
const ENV_SECTIONS: &[&str] = &["notifier", "account", "telegram", "state", "delivery", "source"];

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/herald/herald.toml`
/// 3. `~/.config/herald/herald.toml`
/// 4. `./herald.toml`
/// 5. `HERALD_*` environment variables
pub fn load_config() -> Result<HeraldConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<HeraldConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HeraldConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from an explicit file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<HeraldConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HeraldConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The Figment behind [`load_config`], exposed so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(HeraldConfig::default()))
        .merge(Toml::file("/etc/herald/herald.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("herald/herald.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("herald.toml"))
        .merge(env_provider())
}

/// Maps `HERALD_STATE_QUEUE_LIMIT` to `state.queue_limit`.
///
/// Only the first underscore after a known section becomes a dot, so keys
/// that themselves contain underscores survive intact.
fn env_provider() -> Env {
    Env::prefixed("HERALD_").map(|key| map_env_key(key.as_str()).into())
}

fn map_env_key(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_split_on_section_only() {
        assert_eq!(map_env_key("telegram_bot_token"), "telegram.bot_token");
        assert_eq!(map_env_key("state_queue_warn_ratio"), "state.queue_warn_ratio");
        assert_eq!(map_env_key("account_user_id"), "account.user_id");
    }

    #[test]
    fn unknown_section_is_left_alone() {
        assert_eq!(map_env_key("mystery_key"), "mystery_key");
    }

    #[test]
    fn env_overrides_file_values() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("custom.toml", "[state]\nqueue_limit = 50\n")?;
            jail.set_env("HERALD_STATE_QUEUE_LIMIT", "25");
            jail.set_env("HERALD_TELEGRAM_BOT_TOKEN", "123:abc");

            let config = load_config_from_path(Path::new("custom.toml"))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.state.queue_limit, 25);
            assert_eq!(config.telegram.bot_token.as_deref(), Some("123:abc"));
            Ok(())
        });
    }
}
