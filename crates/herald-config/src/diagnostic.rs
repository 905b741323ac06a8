// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Miette diagnostics for configuration errors.
//!
//! Figment errors are traced back to where the offending value came from: a
//! TOML file (rendered with a source span) or a `HERALD_*` environment
//! variable (named in the help text). Unknown keys get a "did you mean?"
//! suggestion picked by Jaro-Winkler similarity.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use figment::error::Kind;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Catches `bot_tken` and `queue_limt`, rejects unrelated words.
const SUGGESTION_THRESHOLD: f64 = 0.75;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A key no section declares. `key` is the dotted path, e.g. `state.queue_limt`.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(herald::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys, env_var.as_deref()))
    )]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        /// Comma-separated keys of the enclosing section.
        valid_keys: String,
        /// Set when the key came from the environment.
        env_var: Option<String>,
        #[label("not a herald setting")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(
        code(herald::config::invalid_type),
        help("{}", invalid_type_help(expected, env_var.as_deref()))
    )]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
        env_var: Option<String>,
        #[label("expected {expected}")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A key `herald serve` cannot run without.
    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(herald::config::missing_key),
        help("add `{key} = <value>` to herald.toml or export {}", env_var_for(key))
    )]
    MissingKey { key: String },

    #[error("validation error: {message}")]
    #[diagnostic(code(herald::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(herald::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str, env_var: Option<&str>) -> String {
    let hint = match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    };
    match env_var {
        Some(var) => format!("{hint} (set by environment variable {var})"),
        None => hint,
    }
}

fn invalid_type_help(expected: &str, env_var: Option<&str>) -> String {
    match env_var {
        Some(var) => format!("expected {expected}; check the value of {var}"),
        None => format!("expected {expected}"),
    }
}

/// The `HERALD_*` variable that sets a dotted key.
pub fn env_var_for(dotted_key: &str) -> String {
    format!("HERALD_{}", dotted_key.replace('.', "_").to_ascii_uppercase())
}

/// Where the value behind a figment error was read from.
enum Origin<'a> {
    File { path: &'a str, content: &'a str },
    Env,
    Unknown,
}

impl<'a> Origin<'a> {
    /// Falls back to the only TOML source when figment cannot name the file,
    /// as with inline strings or a path given relative to another directory.
    fn of(error: &figment::Error, toml_sources: &'a [(String, String)]) -> Self {
        let metadata = error.metadata.as_ref();
        if metadata.is_some_and(|m| m.name.contains("environment")) {
            return Origin::Env;
        }
        let named = match metadata.and_then(|m| m.source.as_ref()) {
            Some(figment::Source::File(file)) => {
                let file = file.display().to_string();
                toml_sources.iter().find(|(path, _)| *path == file)
            }
            _ => None,
        };
        let single = match toml_sources {
            [only] => Some(only),
            _ => None,
        };
        match named.or(single) {
            Some((path, content)) => Origin::File { path, content },
            None => Origin::Unknown,
        }
    }

    fn env_var(&self, dotted_key: &str) -> Option<String> {
        matches!(self, Origin::Env).then(|| env_var_for(dotted_key))
    }

    fn locate(
        &self,
        section: &[String],
        field: &str,
    ) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
        let Origin::File { path, content } = self else {
            return (None, None);
        };
        match find_key_offset(content, section, field) {
            Some(offset) => (
                Some(SourceSpan::new(offset.into(), field.len())),
                Some(NamedSource::new(*path, content.to_string())),
            ),
            None => (None, None),
        }
    }
}

fn dotted(section: &[String], field: &str) -> String {
    section
        .iter()
        .map(String::as_str)
        .chain([field])
        .collect::<Vec<_>>()
        .join(".")
}

/// Convert a `figment::Error` (which may hold several errors) into diagnostics.
///
/// `toml_sources` pairs each config file path with its content so spans can
/// be rendered.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| convert(&error, toml_sources))
        .collect()
}

fn convert(error: &figment::Error, toml_sources: &[(String, String)]) -> ConfigError {
    let origin = Origin::of(error, toml_sources);
    match &error.kind {
        Kind::UnknownField(field, expected) => {
            let key = dotted(&error.path, field);
            let (span, src) = origin.locate(&error.path, field);
            ConfigError::UnknownKey {
                suggestion: suggest_key(field, expected),
                valid_keys: expected.join(", "),
                env_var: origin.env_var(&key),
                key,
                span,
                src,
            }
        }
        Kind::MissingField(field) => ConfigError::MissingKey {
            key: dotted(&error.path, field),
        },
        Kind::InvalidType(actual, expected) => {
            let key = error.path.join(".");
            let (span, src) = match error.path.split_last() {
                Some((field, section)) => origin.locate(section, field),
                None => (None, None),
            };
            ConfigError::InvalidType {
                detail: format!("found {actual}, expected {expected}"),
                expected: expected.to_string(),
                env_var: origin.env_var(&key),
                key,
                span,
                src,
            }
        }
        _ => ConfigError::Other(error.to_string()),
    }
}

/// Byte offset of `field` inside the `[section]` table of TOML `content`.
///
/// The search ends at the next table header, so a key of the same name in a
/// later section is never reported.
pub fn find_key_offset(content: &str, section: &[String], field: &str) -> Option<usize> {
    let start = if section.is_empty() {
        0
    } else {
        let header = format!("[{}]", section.join("."));
        content.find(&header)? + header.len()
    };

    let mut offset = start;
    for line in content[start..].split_inclusive('\n') {
        let trimmed = line.trim_start();
        if trimmed.starts_with('[') {
            break;
        }
        if let Some(after) = trimmed.strip_prefix(field)
            && after.trim_start().starts_with('=')
        {
            return Some(offset + (line.len() - trimmed.len()));
        }
        offset += line.len();
    }
    None
}

/// Best valid key above the similarity threshold, if any.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Render diagnostics to stderr using miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        match handler.render_report(&mut buf, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{buf}"),
            Err(_) => eprintln!("Error: {error}"),
        }
    }
}
