// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Herald priority notifier.

use thiserror::Error;

/// The primary error type used across Herald crates and adapter traits.
///
/// Only [`HeraldError::Config`] is ever fatal, and only in the binary. Every
/// other variant is reported to a caller or logged while processing continues.
#[derive(Debug, Error)]
pub enum HeraldError {
    /// Missing or invalid configuration (bot token, account id, paths).
    #[error("configuration error: {0}")]
    Config(String),

    /// A snooze duration did not match `<digits><m|h|d>`.
    #[error("invalid duration `{input}`: expected a number followed by m, h or d (e.g. 30m, 2h, 1d)")]
    InvalidDuration { input: String },

    /// A command referenced a source that could not be resolved to an id.
    #[error("could not resolve `{identifier}`: {message}")]
    Resolution { identifier: String, message: String },

    /// Reading or writing the state file failed.
    #[error("persistence error: {message}")]
    Persistence {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The state file exists but could not be decoded.
    #[error("state file {path} is corrupted: {message}")]
    StateCorruption { path: String, message: String },

    /// The alert sink failed to deliver a message.
    #[error("sink error: {message}")]
    Sink {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Looking up the author of a replied-to message failed.
    #[error("reply lookup failed: {message}")]
    Lookup {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A command was recognised but its arguments were malformed.
    #[error("{0}")]
    Command(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl HeraldError {
    /// Builds a [`HeraldError::Persistence`] from an I/O or codec failure.
    pub fn persistence<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        HeraldError::Persistence {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Whether the error leaves state untouched and should be shown to the
    /// command issuer rather than logged.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            HeraldError::InvalidDuration { .. }
                | HeraldError::Resolution { .. }
                | HeraldError::Command(_)
        )
    }
}
