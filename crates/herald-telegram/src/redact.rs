// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bot token redaction for log output and error messages.
//!
//! Transport errors can echo the request URL, and Bot API URLs embed the
//! token. Everything this crate logs or returns goes through [`redact`].

use std::sync::LazyLock;

use regex::Regex;

/// Telegram bot tokens: `123456789:ABCdefGHI-zyx57W2v1u123ew11`.
static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{8,10}:[a-zA-Z0-9_\-]{35}").unwrap());

const REDACTED: &str = "[REDACTED]";

/// Replaces token-shaped substrings and the exact configured token.
pub fn redact(input: &str, token: &str) -> String {
    let result = TOKEN_PATTERN.replace_all(input, REDACTED);
    if token.is_empty() {
        return result.into_owned();
    }
    result.replace(token, REDACTED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_token_shaped_strings() {
        let input = "error sending request for url (https://api.telegram.org/bot123456789:ABCdefGHI-jklMNOpqrSTUvwxyz12345678/SendMessage)";
        let result = redact(input, "");
        assert!(result.contains(REDACTED));
        assert!(!result.contains("123456789:ABC"));
    }

    #[test]
    fn redacts_exact_configured_token() {
        let result = redact("failed with test:token in url", "test:token");
        assert_eq!(result, "failed with [REDACTED] in url");
    }

    #[test]
    fn leaves_plain_text_alone() {
        assert_eq!(redact("chat not found", "test:token"), "chat not found");
    }
}
