// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Alert sink trait for outbound alert delivery.

use async_trait::async_trait;

use crate::error::HeraldError;
use crate::traits::adapter::PluginAdapter;

/// Delivers formatted alert text to the user.
///
/// Retries and rate limiting are the sink's own concern. The pipeline logs a
/// failed delivery and moves on; it never retries.
#[async_trait]
pub trait AlertSink: PluginAdapter {
    /// Sends one formatted alert.
    async fn deliver(&self, text: &str) -> Result<(), HeraldError>;
}
