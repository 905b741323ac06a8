// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock alert sink for deterministic testing.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use herald_core::traits::{AlertSink, PluginAdapter};
use herald_core::{AdapterType, HealthStatus, HeraldError};
use tokio::sync::Mutex;

/// Captures every alert passed to `deliver()`.
///
/// With [`set_failing`](Self::set_failing) enabled, deliveries return
/// [`HeraldError::Sink`] and nothing is captured.
#[derive(Clone, Default)]
pub struct MockSink {
    delivered: Arc<Mutex<Vec<String>>>,
    failing: Arc<AtomicBool>,
}

impl MockSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose deliveries always fail.
    pub fn failing() -> Self {
        let sink = Self::default();
        sink.set_failing(true);
        sink
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// All alerts delivered so far, in order.
    pub async fn delivered(&self) -> Vec<String> {
        self.delivered.lock().await.clone()
    }

    pub async fn delivered_count(&self) -> usize {
        self.delivered.lock().await.len()
    }

    pub async fn clear(&self) {
        self.delivered.lock().await.clear();
    }
}

#[async_trait]
impl PluginAdapter for MockSink {
    fn name(&self) -> &str {
        "mock-sink"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Sink
    }

    async fn health_check(&self) -> Result<HealthStatus, HeraldError> {
        if self.failing.load(Ordering::SeqCst) {
            Ok(HealthStatus::Degraded("configured to fail".to_string()))
        } else {
            Ok(HealthStatus::Healthy)
        }
    }

    async fn shutdown(&self) -> Result<(), HeraldError> {
        Ok(())
    }
}

#[async_trait]
impl AlertSink for MockSink {
    async fn deliver(&self, text: &str) -> Result<(), HeraldError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(HeraldError::Sink {
                message: "mock sink configured to fail".to_string(),
                source: None,
            });
        }
        self.delivered.lock().await.push(text.to_string());
        Ok(())
    }
}
