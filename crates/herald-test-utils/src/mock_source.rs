// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock event source that replays a fixed list of messages.

use std::collections::VecDeque;

use async_trait::async_trait;
use herald_core::traits::{EventSource, PluginAdapter};
use herald_core::{AdapterType, HealthStatus, HeraldError, NormalizedMessage};

/// Yields the injected messages in order, then reports exhaustion.
#[derive(Default)]
pub struct MockEventSource {
    pending: VecDeque<NormalizedMessage>,
}

impl MockEventSource {
    pub fn new(messages: impl IntoIterator<Item = NormalizedMessage>) -> Self {
        Self {
            pending: messages.into_iter().collect(),
        }
    }

    pub fn inject(&mut self, msg: NormalizedMessage) {
        self.pending.push_back(msg);
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

#[async_trait]
impl PluginAdapter for MockEventSource {
    fn name(&self) -> &str {
        "mock-source"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Source
    }

    async fn health_check(&self) -> Result<HealthStatus, HeraldError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), HeraldError> {
        Ok(())
    }
}

#[async_trait]
impl EventSource for MockEventSource {
    async fn next_event(&mut self) -> Result<Option<NormalizedMessage>, HeraldError> {
        Ok(self.pending.pop_front())
    }
}
