// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON Lines event source.
//!
//! Each non-empty line is one [`NormalizedMessage`] object. Lines that fail
//! to decode are logged and skipped so a single bad record cannot stall the
//! stream.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use herald_core::traits::{EventSource, PluginAdapter};
use herald_core::{AdapterType, HealthStatus, HeraldError, NormalizedMessage};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

type BoxedReader = Box<dyn AsyncBufRead + Send + Unpin>;

pub struct JsonlEventSource {
    name: String,
    lines: Mutex<Lines<BoxedReader>>,
    line_no: u64,
    exhausted: AtomicBool,
}

impl JsonlEventSource {
    pub fn from_reader(name: impl Into<String>, reader: impl AsyncBufRead + Send + Unpin + 'static) -> Self {
        let reader: BoxedReader = Box::new(reader);
        Self {
            name: name.into(),
            lines: Mutex::new(reader.lines()),
            line_no: 0,
            exhausted: AtomicBool::new(false),
        }
    }

    pub fn stdin() -> Self {
        Self::from_reader("stdin", BufReader::new(tokio::io::stdin()))
    }

    pub async fn open(path: &Path) -> Result<Self, HeraldError> {
        let file = tokio::fs::File::open(path).await.map_err(|e| {
            HeraldError::Config(format!("cannot open events file {}: {e}", path.display()))
        })?;
        Ok(Self::from_reader(path.display().to_string(), BufReader::new(file)))
    }

    /// `-` means stdin, anything else is a file path.
    pub async fn from_spec(events: &str) -> Result<Self, HeraldError> {
        if events == "-" {
            Ok(Self::stdin())
        } else {
            Self::open(Path::new(events)).await
        }
    }
}

#[async_trait]
impl PluginAdapter for JsonlEventSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Source
    }

    async fn health_check(&self) -> Result<HealthStatus, HeraldError> {
        if self.exhausted.load(Ordering::Relaxed) {
            Ok(HealthStatus::Degraded("end of input".to_string()))
        } else {
            Ok(HealthStatus::Healthy)
        }
    }

    async fn shutdown(&self) -> Result<(), HeraldError> {
        Ok(())
    }
}

#[async_trait]
impl EventSource for JsonlEventSource {
    async fn next_event(&mut self) -> Result<Option<NormalizedMessage>, HeraldError> {
        let lines = self.lines.get_mut();
        loop {
            let line = lines
                .next_line()
                .await
                .map_err(|e| HeraldError::Internal(format!("failed to read {}: {e}", self.name)))?;

            let Some(line) = line else {
                if !self.exhausted.swap(true, Ordering::Relaxed) {
                    info!(source = %self.name, lines = self.line_no, "event stream ended");
                }
                return Ok(None);
            };
            self.line_no += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<NormalizedMessage>(trimmed) {
                Ok(msg) => {
                    debug!(source = %self.name, line = self.line_no, key = %msg.key(), "event");
                    return Ok(Some(msg));
                }
                Err(e) => warn!(
                    source = %self.name,
                    line = self.line_no,
                    error = %e,
                    "skipping malformed event"
                ),
            }
        }
    }
}
