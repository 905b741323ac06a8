// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The serve loop: pulls events from a source into the pipeline until
//! cancelled, logging a heartbeat on a fixed interval.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use herald_core::traits::EventSource;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::coordinator::Pipeline;

#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub heartbeat_interval: Duration,
    /// Return once the source is exhausted instead of idling until cancelled.
    pub stop_at_end_of_input: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(3600),
            stop_at_end_of_input: false,
        }
    }
}

/// Runs until `cancel` fires (or the input ends, if so configured), then
/// logs a final heartbeat and flushes state.
pub async fn run(
    pipeline: Arc<Pipeline>,
    mut source: Box<dyn EventSource>,
    cancel: CancellationToken,
    options: RunOptions,
) {
    info!(source = source.name(), "event loop running");

    let mut heartbeat = tokio::time::interval_at(
        Instant::now() + options.heartbeat_interval,
        options.heartbeat_interval,
    );
    heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut input_open = true;

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                info!("shutdown signal received, stopping event loop");
                break;
            }
            _ = heartbeat.tick() => {
                pipeline.stats().log_heartbeat();
            }
            event = source.next_event(), if input_open => {
                match event {
                    Ok(Some(msg)) => {
                        pipeline.handle_message(&msg, Utc::now()).await;
                    }
                    Ok(None) => {
                        input_open = false;
                        if options.stop_at_end_of_input {
                            break;
                        }
                        info!("no more events, waiting for shutdown");
                    }
                    Err(e) => {
                        error!(error = %e, "event source failed, no further events will be read");
                        input_open = false;
                        if options.stop_at_end_of_input {
                            break;
                        }
                    }
                }
            }
        }
    }

    if let Err(e) = source.shutdown().await {
        error!(error = %e, "event source shutdown failed");
    }
    pipeline.stats().log_heartbeat();
    pipeline.flush().await;
    info!("event loop stopped");
}
