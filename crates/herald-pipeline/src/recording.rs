// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade so any installed recorder can collect these.
//! Without a recorder every call is a no-op.

use metrics::describe_counter;

use crate::coordinator::Outcome;

/// Register all Herald metric descriptions.
pub fn register_metrics() {
    describe_counter!("herald_messages_total", "Inbound messages seen by the pipeline");
    describe_counter!("herald_alerts_total", "Alerts delivered or queued, by trigger kind");
    describe_counter!("herald_outcomes_total", "Pipeline outcomes, by outcome");
    describe_counter!("herald_sink_failures_total", "Alert deliveries the sink gave up on");
}

/// Record one handled message and its outcome.
pub fn record_outcome(outcome: &Outcome) {
    metrics::counter!("herald_messages_total").increment(1);
    metrics::counter!("herald_outcomes_total", "outcome" => outcome.label()).increment(1);
    if let Some(kind) = outcome.trigger() {
        metrics::counter!("herald_alerts_total", "trigger" => kind.to_string()).increment(1);
    }
}

/// Record a failed delivery.
pub fn record_sink_failure() {
    metrics::counter!("herald_sink_failures_total").increment(1);
}
