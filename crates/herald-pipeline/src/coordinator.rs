// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The pipeline coordinator.
//!
//! Owns the single [`StateDocument`] behind one async mutex. Inbound messages
//! and commands both go through it, so every read-modify-write of the state
//! is serialized and every save reflects mutations in the order they were
//! applied.
//!
//! Per message: housekeeping, snooze gate, priority filter, trigger
//! classifier, dedup, then commit (`mark_processed`, save, deliver). A sink
//! failure after the save leaves the dedup record in place; a lost alert is
//! preferred over a duplicate one.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use herald_core::traits::{AlertSink, ReplyLookup};
use herald_core::{HeraldError, NormalizedMessage, ResolvedSource, SourceId, TriggerKind};
use herald_state::{
    GateAction, ModeChange, PriorityMode, QueuedAlert, SnoozeBehavior, SnoozePhase, StateDocument,
    StateStore, housekeeping,
};
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::formatter::AlertFormatter;
use crate::recording;
use crate::stats::{PipelineStats, StatsSnapshot};
use crate::trigger::TriggerClassifier;

/// What happened to one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    BlockedSnooze,
    BlockedPriority,
    BlockedTrigger,
    Duplicate,
    Delivered(TriggerKind),
    Queued(TriggerKind),
}

impl Outcome {
    /// Stable label used in logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::BlockedSnooze => "blocked_snooze",
            Outcome::BlockedPriority => "blocked_priority",
            Outcome::BlockedTrigger => "blocked_trigger",
            Outcome::Duplicate => "duplicate",
            Outcome::Delivered(_) => "delivered",
            Outcome::Queued(_) => "queued",
        }
    }

    pub fn trigger(&self) -> Option<TriggerKind> {
        match self {
            Outcome::Delivered(kind) | Outcome::Queued(kind) => Some(*kind),
            _ => None,
        }
    }
}

/// Bound and warning threshold of the snooze queue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueueSettings {
    pub limit: usize,
    pub warn_ratio: f64,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            limit: 100,
            warn_ratio: 0.8,
        }
    }
}

/// A listed source with its display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedSource {
    pub id: SourceId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrioritySnapshot {
    pub mode: PriorityMode,
    pub whitelist: Vec<ListedSource>,
    pub blacklist: Vec<ListedSource>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SnoozeStatus {
    pub phase: SnoozePhase,
    pub until: Option<DateTime<Utc>>,
    pub remaining: Option<TimeDelta>,
    pub behavior: SnoozeBehavior,
    pub queued: usize,
    pub limit: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnsnoozeReport {
    pub was_active: bool,
    pub delivered: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub priority: PrioritySnapshot,
    pub snooze: SnoozeStatus,
    pub processed: usize,
    pub timezone_offset: f64,
    pub stats: StatsSnapshot,
}

pub struct Pipeline {
    state: Mutex<StateDocument>,
    store: StateStore,
    sink: Arc<dyn AlertSink>,
    lookup: Arc<dyn ReplyLookup>,
    classifier: TriggerClassifier,
    formatter: AlertFormatter,
    queue: QueueSettings,
    stats: PipelineStats,
}

impl Pipeline {
    pub fn new(
        doc: StateDocument,
        store: StateStore,
        sink: Arc<dyn AlertSink>,
        lookup: Arc<dyn ReplyLookup>,
        classifier: TriggerClassifier,
        queue: QueueSettings,
    ) -> Self {
        Self {
            state: Mutex::new(doc),
            store,
            sink,
            lookup,
            classifier,
            formatter: AlertFormatter::new(),
            queue,
            stats: PipelineStats::new(),
        }
    }

    /// Runs one message through the gating sequence.
    pub async fn handle_message(&self, msg: &NormalizedMessage, now: DateTime<Utc>) -> Outcome {
        let (outcome, outbound) = {
            let mut state = self.state.lock().await;
            let hk = housekeeping::tick(&mut state, now, &self.store.policy());
            let mut outbound: Vec<String> = hk.drained.iter().map(|a| a.text.clone()).collect();
            if !outbound.is_empty() {
                info!(count = outbound.len(), "delivering alerts released by snooze expiry");
            }

            let (outcome, alert) = self.decide(&mut state, msg, now).await;
            outbound.extend(alert);

            if hk.changed() || outcome.trigger().is_some() {
                self.persist(&state).await;
            }
            (outcome, outbound)
        };

        self.deliver_all(outbound).await;

        self.stats.record(&outcome);
        recording::record_outcome(&outcome);
        match outcome {
            Outcome::Delivered(kind) | Outcome::Queued(kind) => info!(
                key = %msg.key(),
                trigger = %kind,
                outcome = outcome.label(),
                "alert"
            ),
            _ => debug!(key = %msg.key(), outcome = outcome.label(), "message handled"),
        }
        outcome
    }

    /// Steps 1-5 of the gating sequence. Returns the alert text when it
    /// should be delivered right away.
    async fn decide(
        &self,
        state: &mut StateDocument,
        msg: &NormalizedMessage,
        now: DateTime<Utc>,
    ) -> (Outcome, Option<String>) {
        if state.snooze.phase(now) == SnoozePhase::ActiveDrop {
            return (Outcome::BlockedSnooze, None);
        }
        if !state
            .priority_contacts
            .allows_message(msg.sender_id, msg.chat_id)
        {
            return (Outcome::BlockedPriority, None);
        }
        // The lock stays held across the reply lookup: releasing it here would
        // let a concurrent copy of this message pass the dedup check below.
        // A slow lookup therefore delays commands too.
        let Some(kind) = self.classifier.classify(msg, self.lookup.as_ref()).await else {
            return (Outcome::BlockedTrigger, None);
        };
        if state
            .processed_messages
            .is_processed(msg.chat_id, msg.message_id)
        {
            return (Outcome::Duplicate, None);
        }

        let text = self.formatter.format(msg, kind, state.timezone_offset);
        let key = state
            .processed_messages
            .mark_processed(msg.chat_id, msg.message_id, kind, now);

        match state.snooze.on_message(
            QueuedAlert::new(text, key),
            self.queue.limit,
            self.queue.warn_ratio,
            now,
        ) {
            GateAction::Open(alert) => (Outcome::Delivered(kind), Some(alert.text)),
            GateAction::Queued { evicted } => {
                if let Some(evicted) = evicted {
                    debug!(evicted = ?evicted.key, "evicted oldest queued alert");
                }
                (Outcome::Queued(kind), None)
            }
            GateAction::Dropped => (Outcome::BlockedSnooze, None),
        }
    }

    /// Writes the document on the blocking pool. Callers hold the state lock
    /// across the await, so saves land in the order mutations were applied.
    async fn persist(&self, state: &StateDocument) {
        let bytes = match StateStore::encode(state) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(error = %e, "failed to encode state");
                return;
            }
        };
        let store = self.store.clone();
        let processed = state.processed_messages.len();
        match tokio::task::spawn_blocking(move || store.write_encoded(&bytes)).await {
            Ok(Ok(())) => debug!(processed, "saved state"),
            Ok(Err(e)) => error!(error = %e, "failed to save state"),
            Err(e) => error!(error = %e, "state save task did not complete"),
        }
    }

    /// Hands alerts to the sink in order. Returns how many succeeded.
    async fn deliver_all(&self, texts: Vec<String>) -> usize {
        let mut delivered = 0;
        for text in texts {
            match self.sink.deliver(&text).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    error!(sink = self.sink.name(), error = %e, "failed to deliver alert");
                    self.stats.record_sink_failure();
                    recording::record_sink_failure();
                }
            }
        }
        delivered
    }

    /// Locks the state, runs housekeeping, applies `f`, saves when anything
    /// changed and delivers alerts released by expiry.
    ///
    /// `f` returns its result and whether it mutated the document.
    async fn with_state<T>(
        &self,
        now: DateTime<Utc>,
        f: impl FnOnce(&mut StateDocument) -> (T, bool),
    ) -> T {
        let (value, drained) = {
            let mut state = self.state.lock().await;
            let hk = housekeeping::tick(&mut state, now, &self.store.policy());
            let (value, changed) = f(&mut state);
            if changed || hk.changed() {
                self.persist(&state).await;
            }
            (value, hk.drained)
        };

        if !drained.is_empty() {
            info!(count = drained.len(), "delivering alerts released by snooze expiry");
            self.deliver_all(drained.into_iter().map(|a| a.text).collect())
                .await;
        }
        value
    }

    pub async fn set_priority_mode(&self, mode: PriorityMode, now: DateTime<Utc>) -> ModeChange {
        self.with_state(now, |state| {
            let change = state.priority_contacts.set_mode(mode);
            if change.previous != change.current {
                info!(from = %change.previous, to = %change.current, "priority mode changed");
            }
            (change, change.previous != change.current)
        })
        .await
    }

    /// Returns `false` if the source was already whitelisted.
    pub async fn add_to_whitelist(&self, source: &ResolvedSource, now: DateTime<Utc>) -> bool {
        self.with_state(now, |state| {
            let added = state.priority_contacts.add_to_whitelist(source.id);
            if added {
                state
                    .priority_contacts
                    .set_name(source.id, source.display_name.clone());
                info!(id = source.id, name = %source.display_name, "added to whitelist");
            }
            (added, added)
        })
        .await
    }

    /// Returns `false` if the source was not whitelisted.
    pub async fn remove_from_whitelist(&self, id: SourceId, now: DateTime<Utc>) -> bool {
        self.with_state(now, |state| {
            let removed = state.priority_contacts.remove_from_whitelist(id);
            if removed {
                info!(id, "removed from whitelist");
            }
            (removed, removed)
        })
        .await
    }

    /// Returns `false` if the source was already blacklisted.
    pub async fn add_to_blacklist(&self, source: &ResolvedSource, now: DateTime<Utc>) -> bool {
        self.with_state(now, |state| {
            let added = state.priority_contacts.add_to_blacklist(source.id);
            if added {
                state
                    .priority_contacts
                    .set_name(source.id, source.display_name.clone());
                info!(id = source.id, name = %source.display_name, "added to blacklist");
            }
            (added, added)
        })
        .await
    }

    /// Returns `false` if the source was not blacklisted.
    pub async fn remove_from_blacklist(&self, id: SourceId, now: DateTime<Utc>) -> bool {
        self.with_state(now, |state| {
            let removed = state.priority_contacts.remove_from_blacklist(id);
            if removed {
                info!(id, "removed from blacklist");
            }
            (removed, removed)
        })
        .await
    }

    pub async fn priority_config(&self, now: DateTime<Utc>) -> PrioritySnapshot {
        self.with_state(now, |state| (priority_snapshot(state), false))
            .await
    }

    /// Starts or replaces the snooze window. Returns its end.
    pub async fn snooze(
        &self,
        duration: TimeDelta,
        behavior: SnoozeBehavior,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, HeraldError> {
        self.with_state(now, |state| match state.snooze.activate(duration, behavior, now) {
            Ok(end) => (Ok(end), true),
            Err(e) => (Err(e), false),
        })
        .await
    }

    /// Ends the snooze and delivers whatever was queued.
    pub async fn unsnooze(&self, now: DateTime<Utc>) -> UnsnoozeReport {
        let (was_active, drained) = self
            .with_state(now, |state| {
                if !state.snooze.phase(now).is_active() {
                    return ((false, Vec::new()), false);
                }
                ((true, state.snooze.deactivate(now)), true)
            })
            .await;

        let total = drained.len();
        let delivered = self
            .deliver_all(drained.into_iter().map(|a| a.text).collect())
            .await;
        UnsnoozeReport {
            was_active,
            delivered,
            total,
        }
    }

    pub async fn snooze_status(&self, now: DateTime<Utc>) -> SnoozeStatus {
        let limit = self.queue.limit;
        self.with_state(now, |state| (snooze_status(state, limit, now), false))
            .await
    }

    pub async fn set_timezone(&self, hours: f64, now: DateTime<Utc>) -> Result<(), HeraldError> {
        self.with_state(now, |state| match state.set_timezone_offset(hours) {
            Ok(()) => {
                info!(offset = hours, "timezone changed");
                (Ok(()), true)
            }
            Err(e) => (Err(e), false),
        })
        .await
    }

    pub async fn timezone(&self) -> f64 {
        self.state.lock().await.timezone_offset
    }

    pub async fn status(&self, now: DateTime<Utc>) -> StatusReport {
        let limit = self.queue.limit;
        let stats = self.stats.snapshot();
        self.with_state(now, |state| {
            let report = StatusReport {
                priority: priority_snapshot(state),
                snooze: snooze_status(state, limit, now),
                processed: state.processed_messages.len(),
                timezone_offset: state.timezone_offset,
                stats,
            };
            (report, false)
        })
        .await
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    pub fn queue_settings(&self) -> QueueSettings {
        self.queue
    }

    /// A copy of the current document.
    pub async fn snapshot(&self) -> StateDocument {
        self.state.lock().await.clone()
    }

    /// Saves the document unconditionally, e.g. on shutdown.
    pub async fn flush(&self) {
        let state = self.state.lock().await;
        self.persist(&state).await;
    }
}

fn priority_snapshot(state: &StateDocument) -> PrioritySnapshot {
    let filter = &state.priority_contacts;
    let list = |ids: &BTreeSet<SourceId>| -> Vec<ListedSource> {
        ids.iter()
            .map(|&id| ListedSource {
                id,
                name: filter.display_name(id),
            })
            .collect()
    };
    PrioritySnapshot {
        mode: filter.mode(),
        whitelist: list(filter.whitelist()),
        blacklist: list(filter.blacklist()),
    }
}

fn snooze_status(state: &StateDocument, limit: usize, now: DateTime<Utc>) -> SnoozeStatus {
    let gate = &state.snooze;
    SnoozeStatus {
        phase: gate.phase(now),
        until: gate.until(),
        remaining: gate.remaining(now),
        behavior: gate.behavior(),
        queued: gate.queue().len(),
        limit,
    }
}
