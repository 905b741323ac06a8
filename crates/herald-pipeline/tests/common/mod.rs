// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared fixtures for pipeline integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use herald_core::traits::ReplyLookup;
use herald_core::{SelfIdentity, SourceId};
use herald_pipeline::{Pipeline, QueueSettings, TriggerClassifier};
use herald_state::{CleanupPolicy, StateStore};
use herald_test_utils::{MockSink, StaticReplyLookup};
use tempfile::TempDir;

/// The monitored account.
pub const ME: SourceId = 1000;

pub fn t0() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

pub fn at(minutes: i64) -> DateTime<Utc> {
    t0() + TimeDelta::minutes(minutes)
}

/// A pipeline over a temporary state file and a capturing sink.
pub struct Harness {
    pub pipeline: Arc<Pipeline>,
    pub sink: MockSink,
    pub state_path: PathBuf,
    lookup: Arc<dyn ReplyLookup>,
    queue: QueueSettings,
    _dir: TempDir,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(Arc::new(StaticReplyLookup::new()), QueueSettings::default())
    }

    pub fn with_lookup(lookup: impl ReplyLookup) -> Self {
        Self::build(Arc::new(lookup), QueueSettings::default())
    }

    pub fn with_queue_limit(limit: usize) -> Self {
        Self::build(
            Arc::new(StaticReplyLookup::new()),
            QueueSettings {
                limit,
                warn_ratio: 0.8,
            },
        )
    }

    fn build(lookup: Arc<dyn ReplyLookup>, queue: QueueSettings) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let state_path = dir.path().join("state.json");
        let sink = MockSink::new();
        let pipeline = open(&state_path, sink.clone(), lookup.clone(), queue);
        Self {
            pipeline,
            sink,
            state_path,
            lookup,
            queue,
            _dir: dir,
        }
    }

    /// Simulates a restart: a new pipeline over the same state file.
    pub fn restart(&mut self) {
        self.pipeline = open(&self.state_path, self.sink.clone(), self.lookup.clone(), self.queue);
    }

    pub fn state_json(&self) -> serde_json::Value {
        let content = std::fs::read_to_string(&self.state_path).unwrap();
        serde_json::from_str(&content).unwrap()
    }
}

fn open(
    path: &std::path::Path,
    sink: MockSink,
    lookup: Arc<dyn ReplyLookup>,
    queue: QueueSettings,
) -> Arc<Pipeline> {
    let store = StateStore::new(path, CleanupPolicy::default());
    let doc = store.load(t0());
    Arc::new(Pipeline::new(
        doc,
        store,
        Arc::new(sink),
        lookup,
        TriggerClassifier::new(SelfIdentity::new(ME, Some("me".to_string()))),
        queue,
    ))
}
