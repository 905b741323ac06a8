// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Crash-safe JSON persistence of the [`StateDocument`].
//!
//! `load` and `save` never fail the caller. A missing file yields a fresh
//! document; an unreadable one is moved aside to `<path>.backup.<unix_ts>`
//! and replaced. Writes go to a temporary file in the same directory and are
//! renamed over the target, so a reader never sees half a document.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeDelta, Utc};
use herald_core::HeraldError;
use tempfile::NamedTempFile;
use tracing::{debug, error, info, warn};

use crate::document::{SCHEMA_VERSION, StateDocument};

/// How long processed records are kept and how often the sweep may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupPolicy {
    pub retention: TimeDelta,
    pub interval: TimeDelta,
}

impl Default for CleanupPolicy {
    fn default() -> Self {
        Self {
            retention: TimeDelta::days(30),
            interval: TimeDelta::hours(24),
        }
    }
}

impl CleanupPolicy {
    pub fn new(retention_days: u32, interval_hours: u32) -> Self {
        Self {
            retention: TimeDelta::days(i64::from(retention_days)),
            interval: TimeDelta::hours(i64::from(interval_hours)),
        }
    }

    pub fn is_due(&self, doc: &StateDocument, now: DateTime<Utc>) -> bool {
        now - doc.last_cleanup >= self.interval
    }

    /// Drops records older than the retention window and restarts the
    /// cleanup clock. Returns the number of records removed.
    pub fn cleanup(&self, doc: &mut StateDocument, now: DateTime<Utc>) -> usize {
        let removed = doc.processed_messages.sweep(now - self.retention);
        doc.last_cleanup = now;
        if removed > 0 {
            info!(removed, remaining = doc.processed_messages.len(), "cleaned up processed messages");
        } else {
            debug!("cleanup sweep found nothing to remove");
        }
        removed
    }
}

/// Owns the backing file of the state document.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
    policy: CleanupPolicy,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>, policy: CleanupPolicy) -> Self {
        Self {
            path: path.into(),
            policy,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn policy(&self) -> CleanupPolicy {
        self.policy
    }

    /// Loads the document, recovering from a missing or corrupted file.
    pub fn load(&self, now: DateTime<Utc>) -> StateDocument {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "state file does not exist, starting fresh");
                return StateDocument::fresh(now);
            }
            Err(e) => {
                let err = HeraldError::persistence(
                    format!("failed to read {}", self.path.display()),
                    e,
                );
                error!(error = %err, "could not read state, starting fresh");
                return StateDocument::fresh(now);
            }
        };

        match serde_json::from_str::<StateDocument>(&content) {
            Ok(mut doc) => {
                if doc.version > SCHEMA_VERSION {
                    warn!(
                        found = doc.version,
                        supported = SCHEMA_VERSION,
                        "state file written by a newer version, unknown fields are ignored"
                    );
                }
                doc.version = SCHEMA_VERSION;
                info!(
                    processed = doc.processed_messages.len(),
                    mode = %doc.priority_contacts.mode(),
                    "loaded state"
                );
                doc
            }
            Err(e) => {
                let err = HeraldError::StateCorruption {
                    path: self.path.display().to_string(),
                    message: e.to_string(),
                };
                let backup = self.backup_path(now);
                match std::fs::rename(&self.path, &backup) {
                    Ok(()) => warn!(error = %err, backup = %backup.display(), "backed up corrupted state"),
                    Err(rename_err) => warn!(
                        error = %err,
                        rename_error = %rename_err,
                        "failed to back up corrupted state"
                    ),
                }
                StateDocument::fresh(now)
            }
        }
    }

    /// Persists the document. Failures are logged; in-memory state stays
    /// authoritative until the next successful save.
    pub fn save(&self, doc: &StateDocument) {
        match self.try_save(doc) {
            Ok(()) => debug!(
                path = %self.path.display(),
                processed = doc.processed_messages.len(),
                "saved state"
            ),
            Err(e) => error!(error = %e, "failed to save state"),
        }
    }

    /// Atomic write: temp file in the target directory, fsync, rename.
    pub fn try_save(&self, doc: &StateDocument) -> Result<(), HeraldError> {
        let bytes = Self::encode(doc)?;
        self.write_encoded(&bytes)
    }

    /// Renders the document exactly as [`try_save`](Self::try_save) writes it.
    pub fn encode(doc: &StateDocument) -> Result<Vec<u8>, HeraldError> {
        let mut bytes = serde_json::to_vec_pretty(doc)
            .map_err(|e| HeraldError::persistence("failed to encode state", e))?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    /// Writes bytes from [`encode`](Self::encode) with the same atomic
    /// replace as [`try_save`](Self::try_save). Blocking.
    pub fn write_encoded(&self, bytes: &[u8]) -> Result<(), HeraldError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir)
            .map_err(|e| HeraldError::persistence("failed to create temp state file", e))?;
        tmp.write_all(bytes)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| HeraldError::persistence("failed to flush temp state file", e))?;
        tmp.persist(&self.path)
            .map_err(|e| HeraldError::persistence("failed to replace state file", e.error))?;
        Ok(())
    }

    /// Runs [`CleanupPolicy::cleanup`] with this store's policy.
    pub fn cleanup(&self, doc: &mut StateDocument, now: DateTime<Utc>) -> usize {
        self.policy.cleanup(doc, now)
    }

    fn backup_path(&self, now: DateTime<Utc>) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(format!(".backup.{}", now.timestamp()));
        PathBuf::from(name)
    }
}
