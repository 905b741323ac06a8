// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `herald status` command implementation.
//!
//! Reads the state file directly and never writes it: a corrupted file is
//! reported, not backed up, so it can be inspected while `serve` is down.

use std::path::Path;

use chrono::{DateTime, Utc};
use herald_config::HeraldConfig;
use herald_core::HeraldError;
use herald_pipeline::formatter::offset_label;
use herald_state::{SnoozePhase, StateDocument, format_remaining};
use serde::Serialize;

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusSummary {
    pub path: String,
    pub exists: bool,
    pub version: u32,
    pub processed_messages: usize,
    pub last_cleanup: DateTime<Utc>,
    pub priority_mode: String,
    pub whitelist: usize,
    pub blacklist: usize,
    pub snooze_active: bool,
    pub snooze_until: Option<DateTime<Utc>>,
    pub snooze_behavior: String,
    pub queued_alerts: usize,
    pub timezone_offset: f64,
}

impl StatusSummary {
    pub fn from_document(path: &Path, exists: bool, doc: &StateDocument, now: DateTime<Utc>) -> Self {
        let phase = doc.snooze.phase(now);
        Self {
            path: path.display().to_string(),
            exists,
            version: doc.version,
            processed_messages: doc.processed_messages.len(),
            last_cleanup: doc.last_cleanup,
            priority_mode: doc.priority_contacts.mode().to_string(),
            whitelist: doc.priority_contacts.whitelist().len(),
            blacklist: doc.priority_contacts.blacklist().len(),
            snooze_active: phase.is_active(),
            snooze_until: phase.is_active().then(|| doc.snooze.until()).flatten(),
            snooze_behavior: doc.snooze.behavior().to_string(),
            queued_alerts: doc.snooze.queue().len(),
            timezone_offset: doc.timezone_offset,
        }
    }

    pub fn render(&self, now: DateTime<Utc>) -> String {
        let mut lines = vec![format!("state file:     {}", self.path)];
        if !self.exists {
            lines.push("                (not created yet)".to_string());
        }
        lines.push(format!("schema version: {}", self.version));
        lines.push(format!(
            "processed:      {} messages (last cleanup {})",
            self.processed_messages,
            self.last_cleanup.format("%Y-%m-%d %H:%M UTC")
        ));
        lines.push(format!(
            "priority mode:  {} ({} priority, {} muted)",
            self.priority_mode, self.whitelist, self.blacklist
        ));
        let snooze = match self.snooze_until {
            Some(until) if self.snooze_active => format!(
                "active, {} remaining ({}), until {}",
                format_remaining(until - now),
                self.snooze_behavior,
                until.format("%Y-%m-%d %H:%M UTC")
            ),
            _ => "inactive".to_string(),
        };
        lines.push(format!("snooze:         {snooze}"));
        if self.queued_alerts > 0 {
            lines.push(format!("queued alerts:  {}", self.queued_alerts));
        }
        lines.push(format!("timezone:       {}", offset_label(self.timezone_offset)));
        lines.join("\n")
    }
}

/// Reads the state file without side effects.
pub fn read_state(path: &Path, now: DateTime<Utc>) -> Result<(bool, StateDocument), HeraldError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok((false, StateDocument::fresh(now)));
        }
        Err(e) => {
            return Err(HeraldError::persistence(
                format!("failed to read {}", path.display()),
                e,
            ));
        }
    };
    let doc = serde_json::from_str(&content).map_err(|e| HeraldError::StateCorruption {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    Ok((true, doc))
}

pub fn run_status(config: &HeraldConfig, json: bool) -> Result<(), HeraldError> {
    let now = Utc::now();
    let path = Path::new(&config.state.path);
    let (exists, doc) = read_state(path, now)?;
    let summary = StatusSummary::from_document(path, exists, &doc, now);

    if json {
        let out = serde_json::to_string_pretty(&summary)
            .map_err(|e| HeraldError::Internal(format!("failed to encode status: {e}")))?;
        println!("{out}");
    } else {
        println!("{}", summary.render(now));
        if doc.snooze.phase(now) == SnoozePhase::Inactive && !doc.snooze.queue().is_empty() {
            println!("note: queued alerts will be delivered on the next serve tick");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;
    use herald_state::SnoozeBehavior;

    use super::*;

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn missing_file_reads_as_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let (exists, doc) = read_state(&path, t0()).unwrap();
        assert!(!exists);
        assert!(doc.processed_messages.is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn corrupted_file_is_reported_and_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{ nope").unwrap();
        assert!(matches!(
            read_state(&path, t0()),
            Err(HeraldError::StateCorruption { .. })
        ));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ nope");
    }

    #[test]
    fn summary_of_active_snooze() {
        let mut doc = StateDocument::fresh(t0());
        doc.snooze
            .activate(TimeDelta::hours(2), SnoozeBehavior::Queue, t0())
            .unwrap();
        doc.priority_contacts.add_to_whitelist(7);

        let summary = StatusSummary::from_document(Path::new("s.json"), true, &doc, t0());
        assert!(summary.snooze_active);
        assert_eq!(summary.whitelist, 1);

        let text = summary.render(t0());
        assert!(text.contains("priority mode:  disabled (1 priority, 0 muted)"));
        assert!(text.contains("snooze:         active, 2.0h remaining (queue)"));
        assert!(text.contains("timezone:       UTC"));
    }
}
