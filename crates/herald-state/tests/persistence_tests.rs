// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for loading and saving the state document.

use chrono::{DateTime, TimeDelta, Utc};
use herald_core::{MessageKey, TriggerKind};
use herald_state::{
    CleanupPolicy, PriorityMode, QueuedAlert, SCHEMA_VERSION, SnoozeBehavior, StateDocument,
    StateStore,
};

fn now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

fn store_in(dir: &tempfile::TempDir) -> StateStore {
    StateStore::new(dir.path().join("state.json"), CleanupPolicy::default())
}

fn populated() -> StateDocument {
    let mut doc = StateDocument::fresh(now());
    doc.processed_messages
        .mark_processed(10, 5, TriggerKind::Dm, now());
    doc.processed_messages
        .mark_processed(-100200, 9, TriggerKind::Mention, now() - TimeDelta::hours(3));
    doc.priority_contacts.add_to_whitelist(42);
    doc.priority_contacts.set_name(42, "Alice (@alice)");
    doc.priority_contacts.add_to_blacklist(-100300);
    doc.priority_contacts.set_mode(PriorityMode::Blacklist);
    doc.snooze
        .activate(TimeDelta::hours(2), SnoozeBehavior::Queue, now())
        .unwrap();
    doc.snooze.on_message(
        QueuedAlert::new("🔔 <b>Bob</b>", MessageKey::new(7, 1)),
        100,
        0.8,
        now(),
    );
    doc.set_timezone_offset(-5.0).unwrap();
    doc
}

#[test]
fn missing_file_loads_fresh() {
    let dir = tempfile::tempdir().unwrap();
    let doc = store_in(&dir).load(now());
    assert_eq!(doc, StateDocument::fresh(now()));
    assert_eq!(doc.priority_contacts.mode(), PriorityMode::Disabled);
    assert!(doc.processed_messages.is_empty());
}

#[test]
fn save_then_load_round_trips_populated_document() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    let doc = populated();

    store.try_save(&doc).unwrap();
    assert_eq!(store.load(now()), doc);
}

#[test]
fn save_then_load_round_trips_empty_document() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    let doc = StateDocument::fresh(now());

    store.save(&doc);
    assert_eq!(store.load(now() + TimeDelta::days(1)), doc);
}

#[test]
fn saved_layout_matches_documented_keys() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    store.try_save(&populated()).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(raw["version"], SCHEMA_VERSION);
    assert_eq!(raw["processed_messages"]["10:5"]["trigger_type"], "DM");
    assert_eq!(raw["processed_messages"]["10:5"]["timestamp"], 1_700_000_000);
    assert_eq!(raw["last_cleanup"], 1_700_000_000);
    assert_eq!(raw["priority_contacts"]["mode"], "blacklist");
    assert_eq!(raw["priority_contacts"]["whitelist"][0], 42);
    assert_eq!(raw["snooze"]["active"], true);
    assert_eq!(raw["snooze"]["until"], 1_700_007_200);
    assert_eq!(raw["snooze"]["behavior"], "queue");
    assert_eq!(raw["snooze"]["queue"][0]["message"], "🔔 <b>Bob</b>");
}

#[test]
fn corrupted_file_is_backed_up_and_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    std::fs::write(store.path(), "{ not json").unwrap();

    let doc = store.load(now());
    assert_eq!(doc, StateDocument::fresh(now()));
    assert!(!store.path().exists());

    let backup = dir.path().join("state.json.backup.1700000000");
    assert_eq!(std::fs::read_to_string(backup).unwrap(), "{ not json");
}

#[test]
fn wrong_shape_counts_as_corruption() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    std::fs::write(store.path(), r#"{"processed_messages": 12}"#).unwrap();

    let doc = store.load(now());
    assert!(doc.processed_messages.is_empty());
    assert!(dir.path().join("state.json.backup.1700000000").exists());
}

#[test]
fn partial_document_fills_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    std::fs::write(
        store.path(),
        r#"{"processed_messages": {"1:2": {"timestamp": 1699999999, "trigger_type": "Reply"}}}"#,
    )
    .unwrap();

    let doc = store.load(now());
    assert!(doc.processed_messages.is_processed(1, 2));
    assert_eq!(doc.priority_contacts.mode(), PriorityMode::Disabled);
    assert_eq!(doc.timezone_offset, 0.0);
}

#[test]
fn record_missing_trigger_keeps_the_rest_of_the_document() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    std::fs::write(
        store.path(),
        r#"{"processed_messages":{"10:5":{"timestamp":1700000000}},"priority_contacts":{"mode":"whitelist","whitelist":[42],"blacklist":[]}}"#,
    )
    .unwrap();

    let doc = store.load(now() + TimeDelta::seconds(100));
    assert_eq!(doc.priority_contacts.mode(), PriorityMode::Whitelist);
    assert!(doc.priority_contacts.whitelist().contains(&42));
    assert!(doc.processed_messages.is_processed(10, 5));

    let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1, "no backup should be written");
}

#[test]
fn nested_missing_keys_are_defaulted_or_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    std::fs::write(
        store.path(),
        r#"{
  "processed_messages": {
    "1:1": {"trigger_type": "DM"},
    "1:2": {"timestamp": 1699999000, "trigger_type": "Mention"},
    "1:3": {"timestamp": [], "trigger_type": "Reply"}
  },
  "priority_contacts": {"mode": "blacklist", "blacklist": [7]},
  "snooze": {
    "active": true,
    "until": 1700003600,
    "behavior": "queue",
    "queue": [{"key": "1:9"}, {"message": "held", "key": "1:2"}]
  }
}"#,
    )
    .unwrap();

    let mut doc = store.load(now());
    assert!(doc.priority_contacts.whitelist().is_empty());
    assert!(!doc.priority_contacts.allows(7));
    assert!(doc.snooze.phase(now()).is_active());
    let held: Vec<&str> = doc.snooze.queue().iter().map(|a| a.text.as_str()).collect();
    assert_eq!(held, vec!["held"]);

    assert!(doc.processed_messages.is_processed(1, 1));
    assert!(!doc.processed_messages.is_processed(1, 3));
    assert_eq!(store.cleanup(&mut doc, now()), 1);
    assert!(!doc.processed_messages.is_processed(1, 1));
    assert!(doc.processed_messages.is_processed(1, 2));
}

#[test]
fn snooze_object_without_queue_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    std::fs::write(
        store.path(),
        r#"{"snooze": {"active": true, "until": 1700003600, "behavior": "queue"}}"#,
    )
    .unwrap();

    let doc = store.load(now());
    assert!(doc.snooze.phase(now()).is_active());
    assert!(doc.snooze.queue().is_empty());
}

#[test]
fn save_overwrites_without_leaving_temp_files() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    store.try_save(&StateDocument::fresh(now())).unwrap();
    store.try_save(&populated()).unwrap();

    let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(store.load(now()), populated());
}

#[test]
fn save_into_missing_directory_fails_without_panicking() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(
        dir.path().join("missing").join("state.json"),
        CleanupPolicy::default(),
    );
    assert!(store.try_save(&StateDocument::fresh(now())).is_err());
    store.save(&StateDocument::fresh(now()));
}
