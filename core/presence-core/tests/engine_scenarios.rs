//! End-to-end scenarios driving the engine through a file-backed store.

use chrono::{DateTime, Duration, TimeZone, Utc};
use tempfile::tempdir;

use presence_core::{Activity, HistoryEngine, HistoryStore, ObservePolicy, StorageConfig};

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

#[test]
fn observe_suppress_then_shift_scenario() {
    // minChangeInterval = 5 minutes, as in the rate-limited tracker variant.
    let policy = ObservePolicy::new(Duration::minutes(5), Duration::minutes(30));
    let mut engine = HistoryEngine::new_in_memory(policy);

    engine.observe("U1", "Alice", &[Activity::new("Coding", "", "")], at(0));
    let record = engine.query("U1");
    assert_eq!(record.slots[0].name, "Coding");
    assert!(record.slots[1..].iter().all(Activity::is_sentinel));

    // One second later: same name inside the window, dropped entirely.
    engine.observe(
        "U1",
        "Alice",
        &[Activity::new("Coding", "", "refactor")],
        at(1),
    );
    let record = engine.query("U1");
    assert_eq!(record.slots[0].details, "");
    assert_eq!(record.last_change_at, Some(at(0)));

    // Six minutes in: a new activity pushes Coding down.
    engine.observe("U1", "Alice", &[Activity::new("Gaming", "", "")], at(6 * 60));
    let record = engine.query("U1");
    let names: Vec<&str> = record.slots.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Gaming", "Coding", "No data", "No data"]);
}

#[test]
fn history_survives_a_restart() {
    let temp = tempdir().unwrap();
    let storage = StorageConfig::with_root(temp.path().to_path_buf());

    {
        let store = HistoryStore::new(&storage.history_file());
        let mut engine = HistoryEngine::load(store, ObservePolicy::default()).unwrap();
        engine.ensure_tracked("u2", "Bob");
        engine.observe("u1", "Alice", &[Activity::new("Coding", "work", "x")], at(0));
        engine.observe("u1", "Alice", &[Activity::new("Gaming", "game", "")], at(120));
    }

    let store = HistoryStore::new(&storage.history_file());
    let engine = HistoryEngine::load(store, ObservePolicy::default()).unwrap();

    let record = engine.query("u1");
    assert_eq!(record.display_name, "Alice");
    assert_eq!(record.slots[0].name, "Gaming");
    assert_eq!(record.slots[1].name, "Coding");
    assert_eq!(record.last_change_at, Some(at(120)));

    let bob = engine.query("u2");
    assert_eq!(bob.display_name, "Bob");
    assert!(bob.slots.iter().all(Activity::is_sentinel));
}

#[test]
fn suppressed_observation_does_not_rewrite_the_snapshot() {
    let temp = tempdir().unwrap();
    let storage = StorageConfig::with_root(temp.path().to_path_buf());
    let store = HistoryStore::new(&storage.history_file());
    let mut engine = HistoryEngine::load(store, ObservePolicy::default()).unwrap();

    engine.observe("u1", "Alice", &[Activity::new("Coding", "", "x")], at(0));
    let before = std::fs::read_to_string(storage.history_file()).unwrap();

    // Same name ten seconds later: suppressed, so the file must not change
    // even at the byte level.
    engine.observe("u1", "Alice", &[Activity::new("Coding", "", "y")], at(10));
    let after = std::fs::read_to_string(storage.history_file()).unwrap();
    assert_eq!(before, after);
}

#[test]
fn query_never_creates_a_persisted_record() {
    let temp = tempdir().unwrap();
    let storage = StorageConfig::with_root(temp.path().to_path_buf());
    let store = HistoryStore::new(&storage.history_file());
    let engine = HistoryEngine::load(store, ObservePolicy::default()).unwrap();

    let record = engine.query("nobody");
    assert_eq!(record.display_name, "Unknown");
    assert!(!storage.history_file().exists());
}

#[test]
fn engine_recovers_from_a_corrupt_snapshot() {
    let temp = tempdir().unwrap();
    let storage = StorageConfig::with_root(temp.path().to_path_buf());
    std::fs::create_dir_all(storage.root()).unwrap();
    std::fs::write(storage.history_file(), "not json at all").unwrap();

    let store = HistoryStore::new(&storage.history_file());
    let mut engine = HistoryEngine::load(store, ObservePolicy::default()).unwrap();
    assert_eq!(engine.subject_count(), 0);

    // The engine starts fresh and the next mutation replaces the bad file.
    engine.observe("u1", "Alice", &[Activity::new("Coding", "", "")], at(0));
    let store = HistoryStore::new(&storage.history_file());
    let reloaded = store.load().unwrap();
    assert_eq!(reloaded.get("u1").unwrap().slots[0].name, "Coding");
}

#[test]
fn bulk_scan_then_presence_updates() {
    // Startup bulk scan ensures every member is tracked, then live presence
    // events flow in for a subset.
    let mut engine = HistoryEngine::new_in_memory(ObservePolicy::default());
    for (id, name) in [("u1", "Alice"), ("u2", "Bob"), ("u3", "Carol")] {
        engine.ensure_tracked(id, name);
    }
    assert_eq!(engine.subject_count(), 3);

    engine.observe("u2", "Bob", &[Activity::new("Streaming", "", "")], at(0));

    assert!(engine.query("u1").slots.iter().all(Activity::is_sentinel));
    assert_eq!(engine.query("u2").slots[0].name, "Streaming");
    assert_eq!(engine.query("u3").display_name, "Carol");
}
