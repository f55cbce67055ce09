mod common;

use std::collections::HashSet;
use std::fs;

use common::{abc_chain, file_engine, stage, temp_dir};
use journey::domain::models::{JourneyState, ProgressStatus, ViewMode};
use journey::{JsonFileStore, ProgressStore, StoreError};

#[test]
fn test_completed_set_and_view_mode_round_trip() {
    let dir = temp_dir();
    let store = JsonFileStore::new(dir.path());

    let mut state = JourneyState::default();
    state.completed_stages = [2, 4, 7].into_iter().map(stage).collect();
    state.current_stage = stage(8);
    state.viewing_stage = stage(4);
    state.view_mode = ViewMode::PreviewBack;

    store.save_journey(&state).unwrap();
    let loaded = store.load_journey().unwrap().expect("record written");

    let expected: HashSet<_> = [2, 4, 7].into_iter().map(stage).collect();
    assert_eq!(loaded.completed_stages, expected);
    assert_eq!(loaded.view_mode, ViewMode::PreviewBack);
    assert_eq!(loaded.viewing_stage, stage(4));
}

#[test]
fn test_completed_list_order_is_insignificant() {
    let dir = temp_dir();
    let record = r#"{
        "version": 1,
        "saved_at": "2026-01-01T00:00:00Z",
        "data": {
            "current_stage": 5,
            "viewing_stage": 5,
            "view_mode": "current",
            "completed_stages": [4, 1, 3, 2, 3]
        }
    }"#;
    fs::write(dir.path().join("journey.json"), record).unwrap();

    let state = JsonFileStore::new(dir.path())
        .load_journey()
        .unwrap()
        .unwrap();
    assert_eq!(state.completed_sorted(), vec![stage(1), stage(2), stage(3), stage(4)]);
    assert!(state.meta(stage(5)).can_edit);
    assert!(state.meta(stage(2)).completed);
}

#[test]
fn test_engine_state_survives_restart() {
    let dir = temp_dir();
    let forest = abc_chain();

    {
        let mut engine = file_engine(&dir);
        engine.complete_stage();
        engine.complete_stage();
        engine.complete_node("guided", &forest, "A").unwrap();
        engine.outline("guided").unwrap().visit("B");
        assert!(engine.drain_notices().is_empty());
    }

    let mut engine = file_engine(&dir);
    assert_eq!(engine.stages().current_stage(), stage(3));
    assert_eq!(engine.ledger().current_xp(), 110);
    assert_eq!(engine.ledger().trophy_count(), 2);

    let book = engine.outline("guided").unwrap();
    assert_eq!(book.status("A"), ProgressStatus::Completed);
    assert_eq!(book.get("B").map(|record| record.visit_count), Some(1));
}

#[test]
fn test_corrupt_records_fall_back_to_defaults() {
    let dir = temp_dir();
    let profile = dir.path().join("profile");
    fs::create_dir_all(&profile).unwrap();
    fs::write(profile.join("journey.json"), "{ not json").unwrap();
    fs::write(
        profile.join("ledger.json"),
        r#"{"version": 99, "saved_at": "2026-01-01T00:00:00Z", "data": {}}"#,
    )
    .unwrap();

    let engine = file_engine(&dir);
    assert_eq!(engine.stages().state(), &JourneyState::default());
    assert_eq!(engine.ledger().current_xp(), 0);
}

#[test]
fn test_unsupported_version_is_reported_by_store() {
    let dir = temp_dir();
    fs::write(
        dir.path().join("ledger.json"),
        r#"{"version": 2, "saved_at": "2026-01-01T00:00:00Z", "data": {"current_xp": 10}}"#,
    )
    .unwrap();

    let result = JsonFileStore::new(dir.path()).load_ledger();
    assert!(matches!(
        result,
        Err(StoreError::UnsupportedVersion { found: 2, expected: 1 })
    ));
}

#[test]
fn test_out_of_range_stage_is_rejected() {
    let dir = temp_dir();
    fs::write(
        dir.path().join("journey.json"),
        r#"{"version": 1, "saved_at": "2026-01-01T00:00:00Z",
            "data": {"current_stage": 9, "viewing_stage": 1}}"#,
    )
    .unwrap();

    assert!(JsonFileStore::new(dir.path()).load_journey().is_err());
}

#[test]
fn test_no_temp_files_left_behind() {
    let dir = temp_dir();
    let mut engine = file_engine(&dir);
    engine.complete_stage();

    let names: Vec<String> = fs::read_dir(dir.path().join("profile"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert!(names.contains(&"journey.json".to_string()));
    assert!(names.contains(&"ledger.json".to_string()));
    assert!(names.iter().all(|name| !name.ends_with(".tmp")));
}
