//! Integration tests for the on-disk exercise store.

use std::fs;

use tempfile::TempDir;
use weekly_workout_tracker::{
    Day, ExerciseStore, FieldUpdate, NewExercise, StoreError,
};

fn press() -> NewExercise {
    NewExercise {
        exercise: "Overhead press".into(),
        weight: "40".into(),
        unit: "kg".into(),
        rep_range_min: "6".into(),
        rep_range_max: "10".into(),
    }
}

#[test]
fn records_survive_reopening() {
    let temp = TempDir::new().unwrap();
    let db_path = temp.path().join("nested").join("workouts.sqlite");

    let id = {
        let store = ExerciseStore::open(&db_path).unwrap();
        let record = store.add(Day::Friday, &press()).unwrap();
        store
            .update_field(record.id, &FieldUpdate::RepsDone(9))
            .unwrap();
        record.id
    };

    let store = ExerciseStore::open(&db_path).unwrap();
    let friday = store.query_by_day(Day::Friday).unwrap();
    assert_eq!(friday.len(), 1);
    assert_eq!(friday[0].id, id);
    assert_eq!(friday[0].reps_done, 9);
    assert!(store.query_by_day(Day::Saturday).unwrap().is_empty());
}

#[test]
fn new_ids_continue_after_imported_ones() {
    let temp = TempDir::new().unwrap();
    let store = ExerciseStore::open(&temp.path().join("db.sqlite")).unwrap();

    store
        .import_json(
            r#"[{"id": 40, "day": "Monday", "exercise": "Row", "weight": "60",
                "unit": "kg", "repRangeMin": "8", "repRangeMax": "12", "repsDone": 0}]"#,
        )
        .unwrap();
    let added = store.add(Day::Monday, &press()).unwrap();
    assert!(added.id > 40);

    let ids: Vec<i64> = store
        .query_by_day(Day::Monday)
        .unwrap()
        .iter()
        .map(|record| record.id)
        .collect();
    assert_eq!(ids, vec![40, added.id]);
}

#[test]
fn file_export_round_trips_into_a_fresh_store() {
    let temp = TempDir::new().unwrap();
    let source = ExerciseStore::open(&temp.path().join("a.sqlite")).unwrap();
    source.add(Day::Tuesday, &press()).unwrap();
    source.add(Day::Sunday, &press()).unwrap();

    let export = temp.path().join("exercises.json");
    assert_eq!(source.export_to_path(&export).unwrap(), 2);

    let target = ExerciseStore::open(&temp.path().join("b.sqlite")).unwrap();
    let summary = target.import_from_path(&export).unwrap();
    assert_eq!(summary.inserted, 2);
    assert_eq!(target.export_all().unwrap(), source.export_all().unwrap());
}

#[test]
fn import_keeps_good_entries_and_reports_bad_ones() {
    let temp = TempDir::new().unwrap();
    let store = ExerciseStore::open(&temp.path().join("db.sqlite")).unwrap();
    let file = temp.path().join("mixed.json");
    fs::write(
        &file,
        r#"[
            {"day": "Wednesday", "exercise": "Deadlift", "weight": 140, "unit": "kg",
             "repRangeMin": 3, "repRangeMax": 5, "repsDone": "4"},
            {"day": "Someday", "exercise": "Curl", "weight": "15",
             "repRangeMin": "8", "repRangeMax": "12"}
        ]"#,
    )
    .unwrap();

    let summary = store.import_from_path(&file).unwrap();
    assert_eq!(summary.inserted, 1);
    assert_eq!(summary.rejected.len(), 1);
    assert_eq!(summary.rejected[0].index, 1);

    let wednesday = store.query_by_day(Day::Wednesday).unwrap();
    assert_eq!(wednesday[0].weight, "140");
    assert_eq!(wednesday[0].reps_done, 4);
}

#[test]
fn non_array_import_changes_nothing() {
    let temp = TempDir::new().unwrap();
    let store = ExerciseStore::open(&temp.path().join("db.sqlite")).unwrap();
    store.add(Day::Monday, &press()).unwrap();

    let err = store.import_json(r#"{"day": "Monday"}"#).unwrap_err();
    assert!(matches!(err, StoreError::MalformedImport { .. }));
    assert_eq!(store.export_all().unwrap().len(), 1);
}

#[test]
fn open_reports_a_file_that_is_not_a_database() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("notes.sqlite");
    fs::write(&path, "x".repeat(4096)).unwrap();

    let Err(err) = ExerciseStore::open(&path) else {
        panic!("garbage file should not open as a store");
    };
    assert!(matches!(err, StoreError::StorageUnavailable { .. }));
}

#[test]
fn open_reports_a_parent_that_is_a_file() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("blocker");
    fs::write(&blocker, "").unwrap();

    let Err(err) = ExerciseStore::open(&blocker.join("workouts.sqlite")) else {
        panic!("store under a regular file should not open");
    };
    assert!(matches!(err, StoreError::Io { .. }));
}
