use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{Result, StorageContext, StoreError};
use crate::models::{Day, ExerciseRecord, FieldUpdate, NewExercise};

impl ToSql for Day {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Day {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|err| FromSqlError::Other(Box::new(err)))
    }
}

const SELECT_COLUMNS: &str =
    "SELECT id, day, exercise, weight, unit, rep_range_min, rep_range_max, reps_done
     FROM exercises";

fn exercise_from_row(row: &Row<'_>) -> rusqlite::Result<ExerciseRecord> {
    Ok(ExerciseRecord {
        id: row.get(0)?,
        day: row.get(1)?,
        exercise: row.get(2)?,
        weight: row.get(3)?,
        unit: row.get(4)?,
        rep_range_min: row.get(5)?,
        rep_range_max: row.get(6)?,
        reps_done: row.get(7)?,
    })
}

/// Trim the form input and make sure every required field has content. The
/// unit is the only optional field.
pub(crate) fn validate_new_exercise(input: &NewExercise) -> Result<NewExercise> {
    let required = [
        ("exercise", &input.exercise),
        ("weight", &input.weight),
        ("rep range min", &input.rep_range_min),
        ("rep range max", &input.rep_range_max),
    ];
    if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
        return Err(StoreError::Validation { field: *field });
    }

    Ok(NewExercise {
        exercise: input.exercise.trim().to_string(),
        weight: input.weight.trim().to_string(),
        unit: input.unit.trim().to_string(),
        rep_range_min: input.rep_range_min.trim().to_string(),
        rep_range_max: input.rep_range_max.trim().to_string(),
    })
}

/// Insert a validated exercise with zero reps done and echo the hydrated
/// record so callers do not have to re-query for the id.
pub(crate) fn insert_exercise(
    conn: &Connection,
    day: Day,
    input: &NewExercise,
) -> Result<ExerciseRecord> {
    conn.execute(
        "INSERT INTO exercises (day, exercise, weight, unit, rep_range_min, rep_range_max, reps_done)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0)",
        params![
            day,
            input.exercise,
            input.weight,
            input.unit,
            input.rep_range_min,
            input.rep_range_max
        ],
    )
    .storage("failed to insert exercise")?;

    Ok(ExerciseRecord {
        id: conn.last_insert_rowid(),
        day,
        exercise: input.exercise.clone(),
        weight: input.weight.clone(),
        unit: input.unit.clone(),
        rep_range_min: input.rep_range_min.clone(),
        rep_range_max: input.rep_range_max.clone(),
        reps_done: 0,
    })
}

/// Every exercise logged for `day`, oldest first. The day index serves the
/// lookup; ordering by id keeps cards in the order they were added.
pub(crate) fn fetch_exercises_for_day(conn: &Connection, day: Day) -> Result<Vec<ExerciseRecord>> {
    let mut stmt = conn
        .prepare(&format!("{SELECT_COLUMNS} WHERE day = ?1 ORDER BY id"))
        .storage("failed to prepare day query")?;

    let exercises = stmt
        .query_map([day], exercise_from_row)
        .storage("failed to load exercises for day")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .storage("failed to collect exercises for day")?;

    Ok(exercises)
}

/// Every exercise across the week, ordered by id. Used for export.
pub(crate) fn fetch_all_exercises(conn: &Connection) -> Result<Vec<ExerciseRecord>> {
    let mut stmt = conn
        .prepare(&format!("{SELECT_COLUMNS} ORDER BY id"))
        .storage("failed to prepare export query")?;

    let exercises = stmt
        .query_map([], exercise_from_row)
        .storage("failed to load exercises")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .storage("failed to collect exercises")?;

    Ok(exercises)
}

pub(crate) fn fetch_exercise(conn: &Connection, id: i64) -> Result<Option<ExerciseRecord>> {
    conn.query_row(
        &format!("{SELECT_COLUMNS} WHERE id = ?1"),
        [id],
        exercise_from_row,
    )
    .optional()
    .storage("failed to load exercise")
}

/// Read-modify-write a single field inside one transaction so the returned
/// record is exactly what was committed.
pub(crate) fn update_exercise_field(
    conn: &Connection,
    id: i64,
    update: &FieldUpdate,
) -> Result<ExerciseRecord> {
    let tx = conn
        .unchecked_transaction()
        .storage("failed to start update transaction")?;

    let mut record = fetch_exercise(&tx, id)?.ok_or(StoreError::NotFound { id })?;
    update.apply(&mut record);

    tx.execute(
        "UPDATE exercises
         SET weight = ?1, unit = ?2, rep_range_min = ?3, rep_range_max = ?4, reps_done = ?5
         WHERE id = ?6",
        params![
            record.weight,
            record.unit,
            record.rep_range_min,
            record.rep_range_max,
            record.reps_done,
            id
        ],
    )
    .storage("failed to update exercise")?;

    tx.commit().storage("failed to commit exercise update")?;
    Ok(record)
}

/// Remove an exercise. Deleting an id that is already gone is not an error;
/// the return value reports whether a row was removed.
pub(crate) fn delete_exercise(conn: &Connection, id: i64) -> Result<bool> {
    let deleted = conn
        .execute("DELETE FROM exercises WHERE id = ?1", params![id])
        .storage("failed to delete exercise")?;
    Ok(deleted > 0)
}

pub(crate) fn clear_exercises(conn: &Connection) -> Result<usize> {
    conn.execute("DELETE FROM exercises", [])
        .storage("failed to clear exercises")
}

/// Distinct non-empty units already in use, for the unit auto-complete.
pub(crate) fn fetch_units(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare(
            "SELECT DISTINCT unit FROM exercises
             WHERE unit <> ''
             ORDER BY LOWER(unit), unit",
        )
        .storage("failed to prepare unit query")?;

    let units = stmt
        .query_map([], |row| row.get(0))
        .storage("failed to load units")?
        .collect::<rusqlite::Result<Vec<String>>>()
        .storage("failed to collect units")?;

    Ok(units)
}

pub(crate) fn exercise_exists(conn: &Connection, id: i64) -> Result<bool> {
    conn.query_row("SELECT 1 FROM exercises WHERE id = ?1", [id], |_| Ok(()))
        .optional()
        .map(|found| found.is_some())
        .storage("failed to check exercise id")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::open_memory_connection;

    fn squat() -> NewExercise {
        NewExercise {
            exercise: "Squat".into(),
            weight: "100".into(),
            unit: "kg".into(),
            rep_range_min: "5".into(),
            rep_range_max: "8".into(),
        }
    }

    #[test]
    fn validation_trims_and_reports_first_blank_field() {
        let mut input = squat();
        input.exercise = "  Squat ".into();
        input.unit = "".into();
        let clean = validate_new_exercise(&input).unwrap();
        assert_eq!(clean.exercise, "Squat");
        assert_eq!(clean.unit, "");

        input.weight = "   ".into();
        let err = validate_new_exercise(&input).unwrap_err();
        assert!(matches!(err, StoreError::Validation { field: "weight" }));
    }

    #[test]
    fn day_round_trips_through_sqlite() {
        let conn = open_memory_connection().unwrap();
        let record = insert_exercise(&conn, Day::Saturday, &squat()).unwrap();
        let stored: String = conn
            .query_row("SELECT day FROM exercises WHERE id = ?1", [record.id], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(stored, "Saturday");
        assert_eq!(fetch_exercise(&conn, record.id).unwrap().unwrap().day, Day::Saturday);
    }

    #[test]
    fn day_query_only_returns_matching_rows_in_id_order() {
        let conn = open_memory_connection().unwrap();
        let first = insert_exercise(&conn, Day::Monday, &squat()).unwrap();
        insert_exercise(&conn, Day::Tuesday, &squat()).unwrap();
        let third = insert_exercise(&conn, Day::Monday, &squat()).unwrap();

        let ids: Vec<i64> = fetch_exercises_for_day(&conn, Day::Monday)
            .unwrap()
            .into_iter()
            .map(|record| record.id)
            .collect();
        assert_eq!(ids, vec![first.id, third.id]);
        assert!(fetch_exercises_for_day(&conn, Day::Sunday).unwrap().is_empty());
    }

    #[test]
    fn update_of_missing_row_is_not_found() {
        let conn = open_memory_connection().unwrap();
        let err = update_exercise_field(&conn, 42, &FieldUpdate::RepsDone(3)).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { id: 42 }));
    }

    #[test]
    fn units_are_distinct_and_skip_blanks() {
        let conn = open_memory_connection().unwrap();
        insert_exercise(&conn, Day::Monday, &squat()).unwrap();
        insert_exercise(&conn, Day::Tuesday, &squat()).unwrap();
        let mut no_unit = squat();
        no_unit.unit.clear();
        insert_exercise(&conn, Day::Tuesday, &no_unit).unwrap();
        let mut pounds = squat();
        pounds.unit = "lb".into();
        insert_exercise(&conn, Day::Friday, &pounds).unwrap();

        assert_eq!(fetch_units(&conn).unwrap(), vec!["kg".to_string(), "lb".to_string()]);
    }
}
