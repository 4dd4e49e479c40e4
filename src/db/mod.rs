//! Persistence module split across logical submodules. [`ExerciseStore`] is
//! the only way in: it can only be constructed by opening the database, so no
//! record operation can run against a store that is not ready.

mod connection;
mod exercises;
mod transfer;

use std::fs;
use std::path::Path;

use rusqlite::Connection;

use crate::error::{Result, StoreError};
use crate::models::{Day, ExerciseRecord, FieldUpdate, NewExercise};

pub use connection::SCHEMA_VERSION;
pub use transfer::{
    parse_import, ImportBatch, ImportEntry, ImportSummary, RejectedEntry, EXPORT_FILE_NAME,
    MAX_IMPORT_ID,
};

/// Local exercise log backed by SQLite, indexed by day.
///
/// Every operation completes before it returns, so a caller that re-queries
/// after a mutation always sees the committed state.
pub struct ExerciseStore {
    conn: Connection,
}

impl ExerciseStore {
    /// Open (creating if needed) the database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = connection::open_connection(path)?;
        tracing::debug!(path = %path.display(), "opened exercise store");
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: connection::open_memory_connection()?,
        })
    }

    /// Validate and insert a new exercise for `day` with zero reps done.
    pub fn add(&self, day: Day, input: &NewExercise) -> Result<ExerciseRecord> {
        let input = exercises::validate_new_exercise(input)?;
        let record = exercises::insert_exercise(&self.conn, day, &input)?;
        tracing::debug!(id = record.id, %day, exercise = %record.exercise, "exercise added");
        Ok(record)
    }

    /// Exercises logged for `day`, in the order they were added.
    pub fn query_by_day(&self, day: Day) -> Result<Vec<ExerciseRecord>> {
        exercises::fetch_exercises_for_day(&self.conn, day)
    }

    pub fn get(&self, id: i64) -> Result<ExerciseRecord> {
        exercises::fetch_exercise(&self.conn, id)?.ok_or(StoreError::NotFound { id })
    }

    /// Units used by any stored exercise, for auto-completion.
    pub fn known_units(&self) -> Result<Vec<String>> {
        exercises::fetch_units(&self.conn)
    }

    /// Change one field of an existing exercise and return the stored result.
    pub fn update_field(&self, id: i64, update: &FieldUpdate) -> Result<ExerciseRecord> {
        let record = exercises::update_exercise_field(&self.conn, id, update)?;
        tracing::debug!(id, field = update.field_name(), "exercise updated");
        Ok(record)
    }

    /// Delete an exercise. Returns `false` when the id did not exist.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let deleted = exercises::delete_exercise(&self.conn, id)?;
        if deleted {
            tracing::debug!(id, "exercise deleted");
        } else {
            tracing::debug!(id, "delete skipped, exercise not present");
        }
        Ok(deleted)
    }

    /// Remove every exercise. Returns the number of rows removed.
    pub fn clear(&self) -> Result<usize> {
        let removed = exercises::clear_exercises(&self.conn)?;
        tracing::info!(removed, "cleared exercise log");
        Ok(removed)
    }

    /// Every exercise regardless of day.
    pub fn export_all(&self) -> Result<Vec<ExerciseRecord>> {
        exercises::fetch_all_exercises(&self.conn)
    }

    pub fn export_json(&self) -> Result<String> {
        transfer::render_export(&self.export_all()?)
    }

    /// Write the JSON export to `path`, returning how many exercises it holds.
    pub fn export_to_path(&self, path: &Path) -> Result<usize> {
        let records = self.export_all()?;
        let json = transfer::render_export(&records)?;
        fs::write(path, json).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(count = records.len(), path = %path.display(), "exported exercises");
        Ok(records.len())
    }

    /// Apply an already parsed batch atomically.
    pub fn import_all(&self, batch: &ImportBatch) -> Result<ImportSummary> {
        let summary = transfer::apply_import(&self.conn, batch)?;
        tracing::info!(
            inserted = summary.inserted,
            replaced = summary.replaced,
            rejected = summary.rejected.len(),
            "imported exercises"
        );
        Ok(summary)
    }

    /// Parse and import a JSON payload.
    pub fn import_json(&self, text: &str) -> Result<ImportSummary> {
        self.import_all(&parse_import(text)?)
    }

    pub fn import_from_path(&self, path: &Path) -> Result<ImportSummary> {
        let text = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.import_json(&text)
    }
}
