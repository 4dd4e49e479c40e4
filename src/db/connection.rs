use std::fs;
use std::path::Path;

use rusqlite::Connection;

use crate::error::{Result, StorageContext, StoreError};

/// Schema version written to `PRAGMA user_version` once the tables exist.
pub const SCHEMA_VERSION: i64 = 1;

/// Ensure the database file exists, run lazy migrations, and return a live
/// connection. Re-opening an up-to-date database touches nothing, so this is
/// safe to call on every launch.
pub(crate) fn open_connection(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| StoreError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let conn = Connection::open(path)
        .storage(&format!("failed to open SQLite database at {}", path.display()))?;
    migrate(&conn)?;
    Ok(conn)
}

/// In-memory database with the full schema, used by tests.
pub(crate) fn open_memory_connection() -> Result<Connection> {
    let conn = Connection::open_in_memory().storage("failed to open in-memory database")?;
    migrate(&conn)?;
    Ok(conn)
}

/// Create the `exercises` table and its day index on first open. Later
/// versions get their own `if version < N` block.
fn migrate(conn: &Connection) -> Result<()> {
    let version: i64 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .storage("failed to read schema version")?;

    if version > SCHEMA_VERSION {
        return Err(StoreError::UnsupportedSchema {
            found: version,
            supported: SCHEMA_VERSION,
        });
    }

    if version < 1 {
        conn.execute_batch(
            "BEGIN;
             CREATE TABLE IF NOT EXISTS exercises (
                 id INTEGER PRIMARY KEY AUTOINCREMENT,
                 day TEXT NOT NULL,
                 exercise TEXT NOT NULL,
                 weight TEXT NOT NULL,
                 unit TEXT NOT NULL DEFAULT '',
                 rep_range_min TEXT NOT NULL,
                 rep_range_max TEXT NOT NULL,
                 reps_done INTEGER NOT NULL DEFAULT 0
             );
             CREATE INDEX IF NOT EXISTS idx_exercises_day ON exercises(day);
             PRAGMA user_version = 1;
             COMMIT;",
        )
        .storage("failed to create exercises schema")?;
        tracing::info!(version = SCHEMA_VERSION, "created exercises schema");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_version(conn: &Connection) -> i64 {
        conn.pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn migrate_creates_table_and_day_index() {
        let conn = open_memory_connection().unwrap();
        assert_eq!(user_version(&conn), SCHEMA_VERSION);

        let index_count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master
                 WHERE type = 'index' AND name = 'idx_exercises_day'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(index_count, 1);
    }

    #[test]
    fn migrate_is_idempotent() {
        let conn = open_memory_connection().unwrap();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();
        assert_eq!(user_version(&conn), SCHEMA_VERSION);
    }

    #[test]
    fn newer_schema_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA user_version = 7;").unwrap();
        let err = migrate(&conn).unwrap_err();
        assert!(matches!(
            err,
            StoreError::UnsupportedSchema { found: 7, supported: 1 }
        ));
    }
}
