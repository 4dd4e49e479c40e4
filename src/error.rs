//! Error type for the exercise store.
//!
//! Store operations return [`StoreError`] so callers can tell a validation
//! problem (show it in the form) from a storage failure (log it and report it
//! in the status line). The application layer wraps these in `anyhow`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A required field was blank when adding an exercise.
    #[error("Please fill out all fields: {field} is required.")]
    Validation { field: &'static str },

    /// The database could not be opened or a statement failed.
    #[error("storage unavailable: {context}")]
    StorageUnavailable {
        context: String,
        #[source]
        source: rusqlite::Error,
    },

    /// The database was created by a newer release.
    #[error("database schema version {found} is newer than supported version {supported}")]
    UnsupportedSchema { found: i64, supported: i64 },

    #[error("Exercise {id} not found.")]
    NotFound { id: i64 },

    /// The import payload was not a JSON array.
    #[error("Import file is not valid: {message}")]
    MalformedImport { message: String },

    #[error("failed to access {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to render exercises as JSON")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Attach a human-readable context to raw SQLite errors, mirroring
/// `anyhow::Context` but producing a [`StoreError`].
pub(crate) trait StorageContext<T> {
    fn storage(self, context: &str) -> Result<T>;
}

impl<T> StorageContext<T> for std::result::Result<T, rusqlite::Error> {
    fn storage(self, context: &str) -> Result<T> {
        self.map_err(|source| StoreError::StorageUnavailable {
            context: context.to_string(),
            source,
        })
    }
}
