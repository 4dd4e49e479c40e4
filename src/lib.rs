//! Core library surface for the weekly workout tracker.
//!
//! The binary is a thin wrapper around [`cli::run`]; everything else is
//! exposed so integration tests can drive the store directly.
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod ui;

/// The persistence entry point and the batch types used by import/export.
pub use db::{ExerciseStore, ImportBatch, ImportSummary, RejectedEntry};

pub use error::StoreError;

/// Domain types shared by the store, the CLI and the TUI.
pub use models::{Day, ExerciseRecord, FieldUpdate, NewExercise};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
