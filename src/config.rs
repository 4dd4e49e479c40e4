use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::{BaseDirs, UserDirs};

use crate::db::EXPORT_FILE_NAME;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".weekly-workout-tracker";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "workouts.sqlite";
/// Log file written next to the database; the TUI owns stdout.
const LOG_FILE_NAME: &str = "workout-tracker.log";

/// Resolved file locations and logging settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub log_path: PathBuf,
    /// Default target for exports and the prefilled import path.
    pub export_path: PathBuf,
    pub log_filter: String,
}

impl AppConfig {
    /// Build the configuration from optional overrides, falling back to the
    /// home directory for data and the Downloads folder for exports.
    pub fn resolve(
        data_dir: Option<PathBuf>,
        export_dir: Option<PathBuf>,
        debug: bool,
    ) -> Result<Self> {
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => default_data_dir()?,
        };
        let export_dir = export_dir
            .or_else(|| UserDirs::new().and_then(|dirs| dirs.download_dir().map(Path::to_path_buf)))
            .unwrap_or_else(|| data_dir.clone());

        Ok(Self {
            db_path: data_dir.join(DB_FILE_NAME),
            log_path: data_dir.join(LOG_FILE_NAME),
            export_path: export_dir.join(EXPORT_FILE_NAME),
            log_filter: log_filter(debug, std::env::var("RUST_LOG").ok()),
            data_dir,
        })
    }

    /// Create the data directory if it does not exist yet.
    pub fn ensure_data_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir).with_context(|| {
            format!("failed to create data directory {}", self.data_dir.display())
        })
    }
}

fn default_data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

/// `--debug` wins, then `RUST_LOG`, then info for this crate.
fn log_filter(debug: bool, env_filter: Option<String>) -> String {
    if debug {
        return "weekly_workout_tracker=debug".to_string();
    }
    env_filter
        .filter(|filter| !filter.trim().is_empty())
        .unwrap_or_else(|| "weekly_workout_tracker=info".to_string())
}
