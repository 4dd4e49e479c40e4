//! Command line surface. Without a subcommand the interactive week view
//! starts; the other commands run against the same database headlessly.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::db::ExerciseStore;
use crate::logging::init_tracing;
use crate::models::Day;
use crate::ui::{run_app, App};

/// Weekly workout tracker: log exercises per weekday in a local database.
#[derive(Debug, Parser)]
#[command(name = "weekly-workout-tracker")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Directory holding the database and log file
    #[arg(long, global = true, env = "WORKOUT_TRACKER_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Directory exports are written to (defaults to Downloads)
    #[arg(long, global = true, env = "WORKOUT_TRACKER_EXPORT_DIR")]
    pub export_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open the interactive week view (default)
    Tui,

    /// Write every exercise to a JSON file
    Export {
        /// Output file (defaults to exercises.json in the export directory)
        path: Option<PathBuf>,
    },

    /// Load exercises from a JSON file, replacing entries with the same id
    Import {
        /// JSON file produced by `export`
        path: PathBuf,
    },

    /// Print the exercises logged for a day
    List {
        /// Day of the week, e.g. `monday`
        #[arg(default_value_t = Day::Monday)]
        day: Day,
    },
}

/// Resolve configuration, open the store, and run the requested command.
pub fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::resolve(cli.data_dir, cli.export_dir, cli.debug)?;
    config.ensure_data_dir()?;
    init_tracing(&config)?;
    tracing::debug!(?config, "starting");

    let store = ExerciseStore::open(&config.db_path)
        .with_context(|| format!("failed to open {}", config.db_path.display()))?;

    match cli.command.unwrap_or(Command::Tui) {
        Command::Tui => {
            let mut app = App::new(store, config.export_path.clone())?;
            run_app(&mut app)
        }
        Command::Export { path } => {
            let path = path.unwrap_or(config.export_path);
            let count = store.export_to_path(&path)?;
            println!("Exported {count} exercises to {}.", path.display());
            Ok(())
        }
        Command::Import { path } => {
            let summary = store.import_from_path(&path)?;
            println!("{summary}");
            for rejected in &summary.rejected {
                println!("  skipped {rejected}");
            }
            Ok(())
        }
        Command::List { day } => {
            let exercises = store.query_by_day(day)?;
            if exercises.is_empty() {
                println!("No exercises for {day}.");
            }
            for exercise in exercises {
                println!(
                    "#{} {}: {} x {} reps ({} done)",
                    exercise.id,
                    exercise.exercise,
                    exercise.weight_label(),
                    exercise.rep_range_label(),
                    exercise.reps_done
                );
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn list_parses_day_case_insensitively() {
        let cli = Cli::try_parse_from(["weekly-workout-tracker", "list", "friday"]).unwrap();
        assert!(matches!(cli.command, Some(Command::List { day: Day::Friday })));
    }

    #[test]
    fn list_defaults_to_monday() {
        let cli = Cli::try_parse_from(["weekly-workout-tracker", "list"]).unwrap();
        assert!(matches!(cli.command, Some(Command::List { day: Day::Monday })));
    }
}
