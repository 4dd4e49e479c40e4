//! Binary entry point: parse arguments and hand off to the library.
use clap::Parser;
use weekly_workout_tracker::cli::{self, Cli};

fn main() -> anyhow::Result<()> {
    cli::run(Cli::parse())
}
