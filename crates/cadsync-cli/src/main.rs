//! CadSync CLI
//!
//! Command-line interface for comparing snapshots and running syncs

use clap::{Parser, Subcommand};
use std::process::ExitCode;

mod commands;
mod settings;

#[derive(Debug, Parser)]
#[command(name = "cadsync")]
#[command(about = "CadSync - change detection between GIS table snapshots", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compare two snapshot files (exit 0: unchanged, 2: changed)
    Compare(commands::compare::CompareArgs),
    /// Run one sync: compare the extract with the last export, refresh, notify
    Sync(commands::sync::SyncArgs),
    /// Print record count, columns and digest of a snapshot file
    Inspect(commands::inspect::InspectArgs),
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Compare(args) => commands::compare::execute(args),
        Commands::Sync(args) => commands::sync::execute(args),
        Commands::Inspect(args) => commands::inspect::execute(args),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}
