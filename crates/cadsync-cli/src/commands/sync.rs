//! Run one sync for a configured table

use cadsync_core::logging_facility::{init_with_log_file, Profile};
use cadsync_engine::notify::Notifier;
use cadsync_engine::{
    run_sync, Environment, JsonSnapshotSource, LogNotifier, OutboxNotifier, PreviousExport,
    SnapshotFileExporter, SyncConfig, SyncOptions, SyncOutcome,
};
use clap::Args;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::settings::load_sync_config;

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Current extract of the table (JSON snapshot)
    #[arg(long)]
    pub current: PathBuf,

    /// Configuration file (defaults to ./cadsync.toml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Compare only; write no export and send no notification
    #[arg(long)]
    pub dry_run: bool,
}

fn notifier(config: &SyncConfig) -> Box<dyn Notifier> {
    match &config.paths.outbox_dir {
        Some(dir) => Box::new(OutboxNotifier::new(
            dir.clone(),
            config.notification.sender.clone(),
        )),
        None => Box::new(LogNotifier::new(config.environment)),
    }
}

pub fn execute(args: SyncArgs) -> anyhow::Result<ExitCode> {
    let config = load_sync_config(args.config.as_deref())?;

    let profile = match config.environment {
        Environment::Production => Profile::Production,
        Environment::Test => Profile::Development,
    };
    let log_path = init_with_log_file(profile, &config.paths.log_dir)?;

    let mut current = JsonSnapshotSource::open(&args.current)?;
    let export_path = config.paths.export_path();
    let mut previous = export_path
        .exists()
        .then(|| JsonSnapshotSource::open(&export_path));

    let notifier = notifier(&config);
    let options = SyncOptions {
        dry_run: args.dry_run,
        log_path: Some(log_path.clone()),
        ..SyncOptions::default()
    };
    let outcome = run_sync(
        &config,
        &mut current,
        PreviousExport::from_opened(previous.as_mut()),
        &SnapshotFileExporter,
        notifier.as_ref(),
        &options,
    )?;

    println!("Sync {}: {}", config.table, outcome.label());
    match &outcome {
        SyncOutcome::Created { record_count, .. } => {
            println!("  records: {}", record_count);
        }
        SyncOutcome::Updated { report, notified, .. } => {
            println!("  added: {}", report.added_keys.len());
            println!("  removed: {}", report.removed_keys.len());
            println!("  attribute_changed: {}", report.attribute_changes.len());
            println!("  geometry_changed: {}", report.geometry_changes.len());
            println!("  notified: {}", notified);
        }
        SyncOutcome::Replaced {
            reason,
            record_count,
            notified,
            ..
        } => {
            println!("  previous export unusable: {}", reason);
            println!("  records: {}", record_count);
            println!("  notified: {}", notified);
        }
        SyncOutcome::Unchanged { .. } => {}
    }
    match outcome.export() {
        Some(receipt) => println!("  export: {}", receipt.path.display()),
        None if args.dry_run => println!("  (dry run - nothing written)"),
        None => {}
    }
    println!("  run_id: {}", options.context.run_id);
    println!("  log: {}", log_path.display());

    Ok(ExitCode::SUCCESS)
}
