//! Inspect a snapshot file

use anyhow::Context;
use cadsync_core::snapshot::{load, LoadOptions};
use cadsync_engine::JsonSnapshotSource;
use clap::Args;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Snapshot file (JSON)
    #[arg(long)]
    pub snapshot: PathBuf,

    #[arg(long)]
    pub key_column: String,
}

pub fn execute(args: InspectArgs) -> anyhow::Result<ExitCode> {
    let mut source = JsonSnapshotSource::open(&args.snapshot)?;
    let set = load(&mut source, &LoadOptions::new(args.key_column))
        .with_context(|| format!("failed to load {}", args.snapshot.display()))?;

    println!("Snapshot: {}", set.name());
    println!("  records: {}", set.len());
    println!("  key_column: {}", set.key_column());
    println!("  columns: {}", set.columns().join(", "));
    if let Some(srs) = set.spatial_reference() {
        println!("  spatial_reference: {}", srs);
    }
    println!("  digest: {}", set.content_digest());

    Ok(ExitCode::SUCCESS)
}
