//! Compare two snapshot files

use anyhow::{bail, Context};
use cadsync_core::diff::{aggregate_with, render_human_summary, SummaryOptions, VertexDistance};
use cadsync_core::snapshot::{load, LoadOptions};
use cadsync_engine::JsonSnapshotSource;
use clap::Args;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::settings::load_compare_settings;

/// Exit status when the snapshots differ
pub const EXIT_CHANGED: u8 = 2;

#[derive(Debug, Args)]
pub struct CompareArgs {
    /// Earlier snapshot (JSON)
    #[arg(long)]
    pub previous: PathBuf,

    /// Later snapshot (JSON)
    #[arg(long)]
    pub current: PathBuf,

    /// Configuration file (defaults to ./cadsync.toml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Key column; overrides the configured one
    #[arg(long)]
    pub key_column: Option<String>,

    /// Column excluded from attribute comparison (repeatable, added to configured filter)
    #[arg(long = "filter")]
    pub filter: Vec<String>,

    /// Geometry tolerance in coordinate units
    #[arg(long)]
    pub tolerance: Option<f64>,

    /// Numeric attribute epsilon
    #[arg(long)]
    pub epsilon: Option<f64>,

    /// Compare Z coordinates when both vertices carry them
    #[arg(long)]
    pub use_z: bool,

    /// Print the report as JSON instead of Markdown
    #[arg(long)]
    pub json: bool,

    /// Maximum feature lines in the Markdown details
    #[arg(long, default_value_t = 50)]
    pub detail_limit: usize,
}

pub fn execute(args: CompareArgs) -> anyhow::Result<ExitCode> {
    let settings = load_compare_settings(args.config.as_deref())?;

    let Some(key_column) = args.key_column.or(settings.key_column) else {
        bail!("no key column: pass --key-column or set key_column in the configuration");
    };

    let mut options = settings.compare;
    for column in args.filter {
        options.column_filter.insert(column);
    }
    if let Some(tolerance) = args.tolerance {
        options.tolerance = tolerance;
    }
    if let Some(epsilon) = args.epsilon {
        options.epsilon = epsilon;
    }
    options.use_z |= args.use_z;
    if let Some(setting) = options.invalid_settings().first() {
        bail!("{} must be a non-negative number", setting);
    }

    let load_options = LoadOptions::new(key_column);
    let mut previous_source = JsonSnapshotSource::open(&args.previous)?;
    let previous = load(&mut previous_source, &load_options)
        .with_context(|| format!("failed to load {}", args.previous.display()))?;
    let mut current_source = JsonSnapshotSource::open(&args.current)?;
    let current = load(&mut current_source, &load_options)
        .with_context(|| format!("failed to load {}", args.current.display()))?;

    let report = aggregate_with(
        &previous,
        &current,
        &options,
        &VertexDistance::new(options.use_z),
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!(
            "{}",
            render_human_summary(
                &report,
                &SummaryOptions {
                    table: Some(current.name().to_string()),
                    detail_limit: args.detail_limit,
                },
            )
        );
    }

    Ok(if report.has_changes {
        ExitCode::from(EXIT_CHANGED)
    } else {
        ExitCode::SUCCESS
    })
}
