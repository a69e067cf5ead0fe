//! Sync run orchestration.
//!
//! ## Pipeline (in order):
//! 1. Validate configuration (hard stop, no reads)
//! 2. Load the current extract, derived columns applied
//! 3. No previous export: export, outcome `Created`
//! 4. Otherwise load the previous export and aggregate. A previous export
//!    that cannot be opened or loaded is replaced: export, notify with the
//!    reason, outcome `Replaced`
//! 5. Changes: export, notify, outcome `Updated`; else `Unchanged`
//!
//! `dry_run` stops before any export or notification.
//!
//! ## Logging Ownership
//!
//! `run_sync` owns lifecycle logging for the run (`log_op_start!`,
//! `log_op_end!`, `log_op_error!`). The core emits only its own aggregate
//! boundary and debug details.

#![allow(clippy::result_large_err)]

use cadsync_core::diff::{aggregate_with, ChangeReport};
use cadsync_core::errors::ExError;
use cadsync_core::model::RecordSet;
use cadsync_core::snapshot::{load, RowSource};
use cadsync_core::{log_op_end, log_op_error, log_op_start};
use cadsync_core_types::RunContext;
use std::path::PathBuf;

use crate::config::SyncConfig;
use crate::errors::Result;
use crate::export::{ExportReceipt, Exporter};
use crate::notify::{
    compose_creation_notification, compose_notification, compose_replacement_notification,
    Notification, Notifier,
};

/// Options for one sync run.
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// If true, compare but don't export and don't notify.
    pub dry_run: bool,
    /// Run log file referenced from notifications
    pub log_path: Option<PathBuf>,
    pub context: RunContext,
}

/// State of the previous export handed to [`run_sync`].
pub enum PreviousExport<'a> {
    /// No export exists yet (first run).
    Missing,
    /// An export exists and was opened.
    Readable(&'a mut dyn RowSource),
    /// An export exists but could not be opened.
    Unusable(ExError),
}

impl<'a> PreviousExport<'a> {
    /// Classify the result of opening an export file; `None` when the file
    /// does not exist.
    pub fn from_opened<S: RowSource + 'a>(opened: Option<&'a mut Result<S>>) -> Self {
        match opened {
            None => PreviousExport::Missing,
            Some(Ok(source)) => PreviousExport::Readable(source),
            Some(Err(e)) => PreviousExport::Unusable(e.clone()),
        }
    }
}

/// Outcome of a sync run.
#[derive(Debug, Clone)]
pub enum SyncOutcome {
    /// No previous export existed; the current extract was exported.
    Created {
        record_count: usize,
        /// `None` in dry-run mode
        export: Option<ExportReceipt>,
        notified: bool,
    },
    /// Changes were found and the export was refreshed.
    Updated {
        report: ChangeReport,
        /// `None` in dry-run mode
        export: Option<ExportReceipt>,
        notified: bool,
    },
    /// The previous export was unreadable or malformed; the current extract
    /// replaced it without a change report.
    Replaced {
        /// Why the previous export could not be used
        reason: String,
        record_count: usize,
        /// `None` in dry-run mode
        export: Option<ExportReceipt>,
        notified: bool,
    },
    /// Previous export and current extract are equivalent.
    Unchanged { report: ChangeReport },
}

impl SyncOutcome {
    /// Stable label for logs and CLI output
    pub fn label(&self) -> &'static str {
        match self {
            SyncOutcome::Created { .. } => "created",
            SyncOutcome::Updated { .. } => "updated",
            SyncOutcome::Replaced { .. } => "replaced",
            SyncOutcome::Unchanged { .. } => "unchanged",
        }
    }

    pub fn report(&self) -> Option<&ChangeReport> {
        match self {
            SyncOutcome::Created { .. } | SyncOutcome::Replaced { .. } => None,
            SyncOutcome::Updated { report, .. } | SyncOutcome::Unchanged { report } => Some(report),
        }
    }

    pub fn export(&self) -> Option<&ExportReceipt> {
        match self {
            SyncOutcome::Created { export, .. }
            | SyncOutcome::Updated { export, .. }
            | SyncOutcome::Replaced { export, .. } => export.as_ref(),
            SyncOutcome::Unchanged { .. } => None,
        }
    }
}

/// Run the change-detection pipeline for one table.
///
/// Sources are only read; the caller owns whatever they wrap.
///
/// ## Errors
///
/// - `InvalidConfig`: configuration failed validation
/// - Load errors (`MissingKeyColumn`, `DuplicateKey`, `InvalidKey`,
///   `InvalidGeometry`, `InvalidValue`) from the current extract
/// - `Export`: the export could not be written
///
/// An unusable previous export and notifier failures are logged and do not
/// fail the run.
pub fn run_sync(
    config: &SyncConfig,
    current: &mut dyn RowSource,
    previous: PreviousExport<'_>,
    exporter: &dyn Exporter,
    notifier: &dyn Notifier,
    options: &SyncOptions,
) -> Result<SyncOutcome> {
    log_op_start!(
        "sync",
        table = %config.table,
        run_id = %options.context.run_id,
        dry_run = options.dry_run
    );
    let start = std::time::Instant::now();

    let outcome = run_sync_impl(config, current, previous, exporter, notifier, options)
        .map_err(|e| {
            let e = e.with_run_id(options.context.run_id.clone());
            log_op_error!(
                "sync",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

    log_op_end!(
        "sync",
        duration_ms = start.elapsed().as_millis() as u64,
        outcome = outcome.label()
    );

    Ok(outcome)
}

fn run_sync_impl(
    config: &SyncConfig,
    current: &mut dyn RowSource,
    previous: PreviousExport<'_>,
    exporter: &dyn Exporter,
    notifier: &dyn Notifier,
    options: &SyncOptions,
) -> Result<SyncOutcome> {
    // Step 1: Validate configuration
    config.validate()?;
    let export_path = config.paths.export_path();

    // Step 2: Load current extract
    let current_set = load(current, &config.current_load_options()).map_err(ExError::from)?;
    tracing::info!(
        table = %config.table,
        record_count = current_set.len(),
        "current extract loaded"
    );

    // Step 3: First run, or a previous export that could not be opened
    let previous = match previous {
        PreviousExport::Readable(source) => source,
        PreviousExport::Unusable(e) => {
            return replace_export(config, &current_set, e, exporter, notifier, options)
        }
        PreviousExport::Missing => {
            tracing::info!(path = %export_path.display(), "no previous export, creating");
            if options.dry_run {
                return Ok(SyncOutcome::Created {
                    record_count: current_set.len(),
                    export: None,
                    notified: false,
                });
            }
            let receipt = exporter.export(&current_set, &export_path)?;
            let notified = config.notification.notify_on_create
                && deliver(
                    notifier,
                    compose_creation_notification(
                        &config.table,
                        current_set.len(),
                        &export_path,
                        options.log_path.as_deref(),
                    )
                    .with_recipients(&config.notification.recipients),
                );
            return Ok(SyncOutcome::Created {
                record_count: current_set.len(),
                export: Some(receipt),
                notified,
            });
        }
    };

    // Step 4: Compare against previous export
    let previous_set = match load(previous, &config.previous_load_options()) {
        Ok(set) => set,
        Err(e) => {
            return replace_export(config, &current_set, e.into(), exporter, notifier, options)
        }
    };
    let report = aggregate_with(
        &previous_set,
        &current_set,
        &config.compare,
        &config.geometry_comparator(),
    );

    if !report.has_changes {
        tracing::info!(table = %config.table, "no changes detected");
        return Ok(SyncOutcome::Unchanged { report });
    }

    // Step 5: Refresh export and notify
    tracing::info!(
        added = report.added_keys.len(),
        removed = report.removed_keys.len(),
        attribute_changed = report.attribute_changes.len(),
        geometry_changed = report.geometry_changes.len(),
        "changes detected"
    );
    if options.dry_run {
        return Ok(SyncOutcome::Updated {
            report,
            export: None,
            notified: false,
        });
    }

    let receipt = exporter.export(&current_set, &export_path)?;
    let notification = compose_notification(
        &config.table,
        &report,
        &export_path,
        options.log_path.as_deref(),
        config.summary_detail_limit,
    )
    .with_recipients(&config.notification.recipients);
    let notified = deliver(notifier, notification);

    Ok(SyncOutcome::Updated {
        report,
        export: Some(receipt),
        notified,
    })
}

/// Export the current extract over a previous export that could not be used.
fn replace_export(
    config: &SyncConfig,
    current_set: &RecordSet,
    cause: ExError,
    exporter: &dyn Exporter,
    notifier: &dyn Notifier,
    options: &SyncOptions,
) -> Result<SyncOutcome> {
    let export_path = config.paths.export_path();
    let reason = cause.message().to_string();
    tracing::warn!(
        path = %export_path.display(),
        err.code = cause.code(),
        error = %cause,
        "previous export unusable, replacing"
    );
    if options.dry_run {
        return Ok(SyncOutcome::Replaced {
            reason,
            record_count: current_set.len(),
            export: None,
            notified: false,
        });
    }

    let receipt = exporter.export(current_set, &export_path)?;
    let notified = deliver(
        notifier,
        compose_replacement_notification(
            &config.table,
            &reason,
            current_set.len(),
            &export_path,
            options.log_path.as_deref(),
        )
        .with_recipients(&config.notification.recipients),
    );
    Ok(SyncOutcome::Replaced {
        reason,
        record_count: current_set.len(),
        export: Some(receipt),
        notified,
    })
}

/// Hand a notification to the notifier; failures are logged, never propagated.
fn deliver(notifier: &dyn Notifier, notification: Notification) -> bool {
    match notifier.notify(&notification) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(
                err.code = e.code(),
                error = %e,
                "notification failed, continuing"
            );
            false
        }
    }
}
