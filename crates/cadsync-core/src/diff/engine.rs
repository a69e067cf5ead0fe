//! Diff aggregation.
//!
//! The core entry point is [`aggregate`], which combines key-set deltas with
//! the attribute and geometry differs into a single [`ChangeReport`].

use std::collections::BTreeSet;

use crate::config::{effective_threshold, ColumnFilter, CompareOptions};
use crate::diff::attributes::diff_attributes_with;
use crate::diff::geometry::{diff_geometry_with, GeometryComparator, VertexDistance};
use crate::diff::model::{ChangeReport, ReportIdentity, SchemaChanges};
use crate::model::{RecordKey, RecordSet};
use crate::{log_op_end, log_op_start};

/// Compute `(added, removed)`: added = in current only, removed = in previous only.
fn key_delta(
    previous: &RecordSet,
    current: &RecordSet,
) -> (BTreeSet<RecordKey>, BTreeSet<RecordKey>) {
    let added = current
        .keys()
        .filter(|k| !previous.contains_key(k))
        .cloned()
        .collect();
    let removed = previous
        .keys()
        .filter(|k| !current.contains_key(k))
        .cloned()
        .collect();
    (added, removed)
}

/// Column delta in declaration order: `(added, removed)`.
fn column_delta(previous: &[String], current: &[String]) -> (Vec<String>, Vec<String>) {
    let set_previous: BTreeSet<&str> = previous.iter().map(String::as_str).collect();
    let set_current: BTreeSet<&str> = current.iter().map(String::as_str).collect();
    let added = current
        .iter()
        .filter(|c| !set_previous.contains(c.as_str()))
        .cloned()
        .collect();
    let removed = previous
        .iter()
        .filter(|c| !set_current.contains(c.as_str()))
        .cloned()
        .collect();
    (added, removed)
}

fn schema_changes(previous: &RecordSet, current: &RecordSet) -> SchemaChanges {
    let (columns_added, columns_removed) = column_delta(previous.columns(), current.columns());
    let spatial_reference_changed = if previous.spatial_reference() != current.spatial_reference() {
        Some((
            previous.spatial_reference().map(str::to_string),
            current.spatial_reference().map(str::to_string),
        ))
    } else {
        None
    };
    SchemaChanges {
        columns_added,
        columns_removed,
        spatial_reference_changed,
    }
}

fn identity(previous: &RecordSet, current: &RecordSet) -> ReportIdentity {
    ReportIdentity {
        previous_name: previous.name().to_string(),
        current_name: current.name().to_string(),
        previous_count: previous.len(),
        current_count: current.len(),
        previous_digest: previous.content_digest(),
        current_digest: current.content_digest(),
    }
}

/// Compare two snapshots with default comparison rules and 2D vertex tolerance.
///
/// Total over well-formed record sets: never fails, never mutates its inputs.
pub fn aggregate(
    previous: &RecordSet,
    current: &RecordSet,
    filter: &ColumnFilter,
    tolerance: f64,
) -> ChangeReport {
    let options = CompareOptions::new(filter.clone(), tolerance);
    aggregate_with(previous, current, &options, &VertexDistance::default())
}

/// Compare two snapshots with full options and an injected geometry comparator.
///
/// `options.use_z` is not consulted here; it configures the comparator the
/// caller builds.
pub fn aggregate_with(
    previous: &RecordSet,
    current: &RecordSet,
    options: &CompareOptions,
    comparator: &dyn GeometryComparator,
) -> ChangeReport {
    log_op_start!(
        "aggregate",
        previous = previous.name(),
        current = current.name()
    );
    let start = std::time::Instant::now();

    let (added_keys, removed_keys) = key_delta(previous, current);
    let attribute_changes = diff_attributes_with(previous, current, &options.attribute_options());
    let geometry_changes = diff_geometry_with(
        previous,
        current,
        effective_threshold(options.tolerance),
        comparator,
    );

    let mut report = ChangeReport::new(added_keys, removed_keys, attribute_changes, geometry_changes);
    report.identity = identity(previous, current);
    report.schema = schema_changes(previous, current);

    log_op_end!(
        "aggregate",
        duration_ms = start.elapsed().as_millis() as u64,
        added = report.added_keys.len(),
        removed = report.removed_keys.len(),
        attribute_changed = report.attribute_changes.len(),
        geometry_changed = report.geometry_changes.len(),
        has_changes = report.has_changes
    );

    report
}
