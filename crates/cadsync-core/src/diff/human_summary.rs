//! Human-readable summary renderer for change reports.

use crate::diff::model::ChangeReport;

/// Rendering options for [`render_human_summary`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryOptions {
    /// Table name used in the header
    pub table: Option<String>,
    /// Maximum number of per-feature lines listed; the rest are counted
    pub detail_limit: usize,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            table: None,
            detail_limit: 50,
        }
    }
}

/// Render a Markdown summary of a [`ChangeReport`].
///
/// Used for notification bodies and CLI output. Informational only: the
/// structured report stays the source of truth.
pub fn render_human_summary(report: &ChangeReport, options: &SummaryOptions) -> String {
    let mut out = String::new();

    // Header
    match &options.table {
        Some(table) => out.push_str(&format!("## Change Report: {table}\n\n")),
        None => out.push_str("## Change Report\n\n"),
    }

    out.push_str(&format!(
        "| | Name | Records | Digest |\n\
         |---|---|---|---|\n\
         | Previous | {} | {} | `{}` |\n\
         | Current | {} | {} | `{}` |\n\n",
        report.identity.previous_name,
        report.identity.previous_count,
        short(&report.identity.previous_digest),
        report.identity.current_name,
        report.identity.current_count,
        short(&report.identity.current_digest),
    ));

    if !report.schema.is_empty() {
        out.push_str("### Schema\n\n");
        if !report.schema.columns_added.is_empty() {
            out.push_str(&format!(
                "- **Columns added**: {}\n",
                report.schema.columns_added.join(", ")
            ));
        }
        if !report.schema.columns_removed.is_empty() {
            out.push_str(&format!(
                "- **Columns removed**: {}\n",
                report.schema.columns_removed.join(", ")
            ));
        }
        if let Some((old, new)) = &report.schema.spatial_reference_changed {
            out.push_str(&format!(
                "- **Spatial reference**: {} -> {}\n",
                old.as_deref().unwrap_or("none"),
                new.as_deref().unwrap_or("none")
            ));
        }
        out.push('\n');
    }

    if !report.has_changes {
        out.push_str("_No changes detected._\n");
        return out;
    }

    // Counts
    out.push_str("### Summary\n\n");
    out.push_str(&format!("- **New features**: {}\n", report.added_keys.len()));
    out.push_str(&format!(
        "- **Removed features**: {}\n",
        report.removed_keys.len()
    ));
    out.push_str(&format!(
        "- **Attribute changes**: {} features, {} values\n",
        report.changed_attribute_records(),
        report.changed_cells()
    ));
    out.push_str(&format!(
        "- **Geometry changes**: {}\n\n",
        report.geometry_changes.len()
    ));

    // Per-feature lines
    let mut lines: Vec<String> = Vec::new();
    for key in &report.added_keys {
        lines.push(format!("- New feature: {key}"));
    }
    for key in &report.removed_keys {
        lines.push(format!("- Feature removed: {key}"));
    }
    for key in &report.geometry_changes {
        lines.push(format!("- Geometry changed: {key}"));
    }
    for (key, columns) in &report.attribute_changes {
        for (column, change) in columns {
            lines.push(format!(
                "- Attribute changed: {key}, `{column}`: {} -> {}",
                change.old, change.new
            ));
        }
    }

    out.push_str("### Details\n\n");
    let total = lines.len();
    for line in lines.iter().take(options.detail_limit) {
        out.push_str(line);
        out.push('\n');
    }
    if total > options.detail_limit {
        out.push_str(&format!(
            "- ... and {} more\n",
            total - options.detail_limit
        ));
    }

    out
}

/// Return the first 12 characters of a digest for display.
fn short(digest: &str) -> &str {
    let end = digest.len().min(12);
    &digest[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColumnFilter;
    use crate::diff::engine::aggregate;
    use crate::model::{Record, RecordSet};

    fn set(records: Vec<Record>) -> RecordSet {
        RecordSet::new("parcels", "objectid", records).unwrap()
    }

    #[test]
    fn test_no_changes_message() {
        let previous = set(vec![Record::new(1).with_attr("a", "x")]);
        let report = aggregate(&previous, &previous, &ColumnFilter::new(), 0.0);
        let summary = render_human_summary(&report, &SummaryOptions::default());
        assert!(summary.starts_with("## Change Report\n"));
        assert!(summary.contains("_No changes detected._"));
        assert!(!summary.contains("### Details"));
    }

    #[test]
    fn test_lists_feature_lines() {
        let previous = set(vec![
            Record::new(1).with_attr("a", "x"),
            Record::new(2).with_attr("a", "x"),
        ]);
        let current = set(vec![
            Record::new(1).with_attr("a", "y"),
            Record::new(3).with_attr("a", "x"),
        ]);
        let report = aggregate(&previous, &current, &ColumnFilter::new(), 0.0);
        let options = SummaryOptions {
            table: Some("mahoz".to_string()),
            ..SummaryOptions::default()
        };
        let summary = render_human_summary(&report, &options);

        assert!(summary.starts_with("## Change Report: mahoz"));
        assert!(summary.contains("- New feature: 3"));
        assert!(summary.contains("- Feature removed: 2"));
        assert!(summary.contains("- Attribute changed: 1, `a`: x -> y"));
    }

    #[test]
    fn test_detail_limit_truncates() {
        let previous = set(vec![]);
        let current = set((1..=5).map(Record::new).collect());
        let report = aggregate(&previous, &current, &ColumnFilter::new(), 0.0);
        let options = SummaryOptions {
            table: None,
            detail_limit: 2,
        };
        let summary = render_human_summary(&report, &options);

        assert!(summary.contains("- New feature: 2"));
        assert!(!summary.contains("- New feature: 3"));
        assert!(summary.contains("- ... and 3 more"));
    }
}
