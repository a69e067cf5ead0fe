//! Change detection.
//!
//! Compares a previous snapshot of a spatial table with the current one and
//! produces a structured [`ChangeReport`].
//!
//! ## Entry point
//!
//! ```ignore
//! use cadsync_core::diff::{aggregate, render_human_summary, SummaryOptions};
//!
//! let report = aggregate(&previous, &current, &filter, 0.001);
//! let summary = render_human_summary(&report, &SummaryOptions::default());
//! ```
//!
//! ## Guarantees
//!
//! - **Reflexivity**: comparing a snapshot with itself reports no changes.
//! - **Exact key deltas**: `added_keys` and `removed_keys` are the set
//!   differences of the two key sets.
//! - **Filter monotonicity**: adding columns to the filter never adds
//!   attribute changes.
//! - **Tolerance monotonicity**: raising the tolerance never adds geometry
//!   changes.
//! - **Key-ordered output**: every collection in the report iterates in key order.

pub mod attributes;
pub mod engine;
pub mod geometry;
pub mod human_summary;
pub mod model;

pub use attributes::{diff_attributes, diff_attributes_with};
pub use engine::{aggregate, aggregate_with};
pub use geometry::{diff_geometry, diff_geometry_with, GeometryComparator, VertexDistance};
pub use human_summary::{render_human_summary, SummaryOptions};
pub use model::{AttributeChange, AttributeChanges, CellValue, ChangeReport, ReportIdentity, SchemaChanges};
