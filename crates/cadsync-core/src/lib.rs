//! cadsync core - change detection for spatial table snapshots
//!
//! This crate provides the in-memory change detection engine:
//! - Record and geometry models keyed by a stable identifier
//! - Snapshot loading from any [`snapshot::RowSource`], with key validation
//!   and derived columns
//! - Attribute and geometry differs (epsilon and tolerance aware)
//! - Aggregation into a [`diff::ChangeReport`] plus a Markdown summary
//! - Structured error and logging facilities shared with the engine and CLI
//!
//! Everything here is synchronous and pure apart from log events; reading
//! files, exporting and notifying live in `cadsync-engine`.

pub use cadsync_core_types;

pub mod config;
pub mod diff;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod snapshot;

// Re-export commonly used types
pub use config::{AttributeOptions, ColumnComparator, ColumnFilter, CompareOptions};
pub use diff::{aggregate, aggregate_with, ChangeReport};
pub use errors::{CadSyncError, ExError, ExErrorKind, Result};
pub use model::{FieldValue, Geometry, Record, RecordKey, RecordSet};
pub use snapshot::{load, LoadOptions};
