//! Snapshot loading.
//!
//! Normalizes a data source (a database table extract or a CAD feature
//! class read) into a uniform in-memory [`crate::model::RecordSet`].
//!
//! ## Responsibilities
//!
//! - Define the [`RowSource`] boundary for external readers
//! - Extract and validate record keys (missing, invalid, duplicate)
//! - Validate geometries for tolerance comparison
//! - Compute configured derived columns
//!
//! ## Non-Responsibilities
//!
//! - File formats and database access (handled by `cadsync-engine` sources)
//! - Lifecycle logging (owned by the engine layer)

pub mod derive;
pub mod loader;
pub mod source;

pub use derive::DerivedColumn;
pub use loader::{load, LoadOptions};
pub use source::{RawRow, RowSource, SourceDescriptor, VecRowSource};
