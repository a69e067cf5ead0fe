//! Row sources backed by files.

pub mod json_file;

pub use json_file::{JsonSnapshotSource, SnapshotDocument, SnapshotRow};
