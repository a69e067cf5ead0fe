//! Row sources: the boundary between the loader and whatever produced the rows.

use std::collections::BTreeMap;

use crate::errors::Result;
use crate::model::{FieldValue, Geometry};

/// Static description of a source, available before any row is read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceDescriptor {
    /// Table or feature-class name, used in error messages and reports
    pub name: String,
    /// Declared attribute columns in source order. Empty when the source
    /// has no schema of its own (rows are then the only column evidence).
    pub columns: Vec<String>,
    pub spatial_reference: Option<String>,
}

/// One raw row as read from a source, before key extraction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    pub values: BTreeMap<String, FieldValue>,
    pub geometry: Option<Geometry>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, column: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.values.insert(column.into(), value.into());
        self
    }

    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }
}

/// An ordered sequence of raw rows: a table cursor or feature-class iterator.
pub trait RowSource {
    fn describe(&self) -> SourceDescriptor;

    /// Next row, or `None` when the source is exhausted.
    ///
    /// # Errors
    ///
    /// Implementations report read failures as `CadSyncError::SourceRead`.
    fn next_row(&mut self) -> Result<Option<RawRow>>;
}

/// In-memory row source.
#[derive(Debug, Clone)]
pub struct VecRowSource {
    descriptor: SourceDescriptor,
    rows: std::vec::IntoIter<RawRow>,
}

impl VecRowSource {
    pub fn new(descriptor: SourceDescriptor, rows: Vec<RawRow>) -> Self {
        Self {
            descriptor,
            rows: rows.into_iter(),
        }
    }

    /// Source whose declared columns are the union of the row columns.
    pub fn from_rows(name: impl Into<String>, rows: Vec<RawRow>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for row in &rows {
            for column in row.values.keys() {
                if !columns.contains(column) {
                    columns.push(column.clone());
                }
            }
        }
        Self::new(
            SourceDescriptor {
                name: name.into(),
                columns,
                spatial_reference: None,
            },
            rows,
        )
    }
}

impl RowSource for VecRowSource {
    fn describe(&self) -> SourceDescriptor {
        self.descriptor.clone()
    }

    fn next_row(&mut self) -> Result<Option<RawRow>> {
        Ok(self.rows.next())
    }
}
