use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use std::collections::{BTreeMap, BTreeSet};

use super::geometry::Geometry;
use super::key::RecordKey;
use super::value::FieldValue;
use crate::errors::{CadSyncError, Result};

/// One row of source data.
///
/// The key column is lifted into `key` and never appears in `attributes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub key: RecordKey,
    pub attributes: BTreeMap<String, FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
}

impl Record {
    pub fn new(key: impl Into<RecordKey>) -> Self {
        Self {
            key: key.into(),
            attributes: BTreeMap::new(),
            geometry: None,
        }
    }

    /// Builder-style attribute setter
    pub fn with_attr(mut self, column: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.attributes.insert(column.into(), value.into());
        self
    }

    /// Builder-style geometry setter
    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn attribute(&self, column: &str) -> Option<&FieldValue> {
        self.attributes.get(column)
    }
}

/// Keyed, ordered collection of records from one snapshot.
///
/// Keys are unique. A `RecordSet` is immutable once built; every accessor
/// borrows.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSet {
    name: String,
    key_column: String,
    spatial_reference: Option<String>,
    columns: Vec<String>,
    records: Vec<Record>,
    index: BTreeMap<RecordKey, usize>,
}

impl RecordSet {
    /// Build a record set, rejecting duplicate keys.
    ///
    /// # Errors
    ///
    /// `CadSyncError::DuplicateKey` when two records share a key.
    pub fn new(
        name: impl Into<String>,
        key_column: impl Into<String>,
        records: Vec<Record>,
    ) -> Result<Self> {
        let name = name.into();
        let mut index = BTreeMap::new();
        let mut columns: Vec<String> = Vec::new();
        let mut seen: BTreeSet<String> = BTreeSet::new();

        for (position, record) in records.iter().enumerate() {
            if index.insert(record.key.clone(), position).is_some() {
                return Err(CadSyncError::DuplicateKey {
                    source_name: name,
                    key: record.key.to_string(),
                });
            }
            for column in record.attributes.keys() {
                if seen.insert(column.clone()) {
                    columns.push(column.clone());
                }
            }
        }

        Ok(Self {
            name,
            key_column: key_column.into(),
            spatial_reference: None,
            columns,
            records,
            index,
        })
    }

    /// An empty record set (e.g. a table with no rows).
    pub fn empty(name: impl Into<String>, key_column: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key_column: key_column.into(),
            spatial_reference: None,
            columns: Vec::new(),
            records: Vec::new(),
            index: BTreeMap::new(),
        }
    }

    /// Put declared source columns first, in source order, followed by any
    /// columns only seen in row data. The key column is never listed.
    pub fn with_declared_columns(mut self, declared: &[String]) -> Self {
        let mut ordered: Vec<String> = declared
            .iter()
            .filter(|c| **c != self.key_column)
            .cloned()
            .collect();
        for column in &self.columns {
            if !ordered.contains(column) {
                ordered.push(column.clone());
            }
        }
        self.columns = ordered;
        self
    }

    pub fn with_spatial_reference(mut self, spatial_reference: Option<String>) -> Self {
        self.spatial_reference = spatial_reference;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    pub fn spatial_reference(&self) -> Option<&str> {
        self.spatial_reference.as_deref()
    }

    /// Attribute columns, declared order first
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Records in source order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, key: &RecordKey) -> Option<&Record> {
        self.index.get(key).map(|&i| &self.records[i])
    }

    pub fn contains_key(&self, key: &RecordKey) -> bool {
        self.index.contains_key(key)
    }

    /// Keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &RecordKey> {
        self.index.keys()
    }

    pub fn key_set(&self) -> BTreeSet<RecordKey> {
        self.index.keys().cloned().collect()
    }

    /// SHA-256 over the canonical JSON of the records in key order.
    ///
    /// Independent of source row order; identical content yields identical digests.
    pub fn content_digest(&self) -> String {
        let ordered: Vec<&Record> = self.index.values().map(|&i| &self.records[i]).collect();
        let canonical = serde_json::to_string(&ordered).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        hex::encode(hasher.finalize())
    }
}
