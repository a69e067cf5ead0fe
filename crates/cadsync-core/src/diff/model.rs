//! Change report types.
//!
//! All types implement `Debug, Clone, Serialize, PartialEq`.
//! Collections use `BTreeMap`/`BTreeSet` so iteration and serialization
//! follow key order.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::model::{FieldValue, RecordKey};

/// One side of an attribute change: a value, or the column missing on that side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    /// Column not present on this side
    Absent,
    /// Column present, possibly holding null
    Present(FieldValue),
}

impl CellValue {
    pub fn from_option(value: Option<&FieldValue>) -> Self {
        match value {
            Some(v) => CellValue::Present(v.clone()),
            None => CellValue::Absent,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, CellValue::Absent)
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Absent => write!(f, "<absent>"),
            CellValue::Present(FieldValue::Null) => write!(f, "<null>"),
            CellValue::Present(value) => write!(f, "{}", value),
        }
    }
}

/// Old and new value of one column of one record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttributeChange {
    /// Value in the previous snapshot
    pub old: CellValue,
    /// Value in the current snapshot
    pub new: CellValue,
}

/// Per-key, per-column attribute changes. Only keys with at least one change appear.
pub type AttributeChanges = BTreeMap<RecordKey, BTreeMap<String, AttributeChange>>;

/// Identification of both inputs. Informational only.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReportIdentity {
    /// Name of the previous record set
    pub previous_name: String,
    /// Name of the current record set
    pub current_name: String,
    pub previous_count: usize,
    pub current_count: usize,
    /// Content digest of the previous record set
    pub previous_digest: String,
    /// Content digest of the current record set
    pub current_digest: String,
}

/// Column-set and spatial-reference drift between the two inputs. Informational only.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SchemaChanges {
    /// Columns declared only by the current record set
    pub columns_added: Vec<String>,
    /// Columns declared only by the previous record set
    pub columns_removed: Vec<String>,
    /// `(previous, current)` when the spatial references differ
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spatial_reference_changed: Option<(Option<String>, Option<String>)>,
}

impl SchemaChanges {
    pub fn is_empty(&self) -> bool {
        self.columns_added.is_empty()
            && self.columns_removed.is_empty()
            && self.spatial_reference_changed.is_none()
    }
}

/// The result of comparing a previous snapshot with a current one.
///
/// `has_changes` is true exactly when one of the four change collections is
/// non-empty. `identity` and `schema` never influence it.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChangeReport {
    /// Keys present only in the current snapshot
    pub added_keys: BTreeSet<RecordKey>,
    /// Keys present only in the previous snapshot
    pub removed_keys: BTreeSet<RecordKey>,
    /// Attribute differences for keys present on both sides
    pub attribute_changes: AttributeChanges,
    /// Keys present on both sides whose geometries differ beyond tolerance
    pub geometry_changes: BTreeSet<RecordKey>,
    pub has_changes: bool,
    pub identity: ReportIdentity,
    pub schema: SchemaChanges,
}

impl ChangeReport {
    /// Assemble a report, deriving `has_changes` from the four change collections.
    pub fn new(
        added_keys: BTreeSet<RecordKey>,
        removed_keys: BTreeSet<RecordKey>,
        attribute_changes: AttributeChanges,
        geometry_changes: BTreeSet<RecordKey>,
    ) -> Self {
        let has_changes = !added_keys.is_empty()
            || !removed_keys.is_empty()
            || !attribute_changes.is_empty()
            || !geometry_changes.is_empty();
        Self {
            added_keys,
            removed_keys,
            attribute_changes,
            geometry_changes,
            has_changes,
            identity: ReportIdentity::default(),
            schema: SchemaChanges::default(),
        }
    }

    /// Number of keys with at least one attribute change
    pub fn changed_attribute_records(&self) -> usize {
        self.attribute_changes.len()
    }

    /// Total count of changed cells
    pub fn changed_cells(&self) -> usize {
        self.attribute_changes.values().map(BTreeMap::len).sum()
    }

    /// Keys of records touched in any way, in key order
    pub fn touched_keys(&self) -> BTreeSet<RecordKey> {
        self.added_keys
            .iter()
            .chain(&self.removed_keys)
            .chain(self.attribute_changes.keys())
            .chain(&self.geometry_changes)
            .cloned()
            .collect()
    }
}
