//! JSON snapshot documents.
//!
//! A snapshot document is the file-based exchange format for one table
//! extract:
//!
//! ```json
//! {
//!   "name": "gis_nafot",
//!   "spatial_reference": "EPSG:2039",
//!   "columns": ["objectid", "nafa"],
//!   "rows": [
//!     {"objectid": 1, "nafa": "north", "geometry": {"kind": "point", "parts": [[{"x": 1.0, "y": 2.0}]]}}
//!   ]
//! }
//! ```
//!
//! Attribute values are plain JSON scalars. `geometry` is reserved in rows.

use cadsync_core::errors::Result as CoreResult;
use cadsync_core::model::{FieldValue, Geometry, RecordKey, RecordSet};
use cadsync_core::snapshot::{RawRow, RowSource, SourceDescriptor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::errors::{invalid_snapshot, invalid_value, io_error, serialization, Result};

/// One row of a snapshot document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRow {
    #[serde(flatten)]
    pub attributes: BTreeMap<String, FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
}

/// Serialized form of a table extract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spatial_reference: Option<String>,
    /// Declared columns, key column included. Empty when undeclared.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<String>,
    pub rows: Vec<SnapshotRow>,
}

impl SnapshotDocument {
    /// Document for a record set, in key order, with the key written back
    /// into each row under the key column.
    pub fn from_record_set(set: &RecordSet) -> Self {
        let mut columns = vec![set.key_column().to_string()];
        columns.extend(set.columns().iter().cloned());

        let rows = set
            .keys()
            .filter_map(|key| set.get(key))
            .map(|record| {
                let mut attributes = record.attributes.clone();
                let key_value = match &record.key {
                    RecordKey::Int(i) => FieldValue::Int(*i),
                    RecordKey::Text(s) => FieldValue::Text(s.clone()),
                };
                attributes.insert(set.key_column().to_string(), key_value);
                SnapshotRow {
                    attributes,
                    geometry: record.geometry.clone(),
                }
            })
            .collect();

        Self {
            name: set.name().to_string(),
            spatial_reference: set.spatial_reference().map(str::to_string),
            columns,
            rows,
        }
    }

    /// Pretty-printed JSON bytes
    ///
    /// JSON has no NaN or infinity; serde_json would write them as `null`
    /// and the next run would read back a different value.
    ///
    /// # Errors
    ///
    /// - `InvalidValue`: a float attribute or a coordinate is not finite
    /// - `Serialization`: a value cannot be represented in JSON
    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        for row in &self.rows {
            if let Some((column, value)) = row
                .attributes
                .iter()
                .find(|(_, v)| matches!(v, FieldValue::Float(f) if !f.is_finite()))
            {
                return Err(invalid_value(
                    "write_snapshot",
                    column,
                    format!("{} is not a finite number", value),
                ));
            }
            if let Some(Err(reason)) = row.geometry.as_ref().map(Geometry::validate) {
                return Err(invalid_value("write_snapshot", "geometry", reason));
            }
        }
        serde_json::to_vec_pretty(self).map_err(|e| serialization("write_snapshot", e))
    }
}

/// [`RowSource`] over a snapshot document.
#[derive(Debug)]
pub struct JsonSnapshotSource {
    descriptor: SourceDescriptor,
    rows: std::vec::IntoIter<SnapshotRow>,
}

impl JsonSnapshotSource {
    /// Read and parse a snapshot file. The file stem names the source when
    /// the document has no name.
    ///
    /// # Errors
    ///
    /// - `NotFound` / `Io`: the file cannot be read
    /// - `InvalidSnapshot`: the content is not a snapshot document
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| io_error("read_snapshot", path, e))?;
        let mut document: SnapshotDocument =
            serde_json::from_slice(&bytes).map_err(|e| invalid_snapshot(path, e))?;
        if document.name.trim().is_empty() {
            document.name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
        }
        tracing::debug!(
            path = %path.display(),
            rows = document.rows.len(),
            "snapshot document read"
        );
        Ok(Self::from_document(document))
    }

    pub fn from_document(document: SnapshotDocument) -> Self {
        Self {
            descriptor: SourceDescriptor {
                name: document.name,
                columns: document.columns,
                spatial_reference: document.spatial_reference,
            },
            rows: document.rows.into_iter(),
        }
    }
}

impl RowSource for JsonSnapshotSource {
    fn describe(&self) -> SourceDescriptor {
        self.descriptor.clone()
    }

    fn next_row(&mut self) -> CoreResult<Option<RawRow>> {
        Ok(self.rows.next().map(|row| RawRow {
            values: row.attributes,
            geometry: row.geometry,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadsync_core::model::Record;
    use cadsync_core::snapshot::{load, LoadOptions};
    use std::io::Write;

    const DOCUMENT: &str = r#"{
        "name": "gis_nafot",
        "spatial_reference": "EPSG:2039",
        "columns": ["objectid", "nafa", "area"],
        "rows": [
            {"objectid": 2, "nafa": "south", "area": 12.5},
            {"objectid": 1, "nafa": null, "area": 3,
             "geometry": {"kind": "point", "parts": [[{"x": 1.0, "y": 2.0}]]}}
        ]
    }"#;

    #[test]
    fn test_parse_and_load() {
        let document: SnapshotDocument = serde_json::from_str(DOCUMENT).unwrap();
        let mut source = JsonSnapshotSource::from_document(document);
        let set = load(&mut source, &LoadOptions::new("objectid")).unwrap();

        assert_eq!(set.name(), "gis_nafot");
        assert_eq!(set.spatial_reference(), Some("EPSG:2039"));
        let one = set.get(&RecordKey::Int(1)).unwrap();
        assert_eq!(one.attribute("nafa"), Some(&FieldValue::Null));
        assert_eq!(one.attribute("area"), Some(&FieldValue::Int(3)));
        assert_eq!(one.geometry, Some(Geometry::point(1.0, 2.0)));
        let two = set.get(&RecordKey::Int(2)).unwrap();
        assert_eq!(two.attribute("area"), Some(&FieldValue::Float(12.5)));
        assert!(two.geometry.is_none());
    }

    #[test]
    fn test_record_set_document_round_trip() {
        let set = RecordSet::new(
            "gis_nafot",
            "objectid",
            vec![
                Record::new(3).with_attr("nafa", "north"),
                Record::new(1)
                    .with_attr("nafa", "center")
                    .with_geometry(Geometry::point(5.0, 5.0)),
            ],
        )
        .unwrap()
        .with_spatial_reference(Some("EPSG:2039".to_string()));

        let bytes = SnapshotDocument::from_record_set(&set).to_json_bytes().unwrap();
        let document: SnapshotDocument = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(document.columns, vec!["objectid".to_string(), "nafa".to_string()]);

        let mut source = JsonSnapshotSource::from_document(document);
        let reloaded = load(&mut source, &LoadOptions::new("objectid")).unwrap();
        assert_eq!(reloaded.content_digest(), set.content_digest());
        assert_eq!(reloaded.spatial_reference(), Some("EPSG:2039"));
    }

    #[test]
    fn test_non_finite_values_are_not_written() {
        let set = RecordSet::new(
            "gis_nafot",
            "objectid",
            vec![
                Record::new(1).with_attr("area", 2.5),
                Record::new(2).with_attr("area", f64::NAN),
            ],
        )
        .unwrap();
        let err = SnapshotDocument::from_record_set(&set)
            .to_json_bytes()
            .unwrap_err();
        assert_eq!(err.code(), "ERR_INVALID_VALUE");
        assert_eq!(err.entity_id(), Some("area"));

        let set = RecordSet::new(
            "gis_nafot",
            "objectid",
            vec![Record::new(1).with_geometry(Geometry::point(f64::INFINITY, 0.0))],
        )
        .unwrap();
        assert!(SnapshotDocument::from_record_set(&set).to_json_bytes().is_err());
    }

    #[test]
    fn test_float_attributes_reload_to_equal_values() {
        let set = RecordSet::new(
            "gis_nafot",
            "objectid",
            vec![
                Record::new(1).with_attr("area", 12.5).with_attr("ratio", 0.1),
                Record::new(2).with_attr("area", -1e-7).with_attr("ratio", 1e300),
            ],
        )
        .unwrap();

        let bytes = SnapshotDocument::from_record_set(&set).to_json_bytes().unwrap();
        let mut source =
            JsonSnapshotSource::from_document(serde_json::from_slice(&bytes).unwrap());
        let reloaded = load(&mut source, &LoadOptions::new("objectid")).unwrap();
        for key in [1, 2] {
            assert_eq!(
                reloaded.get(&RecordKey::Int(key)).unwrap().attributes,
                set.get(&RecordKey::Int(key)).unwrap().attributes
            );
        }
    }

    #[test]
    fn test_open_uses_file_stem_when_unnamed() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("mahoz.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(br#"{"rows": [{"id": "A"}]}"#).unwrap();

        let source = JsonSnapshotSource::open(&path).unwrap();
        assert_eq!(source.describe().name, "mahoz");
        assert!(source.describe().columns.is_empty());
    }

    #[test]
    fn test_open_reports_missing_and_malformed_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = JsonSnapshotSource::open(&dir.path().join("none.json")).unwrap_err();
        assert_eq!(missing.code(), "ERR_NOT_FOUND");

        let path = dir.path().join("broken.json");
        std::fs::write(&path, b"{\"rows\": 5}").unwrap();
        let malformed = JsonSnapshotSource::open(&path).unwrap_err();
        assert_eq!(malformed.code(), "ERR_INVALID_SNAPSHOT");
    }
}
