//! Snapshot loader: turns a row source into a keyed [`RecordSet`].

use serde::{Deserialize, Serialize};

use super::derive::DerivedColumn;
use super::source::RowSource;
use crate::errors::{CadSyncError, Result};
use crate::model::{FieldValue, Record, RecordKey, RecordSet};

/// How a source is turned into a record set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Column holding the stable record identifier
    pub key_column: String,
    /// Columns computed from other columns after key extraction
    #[serde(default)]
    pub derived_columns: Vec<DerivedColumn>,
}

impl LoadOptions {
    pub fn new(key_column: impl Into<String>) -> Self {
        Self {
            key_column: key_column.into(),
            derived_columns: Vec::new(),
        }
    }

    pub fn with_derived_column(mut self, column: DerivedColumn) -> Self {
        self.derived_columns.push(column);
        self
    }
}

/// Read every row of `source` into a [`RecordSet`] keyed by `options.key_column`.
///
/// Reads only; the caller owns and releases whatever the source wraps.
///
/// # Errors
///
/// - `MissingKeyColumn`: the source declares columns and the key is not among them
/// - `MissingKeyValue`: a row has no value, or null, in the key column
/// - `InvalidKey`: a key value is fractional, boolean or blank
/// - `DuplicateKey`: two rows share a key (never resolved silently)
/// - `InvalidGeometry`: a geometry has no vertices or non-finite coordinates
/// - `InvalidValue`: a float attribute is NaN or infinite, which JSON cannot carry
/// - `SourceRead`: the source failed while reading
pub fn load<S: RowSource + ?Sized>(source: &mut S, options: &LoadOptions) -> Result<RecordSet> {
    let descriptor = source.describe();
    let key_column = options.key_column.as_str();

    if !descriptor.columns.is_empty() && !descriptor.columns.iter().any(|c| c == key_column) {
        return Err(CadSyncError::MissingKeyColumn {
            source_name: descriptor.name,
            key_column: key_column.to_string(),
        });
    }

    let mut records = Vec::new();
    let mut row_index = 0usize;
    while let Some(row) = source.next_row()? {
        let mut values = row.values;
        let key_value = match values.remove(key_column) {
            None | Some(FieldValue::Null) => {
                return Err(CadSyncError::MissingKeyValue {
                    source_name: descriptor.name,
                    key_column: key_column.to_string(),
                    row_index,
                })
            }
            Some(value) => value,
        };
        let key = RecordKey::from_value(&key_value).map_err(|reason| CadSyncError::InvalidKey {
            source_name: descriptor.name.clone(),
            row_index,
            reason,
        })?;

        if let Some(geometry) = &row.geometry {
            geometry
                .validate()
                .map_err(|reason| CadSyncError::InvalidGeometry {
                    source_name: descriptor.name.clone(),
                    key: key.to_string(),
                    reason,
                })?;
        }

        if let Some((column, value)) = values
            .iter()
            .find(|(_, v)| matches!(v, FieldValue::Float(f) if !f.is_finite()))
        {
            return Err(CadSyncError::InvalidValue {
                source_name: descriptor.name.clone(),
                key: key.to_string(),
                column: column.clone(),
                reason: format!("{} is not a finite number", value),
            });
        }

        for derived in &options.derived_columns {
            derived.apply(&mut values);
        }

        records.push(Record {
            key,
            attributes: values,
            geometry: row.geometry,
        });
        row_index += 1;
    }

    let mut declared = descriptor.columns.clone();
    for derived in &options.derived_columns {
        if !declared.contains(&derived.name) {
            declared.push(derived.name.clone());
        }
    }

    let set = RecordSet::new(descriptor.name, key_column, records)?
        .with_declared_columns(&declared)
        .with_spatial_reference(descriptor.spatial_reference);

    tracing::debug!(
        source = set.name(),
        record_count = set.len(),
        column_count = set.columns().len(),
        "snapshot loaded"
    );

    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Geometry;
    use crate::snapshot::source::{RawRow, SourceDescriptor, VecRowSource};

    fn parcels(rows: Vec<RawRow>) -> VecRowSource {
        VecRowSource::new(
            SourceDescriptor {
                name: "parcels".to_string(),
                columns: vec!["objectid".to_string(), "name".to_string()],
                spatial_reference: Some("EPSG:2039".to_string()),
            },
            rows,
        )
    }

    #[test]
    fn test_load_extracts_key_and_keeps_order() {
        let mut source = parcels(vec![
            RawRow::new().with_value("objectid", 2).with_value("name", "b"),
            RawRow::new().with_value("objectid", 1).with_value("name", "a"),
        ]);
        let set = load(&mut source, &LoadOptions::new("objectid")).unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.records()[0].key, RecordKey::Int(2));
        assert!(set.records()[0].attribute("objectid").is_none());
        assert_eq!(set.columns(), &["name".to_string()]);
        assert_eq!(set.spatial_reference(), Some("EPSG:2039"));
    }

    #[test]
    fn test_missing_key_column_in_schema() {
        let mut source = parcels(vec![]);
        let err = load(&mut source, &LoadOptions::new("oid")).unwrap_err();
        assert!(matches!(err, CadSyncError::MissingKeyColumn { .. }));
    }

    #[test]
    fn test_null_key_value_rejected() {
        let mut source = parcels(vec![RawRow::new()
            .with_value("objectid", FieldValue::Null)
            .with_value("name", "a")]);
        let err = load(&mut source, &LoadOptions::new("objectid")).unwrap_err();
        assert_eq!(
            err,
            CadSyncError::MissingKeyValue {
                source_name: "parcels".to_string(),
                key_column: "objectid".to_string(),
                row_index: 0,
            }
        );
    }

    #[test]
    fn test_fractional_key_rejected() {
        let mut source = parcels(vec![RawRow::new().with_value("objectid", 1.5)]);
        let err = load(&mut source, &LoadOptions::new("objectid")).unwrap_err();
        assert!(matches!(err, CadSyncError::InvalidKey { row_index: 0, .. }));
    }

    #[test]
    fn test_duplicate_keys_are_a_load_error() {
        let mut source = parcels(vec![
            RawRow::new().with_value("objectid", 1),
            RawRow::new().with_value("objectid", 1.0),
        ]);
        let err = load(&mut source, &LoadOptions::new("objectid")).unwrap_err();
        assert!(matches!(err, CadSyncError::DuplicateKey { ref key, .. } if key == "1"));
    }

    #[test]
    fn test_non_finite_geometry_rejected() {
        let mut source = parcels(vec![RawRow::new()
            .with_value("objectid", 3)
            .with_geometry(Geometry::point(f64::INFINITY, 0.0))]);
        let err = load(&mut source, &LoadOptions::new("objectid")).unwrap_err();
        assert!(matches!(err, CadSyncError::InvalidGeometry { ref key, .. } if key == "3"));
    }

    #[test]
    fn test_non_finite_attribute_rejected() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let mut source = parcels(vec![
                RawRow::new().with_value("objectid", 1).with_value("area", 2.5),
                RawRow::new().with_value("objectid", 4).with_value("area", bad),
            ]);
            let err = load(&mut source, &LoadOptions::new("objectid")).unwrap_err();
            assert!(
                matches!(err, CadSyncError::InvalidValue { ref key, ref column, .. }
                    if key == "4" && column == "area"),
                "{:?} not rejected",
                bad
            );
        }
    }

    #[test]
    fn test_integer_text_key_collides_with_int_key() {
        let mut source = parcels(vec![
            RawRow::new().with_value("objectid", 12),
            RawRow::new().with_value("objectid", " 12 "),
        ]);
        let err = load(&mut source, &LoadOptions::new("objectid")).unwrap_err();
        assert!(matches!(err, CadSyncError::DuplicateKey { ref key, .. } if key == "12"));
    }

    #[test]
    fn test_schemaless_source_checks_rows_only() {
        let mut source = VecRowSource::new(
            SourceDescriptor {
                name: "loose".to_string(),
                ..SourceDescriptor::default()
            },
            vec![RawRow::new().with_value("id", "A-1")],
        );
        let set = load(&mut source, &LoadOptions::new("id")).unwrap();
        assert!(set.contains_key(&RecordKey::from("A-1")));
    }
}
