//! Snapshot loader tests: key handling, derived columns, record-set shape.

mod common;

use cadsync_core::errors::{CadSyncError, ExError, ExErrorKind};
use cadsync_core::model::{FieldValue, Geometry, RecordKey};
use cadsync_core::snapshot::{load, DerivedColumn, LoadOptions, RawRow, VecRowSource};
use common::{district_source, parcel};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn district_row(objectid: i64, code: i64) -> RawRow {
    RawRow::new()
        .with_value("objectid", objectid)
        .with_value("mahoz", code)
        .with_value("last_edited_date", "2024-05-01")
        .with_geometry(parcel(objectid as f64 * 20.0, 0.0))
}

fn region_labels() -> DerivedColumn {
    let mapping: BTreeMap<String, String> = [("1", "jerusalem"), ("2", "north")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    DerivedColumn::new("mahoz_name", "mahoz", mapping)
}

// ---------------------------------------------------------------------------
// Successful loads
// ---------------------------------------------------------------------------

#[test]
fn test_load_builds_keyed_record_set() {
    let mut source = district_source(vec![district_row(1, 1), district_row(2, 2)]);
    let set = load(&mut source, &LoadOptions::new("objectid")).unwrap();

    assert_eq!(set.name(), "mahoz");
    assert_eq!(set.key_column(), "objectid");
    assert_eq!(set.len(), 2);
    let record = set.get(&RecordKey::Int(2)).unwrap();
    assert_eq!(record.attribute("mahoz"), Some(&FieldValue::Int(2)));
    assert!(record.geometry.is_some());
    assert_eq!(
        set.columns(),
        &[
            "mahoz".to_string(),
            "mahoz_name".to_string(),
            "last_edited_date".to_string()
        ]
    );
}

#[test]
fn test_derived_column_applied_to_every_row() {
    let mut source = district_source(vec![district_row(1, 1), district_row(2, 9)]);
    let options = LoadOptions::new("objectid").with_derived_column(region_labels());
    let set = load(&mut source, &options).unwrap();

    assert_eq!(
        set.get(&RecordKey::Int(1)).unwrap().attribute("mahoz_name"),
        Some(&FieldValue::text("jerusalem"))
    );
    assert_eq!(
        set.get(&RecordKey::Int(2)).unwrap().attribute("mahoz_name"),
        Some(&FieldValue::text("Unknown_9"))
    );
}

#[test]
fn test_text_keys_are_trimmed() {
    let mut source = VecRowSource::from_rows(
        "streets",
        vec![RawRow::new().with_value("code", " ST-01 ").with_value("len", 3.5)],
    );
    let set = load(&mut source, &LoadOptions::new("code")).unwrap();
    assert!(set.contains_key(&RecordKey::from("ST-01")));
}

#[test]
fn test_empty_source_loads_empty_set() {
    let mut source = district_source(vec![]);
    let set = load(&mut source, &LoadOptions::new("objectid")).unwrap();
    assert!(set.is_empty());
    assert_eq!(set.spatial_reference(), Some("EPSG:2039"));
}

#[test]
fn test_content_digest_ignores_row_order() {
    let mut forward = district_source(vec![district_row(1, 1), district_row(2, 2)]);
    let mut backward = district_source(vec![district_row(2, 2), district_row(1, 1)]);
    let a = load(&mut forward, &LoadOptions::new("objectid")).unwrap();
    let b = load(&mut backward, &LoadOptions::new("objectid")).unwrap();
    assert_eq!(a.content_digest(), b.content_digest());
}

// ---------------------------------------------------------------------------
// Load errors
// ---------------------------------------------------------------------------

#[test]
fn test_missing_key_column_maps_to_error_kind() {
    let mut source = district_source(vec![district_row(1, 1)]);
    let err = load(&mut source, &LoadOptions::new("oid")).unwrap_err();

    let ex: ExError = err.into();
    assert_eq!(ex.kind(), ExErrorKind::MissingKeyColumn);
    assert!(ex.kind().is_load_error());
    assert_eq!(ex.entity_id(), Some("mahoz"));
}

#[test]
fn test_row_without_key_value_is_missing_key() {
    let mut source = district_source(vec![
        district_row(1, 1),
        RawRow::new().with_value("mahoz", 2),
    ]);
    let err = load(&mut source, &LoadOptions::new("objectid")).unwrap_err();
    assert!(matches!(
        err,
        CadSyncError::MissingKeyValue { row_index: 1, .. }
    ));

    let ex: ExError = err.into();
    assert_eq!(ex.code(), "ERR_MISSING_KEY_COLUMN");
}

#[test]
fn test_duplicate_key_is_never_resolved_silently() {
    let mut source = district_source(vec![district_row(4, 1), district_row(4, 2)]);
    let err = load(&mut source, &LoadOptions::new("objectid")).unwrap_err();

    let ex: ExError = err.into();
    assert_eq!(ex.kind(), ExErrorKind::DuplicateKey);
    assert_eq!(ex.entity_id(), Some("4"));
}

#[test]
fn test_boolean_key_rejected() {
    let mut source = district_source(vec![RawRow::new().with_value("objectid", true)]);
    let err = load(&mut source, &LoadOptions::new("objectid")).unwrap_err();
    let ex: ExError = err.into();
    assert_eq!(ex.kind(), ExErrorKind::InvalidKey);
}

#[test]
fn test_geometry_without_vertices_rejected() {
    let mut source = district_source(vec![RawRow::new()
        .with_value("objectid", 1)
        .with_geometry(Geometry::polygon(&[]))]);
    let err = load(&mut source, &LoadOptions::new("objectid")).unwrap_err();
    let ex: ExError = err.into();
    assert_eq!(ex.kind(), ExErrorKind::InvalidGeometry);
    assert_eq!(ex.entity_id(), Some("1"));
}
