use cadsync_core::model::{Geometry, Record, RecordSet};
use cadsync_core::snapshot::{RawRow, SourceDescriptor, VecRowSource};

/// Build a record set keyed by `objectid`, panicking on duplicate keys
#[allow(dead_code)]
pub fn record_set(name: &str, records: Vec<Record>) -> RecordSet {
    RecordSet::new(name, "objectid", records).expect("test records have unique keys")
}

/// A 10x10 parcel with its lower-left corner at `(x, y)`
#[allow(dead_code)]
pub fn parcel(x: f64, y: f64) -> Geometry {
    Geometry::polygon(&[
        (x, y),
        (x + 10.0, y),
        (x + 10.0, y + 10.0),
        (x, y + 10.0),
        (x, y),
    ])
}

/// Row source mimicking a district table extract
#[allow(dead_code)]
pub fn district_source(rows: Vec<RawRow>) -> VecRowSource {
    VecRowSource::new(
        SourceDescriptor {
            name: "mahoz".to_string(),
            columns: vec![
                "objectid".to_string(),
                "mahoz".to_string(),
                "mahoz_name".to_string(),
                "last_edited_date".to_string(),
            ],
            spatial_reference: Some("EPSG:2039".to_string()),
        },
        rows,
    )
}
