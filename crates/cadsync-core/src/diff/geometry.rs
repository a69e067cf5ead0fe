//! Geometry differ: tolerance-based comparison of record geometries.

use std::collections::BTreeSet;

use crate::config::effective_threshold;
use crate::model::{Coord, Geometry, RecordKey, RecordSet};

/// Equality-within-tolerance predicate supplied by the geometry backend.
///
/// Implementations must be reflexive (`within_tolerance(g, g, t)` for any
/// `t >= 0`), symmetric, and monotone in `tolerance`.
pub trait GeometryComparator {
    fn within_tolerance(&self, a: &Geometry, b: &Geometry, tolerance: f64) -> bool;
}

/// Vertex-by-vertex comparison.
///
/// Geometries are equal when they have the same kind, the same part layout
/// and every corresponding vertex pair lies within `tolerance`. Distances are
/// planar unless `use_z` is set and both vertices carry Z. M is ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VertexDistance {
    pub use_z: bool,
}

impl VertexDistance {
    pub fn new(use_z: bool) -> Self {
        Self { use_z }
    }

    fn distance(&self, a: &Coord, b: &Coord) -> f64 {
        let dx = a.x - b.x;
        let dy = a.y - b.y;
        let dz = match (self.use_z, a.z, b.z) {
            (true, Some(za), Some(zb)) => za - zb,
            _ => 0.0,
        };
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

impl GeometryComparator for VertexDistance {
    fn within_tolerance(&self, a: &Geometry, b: &Geometry, tolerance: f64) -> bool {
        if a.kind != b.kind || a.parts.len() != b.parts.len() {
            return false;
        }
        a.parts.iter().zip(&b.parts).all(|(pa, pb)| {
            pa.len() == pb.len()
                && pa
                    .iter()
                    .zip(pb)
                    .all(|(ca, cb)| ca == cb || self.distance(ca, cb) <= tolerance)
        })
    }
}

/// Keys present in both sets whose geometries differ beyond `tolerance`,
/// using [`VertexDistance`] in 2D.
pub fn diff_geometry(previous: &RecordSet, current: &RecordSet, tolerance: f64) -> BTreeSet<RecordKey> {
    diff_geometry_with(previous, current, tolerance, &VertexDistance::default())
}

/// Same as [`diff_geometry`] with an injected comparator.
///
/// Geometry on one side only counts as changed; no geometry on either side
/// counts as equal. Negative or NaN tolerance is treated as 0.
pub fn diff_geometry_with(
    previous: &RecordSet,
    current: &RecordSet,
    tolerance: f64,
    comparator: &dyn GeometryComparator,
) -> BTreeSet<RecordKey> {
    let tolerance = effective_threshold(tolerance);
    let mut changed = BTreeSet::new();

    for old in previous.records() {
        let Some(new) = current.get(&old.key) else {
            continue;
        };
        let equal = match (&old.geometry, &new.geometry) {
            (None, None) => true,
            (Some(a), Some(b)) => comparator.within_tolerance(a, b, tolerance),
            _ => false,
        };
        if !equal {
            changed.insert(old.key.clone());
        }
    }

    changed
}
