use serde::{Deserialize, Serialize};

/// A single vertex. `z` and `m` are optional and ignored by default comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub m: Option<f64>,
}

impl Coord {
    pub fn xy(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: None,
            m: None,
        }
    }

    pub fn xyz(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z: Some(z),
            m: None,
        }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.z.map_or(true, f64::is_finite)
            && self.m.map_or(true, f64::is_finite)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryKind {
    Point,
    MultiPoint,
    Polyline,
    Polygon,
}

/// Geometry as handed over by the host geometry library.
///
/// The change-detection core treats it as opaque apart from the tolerance
/// predicate supplied through [`crate::diff::geometry::GeometryComparator`].
/// `parts` holds rings for polygons, paths for polylines, and one
/// single-vertex part per point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub kind: GeometryKind,
    pub parts: Vec<Vec<Coord>>,
}

impl Geometry {
    pub fn new(kind: GeometryKind, parts: Vec<Vec<Coord>>) -> Self {
        Self { kind, parts }
    }

    pub fn point(x: f64, y: f64) -> Self {
        Self::new(GeometryKind::Point, vec![vec![Coord::xy(x, y)]])
    }

    /// Polygon with a single ring given as `(x, y)` pairs.
    pub fn polygon(ring: &[(f64, f64)]) -> Self {
        Self::new(
            GeometryKind::Polygon,
            vec![ring.iter().map(|&(x, y)| Coord::xy(x, y)).collect()],
        )
    }

    pub fn vertex_count(&self) -> usize {
        self.parts.iter().map(Vec::len).sum()
    }

    /// Copy of this geometry translated by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            kind: self.kind,
            parts: self
                .parts
                .iter()
                .map(|part| {
                    part.iter()
                        .map(|c| Coord {
                            x: c.x + dx,
                            y: c.y + dy,
                            ..*c
                        })
                        .collect()
                })
                .collect(),
        }
    }

    /// Check that the geometry can take part in tolerance comparison.
    pub fn validate(&self) -> Result<(), String> {
        if self.vertex_count() == 0 {
            return Err("geometry has no vertices".to_string());
        }
        if let Some(part) = self.parts.iter().position(|p| p.iter().any(|c| !c.is_finite())) {
            return Err(format!("part {} has non-finite coordinates", part));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_nan() {
        let mut g = Geometry::point(1.0, 2.0);
        assert!(g.validate().is_ok());
        g.parts[0][0].y = f64::NAN;
        assert!(g.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty() {
        let g = Geometry::new(GeometryKind::Polyline, vec![vec![]]);
        assert_eq!(g.validate(), Err("geometry has no vertices".to_string()));
    }

    #[test]
    fn test_translated_keeps_z() {
        let g = Geometry::new(GeometryKind::Point, vec![vec![Coord::xyz(0.0, 0.0, 5.0)]]);
        let moved = g.translated(1.0, 2.0);
        assert_eq!(moved.parts[0][0], Coord::xyz(1.0, 2.0, 5.0));
    }

    #[test]
    fn test_coord_json_omits_missing_z() {
        let json = serde_json::to_string(&Coord::xy(1.0, 2.0)).unwrap();
        assert_eq!(json, r#"{"x":1.0,"y":2.0}"#);
    }
}
