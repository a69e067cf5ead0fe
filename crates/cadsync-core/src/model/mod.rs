pub mod geometry;
pub mod key;
pub mod record;
pub mod value;

pub use geometry::{Coord, Geometry, GeometryKind};
pub use key::RecordKey;
pub use record::{Record, RecordSet};
pub use value::FieldValue;
