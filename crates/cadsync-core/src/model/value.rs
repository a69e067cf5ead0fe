use serde::{Deserialize, Serialize};
use std::fmt;

/// A scalar attribute value read from a table row or a CAD attribute table.
///
/// Serialized untagged, so snapshot documents carry plain JSON scalars.
/// `Int` is listed before `Float` so integral JSON numbers stay integers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    /// Build a text value
    pub fn text(s: impl Into<String>) -> Self {
        FieldValue::Text(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Numeric view of `Int` and `Float` values. Text is never coerced here.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Int(i) => Some(*i as f64),
            FieldValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Numeric view that also parses text (after trimming).
    pub fn coerce_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Text(s) => s.trim().parse::<f64>().ok(),
            other => other.as_f64(),
        }
    }

    /// Exact integer view of `Int` values and integer text. Floats are never
    /// narrowed here.
    pub fn coerce_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(i) => Some(*i),
            FieldValue::Text(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }

    /// Stringified, whitespace-normalized form used for non-numeric comparison.
    ///
    /// Null renders as the empty string.
    pub fn normalized(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Int(i) => i.to_string(),
            FieldValue::Float(f) => f.to_string(),
            FieldValue::Text(s) => s.trim().to_string(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "null"),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Text(s) => write!(f, "\"{}\"", s),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_json_scalars() {
        let values: Vec<FieldValue> =
            serde_json::from_str(r#"[null, true, 7, 1.5, "north"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                FieldValue::Null,
                FieldValue::Bool(true),
                FieldValue::Int(7),
                FieldValue::Float(1.5),
                FieldValue::text("north"),
            ]
        );
    }

    #[test]
    fn test_normalized_trims_text() {
        assert_eq!(FieldValue::text("  center \t").normalized(), "center");
        assert_eq!(FieldValue::Null.normalized(), "");
        assert_eq!(FieldValue::Int(101).normalized(), "101");
    }

    #[test]
    fn test_coerce_i64_is_exact() {
        assert_eq!(FieldValue::Int(i64::MAX).coerce_i64(), Some(i64::MAX));
        assert_eq!(FieldValue::text(" -42 ").coerce_i64(), Some(-42));
        assert_eq!(FieldValue::text("4.0").coerce_i64(), None);
        assert_eq!(FieldValue::Float(4.0).coerce_i64(), None);
    }

    #[test]
    fn test_coerce_f64_parses_text() {
        assert_eq!(FieldValue::text(" 1.50 ").coerce_f64(), Some(1.5));
        assert_eq!(FieldValue::text("abc").coerce_f64(), None);
        assert_eq!(FieldValue::text("1.50").as_f64(), None);
    }
}
