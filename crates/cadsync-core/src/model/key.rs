use serde::{Deserialize, Serialize};
use std::fmt;

use super::value::FieldValue;

/// Stable unique identifier of a record within a record set.
///
/// Object ids are integers in the database extract; CAD attribute tables
/// sometimes carry them as text. Text in canonical integer form (`"12"`,
/// `"-3"`, no leading zeros or sign) becomes an `Int` key, so `"12"` and `12`
/// name the same record. Other text stays `Text`. Ordering puts all integer
/// keys before text keys, which keeps report output deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordKey {
    Int(i64),
    Text(String),
}

impl RecordKey {
    /// Interpret an attribute value as a key.
    ///
    /// Integral floats (as produced by some CAD readers) are accepted as
    /// integers. Returns `Err(reason)` for unusable values.
    pub fn from_value(value: &FieldValue) -> Result<Self, String> {
        match value {
            FieldValue::Int(i) => Ok(RecordKey::Int(*i)),
            FieldValue::Float(f) => {
                if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                    Ok(RecordKey::Int(*f as i64))
                } else {
                    Err(format!("non-integral numeric key {}", f))
                }
            }
            FieldValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    Err("empty text key".to_string())
                } else {
                    Ok(RecordKey::from_text(trimmed))
                }
            }
            FieldValue::Bool(_) => Err("boolean values cannot be keys".to_string()),
            FieldValue::Null => Err("null key".to_string()),
        }
    }

    fn from_text(text: &str) -> Self {
        match text.parse::<i64>() {
            Ok(i) if i.to_string() == text => RecordKey::Int(i),
            _ => RecordKey::Text(text.to_string()),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKey::Int(i) => write!(f, "{}", i),
            RecordKey::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for RecordKey {
    fn from(v: i64) -> Self {
        RecordKey::Int(v)
    }
}

impl From<&str> for RecordKey {
    fn from(v: &str) -> Self {
        RecordKey::from_text(v)
    }
}
