//! Derived columns: code-to-label mappings computed while loading.
//!
//! The exported CAD attribute table carries a human-readable label next to a
//! numeric region code (e.g. `101` becomes `"jerusalem"`). Computing it at
//! load time keeps the exported data and the comparison input identical.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::FieldValue;

fn default_fallback_prefix() -> String {
    "Unknown_".to_string()
}

/// A column whose value is looked up from another column's code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedColumn {
    /// Name of the column to create (overwrites an existing one)
    pub name: String,
    /// Column holding the code
    pub source: String,
    /// Normalized code text to label
    pub mapping: BTreeMap<String, String>,
    /// Prefix for codes missing from `mapping`
    #[serde(default = "default_fallback_prefix")]
    pub fallback_prefix: String,
}

impl DerivedColumn {
    pub fn new(
        name: impl Into<String>,
        source: impl Into<String>,
        mapping: BTreeMap<String, String>,
    ) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            mapping,
            fallback_prefix: default_fallback_prefix(),
        }
    }

    /// Label for one source value. Null or missing source values stay null.
    pub fn derive(&self, source_value: Option<&FieldValue>) -> FieldValue {
        match source_value {
            None | Some(FieldValue::Null) => FieldValue::Null,
            Some(value) => {
                let code = value.normalized();
                match self.mapping.get(&code) {
                    Some(label) => FieldValue::Text(label.clone()),
                    None => FieldValue::Text(format!("{}{}", self.fallback_prefix, code)),
                }
            }
        }
    }

    /// Apply to a row's values in place.
    pub fn apply(&self, values: &mut BTreeMap<String, FieldValue>) {
        let derived = self.derive(values.get(&self.source));
        values.insert(self.name.clone(), derived);
    }
}
