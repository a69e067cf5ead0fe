//! Comparison configuration.
//!
//! Everything the differs need is passed in explicitly through these types;
//! the core never reads process-wide settings.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Set of column names excluded from attribute comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnFilter(BTreeSet<String>);

impl ColumnFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.0.contains(column)
    }

    pub fn insert(&mut self, column: impl Into<String>) -> bool {
        self.0.insert(column.into())
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Union of two filters
    pub fn union(&self, other: &ColumnFilter) -> ColumnFilter {
        ColumnFilter(self.0.union(&other.0).cloned().collect())
    }
}

impl<S: Into<String>> FromIterator<S> for ColumnFilter {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        ColumnFilter(iter.into_iter().map(Into::into).collect())
    }
}

/// How values of one column are compared.
///
/// Columns whose type drifts across the database/CAD boundary (numbers
/// stored as text, codes with inconsistent casing) get an explicit
/// comparator in configuration instead of a universal coercion rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnComparator {
    /// Numbers within epsilon, text after trimming, mixed types by normalized string
    #[default]
    Default,
    /// Parse text as a number before the epsilon test
    Numeric,
    /// Normalized string equality; null equals the empty string
    Text,
    /// Normalized string equality ignoring case
    CaseInsensitive,
}

/// Options for the attribute differ.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeOptions {
    pub column_filter: ColumnFilter,
    /// Maximum absolute difference for numeric values to still be equal
    pub epsilon: f64,
    pub comparators: BTreeMap<String, ColumnComparator>,
}

impl AttributeOptions {
    pub fn with_filter(column_filter: ColumnFilter) -> Self {
        Self {
            column_filter,
            ..Self::default()
        }
    }

    pub fn comparator_for(&self, column: &str) -> ColumnComparator {
        self.comparators.get(column).copied().unwrap_or_default()
    }
}

/// Full comparison configuration consumed by the aggregator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareOptions {
    pub column_filter: ColumnFilter,
    /// Maximum absolute difference for numeric values to still be equal
    pub epsilon: f64,
    pub comparators: BTreeMap<String, ColumnComparator>,
    /// Maximum vertex displacement for geometries to still be equal
    pub tolerance: f64,
    /// Compare Z when both vertices carry it (2D otherwise)
    pub use_z: bool,
}

impl CompareOptions {
    pub fn new(column_filter: ColumnFilter, tolerance: f64) -> Self {
        Self {
            column_filter,
            tolerance,
            ..Self::default()
        }
    }

    /// The attribute-differ subset of these options
    pub fn attribute_options(&self) -> AttributeOptions {
        AttributeOptions {
            column_filter: self.column_filter.clone(),
            epsilon: self.epsilon,
            comparators: self.comparators.clone(),
        }
    }

    /// Names of settings holding unusable values (negative or NaN).
    pub fn invalid_settings(&self) -> Vec<&'static str> {
        let mut invalid = Vec::new();
        if self.epsilon.is_nan() || self.epsilon < 0.0 {
            invalid.push("epsilon");
        }
        if self.tolerance.is_nan() || self.tolerance < 0.0 {
            invalid.push("tolerance");
        }
        invalid
    }
}

/// Clamp a tolerance or epsilon into the usable range: NaN and negatives become 0.
pub fn effective_threshold(value: f64) -> f64 {
    if value >= 0.0 {
        value
    } else {
        0.0
    }
}
