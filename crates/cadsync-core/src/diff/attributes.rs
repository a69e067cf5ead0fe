//! Attribute differ: per-column comparison of records present on both sides.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::{effective_threshold, AttributeOptions, ColumnComparator, ColumnFilter};
use crate::diff::model::{AttributeChange, AttributeChanges, CellValue};
use crate::model::{FieldValue, Record, RecordSet};

/// Compare attributes of every key present in both sets, using default comparison.
///
/// Columns in `filter` are never compared. Keys present on only one side are
/// the aggregator's concern and are skipped here.
pub fn diff_attributes(
    previous: &RecordSet,
    current: &RecordSet,
    filter: &ColumnFilter,
) -> AttributeChanges {
    diff_attributes_with(previous, current, &AttributeOptions::with_filter(filter.clone()))
}

/// Compare attributes with explicit epsilon and per-column comparators.
pub fn diff_attributes_with(
    previous: &RecordSet,
    current: &RecordSet,
    options: &AttributeOptions,
) -> AttributeChanges {
    let epsilon = effective_threshold(options.epsilon);
    let mut changes = AttributeChanges::new();

    for old in previous.records() {
        let Some(new) = current.get(&old.key) else {
            continue;
        };
        let record_changes = diff_record(old, new, options, epsilon);
        if !record_changes.is_empty() {
            changes.insert(old.key.clone(), record_changes);
        }
    }

    changes
}

fn diff_record(
    old: &Record,
    new: &Record,
    options: &AttributeOptions,
    epsilon: f64,
) -> BTreeMap<String, AttributeChange> {
    let columns: BTreeSet<&String> = old.attributes.keys().chain(new.attributes.keys()).collect();

    let mut changes = BTreeMap::new();
    for column in columns {
        if options.column_filter.contains(column) {
            continue;
        }
        let old_value = old.attribute(column);
        let new_value = new.attribute(column);
        let equal = match (old_value, new_value) {
            (Some(a), Some(b)) => values_equal(a, b, options.comparator_for(column), epsilon),
            (None, None) => true,
            _ => false,
        };
        if !equal {
            changes.insert(
                column.clone(),
                AttributeChange {
                    old: CellValue::from_option(old_value),
                    new: CellValue::from_option(new_value),
                },
            );
        }
    }
    changes
}

/// Equality of two present values under a column comparator.
///
/// Reflexive for every value, NaN included.
pub fn values_equal(a: &FieldValue, b: &FieldValue, comparator: ColumnComparator, epsilon: f64) -> bool {
    match comparator {
        ColumnComparator::Default => default_equal(a, b, epsilon),
        ColumnComparator::Numeric => match (a, b) {
            (FieldValue::Null, FieldValue::Null) => true,
            (FieldValue::Null, _) | (_, FieldValue::Null) => false,
            _ => match (a.coerce_i64(), b.coerce_i64()) {
                (Some(x), Some(y)) => integers_equal(x, y, epsilon),
                _ => match (a.coerce_f64(), b.coerce_f64()) {
                    (Some(x), Some(y)) => numbers_equal(x, y, epsilon),
                    _ => a.normalized() == b.normalized(),
                },
            },
        },
        ColumnComparator::Text => a.normalized() == b.normalized(),
        ColumnComparator::CaseInsensitive => {
            a.normalized().to_lowercase() == b.normalized().to_lowercase()
        }
    }
}

fn default_equal(a: &FieldValue, b: &FieldValue, epsilon: f64) -> bool {
    match (a, b) {
        (FieldValue::Null, FieldValue::Null) => true,
        (FieldValue::Null, _) | (_, FieldValue::Null) => false,
        (FieldValue::Text(x), FieldValue::Text(y)) => x.trim() == y.trim(),
        (FieldValue::Int(x), FieldValue::Int(y)) => integers_equal(*x, *y, epsilon),
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => numbers_equal(x, y, epsilon),
            _ => a.normalized() == b.normalized(),
        },
    }
}

/// Integers compare exactly; only the distance goes through f64.
fn integers_equal(a: i64, b: i64, epsilon: f64) -> bool {
    a == b || a.abs_diff(b) as f64 <= epsilon
}

fn numbers_equal(a: f64, b: f64, epsilon: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan()) || (a - b).abs() <= epsilon
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RecordKey;

    fn set(records: Vec<Record>) -> RecordSet {
        RecordSet::new("parcels", "objectid", records).unwrap()
    }

    #[test]
    fn test_changed_value_recorded() {
        let previous = set(vec![Record::new(1).with_attr("a", "x")]);
        let current = set(vec![Record::new(1).with_attr("a", "y")]);

        let changes = diff_attributes(&previous, &current, &ColumnFilter::new());
        let change = &changes[&RecordKey::Int(1)]["a"];
        assert_eq!(change.old, CellValue::Present(FieldValue::text("x")));
        assert_eq!(change.new, CellValue::Present(FieldValue::text("y")));
    }

    #[test]
    fn test_filtered_column_ignored() {
        let previous = set(vec![Record::new(1).with_attr("last_edited_date", "2024-01-01")]);
        let current = set(vec![Record::new(1).with_attr("last_edited_date", "2024-02-01")]);
        let filter: ColumnFilter = ["last_edited_date"].into_iter().collect();

        assert!(diff_attributes(&previous, &current, &filter).is_empty());
    }

    #[test]
    fn test_missing_column_is_absent_side() {
        let previous = set(vec![Record::new(1).with_attr("a", 1)]);
        let current = set(vec![Record::new(1).with_attr("a", 1).with_attr("b", "new")]);

        let changes = diff_attributes(&previous, &current, &ColumnFilter::new());
        let change = &changes[&RecordKey::Int(1)]["b"];
        assert_eq!(change.old, CellValue::Absent);
        assert_eq!(change.new, CellValue::Present(FieldValue::text("new")));
    }

    #[test]
    fn test_one_sided_keys_skipped() {
        let previous = set(vec![Record::new(1).with_attr("a", 1)]);
        let current = set(vec![Record::new(2).with_attr("a", 2)]);
        assert!(diff_attributes(&previous, &current, &ColumnFilter::new()).is_empty());
    }

    #[test]
    fn test_default_comparison_rules() {
        let eq = |a: FieldValue, b: FieldValue| values_equal(&a, &b, ColumnComparator::Default, 0.0);

        assert!(eq(FieldValue::Int(3), FieldValue::Float(3.0)));
        assert!(eq(FieldValue::Float(f64::NAN), FieldValue::Float(f64::NAN)));
        assert!(eq(FieldValue::text(" north "), FieldValue::text("north")));
        assert!(eq(FieldValue::Null, FieldValue::Null));
        assert!(!eq(FieldValue::Null, FieldValue::text("")));
        assert!(!eq(FieldValue::Int(0), FieldValue::Null));
        assert!(eq(FieldValue::Int(12), FieldValue::text("12")));
        assert!(!eq(FieldValue::Float(1.5), FieldValue::text("1.50")));
    }

    #[test]
    fn test_epsilon_applies_to_numbers() {
        assert!(values_equal(
            &FieldValue::Float(1.0),
            &FieldValue::Float(1.0005),
            ColumnComparator::Default,
            0.001
        ));
        assert!(!values_equal(
            &FieldValue::Float(1.0),
            &FieldValue::Float(1.01),
            ColumnComparator::Default,
            0.001
        ));
    }

    #[test]
    fn test_large_integers_compared_exactly() {
        let previous = set(vec![Record::new(1).with_attr("parcel_id", 9_007_199_254_740_993)]);
        let current = set(vec![Record::new(1).with_attr("parcel_id", 9_007_199_254_740_992)]);

        let changes = diff_attributes(&previous, &current, &ColumnFilter::new());
        assert!(changes[&RecordKey::Int(1)].contains_key("parcel_id"));

        let big = FieldValue::Int(i64::MAX);
        let below = FieldValue::Int(i64::MAX - 1);
        assert!(!values_equal(&big, &below, ColumnComparator::Default, 0.0));
        assert!(values_equal(&big, &below, ColumnComparator::Default, 1.0));
        assert!(values_equal(&FieldValue::Int(i64::MIN), &FieldValue::Int(i64::MIN), ColumnComparator::Default, 0.0));
        assert!(!values_equal(
            &FieldValue::Int(9_007_199_254_740_993),
            &FieldValue::text("9007199254740992"),
            ColumnComparator::Numeric,
            0.0
        ));
    }

    #[test]
    fn test_column_comparators() {
        assert!(values_equal(
            &FieldValue::Float(1.5),
            &FieldValue::text("1.50"),
            ColumnComparator::Numeric,
            0.0
        ));
        assert!(values_equal(
            &FieldValue::Null,
            &FieldValue::text("  "),
            ColumnComparator::Text,
            0.0
        ));
        assert!(values_equal(
            &FieldValue::text("Jerusalem"),
            &FieldValue::text("JERUSALEM "),
            ColumnComparator::CaseInsensitive,
            0.0
        ));
        assert!(!values_equal(
            &FieldValue::text("Jerusalem"),
            &FieldValue::text("JERUSALEM"),
            ColumnComparator::Default,
            0.0
        ));
    }

    #[test]
    fn test_negative_epsilon_treated_as_zero() {
        let previous = set(vec![Record::new(1).with_attr("area", 10.0)]);
        let current = set(vec![Record::new(1).with_attr("area", 10.0)]);
        let options = AttributeOptions {
            epsilon: -1.0,
            ..AttributeOptions::default()
        };
        assert!(diff_attributes_with(&previous, &current, &options).is_empty());
    }
}
