//! Per-key aggregates: grouped means, variation from the global mean and
//! per-key tendency.

use std::collections::HashMap;

use super::column::{NumericPolicy, categorical_column, numeric_column, parse_number};
use super::engine::mean;
use super::error::{Result, StatsError};
use crate::data::model::RecordSet;

/// Ordered tuple of field values identifying a group.
pub type GroupKey = Vec<String>;

/// Group key → mean, in the order documented by the producing function.
pub type GroupedAggregate = Vec<(GroupKey, f64)>;

/// A group mean with its percentage distance from the global mean.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupVariation {
    pub key: GroupKey,
    pub mean: f64,
    /// `(mean − global) / global × 100`
    pub variation_pct: f64,
}

/// Row indices of each group, in first-seen group order.
///
/// Two records share a group iff every component of the key matches exactly
/// (case-sensitive). Records lacking a key field fall under `fallback`.
pub fn partition(
    records: &RecordSet,
    key_fields: &[&str],
    fallback: &str,
) -> Result<Vec<(GroupKey, Vec<usize>)>> {
    let key_columns = key_fields
        .iter()
        .map(|f| categorical_column(records, f, fallback))
        .collect::<Result<Vec<_>>>()?;
    Ok(group_rows(&key_columns, records.len()))
}

fn group_rows(key_columns: &[Vec<String>], rows: usize) -> Vec<(GroupKey, Vec<usize>)> {
    let mut slots: HashMap<GroupKey, usize> = HashMap::new();
    let mut groups: Vec<(GroupKey, Vec<usize>)> = Vec::new();

    for row in 0..rows {
        let key: GroupKey = key_columns.iter().map(|col| col[row].clone()).collect();
        match slots.get(&key) {
            Some(&slot) => groups[slot].1.push(row),
            None => {
                slots.insert(key.clone(), groups.len());
                groups.push((key, vec![row]));
            }
        }
    }
    groups
}

/// Mean of `value_field` within each group of `key_fields`, in first-seen group order.
pub fn grouped_mean(
    records: &RecordSet,
    key_fields: &[&str],
    value_field: &str,
    policy: NumericPolicy,
    fallback: &str,
) -> Result<GroupedAggregate> {
    let values = numeric_column(records, value_field, policy)?;
    partition(records, key_fields, fallback)?
        .into_iter()
        .map(|(key, rows)| {
            let group: Vec<f64> = rows.iter().map(|&r| values[r]).collect();
            Ok((key, mean(&group)?))
        })
        .collect()
}

/// Percentage variation of each group mean from `global_mean`.
///
/// Fails with [`StatsError::DivisionByZero`] if `global_mean` is zero.
pub fn variation_from_global(
    grouped: &[(GroupKey, f64)],
    global_mean: f64,
) -> Result<Vec<GroupVariation>> {
    if global_mean == 0.0 {
        return Err(StatsError::DivisionByZero {
            context: "variation from a zero global mean",
        });
    }
    Ok(grouped
        .iter()
        .map(|(key, m)| GroupVariation {
            key: key.clone(),
            mean: *m,
            variation_pct: (m - global_mean) / global_mean * 100.0,
        })
        .collect())
}

/// Grouped means of `value_field` together with their variation from the
/// mean over all records.
pub fn grouped_variation(
    records: &RecordSet,
    key_fields: &[&str],
    value_field: &str,
    policy: NumericPolicy,
    fallback: &str,
) -> Result<Vec<GroupVariation>> {
    let global = mean(&numeric_column(records, value_field, policy)?)?;
    let grouped = grouped_mean(records, key_fields, value_field, policy, fallback)?;
    variation_from_global(&grouped, global)
}

/// Mean of `value_field` per value of `key_field`, sorted ascending by key.
///
/// When every present key reads as a number (years) the key is numeric: a
/// record lacking it follows `policy` like any numeric cell (grouped under
/// `0`, or [`StatsError::InvalidNumber`]) and keys sort by value. Otherwise
/// missing keys fall under `fallback` and keys sort lexicographically.
pub fn tendency_over_key(
    records: &RecordSet,
    key_field: &str,
    value_field: &str,
    policy: NumericPolicy,
    fallback: &str,
) -> Result<Vec<(String, f64)>> {
    let values = numeric_column(records, value_field, policy)?;
    let mut keys = categorical_column(records, key_field, fallback)?;

    let numeric = records
        .records
        .iter()
        .filter_map(|rec| rec.get(key_field))
        .all(|k| parse_number(k).is_some());
    if numeric {
        let coerced = numeric_column(records, key_field, policy)?;
        for ((key, rec), n) in keys.iter_mut().zip(&records.records).zip(coerced) {
            if !rec.contains_key(key_field) {
                *key = n.to_string();
            }
        }
    }

    let mut tendency = group_rows(&[keys], records.len())
        .into_iter()
        .map(|(mut key, rows)| {
            let group: Vec<f64> = rows.iter().map(|&r| values[r]).collect();
            Ok((key.pop().unwrap_or_default(), mean(&group)?))
        })
        .collect::<Result<Vec<_>>>()?;

    if numeric {
        tendency.sort_by(|(a, _), (b, _)| {
            let a = parse_number(a).unwrap_or(f64::NAN);
            let b = parse_number(b).unwrap_or(f64::NAN);
            a.total_cmp(&b)
        });
    } else {
        tendency.sort_by(|(a, _), (b, _)| a.cmp(b));
    }
    Ok(tendency)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::record;
    use crate::stats::column::NOT_AVAILABLE;

    const POLICY: NumericPolicy = NumericPolicy::CoerceToZero;

    fn survey() -> RecordSet {
        RecordSet::from_records(vec![
            record(&[("country", "Spain"), ("job", "DS"), ("year", "2023"), ("salary", "60")]),
            record(&[("country", "Germany"), ("job", "DE"), ("year", "2021"), ("salary", "100")]),
            record(&[("country", "Spain"), ("job", "DE"), ("year", "2022"), ("salary", "80")]),
            record(&[("country", "Germany"), ("job", "DE"), ("year", "2023"), ("salary", "140")]),
            record(&[("country", "spain"), ("job", "DS"), ("year", "2021"), ("salary", "20")]),
        ])
    }

    fn key(parts: &[&str]) -> GroupKey {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn grouped_mean_keeps_first_seen_order() {
        let grouped =
            grouped_mean(&survey(), &["country"], "salary", POLICY, NOT_AVAILABLE).unwrap();
        assert_eq!(
            grouped,
            vec![
                (key(&["Spain"]), 70.0),
                (key(&["Germany"]), 120.0),
                (key(&["spain"]), 20.0),
            ]
        );
    }

    #[test]
    fn composite_keys_match_every_component() {
        let grouped =
            grouped_mean(&survey(), &["country", "job"], "salary", POLICY, NOT_AVAILABLE).unwrap();
        assert_eq!(
            grouped,
            vec![
                (key(&["Spain", "DS"]), 60.0),
                (key(&["Germany", "DE"]), 120.0),
                (key(&["Spain", "DE"]), 80.0),
                (key(&["spain", "DS"]), 20.0),
            ]
        );
    }

    #[test]
    fn missing_key_cells_group_under_fallback() {
        let set = RecordSet::from_records(vec![
            record(&[("country", "Chile"), ("salary", "10")]),
            record(&[("salary", "30")]),
        ]);
        let grouped = grouped_mean(&set, &["country"], "salary", POLICY, NOT_AVAILABLE).unwrap();
        assert_eq!(grouped[1], (key(&[NOT_AVAILABLE]), 30.0));
    }

    #[test]
    fn variation_is_relative_to_global_mean() {
        let grouped = vec![(key(&["A"]), 150.0), (key(&["B"]), 50.0)];
        let variations = variation_from_global(&grouped, 100.0).unwrap();
        assert_eq!(variations[0].variation_pct, 50.0);
        assert_eq!(variations[1].variation_pct, -50.0);
        assert_eq!(variations[1].mean, 50.0);
    }

    #[test]
    fn zero_global_mean_is_reported() {
        let err = variation_from_global(&[(key(&["A"]), 1.0)], 0.0).unwrap_err();
        assert!(matches!(err, StatsError::DivisionByZero { .. }));
    }

    #[test]
    fn grouped_variation_uses_mean_of_all_records() {
        // global mean = 400 / 5 = 80
        let v =
            grouped_variation(&survey(), &["country"], "salary", POLICY, NOT_AVAILABLE).unwrap();
        assert_eq!(v[1].key, key(&["Germany"]));
        assert!((v[1].variation_pct - 50.0).abs() < 1e-12);
    }

    #[test]
    fn tendency_is_sorted_ascending_by_key() {
        let t = tendency_over_key(&survey(), "year", "salary", POLICY, NOT_AVAILABLE).unwrap();
        assert_eq!(
            t,
            vec![
                ("2021".to_string(), 60.0),
                ("2022".to_string(), 80.0),
                ("2023".to_string(), 100.0),
            ]
        );
    }

    #[test]
    fn numeric_keys_sort_by_value_not_text() {
        let set = RecordSet::from_records(vec![
            record(&[("k", "10"), ("v", "1")]),
            record(&[("k", "9"), ("v", "2")]),
        ]);
        let t = tendency_over_key(&set, "k", "v", POLICY, NOT_AVAILABLE).unwrap();
        assert_eq!(t[0].0, "9");

        let set = RecordSet::from_records(vec![
            record(&[("k", "b"), ("v", "1")]),
            record(&[("k", "a"), ("v", "2")]),
        ]);
        let t = tendency_over_key(&set, "k", "v", POLICY, NOT_AVAILABLE).unwrap();
        assert_eq!(t[0].0, "a");
    }

    #[test]
    fn missing_year_counts_as_year_zero() {
        let set = RecordSet::from_records(vec![
            record(&[("year", "2023"), ("salary", "100")]),
            record(&[("salary", "40")]),
            record(&[("year", "2021"), ("salary", "80")]),
            record(&[("salary", "20")]),
        ]);
        let t = tendency_over_key(&set, "year", "salary", POLICY, NOT_AVAILABLE).unwrap();
        assert_eq!(
            t,
            vec![
                ("0".to_string(), 30.0),
                ("2021".to_string(), 80.0),
                ("2023".to_string(), 100.0),
            ]
        );

        let err = tendency_over_key(&set, "year", "salary", NumericPolicy::FailFast, NOT_AVAILABLE)
            .unwrap_err();
        assert_eq!(
            err,
            StatsError::InvalidNumber {
                field: "year".into(),
                row: 1,
                value: String::new(),
            }
        );
    }

    #[test]
    fn missing_text_key_uses_fallback_label() {
        let set = RecordSet::from_records(vec![
            record(&[("level", "Senior"), ("salary", "90")]),
            record(&[("salary", "10")]),
        ]);
        let t = tendency_over_key(&set, "level", "salary", POLICY, NOT_AVAILABLE).unwrap();
        assert_eq!(
            t,
            vec![(NOT_AVAILABLE.to_string(), 10.0), ("Senior".to_string(), 90.0)]
        );
    }

    #[test]
    fn missing_fields_propagate() {
        assert!(matches!(
            grouped_mean(&survey(), &["region"], "salary", POLICY, NOT_AVAILABLE),
            Err(StatsError::MissingField { .. })
        ));
        assert!(matches!(
            tendency_over_key(&survey(), "year", "bonus", POLICY, NOT_AVAILABLE),
            Err(StatsError::MissingField { .. })
        ));
    }
}
