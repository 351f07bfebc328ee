use std::collections::{BTreeMap, BTreeSet};

// ---------------------------------------------------------------------------
// Record – one row of the survey
// ---------------------------------------------------------------------------

/// A single parsed row: field name → raw cell text.
///
/// Cells are kept as the loader saw them. Numeric interpretation happens only
/// when a column is extracted, under an explicit coercion policy.
pub type Record = BTreeMap<String, String>;

// ---------------------------------------------------------------------------
// RecordSet – the complete loaded dataset
// ---------------------------------------------------------------------------

/// Ordered, read-only collection of records with the field list in first-seen order.
///
/// Filtering never mutates a `RecordSet`; it produces a new one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    /// All rows, in source order.
    pub records: Vec<Record>,
    /// Field names in the order they were first encountered.
    pub field_names: Vec<String>,
}

impl RecordSet {
    /// Build the field index from the loaded records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut seen: BTreeSet<String> = BTreeSet::new();
        let mut field_names = Vec::new();
        for rec in &records {
            for field in rec.keys() {
                if seen.insert(field.clone()) {
                    field_names.push(field.clone());
                }
            }
        }
        RecordSet {
            records,
            field_names,
        }
    }

    /// Build from records while keeping a known header order (e.g. a CSV header row).
    ///
    /// Fields present in records but not in `header` are appended in first-seen order.
    pub fn with_header(header: Vec<String>, records: Vec<Record>) -> Self {
        let mut set = Self::from_records(records);
        let mut ordered = header;
        for name in set.field_names.drain(..) {
            if !ordered.contains(&name) {
                ordered.push(name);
            }
        }
        set.field_names = ordered;
        set
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether at least one record carries `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.field_names.iter().any(|f| f == field)
    }

    /// Raw value of `field` in row `index`, if present.
    pub fn value(&self, index: usize, field: &str) -> Option<&str> {
        self.records
            .get(index)
            .and_then(|r| r.get(field))
            .map(String::as_str)
    }

    /// New set holding only the rows at `indices` (in the given order).
    pub fn select(&self, indices: &[usize]) -> RecordSet {
        let records = indices
            .iter()
            .filter_map(|&i| self.records.get(i).cloned())
            .collect();
        RecordSet {
            records,
            field_names: self.field_names.clone(),
        }
    }

    /// New set holding every row whose position is not in `excluded`.
    pub fn without(&self, excluded: &BTreeSet<usize>) -> RecordSet {
        let records = self
            .records
            .iter()
            .enumerate()
            .filter(|(i, _)| !excluded.contains(i))
            .map(|(_, r)| r.clone())
            .collect();
        RecordSet {
            records,
            field_names: self.field_names.clone(),
        }
    }

    /// Sorted set of distinct values for `field` (missing cells are skipped).
    pub fn unique_values(&self, field: &str) -> BTreeSet<String> {
        self.records
            .iter()
            .filter_map(|r| r.get(field).cloned())
            .collect()
    }
}

#[cfg(test)]
pub(crate) fn record(pairs: &[(&str, &str)]) -> Record {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_names_keep_first_seen_order() {
        let set = RecordSet::with_header(
            vec!["b".into(), "a".into()],
            vec![record(&[("a", "1"), ("b", "2")]), record(&[("c", "3")])],
        );
        assert_eq!(set.field_names, vec!["b", "a", "c"]);
        assert!(set.has_field("c"));
        assert!(!set.has_field("d"));
    }

    #[test]
    fn ragged_rows_are_tolerated() {
        let set = RecordSet::from_records(vec![
            record(&[("country", "US")]),
            record(&[("country", "DE"), ("salary", "10")]),
        ]);
        assert_eq!(set.value(0, "salary"), None);
        assert_eq!(set.value(1, "salary"), Some("10"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn without_drops_by_position_not_value() {
        let set = RecordSet::from_records(vec![
            record(&[("v", "1")]),
            record(&[("v", "1")]),
            record(&[("v", "2")]),
        ]);
        let kept = set.without(&BTreeSet::from([0]));
        assert_eq!(kept.len(), 2);
        assert_eq!(kept.value(0, "v"), Some("1"));
        assert_eq!(kept.value(1, "v"), Some("2"));
        // source untouched
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn select_and_unique_values() {
        let set = RecordSet::from_records(vec![
            record(&[("c", "US")]),
            record(&[("c", "DE")]),
            record(&[("c", "US")]),
        ]);
        assert_eq!(set.select(&[2, 1]).value(0, "c"), Some("US"));
        let unique: Vec<_> = set.unique_values("c").into_iter().collect();
        assert_eq!(unique, vec!["DE", "US"]);
    }
}
