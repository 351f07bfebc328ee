use std::collections::{BTreeMap, BTreeSet};

use super::model::RecordSet;

// ---------------------------------------------------------------------------
// Filter predicate: which values are selected per field
// ---------------------------------------------------------------------------

/// Per-field selection state: maps field_name → set of selected values.
/// If a field is absent from the map it is unconstrained; an empty set means
/// nothing is selected.
pub type FilterState = BTreeMap<String, BTreeSet<String>>;

/// All distinct values of each of `fields`, with `missing_label` standing in
/// for records that lack the field.
pub fn field_values(
    dataset: &RecordSet,
    fields: &[String],
    missing_label: &str,
) -> BTreeMap<String, BTreeSet<String>> {
    fields
        .iter()
        .filter(|f| dataset.has_field(f))
        .map(|f| {
            let values = dataset
                .records
                .iter()
                .map(|r| r.get(f).cloned().unwrap_or_else(|| missing_label.to_string()))
                .collect();
            (f.clone(), values)
        })
        .collect()
}

/// Carry `filters` over to a rebuilt view of the same dataset.
///
/// Existing choices are kept, including deselections of values the view no
/// longer holds. Only values missing from `seen` start out selected, so an
/// empty `filters` and `seen` select everything.
pub fn carry_filter_state(
    filters: &FilterState,
    seen: &BTreeMap<String, BTreeSet<String>>,
    all_values: &BTreeMap<String, BTreeSet<String>>,
) -> FilterState {
    all_values
        .iter()
        .map(|(field, vals)| {
            let selected = match (filters.get(field), seen.get(field)) {
                (Some(selected), Some(known)) => selected
                    .iter()
                    .cloned()
                    .chain(vals.difference(known).cloned())
                    .collect(),
                _ => vals.clone(),
            };
            (field.clone(), selected)
        })
        .collect()
}

/// Return indices of records that pass all active filters.
///
/// A record passes a field filter when:
/// * The field is not present in `filters` → passes (no constraint)
/// * The filter set for that field is empty → nothing selected → fails
/// * The record's value (or `missing_label`) is in the selected set → passes
pub fn filtered_indices(
    dataset: &RecordSet,
    filters: &FilterState,
    missing_label: &str,
) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| {
            filters.iter().all(|(field, selected)| {
                let value = rec.get(field).map(String::as_str).unwrap_or(missing_label);
                selected.contains(value)
            })
        })
        .map(|(i, _)| i)
        .collect()
}
