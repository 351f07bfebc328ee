use serde::{Deserialize, Serialize};

use super::error::{Result, StatsError};
use crate::data::model::RecordSet;

/// Ordered values of one numeric field across all records.
pub type NumericColumn = Vec<f64>;

/// Ordered values of one categorical field across all records.
pub type CategoricalColumn = Vec<String>;

/// Label used for records lacking a categorical field.
pub const NOT_AVAILABLE: &str = "Not Available";

/// What to do with a numeric cell that is missing or does not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericPolicy {
    /// Substitute `0.0`. Lossy: bad cells pull averages down silently.
    #[default]
    CoerceToZero,
    /// Report [`StatsError::InvalidNumber`] for the first bad cell.
    FailFast,
}

/// Parse a raw cell as a finite number.
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Extract `field` from every record as `f64`, applying `policy` to bad cells.
///
/// Fails with [`StatsError::MissingField`] if no record carries the field.
pub fn numeric_column(
    set: &RecordSet,
    field: &str,
    policy: NumericPolicy,
) -> Result<NumericColumn> {
    ensure_field(set, field)?;

    let mut coerced = 0usize;
    let mut column = Vec::with_capacity(set.len());
    for (row, rec) in set.records.iter().enumerate() {
        let raw = rec.get(field).map(String::as_str);
        match raw.and_then(parse_number) {
            Some(v) => column.push(v),
            None => match policy {
                NumericPolicy::CoerceToZero => {
                    coerced += 1;
                    column.push(0.0);
                }
                NumericPolicy::FailFast => {
                    return Err(StatsError::InvalidNumber {
                        field: field.to_string(),
                        row,
                        value: raw.unwrap_or_default().to_string(),
                    });
                }
            },
        }
    }

    if coerced > 0 {
        log::debug!("{field}: {coerced} unreadable cells coerced to 0");
    }
    Ok(column)
}

/// Extract `field` from every record as text, using `fallback` where it is absent.
///
/// Fails with [`StatsError::MissingField`] if no record carries the field.
pub fn categorical_column(
    set: &RecordSet,
    field: &str,
    fallback: &str,
) -> Result<CategoricalColumn> {
    ensure_field(set, field)?;

    Ok(set
        .records
        .iter()
        .map(|rec| rec.get(field).cloned().unwrap_or_else(|| fallback.to_string()))
        .collect())
}

fn ensure_field(set: &RecordSet, field: &str) -> Result<()> {
    if set.has_field(field) {
        Ok(())
    } else {
        Err(StatsError::MissingField {
            field: field.to_string(),
        })
    }
}
