//! Descriptive statistics over extracted columns.
//!
//! All reductions are population statistics (divide by N). Sample-based tools
//! such as pandas' `Series.std()` divide by N−1 and report a slightly larger
//! dispersion; the gap shrinks as N grows.
//!
//! ```text
//!   mean       Σx / N
//!   std_dev    sqrt(Σ(x − mean)² / N)          two passes
//!   cov        Σ(a − ā)(b − b̄) / N
//!   corr       cov / sqrt(var(a) · var(b))    on deviations scaled into [-1, 1]
//! ```

use std::collections::HashMap;

use super::column::{CategoricalColumn, NumericPolicy, categorical_column, numeric_column};
use super::error::{Result, StatsError};
use crate::data::model::RecordSet;

/// Category label → count, ordered by count descending, ties in first-seen order.
pub type FrequencyTable = Vec<(String, usize)>;

// ---------------------------------------------------------------------------
// Reductions
// ---------------------------------------------------------------------------

/// Arithmetic mean.
pub fn mean(column: &[f64]) -> Result<f64> {
    if column.is_empty() {
        return Err(StatsError::EmptyInput);
    }
    Ok(column.iter().sum::<f64>() / column.len() as f64)
}

/// Population variance, two-pass.
pub fn variance(column: &[f64]) -> Result<f64> {
    let m = mean(column)?;
    let squared: f64 = column.iter().map(|v| (v - m).powi(2)).sum();
    Ok(squared / column.len() as f64)
}

/// Population standard deviation (divides by N, not N−1).
pub fn standard_deviation(column: &[f64]) -> Result<f64> {
    Ok(variance(column)?.sqrt())
}

/// Mean of the products of paired deviations from each column's own mean.
pub fn covariance(a: &[f64], b: &[f64]) -> Result<f64> {
    check_paired(a, b)?;
    let mean_a = mean(a)?;
    let mean_b = mean(b)?;
    let sum: f64 = a
        .iter()
        .zip(b)
        .map(|(x, y)| (x - mean_a) * (y - mean_b))
        .sum();
    Ok(sum / a.len() as f64)
}

/// Pearson correlation.
///
/// Both columns are centred and divided by their largest absolute deviation
/// first, so the products stay finite for any finite input.
/// Fails with [`StatsError::DivisionByZero`] when either column is constant.
pub fn correlation(a: &[f64], b: &[f64]) -> Result<f64> {
    check_paired(a, b)?;
    let (Some(ua), Some(ub)) = (unit_deviations(a)?, unit_deviations(b)?) else {
        return Err(StatsError::DivisionByZero {
            context: "correlation of a constant column",
        });
    };
    let cov = covariance(&ua, &ub)?;
    Ok(cov / (variance(&ua)? * variance(&ub)?).sqrt())
}

/// Deviations from the mean scaled into `[-1, 1]`; `None` for a constant column.
fn unit_deviations(column: &[f64]) -> Result<Option<Vec<f64>>> {
    let m = mean(column)?;
    let deviations: Vec<f64> = column.iter().map(|v| v - m).collect();
    let scale = deviations.iter().fold(0.0f64, |acc, d| acc.max(d.abs()));
    if scale == 0.0 {
        return Ok(None);
    }
    Ok(Some(deviations.iter().map(|d| d / scale).collect()))
}

/// Smallest value.
pub fn min_value(column: &[f64]) -> Result<f64> {
    column
        .iter()
        .copied()
        .reduce(f64::min)
        .ok_or(StatsError::EmptyInput)
}

/// Largest value.
pub fn max_value(column: &[f64]) -> Result<f64> {
    column
        .iter()
        .copied()
        .reduce(f64::max)
        .ok_or(StatsError::EmptyInput)
}

fn check_paired(a: &[f64], b: &[f64]) -> Result<()> {
    if a.len() != b.len() {
        return Err(StatsError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Frequencies
// ---------------------------------------------------------------------------

/// Count occurrences of each label.
///
/// Sorted by count descending; equal counts keep the order in which the
/// labels were first seen.
pub fn frequency(column: &[String]) -> FrequencyTable {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut table: FrequencyTable = Vec::new();
    for label in column {
        match slots.get(label.as_str()) {
            Some(&i) => table[i].1 += 1,
            None => {
                slots.insert(label.as_str(), table.len());
                table.push((label.clone(), 1));
            }
        }
    }
    // stable: ties stay in first-seen order
    table.sort_by(|a, b| b.1.cmp(&a.1));
    table
}

/// Most frequent label (first-seen wins ties).
pub fn mode(column: &[String]) -> Result<String> {
    frequency(column)
        .into_iter()
        .next()
        .map(|(label, _)| label)
        .ok_or(StatsError::EmptyInput)
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Basic descriptive statistics of a numeric column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnSummary {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

/// Compute a [`ColumnSummary`]; fails on an empty column.
pub fn summarize(column: &[f64]) -> Result<ColumnSummary> {
    Ok(ColumnSummary {
        count: column.len(),
        mean: mean(column)?,
        std_dev: standard_deviation(column)?,
        min: min_value(column)?,
        max: max_value(column)?,
    })
}

// ---------------------------------------------------------------------------
// Record-set facade
// ---------------------------------------------------------------------------

/// Field-level queries over a borrowed, immutable [`RecordSet`].
///
/// Holds no state besides the borrowed records and extraction settings;
/// every call re-extracts its columns.
#[derive(Debug, Clone, Copy)]
pub struct StatsEngine<'a> {
    records: &'a RecordSet,
    policy: NumericPolicy,
    fallback: &'a str,
}

impl<'a> StatsEngine<'a> {
    pub fn new(records: &'a RecordSet, policy: NumericPolicy, fallback: &'a str) -> Self {
        Self {
            records,
            policy,
            fallback,
        }
    }

    pub fn numeric(&self, field: &str) -> Result<Vec<f64>> {
        numeric_column(self.records, field, self.policy)
    }

    pub fn categorical(&self, field: &str) -> Result<CategoricalColumn> {
        categorical_column(self.records, field, self.fallback)
    }

    pub fn mean_of(&self, field: &str) -> Result<f64> {
        mean(&self.numeric(field)?)
    }

    pub fn std_dev_of(&self, field: &str) -> Result<f64> {
        standard_deviation(&self.numeric(field)?)
    }

    pub fn correlation_of(&self, a: &str, b: &str) -> Result<f64> {
        correlation(&self.numeric(a)?, &self.numeric(b)?)
    }

    pub fn frequency_of(&self, field: &str) -> Result<FrequencyTable> {
        Ok(frequency(&self.categorical(field)?))
    }

    /// `(min, max)` of a numeric field.
    pub fn range_of(&self, field: &str) -> Result<(f64, f64)> {
        let col = self.numeric(field)?;
        Ok((min_value(&col)?, max_value(&col)?))
    }

    pub fn summary_of(&self, field: &str) -> Result<ColumnSummary> {
        summarize(&self.numeric(field)?)
    }
}
