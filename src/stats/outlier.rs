//! Z-score outlier classification and the raw/cleaned working set.
//!
//! ```text
//!            remove(outliers)
//!   ┌─────┐ ─────────────────▶ ┌─────────┐
//!   │ Raw │                    │ Cleaned │
//!   └─────┘ ◀───────────────── └─────────┘
//!            restore(): re-apply the field mapping to the source
//! ```

use std::collections::BTreeSet;

use super::column::{NumericPolicy, numeric_column};
use super::engine::{mean, standard_deviation};
use super::error::{Result, StatsError};
use crate::data::model::RecordSet;
use crate::data::transform::FieldMapping;

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// One flagged row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outlier {
    /// Position in the classified column.
    pub index: usize,
    pub value: f64,
    pub z_score: f64,
}

/// Rows whose |z| exceeds the threshold, by stable row position.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlierSet {
    /// Flagged rows in ascending position order.
    pub outliers: Vec<Outlier>,
    pub threshold: f64,
    pub mean: f64,
    pub std_dev: f64,
    /// Length of the column that was classified.
    pub scanned: usize,
}

impl OutlierSet {
    pub fn len(&self) -> usize {
        self.outliers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outliers.is_empty()
    }

    /// Flagged row positions.
    pub fn indices(&self) -> BTreeSet<usize> {
        self.outliers.iter().map(|o| o.index).collect()
    }

    /// Every record whose position is not flagged.
    pub fn exclude(&self, records: &RecordSet) -> Result<RecordSet> {
        self.check_source(records)?;
        Ok(records.without(&self.indices()))
    }

    /// Only the flagged records, in position order.
    pub fn select(&self, records: &RecordSet) -> Result<RecordSet> {
        self.check_source(records)?;
        let idx: Vec<usize> = self.outliers.iter().map(|o| o.index).collect();
        Ok(records.select(&idx))
    }

    fn check_source(&self, records: &RecordSet) -> Result<()> {
        if records.len() != self.scanned {
            return Err(StatsError::LengthMismatch {
                left: self.scanned,
                right: records.len(),
            });
        }
        Ok(())
    }
}

/// Flag every value with `|value − mean| / std_dev > threshold`.
///
/// The threshold is the caller's choice. A constant column has no z-scores
/// and is reported as [`StatsError::DivisionByZero`], never as "no outliers".
pub fn classify(column: &[f64], threshold: f64) -> Result<OutlierSet> {
    let m = mean(column)?;
    let sd = standard_deviation(column)?;
    if sd == 0.0 {
        return Err(StatsError::DivisionByZero {
            context: "z-score of a column without variation",
        });
    }

    let outliers = column
        .iter()
        .enumerate()
        .filter_map(|(index, &value)| {
            let z_score = (value - m) / sd;
            (z_score.abs() > threshold).then_some(Outlier {
                index,
                value,
                z_score,
            })
        })
        .collect();

    Ok(OutlierSet {
        outliers,
        threshold,
        mean: m,
        std_dev: sd,
        scanned: column.len(),
    })
}

// ---------------------------------------------------------------------------
// Working set state machine
// ---------------------------------------------------------------------------

/// Whether outliers have been removed from the working view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cleanliness {
    #[default]
    Raw,
    Cleaned,
}

/// Untouched source, the mapping that derives the working view, and the view itself.
///
/// Removed rows are discarded. Restoring rebuilds the view from the source.
#[derive(Debug, Clone)]
pub struct WorkingSet {
    source: RecordSet,
    mapping: FieldMapping,
    view: RecordSet,
    state: Cleanliness,
    removed: usize,
}

impl WorkingSet {
    pub fn new(source: RecordSet, mapping: FieldMapping) -> Self {
        let view = mapping.apply(&source);
        Self {
            source,
            mapping,
            view,
            state: Cleanliness::Raw,
            removed: 0,
        }
    }

    pub fn source(&self) -> &RecordSet {
        &self.source
    }

    pub fn view(&self) -> &RecordSet {
        &self.view
    }

    pub fn state(&self) -> Cleanliness {
        self.state
    }

    /// Rows removed since the last restore.
    pub fn removed(&self) -> usize {
        self.removed
    }

    /// Classify `field` of the current view.
    pub fn detect(&self, field: &str, threshold: f64, policy: NumericPolicy) -> Result<OutlierSet> {
        classify(&numeric_column(&self.view, field, policy)?, threshold)
    }

    /// Drop the flagged rows from the view. An empty set leaves the state unchanged.
    pub fn remove(&mut self, outliers: &OutlierSet) -> Result<usize> {
        if outliers.is_empty() {
            return Ok(0);
        }
        self.view = outliers.exclude(&self.view)?;
        self.removed += outliers.len();
        self.state = Cleanliness::Cleaned;
        log::info!(
            "Removed {} outliers (|z| > {}), {} records remain",
            outliers.len(),
            outliers.threshold,
            self.view.len()
        );
        Ok(outliers.len())
    }

    /// Rebuild the view from the source. Returns `false` if nothing was removed.
    pub fn restore(&mut self) -> bool {
        if self.state == Cleanliness::Raw {
            return false;
        }
        self.view = self.mapping.apply(&self.source);
        self.state = Cleanliness::Raw;
        log::info!("Restored {} records ({} were removed)", self.view.len(), self.removed);
        self.removed = 0;
        true
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::data::model::record;

    fn salaries(values: &[f64]) -> RecordSet {
        RecordSet::from_records(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    let id = i.to_string();
                    let salary = v.to_string();
                    record(&[
                        ("id", id.as_str()),
                        ("salary_in_usd", salary.as_str()),
                        ("job_title", "x"),
                    ])
                })
                .collect(),
        )
    }

    const SPIKE: [f64; 6] = [100.0, 102.0, 98.0, 101.0, 99.0, 5000.0];

    #[test]
    fn single_spike_is_the_only_outlier() {
        // Six values cap |z| at sqrt(5) ≈ 2.236 under population std dev.
        let flagged = classify(&SPIKE, 2.0).unwrap();
        assert_eq!(flagged.indices(), BTreeSet::from([5]));
        assert_eq!(flagged.outliers[0].value, 5000.0);
        assert!((flagged.outliers[0].z_score - 5f64.sqrt()).abs() < 1e-3);

        assert!(classify(&SPIKE, 3.0).unwrap().is_empty());
    }

    #[test]
    fn spike_among_many_values_exceeds_three() {
        let mut col: Vec<f64> = (0..20).map(|i| 95.0 + (i % 10) as f64).collect();
        col.push(5000.0);
        let flagged = classify(&col, 3.0).unwrap();
        assert_eq!(flagged.indices(), BTreeSet::from([20]));
    }

    #[test]
    fn remove_then_restore_round_trip() {
        let source = salaries(&SPIKE);
        let mut ws = WorkingSet::new(source.clone(), FieldMapping::default());
        let raw_view = ws.view().clone();
        assert_eq!(ws.state(), Cleanliness::Raw);
        assert!(!ws.view().has_field("job_title"));

        let flagged = ws.detect("salary_in_usd", 2.0, NumericPolicy::CoerceToZero).unwrap();
        assert_eq!(ws.remove(&flagged).unwrap(), 1);
        assert_eq!(ws.view().len(), 5);
        assert_eq!(ws.state(), Cleanliness::Cleaned);
        assert!(ws.view().records.iter().all(|r| r["salary_in_usd"] != "5000"));

        assert!(ws.restore());
        assert_eq!(ws.state(), Cleanliness::Raw);
        assert_eq!(ws.view(), &raw_view);
        assert_eq!(ws.view().len(), 6);
        assert_eq!(ws.source(), &source);
        assert!(!ws.restore());
    }

    #[test]
    fn constant_column_is_not_an_empty_result() {
        let err = classify(&[42.0, 42.0, 42.0], 3.0).unwrap_err();
        assert!(matches!(err, StatsError::DivisionByZero { .. }));
        assert_eq!(classify(&[], 3.0), Err(StatsError::EmptyInput));
    }

    #[test]
    fn duplicate_values_are_removed_by_position() {
        let col = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 90.0, 90.0];
        let set = salaries(&col);
        let flagged = classify(&col, 1.0).unwrap();
        assert_eq!(flagged.indices(), BTreeSet::from([10, 11]));
        let kept = flagged.exclude(&set).unwrap();
        assert_eq!(kept.len(), 10);
        assert_eq!(flagged.select(&set).unwrap().value(0, "id"), Some("10"));
    }

    #[test]
    fn stale_outlier_set_is_rejected() {
        let flagged = classify(&SPIKE, 2.0).unwrap();
        let err = flagged.exclude(&salaries(&SPIKE[..5])).unwrap_err();
        assert_eq!(err, StatsError::LengthMismatch { left: 6, right: 5 });
    }

    #[test]
    fn removing_nothing_keeps_raw_state() {
        let mut ws = WorkingSet::new(salaries(&SPIKE), FieldMapping::identity());
        let none = ws.detect("salary_in_usd", 3.0, NumericPolicy::CoerceToZero).unwrap();
        assert_eq!(ws.remove(&none).unwrap(), 0);
        assert_eq!(ws.state(), Cleanliness::Raw);
    }

    #[test]
    fn cleaning_twice_then_restore_returns_everything() {
        let mut col: Vec<f64> = (0..30).map(|i| 100.0 + (i % 5) as f64).collect();
        col.extend([400.0, 10_000.0]);
        let mut ws = WorkingSet::new(salaries(&col), FieldMapping::identity());
        let original = ws.view().clone();

        let first = ws.detect("salary_in_usd", 3.0, NumericPolicy::CoerceToZero).unwrap();
        ws.remove(&first).unwrap();
        let second = ws.detect("salary_in_usd", 3.0, NumericPolicy::CoerceToZero).unwrap();
        ws.remove(&second).unwrap();
        assert!(ws.view().len() < original.len());

        ws.restore();
        assert_eq!(ws.view(), &original);
    }

    proptest! {
        #[test]
        fn prop_classify_is_idempotent(
            col in prop::collection::vec(-1.0e4f64..1.0e4, 2..64),
            threshold in 0.5f64..4.0,
        ) {
            let first = classify(&col, threshold);
            let second = classify(&col, threshold);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_restore_reproduces_original(
            col in prop::collection::vec(0.0f64..1.0e5, 2..48),
            threshold in 0.5f64..3.0,
        ) {
            let mut ws = WorkingSet::new(salaries(&col), FieldMapping::default());
            let original = ws.view().clone();
            let detected = ws.detect("salary_in_usd", threshold, NumericPolicy::CoerceToZero);
            if let Ok(flagged) = detected {
                ws.remove(&flagged).unwrap();
            }
            ws.restore();
            prop_assert_eq!(ws.view(), &original);
        }
    }
}
