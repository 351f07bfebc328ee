//! Statistics core: pure computations over an immutable [`RecordSet`].
//!
//! ```text
//!   RecordSet ──column──▶ NumericColumn / CategoricalColumn
//!        │                        │
//!        │                        ▼
//!        │                 engine   mean, std dev, cov, corr, frequency
//!        │                        │
//!        ├──────────────▶ grouped  per-key means, variation, tendency
//!        │                        │
//!        └──────────────▶ outlier  z-score flags, raw ⇄ cleaned view
//! ```
//!
//! Nothing here prints or touches the filesystem; every failure is a
//! [`StatsError`] returned to the caller.
//!
//! [`RecordSet`]: crate::data::model::RecordSet
//! [`StatsError`]: error::StatsError

pub mod column;
pub mod engine;
pub mod error;
pub mod grouped;
pub mod outlier;
pub mod summary;
