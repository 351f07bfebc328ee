/// Data layer: record types, loading, column treatment and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RecordSet (field → raw text)
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ transform  │  FieldMapping (drop / rename) → working view
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  per-field selections → filtered indices
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod transform;
