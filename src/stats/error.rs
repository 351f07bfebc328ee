//! Error types for the statistics core.

/// Result type alias for statistics operations.
pub type Result<T> = std::result::Result<T, StatsError>;

/// Every condition the statistics core reports to its caller.
///
/// The core never prints or recovers from these; the presentation layer decides.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StatsError {
    /// A reduction received a zero-length column.
    #[error("cannot aggregate an empty column")]
    EmptyInput,

    /// Paired-column operation received columns of different length.
    #[error("column lengths differ: {left} vs {right}")]
    LengthMismatch {
        /// Length of the first column.
        left: usize,
        /// Length of the second column.
        right: usize,
    },

    /// A zero denominator was encountered (constant column, zero global mean).
    #[error("division by zero: {context}")]
    DivisionByZero {
        /// What was being divided.
        context: &'static str,
    },

    /// The field does not exist in any record.
    #[error("field '{field}' not found in any record")]
    MissingField {
        /// The requested field name.
        field: String,
    },

    /// A cell could not be read as a number under the fail-fast policy.
    #[error("field '{field}' row {row}: '{value}' is not a number")]
    InvalidNumber {
        /// Field being extracted.
        field: String,
        /// Row position in the record set.
        row: usize,
        /// Offending raw text (empty when the cell is missing).
        value: String,
    },
}
