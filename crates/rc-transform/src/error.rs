//! Row-level transformation errors.

use rc_model::ColumnIndex;
use thiserror::Error;

/// Errors building a record from one row.
///
/// Both are local to the row: the run records the row as a failure and
/// carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// A single coordinate cell could not be split into two values.
    #[error("could not split '{value}' into two coordinates")]
    SrefParse { value: String },

    /// The mapping references a column the row does not have.
    #[error("column {} is missing from a row with {width} values", column.get() + 1)]
    ColumnOutOfRange { column: ColumnIndex, width: usize },
}

/// Result type for row transformation.
pub type Result<T> = std::result::Result<T, RecordError>;
