//! Error types for mapping operations.

use std::fmt;

use rc_model::{ColumnIndex, SrefKind};

use crate::selection::Field;

/// Errors from building a field mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    /// A required field has no selection.
    MissingField(Field),
    /// `auto` or `manual` used on a field that does not accept it.
    InvalidSentinel { field: Field, sentinel: &'static str },
    /// Column selected for two standard fields.
    ColumnAlreadyUsed {
        column: ColumnIndex,
        first: Field,
        second: Field,
    },
    /// Column marked additional while also serving a standard field.
    AdditionalConflict { column: ColumnIndex, field: Field },
    /// Coordinate columns disagree with the spatial reference settings.
    InconsistentCoordinates(String),
    /// Manual precision is not a whole number of metres.
    InvalidPrecision(String),
    /// Coordinate system not valid for the spatial reference kind.
    UnknownSystem { kind: SrefKind, srid: u32 },
    /// Column named in a selection does not exist in the header.
    ColumnNotFound(String),
    /// Column index past the end of the header.
    ColumnOutOfRange { column: ColumnIndex, width: usize },
    /// An output file header does not match the plan it should follow.
    PlanMismatch { expected: usize, found: usize },
}

impl fmt::Display for MappingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "No column selected for {field}"),
            Self::InvalidSentinel { field, sentinel } => {
                write!(f, "'{sentinel}' is not a valid selection for {field}")
            }
            Self::ColumnAlreadyUsed {
                column,
                first,
                second,
            } => write!(
                f,
                "Column {column} is selected for both {first} and {second}"
            ),
            Self::AdditionalConflict { column, field } => write!(
                f,
                "Column {column} is already mapped to {field} and cannot also be additional"
            ),
            Self::InconsistentCoordinates(reason) => {
                write!(f, "Inconsistent coordinates: {reason}")
            }
            Self::InvalidPrecision(value) => write!(
                f,
                "Manual precision must be a whole number of metres, got '{value}'"
            ),
            Self::UnknownSystem { kind, srid } => {
                write!(f, "Coordinate system {srid} is not available for {kind}")
            }
            Self::ColumnNotFound(name) => write!(f, "Column not found: {name}"),
            Self::ColumnOutOfRange { column, width } => write!(
                f,
                "Column {column} is out of range for a file with {width} columns"
            ),
            Self::PlanMismatch { expected, found } => write!(
                f,
                "Expected {expected} columns in the validated file, found {found}"
            ),
        }
    }
}

impl std::error::Error for MappingError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MappingError::ColumnAlreadyUsed {
            column: ColumnIndex(2),
            first: Field::Date,
            second: Field::Coord1,
        };
        assert_eq!(
            err.to_string(),
            "Column 2 is selected for both date and coordinate 1"
        );
    }
}
