//! Error types for the data quality engine.
//!
//! [`ConfigError`] covers malformed constraint definitions and is always raised
//! immediately. [`Violation`] describes one failed check on the data; it is
//! collected into a report in batch mode and raised in fail-fast mode.

use crate::DataValue;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result type for constraint definition operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// A malformed constraint definition.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Range bounds are inconsistent or missing
    #[error("Invalid range for column '{column}': {message}")]
    InvalidRange { column: String, message: String },

    /// Length bounds are inconsistent or missing
    #[error("Invalid length bounds for column '{column}': {message}")]
    InvalidLength { column: String, message: String },

    /// Time range bounds are inconsistent or missing
    #[error("Invalid time range for column '{column}': {message}")]
    InvalidTimeRange { column: String, message: String },

    /// Shape constraint without any expectation
    #[error("Invalid shape constraint: {0}")]
    InvalidShape(String),

    /// Allowed-values constraint with an empty value list
    #[error("Allowed values for column '{0}' cannot be empty")]
    EmptyAllowedValues(String),

    /// Regex pattern failed to compile
    #[error("Invalid regex pattern for column '{column}': {error}")]
    InvalidPattern { column: String, error: String },

    /// Constraint attached to the wrong level (column vs dataset)
    #[error("Constraint '{kind}' cannot be declared on '{column}': {message}")]
    MisplacedConstraint {
        column: String,
        kind: String,
        message: String,
    },

    /// Custom constraint has no predicate attached
    #[error("Custom constraint '{name}' on column '{column}' has no predicate bound")]
    UnboundPredicate { column: String, name: String },

    /// Registry does not know a predicate name
    #[error("No predicate named '{0}' is registered")]
    UnknownPredicate(String),

    /// Results from different constraint sets cannot be merged
    #[error("Cannot merge validation results: {0}")]
    IncompatibleResults(String),
}

impl ConfigError {
    /// Creates a new range error.
    pub fn range(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRange {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Creates a new misplaced constraint error.
    pub fn misplaced(
        column: impl Into<String>,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::MisplacedConstraint {
            column: column.into(),
            kind: kind.into(),
            message: message.into(),
        }
    }
}

/// Category of a failed check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Value type differs from the declared type
    TypeMismatch,
    /// Wrong row or column count, or undeclared columns
    ShapeMismatch,
    /// Numeric or temporal value outside its bounds
    RangeViolation,
    /// Null in a column that must not contain nulls
    NullViolation,
    /// Repeated value in a unique column
    UniquenessViolation,
    /// A custom predicate rejected the value
    CustomPredicateFailure,
    /// Value outside the allowed set
    NotAllowed,
    /// String does not match the pattern
    PatternMismatch,
    /// String length outside its bounds
    LengthViolation,
}

impl ViolationKind {
    /// Returns the snake_case name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::TypeMismatch => "type_mismatch",
            ViolationKind::ShapeMismatch => "shape_mismatch",
            ViolationKind::RangeViolation => "range_violation",
            ViolationKind::NullViolation => "null_violation",
            ViolationKind::UniquenessViolation => "uniqueness_violation",
            ViolationKind::CustomPredicateFailure => "custom_predicate_failure",
            ViolationKind::NotAllowed => "not_allowed",
            ViolationKind::PatternMismatch => "pattern_mismatch",
            ViolationKind::LengthViolation => "length_violation",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single failed check, with enough context to locate it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    /// Column the constraint is declared on (or the dataset-level key)
    pub column: String,
    /// Constraint kind name (e.g. "range")
    pub constraint: String,
    /// Position of the constraint in declared order
    pub constraint_index: usize,
    /// Row identifier, absent for dataset-level checks
    pub row: Option<usize>,
    /// The offending value, absent for dataset-level checks
    pub value: Option<DataValue>,
    /// Failure category
    pub kind: ViolationKind,
    /// Human-readable diagnostic
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} on '{}' ({} #{})",
            self.kind, self.column, self.constraint, self.constraint_index
        )?;
        if let Some(row) = self.row {
            write!(f, " at row {}", row)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for Violation {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_display() {
        let violation = Violation {
            column: "sale_amount".to_string(),
            constraint: "range".to_string(),
            constraint_index: 1,
            row: Some(3),
            value: Some(DataValue::Float(1550.01)),
            kind: ViolationKind::RangeViolation,
            message: "value 1550.01 above maximum 1550".to_string(),
        };
        assert_eq!(
            violation.to_string(),
            "range_violation on 'sale_amount' (range #1) at row 3: value 1550.01 above maximum 1550"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::range("price", "min 5 is greater than max 1");
        assert_eq!(
            err.to_string(),
            "Invalid range for column 'price': min 5 is greater than max 1"
        );
    }
}
