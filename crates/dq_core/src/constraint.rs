//! Constraint definitions.
//!
//! A constraint pairs a column key with a [`ConstraintKind`]: one testable
//! property of a column or of the dataset as a whole. Every constructor checks
//! the parameters and returns a [`ConfigError`] for malformed definitions, so a
//! constraint that exists is always well formed.

use crate::{ConfigError, CustomPredicate, DataValue, Result, ValueType};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Key under which dataset-level constraints (such as shape) are declared.
pub const DATASET_KEY: &str = "@dataset";

/// What a constraint is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintLevel {
    /// One value at a time, row by row
    Value,
    /// A whole column series
    Column,
    /// The dataset as a whole
    Dataset,
}

fn default_true() -> bool {
    true
}

fn is_true(value: &bool) -> bool {
    *value
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// The predicate kind of a constraint and its parameters.
///
/// The serialized form is tagged by `kind`, e.g.
/// `{"kind": "range", "min": 2.5, "max": 1550.0}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConstraintKind {
    /// Non-null values must have the expected type
    Type {
        /// Expected value type
        expected: ValueType,
        /// Whether null passes the type check
        #[serde(default, skip_serializing_if = "is_false")]
        allow_null: bool,
    },

    /// Numeric values must lie within the bounds
    Range {
        /// Lower bound
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        /// Upper bound
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
        /// Whether `min` itself is allowed
        #[serde(default = "default_true", skip_serializing_if = "is_true")]
        min_inclusive: bool,
        /// Whether `max` itself is allowed
        #[serde(default = "default_true", skip_serializing_if = "is_true")]
        max_inclusive: bool,
    },

    /// Values must not be null
    NotNull,

    /// Non-null values must not repeat within the column
    Unique,

    /// Exact row and/or column count of the dataset
    Shape {
        /// Expected row count
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rows: Option<usize>,
        /// Expected column count
        #[serde(default, skip_serializing_if = "Option::is_none")]
        columns: Option<usize>,
    },

    /// Values must render to one of the listed strings
    AllowedValues {
        /// Allowed renderings
        values: Vec<String>,
    },

    /// String values must match the regular expression
    Pattern {
        /// Regular expression
        regex: String,
    },

    /// String length (in characters) must lie within the bounds
    Length {
        /// Minimum length (inclusive)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<usize>,
        /// Maximum length (inclusive)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<usize>,
    },

    /// Timestamps must lie within the bounds (inclusive)
    TimeRange {
        /// Earliest allowed timestamp
        #[serde(default, skip_serializing_if = "Option::is_none")]
        earliest: Option<DateTime<Utc>>,
        /// Latest allowed timestamp
        #[serde(default, skip_serializing_if = "Option::is_none")]
        latest: Option<DateTime<Utc>>,
    },

    /// User-supplied predicate, persisted by name
    Custom {
        /// Predicate name
        name: String,
        /// Attached function
        #[serde(skip)]
        predicate: CustomPredicate,
    },
}

impl ConstraintKind {
    /// Type check that rejects nulls.
    pub fn type_of(expected: ValueType) -> Self {
        Self::Type {
            expected,
            allow_null: false,
        }
    }

    /// Type check that lets nulls through.
    pub fn nullable_type_of(expected: ValueType) -> Self {
        Self::Type {
            expected,
            allow_null: true,
        }
    }

    /// Inclusive range `[min, max]`.
    pub fn range(min: f64, max: f64) -> Self {
        Self::range_with(Some(min), Some(max), true, true)
    }

    /// Range with explicit bound inclusivity; either bound may be open.
    pub fn range_with(
        min: Option<f64>,
        max: Option<f64>,
        min_inclusive: bool,
        max_inclusive: bool,
    ) -> Self {
        Self::Range {
            min,
            max,
            min_inclusive,
            max_inclusive,
        }
    }

    /// Expected column count.
    pub fn column_count(columns: usize) -> Self {
        Self::Shape {
            rows: None,
            columns: Some(columns),
        }
    }

    /// Expected row count.
    pub fn row_count(rows: usize) -> Self {
        Self::Shape {
            rows: Some(rows),
            columns: None,
        }
    }

    /// Set membership over rendered values.
    pub fn allowed_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::AllowedValues {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Regular expression match.
    pub fn pattern(regex: impl Into<String>) -> Self {
        Self::Pattern {
            regex: regex.into(),
        }
    }

    /// Boolean custom predicate.
    pub fn custom<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&DataValue) -> bool + Send + Sync + 'static,
    {
        Self::Custom {
            name: name.into(),
            predicate: CustomPredicate::new(predicate),
        }
    }

    /// Custom predicate reporting its own failure message.
    pub fn custom_fallible<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&DataValue) -> std::result::Result<(), String> + Send + Sync + 'static,
    {
        Self::Custom {
            name: name.into(),
            predicate: CustomPredicate::fallible(predicate),
        }
    }

    /// The `kind` tag of this constraint.
    pub fn name(&self) -> &'static str {
        match self {
            ConstraintKind::Type { .. } => "type",
            ConstraintKind::Range { .. } => "range",
            ConstraintKind::NotNull => "not_null",
            ConstraintKind::Unique => "unique",
            ConstraintKind::Shape { .. } => "shape",
            ConstraintKind::AllowedValues { .. } => "allowed_values",
            ConstraintKind::Pattern { .. } => "pattern",
            ConstraintKind::Length { .. } => "length",
            ConstraintKind::TimeRange { .. } => "time_range",
            ConstraintKind::Custom { .. } => "custom",
        }
    }

    /// The level this constraint is evaluated at.
    pub fn level(&self) -> ConstraintLevel {
        match self {
            ConstraintKind::Shape { .. } => ConstraintLevel::Dataset,
            ConstraintKind::Unique => ConstraintLevel::Column,
            _ => ConstraintLevel::Value,
        }
    }

    /// Checks the parameters of this constraint as declared on `column`.
    pub fn check_definition(&self, column: &str) -> Result<()> {
        let on_dataset = column == DATASET_KEY;
        match (self.level(), on_dataset) {
            (ConstraintLevel::Dataset, false) => {
                return Err(ConfigError::misplaced(
                    column,
                    self.name(),
                    format!("dataset-level constraints belong under '{}'", DATASET_KEY),
                ));
            }
            (ConstraintLevel::Value | ConstraintLevel::Column, true) => {
                return Err(ConfigError::misplaced(
                    column,
                    self.name(),
                    "column constraints need a column name",
                ));
            }
            _ => {}
        }

        match self {
            ConstraintKind::Range {
                min,
                max,
                min_inclusive,
                max_inclusive,
            } => check_range(column, *min, *max, *min_inclusive, *max_inclusive),
            ConstraintKind::Length { min, max } => match (min, max) {
                (None, None) => Err(ConfigError::InvalidLength {
                    column: column.to_string(),
                    message: "at least one of min or max is required".to_string(),
                }),
                (Some(lo), Some(hi)) if lo > hi => Err(ConfigError::InvalidLength {
                    column: column.to_string(),
                    message: format!("min {} is greater than max {}", lo, hi),
                }),
                _ => Ok(()),
            },
            ConstraintKind::TimeRange { earliest, latest } => match (earliest, latest) {
                (None, None) => Err(ConfigError::InvalidTimeRange {
                    column: column.to_string(),
                    message: "at least one of earliest or latest is required".to_string(),
                }),
                (Some(lo), Some(hi)) if lo > hi => Err(ConfigError::InvalidTimeRange {
                    column: column.to_string(),
                    message: format!(
                        "earliest {} is after latest {}",
                        lo.to_rfc3339(),
                        hi.to_rfc3339()
                    ),
                }),
                _ => Ok(()),
            },
            ConstraintKind::Shape { rows, columns } => {
                if rows.is_none() && columns.is_none() {
                    Err(ConfigError::InvalidShape(
                        "at least one of rows or columns is required".to_string(),
                    ))
                } else {
                    Ok(())
                }
            }
            ConstraintKind::AllowedValues { values } => {
                if values.is_empty() {
                    Err(ConfigError::EmptyAllowedValues(column.to_string()))
                } else {
                    Ok(())
                }
            }
            ConstraintKind::Pattern { regex } => Regex::new(regex)
                .map(|_| ())
                .map_err(|e| ConfigError::InvalidPattern {
                    column: column.to_string(),
                    error: e.to_string(),
                }),
            ConstraintKind::Type { .. }
            | ConstraintKind::NotNull
            | ConstraintKind::Unique
            | ConstraintKind::Custom { .. } => Ok(()),
        }
    }
}

fn check_range(
    column: &str,
    min: Option<f64>,
    max: Option<f64>,
    min_inclusive: bool,
    max_inclusive: bool,
) -> Result<()> {
    for bound in [min, max].into_iter().flatten() {
        if !bound.is_finite() {
            return Err(ConfigError::range(
                column,
                format!("bound {} is not a finite number", bound),
            ));
        }
    }
    match (min, max) {
        (None, None) => Err(ConfigError::range(
            column,
            "at least one of min or max is required",
        )),
        (Some(lo), Some(hi)) if lo > hi => Err(ConfigError::range(
            column,
            format!("min {} is greater than max {}", lo, hi),
        )),
        (Some(lo), Some(hi)) if lo == hi && !(min_inclusive && max_inclusive) => {
            Err(ConfigError::range(
                column,
                format!("interval around {} is empty with an exclusive bound", lo),
            ))
        }
        _ => Ok(()),
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintKind::Type {
                expected,
                allow_null,
            } => {
                if *allow_null {
                    write!(f, "type {} (nullable)", expected)
                } else {
                    write!(f, "type {}", expected)
                }
            }
            ConstraintKind::Range {
                min,
                max,
                min_inclusive,
                max_inclusive,
            } => {
                let open = if *min_inclusive { '[' } else { '(' };
                let close = if *max_inclusive { ']' } else { ')' };
                let lo = min.map_or("-inf".to_string(), |v| v.to_string());
                let hi = max.map_or("+inf".to_string(), |v| v.to_string());
                write!(f, "range {}{}, {}{}", open, lo, hi, close)
            }
            ConstraintKind::NotNull => f.write_str("not null"),
            ConstraintKind::Unique => f.write_str("unique"),
            ConstraintKind::Shape { rows, columns } => {
                let mut parts = Vec::new();
                if let Some(r) = rows {
                    parts.push(format!("{} rows", r));
                }
                if let Some(c) = columns {
                    parts.push(format!("{} columns", c));
                }
                write!(f, "shape {}", parts.join(", "))
            }
            ConstraintKind::AllowedValues { values } => {
                write!(f, "one of [{}]", values.join(", "))
            }
            ConstraintKind::Pattern { regex } => write!(f, "matches /{}/", regex),
            ConstraintKind::Length { min, max } => {
                let lo = min.map_or("0".to_string(), |v| v.to_string());
                let hi = max.map_or("*".to_string(), |v| v.to_string());
                write!(f, "length [{}, {}]", lo, hi)
            }
            ConstraintKind::TimeRange { earliest, latest } => {
                let lo = earliest.map_or("*".to_string(), |t| t.to_rfc3339());
                let hi = latest.map_or("*".to_string(), |t| t.to_rfc3339());
                write!(f, "time range [{}, {}]", lo, hi)
            }
            ConstraintKind::Custom { name, .. } => write!(f, "custom '{}'", name),
        }
    }
}

/// One constraint bound to a column key.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    column: String,
    kind: ConstraintKind,
}

impl Constraint {
    /// Creates a constraint on `column`, checking its definition.
    pub fn new(column: impl Into<String>, kind: ConstraintKind) -> Result<Self> {
        let column = column.into();
        kind.check_definition(&column)?;
        Ok(Self { column, kind })
    }

    /// Creates a dataset-level constraint.
    pub fn dataset(kind: ConstraintKind) -> Result<Self> {
        Self::new(DATASET_KEY, kind)
    }

    /// Column key this constraint is declared on.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Kind and parameters.
    pub fn kind(&self) -> &ConstraintKind {
        &self.kind
    }

    pub(crate) fn into_parts(self) -> (String, ConstraintKind) {
        (self.column, self.kind)
    }
}
