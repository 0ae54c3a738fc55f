//! Validation results.
//!
//! A [`ValidationResult`] holds one [`ConstraintOutcome`] per evaluated
//! constraint, in declared order: the tabular breakdown of column, kind,
//! pass/fail counts and offending rows. Results from row chunks validated
//! against the same constraint set combine with [`ValidationResult::merge`].

use crate::{ConfigError, DataValue, Violation, ViolationKind};
use serde::Serialize;

/// One failed evaluation within a constraint outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Failure {
    /// Row identifier, absent for dataset-level checks
    pub row: Option<usize>,
    /// The value that failed, absent for dataset-level checks
    pub value: Option<DataValue>,
    /// Failure category
    pub kind: ViolationKind,
    /// Diagnostic message
    pub message: String,
}

/// Outcome of a single constraint over a dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstraintOutcome {
    /// Column key the constraint is declared on
    pub column: String,
    /// Constraint kind name
    pub constraint: String,
    /// Human-readable description of the constraint
    pub description: String,
    /// Number of passing evaluations
    pub passed: usize,
    /// Number of failing evaluations
    pub failed: usize,
    /// Failure details; may be capped, `failed` is always exact
    pub failures: Vec<Failure>,
}

impl ConstraintOutcome {
    /// Creates an outcome with no evaluations recorded.
    pub fn new(
        column: impl Into<String>,
        constraint: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            constraint: constraint.into(),
            description: description.into(),
            passed: 0,
            failed: 0,
            failures: Vec::new(),
        }
    }

    /// Returns true if no evaluation failed.
    pub fn is_passing(&self) -> bool {
        self.failed == 0
    }

    /// Row identifiers of recorded failures, in order.
    pub fn offending_rows(&self) -> Vec<usize> {
        self.failures.iter().filter_map(|f| f.row).collect()
    }

    /// Converts one of this outcome's failures into a [`Violation`].
    pub fn violation(&self, constraint_index: usize, failure: &Failure) -> Violation {
        Violation {
            column: self.column.clone(),
            constraint: self.constraint.clone(),
            constraint_index,
            row: failure.row,
            value: failure.value.clone(),
            kind: failure.kind,
            message: failure.message.clone(),
        }
    }

    fn same_layout(&self, other: &Self) -> bool {
        self.column == other.column
            && self.constraint == other.constraint
            && self.description == other.description
    }
}

/// Statistics about validation execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationStats {
    /// Number of rows validated
    pub rows_validated: usize,

    /// Number of constraints evaluated
    pub constraints_evaluated: usize,

    /// Validation duration in milliseconds
    pub duration_ms: u64,
}

/// Report of one validation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationResult {
    /// Per-constraint outcomes in declared order
    pub outcomes: Vec<ConstraintOutcome>,

    /// Run statistics
    pub stats: ValidationStats,
}

impl ValidationResult {
    /// Returns true if no constraint failed.
    pub fn passed(&self) -> bool {
        self.outcomes.iter().all(ConstraintOutcome::is_passing)
    }

    /// Sum of passing evaluations across constraints.
    pub fn total_passed(&self) -> usize {
        self.outcomes.iter().map(|o| o.passed).sum()
    }

    /// Sum of failing evaluations across constraints.
    pub fn total_failed(&self) -> usize {
        self.outcomes.iter().map(|o| o.failed).sum()
    }

    /// Outcomes with at least one failure.
    pub fn failing(&self) -> impl Iterator<Item = &ConstraintOutcome> {
        self.outcomes.iter().filter(|o| !o.is_passing())
    }

    /// Every recorded failure as a [`Violation`], in declared-constraint then row order.
    pub fn violations(&self) -> Vec<Violation> {
        self.outcomes
            .iter()
            .enumerate()
            .flat_map(|(idx, outcome)| {
                outcome
                    .failures
                    .iter()
                    .map(move |failure| outcome.violation(idx, failure))
            })
            .collect()
    }

    /// Combines the result of another chunk validated against the same set.
    ///
    /// Counts and statistics add, failure details concatenate. Merging is
    /// associative, and an empty default result is its identity.
    ///
    /// # Errors
    ///
    /// [`ConfigError::IncompatibleResults`] when the outcome layouts differ.
    pub fn merge(mut self, other: ValidationResult) -> Result<Self, ConfigError> {
        if self.outcomes.is_empty() {
            self.outcomes = other.outcomes;
        } else if !other.outcomes.is_empty() {
            if self.outcomes.len() != other.outcomes.len() {
                return Err(ConfigError::IncompatibleResults(format!(
                    "{} outcomes vs {}",
                    self.outcomes.len(),
                    other.outcomes.len()
                )));
            }
            for (mine, theirs) in self.outcomes.iter_mut().zip(other.outcomes) {
                if !mine.same_layout(&theirs) {
                    return Err(ConfigError::IncompatibleResults(format!(
                        "'{}' on '{}' vs '{}' on '{}'",
                        mine.constraint, mine.column, theirs.constraint, theirs.column
                    )));
                }
                mine.passed += theirs.passed;
                mine.failed += theirs.failed;
                mine.failures.extend(theirs.failures);
            }
        }

        self.stats.rows_validated += other.stats.rows_validated;
        self.stats.constraints_evaluated = self
            .stats
            .constraints_evaluated
            .max(other.stats.constraints_evaluated);
        self.stats.duration_ms += other.stats.duration_ms;
        Ok(self)
    }
}
