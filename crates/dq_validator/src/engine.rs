//! Main validation engine.
//!
//! This module provides the [`Validator`] that evaluates a [`ConstraintSet`]
//! against a [`Dataset`], constraint by constraint in declared order and row
//! by row within each constraint, and produces a [`ValidationResult`].

use crate::quality::evaluate_unique;
use crate::schema::{evaluate_extra_columns, evaluate_shape};
use crate::{Rejection, ValidationError, ValueChecker};
use dq_core::{
    ConstraintKind, ConstraintOutcome, ConstraintSet, DATASET_KEY, DataValue, Dataset, Failure,
    ValidationResult, ValidationStats,
};
use std::time::Instant;
use tracing::{debug, info};

/// How failures are handled during a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationMode {
    /// Evaluate everything and collect every failure
    #[default]
    Batch,
    /// Stop at the first failure and return it as an error
    FailFast,
}

/// Options controlling a validation run.
///
/// # Example
///
/// ```rust
/// use dq_validator::{ValidationMode, ValidationOptions};
///
/// let options = ValidationOptions::new()
///     .with_mode(ValidationMode::FailFast)
///     .with_row_offset(1_000)
///     .with_max_failures_per_constraint(50);
///
/// assert_eq!(options.mode, ValidationMode::FailFast);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Batch or fail-fast
    pub mode: ValidationMode,

    /// Added to every reported row identifier
    pub row_offset: usize,

    /// Cap on failure details stored per constraint; counts stay exact
    pub max_failures_per_constraint: Option<usize>,
}

impl ValidationOptions {
    /// Creates default options (batch mode, no offset, no cap).
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for fail-fast options.
    pub fn fail_fast() -> Self {
        Self::new().with_mode(ValidationMode::FailFast)
    }

    /// Sets the validation mode.
    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the row identifier offset.
    pub fn with_row_offset(mut self, offset: usize) -> Self {
        self.row_offset = offset;
        self
    }

    /// Caps the failure details stored per constraint.
    pub fn with_max_failures_per_constraint(mut self, max: usize) -> Self {
        self.max_failures_per_constraint = Some(max);
        self
    }

    /// Returns true in fail-fast mode.
    pub fn is_fail_fast(&self) -> bool {
        self.mode == ValidationMode::FailFast
    }
}

/// Accumulates the evaluations of one constraint.
pub(crate) struct OutcomeRecorder<'a> {
    options: &'a ValidationOptions,
    index: usize,
    outcome: ConstraintOutcome,
}

impl<'a> OutcomeRecorder<'a> {
    pub(crate) fn new(
        options: &'a ValidationOptions,
        index: usize,
        outcome: ConstraintOutcome,
    ) -> Self {
        Self {
            options,
            index,
            outcome,
        }
    }

    /// Global identifier of a row of the dataset being validated.
    pub(crate) fn row_id(&self, row: usize) -> usize {
        self.options.row_offset + row
    }

    pub(crate) fn pass(&mut self) {
        self.outcome.passed += 1;
    }

    /// Records a failure; in fail-fast mode the failure is returned as an error.
    pub(crate) fn fail(
        &mut self,
        row: Option<usize>,
        value: Option<&DataValue>,
        rejection: Rejection,
    ) -> Result<(), ValidationError> {
        let failure = Failure {
            row: row.map(|r| self.row_id(r)),
            value: value.cloned(),
            kind: rejection.kind,
            message: rejection.message,
        };
        self.outcome.failed += 1;

        if self.options.is_fail_fast() {
            return Err(self.outcome.violation(self.index, &failure).into());
        }

        let capped = self
            .options
            .max_failures_per_constraint
            .is_some_and(|max| self.outcome.failures.len() >= max);
        if !capped {
            self.outcome.failures.push(failure);
        }
        Ok(())
    }

    pub(crate) fn finish(self) -> ConstraintOutcome {
        self.outcome
    }
}

/// Validation engine for constraint sets.
///
/// A validator holds only its options; it never mutates the dataset and keeps
/// no state between runs, so one instance may validate any number of datasets.
///
/// # Example
///
/// ```rust
/// use dq_core::{row, ConstraintKind, ConstraintSetBuilder, DataValue, Dataset};
/// use dq_validator::Validator;
///
/// let set = ConstraintSetBuilder::new()
///     .column("sale_amount", ConstraintKind::range(2.5, 1550.0))
///     .build()
///     .unwrap();
/// let dataset = Dataset::from_rows(vec![
///     row([("sale_amount", DataValue::Float(12.0))]),
///     row([("sale_amount", DataValue::Float(1550.01))]),
/// ]);
///
/// let result = Validator::new().validate(&set, &dataset).unwrap();
/// assert!(!result.passed());
/// assert_eq!(result.outcomes[0].offending_rows(), vec![1]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Validator {
    options: ValidationOptions,
}

impl Validator {
    /// Creates a batch-mode validator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the run options.
    pub fn with_options(mut self, options: ValidationOptions) -> Self {
        self.options = options;
        self
    }

    /// Current run options.
    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// Checks that a set can be validated: well-formed parameters, compilable
    /// patterns and bound custom predicates. No data is read.
    pub fn validate_definition(&self, set: &ConstraintSet) -> Result<(), ValidationError> {
        self.prepare(set).map(|_| ())
    }

    /// Validates `dataset` against `set`.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::Config`] if the set is malformed, before any row is read
    /// - [`ValidationError::Violation`] with the first failure, in fail-fast mode
    pub fn validate(
        &self,
        set: &ConstraintSet,
        dataset: &Dataset,
    ) -> Result<ValidationResult, ValidationError> {
        let start = Instant::now();
        let mut checker = self.prepare(set)?;
        let mut outcomes = Vec::with_capacity(set.len() + 1);

        if !set.allow_extra_columns() {
            let mut recorder = OutcomeRecorder::new(
                &self.options,
                outcomes.len(),
                ConstraintOutcome::new(DATASET_KEY, "extra_columns", "no undeclared columns"),
            );
            evaluate_extra_columns(set, dataset, &mut recorder)?;
            outcomes.push(self.log_outcome(recorder.finish()));
        }

        for (column, kind) in set.iter() {
            let mut recorder = OutcomeRecorder::new(
                &self.options,
                outcomes.len(),
                ConstraintOutcome::new(column, kind.name(), kind.to_string()),
            );
            match kind {
                ConstraintKind::Shape { rows, columns } => {
                    evaluate_shape(*rows, *columns, dataset, &mut recorder)?
                }
                ConstraintKind::Unique => evaluate_unique(column, dataset, &mut recorder)?,
                _ => {
                    for (idx, value) in dataset.column(column) {
                        match checker.check(kind, value) {
                            Ok(()) => recorder.pass(),
                            Err(rejection) => recorder.fail(Some(idx), Some(value), rejection)?,
                        }
                    }
                }
            }
            outcomes.push(self.log_outcome(recorder.finish()));
        }

        let result = ValidationResult {
            stats: ValidationStats {
                rows_validated: dataset.len(),
                constraints_evaluated: outcomes.len(),
                duration_ms: start.elapsed().as_millis() as u64,
            },
            outcomes,
        };

        info!(
            rows = result.stats.rows_validated,
            constraints = result.stats.constraints_evaluated,
            passed = result.total_passed(),
            failed = result.total_failed(),
            "validation finished"
        );
        Ok(result)
    }

    /// Validates `dataset` in chunks of `chunk_size` rows and merges the results.
    ///
    /// Row identifiers stay global. `shape` row counts and `unique` only see
    /// one chunk at a time, so they hold per chunk rather than for the whole
    /// dataset. In fail-fast mode the first failing chunk decides the error.
    pub fn validate_chunked(
        &self,
        set: &ConstraintSet,
        dataset: &Dataset,
        chunk_size: usize,
    ) -> Result<ValidationResult, ValidationError> {
        if dataset.is_empty() {
            return self.validate(set, dataset);
        }

        let mut merged = ValidationResult::default();
        for (offset, chunk) in dataset.chunks(chunk_size) {
            let options = self
                .options
                .clone()
                .with_row_offset(self.options.row_offset + offset);
            debug!(offset, rows = chunk.len(), "validating chunk");
            let result = Validator::new()
                .with_options(options)
                .validate(set, &chunk)?;
            merged = merged.merge(result)?;
        }
        Ok(merged)
    }

    fn prepare(&self, set: &ConstraintSet) -> Result<ValueChecker, ValidationError> {
        set.check_definition()?;
        set.ensure_bound()?;
        let mut checker = ValueChecker::new();
        checker.prepare(set)?;
        Ok(checker)
    }

    fn log_outcome(&self, outcome: ConstraintOutcome) -> ConstraintOutcome {
        debug!(
            column = %outcome.column,
            constraint = %outcome.constraint,
            passed = outcome.passed,
            failed = outcome.failed,
            "constraint evaluated"
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dq_core::{ConfigError, ConstraintSetBuilder, ValueType, ViolationKind, row};
    use pretty_assertions::assert_eq;

    fn sales() -> Dataset {
        Dataset::from_rows(vec![
            row([
                ("order_id", DataValue::Int(1)),
                ("sale_amount", DataValue::Float(12.5)),
                ("region", "north".into()),
            ]),
            row([
                ("order_id", DataValue::Int(2)),
                ("sale_amount", DataValue::Null),
                ("region", "south".into()),
            ]),
            row([
                ("order_id", DataValue::Int(3)),
                ("sale_amount", DataValue::Float(2000.0)),
                ("region", "west".into()),
            ]),
        ])
    }

    #[test]
    fn test_empty_dataset() {
        let set = ConstraintSetBuilder::new()
            .column("id", ConstraintKind::NotNull)
            .build()
            .unwrap();
        let result = Validator::new().validate(&set, &Dataset::empty()).unwrap();

        assert!(result.passed());
        assert_eq!(result.outcomes.len(), 1);
        assert_eq!(result.outcomes[0].passed, 0);
        assert_eq!(result.stats.rows_validated, 0);
    }

    #[test]
    fn test_valid_data() {
        let set = ConstraintSetBuilder::new()
            .columns(
                "order_id",
                [
                    ConstraintKind::type_of(ValueType::Int),
                    ConstraintKind::NotNull,
                    ConstraintKind::Unique,
                ],
            )
            .column("region", ConstraintKind::pattern("^[a-z]+$"))
            .build()
            .unwrap();
        let result = Validator::new().validate(&set, &sales()).unwrap();

        assert!(result.passed());
        assert_eq!(result.total_passed(), 12);
        assert_eq!(result.stats.constraints_evaluated, 4);
    }

    #[test]
    fn test_batch_collects_every_failure() {
        let set = ConstraintSetBuilder::new()
            .column("sale_amount", ConstraintKind::NotNull)
            .column("sale_amount", ConstraintKind::range(2.5, 1550.0))
            .column("region", ConstraintKind::allowed_values(["north", "south"]))
            .build()
            .unwrap();
        let result = Validator::new().validate(&set, &sales()).unwrap();

        assert_eq!(result.total_failed(), 3);
        let kinds: Vec<_> = result.violations().iter().map(|v| (v.kind, v.row)).collect();
        assert_eq!(
            kinds,
            vec![
                (ViolationKind::NullViolation, Some(1)),
                (ViolationKind::RangeViolation, Some(2)),
                (ViolationKind::NotAllowed, Some(2)),
            ]
        );
        // the null row passes range vacuously
        assert_eq!(result.outcomes[1].passed, 2);
    }

    #[test]
    fn test_fail_fast_returns_first_violation() {
        let set = ConstraintSetBuilder::new()
            .column("region", ConstraintKind::allowed_values(["north", "south"]))
            .column("sale_amount", ConstraintKind::NotNull)
            .build()
            .unwrap();
        let err = Validator::new()
            .with_options(ValidationOptions::fail_fast())
            .validate(&set, &sales())
            .unwrap_err();

        let violation = err.violation().unwrap();
        assert_eq!(violation.column, "region");
        assert_eq!(violation.constraint_index, 0);
        assert_eq!(violation.row, Some(2));
        assert_eq!(violation.value, Some(DataValue::from("west")));
    }

    #[test]
    fn test_row_offset_and_failure_cap() {
        let set = ConstraintSetBuilder::new()
            .column("order_id", ConstraintKind::range(10.0, 20.0))
            .build()
            .unwrap();
        let options = ValidationOptions::new()
            .with_row_offset(100)
            .with_max_failures_per_constraint(2);
        let result = Validator::new()
            .with_options(options)
            .validate(&set, &sales())
            .unwrap();

        assert_eq!(result.outcomes[0].failed, 3);
        assert_eq!(result.outcomes[0].offending_rows(), vec![100, 101]);
    }

    #[test]
    fn test_row_count_shape() {
        let set = ConstraintSetBuilder::new()
            .dataset(ConstraintKind::row_count(2))
            .column("order_id", ConstraintKind::NotNull)
            .build()
            .unwrap();
        let validator = Validator::new();
        assert!(!validator.options().is_fail_fast());

        let result = validator.validate(&set, &sales()).unwrap();
        assert_eq!(result.outcomes[0].constraint, "shape");
        assert_eq!(result.outcomes[0].failures[0].message, "expected 2 rows, found 3");
        assert_eq!(result.outcomes[0].failures[0].row, None);
        assert_eq!(result.outcomes[1].failed, 0);
    }

    #[test]
    fn test_extra_columns_checked_first() {
        let set = ConstraintSetBuilder::new()
            .allow_extra_columns(false)
            .column("order_id", ConstraintKind::NotNull)
            .column("region", ConstraintKind::NotNull)
            .build()
            .unwrap();
        let result = Validator::new().validate(&set, &sales()).unwrap();

        let extra = &result.outcomes[0];
        assert_eq!(extra.constraint, "extra_columns");
        assert_eq!(extra.failed, 3);
        assert_eq!(extra.failures[0].kind, ViolationKind::ShapeMismatch);
        assert_eq!(extra.failures[0].message, "undeclared columns: sale_amount");
        assert!(result.outcomes[1].is_passing());
    }

    #[test]
    fn test_unbound_custom_is_config_error() {
        let json = r#"{"columns": {"order_id": [{"kind": "custom", "name": "even"}]}}"#;
        let set: ConstraintSet = serde_json::from_str(json).unwrap();
        let err = Validator::new().validate(&set, &sales()).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::Config(ConfigError::UnboundPredicate { .. })
        ));
    }

    #[test]
    fn test_validate_definition() {
        let json = r#"{"columns": {"x": [{"kind": "range", "min": 3, "max": 1}]}}"#;
        let set: ConstraintSet = serde_json::from_str(json).unwrap();
        assert!(matches!(
            Validator::new().validate_definition(&set),
            Err(ValidationError::Config(ConfigError::InvalidRange { .. }))
        ));
    }

    #[test]
    fn test_chunked_matches_single_run() {
        let set = ConstraintSetBuilder::new()
            .column("sale_amount", ConstraintKind::NotNull)
            .column("sale_amount", ConstraintKind::range(2.5, 1550.0))
            .build()
            .unwrap();
        let validator = Validator::new();
        let single = validator.validate(&set, &sales()).unwrap();
        let chunked = validator.validate_chunked(&set, &sales(), 2).unwrap();

        assert_eq!(chunked.outcomes, single.outcomes);
        assert_eq!(chunked.stats.rows_validated, 3);
    }
}
