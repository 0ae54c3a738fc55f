//! Dataset-level schema checks.
//!
//! This module handles the checks that look at the dataset as a whole rather
//! than at single values: exact row/column counts (`shape`) and, when a set
//! disallows them, columns that no constraint declares.

use crate::engine::OutcomeRecorder;
use crate::{Rejection, ValidationError};
use dq_core::{ConstraintSet, Dataset, ViolationKind};

/// Evaluates a `shape` constraint as a single dataset-level evaluation.
pub(crate) fn evaluate_shape(
    rows: Option<usize>,
    columns: Option<usize>,
    dataset: &Dataset,
    recorder: &mut OutcomeRecorder<'_>,
) -> Result<(), ValidationError> {
    let mut problems = Vec::new();

    if let Some(expected) = rows {
        let found = dataset.len();
        if found != expected {
            problems.push(format!("expected {} rows, found {}", expected, found));
        }
    }
    if let Some(expected) = columns {
        let found = dataset.column_count();
        if found != expected {
            problems.push(format!("expected {} columns, found {}", expected, found));
        }
    }

    if problems.is_empty() {
        recorder.pass();
        Ok(())
    } else {
        recorder.fail(
            None,
            None,
            Rejection::new(ViolationKind::ShapeMismatch, problems.join("; ")),
        )
    }
}

/// Fails every row that carries a column the set does not declare.
pub(crate) fn evaluate_extra_columns(
    set: &ConstraintSet,
    dataset: &Dataset,
    recorder: &mut OutcomeRecorder<'_>,
) -> Result<(), ValidationError> {
    for (idx, row) in dataset.rows().enumerate() {
        let undeclared: Vec<&str> = row
            .keys()
            .map(String::as_str)
            .filter(|column| !set.declares(column))
            .collect();

        if undeclared.is_empty() {
            recorder.pass();
        } else {
            recorder.fail(
                Some(idx),
                None,
                Rejection::new(
                    ViolationKind::ShapeMismatch,
                    format!("undeclared columns: {}", undeclared.join(", ")),
                ),
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ValidationOptions;
    use dq_core::{ConstraintKind, ConstraintOutcome, ConstraintSetBuilder, DataValue, row};
    use pretty_assertions::assert_eq;

    fn wide_dataset(columns: usize, rows: usize) -> Dataset {
        (0..rows)
            .map(|r| row((0..columns).map(|c| (format!("c{}", c), DataValue::Int((r * c) as i64)))))
            .collect()
    }

    fn outcome() -> ConstraintOutcome {
        ConstraintOutcome::new("@dataset", "shape", "shape")
    }

    #[test]
    fn test_shape_match() {
        let options = ValidationOptions::new();
        let mut recorder = OutcomeRecorder::new(&options, 0, outcome());
        evaluate_shape(Some(3), Some(6), &wide_dataset(6, 3), &mut recorder).unwrap();
        let outcome = recorder.finish();
        assert_eq!((outcome.passed, outcome.failed), (1, 0));
    }

    #[test]
    fn test_shape_mismatch_is_single_failure() {
        let options = ValidationOptions::new();
        let mut recorder = OutcomeRecorder::new(&options, 0, outcome());
        evaluate_shape(Some(2), Some(6), &wide_dataset(8, 3), &mut recorder).unwrap();
        let outcome = recorder.finish();

        assert_eq!(outcome.failed, 1);
        assert_eq!(outcome.failures[0].row, None);
        assert_eq!(outcome.failures[0].kind, ViolationKind::ShapeMismatch);
        assert_eq!(
            outcome.failures[0].message,
            "expected 2 rows, found 3; expected 6 columns, found 8"
        );
    }

    #[test]
    fn test_extra_columns() {
        let set = ConstraintSetBuilder::new()
            .allow_extra_columns(false)
            .column("c0", ConstraintKind::NotNull)
            .declare("c1")
            .build()
            .unwrap();
        let dataset = Dataset::from_rows(vec![
            row([("c0", 1), ("c1", 2)]),
            row([("c0", 1), ("c2", 2), ("c3", 3)]),
        ]);

        let options = ValidationOptions::new();
        let mut recorder = OutcomeRecorder::new(&options, 0, outcome());
        evaluate_extra_columns(&set, &dataset, &mut recorder).unwrap();
        let outcome = recorder.finish();

        assert_eq!(outcome.passed, 1);
        assert_eq!(outcome.offending_rows(), vec![1]);
        assert_eq!(outcome.failures[0].message, "undeclared columns: c2, c3");
    }
}
