//! Column-level quality checks.
//!
//! Uniqueness looks at a whole column: the first occurrence of a value
//! passes, every repeat fails and points back at the first occurrence.
//! Nulls are never considered duplicates.

use crate::engine::OutcomeRecorder;
use crate::{Rejection, ValidationError};
use chrono::{DateTime, Utc};
use dq_core::{DataValue, Dataset, ViolationKind};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

/// Hashable identity of a non-null value.
///
/// Floats compare by bit pattern after folding `-0.0` into `0.0` and every
/// NaN into one canonical NaN.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum ValueKey<'a> {
    Str(&'a str),
    Int(i64),
    Float(u64),
    Bool(bool),
    Time(DateTime<Utc>),
}

impl<'a> ValueKey<'a> {
    /// Returns `None` for null.
    pub(crate) fn of(value: &'a DataValue) -> Option<Self> {
        match value {
            DataValue::Null => None,
            DataValue::String(s) => Some(ValueKey::Str(s)),
            DataValue::Int(i) => Some(ValueKey::Int(*i)),
            DataValue::Float(f) => {
                let normalized = if *f == 0.0 {
                    0.0
                } else if f.is_nan() {
                    f64::NAN
                } else {
                    *f
                };
                Some(ValueKey::Float(normalized.to_bits()))
            }
            DataValue::Bool(b) => Some(ValueKey::Bool(*b)),
            DataValue::Timestamp(ts) => Some(ValueKey::Time(*ts)),
        }
    }
}

/// Evaluates `unique` on one column.
pub(crate) fn evaluate_unique(
    column: &str,
    dataset: &Dataset,
    recorder: &mut OutcomeRecorder<'_>,
) -> Result<(), ValidationError> {
    let mut first_seen: HashMap<ValueKey<'_>, usize> = HashMap::new();

    for (idx, value) in dataset.column(column) {
        let Some(key) = ValueKey::of(value) else {
            recorder.pass();
            continue;
        };
        match first_seen.entry(key) {
            Entry::Occupied(first) => {
                let message = format!("duplicate of row {}", recorder.row_id(*first.get()));
                recorder.fail(
                    Some(idx),
                    Some(value),
                    Rejection::new(ViolationKind::UniquenessViolation, message),
                )?;
            }
            Entry::Vacant(slot) => {
                slot.insert(idx);
                recorder.pass();
            }
        }
    }
    Ok(())
}

/// Returns true if the column holds no repeated non-null value.
pub(crate) fn has_no_duplicates<'a>(values: impl IntoIterator<Item = &'a DataValue>) -> bool {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter_map(ValueKey::of)
        .all(|key| seen.insert(key))
}
