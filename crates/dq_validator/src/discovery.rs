//! Constraint discovery.
//!
//! The [`Discoverer`] profiles every column of a reference dataset and emits
//! the tightest constraints the data satisfies. Validating the same dataset
//! against the discovered set always passes.
//!
//! Per column, in dataset column order, constraints are emitted in this order:
//!
//! 1. `type` (nullable) when all non-null values share a type; ints and floats
//!    together widen to float
//! 2. `not_null` when no value is null or missing
//! 3. `range` with the observed bounds, for numeric columns of finite values
//! 4. `time_range` with the observed bounds, for timestamp columns
//! 5. `length` with the observed character counts, for string columns
//! 6. `allowed_values` for string columns with few distinct values that repeat
//! 7. `unique` when at least two non-null values exist and none repeats

use crate::quality::has_no_duplicates;
use dq_core::{
    Constraint, ConstraintKind, ConstraintSet, DATASET_KEY, DataValue, Dataset, ValueType,
};
use indexmap::IndexSet;
use tracing::{debug, info, warn};

/// Options controlling constraint discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryOptions {
    /// Largest distinct-value count turned into `allowed_values`; 0 disables
    pub max_allowed_values: usize,

    /// Emit `unique` for columns without repeats
    pub infer_uniqueness: bool,

    /// Emit a dataset-level `shape` with the observed column count
    pub infer_shape: bool,

    /// Value of the discovered set's `allow_extra_columns` flag
    pub allow_extra_columns: bool,

    /// Emit `length` for string columns
    pub infer_lengths: bool,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            max_allowed_values: 20,
            infer_uniqueness: true,
            infer_shape: false,
            allow_extra_columns: true,
            infer_lengths: true,
        }
    }
}

impl DiscoveryOptions {
    /// Creates default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the distinct-value threshold for `allowed_values`.
    pub fn with_max_allowed_values(mut self, max: usize) -> Self {
        self.max_allowed_values = max;
        self
    }

    /// Enables or disables `unique` inference.
    pub fn with_uniqueness(mut self, infer: bool) -> Self {
        self.infer_uniqueness = infer;
        self
    }

    /// Enables or disables dataset `shape` inference.
    pub fn with_shape(mut self, infer: bool) -> Self {
        self.infer_shape = infer;
        self
    }

    /// Sets the discovered set's `allow_extra_columns` flag.
    pub fn with_allow_extra_columns(mut self, allow: bool) -> Self {
        self.allow_extra_columns = allow;
        self
    }

    /// Enables or disables `length` inference.
    pub fn with_lengths(mut self, infer: bool) -> Self {
        self.infer_lengths = infer;
        self
    }
}

/// Learns a [`ConstraintSet`] from a reference dataset.
///
/// # Example
///
/// ```rust
/// use dq_core::{row, DataValue, Dataset};
/// use dq_validator::{Discoverer, Validator};
///
/// let dataset = Dataset::from_rows(vec![
///     row([("id", DataValue::Int(1)), ("region", "north".into())]),
///     row([("id", DataValue::Int(2)), ("region", "north".into())]),
///     row([("id", DataValue::Int(3)), ("region", "south".into())]),
/// ]);
///
/// let set = Discoverer::new().discover(&dataset);
/// let result = Validator::new().validate(&set, &dataset).unwrap();
/// assert!(result.passed());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Discoverer {
    options: DiscoveryOptions,
}

impl Discoverer {
    /// Creates a discoverer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the discovery options.
    pub fn with_options(mut self, options: DiscoveryOptions) -> Self {
        self.options = options;
        self
    }

    /// Current discovery options.
    pub fn options(&self) -> &DiscoveryOptions {
        &self.options
    }

    /// Discovers constraints from `dataset`.
    ///
    /// An empty dataset yields an empty set.
    pub fn discover(&self, dataset: &Dataset) -> ConstraintSet {
        let mut set = ConstraintSet::new().with_allow_extra_columns(self.options.allow_extra_columns);
        if dataset.is_empty() {
            return set;
        }

        let columns = dataset.columns();
        if self.options.infer_shape {
            push(&mut set, DATASET_KEY, ConstraintKind::column_count(columns.len()));
        }

        for column in &columns {
            if column == DATASET_KEY {
                warn!(column = %column, "skipping column named like the dataset key");
                // still declared, so strict sets accept the column
                set.declare_column(DATASET_KEY);
                continue;
            }
            let kinds = self.discover_column(dataset, column);
            debug!(column = %column, constraints = kinds.len(), "column profiled");
            if kinds.is_empty() {
                set.declare_column(column.as_str());
            }
            for kind in kinds {
                push(&mut set, column, kind);
            }
        }

        info!(
            rows = dataset.len(),
            columns = columns.len(),
            constraints = set.len(),
            "discovery finished"
        );
        set
    }

    fn discover_column(&self, dataset: &Dataset, column: &str) -> Vec<ConstraintKind> {
        let values: Vec<&DataValue> = dataset
            .column(column)
            .map(|(_, value)| value)
            .filter(|value| !value.is_null())
            .collect();
        let has_nulls = values.len() < dataset.len();
        let mut kinds = Vec::new();

        let value_type = common_type(&values);
        if let Some(expected) = value_type {
            kinds.push(ConstraintKind::nullable_type_of(expected));
        }
        if !has_nulls {
            kinds.push(ConstraintKind::NotNull);
        }

        match value_type {
            Some(ValueType::Int | ValueType::Float) => {
                if let Some((min, max)) = numeric_bounds(&values) {
                    kinds.push(ConstraintKind::range(min, max));
                }
            }
            Some(ValueType::Timestamp) => {
                let stamps = values.iter().filter_map(|v| v.as_timestamp());
                let earliest = stamps.clone().min().copied();
                let latest = stamps.max().copied();
                if earliest.is_some() {
                    kinds.push(ConstraintKind::TimeRange { earliest, latest });
                }
            }
            Some(ValueType::String) => {
                if self.options.infer_lengths {
                    let lengths = values
                        .iter()
                        .filter_map(|v| v.as_string())
                        .map(|s| s.chars().count());
                    let min = lengths.clone().min();
                    let max = lengths.max();
                    if min.is_some() {
                        kinds.push(ConstraintKind::Length { min, max });
                    }
                }
                let distinct: IndexSet<&str> =
                    values.iter().filter_map(|v| v.as_string()).collect();
                if !distinct.is_empty()
                    && distinct.len() <= self.options.max_allowed_values
                    && distinct.len() < values.len()
                {
                    kinds.push(ConstraintKind::allowed_values(distinct));
                }
            }
            Some(ValueType::Bool) | None => {}
        }

        if self.options.infer_uniqueness
            && value_type != Some(ValueType::Bool)
            && values.len() >= 2
            && has_no_duplicates(values.iter().copied())
        {
            kinds.push(ConstraintKind::Unique);
        }

        kinds
    }
}

/// Adds a discovered constraint, skipping any the model rejects.
fn push(set: &mut ConstraintSet, column: &str, kind: ConstraintKind) {
    match Constraint::new(column, kind) {
        Ok(constraint) => set.push(constraint),
        Err(err) => warn!(column = %column, error = %err, "discarding discovered constraint"),
    }
}

/// The type shared by every value, widening int and float to float.
fn common_type(values: &[&DataValue]) -> Option<ValueType> {
    let mut common: Option<ValueType> = None;
    for value_type in values.iter().filter_map(|v| v.value_type()) {
        common = match (common, value_type) {
            (None, t) => Some(t),
            (Some(a), b) if a == b => Some(a),
            (Some(ValueType::Int), ValueType::Float) | (Some(ValueType::Float), ValueType::Int) => {
                Some(ValueType::Float)
            }
            _ => return None,
        };
    }
    common
}

/// Observed numeric bounds, or `None` when any value is not finite.
fn numeric_bounds(values: &[&DataValue]) -> Option<(f64, f64)> {
    let mut bounds: Option<(f64, f64)> = None;
    for number in values.iter().filter_map(|v| v.as_float()) {
        if !number.is_finite() {
            return None;
        }
        bounds = Some(match bounds {
            None => (number, number),
            Some((lo, hi)) => (lo.min(number), hi.max(number)),
        });
    }
    bounds
}
