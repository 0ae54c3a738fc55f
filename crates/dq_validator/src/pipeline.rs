//! Validated transformations.
//!
//! [`ValidatedTransform`] wraps a dataset-producing function so that its
//! output is only handed on when it satisfies a constraint set.

use crate::{PipelineError, ValidationOptions, Validator, summarize};
use dq_core::{ConstraintSet, Dataset};
use tracing::{debug, warn};

/// A transformation whose output is validated before it is returned.
///
/// # Example
///
/// ```rust
/// use dq_core::{row, ConstraintKind, ConstraintSetBuilder, DataValue, Dataset};
/// use dq_validator::{PipelineError, ValidatedTransform};
///
/// let output = ConstraintSetBuilder::new()
///     .column("total", ConstraintKind::range(0.0, 100.0))
///     .build()
///     .unwrap();
///
/// let double = ValidatedTransform::new(output, |input: &Dataset| {
///     Ok::<_, std::convert::Infallible>(
///         input
///             .column("amount")
///             .map(|(_, v)| row([("total", DataValue::from(v.as_float().unwrap_or(0.0) * 2.0))]))
///             .collect(),
///     )
/// });
///
/// let small = Dataset::from_rows(vec![row([("amount", DataValue::Float(10.0))])]);
/// assert!(double.run(&small).is_ok());
///
/// let large = Dataset::from_rows(vec![row([("amount", DataValue::Float(80.0))])]);
/// assert!(matches!(double.run(&large), Err(PipelineError::Rejected(_))));
/// ```
pub struct ValidatedTransform<F> {
    input_constraints: Option<ConstraintSet>,
    output_constraints: ConstraintSet,
    validator: Validator,
    transform: F,
}

impl<F> ValidatedTransform<F> {
    /// Wraps `transform`, validating its output against `output_constraints`.
    pub fn new(output_constraints: ConstraintSet, transform: F) -> Self {
        Self {
            input_constraints: None,
            output_constraints,
            validator: Validator::new(),
            transform,
        }
    }

    /// Also validates the input before the transformation runs.
    pub fn with_input_constraints(mut self, constraints: ConstraintSet) -> Self {
        self.input_constraints = Some(constraints);
        self
    }

    /// Sets the options used for both input and output validation.
    pub fn with_options(mut self, options: ValidationOptions) -> Self {
        self.validator = Validator::new().with_options(options);
        self
    }

    /// Runs the transformation on `input`.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::InputRejected`] if the input fails its constraints; the
    ///   transformation is not called
    /// - [`PipelineError::Transform`] if the transformation fails
    /// - [`PipelineError::Rejected`] if the output fails its constraints; the
    ///   output is dropped
    /// - [`PipelineError::Validation`] for a malformed set or a fail-fast violation
    pub fn run<E>(&self, input: &Dataset) -> Result<Dataset, PipelineError<E>>
    where
        F: Fn(&Dataset) -> Result<Dataset, E>,
    {
        if let Some(constraints) = &self.input_constraints {
            let result = self.validator.validate(constraints, input)?;
            if !result.passed() {
                warn!(summary = %summarize(&result), "pipeline input rejected");
                return Err(PipelineError::InputRejected(result));
            }
        }

        let output = (self.transform)(input).map_err(PipelineError::Transform)?;
        let result = self.validator.validate(&self.output_constraints, &output)?;
        if !result.passed() {
            warn!(summary = %summarize(&result), "pipeline output rejected");
            return Err(PipelineError::Rejected(result));
        }

        debug!(rows = output.len(), "pipeline output accepted");
        Ok(output)
    }
}
