//! Error types for validation operations.

use dq_core::{ConfigError, ValidationResult, Violation};
use thiserror::Error;

/// Errors that can occur during validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The constraint set is malformed or has unbound predicates
    #[error("Invalid constraint set: {0}")]
    Config(#[from] ConfigError),

    /// First violation found in fail-fast mode
    #[error("Validation failed: {0}")]
    Violation(Box<Violation>),
}

impl ValidationError {
    /// Returns the violation carried by a fail-fast error.
    pub fn violation(&self) -> Option<&Violation> {
        match self {
            ValidationError::Violation(v) => Some(v),
            ValidationError::Config(_) => None,
        }
    }
}

impl From<Violation> for ValidationError {
    fn from(violation: Violation) -> Self {
        Self::Violation(Box::new(violation))
    }
}

/// Errors returned by [`ValidatedTransform`](crate::ValidatedTransform).
#[derive(Debug, Error)]
pub enum PipelineError<E> {
    /// The input did not satisfy the declared input constraints
    #[error("Input rejected: {}", summarize(.0))]
    InputRejected(ValidationResult),

    /// The output did not satisfy the declared output constraints; the output was discarded
    #[error("Output rejected: {}", summarize(.0))]
    Rejected(ValidationResult),

    /// Validation itself failed (malformed set or fail-fast violation)
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The wrapped transformation returned an error
    #[error("Transformation failed: {0}")]
    Transform(#[source] E),
}

impl<E> PipelineError<E> {
    /// The validation result behind a rejection, if any.
    pub fn result(&self) -> Option<&ValidationResult> {
        match self {
            PipelineError::InputRejected(r) | PipelineError::Rejected(r) => Some(r),
            _ => None,
        }
    }
}

/// One-line summary naming every failing constraint and its offending rows.
pub fn summarize(result: &ValidationResult) -> String {
    let parts: Vec<String> = result
        .failing()
        .map(|outcome| {
            let rows = outcome.offending_rows();
            if rows.is_empty() {
                format!(
                    "{} on '{}' failed {} time(s)",
                    outcome.description, outcome.column, outcome.failed
                )
            } else {
                let rows: Vec<String> = rows.iter().map(usize::to_string).collect();
                format!(
                    "{} on '{}' failed at rows [{}]",
                    outcome.description,
                    outcome.column,
                    rows.join(", ")
                )
            }
        })
        .collect();
    format!("{} failure(s): {}", result.total_failed(), parts.join("; "))
}
