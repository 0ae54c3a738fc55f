//! Value-level constraint evaluation.
//!
//! This module checks one value against one value-level constraint:
//! - Type: non-null values must have the expected type
//! - NotNull: values (including missing ones) must not be null
//! - Range: numeric values must lie within the bounds
//! - AllowedValues: the rendered value must be listed
//! - Pattern / Length: string values must match / fit
//! - TimeRange: timestamps must lie within the bounds
//! - Custom: delegated to [`check_custom`](crate::check_custom)
//!
//! Apart from `type` and `not_null`, nulls pass vacuously.

use crate::check_custom;
use dq_core::{ConfigError, ConstraintKind, ConstraintSet, DataValue, ViolationKind};
use regex::Regex;
use std::collections::HashMap;

/// Why a value failed a constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    /// Failure category
    pub kind: ViolationKind,
    /// Diagnostic message
    pub message: String,
}

impl Rejection {
    /// Creates a rejection.
    pub fn new(kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    fn type_mismatch(constraint: &str, value: &DataValue) -> Self {
        Self::new(
            ViolationKind::TypeMismatch,
            format!(
                "{} does not apply to {} value {}",
                constraint,
                value.type_name(),
                value
            ),
        )
    }
}

/// Checks values against value-level constraints.
pub struct ValueChecker {
    /// Cache of compiled regex patterns
    regex_cache: HashMap<String, Regex>,
}

impl ValueChecker {
    /// Creates a new checker with an empty pattern cache.
    pub fn new() -> Self {
        Self {
            regex_cache: HashMap::new(),
        }
    }

    /// Compiles every pattern in `set` up front.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidPattern`] for the first pattern that does not compile.
    pub fn prepare(&mut self, set: &ConstraintSet) -> Result<(), ConfigError> {
        for (column, kind) in set.iter() {
            if let ConstraintKind::Pattern { regex } = kind {
                if self.regex_cache.contains_key(regex) {
                    continue;
                }
                let compiled = Regex::new(regex).map_err(|e| ConfigError::InvalidPattern {
                    column: column.to_string(),
                    error: e.to_string(),
                })?;
                self.regex_cache.insert(regex.clone(), compiled);
            }
        }
        Ok(())
    }

    /// Checks `value` against `kind`.
    ///
    /// Column- and dataset-level kinds (`unique`, `shape`) are not value
    /// predicates and always pass here.
    pub fn check(&mut self, kind: &ConstraintKind, value: &DataValue) -> Result<(), Rejection> {
        match kind {
            ConstraintKind::Type {
                expected,
                allow_null,
            } => {
                if value.is_null() {
                    if *allow_null {
                        return Ok(());
                    }
                    return Err(Rejection::new(
                        ViolationKind::TypeMismatch,
                        format!("expected {}, found null", expected),
                    ));
                }
                if expected.accepts(value) {
                    Ok(())
                } else {
                    Err(Rejection::new(
                        ViolationKind::TypeMismatch,
                        format!("expected {}, found {} value {}", expected, value.type_name(), value),
                    ))
                }
            }
            ConstraintKind::NotNull => {
                if value.is_null() {
                    Err(Rejection::new(ViolationKind::NullViolation, "value is null"))
                } else {
                    Ok(())
                }
            }
            _ if value.is_null() => Ok(()),
            ConstraintKind::Range {
                min,
                max,
                min_inclusive,
                max_inclusive,
            } => {
                let Some(number) = value.as_float() else {
                    return Err(Rejection::type_mismatch("range", value));
                };
                if within(number, *min, *max, *min_inclusive, *max_inclusive) {
                    Ok(())
                } else {
                    Err(Rejection::new(
                        ViolationKind::RangeViolation,
                        format!("{} is outside {}", value, kind),
                    ))
                }
            }
            ConstraintKind::AllowedValues { values } => {
                let rendered = value.render();
                if values.iter().any(|v| *v == rendered) {
                    Ok(())
                } else {
                    Err(Rejection::new(
                        ViolationKind::NotAllowed,
                        format!("{} not in allowed values: [{}]", value, values.join(", ")),
                    ))
                }
            }
            ConstraintKind::Pattern { regex } => {
                let Some(text) = value.as_string() else {
                    return Err(Rejection::type_mismatch("pattern", value));
                };
                self.check_pattern(regex, text)
            }
            ConstraintKind::Length { min, max } => {
                let Some(text) = value.as_string() else {
                    return Err(Rejection::type_mismatch("length", value));
                };
                let len = text.chars().count();
                let too_short = min.is_some_and(|lo| len < lo);
                let too_long = max.is_some_and(|hi| len > hi);
                if too_short || too_long {
                    Err(Rejection::new(
                        ViolationKind::LengthViolation,
                        format!("length {} of {} is outside {}", len, value, kind),
                    ))
                } else {
                    Ok(())
                }
            }
            ConstraintKind::TimeRange { earliest, latest } => {
                let Some(ts) = value.as_timestamp() else {
                    return Err(Rejection::type_mismatch("time_range", value));
                };
                let too_early = earliest.is_some_and(|lo| *ts < lo);
                let too_late = latest.is_some_and(|hi| *ts > hi);
                if too_early || too_late {
                    Err(Rejection::new(
                        ViolationKind::RangeViolation,
                        format!("{} is outside {}", value, kind),
                    ))
                } else {
                    Ok(())
                }
            }
            ConstraintKind::Custom { name, predicate } => check_custom(name, predicate, value),
            ConstraintKind::Unique | ConstraintKind::Shape { .. } => Ok(()),
        }
    }

    fn check_pattern(&mut self, pattern: &str, text: &str) -> Result<(), Rejection> {
        if !self.regex_cache.contains_key(pattern) {
            let compiled = Regex::new(pattern).map_err(|e| {
                Rejection::new(
                    ViolationKind::PatternMismatch,
                    format!("invalid pattern '{}': {}", pattern, e),
                )
            })?;
            self.regex_cache.insert(pattern.to_string(), compiled);
        }

        match self.regex_cache.get(pattern) {
            Some(re) if re.is_match(text) => Ok(()),
            _ => Err(Rejection::new(
                ViolationKind::PatternMismatch,
                format!("'{}' does not match pattern /{}/", text, pattern),
            )),
        }
    }
}

impl Default for ValueChecker {
    fn default() -> Self {
        Self::new()
    }
}

/// NaN is never within a range.
fn within(
    number: f64,
    min: Option<f64>,
    max: Option<f64>,
    min_inclusive: bool,
    max_inclusive: bool,
) -> bool {
    if number.is_nan() {
        return false;
    }
    let above = match min {
        Some(lo) if min_inclusive => number >= lo,
        Some(lo) => number > lo,
        None => true,
    };
    let below = match max {
        Some(hi) if max_inclusive => number <= hi,
        Some(hi) => number < hi,
        None => true,
    };
    above && below
}
