//! Custom predicate evaluation.

use crate::Rejection;
use dq_core::{CustomPredicate, DataValue, ViolationKind};

/// Runs a named custom predicate against one non-null value.
///
/// A predicate that rejects the value, or one that was never bound, yields a
/// [`ViolationKind::CustomPredicateFailure`] carrying the predicate's message.
pub fn check_custom(
    name: &str,
    predicate: &CustomPredicate,
    value: &DataValue,
) -> Result<(), Rejection> {
    match predicate.call(value) {
        Some(Ok(())) => Ok(()),
        Some(Err(message)) => Err(Rejection::new(
            ViolationKind::CustomPredicateFailure,
            format!("{}: {}", name, message),
        )),
        None => Err(Rejection::new(
            ViolationKind::CustomPredicateFailure,
            format!("{}: predicate is not bound", name),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_boolean_predicate() {
        let even = CustomPredicate::new(|v| v.as_int().is_some_and(|i| i % 2 == 0));
        assert!(check_custom("even", &even, &DataValue::Int(4)).is_ok());

        let err = check_custom("even", &even, &DataValue::Int(3)).unwrap_err();
        assert_eq!(err.kind, ViolationKind::CustomPredicateFailure);
        assert!(err.message.starts_with("even: "));
    }

    #[test]
    fn test_fallible_predicate_message() {
        let positive = CustomPredicate::fallible(|v| match v.as_float() {
            Some(f) if f > 0.0 => Ok(()),
            _ => Err(format!("{} is not positive", v)),
        });
        let err = check_custom("positive", &positive, &DataValue::Float(-1.5)).unwrap_err();
        assert_eq!(err.message, "positive: -1.5 is not positive");
    }

    #[test]
    fn test_unbound_predicate_fails() {
        let err = check_custom("ghost", &CustomPredicate::unbound(), &DataValue::Int(1)).unwrap_err();
        assert_eq!(err.message, "ghost: predicate is not bound");
    }
}
