//! User-supplied predicates for `custom` constraints.
//!
//! A predicate is stored as a shared function from [`DataValue`] to
//! `Result<(), String>`. Boolean predicates are adapted on construction so the
//! validator invokes every predicate the same way.
//!
//! Constraint files persist a custom constraint by name only. After loading,
//! a [`PredicateRegistry`] re-attaches the functions (see
//! [`ConstraintSet::bind`](crate::ConstraintSet::bind)).

use crate::DataValue;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Function signature shared by all predicates.
pub type PredicateFn = dyn Fn(&DataValue) -> Result<(), String> + Send + Sync;

/// Handle to an optional predicate function.
///
/// An unbound handle is what deserialization produces.
#[derive(Clone, Default)]
pub struct CustomPredicate {
    func: Option<Arc<PredicateFn>>,
}

impl CustomPredicate {
    /// Wraps a boolean predicate. A `false` result becomes a failure message.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&DataValue) -> bool + Send + Sync + 'static,
    {
        Self::fallible(move |value| {
            if predicate(value) {
                Ok(())
            } else {
                Err(format!("value {} rejected by predicate", value))
            }
        })
    }

    /// Wraps a predicate that reports its own failure message.
    pub fn fallible<F>(predicate: F) -> Self
    where
        F: Fn(&DataValue) -> Result<(), String> + Send + Sync + 'static,
    {
        Self {
            func: Some(Arc::new(predicate)),
        }
    }

    /// A handle without a function attached.
    pub fn unbound() -> Self {
        Self::default()
    }

    /// Returns true if a function is attached.
    pub fn is_bound(&self) -> bool {
        self.func.is_some()
    }

    /// Invokes the predicate. Returns `None` when unbound.
    pub fn call(&self, value: &DataValue) -> Option<Result<(), String>> {
        self.func.as_ref().map(|f| f(value))
    }
}

impl fmt::Debug for CustomPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_bound() {
            f.write_str("CustomPredicate(bound)")
        } else {
            f.write_str("CustomPredicate(unbound)")
        }
    }
}

impl PartialEq for CustomPredicate {
    fn eq(&self, other: &Self) -> bool {
        match (&self.func, &other.func) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

/// Named predicates available for binding loaded constraint sets.
#[derive(Clone, Default)]
pub struct PredicateRegistry {
    predicates: HashMap<String, CustomPredicate>,
}

impl PredicateRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a boolean predicate under `name`, replacing any previous one.
    pub fn register<F>(mut self, name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&DataValue) -> bool + Send + Sync + 'static,
    {
        self.predicates
            .insert(name.into(), CustomPredicate::new(predicate));
        self
    }

    /// Registers a message-reporting predicate under `name`.
    pub fn register_fallible<F>(mut self, name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&DataValue) -> Result<(), String> + Send + Sync + 'static,
    {
        self.predicates
            .insert(name.into(), CustomPredicate::fallible(predicate));
        self
    }

    /// Looks up a predicate by name.
    pub fn get(&self, name: &str) -> Option<&CustomPredicate> {
        self.predicates.get(name)
    }

    /// Returns true if no predicates are registered.
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl fmt::Debug for PredicateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.predicates.keys().collect();
        names.sort();
        f.debug_struct("PredicateRegistry")
            .field("predicates", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_predicate_reports_value() {
        let positive = CustomPredicate::new(|v| v.as_float().is_some_and(|f| f > 0.0));
        assert_eq!(positive.call(&DataValue::Int(3)), Some(Ok(())));
        assert_eq!(
            positive.call(&DataValue::Int(-3)),
            Some(Err("value -3 rejected by predicate".to_string()))
        );
    }

    #[test]
    fn test_unbound_predicate() {
        let handle = CustomPredicate::unbound();
        assert!(!handle.is_bound());
        assert_eq!(handle.call(&DataValue::Null), None);
        assert_eq!(handle, CustomPredicate::default());
    }

    #[test]
    fn test_empty_registry() {
        let registry = PredicateRegistry::new();
        assert!(registry.is_empty());
        assert!(!registry.register("any", |_| true).is_empty());
    }

    #[test]
    fn test_registry_hands_out_shared_functions() {
        let registry = PredicateRegistry::new()
            .register("even", |v| v.as_int().is_some_and(|i| i % 2 == 0));

        let a = registry.get("even").cloned().unwrap();
        let b = registry.get("even").cloned().unwrap();
        assert_eq!(a, b);
        assert!(registry.get("odd").is_none());
    }
}
