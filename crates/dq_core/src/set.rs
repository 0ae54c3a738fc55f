//! The constraint set: every constraint checked together in one validation run.

use crate::{
    ConfigError, Constraint, ConstraintKind, DATASET_KEY, PredicateRegistry, Result,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// An ordered mapping from column key to constraints.
///
/// Declared order is the order keys were first declared, then the order of
/// constraints within each key. The validator evaluates in this order, which
/// decides which failure fail-fast mode reports.
///
/// Sets are built with [`ConstraintSetBuilder`](crate::ConstraintSetBuilder),
/// discovered from data, or deserialized; deserialized sets should be checked
/// with [`ConstraintSet::check_definition`] (the parser does this on load).
///
/// # Example
///
/// ```rust
/// use dq_core::{ConstraintKind, ConstraintSetBuilder, ValueType};
///
/// let set = ConstraintSetBuilder::new()
///     .column("sale_amount", ConstraintKind::type_of(ValueType::Float))
///     .column("sale_amount", ConstraintKind::range(2.5, 1550.0))
///     .build()
///     .unwrap();
///
/// assert_eq!(set.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintSet {
    /// Whether rows may carry columns no constraint mentions
    #[serde(default = "default_true")]
    allow_extra_columns: bool,

    /// Constraints per column key, in declared order
    #[serde(default)]
    columns: IndexMap<String, Vec<ConstraintKind>>,
}

impl Default for ConstraintSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstraintSet {
    /// Creates an empty set that allows extra columns.
    pub fn new() -> Self {
        Self {
            allow_extra_columns: true,
            columns: IndexMap::new(),
        }
    }

    /// Returns a copy of this set with the extra-columns flag replaced.
    pub fn with_allow_extra_columns(mut self, allow: bool) -> Self {
        self.allow_extra_columns = allow;
        self
    }

    /// Whether rows may carry undeclared columns.
    pub fn allow_extra_columns(&self) -> bool {
        self.allow_extra_columns
    }

    /// Appends a checked constraint.
    pub fn push(&mut self, constraint: Constraint) {
        let (column, kind) = constraint.into_parts();
        self.columns.entry(column).or_default().push(kind);
    }

    /// Declares `column` without constraints so it counts as a known column.
    pub fn declare_column(&mut self, column: impl Into<String>) {
        self.columns.entry(column.into()).or_default();
    }

    /// Total number of constraints.
    pub fn len(&self) -> usize {
        self.columns.values().map(Vec::len).sum()
    }

    /// Returns true if no constraints are declared.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over `(column_key, kind)` in declared order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConstraintKind)> {
        self.columns
            .iter()
            .flat_map(|(column, kinds)| kinds.iter().map(move |kind| (column.as_str(), kind)))
    }

    /// Declared column names, excluding the dataset-level key.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns
            .keys()
            .map(String::as_str)
            .filter(|c| *c != DATASET_KEY)
    }

    /// Returns true if `column` is declared, with or without constraints.
    pub fn declares(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    /// Constraints declared on `column`, empty if none.
    pub fn constraints_for(&self, column: &str) -> &[ConstraintKind] {
        self.columns.get(column).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Checks every constraint definition. Custom predicates may be unbound.
    pub fn check_definition(&self) -> Result<()> {
        for (column, kind) in self.iter() {
            kind.check_definition(column)?;
        }
        Ok(())
    }

    /// Fails if any custom constraint has no predicate attached.
    pub fn ensure_bound(&self) -> Result<()> {
        for (column, kind) in self.iter() {
            if let ConstraintKind::Custom { name, predicate } = kind {
                if !predicate.is_bound() {
                    return Err(ConfigError::UnboundPredicate {
                        column: column.to_string(),
                        name: name.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Attaches registry predicates to unbound custom constraints.
    ///
    /// Already bound constraints keep their predicate. Fails with
    /// [`ConfigError::UnknownPredicate`] if a name is not registered.
    pub fn bind(&mut self, registry: &PredicateRegistry) -> Result<()> {
        for kinds in self.columns.values_mut() {
            for kind in kinds.iter_mut() {
                if let ConstraintKind::Custom { name, predicate } = kind {
                    if predicate.is_bound() {
                        continue;
                    }
                    let found = registry
                        .get(name)
                        .ok_or_else(|| ConfigError::UnknownPredicate(name.clone()))?;
                    *predicate = found.clone();
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConstraintSetBuilder;
    use pretty_assertions::assert_eq;

    fn sample_set() -> ConstraintSet {
        ConstraintSetBuilder::new()
            .column("id", ConstraintKind::Unique)
            .column("amount", ConstraintKind::range(0.0, 10.0))
            .column("id", ConstraintKind::NotNull)
            .dataset(ConstraintKind::column_count(2))
            .build()
            .unwrap()
    }

    #[test]
    fn test_declared_order_groups_by_first_declaration() {
        let set = sample_set();
        let order: Vec<_> = set.iter().map(|(c, k)| (c, k.name())).collect();
        assert_eq!(
            order,
            vec![
                ("id", "unique"),
                ("id", "not_null"),
                ("amount", "range"),
                (DATASET_KEY, "shape"),
            ]
        );
        assert_eq!(set.len(), 4);
        assert_eq!(set.column_names().collect::<Vec<_>>(), vec!["id", "amount"]);
    }

    #[test]
    fn test_deserialized_set_is_checked_on_demand() {
        let json = r#"{"columns": {"price": [{"kind": "range", "min": 5, "max": 1}]}}"#;
        let set: ConstraintSet = serde_json::from_str(json).unwrap();
        assert!(set.allow_extra_columns());
        assert!(matches!(
            set.check_definition(),
            Err(ConfigError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_bind_attaches_registered_predicates() {
        let json = r#"{"columns": {"qty": [{"kind": "custom", "name": "positive"}]}}"#;
        let mut set: ConstraintSet = serde_json::from_str(json).unwrap();
        assert!(matches!(
            set.ensure_bound(),
            Err(ConfigError::UnboundPredicate { .. })
        ));

        let empty = PredicateRegistry::new();
        assert_eq!(
            set.clone().bind(&empty),
            Err(ConfigError::UnknownPredicate("positive".to_string()))
        );

        let registry =
            PredicateRegistry::new().register("positive", |v| v.as_float().is_some_and(|f| f > 0.0));
        set.bind(&registry).unwrap();
        assert!(set.ensure_bound().is_ok());
    }

    #[test]
    fn test_declare_column_without_constraints() {
        let mut set = ConstraintSet::new();
        set.declare_column("notes");
        assert!(set.declares("notes"));
        assert!(set.is_empty());
        assert_eq!(set.column_names().collect::<Vec<_>>(), vec!["notes"]);
    }

    #[test]
    fn test_constraints_for() {
        let set = sample_set();
        assert_eq!(set.constraints_for("amount").len(), 1);
        assert!(set.constraints_for("missing").is_empty());
        assert!(set.declares("id"));
        assert!(!set.declares("other"));
    }
}
