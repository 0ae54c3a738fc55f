//! Builder pattern for creating constraint sets.
//!
//! This module provides an ergonomic fluent API for declaring constraint sets.
//! Definition errors are collected while chaining and the first one is returned
//! from [`ConstraintSetBuilder::build`], so a malformed set never comes into
//! existence.

use crate::{ConfigError, Constraint, ConstraintKind, ConstraintSet, DATASET_KEY, Result};

/// Builder for creating a `ConstraintSet`.
///
/// # Example
///
/// ```rust
/// use dq_core::{ConstraintKind, ConstraintSetBuilder, ValueType};
///
/// let set = ConstraintSetBuilder::new()
///     .allow_extra_columns(false)
///     .dataset(ConstraintKind::column_count(6))
///     .column("order_id", ConstraintKind::Unique)
///     .column("status", ConstraintKind::allowed_values(["open", "closed"]))
///     .column("amount", ConstraintKind::type_of(ValueType::Float))
///     .build()
///     .expect("valid constraint set");
///
/// assert_eq!(set.len(), 4);
/// assert!(!set.allow_extra_columns());
/// ```
#[derive(Debug, Default)]
pub struct ConstraintSetBuilder {
    allow_extra_columns: Option<bool>,
    // `None` declares a column without constraining it
    entries: Vec<(String, Option<ConstraintKind>)>,
}

impl ConstraintSetBuilder {
    /// Creates a new, empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether rows may carry undeclared columns (default `true`).
    pub fn allow_extra_columns(mut self, allow: bool) -> Self {
        self.allow_extra_columns = Some(allow);
        self
    }

    /// Adds a constraint on a column.
    ///
    /// A column keeps the position of its first declaration; later
    /// constraints on an already declared column join that column's group,
    /// so they are evaluated before any column declared in between.
    pub fn column(mut self, column: impl Into<String>, kind: ConstraintKind) -> Self {
        self.entries.push((column.into(), Some(kind)));
        self
    }

    /// Declares a column with no constraints.
    pub fn declare(mut self, column: impl Into<String>) -> Self {
        self.entries.push((column.into(), None));
        self
    }

    /// Adds several constraints on the same column.
    ///
    /// Grouping follows [`column`](Self::column): if the column is already
    /// declared, the constraints are appended to its existing group.
    pub fn columns<I>(mut self, column: impl Into<String>, kinds: I) -> Self
    where
        I: IntoIterator<Item = ConstraintKind>,
    {
        let column = column.into();
        self.entries
            .extend(kinds.into_iter().map(|kind| (column.clone(), Some(kind))));
        self
    }

    /// Adds a dataset-level constraint.
    pub fn dataset(mut self, kind: ConstraintKind) -> Self {
        self.entries.push((DATASET_KEY.to_string(), Some(kind)));
        self
    }

    /// Adds an already checked constraint.
    pub fn constraint(mut self, constraint: Constraint) -> Self {
        let (column, kind) = constraint.into_parts();
        self.entries.push((column, Some(kind)));
        self
    }

    /// Builds the set, checking every definition.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] in declaration order.
    pub fn build(self) -> Result<ConstraintSet> {
        let mut set =
            ConstraintSet::new().with_allow_extra_columns(self.allow_extra_columns.unwrap_or(true));
        for (column, kind) in self.entries {
            match kind {
                Some(kind) => set.push(Constraint::new(column, kind)?),
                None => set.declare_column(column),
            }
        }
        Ok(set)
    }

    /// Builds the set, also requiring every custom predicate to be bound.
    pub fn build_bound(self) -> Result<ConstraintSet> {
        let set = self.build()?;
        set.ensure_bound()?;
        Ok(set)
    }
}

impl TryFrom<Vec<Constraint>> for ConstraintSet {
    type Error = ConfigError;

    fn try_from(constraints: Vec<Constraint>) -> Result<Self> {
        constraints
            .into_iter()
            .fold(ConstraintSetBuilder::new(), ConstraintSetBuilder::constraint)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CustomPredicate, ValueType};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builder_minimal() {
        let set = ConstraintSetBuilder::new().build().unwrap();
        assert!(set.is_empty());
        assert!(set.allow_extra_columns()); // Default allows extra columns
    }

    #[test]
    fn test_builder_full() {
        let set = ConstraintSetBuilder::new()
            .allow_extra_columns(false)
            .dataset(ConstraintKind::column_count(3))
            .columns(
                "price",
                [
                    ConstraintKind::type_of(ValueType::Float),
                    ConstraintKind::range(2.5, 1550.0),
                ],
            )
            .column("sku", ConstraintKind::pattern(r"^[A-Z]{3}-\d+$"))
            .column("sku", ConstraintKind::Unique)
            .build()
            .unwrap();

        assert_eq!(set.len(), 5);
        assert!(!set.allow_extra_columns());
        assert_eq!(set.constraints_for("price").len(), 2);
        assert_eq!(set.constraints_for(DATASET_KEY).len(), 1);
    }

    #[test]
    fn test_builder_returns_first_config_error() {
        let err = ConstraintSetBuilder::new()
            .column("a", ConstraintKind::range(10.0, 1.0))
            .column("b", ConstraintKind::pattern("("))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRange { ref column, .. } if column == "a"));
    }

    #[test]
    fn test_build_bound_rejects_unbound_custom() {
        let err = ConstraintSetBuilder::new()
            .column(
                "qty",
                ConstraintKind::Custom {
                    name: "positive".to_string(),
                    predicate: CustomPredicate::unbound(),
                },
            )
            .build_bound()
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnboundPredicate { .. }));
    }

    #[test]
    fn test_declare_keeps_position() {
        let set = ConstraintSetBuilder::new()
            .declare("notes")
            .column("id", ConstraintKind::NotNull)
            .build()
            .unwrap();
        assert_eq!(set.column_names().collect::<Vec<_>>(), vec!["notes", "id"]);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_redeclared_column_joins_its_group() {
        let set = ConstraintSetBuilder::new()
            .column("b", ConstraintKind::NotNull)
            .column("a", ConstraintKind::NotNull)
            .columns("b", [ConstraintKind::range(0.0, 1.0)])
            .build()
            .unwrap();

        let order: Vec<(&str, &str)> = set.iter().map(|(c, k)| (c, k.name())).collect();
        assert_eq!(
            order,
            vec![("b", "not_null"), ("b", "range"), ("a", "not_null")]
        );
    }

    #[test]
    fn test_try_from_constraints() {
        let constraints = vec![
            Constraint::new("id", ConstraintKind::NotNull).unwrap(),
            Constraint::new("id", ConstraintKind::Unique).unwrap(),
        ];
        let set = ConstraintSet::try_from(constraints).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.constraints_for("id")[1], ConstraintKind::Unique);
    }
}
