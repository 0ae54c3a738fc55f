//! # Data Quality Core
//!
//! Core data structures for the data quality engine.
//!
//! This crate provides the building blocks shared by the validator, the
//! discoverer and the persistence layer:
//!
//! ## Key Concepts
//!
//! - **Dataset**: ordered rows of named scalar values ([`Dataset`], [`DataValue`])
//! - **Constraint**: one testable property of a column or of the dataset ([`ConstraintKind`])
//! - **ConstraintSet**: every constraint checked together in one run ([`ConstraintSet`])
//! - **ValidationResult**: per-constraint pass/fail counts and offending rows
//!
//! ## Example
//!
//! ```rust
//! use dq_core::{row, ConstraintKind, ConstraintSetBuilder, DataValue, Dataset, ValueType};
//!
//! let constraints = ConstraintSetBuilder::new()
//!     .column("sale_amount", ConstraintKind::type_of(ValueType::Float))
//!     .column("sale_amount", ConstraintKind::range(2.5, 1550.0))
//!     .column("region", ConstraintKind::NotNull)
//!     .build()
//!     .unwrap();
//!
//! let dataset = Dataset::from_rows(vec![
//!     row([("sale_amount", DataValue::Float(12.5)), ("region", "north".into())]),
//! ]);
//!
//! assert_eq!(constraints.len(), 3);
//! assert_eq!(dataset.columns(), vec!["sale_amount", "region"]);
//! ```

pub mod builder;
pub mod constraint;
pub mod dataset;
pub mod error;
pub mod predicate;
pub mod report;
pub mod set;

pub use builder::*;
pub use constraint::*;
pub use dataset::*;
pub use error::*;
pub use predicate::*;
pub use report::*;
pub use set::*;
