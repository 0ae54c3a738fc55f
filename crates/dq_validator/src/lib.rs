//! # Data Quality Validator
//!
//! Validation engine for constraint sets. This crate provides:
//!
//! - [`Validator`]: evaluates a [`ConstraintSet`](dq_core::ConstraintSet) against a
//!   [`Dataset`](dq_core::Dataset) in batch or fail-fast mode
//! - [`Discoverer`]: learns a constraint set from a reference dataset
//! - [`ValidatedTransform`]: runs a transformation and only returns output that
//!   passes validation
//!
//! ## Example
//!
//! ```rust
//! use dq_core::{row, DataValue, Dataset};
//! use dq_validator::{Discoverer, ValidationOptions, Validator};
//!
//! let reference = Dataset::from_rows(vec![
//!     row([("sale_amount", DataValue::Float(2.5)), ("region", "north".into())]),
//!     row([("sale_amount", DataValue::Float(1550.0)), ("region", "south".into())]),
//! ]);
//! let constraints = Discoverer::new().discover(&reference);
//!
//! let incoming = Dataset::from_rows(vec![
//!     row([("sale_amount", DataValue::Float(1550.01)), ("region", "north".into())]),
//! ]);
//! let result = Validator::new().validate(&constraints, &incoming).unwrap();
//! assert!(!result.passed());
//!
//! let err = Validator::new()
//!     .with_options(ValidationOptions::fail_fast())
//!     .validate(&constraints, &incoming)
//!     .unwrap_err();
//! assert_eq!(err.violation().unwrap().column, "sale_amount");
//! ```

mod constraints;
mod custom;
mod discovery;
mod engine;
mod error;
mod pipeline;
mod quality;
mod schema;

pub use constraints::*;
pub use custom::*;
pub use discovery::*;
pub use engine::*;
pub use error::*;
pub use pipeline::*;
