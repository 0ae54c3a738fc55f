//! Persistence for constraint sets and datasets.
//!
//! Constraint sets are stored as human-readable, diffable documents mapping
//! column name to a list of constraint descriptors. JSON, YAML and TOML are
//! supported; the format of a file is detected from its extension. Every load
//! re-checks the definitions, so a malformed file never yields a set.
//!
//! # Example
//!
//! ```rust
//! use dq_parser::parse_yaml;
//!
//! let yaml = r#"
//! allow_extra_columns: true
//! columns:
//!   sale_amount:
//!     - kind: type
//!       expected: float
//!     - kind: range
//!       min: 2.5
//!       max: 1550
//! "#;
//!
//! let set = parse_yaml(yaml).expect("Failed to parse constraint set");
//! assert_eq!(set.len(), 2);
//! ```

mod dataset;

pub use dataset::*;

use dq_core::{ConfigError, ConstraintSet};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while reading or writing files.
#[derive(Debug, Error)]
pub enum ParserError {
    /// JSON parsing or (de)serialization failed
    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or (de)serialization failed
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml_ng::Error),

    /// TOML parsing or (de)serialization failed
    #[error("Failed to parse TOML: {0}")]
    TomlError(String),

    /// File I/O error
    #[error("File I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Unsupported file format
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Invalid file extension
    #[error("Invalid or missing file extension")]
    InvalidExtension,

    /// Parsed constraint set is malformed
    #[error("Invalid constraint set: {0}")]
    InvalidConstraints(#[from] ConfigError),

    /// Dataset document does not describe rows of scalars
    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),
}

/// Result type alias for parser operations.
pub type Result<T> = std::result::Result<T, ParserError>;

/// Supported constraint file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yml, .yaml)
    Yaml,
    /// TOML format (.toml)
    Toml,
}

fn checked(set: ConstraintSet) -> Result<ConstraintSet> {
    set.check_definition()?;
    Ok(set)
}

/// Parse a constraint set from a JSON string.
///
/// # Example
///
/// ```rust
/// use dq_parser::parse_json;
///
/// let json = r#"{"columns": {"id": [{"kind": "not_null"}, {"kind": "unique"}]}}"#;
/// let set = parse_json(json).unwrap();
/// assert_eq!(set.constraints_for("id").len(), 2);
/// ```
pub fn parse_json(content: &str) -> Result<ConstraintSet> {
    checked(serde_json::from_str(content)?)
}

/// Parse a constraint set from a YAML string.
pub fn parse_yaml(content: &str) -> Result<ConstraintSet> {
    checked(serde_yaml_ng::from_str(content)?)
}

/// Parse a constraint set from a TOML string.
///
/// # Example
///
/// ```rust
/// use dq_parser::parse_toml;
///
/// let toml = r#"
/// allow_extra_columns = false
///
/// [[columns.status]]
/// kind = "allowed_values"
/// values = ["open", "closed"]
/// "#;
///
/// let set = parse_toml(toml).unwrap();
/// assert!(!set.allow_extra_columns());
/// ```
pub fn parse_toml(content: &str) -> Result<ConstraintSet> {
    let set: ConstraintSet =
        toml::from_str(content).map_err(|e| ParserError::TomlError(e.to_string()))?;
    checked(set)
}

/// Serialize a constraint set as pretty-printed JSON.
pub fn to_json(set: &ConstraintSet) -> Result<String> {
    Ok(serde_json::to_string_pretty(set)?)
}

/// Serialize a constraint set as YAML.
pub fn to_yaml(set: &ConstraintSet) -> Result<String> {
    Ok(serde_yaml_ng::to_string(set)?)
}

/// Serialize a constraint set as TOML.
pub fn to_toml(set: &ConstraintSet) -> Result<String> {
    toml::to_string(set).map_err(|e| ParserError::TomlError(e.to_string()))
}

/// Detect the constraint file format from a path based on its extension.
///
/// # Supported Extensions
///
/// * `.json` → `ConstraintFormat::Json`
/// * `.yaml`, `.yml` → `ConstraintFormat::Yaml`
/// * `.toml` → `ConstraintFormat::Toml`
///
/// # Errors
///
/// Returns `ParserError::InvalidExtension` if the file has no extension.
/// Returns `ParserError::UnsupportedFormat` if the extension is not recognized.
pub fn detect_format(path: &Path) -> Result<ConstraintFormat> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or(ParserError::InvalidExtension)?;

    match extension.to_lowercase().as_str() {
        "json" => Ok(ConstraintFormat::Json),
        "yaml" | "yml" => Ok(ConstraintFormat::Yaml),
        "toml" => Ok(ConstraintFormat::Toml),
        other => Err(ParserError::UnsupportedFormat(other.to_string())),
    }
}

/// Parse a constraint set in the given format.
pub fn parse_str(content: &str, format: ConstraintFormat) -> Result<ConstraintSet> {
    match format {
        ConstraintFormat::Json => parse_json(content),
        ConstraintFormat::Yaml => parse_yaml(content),
        ConstraintFormat::Toml => parse_toml(content),
    }
}

/// Serialize a constraint set in the given format.
pub fn to_string(set: &ConstraintSet, format: ConstraintFormat) -> Result<String> {
    match format {
        ConstraintFormat::Json => to_json(set),
        ConstraintFormat::Yaml => to_yaml(set),
        ConstraintFormat::Toml => to_toml(set),
    }
}

/// Parse a constraint set from a file with automatic format detection.
///
/// Custom constraints come back unbound; attach predicates with
/// [`ConstraintSet::bind`] before validating.
///
/// ```no_run
/// use dq_parser::parse_file;
/// use std::path::Path;
///
/// let set = parse_file(Path::new("constraints/sales.json")).unwrap();
/// println!("Loaded {} constraints", set.len());
/// ```
pub fn parse_file(path: &Path) -> Result<ConstraintSet> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    parse_str(&content, format)
}

/// Write a constraint set to a file, choosing the format from the extension.
pub fn write_file(path: &Path, set: &ConstraintSet) -> Result<()> {
    let format = detect_format(path)?;
    let content = to_string(set, format)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use dq_core::{ConstraintKind, ConstraintSetBuilder, CustomPredicate, PredicateRegistry, ValueType};
    use pretty_assertions::assert_eq;

    fn every_kind() -> ConstraintSet {
        ConstraintSetBuilder::new()
            .allow_extra_columns(false)
            .dataset(ConstraintKind::Shape {
                rows: Some(10),
                columns: Some(6),
            })
            .column("order_id", ConstraintKind::type_of(ValueType::Int))
            .column("order_id", ConstraintKind::NotNull)
            .column("order_id", ConstraintKind::Unique)
            .column(
                "sale_amount",
                ConstraintKind::range_with(Some(-1550.0), Some(1550.0), false, true),
            )
            .column("sale_amount", ConstraintKind::nullable_type_of(ValueType::Float))
            .column("status", ConstraintKind::allowed_values(["open", "closed"]))
            .column("sku", ConstraintKind::pattern(r"^[A-Z]{3}-\d+$"))
            .column(
                "sku",
                ConstraintKind::Length {
                    min: Some(5),
                    max: None,
                },
            )
            .column(
                "sold_at",
                ConstraintKind::TimeRange {
                    earliest: Some(Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()),
                    latest: Some(Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap()),
                },
            )
            .column(
                "quantity",
                ConstraintKind::Custom {
                    name: "positive".to_string(),
                    predicate: CustomPredicate::unbound(),
                },
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_parse_valid_json_minimal() {
        let set = parse_json("{}").expect("Failed to parse empty document");
        assert!(set.is_empty());
        assert!(set.allow_extra_columns());
    }

    #[test]
    fn test_parse_yaml_with_all_kinds() {
        let yaml = r#"
allow_extra_columns: false
columns:
  "@dataset":
    - kind: shape
      columns: 6
  sale_amount:
    - kind: type
      expected: float
      allow_null: true
    - kind: range
      min: 2.50
      max: 1550
  status:
    - kind: allowed_values
      values: [open, closed]
  sku:
    - kind: pattern
      regex: "^[A-Z]{3}-\\d+$"
    - kind: length
      max: 12
  order_id:
    - kind: not_null
    - kind: unique
"#;

        let set = parse_yaml(yaml).expect("Failed to parse YAML constraint set");

        assert!(!set.allow_extra_columns());
        assert_eq!(set.len(), 8);
        assert_eq!(
            set.constraints_for("sale_amount")[1],
            ConstraintKind::range(2.5, 1550.0)
        );
        assert_eq!(
            set.column_names().collect::<Vec<_>>(),
            vec!["sale_amount", "status", "sku", "order_id"]
        );
    }

    #[test]
    fn test_parse_rejects_min_greater_than_max() {
        let json = r#"{"columns": {"price": [{"kind": "range", "min": 1550, "max": 2.5}]}}"#;
        let result = parse_json(json);
        assert!(matches!(
            result.unwrap_err(),
            ParserError::InvalidConstraints(ConfigError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_unknown_kind() {
        let json = r#"{"columns": {"price": [{"kind": "between", "lo": 1}]}}"#;
        assert!(matches!(parse_json(json).unwrap_err(), ParserError::JsonError(_)));
    }

    #[test]
    fn test_parse_invalid_toml() {
        let invalid_toml = r#"
allow_extra_columns = true
[[[invalid syntax
"#;

        let result = parse_toml(invalid_toml);
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), ParserError::TomlError(_)));
    }

    #[test]
    fn test_round_trip_every_format() {
        let original = every_kind();
        for format in [
            ConstraintFormat::Json,
            ConstraintFormat::Yaml,
            ConstraintFormat::Toml,
        ] {
            let text = to_string(&original, format).expect("Failed to serialize");
            let parsed = parse_str(&text, format).expect("Failed to parse");
            assert_eq!(parsed, original, "round trip through {:?}", format);
            assert_eq!(
                parsed.iter().collect::<Vec<_>>(),
                original.iter().collect::<Vec<_>>(),
                "declared order lost through {:?}",
                format
            );
        }
    }

    #[test]
    fn test_round_trip_rebinds_custom_predicates() {
        let registry =
            PredicateRegistry::new().register("positive", |v| v.as_float().is_some_and(|f| f > 0.0));
        let mut original = every_kind();
        original.bind(&registry).unwrap();

        let mut parsed = parse_json(&to_json(&original).unwrap()).unwrap();
        assert!(parsed.ensure_bound().is_err());
        parsed.bind(&registry).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_json_is_human_readable() {
        let set = ConstraintSetBuilder::new()
            .column("sale_amount", ConstraintKind::range(2.5, 1550.0))
            .build()
            .unwrap();
        let json = to_json(&set).unwrap();
        assert_eq!(
            json,
            r#"{
  "allow_extra_columns": true,
  "columns": {
    "sale_amount": [
      {
        "kind": "range",
        "min": 2.5,
        "max": 1550.0
      }
    ]
  }
}"#
        );
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(
            detect_format(Path::new("set.json")).unwrap(),
            ConstraintFormat::Json
        );
        assert_eq!(
            detect_format(Path::new("set.yml")).unwrap(),
            ConstraintFormat::Yaml
        );
        assert_eq!(
            detect_format(Path::new("set.YAML")).unwrap(),
            ConstraintFormat::Yaml
        );
        assert_eq!(
            detect_format(Path::new("set.toml")).unwrap(),
            ConstraintFormat::Toml
        );
    }

    #[test]
    fn test_detect_format_unsupported() {
        let result = detect_format(Path::new("set.csv"));
        assert!(matches!(
            result.unwrap_err(),
            ParserError::UnsupportedFormat(_)
        ));
    }

    #[test]
    fn test_detect_format_no_extension() {
        let result = detect_format(Path::new("constraints"));
        assert!(matches!(result.unwrap_err(), ParserError::InvalidExtension));
    }

    #[test]
    fn test_write_and_parse_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.yaml");
        let original = every_kind();

        write_file(&path, &original).expect("Failed to write file");
        let parsed = parse_file(&path).expect("Failed to read file back");
        assert_eq!(parsed, original);
    }
}
