//! Dataset loading from JSON documents.
//!
//! Accepts either a JSON array of objects or JSON Lines (one object per line).
//! Each object becomes a row; keys keep their document order.

use crate::{ParserError, Result};
use chrono::{DateTime, Utc};
use dq_core::{DataRow, DataValue, Dataset};
use serde_json::Value;
use std::path::Path;

/// Options for reading datasets.
#[derive(Debug, Clone, Default)]
pub struct DatasetOptions {
    /// Turn RFC 3339 strings into timestamps
    pub parse_timestamps: bool,
}

impl DatasetOptions {
    /// Creates default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets timestamp parsing for string values.
    pub fn with_parse_timestamps(mut self, parse: bool) -> Self {
        self.parse_timestamps = parse;
        self
    }
}

/// Parse a dataset from a JSON array of objects or from JSON Lines.
///
/// # Example
///
/// ```rust
/// use dq_parser::{parse_dataset_json, DatasetOptions};
///
/// let json = r#"[{"id": 1, "amount": 12.5}, {"id": 2, "amount": null}]"#;
/// let dataset = parse_dataset_json(json, &DatasetOptions::new()).unwrap();
/// assert_eq!(dataset.len(), 2);
/// ```
pub fn parse_dataset_json(content: &str, options: &DatasetOptions) -> Result<Dataset> {
    let trimmed = content.trim_start();
    if trimmed.starts_with('[') {
        let document: Value = serde_json::from_str(content)?;
        let Value::Array(items) = document else {
            return Err(ParserError::InvalidDataset(
                "expected a JSON array of objects".to_string(),
            ));
        };
        items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| to_row(item, idx, options))
            .collect()
    } else {
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .enumerate()
            .map(|(idx, line)| to_row(serde_json::from_str(line)?, idx, options))
            .collect()
    }
}

/// Read a dataset file (`.json` array or `.jsonl`/`.ndjson` lines).
pub fn read_dataset(path: &Path, options: &DatasetOptions) -> Result<Dataset> {
    let content = std::fs::read_to_string(path)?;
    parse_dataset_json(&content, options)
}

fn to_row(item: Value, idx: usize, options: &DatasetOptions) -> Result<DataRow> {
    let Value::Object(fields) = item else {
        return Err(ParserError::InvalidDataset(format!(
            "row {} is not a JSON object",
            idx
        )));
    };
    fields
        .into_iter()
        .map(|(column, value)| {
            let value = to_value(value, options).ok_or_else(|| {
                ParserError::InvalidDataset(format!(
                    "row {} column '{}' holds a nested value",
                    idx, column
                ))
            })?;
            Ok((column, value))
        })
        .collect()
}

fn to_value(value: Value, options: &DatasetOptions) -> Option<DataValue> {
    match value {
        Value::Null => Some(DataValue::Null),
        Value::Bool(b) => Some(DataValue::Bool(b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(DataValue::Int(i)),
            None => n.as_f64().map(DataValue::Float),
        },
        Value::String(s) => {
            if options.parse_timestamps {
                if let Ok(ts) = DateTime::parse_from_rfc3339(&s) {
                    return Some(DataValue::Timestamp(ts.with_timezone(&Utc)));
                }
            }
            Some(DataValue::String(s))
        }
        Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_array() {
        let json = r#"[
            {"order_id": 1, "sale_amount": 2.5, "region": "north", "paid": true},
            {"order_id": 2, "sale_amount": null, "region": "south", "paid": false}
        ]"#;
        let dataset = parse_dataset_json(json, &DatasetOptions::new()).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(
            dataset.columns(),
            vec!["order_id", "sale_amount", "region", "paid"]
        );
        assert_eq!(dataset.value(0, "sale_amount"), &DataValue::Float(2.5));
        assert_eq!(dataset.value(1, "sale_amount"), &DataValue::Null);
        assert_eq!(dataset.value(1, "paid"), &DataValue::Bool(false));
    }

    #[test]
    fn test_parse_json_lines() {
        let jsonl = "{\"id\": 1}\n\n{\"id\": 2, \"extra\": \"x\"}\n";
        let dataset = parse_dataset_json(jsonl, &DatasetOptions::new()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.value(1, "id"), &DataValue::Int(2));
        assert_eq!(dataset.value(0, "extra"), &DataValue::Null);
    }

    #[test]
    fn test_timestamps_only_when_requested() {
        let json = r#"[{"sold_at": "2023-05-01T12:00:00Z"}]"#;

        let plain = parse_dataset_json(json, &DatasetOptions::new()).unwrap();
        assert_eq!(
            plain.value(0, "sold_at"),
            &DataValue::String("2023-05-01T12:00:00Z".to_string())
        );

        let parsed =
            parse_dataset_json(json, &DatasetOptions::new().with_parse_timestamps(true)).unwrap();
        assert_eq!(
            parsed.value(0, "sold_at"),
            &DataValue::Timestamp(Utc.with_ymd_and_hms(2023, 5, 1, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_nested_values_are_rejected() {
        let json = r#"[{"tags": ["a", "b"]}]"#;
        let err = parse_dataset_json(json, &DatasetOptions::new()).unwrap_err();
        assert!(matches!(err, ParserError::InvalidDataset(_)));
    }

    #[test]
    fn test_non_object_row_is_rejected() {
        let err = parse_dataset_json("[1, 2]", &DatasetOptions::new()).unwrap_err();
        assert!(matches!(err, ParserError::InvalidDataset(_)));
    }

    #[test]
    fn test_empty_array() {
        let dataset = parse_dataset_json("[]", &DatasetOptions::new()).unwrap();
        assert!(dataset.is_empty());
    }
}
