//! Dataset representation for validation.
//!
//! A dataset is an ordered sequence of rows. Each row is an ordered mapping from
//! column name to a scalar [`DataValue`]. Rows are not required to carry every
//! column: a missing column reads as [`DataValue::Null`].

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::fmt;

/// A scalar value in a dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum DataValue {
    /// Null/missing value
    Null,
    /// String value
    String(String),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// Boolean value
    Bool(bool),
    /// Timestamp value (UTC)
    Timestamp(DateTime<Utc>),
}

static NULL: DataValue = DataValue::Null;

impl DataValue {
    /// Returns true if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, DataValue::Null)
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            DataValue::Null => "null",
            DataValue::String(_) => "string",
            DataValue::Int(_) => "int",
            DataValue::Float(_) => "float",
            DataValue::Bool(_) => "bool",
            DataValue::Timestamp(_) => "timestamp",
        }
    }

    /// Returns the [`ValueType`] of this value, or `None` for null.
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            DataValue::Null => None,
            DataValue::String(_) => Some(ValueType::String),
            DataValue::Int(_) => Some(ValueType::Int),
            DataValue::Float(_) => Some(ValueType::Float),
            DataValue::Bool(_) => Some(ValueType::Bool),
            DataValue::Timestamp(_) => Some(ValueType::Timestamp),
        }
    }

    /// Attempts to get this value as a string.
    pub fn as_string(&self) -> Option<&str> {
        match self {
            DataValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to get this value as an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            DataValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Attempts to get this value as a float. Integers are widened.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            DataValue::Float(f) => Some(*f),
            DataValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Attempts to get this value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DataValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to get this value as a timestamp.
    pub fn as_timestamp(&self) -> Option<&DateTime<Utc>> {
        match self {
            DataValue::Timestamp(ts) => Some(ts),
            _ => None,
        }
    }

    /// Canonical textual rendering, used for set membership and reports.
    pub fn render(&self) -> String {
        match self {
            DataValue::Null => "null".to_string(),
            DataValue::String(s) => s.clone(),
            DataValue::Int(i) => i.to_string(),
            DataValue::Float(f) => f.to_string(),
            DataValue::Bool(b) => b.to_string(),
            DataValue::Timestamp(ts) => ts.to_rfc3339(),
        }
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::String(s) => write!(f, "'{}'", s),
            other => f.write_str(&other.render()),
        }
    }
}

impl Serialize for DataValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DataValue::Null => serializer.serialize_none(),
            DataValue::String(s) => serializer.serialize_str(s),
            DataValue::Int(i) => serializer.serialize_i64(*i),
            DataValue::Float(f) => serializer.serialize_f64(*f),
            DataValue::Bool(b) => serializer.serialize_bool(*b),
            DataValue::Timestamp(ts) => serializer.serialize_str(&ts.to_rfc3339()),
        }
    }
}

impl From<String> for DataValue {
    fn from(s: String) -> Self {
        DataValue::String(s)
    }
}

impl From<&str> for DataValue {
    fn from(s: &str) -> Self {
        DataValue::String(s.to_string())
    }
}

impl From<i64> for DataValue {
    fn from(i: i64) -> Self {
        DataValue::Int(i)
    }
}

impl From<i32> for DataValue {
    fn from(i: i32) -> Self {
        DataValue::Int(i64::from(i))
    }
}

impl From<f64> for DataValue {
    fn from(f: f64) -> Self {
        DataValue::Float(f)
    }
}

impl From<bool> for DataValue {
    fn from(b: bool) -> Self {
        DataValue::Bool(b)
    }
}

impl From<DateTime<Utc>> for DataValue {
    fn from(ts: DateTime<Utc>) -> Self {
        DataValue::Timestamp(ts)
    }
}

impl<T: Into<DataValue>> From<Option<T>> for DataValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(DataValue::Null, Into::into)
    }
}

/// Declared type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Int,
    Float,
    Bool,
    Timestamp,
}

impl ValueType {
    /// Returns true if a non-null value satisfies this type.
    ///
    /// Integers are accepted where floats are expected.
    pub fn accepts(&self, value: &DataValue) -> bool {
        match self {
            ValueType::String => matches!(value, DataValue::String(_)),
            ValueType::Int => matches!(value, DataValue::Int(_)),
            ValueType::Float => matches!(value, DataValue::Float(_) | DataValue::Int(_)),
            ValueType::Bool => matches!(value, DataValue::Bool(_)),
            ValueType::Timestamp => matches!(value, DataValue::Timestamp(_)),
        }
    }

    /// Lowercase name as it appears in constraint files.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Bool => "bool",
            ValueType::Timestamp => "timestamp",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single row of data, keyed by column name in column order.
pub type DataRow = IndexMap<String, DataValue>;

/// Builds a [`DataRow`] from `(column, value)` pairs.
///
/// ```rust
/// use dq_core::{row, DataValue};
///
/// let r = row([("id", DataValue::Int(1)), ("name", "ada".into())]);
/// assert_eq!(r.len(), 2);
/// ```
pub fn row<K, V, I>(pairs: I) -> DataRow
where
    K: Into<String>,
    V: Into<DataValue>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// A dataset containing multiple rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    rows: Vec<DataRow>,
}

impl Dataset {
    /// Creates a new empty dataset.
    pub fn empty() -> Self {
        Self { rows: Vec::new() }
    }

    /// Creates a new dataset from rows.
    pub fn from_rows(rows: Vec<DataRow>) -> Self {
        Self { rows }
    }

    /// Returns the number of rows in the dataset.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns an iterator over the rows.
    pub fn rows(&self) -> impl Iterator<Item = &DataRow> {
        self.rows.iter()
    }

    /// Gets a specific row by index.
    pub fn get_row(&self, index: usize) -> Option<&DataRow> {
        self.rows.get(index)
    }

    /// Adds a row to the dataset.
    pub fn add_row(&mut self, row: DataRow) {
        self.rows.push(row);
    }

    /// Returns the value of `column` in row `index`.
    ///
    /// A missing row or column reads as [`DataValue::Null`].
    pub fn value(&self, index: usize, column: &str) -> &DataValue {
        self.rows
            .get(index)
            .and_then(|row| row.get(column))
            .unwrap_or(&NULL)
    }

    /// Iterates over one column as `(row_index, value)` pairs, in row order.
    pub fn column<'a>(&'a self, column: &'a str) -> impl Iterator<Item = (usize, &'a DataValue)> {
        self.rows
            .iter()
            .enumerate()
            .map(move |(idx, row)| (idx, row.get(column).unwrap_or(&NULL)))
    }

    /// Returns the ordered union of column names across all rows.
    pub fn columns(&self) -> Vec<String> {
        let mut seen: IndexMap<&str, ()> = IndexMap::new();
        for row in &self.rows {
            for key in row.keys() {
                seen.entry(key.as_str()).or_insert(());
            }
        }
        seen.into_keys().map(str::to_string).collect()
    }

    /// Returns the number of distinct columns across all rows.
    pub fn column_count(&self) -> usize {
        self.columns().len()
    }

    /// Splits the dataset into chunks of at most `size` rows.
    ///
    /// Each item carries the index of its first row in this dataset, suitable
    /// as a row offset when validating chunks independently.
    pub fn chunks(&self, size: usize) -> impl Iterator<Item = (usize, Dataset)> + '_ {
        let size = size.max(1);
        self.rows
            .chunks(size)
            .enumerate()
            .map(move |(i, rows)| (i * size, Dataset::from_rows(rows.to_vec())))
    }
}

impl FromIterator<DataRow> for Dataset {
    fn from_iter<T: IntoIterator<Item = DataRow>>(iter: T) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}
