//! Row views and row-shaped arguments for table mutation

use std::fmt;
use std::ops::Index;

use crate::value::Value;

/// Addresses a table column by name or by position
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnKey {
    Name(String),
    Index(usize),
}

impl From<&str> for ColumnKey {
    fn from(name: &str) -> Self {
        ColumnKey::Name(name.to_string())
    }
}

impl From<String> for ColumnKey {
    fn from(name: String) -> Self {
        ColumnKey::Name(name)
    }
}

impl From<usize> for ColumnKey {
    fn from(index: usize) -> Self {
        ColumnKey::Index(index)
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKey::Name(name) => write!(f, "'{name}'"),
            ColumnKey::Index(index) => write!(f, "#{index}"),
        }
    }
}

/// Values for one table row
///
/// `Positional` must hold exactly one value per column, in column order.
/// `Keyed` may name any subset of columns; the rest are left missing on
/// insert and unchanged on update.
#[derive(Debug, Clone, PartialEq)]
pub enum RowValues {
    Positional(Vec<Value>),
    Keyed(Vec<(ColumnKey, Value)>),
}

impl RowValues {
    /// Build a keyed row from `(key, value)` pairs
    pub fn keyed<K, V, I>(pairs: I) -> Self
    where
        K: Into<ColumnKey>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        RowValues::Keyed(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<Vec<Value>> for RowValues {
    fn from(values: Vec<Value>) -> Self {
        RowValues::Positional(values)
    }
}

/// A snapshot of one table row, addressable by column name or index
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    names: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    pub(crate) fn new(names: Vec<String>, values: Vec<Value>) -> Self {
        debug_assert_eq!(names.len(), values.len());
        Self { names, values }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Look up a value by column name or index
    pub fn get(&self, key: impl Into<ColumnKey>) -> Option<&Value> {
        match key.into() {
            ColumnKey::Index(index) => self.values.get(index),
            ColumnKey::Name(name) => self
                .names
                .iter()
                .position(|n| *n == name)
                .map(|index| &self.values[index]),
        }
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Iterate `(name, value)` pairs in column order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}

impl Index<usize> for Row {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        &self.values[index]
    }
}

impl Index<&str> for Row {
    type Output = Value;

    fn index(&self, name: &str) -> &Value {
        self.get(name)
            .unwrap_or_else(|| panic!("row has no column named '{name}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_lookup_by_name_and_index() {
        let row = Row::new(
            vec!["a".to_string(), "b".to_string()],
            vec![Value::Int(1), Value::Missing],
        );
        assert_eq!(row.get("a"), Some(&Value::Int(1)));
        assert_eq!(row.get(1_usize), Some(&Value::Missing));
        assert_eq!(row.get("c"), None);
        assert_eq!(row["b"], row[1]);
        assert_eq!(row.iter().count(), 2);
    }

    #[test]
    fn test_keyed_builder() {
        let values = RowValues::keyed([("x", 1.5), ("y", f64::NAN)]);
        assert_eq!(
            values,
            RowValues::Keyed(vec![
                (ColumnKey::from("x"), Value::Float(1.5)),
                (ColumnKey::from("y"), Value::Missing),
            ])
        );
    }
}
