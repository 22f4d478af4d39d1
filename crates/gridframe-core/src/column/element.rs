//! Element kinds: how each built-in column variant stores, converts,
//! formats and orders its cells

use std::cmp::Ordering;

use chrono::{DateTime, SecondsFormat, Utc};
use num_complex::Complex64;

use super::cells::Cell;
use crate::error::{DataError, DataResult};
use crate::value::{time_to_f64, ColumnType, Value};

mod sealed {
    pub trait Sealed {}
}

/// The data kind behind a [`TypedColumn`](super::TypedColumn)
///
/// Sealed: the set of built-in variants is closed so every `ColumnType`
/// match stays exhaustive.
pub trait Element: sealed::Sealed + Send + Sync + 'static {
    /// Stored representation, including its missing encoding
    type Cell: Cell;

    /// Type tag reported by the column
    const TYPE: ColumnType;

    /// Read a cell as a dynamic value
    fn to_value(cell: &Self::Cell) -> Value;

    /// Accept a dynamic value for storage
    ///
    /// # Errors
    /// Returns `TypeMismatch` when the value does not fit this kind
    fn from_value(value: &Value) -> DataResult<Self::Cell>;

    /// Default rendering of a present cell
    fn format(cell: &Self::Cell) -> String;

    /// Order two present cells
    fn compare(a: &Self::Cell, b: &Self::Cell) -> Ordering;
}

/// IEEE-754 floats; NaN is missing
#[derive(Debug)]
pub enum Float64Kind {}

/// 64-bit integers with an explicit absence marker
#[derive(Debug)]
pub enum Int64Kind {}

/// UTF-8 strings with an explicit absence marker
#[derive(Debug)]
pub enum StringKind {}

/// UTC timestamps with an explicit absence marker
#[derive(Debug)]
pub enum TimeKind {}

/// Heterogeneous numeric-like input flattened to floats; NaN is missing
#[derive(Debug)]
pub enum MixedKind {}

/// Complex numbers; a NaN in either part is missing
#[derive(Debug)]
pub enum ComplexKind {}

impl sealed::Sealed for Float64Kind {}
impl sealed::Sealed for Int64Kind {}
impl sealed::Sealed for StringKind {}
impl sealed::Sealed for TimeKind {}
impl sealed::Sealed for MixedKind {}
impl sealed::Sealed for ComplexKind {}

impl Element for Float64Kind {
    type Cell = f64;
    const TYPE: ColumnType = ColumnType::Float64;

    fn to_value(cell: &f64) -> Value {
        Value::from(*cell)
    }

    fn from_value(value: &Value) -> DataResult<f64> {
        match value {
            Value::Missing => Ok(f64::NAN),
            Value::Float(f) => Ok(*f),
            // Allow int -> float coercion
            Value::Int(i) => Ok(*i as f64),
            other => Err(DataError::mismatch(Self::TYPE, other.type_name())),
        }
    }

    fn format(cell: &f64) -> String {
        cell.to_string()
    }

    fn compare(a: &f64, b: &f64) -> Ordering {
        a.total_cmp(b)
    }
}

impl Element for Int64Kind {
    type Cell = Option<i64>;
    const TYPE: ColumnType = ColumnType::Int64;

    fn to_value(cell: &Option<i64>) -> Value {
        cell.map_or(Value::Missing, Value::Int)
    }

    fn from_value(value: &Value) -> DataResult<Option<i64>> {
        match value {
            Value::Missing => Ok(None),
            Value::Int(i) => Ok(Some(*i)),
            other => Err(DataError::mismatch(Self::TYPE, other.type_name())),
        }
    }

    fn format(cell: &Option<i64>) -> String {
        cell.map(|v| v.to_string()).unwrap_or_default()
    }

    fn compare(a: &Option<i64>, b: &Option<i64>) -> Ordering {
        a.cmp(b)
    }
}

impl Element for StringKind {
    type Cell = Option<String>;
    const TYPE: ColumnType = ColumnType::String;

    fn to_value(cell: &Option<String>) -> Value {
        cell.clone().map_or(Value::Missing, Value::Str)
    }

    fn from_value(value: &Value) -> DataResult<Option<String>> {
        match value {
            Value::Missing => Ok(None),
            Value::Str(s) => Ok(Some(s.clone())),
            other => Err(DataError::mismatch(Self::TYPE, other.type_name())),
        }
    }

    fn format(cell: &Option<String>) -> String {
        cell.clone().unwrap_or_default()
    }

    fn compare(a: &Option<String>, b: &Option<String>) -> Ordering {
        a.cmp(b)
    }
}

impl Element for TimeKind {
    type Cell = Option<DateTime<Utc>>;
    const TYPE: ColumnType = ColumnType::Time;

    fn to_value(cell: &Option<DateTime<Utc>>) -> Value {
        cell.map_or(Value::Missing, Value::Time)
    }

    fn from_value(value: &Value) -> DataResult<Option<DateTime<Utc>>> {
        match value {
            Value::Missing => Ok(None),
            Value::Time(t) => Ok(Some(*t)),
            other => Err(DataError::mismatch(Self::TYPE, other.type_name())),
        }
    }

    fn format(cell: &Option<DateTime<Utc>>) -> String {
        cell.map(|t| t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            .unwrap_or_default()
    }

    fn compare(a: &Option<DateTime<Utc>>, b: &Option<DateTime<Utc>>) -> Ordering {
        a.cmp(b)
    }
}

impl Element for MixedKind {
    type Cell = f64;
    const TYPE: ColumnType = ColumnType::Mixed;

    fn to_value(cell: &f64) -> Value {
        Value::from(*cell)
    }

    fn from_value(value: &Value) -> DataResult<f64> {
        match value {
            Value::Time(t) => Ok(time_to_f64(t)),
            other => other
                .to_f64()
                .map(|v| v.unwrap_or(f64::NAN))
                .map_err(|_| DataError::mismatch(Self::TYPE, other.type_name())),
        }
    }

    fn format(cell: &f64) -> String {
        cell.to_string()
    }

    fn compare(a: &f64, b: &f64) -> Ordering {
        a.total_cmp(b)
    }
}

impl Element for ComplexKind {
    type Cell = Complex64;
    const TYPE: ColumnType = ColumnType::Complex;

    fn to_value(cell: &Complex64) -> Value {
        Value::from(*cell)
    }

    fn from_value(value: &Value) -> DataResult<Complex64> {
        match value {
            Value::Missing => Ok(Complex64::missing()),
            Value::Complex(c) => Ok(*c),
            Value::Float(f) => Ok(Complex64::new(*f, 0.0)),
            Value::Int(i) => Ok(Complex64::new(*i as f64, 0.0)),
            other => Err(DataError::mismatch(Self::TYPE, other.type_name())),
        }
    }

    fn format(cell: &Complex64) -> String {
        cell.to_string()
    }

    /// Real part first, then imaginary part
    fn compare(a: &Complex64, b: &Complex64) -> Ordering {
        a.re.total_cmp(&b.re).then_with(|| a.im.total_cmp(&b.im))
    }
}
