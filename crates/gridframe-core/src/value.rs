//! Dynamically typed cell values and column type tags

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// The closed set of column variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Float64,
    Int64,
    String,
    Time,
    Mixed,
    Complex,
    Generic,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Float64 => "float64",
            ColumnType::Int64 => "int64",
            ColumnType::String => "string",
            ColumnType::Time => "time",
            ColumnType::Mixed => "mixed",
            ColumnType::Complex => "complex128",
            ColumnType::Generic => "generic",
        };
        f.write_str(name)
    }
}

/// A single cell read from, or written to, any column
///
/// `Missing` is the uniform spelling of "no value" regardless of how the
/// column encodes it internally.
#[derive(Clone)]
pub enum Value {
    Missing,
    Float(f64),
    Int(i64),
    Str(String),
    Time(DateTime<Utc>),
    Complex(Complex64),
    Generic(Arc<dyn Any + Send + Sync>),
}

impl Value {
    /// Wrap an arbitrary value for a generic column
    pub fn generic<T: Any + Send + Sync>(value: T) -> Self {
        Value::Generic(Arc::new(value))
    }

    /// Check if this is the missing marker
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Name of the variant, used in error messages
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Missing => "missing",
            Value::Float(_) => "float64",
            Value::Int(_) => "int64",
            Value::Str(_) => "string",
            Value::Time(_) => "time",
            Value::Complex(_) => "complex128",
            Value::Generic(_) => "generic",
        }
    }

    /// Borrow the payload of a generic value as `T`
    #[must_use]
    pub fn as_generic<T: Any>(&self) -> Option<&T> {
        match self {
            Value::Generic(inner) => inner.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Coerce to a float; `Ok(None)` for missing
    ///
    /// # Errors
    /// Returns a description of why the value has no float form
    pub fn to_f64(&self) -> Result<Option<f64>, String> {
        match self {
            Value::Missing => Ok(None),
            Value::Float(f) if f.is_nan() => Ok(None),
            Value::Float(f) => Ok(Some(*f)),
            Value::Int(i) => Ok(Some(*i as f64)),
            Value::Str(s) => s
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|e| format!("cannot parse {s:?} as float64: {e}")),
            Value::Time(t) => Ok(Some(time_to_f64(t))),
            Value::Complex(c) if c.im == 0.0 => Ok(Some(c.re)),
            Value::Complex(c) => Err(format!("complex value {c} has an imaginary part")),
            Value::Generic(_) => Err("generic value has no float64 form".to_string()),
        }
    }

    /// Coerce to an integer; `Ok(None)` for missing
    ///
    /// Floats convert only when they hold a whole number.
    ///
    /// # Errors
    /// Returns a description of why the value has no integer form
    pub fn to_i64(&self) -> Result<Option<i64>, String> {
        match self {
            Value::Missing => Ok(None),
            Value::Int(i) => Ok(Some(*i)),
            Value::Float(f) if f.is_nan() => Ok(None),
            Value::Float(f) if f.fract() == 0.0 && f.abs() < 9.2e18 => Ok(Some(*f as i64)),
            Value::Float(f) => Err(format!("float {f} is not a whole number")),
            Value::Str(s) => s
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|e| format!("cannot parse {s:?} as int64: {e}")),
            Value::Time(t) => t
                .timestamp_nanos_opt()
                .map(Some)
                .ok_or_else(|| format!("time {t} is outside the int64 nanosecond range")),
            Value::Complex(c) => Err(format!("complex value {c} has no int64 form")),
            Value::Generic(_) => Err("generic value has no int64 form".to_string()),
        }
    }

    /// Text form of the value; `None` for missing
    #[must_use]
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Missing => None,
            other => Some(other.to_string()),
        }
    }
}

/// Seconds since the Unix epoch, with sub-second precision
pub(crate) fn time_to_f64(t: &DateTime<Utc>) -> f64 {
    t.timestamp() as f64 + f64::from(t.timestamp_subsec_nanos()) / 1e9
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Missing => f.write_str("NaN"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Str(v) => f.write_str(v),
            Value::Time(v) => f.write_str(&v.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Value::Complex(v) => write!(f, "{v}"),
            Value::Generic(_) => f.write_str("<generic>"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Missing => f.write_str("Missing"),
            Value::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Value::Int(v) => f.debug_tuple("Int").field(v).finish(),
            Value::Str(v) => f.debug_tuple("Str").field(v).finish(),
            Value::Time(v) => f.debug_tuple("Time").field(v).finish(),
            Value::Complex(v) => f.debug_tuple("Complex").field(v).finish(),
            Value::Generic(_) => f.write_str("Generic(..)"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Missing, Value::Missing) => true,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Time(a), Value::Time(b)) => a == b,
            (Value::Complex(a), Value::Complex(b)) => a == b,
            (Value::Generic(a), Value::Generic(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            _ => false,
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        if v.is_nan() {
            Value::Missing
        } else {
            Value::Float(v)
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Time(v)
    }
}

impl From<Complex64> for Value {
    fn from(v: Complex64) -> Self {
        if v.re.is_nan() || v.im.is_nan() {
            Value::Missing
        } else {
            Value::Complex(v)
        }
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Missing, Into::into)
    }
}
