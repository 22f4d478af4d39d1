//! Error types for column, table and pipeline operations

use std::fmt;

use thiserror::Error;

/// Result type for data operations
pub type DataResult<T> = Result<T, DataError>;

/// Errors that can occur during data operations
///
/// Programmer errors (mismatched row counts, duplicate names, out-of-range
/// rows) are not represented here: they panic at the call site.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    /// The caller's cancellation token fired
    #[error("operation cancelled")]
    Cancelled,

    /// A search was cancelled; the rows matched before the check point are kept
    #[error("search cancelled after {} matches", partial.len())]
    SearchCancelled { partial: Vec<usize> },

    /// A range was resolved against an empty column or table
    #[error("range undefined for zero-length data")]
    RangeUndefined,

    /// A range whose bounds are inconsistent with the length
    #[error("invalid range [{start:?}, {end:?}] for length {length}")]
    InvalidRange {
        start: Option<i64>,
        end: Option<i64>,
        length: usize,
    },

    /// Column not found in a table
    #[error("column not found: {0}")]
    ColumnNotFound(String),

    /// Invalid column index
    #[error("invalid column index: {0}")]
    InvalidColumnIndex(usize),

    /// A value does not fit the column it was written to
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// A single row failed to convert
    #[error("row {row}: {message}")]
    Conversion { row: usize, message: String },

    /// Several independent failures from one batch operation
    #[error("{0}")]
    Collection(ErrorCollection),

    /// Invalid operation for the column or table
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// I/O error (file read/write)
    #[error("I/O error: {0}")]
    Io(String),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(String),

    /// Arrow error (from arrow-rs)
    #[error("Arrow error: {0}")]
    Arrow(String),

    /// Configuration could not be parsed
    #[error("configuration error: {0}")]
    Config(String),
}

impl DataError {
    /// Check whether this error (or any member of a collection) is a cancellation
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        match self {
            DataError::Cancelled | DataError::SearchCancelled { .. } => true,
            DataError::Collection(errors) => errors.is(DataError::is_cancelled),
            _ => false,
        }
    }

    /// Build a type mismatch error from display-able type names
    pub(crate) fn mismatch(expected: impl fmt::Display, found: impl fmt::Display) -> Self {
        DataError::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}

impl From<std::io::Error> for DataError {
    fn from(err: std::io::Error) -> Self {
        DataError::Io(err.to_string())
    }
}

impl From<arrow::error::ArrowError> for DataError {
    fn from(err: arrow::error::ArrowError) -> Self {
        DataError::Arrow(err.to_string())
    }
}

impl From<toml::de::Error> for DataError {
    fn from(err: toml::de::Error) -> Self {
        DataError::Config(err.to_string())
    }
}

impl From<ErrorCollection> for DataError {
    fn from(errors: ErrorCollection) -> Self {
        DataError::Collection(errors)
    }
}

/// An ordered accumulation of independent errors
///
/// An empty collection means "no error": [`ErrorCollection::into_result`]
/// turns it into `Ok(())`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorCollection {
    errors: Vec<DataError>,
}

impl ErrorCollection {
    /// Create an empty collection
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record another failure
    pub fn push(&mut self, err: DataError) {
        self.errors.push(err);
    }

    /// Record a failure tagged with the row it happened on
    pub fn push_row(&mut self, row: usize, message: impl Into<String>) {
        self.errors.push(DataError::Conversion {
            row,
            message: message.into(),
        });
    }

    /// Number of accumulated errors
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Whether nothing has failed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterate the accumulated errors in the order they were recorded
    pub fn iter(&self) -> std::slice::Iter<'_, DataError> {
        self.errors.iter()
    }

    /// Sentinel matching: true if any member satisfies `pred`
    pub fn is(&self, pred: impl Fn(&DataError) -> bool) -> bool {
        self.errors.iter().any(pred)
    }

    /// Typed extraction: the first member `f` maps to `Some`
    pub fn find_map<'a, T>(&'a self, f: impl FnMut(&'a DataError) -> Option<T>) -> Option<T> {
        self.errors.iter().find_map(f)
    }

    /// Rows that failed, in recording order
    pub fn rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.errors.iter().filter_map(|err| match err {
            DataError::Conversion { row, .. } => Some(*row),
            _ => None,
        })
    }

    /// `Ok(())` when empty, otherwise the collection as an error
    pub fn into_result(self) -> DataResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DataError::Collection(self))
        }
    }
}

impl fmt::Display for ErrorCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.len() {
            0 => write!(f, "no errors"),
            1 => write!(f, "{}", self.errors[0]),
            n => {
                write!(f, "{n} errors occurred:")?;
                for err in &self.errors {
                    write!(f, "\n\t* {err}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ErrorCollection {}

impl Extend<DataError> for ErrorCollection {
    fn extend<I: IntoIterator<Item = DataError>>(&mut self, iter: I) {
        self.errors.extend(iter);
    }
}

impl IntoIterator for ErrorCollection {
    type Item = DataError;
    type IntoIter = std::vec::IntoIter<DataError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ErrorCollection {
    type Item = &'a DataError;
    type IntoIter = std::slice::Iter<'a, DataError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DataError::ColumnNotFound("age".to_string());
        assert_eq!(err.to_string(), "column not found: age");

        let err = DataError::mismatch("Int64", "String");
        assert_eq!(err.to_string(), "type mismatch: expected Int64, found String");
    }

    #[test]
    fn test_empty_collection_is_ok() {
        let errors = ErrorCollection::new();
        assert!(errors.is_empty());
        assert!(errors.into_result().is_ok());
    }

    #[test]
    fn test_collection_matching() {
        let mut errors = ErrorCollection::new();
        errors.push_row(3, "not a number");
        errors.push(DataError::Cancelled);

        assert_eq!(errors.len(), 2);
        assert!(errors.is(|e| matches!(e, DataError::Cancelled)));
        assert!(!errors.is(|e| matches!(e, DataError::RangeUndefined)));
        assert_eq!(errors.rows().collect::<Vec<_>>(), vec![3]);

        let row = errors.find_map(|e| match e {
            DataError::Conversion { row, .. } => Some(*row),
            _ => None,
        });
        assert_eq!(row, Some(3));

        let err = errors.into_result().unwrap_err();
        assert!(err.is_cancelled());
        assert!(err.to_string().starts_with("2 errors occurred:"));
    }
}
