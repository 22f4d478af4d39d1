//! Columns: named, typed, variable-length sequences of values
//!
//! Every variant implements [`Column`], the capability set the table and the
//! pipelines work through. Variants that can compare their values also
//! implement [`OrderedColumn`], which search and sorting need.

use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cancel::CancellationToken;
use crate::error::DataResult;
use crate::range::Range;
use crate::value::{ColumnType, Value};

mod cells;
mod element;
mod generic;
mod typed;

pub use cells::Cell;
pub use element::{
    ComplexKind, Element, Float64Kind, Int64Kind, MixedKind, StringKind, TimeKind,
};
pub use generic::{Comparator, GenericColumn, OrderedGenericColumn};
pub use typed::TypedColumn;

/// Floats; NaN doubles as the missing marker
pub type Float64Column = TypedColumn<Float64Kind>;
/// Integers with explicit absence
pub type Int64Column = TypedColumn<Int64Kind>;
/// Strings with explicit absence
pub type StringColumn = TypedColumn<StringKind>;
/// UTC timestamps with explicit absence
pub type TimeColumn = TypedColumn<TimeKind>;
/// Mixed numeric input stored as floats
pub type MixedColumn = TypedColumn<MixedKind>;
/// Complex numbers; NaN parts are missing
pub type ComplexColumn = TypedColumn<ComplexKind>;

/// Replaceable per-column renderer used by `value_as_string`
pub type Formatter = Arc<dyn Fn(&Value) -> String + Send + Sync>;

/// Row predicate built by [`OrderedColumn::row_matcher`]
pub type RowMatcher<'a> = Box<dyn Fn(usize) -> bool + Send + Sync + 'a>;

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// The capability set shared by every column variant
///
/// Row indices are contiguous in `[0, row_count)`. Reading or writing a row
/// outside that interval is a programmer error and panics. Writing a value
/// of the wrong type is a data error and returns `TypeMismatch` without
/// touching the column.
pub trait Column: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    fn rename(&mut self, name: &str);

    fn column_type(&self) -> ColumnType;

    fn row_count(&self) -> usize;

    /// Cached number of missing rows
    fn nil_count(&self) -> usize;

    /// Missing rows within `range`; `stop_at_one` turns this into an
    /// existence check that returns 0 or 1. An empty column has no rows to
    /// count and returns `RangeUndefined` for every range.
    fn nil_count_in(
        &self,
        range: &Range,
        stop_at_one: bool,
        token: &CancellationToken,
    ) -> DataResult<usize>;

    fn is_missing(&self, row: usize) -> bool;

    fn value(&self, row: usize) -> Value;

    /// Render a row through the column's formatter
    ///
    /// The default formatter renders missing as `NaN`.
    fn value_as_string(&self, row: usize) -> String;

    /// Replace the formatter; `None` restores the default
    fn set_formatter(&mut self, formatter: Option<Formatter>);

    /// Whether `value` could be stored in this column
    fn check(&self, value: &Value) -> DataResult<()>;

    fn prepend(&mut self, value: Value) -> DataResult<()> {
        self.insert(0, value)
    }

    fn append(&mut self, value: Value) -> DataResult<()>;

    /// Insert before `row`, shifting it and every later row up by one.
    /// `row == row_count()` appends.
    fn insert(&mut self, row: usize, value: Value) -> DataResult<()>;

    fn update(&mut self, row: usize, value: Value) -> DataResult<()>;

    /// Delete `row`, shifting every later row down by one
    fn remove(&mut self, row: usize);

    fn swap(&mut self, a: usize, b: usize);

    /// Rearrange so that new row `i` holds old row `order[i]`
    fn reorder(&mut self, order: &[usize]);

    /// Remove every row
    fn reset(&mut self);

    /// An empty column of the same variant, name and formatter
    fn empty_like(&self, capacity: usize) -> Box<dyn Column>;

    fn clone_box(&self) -> Box<dyn Column>;

    /// Downcasting hook for typed access to a column held as `dyn Column`
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// The ordering capability, if this variant has one
    fn as_ordered(&self) -> Option<&dyn OrderedColumn> {
        None
    }

    fn as_ordered_mut(&mut self) -> Option<&mut dyn OrderedColumn> {
        None
    }
}

impl Clone for Box<dyn Column> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Columns whose values have a total order
///
/// Missing compares equal to missing and less than any present value.
pub trait OrderedColumn: Column {
    fn compare_rows(&self, a: usize, b: usize) -> Ordering;

    /// Compare a row against a value of the column's type
    fn compare(&self, row: usize, value: &Value) -> DataResult<Ordering>;

    fn is_equal(&self, row: usize, value: &Value) -> DataResult<bool> {
        Ok(self.compare(row, value)? == Ordering::Equal)
    }

    fn is_less_than(&self, row: usize, value: &Value) -> DataResult<bool> {
        Ok(self.compare(row, value)? == Ordering::Less)
    }

    /// Predicate for `lower <= row <= upper`, or `row == lower` when both
    /// bounds are equal. Bounds are converted once, up front.
    fn row_matcher(&self, lower: &Value, upper: &Value) -> DataResult<RowMatcher<'_>>;

    fn sort(&mut self, order: SortOrder, stable: bool);
}

/// Default rendering: missing is `NaN`
pub(crate) fn render(
    formatter: Option<&Formatter>,
    value: &Value,
    present: impl FnOnce() -> String,
) -> String {
    match (formatter, value) {
        (Some(f), _) => f(value),
        (None, Value::Missing) => "NaN".to_string(),
        (None, _) => present(),
    }
}
