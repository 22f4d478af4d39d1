//! The generic column behind every built-in variant

use std::any::Any;
use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use num_complex::Complex64;

use super::cells::{compare_cells, Cell, Cells};
use super::element::{
    ComplexKind, Element, Float64Kind, Int64Kind, MixedKind, StringKind, TimeKind,
};
use super::{render, Column, Formatter, OrderedColumn, RowMatcher, SortOrder};
use crate::cancel::CancellationToken;
use crate::error::DataResult;
use crate::range::Range;
use crate::value::{ColumnType, Value};

/// A named column of `E` cells with a cached missing count
pub struct TypedColumn<E: Element> {
    name: String,
    cells: Cells<E::Cell>,
    formatter: Option<Formatter>,
}

impl<E: Element> TypedColumn<E> {
    /// Create an empty column
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_capacity(name, 0)
    }

    /// Create an empty column with room for `capacity` rows
    #[must_use]
    pub fn with_capacity(name: impl Into<String>, capacity: usize) -> Self {
        Self {
            name: name.into(),
            cells: Cells::with_capacity(capacity),
            formatter: None,
        }
    }

    /// Create a column of `len` missing rows
    #[must_use]
    pub fn missing(name: impl Into<String>, len: usize) -> Self {
        Self {
            name: name.into(),
            cells: Cells::missing(len),
            formatter: None,
        }
    }

    /// Create a column from stored cells
    #[must_use]
    pub fn from_cells(name: impl Into<String>, cells: Vec<E::Cell>) -> Self {
        Self {
            name: name.into(),
            cells: Cells::from_vec(cells),
            formatter: None,
        }
    }

    /// Create a column from dynamic values
    ///
    /// # Errors
    /// Returns `TypeMismatch` on the first value this variant cannot store
    pub fn from_dynamic(name: impl Into<String>, values: &[Value]) -> DataResult<Self> {
        let cells = values
            .iter()
            .map(E::from_value)
            .collect::<DataResult<Vec<_>>>()?;
        Ok(Self::from_cells(name, cells))
    }

    /// The stored cells, missing encoding included
    #[must_use]
    pub fn cells(&self) -> &[E::Cell] {
        self.cells.as_slice()
    }

    /// Borrow one stored cell
    #[must_use]
    pub fn cell(&self, row: usize) -> &E::Cell {
        self.cells.get(row)
    }

    /// Append a stored cell
    pub fn push(&mut self, cell: E::Cell) {
        self.cells.push(cell);
    }

    /// Overwrite a stored cell, returning the previous one
    pub fn set(&mut self, row: usize, cell: E::Cell) -> E::Cell {
        self.cells.update(row, cell)
    }

    /// Check if the column has no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.len() == 0
    }

    /// An empty column with the same name and formatter
    #[must_use]
    pub fn cleared(&self, capacity: usize) -> Self {
        Self {
            name: self.name.clone(),
            cells: Cells::with_capacity(capacity),
            formatter: self.formatter.clone(),
        }
    }

    fn compare_cell(&self, row: usize, other: &E::Cell) -> Ordering {
        compare_cells(self.cells.get(row), other, E::compare)
    }
}

impl<E: Element<Cell = f64>> TypedColumn<E> {
    /// The raw floats, NaN for missing
    #[must_use]
    pub fn values(&self) -> &[f64] {
        self.cells.as_slice()
    }
}

macro_rules! float_constructors {
    ($($kind:ty),*) => {$(
        impl TypedColumn<$kind> {
            /// Create a column from raw floats; NaN entries are missing
            #[must_use]
            pub fn from_values(name: impl Into<String>, values: Vec<f64>) -> Self {
                Self::from_cells(name, values)
            }

            /// A present value, or `None` for missing
            #[must_use]
            pub fn get(&self, row: usize) -> Option<f64> {
                let v = *self.cells.get(row);
                (!v.is_nan()).then_some(v)
            }
        }
    )*};
}

float_constructors!(Float64Kind, MixedKind);

impl TypedColumn<Int64Kind> {
    /// Create a column with no missing values
    #[must_use]
    pub fn from_values(name: impl Into<String>, values: Vec<i64>) -> Self {
        Self::from_cells(name, values.into_iter().map(Some).collect())
    }

    /// Create a column where `None` marks missing
    #[must_use]
    pub fn from_options(name: impl Into<String>, values: Vec<Option<i64>>) -> Self {
        Self::from_cells(name, values)
    }

    #[must_use]
    pub fn get(&self, row: usize) -> Option<i64> {
        *self.cells.get(row)
    }
}

impl TypedColumn<StringKind> {
    /// Create a column with no missing values
    #[must_use]
    pub fn from_values<S: Into<String>>(name: impl Into<String>, values: Vec<S>) -> Self {
        Self::from_cells(name, values.into_iter().map(|s| Some(s.into())).collect())
    }

    /// Create a column where `None` marks missing
    #[must_use]
    pub fn from_options(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self::from_cells(name, values)
    }

    #[must_use]
    pub fn get(&self, row: usize) -> Option<&str> {
        self.cells.get(row).as_deref()
    }
}

impl TypedColumn<TimeKind> {
    /// Create a column with no missing values
    #[must_use]
    pub fn from_values(name: impl Into<String>, values: Vec<DateTime<Utc>>) -> Self {
        Self::from_cells(name, values.into_iter().map(Some).collect())
    }

    /// Create a column where `None` marks missing
    #[must_use]
    pub fn from_options(name: impl Into<String>, values: Vec<Option<DateTime<Utc>>>) -> Self {
        Self::from_cells(name, values)
    }

    #[must_use]
    pub fn get(&self, row: usize) -> Option<DateTime<Utc>> {
        *self.cells.get(row)
    }
}

impl TypedColumn<ComplexKind> {
    /// Create a column from complex numbers; a NaN part marks missing
    #[must_use]
    pub fn from_values(name: impl Into<String>, values: Vec<Complex64>) -> Self {
        Self::from_cells(name, values)
    }

    #[must_use]
    pub fn get(&self, row: usize) -> Option<Complex64> {
        let v = *self.cells.get(row);
        (!v.is_missing()).then_some(v)
    }
}

impl<E: Element> Clone for TypedColumn<E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            cells: self.cells.clone(),
            formatter: self.formatter.clone(),
        }
    }
}

impl<E: Element> fmt::Debug for TypedColumn<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedColumn")
            .field("name", &self.name)
            .field("type", &E::TYPE)
            .field("cells", &self.cells.as_slice())
            .field("nil_count", &self.cells.nil_count())
            .finish_non_exhaustive()
    }
}

/// Columns compare by name, type and content; missing equals missing
impl<E: Element> PartialEq for TypedColumn<E> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.cells.len() == other.cells.len()
            && self
                .cells
                .as_slice()
                .iter()
                .zip(other.cells.as_slice())
                .all(|(a, b)| compare_cells(a, b, E::compare) == Ordering::Equal)
    }
}

impl<E: Element> Column for TypedColumn<E> {
    fn name(&self) -> &str {
        &self.name
    }

    fn rename(&mut self, name: &str) {
        self.name = name.to_string();
    }

    fn column_type(&self) -> ColumnType {
        E::TYPE
    }

    fn row_count(&self) -> usize {
        self.cells.len()
    }

    fn nil_count(&self) -> usize {
        self.cells.nil_count()
    }

    fn nil_count_in(
        &self,
        range: &Range,
        stop_at_one: bool,
        token: &CancellationToken,
    ) -> DataResult<usize> {
        self.cells.nil_count_in(range, stop_at_one, token)
    }

    fn is_missing(&self, row: usize) -> bool {
        self.cells.get(row).is_missing()
    }

    fn value(&self, row: usize) -> Value {
        E::to_value(self.cells.get(row))
    }

    fn value_as_string(&self, row: usize) -> String {
        let cell = self.cells.get(row);
        render(self.formatter.as_ref(), &E::to_value(cell), || E::format(cell))
    }

    fn set_formatter(&mut self, formatter: Option<Formatter>) {
        self.formatter = formatter;
    }

    fn check(&self, value: &Value) -> DataResult<()> {
        E::from_value(value).map(|_| ())
    }

    fn append(&mut self, value: Value) -> DataResult<()> {
        let cell = E::from_value(&value)?;
        self.cells.push(cell);
        Ok(())
    }

    fn insert(&mut self, row: usize, value: Value) -> DataResult<()> {
        let cell = E::from_value(&value)?;
        self.cells.insert(row, cell);
        Ok(())
    }

    fn update(&mut self, row: usize, value: Value) -> DataResult<()> {
        let cell = E::from_value(&value)?;
        self.cells.update(row, cell);
        Ok(())
    }

    fn remove(&mut self, row: usize) {
        self.cells.remove(row);
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.cells.swap(a, b);
    }

    fn reorder(&mut self, order: &[usize]) {
        self.cells.reorder(order);
    }

    fn reset(&mut self) {
        self.cells.clear();
    }

    fn empty_like(&self, capacity: usize) -> Box<dyn Column> {
        Box::new(self.cleared(capacity))
    }

    fn clone_box(&self) -> Box<dyn Column> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn as_ordered(&self) -> Option<&dyn OrderedColumn> {
        Some(self)
    }

    fn as_ordered_mut(&mut self) -> Option<&mut dyn OrderedColumn> {
        Some(self)
    }
}

impl<E: Element> OrderedColumn for TypedColumn<E> {
    fn compare_rows(&self, a: usize, b: usize) -> Ordering {
        self.compare_cell(a, self.cells.get(b))
    }

    fn compare(&self, row: usize, value: &Value) -> DataResult<Ordering> {
        let other = E::from_value(value)?;
        Ok(self.compare_cell(row, &other))
    }

    fn row_matcher(&self, lower: &Value, upper: &Value) -> DataResult<RowMatcher<'_>> {
        let lower = E::from_value(lower)?;
        let upper = E::from_value(upper)?;

        if compare_cells(&lower, &upper, E::compare) == Ordering::Equal {
            return Ok(Box::new(move |row| {
                self.compare_cell(row, &lower) == Ordering::Equal
            }));
        }

        Ok(Box::new(move |row| {
            self.compare_cell(row, &lower) != Ordering::Less
                && self.compare_cell(row, &upper) != Ordering::Greater
        }))
    }

    fn sort(&mut self, order: SortOrder, stable: bool) {
        self.cells.sort_by(order, stable, E::compare);
    }
}
