//! Columns of caller-declared types
//!
//! [`GenericColumn`] only stores values and never compares them.
//! [`OrderedGenericColumn`] receives its ordering when it is built, so every
//! comparison-dependent operation is available from the start.

use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use super::cells::{compare_cells, Cells};
use super::{render, Column, Formatter, OrderedColumn, RowMatcher, SortOrder};
use crate::cancel::CancellationToken;
use crate::error::{DataError, DataResult};
use crate::range::Range;
use crate::value::{ColumnType, Value};

/// Ordering used by [`OrderedGenericColumn`]
pub type Comparator<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// Storage-only column of opaque `T` values
pub struct GenericColumn<T> {
    name: String,
    cells: Cells<Option<T>>,
    formatter: Option<Formatter>,
}

impl<T> GenericColumn<T>
where
    T: Clone + fmt::Debug + Send + Sync + 'static,
{
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_capacity(name, 0)
    }

    #[must_use]
    pub fn with_capacity(name: impl Into<String>, capacity: usize) -> Self {
        Self {
            name: name.into(),
            cells: Cells::with_capacity(capacity),
            formatter: None,
        }
    }

    /// Create a column where `None` marks missing
    #[must_use]
    pub fn from_options(name: impl Into<String>, values: Vec<Option<T>>) -> Self {
        Self {
            name: name.into(),
            cells: Cells::from_vec(values),
            formatter: None,
        }
    }

    #[must_use]
    pub fn from_values(name: impl Into<String>, values: Vec<T>) -> Self {
        Self::from_options(name, values.into_iter().map(Some).collect())
    }

    #[must_use]
    pub fn get(&self, row: usize) -> Option<&T> {
        self.cells.get(row).as_ref()
    }

    pub fn push(&mut self, value: Option<T>) {
        self.cells.push(value);
    }

    /// Attach an ordering, enabling sort and search
    #[must_use]
    pub fn with_ordering<F>(self, cmp: F) -> OrderedGenericColumn<T>
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        OrderedGenericColumn {
            inner: self,
            cmp: Arc::new(cmp),
        }
    }

    fn accept(value: &Value) -> DataResult<Option<T>> {
        match value {
            Value::Missing => Ok(None),
            Value::Generic(_) => value.as_generic::<T>().cloned().map(Some).ok_or_else(|| {
                DataError::mismatch(std::any::type_name::<T>(), "generic of another type")
            }),
            other => Err(DataError::mismatch(
                std::any::type_name::<T>(),
                other.type_name(),
            )),
        }
    }
}

impl<T: Clone> Clone for GenericColumn<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            cells: self.cells.clone(),
            formatter: self.formatter.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for GenericColumn<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericColumn")
            .field("name", &self.name)
            .field("cells", &self.cells)
            .finish_non_exhaustive()
    }
}

impl<T> Column for GenericColumn<T>
where
    T: Clone + fmt::Debug + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn rename(&mut self, name: &str) {
        self.name = name.to_string();
    }

    fn column_type(&self) -> ColumnType {
        ColumnType::Generic
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
        self.cells.get(row).is_none()
    }

    fn value(&self, row: usize) -> Value {
        self.cells
            .get(row)
            .clone()
            .map_or(Value::Missing, Value::generic)
    }

    fn value_as_string(&self, row: usize) -> String {
        let cell = self.cells.get(row);
        render(self.formatter.as_ref(), &self.value(row), || {
            cell.as_ref().map(|v| format!("{v:?}")).unwrap_or_default()
        })
    }

    fn set_formatter(&mut self, formatter: Option<Formatter>) {
        self.formatter = formatter;
    }

    fn check(&self, value: &Value) -> DataResult<()> {
        Self::accept(value).map(|_| ())
    }

    fn append(&mut self, value: Value) -> DataResult<()> {
        let cell = Self::accept(&value)?;
        self.cells.push(cell);
        Ok(())
    }

    fn insert(&mut self, row: usize, value: Value) -> DataResult<()> {
        let cell = Self::accept(&value)?;
        self.cells.insert(row, cell);
        Ok(())
    }

    fn update(&mut self, row: usize, value: Value) -> DataResult<()> {
        let cell = Self::accept(&value)?;
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
        let mut empty = Self::with_capacity(self.name.clone(), capacity);
        empty.formatter = self.formatter.clone();
        Box::new(empty)
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
}

/// Generic column with an ordering supplied at construction
pub struct OrderedGenericColumn<T> {
    inner: GenericColumn<T>,
    cmp: Comparator<T>,
}

impl<T> OrderedGenericColumn<T>
where
    T: Clone + fmt::Debug + Send + Sync + 'static,
{
    #[must_use]
    pub fn new<F>(name: impl Into<String>, cmp: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        GenericColumn::new(name).with_ordering(cmp)
    }

    /// Drop the ordering, keeping the stored values
    #[must_use]
    pub fn into_storage(self) -> GenericColumn<T> {
        self.inner
    }

    #[must_use]
    pub fn get(&self, row: usize) -> Option<&T> {
        self.inner.get(row)
    }

    pub fn push(&mut self, value: Option<T>) {
        self.inner.push(value);
    }

    fn compare_cell(&self, row: usize, other: &Option<T>) -> Ordering {
        compare_cells(self.inner.cells.get(row), other, |a, b| match (a, b) {
            (Some(a), Some(b)) => (self.cmp)(a, b),
            _ => Ordering::Equal,
        })
    }
}

impl<T> OrderedGenericColumn<T>
where
    T: Clone + fmt::Debug + Ord + Send + Sync + 'static,
{
    /// Order by `T`'s own `Ord`
    #[must_use]
    pub fn natural(column: GenericColumn<T>) -> Self {
        column.with_ordering(T::cmp)
    }
}

impl<T: Clone> Clone for OrderedGenericColumn<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            cmp: Arc::clone(&self.cmp),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for OrderedGenericColumn<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderedGenericColumn")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl<T> Column for OrderedGenericColumn<T>
where
    T: Clone + fmt::Debug + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn rename(&mut self, name: &str) {
        self.inner.rename(name);
    }

    fn column_type(&self) -> ColumnType {
        ColumnType::Generic
    }

    fn row_count(&self) -> usize {
        self.inner.row_count()
    }

    fn nil_count(&self) -> usize {
        self.inner.nil_count()
    }

    fn nil_count_in(
        &self,
        range: &Range,
        stop_at_one: bool,
        token: &CancellationToken,
    ) -> DataResult<usize> {
        self.inner.nil_count_in(range, stop_at_one, token)
    }

    fn is_missing(&self, row: usize) -> bool {
        self.inner.is_missing(row)
    }

    fn value(&self, row: usize) -> Value {
        self.inner.value(row)
    }

    fn value_as_string(&self, row: usize) -> String {
        self.inner.value_as_string(row)
    }

    fn set_formatter(&mut self, formatter: Option<Formatter>) {
        self.inner.set_formatter(formatter);
    }

    fn check(&self, value: &Value) -> DataResult<()> {
        self.inner.check(value)
    }

    fn append(&mut self, value: Value) -> DataResult<()> {
        self.inner.append(value)
    }

    fn insert(&mut self, row: usize, value: Value) -> DataResult<()> {
        self.inner.insert(row, value)
    }

    fn update(&mut self, row: usize, value: Value) -> DataResult<()> {
        self.inner.update(row, value)
    }

    fn remove(&mut self, row: usize) {
        self.inner.remove(row);
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.inner.swap(a, b);
    }

    fn reorder(&mut self, order: &[usize]) {
        self.inner.reorder(order);
    }

    fn reset(&mut self) {
        self.inner.reset();
    }

    fn empty_like(&self, capacity: usize) -> Box<dyn Column> {
        let mut inner = GenericColumn::with_capacity(self.inner.name.clone(), capacity);
        inner.formatter = self.inner.formatter.clone();
        Box::new(Self {
            inner,
            cmp: Arc::clone(&self.cmp),
        })
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

impl<T> OrderedColumn for OrderedGenericColumn<T>
where
    T: Clone + fmt::Debug + Send + Sync + 'static,
{
    fn compare_rows(&self, a: usize, b: usize) -> Ordering {
        self.compare_cell(a, self.inner.cells.get(b))
    }

    fn compare(&self, row: usize, value: &Value) -> DataResult<Ordering> {
        let other = GenericColumn::<T>::accept(value)?;
        Ok(self.compare_cell(row, &other))
    }

    fn row_matcher(&self, lower: &Value, upper: &Value) -> DataResult<RowMatcher<'_>> {
        let lower = GenericColumn::<T>::accept(lower)?;
        let upper = GenericColumn::<T>::accept(upper)?;

        let equal = match (&lower, &upper) {
            (Some(l), Some(u)) => (self.cmp)(l, u) == Ordering::Equal,
            (None, None) => true,
            _ => false,
        };
        if equal {
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
        let cmp = Arc::clone(&self.cmp);
        self.inner
            .cells
            .sort_by(order, stable, move |a, b| match (a, b) {
                (Some(a), Some(b)) => cmp(a, b),
                _ => Ordering::Equal,
            });
    }
}
