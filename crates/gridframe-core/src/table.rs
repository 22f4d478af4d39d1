//! Table: an ordered, name-unique composition of equal-length columns

use std::collections::HashSet;
use std::fmt;

use crate::column::{Column, SortOrder};
use crate::error::{DataError, DataResult};
use crate::row::{ColumnKey, Row, RowValues};
use crate::value::Value;

/// One key of a multi-column sort
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub column: ColumnKey,
    pub order: SortOrder,
}

impl SortKey {
    #[must_use]
    pub fn ascending(column: impl Into<ColumnKey>) -> Self {
        Self {
            column: column.into(),
            order: SortOrder::Ascending,
        }
    }

    #[must_use]
    pub fn descending(column: impl Into<ColumnKey>) -> Self {
        Self {
            column: column.into(),
            order: SortOrder::Descending,
        }
    }
}

/// A two-dimensional table of aligned columns
///
/// Every column has the same row count and a unique name. Row mutations fan
/// out to every column, and the argument shape and types are checked against
/// all columns before any of them is touched.
#[derive(Clone, Default)]
pub struct Table {
    columns: Vec<Box<dyn Column>>,
}

impl Table {
    /// Create a table from equal-length, uniquely named columns
    ///
    /// # Panics
    /// Panics if row counts differ or a name repeats
    #[must_use]
    pub fn new(columns: Vec<Box<dyn Column>>) -> Self {
        match Self::try_new(columns) {
            Ok(table) => table,
            Err(e) => panic!("invalid table columns: {e}"),
        }
    }

    /// Create a table, reporting mismatched or duplicate columns as an error
    ///
    /// # Errors
    /// Returns `InvalidOperation` if row counts differ or a name repeats
    pub fn try_new(columns: Vec<Box<dyn Column>>) -> DataResult<Self> {
        let mut seen = HashSet::new();
        for col in &columns {
            if !seen.insert(col.name()) {
                return Err(DataError::InvalidOperation(format!(
                    "duplicate column name '{}'",
                    col.name()
                )));
            }
        }

        if let Some(first) = columns.first() {
            let len = first.row_count();
            for col in &columns {
                if col.row_count() != len {
                    return Err(DataError::InvalidOperation(format!(
                        "column '{}' has {} rows, expected {}",
                        col.name(),
                        col.row_count(),
                        len
                    )));
                }
            }
        }

        Ok(Self { columns })
    }

    /// Row count shared by every column; 0 without columns
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.row_count())
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Column names in column order
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name().to_string()).collect()
    }

    /// Position of the column called `name`
    ///
    /// # Errors
    /// Returns `ColumnNotFound` for an unknown name
    pub fn name_to_column_index(&self, name: &str) -> DataResult<usize> {
        self.columns
            .iter()
            .position(|c| c.name() == name)
            .ok_or_else(|| DataError::ColumnNotFound(name.to_string()))
    }

    /// Resolve a name or index to a column position
    ///
    /// # Errors
    /// Returns `ColumnNotFound` or `InvalidColumnIndex`
    pub fn resolve(&self, key: &ColumnKey) -> DataResult<usize> {
        match key {
            ColumnKey::Name(name) => self.name_to_column_index(name),
            ColumnKey::Index(index) if *index < self.columns.len() => Ok(*index),
            ColumnKey::Index(index) => Err(DataError::InvalidColumnIndex(*index)),
        }
    }

    /// Borrow a column by name
    ///
    /// # Errors
    /// Returns `ColumnNotFound` for an unknown name
    pub fn column(&self, name: &str) -> DataResult<&dyn Column> {
        let index = self.name_to_column_index(name)?;
        Ok(self.columns[index].as_ref())
    }

    /// Borrow a column by position
    ///
    /// # Errors
    /// Returns `InvalidColumnIndex` when out of range
    pub fn column_by_index(&self, index: usize) -> DataResult<&dyn Column> {
        self.columns
            .get(index)
            .map(AsRef::as_ref)
            .ok_or(DataError::InvalidColumnIndex(index))
    }

    /// Borrow a column as its concrete variant
    ///
    /// # Errors
    /// Returns `ColumnNotFound`, or `TypeMismatch` if the column is another variant
    pub fn typed_column<C: Column + 'static>(&self, name: &str) -> DataResult<&C> {
        let col = self.column(name)?;
        col.as_any().downcast_ref::<C>().ok_or_else(|| {
            DataError::mismatch(std::any::type_name::<C>(), col.column_type())
        })
    }

    /// All columns in order
    pub fn columns(&self) -> impl Iterator<Item = &dyn Column> {
        self.columns.iter().map(AsRef::as_ref)
    }

    /// Mutate one member column through the table
    ///
    /// # Errors
    /// Returns error if `key` does not resolve
    ///
    /// # Panics
    /// Panics if `f` changes the column's row count or renames it onto
    /// another column's name
    pub fn with_column_mut<R>(
        &mut self,
        key: impl Into<ColumnKey>,
        f: impl FnOnce(&mut dyn Column) -> R,
    ) -> DataResult<R> {
        let index = self.resolve(&key.into())?;
        let before = self.columns[index].row_count();
        let result = f(self.columns[index].as_mut());

        let col = &self.columns[index];
        assert_eq!(
            col.row_count(),
            before,
            "column '{}' changed length from {before} inside a table",
            col.name()
        );
        assert!(
            self.columns
                .iter()
                .enumerate()
                .all(|(i, c)| i == index || c.name() != col.name()),
            "column renamed to duplicate name '{}'",
            col.name()
        );
        Ok(result)
    }

    /// Add a column at the end
    ///
    /// # Errors
    /// Returns `InvalidOperation` on a duplicate name or a row count that
    /// does not match the table
    pub fn add_column(&mut self, column: Box<dyn Column>) -> DataResult<()> {
        if self.columns.iter().any(|c| c.name() == column.name()) {
            return Err(DataError::InvalidOperation(format!(
                "duplicate column name '{}'",
                column.name()
            )));
        }
        if !self.columns.is_empty() && column.row_count() != self.row_count() {
            return Err(DataError::InvalidOperation(format!(
                "column '{}' has {} rows, expected {}",
                column.name(),
                column.row_count(),
                self.row_count()
            )));
        }
        self.columns.push(column);
        Ok(())
    }

    /// Detach a column and hand it back
    ///
    /// # Errors
    /// Returns error if `key` does not resolve
    pub fn remove_column(&mut self, key: impl Into<ColumnKey>) -> DataResult<Box<dyn Column>> {
        let index = self.resolve(&key.into())?;
        Ok(self.columns.remove(index))
    }

    /// Read one row
    ///
    /// # Panics
    /// Panics if `row` is out of range
    #[must_use]
    pub fn row(&self, row: usize) -> Row {
        let values = self.columns.iter().map(|c| c.value(row)).collect();
        Row::new(self.names(), values)
    }

    /// Read one row as a plain value list
    pub(crate) fn row_values(&self, row: usize) -> Vec<Value> {
        self.columns.iter().map(|c| c.value(row)).collect()
    }

    /// Value at `row` in one column
    ///
    /// # Errors
    /// Returns error if `key` does not resolve
    pub fn value(&self, row: usize, key: impl Into<ColumnKey>) -> DataResult<Value> {
        let index = self.resolve(&key.into())?;
        Ok(self.columns[index].value(row))
    }

    /// Insert a row before the first row
    ///
    /// # Errors
    /// See [`Table::insert`]
    pub fn prepend(&mut self, values: impl Into<RowValues>) -> DataResult<()> {
        self.insert(0, values)
    }

    /// Insert a row after the last row
    ///
    /// # Errors
    /// See [`Table::insert`]
    pub fn append(&mut self, values: impl Into<RowValues>) -> DataResult<()> {
        self.insert(self.row_count(), values)
    }

    /// Insert a row before `row`; keyed rows leave unnamed columns missing
    ///
    /// # Errors
    /// Returns `ColumnNotFound` or `TypeMismatch` without modifying the table
    ///
    /// # Panics
    /// Panics if `row > row_count()` or a positional row has the wrong length
    pub fn insert(&mut self, row: usize, values: impl Into<RowValues>) -> DataResult<()> {
        assert!(
            row <= self.row_count(),
            "insert position {row} out of range for {} rows",
            self.row_count()
        );
        let full = self.full_row(values.into())?;
        for (col, value) in self.columns.iter_mut().zip(full) {
            col.insert(row, value)?;
        }
        Ok(())
    }

    /// Replace one cell
    ///
    /// # Errors
    /// Returns error if `key` does not resolve or the value has the wrong type
    pub fn update(
        &mut self,
        row: usize,
        key: impl Into<ColumnKey>,
        value: impl Into<Value>,
    ) -> DataResult<()> {
        let index = self.resolve(&key.into())?;
        self.columns[index].update(row, value.into())
    }

    /// Replace a row; keyed rows leave unnamed columns unchanged
    ///
    /// # Errors
    /// Returns `ColumnNotFound` or `TypeMismatch` without modifying the table
    ///
    /// # Panics
    /// Panics if `row` is out of range or a positional row has the wrong length
    pub fn update_row(&mut self, row: usize, values: impl Into<RowValues>) -> DataResult<()> {
        assert!(
            row < self.row_count(),
            "row {row} out of range for {} rows",
            self.row_count()
        );
        for (index, value) in self.resolve_row(values.into())? {
            self.columns[index].update(row, value)?;
        }
        Ok(())
    }

    /// Delete a row from every column
    pub fn remove(&mut self, row: usize) {
        for col in &mut self.columns {
            col.remove(row);
        }
    }

    /// Exchange two rows in every column
    pub fn swap(&mut self, a: usize, b: usize) {
        for col in &mut self.columns {
            col.swap(a, b);
        }
    }

    /// Remove every row, keeping the columns
    pub fn reset(&mut self) {
        for col in &mut self.columns {
            col.reset();
        }
    }

    /// Deep copy of the table
    #[must_use]
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// A table with the same columns and no rows
    #[must_use]
    pub fn empty_like(&self, capacity: usize) -> Self {
        Self {
            columns: self.columns.iter().map(|c| c.empty_like(capacity)).collect(),
        }
    }

    /// Stable sort by one or more columns, first key most significant
    ///
    /// # Errors
    /// Returns error if a key does not resolve or names a column without an
    /// ordering
    pub fn sort(&mut self, keys: &[SortKey]) -> DataResult<()> {
        let mut resolved = Vec::with_capacity(keys.len());
        for key in keys {
            let index = self.resolve(&key.column)?;
            let ordered = self.columns[index].as_ordered().ok_or_else(|| {
                DataError::InvalidOperation(format!(
                    "column '{}' has no ordering",
                    self.columns[index].name()
                ))
            })?;
            resolved.push((ordered, key.order));
        }

        let mut order: Vec<usize> = (0..self.row_count()).collect();
        order.sort_by(|&a, &b| {
            resolved
                .iter()
                .map(|(col, dir)| match dir {
                    SortOrder::Ascending => col.compare_rows(a, b),
                    SortOrder::Descending => col.compare_rows(b, a),
                })
                .find(|o| o.is_ne())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        drop(resolved);

        self.reorder(&order);
        Ok(())
    }

    /// Rearrange every column so new row `i` holds old row `order[i]`
    ///
    /// # Panics
    /// Panics if `order` is not a permutation of the rows.
    pub fn reorder(&mut self, order: &[usize]) {
        for col in &mut self.columns {
            col.reorder(order);
        }
    }

    /// Expand a row argument to one checked value per column
    fn full_row(&self, values: RowValues) -> DataResult<Vec<Value>> {
        let mut full = vec![Value::Missing; self.columns.len()];
        for (index, value) in self.resolve_row(values)? {
            full[index] = value;
        }
        Ok(full)
    }

    /// Map a row argument to `(column index, value)` pairs, checking shape
    /// and types against every affected column first
    fn resolve_row(&self, values: RowValues) -> DataResult<Vec<(usize, Value)>> {
        let pairs: Vec<(usize, Value)> = match values {
            RowValues::Positional(values) => {
                assert_eq!(
                    values.len(),
                    self.columns.len(),
                    "positional row has {} values for {} columns",
                    values.len(),
                    self.columns.len()
                );
                values.into_iter().enumerate().collect()
            }
            RowValues::Keyed(pairs) => pairs
                .into_iter()
                .map(|(key, value)| Ok((self.resolve(&key)?, value)))
                .collect::<DataResult<_>>()?,
        };

        for (index, value) in &pairs {
            self.columns[*index].check(value)?;
        }
        Ok(pairs)
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("rows", &self.row_count())
            .field("columns", &self.columns)
            .finish()
    }
}
