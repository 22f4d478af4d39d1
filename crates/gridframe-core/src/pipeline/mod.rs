//! Row-wise transformation pipeline shared by columns and tables
//!
//! [`apply`](apply::apply) and [`filter`](filter::filter) accept anything that
//! implements [`Frame`]: a single column (typed or behind `dyn Column`) or a
//! whole [`Table`]. Each comes in an in-place form that takes a
//! [`WriteAccess`](crate::lock::WriteAccess) and a copying form that takes a
//! [`ReadAccess`](crate::lock::ReadAccess) and leaves the source untouched.

pub mod apply;
pub mod filter;

pub use apply::{apply, apply_copy};
pub use filter::{filter, filter_copy, FilterAction};

use crate::column::{Column, Element, TypedColumn};
use crate::error::DataResult;
use crate::row::{Row, RowValues};
use crate::table::Table;
use crate::value::Value;

/// A row-addressable source the pipeline can read, patch and rebuild
pub trait Frame {
    /// What the callback sees for one row
    type Row;
    /// What the callback may return to replace a row
    type Patch;
    /// The shape produced by the copying operations
    type Output;

    fn frame_rows(&self) -> usize;

    fn read_row(&self, row: usize) -> Self::Row;

    /// Write a patch over `row`
    ///
    /// # Errors
    /// Returns error if the patch does not fit the frame
    fn write_row(&mut self, row: usize, patch: Self::Patch) -> DataResult<()>;

    fn remove_row(&mut self, row: usize);

    /// An empty output of the same shape with room for `capacity` rows
    fn empty_output(&self, capacity: usize) -> Self::Output;

    /// Append `row`, with `patch` laid over it if given, to `out`
    ///
    /// # Errors
    /// Returns error if the patch does not fit the output
    fn copy_row(
        &self,
        out: &mut Self::Output,
        row: usize,
        patch: Option<Self::Patch>,
    ) -> DataResult<()>;
}

impl Frame for dyn Column {
    type Row = Value;
    type Patch = Value;
    type Output = Box<dyn Column>;

    fn frame_rows(&self) -> usize {
        self.row_count()
    }

    fn read_row(&self, row: usize) -> Value {
        self.value(row)
    }

    fn write_row(&mut self, row: usize, patch: Value) -> DataResult<()> {
        self.update(row, patch)
    }

    fn remove_row(&mut self, row: usize) {
        self.remove(row);
    }

    fn empty_output(&self, capacity: usize) -> Box<dyn Column> {
        self.empty_like(capacity)
    }

    fn copy_row(
        &self,
        out: &mut Box<dyn Column>,
        row: usize,
        patch: Option<Value>,
    ) -> DataResult<()> {
        out.append(patch.unwrap_or_else(|| self.value(row)))
    }
}

impl<E: Element> Frame for TypedColumn<E> {
    type Row = Value;
    type Patch = Value;
    type Output = TypedColumn<E>;

    fn frame_rows(&self) -> usize {
        Column::row_count(self)
    }

    fn read_row(&self, row: usize) -> Value {
        Column::value(self, row)
    }

    fn write_row(&mut self, row: usize, patch: Value) -> DataResult<()> {
        Column::update(self, row, patch)
    }

    fn remove_row(&mut self, row: usize) {
        Column::remove(self, row);
    }

    fn empty_output(&self, capacity: usize) -> TypedColumn<E> {
        self.cleared(capacity)
    }

    fn copy_row(
        &self,
        out: &mut TypedColumn<E>,
        row: usize,
        patch: Option<Value>,
    ) -> DataResult<()> {
        match patch {
            Some(value) => Column::append(out, value),
            None => {
                out.push(self.cell(row).clone());
                Ok(())
            }
        }
    }
}

impl Frame for Table {
    type Row = Row;
    type Patch = RowValues;
    type Output = Table;

    fn frame_rows(&self) -> usize {
        self.row_count()
    }

    fn read_row(&self, row: usize) -> Row {
        self.row(row)
    }

    fn write_row(&mut self, row: usize, patch: RowValues) -> DataResult<()> {
        self.update_row(row, patch)
    }

    fn remove_row(&mut self, row: usize) {
        self.remove(row);
    }

    fn empty_output(&self, capacity: usize) -> Table {
        self.empty_like(capacity)
    }

    fn copy_row(&self, out: &mut Table, row: usize, patch: Option<RowValues>) -> DataResult<()> {
        let mut values = self.row_values(row);
        match patch {
            None => {}
            Some(RowValues::Positional(replacement)) => {
                assert_eq!(
                    replacement.len(),
                    values.len(),
                    "positional row has {} values for {} columns",
                    replacement.len(),
                    values.len()
                );
                values = replacement;
            }
            Some(RowValues::Keyed(pairs)) => {
                for (key, value) in pairs {
                    let index = self.resolve(&key)?;
                    values[index] = value;
                }
            }
        }
        out.append(RowValues::Positional(values))
    }
}
