//! Row-by-row conversion of any column to a float, integer or string column
//!
//! Conversion never stops at a bad row: the row becomes missing in the
//! output and the failure is recorded, tagged with its row, in the returned
//! [`ErrorCollection`].

use tracing::debug;

use crate::cancel::CancellationToken;
use crate::column::{Column, Float64Column, Int64Column, StringColumn};
use crate::error::{DataResult, ErrorCollection};
use crate::lock::ReadAccess;
use crate::value::Value;

/// A best-effort conversion result
#[derive(Debug, Clone)]
pub struct Converted<C> {
    pub column: C,
    /// One `Conversion` error per row that could not be converted
    pub errors: ErrorCollection,
}

impl<C> Converted<C> {
    /// The converted column, or the collected row errors if there were any
    ///
    /// # Errors
    /// Returns `Collection` when at least one row failed
    pub fn into_result(self) -> DataResult<C> {
        self.errors.into_result()?;
        Ok(self.column)
    }
}

struct Cells<T> {
    name: String,
    values: Vec<Option<T>>,
    errors: ErrorCollection,
}

fn convert_rows<C, T>(
    column: ReadAccess<'_, C>,
    token: &CancellationToken,
    mut cell: impl FnMut(&Value) -> Result<Option<T>, String>,
) -> DataResult<Cells<T>>
where
    C: Column + ?Sized,
{
    column.with(|col| {
        let rows = col.row_count();
        let mut values = Vec::with_capacity(rows);
        let mut errors = ErrorCollection::new();

        for row in 0..rows {
            token.check()?;
            match cell(&col.value(row)) {
                Ok(v) => values.push(v),
                Err(message) => {
                    errors.push_row(row, message);
                    values.push(None);
                }
            }
        }

        debug!(
            column = col.name(),
            rows,
            failed = errors.len(),
            "column converted"
        );
        Ok(Cells {
            name: col.name().to_string(),
            values,
            errors,
        })
    })
}

/// Convert every row to a float
///
/// # Errors
/// Returns `Cancelled` if the token fires; row failures go to `errors`
pub fn to_float64<C: Column + ?Sized>(
    column: ReadAccess<'_, C>,
    token: &CancellationToken,
) -> DataResult<Converted<Float64Column>> {
    let cells = convert_rows(column, token, Value::to_f64)?;
    let values = cells
        .values
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect();
    Ok(Converted {
        column: Float64Column::from_values(cells.name, values),
        errors: cells.errors,
    })
}

/// Convert every row to an integer; floats must be whole numbers
///
/// # Errors
/// Returns `Cancelled` if the token fires; row failures go to `errors`
pub fn to_int64<C: Column + ?Sized>(
    column: ReadAccess<'_, C>,
    token: &CancellationToken,
) -> DataResult<Converted<Int64Column>> {
    let cells = convert_rows(column, token, Value::to_i64)?;
    Ok(Converted {
        column: Int64Column::from_options(cells.name, cells.values),
        errors: cells.errors,
    })
}

/// Convert every row to its text form
///
/// # Errors
/// Returns `Cancelled` if the token fires
pub fn to_string_column<C: Column + ?Sized>(
    column: ReadAccess<'_, C>,
    token: &CancellationToken,
) -> DataResult<Converted<StringColumn>> {
    let cells = convert_rows(column, token, |v| Ok(v.to_text()))?;
    Ok(Converted {
        column: StringColumn::from_options(cells.name, cells.values),
        errors: cells.errors,
    })
}
