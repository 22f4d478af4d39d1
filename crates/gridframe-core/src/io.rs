//! CSV import and export for tables
//!
//! Both directions go through Arrow record batches. On the way in every
//! field is read as text and then parsed into the column type dictated for
//! its name, so a malformed cell costs one row error rather than the whole
//! file. Columns without a dictated type import as strings.

use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Write};
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use arrow_csv::{ReaderBuilder as CsvReaderBuilder, WriterBuilder as CsvWriterBuilder};
use chrono::{DateTime, Utc};
use num_complex::Complex64;
use regex::Regex;
use tracing::debug;

use crate::column::{
    Column, ComplexColumn, Float64Column, Int64Column, MixedColumn, StringColumn, TimeColumn,
};
use crate::config::CsvOptions;
use crate::error::{DataError, DataResult, ErrorCollection};
use crate::lock::ReadAccess;
use crate::table::Table;
use crate::value::{ColumnType, Value};

/// A table read from CSV together with the cells that failed to parse
#[derive(Debug, Clone)]
pub struct Imported {
    pub table: Table,
    /// One `Conversion` error per rejected cell; the cell is left missing
    pub errors: ErrorCollection,
}

impl Imported {
    /// The table, or the collected cell errors if there were any
    ///
    /// # Errors
    /// Returns `Collection` when at least one cell was rejected
    pub fn into_result(self) -> DataResult<Table> {
        self.errors.into_result()?;
        Ok(self.table)
    }
}

/// Write a table as CSV
///
/// Missing cells are written as `options.missing_token`. Times are written
/// as RFC 3339 text.
///
/// # Errors
/// Returns `Config` for a non-ASCII delimiter and `Csv` if writing fails
pub fn write_csv<W: Write>(
    table: ReadAccess<'_, Table>,
    writer: W,
    options: &CsvOptions,
) -> DataResult<()> {
    let delimiter = options.delimiter_byte()?;
    let batch = table.with(to_record_batch)?;

    let mut csv_writer = CsvWriterBuilder::new()
        .with_header(options.has_header)
        .with_delimiter(delimiter)
        .with_null(options.missing_token.clone())
        .build(writer);
    csv_writer
        .write(&batch)
        .map_err(|e| DataError::Csv(format!("failed to write batch: {e}")))?;

    debug!(
        rows = batch.num_rows(),
        columns = batch.num_columns(),
        "table written as CSV"
    );
    Ok(())
}

/// Write a table to a CSV file, replacing it if it exists
///
/// # Errors
/// Returns `Io` if the file cannot be created, otherwise as [`write_csv`]
pub fn write_csv_file<P: AsRef<Path>>(
    table: ReadAccess<'_, Table>,
    path: P,
    options: &CsvOptions,
) -> DataResult<()> {
    let file = File::create(path.as_ref()).map_err(|e| {
        DataError::Io(format!("failed to create file '{}': {}", path.as_ref().display(), e))
    })?;
    let mut writer = BufWriter::new(file);
    write_csv(table, &mut writer, options)?;
    writer.flush()?;
    Ok(())
}

/// Read CSV text into a new table
///
/// Without a header the columns are named `column_1`, `column_2`, and so on.
/// Fields equal to `options.missing_token` are missing. An empty field is
/// missing in every column type except `String`, where it is the empty
/// string.
///
/// # Errors
/// Returns `Io`/`Csv` for unreadable input, `Config` for a non-ASCII
/// delimiter and `InvalidOperation` when a column is dictated as generic.
/// Unparsable cells are not errors here; they are listed in
/// [`Imported::errors`].
pub fn read_csv<R: Read>(mut reader: R, options: &CsvOptions) -> DataResult<Imported> {
    let delimiter = options.delimiter_byte()?;
    if let Some(name) = options
        .dictate
        .iter()
        .find_map(|(name, ty)| (*ty == ColumnType::Generic).then_some(name))
    {
        return Err(DataError::InvalidOperation(format!(
            "column '{name}' cannot be imported as generic"
        )));
    }

    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;

    let (inferred, _) = arrow_csv::reader::Format::default()
        .with_header(options.has_header)
        .with_delimiter(delimiter)
        .infer_schema(Cursor::new(&buffer), Some(0))
        .map_err(|e| DataError::Csv(format!("failed to read header: {e}")))?;

    let names: Vec<String> = inferred.fields().iter().map(|f| f.name().clone()).collect();
    if names.is_empty() {
        return Ok(Imported {
            table: Table::default(),
            errors: ErrorCollection::new(),
        });
    }

    let schema = Schema::new(
        names
            .iter()
            .map(|name| Field::new(name.as_str(), DataType::Utf8, true))
            .collect::<Vec<_>>(),
    );
    let csv_reader = CsvReaderBuilder::new(Arc::new(schema))
        .with_header(options.has_header)
        .with_delimiter(delimiter)
        .with_null_regex(missing_regex(&options.missing_token)?)
        .build(Cursor::new(buffer))
        .map_err(|e| DataError::Csv(format!("failed to build CSV reader: {e}")))?;

    let batches: Vec<RecordBatch> = csv_reader
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| DataError::Csv(format!("failed to read CSV batches: {e}")))?;
    let rows: usize = batches.iter().map(RecordBatch::num_rows).sum();

    let mut errors = ErrorCollection::new();
    let mut columns = Vec::with_capacity(names.len());
    for (index, name) in names.iter().enumerate() {
        let ty = options
            .dictate
            .get(name)
            .copied()
            .unwrap_or(ColumnType::String);
        let mut column = empty_column(ty, name, rows)?;

        let mut row = 0;
        for batch in &batches {
            let text = batch.column(index).as_string_opt::<i32>().ok_or_else(|| {
                DataError::Csv(format!("column '{name}' was not read as text"))
            })?;
            for i in 0..text.len() {
                let cell = (!text.is_null(i)).then(|| text.value(i));
                let value = match cell.map(|s| parse_cell(ty, s)).transpose() {
                    Ok(value) => value.unwrap_or(Value::Missing),
                    Err(message) => {
                        errors.push_row(row, format!("column '{name}': {message}"));
                        Value::Missing
                    }
                };
                column.append(value)?;
                row += 1;
            }
        }
        columns.push(column);
    }

    let table = Table::try_new(columns)?;
    debug!(
        rows = table.row_count(),
        columns = table.column_count(),
        rejected = errors.len(),
        "table read from CSV"
    );
    Ok(Imported { table, errors })
}

/// Read a CSV file into a new table
///
/// # Errors
/// Returns `Io` if the file cannot be opened, otherwise as [`read_csv`]
pub fn read_csv_file<P: AsRef<Path>>(path: P, options: &CsvOptions) -> DataResult<Imported> {
    let file = File::open(path.as_ref()).map_err(|e| {
        DataError::Io(format!("failed to open file '{}': {}", path.as_ref().display(), e))
    })?;
    read_csv(BufReader::new(file), options)
}

fn missing_regex(token: &str) -> DataResult<Regex> {
    let pattern = format!("^{}$", regex::escape(token));
    Regex::new(&pattern).map_err(|e| DataError::Config(format!("invalid missing token: {e}")))
}

fn empty_column(ty: ColumnType, name: &str, capacity: usize) -> DataResult<Box<dyn Column>> {
    let column: Box<dyn Column> = match ty {
        ColumnType::Float64 => Box::new(Float64Column::with_capacity(name, capacity)),
        ColumnType::Int64 => Box::new(Int64Column::with_capacity(name, capacity)),
        ColumnType::String => Box::new(StringColumn::with_capacity(name, capacity)),
        ColumnType::Time => Box::new(TimeColumn::with_capacity(name, capacity)),
        ColumnType::Mixed => Box::new(MixedColumn::with_capacity(name, capacity)),
        ColumnType::Complex => Box::new(ComplexColumn::with_capacity(name, capacity)),
        ColumnType::Generic => {
            return Err(DataError::InvalidOperation(format!(
                "column '{name}' cannot be imported as generic"
            )))
        }
    };
    Ok(column)
}

fn parse_time(text: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(text.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("cannot parse {text:?} as time: {e}"))
}

/// Parse one present field into a value the target column accepts
fn parse_cell(ty: ColumnType, text: &str) -> Result<Value, String> {
    if ty != ColumnType::String && text.trim().is_empty() {
        return Ok(Value::Missing);
    }
    let raw = Value::Str(text.to_string());
    match ty {
        ColumnType::Float64 => Ok(raw.to_f64()?.map_or(Value::Missing, Value::Float)),
        ColumnType::Int64 => Ok(raw.to_i64()?.map_or(Value::Missing, Value::Int)),
        ColumnType::Mixed => match raw.to_f64() {
            Ok(v) => Ok(v.map_or(Value::Missing, Value::Float)),
            Err(_) => parse_time(text)
                .map(Value::Time)
                .map_err(|_| format!("cannot parse {text:?} as a number or time")),
        },
        ColumnType::Time => parse_time(text).map(Value::Time),
        ColumnType::Complex => text
            .trim()
            .parse::<Complex64>()
            .map(Value::Complex)
            .map_err(|e| format!("cannot parse {text:?} as complex128: {e}")),
        ColumnType::String | ColumnType::Generic => Ok(raw),
    }
}

fn to_record_batch(table: &Table) -> DataResult<RecordBatch> {
    let rows = table.row_count();
    let mut fields = Vec::with_capacity(table.column_count());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(table.column_count());

    for column in table.columns() {
        let (data_type, array): (DataType, ArrayRef) = match column.column_type() {
            ColumnType::Float64 | ColumnType::Mixed => (
                DataType::Float64,
                Arc::new(
                    (0..rows)
                        .map(|r| column.value(r).to_f64().ok().flatten())
                        .collect::<Float64Array>(),
                ),
            ),
            ColumnType::Int64 => (
                DataType::Int64,
                Arc::new(
                    (0..rows)
                        .map(|r| column.value(r).to_i64().ok().flatten())
                        .collect::<Int64Array>(),
                ),
            ),
            ColumnType::Generic => (
                DataType::Utf8,
                Arc::new(
                    (0..rows)
                        .map(|r| (!column.is_missing(r)).then(|| column.value_as_string(r)))
                        .collect::<StringArray>(),
                ),
            ),
            ColumnType::String | ColumnType::Time | ColumnType::Complex => (
                DataType::Utf8,
                Arc::new(
                    (0..rows)
                        .map(|r| column.value(r).to_text())
                        .collect::<StringArray>(),
                ),
            ),
        };
        fields.push(Field::new(column.name(), data_type, true));
        arrays.push(array);
    }

    let options = RecordBatchOptions::new().with_row_count(Some(rows));
    Ok(RecordBatch::try_new_with_options(
        Arc::new(Schema::new(fields)),
        arrays,
        &options,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::GenericColumn;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn sample_table() -> Table {
        Table::new(vec![
            Box::new(StringColumn::from_options(
                "name",
                vec![Some("Alice".to_string()), None, Some("Charlie".to_string())],
            )),
            Box::new(Int64Column::from_options("age", vec![Some(30), Some(25), None])),
            Box::new(Float64Column::from_values("score", vec![85.5, f64::NAN, 78.25])),
            Box::new(TimeColumn::from_values(
                "seen",
                vec![
                    Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
                    Utc.with_ymd_and_hms(2024, 2, 3, 4, 5, 6).unwrap(),
                    Utc.with_ymd_and_hms(2024, 3, 4, 5, 6, 7).unwrap(),
                ],
            )),
        ])
    }

    fn dictated() -> CsvOptions {
        CsvOptions::new()
            .dictate("age", ColumnType::Int64)
            .dictate("score", ColumnType::Float64)
            .dictate("seen", ColumnType::Time)
    }

    #[test]
    fn test_csv_roundtrip_with_dictation() {
        let table = sample_table();
        let dir = tempdir().unwrap();
        let path = dir.path().join("table.csv");

        write_csv_file(ReadAccess::AssumeHeld(&table), &path, &CsvOptions::new()).unwrap();
        let loaded = read_csv_file(&path, &dictated()).unwrap().into_result().unwrap();

        assert_eq!(loaded.names(), table.names());
        assert_eq!(loaded.row_count(), 3);
        for row in 0..3 {
            assert_eq!(loaded.row(row).values(), table.row(row).values(), "row {row}");
        }
    }

    #[test]
    fn test_missing_token_written_and_read() {
        let table = sample_table();
        let mut out = Vec::new();
        let options = CsvOptions::new().with_missing_token("NA").with_delimiter(';');
        write_csv(ReadAccess::AssumeHeld(&table), &mut out, &options).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "name;age;score;seen");
        assert!(lines[2].starts_with("NA;25;NA;"));

        let loaded = read_csv(text.as_bytes(), &options).unwrap().table;
        assert_eq!(loaded.column("name").unwrap().nil_count(), 1);
        assert_eq!(loaded.column("score").unwrap().column_type(), ColumnType::String);
        assert_eq!(loaded.value(1, "score").unwrap(), Value::Missing);
    }

    #[test]
    fn test_bad_cells_reported_per_row() {
        let text = "x,when\n1,2024-01-01T00:00:00Z\nbad,yesterday\n3,\n";
        let options = CsvOptions::new()
            .dictate("x", ColumnType::Int64)
            .dictate("when", ColumnType::Time);
        let imported = read_csv(text.as_bytes(), &options).unwrap();

        assert_eq!(imported.table.row_count(), 3);
        assert_eq!(imported.errors.len(), 2);
        assert_eq!(imported.errors.rows().collect::<Vec<_>>(), vec![1, 1]);
        assert_eq!(imported.table.value(1, "x").unwrap(), Value::Missing);
        assert_eq!(imported.table.value(2, "x").unwrap(), Value::Int(3));
        assert_eq!(imported.table.column("when").unwrap().nil_count(), 2);
        assert!(imported.into_result().is_err());
    }

    #[test]
    fn test_empty_string_kept_apart_from_missing() {
        let table = Table::new(vec![Box::new(StringColumn::from_options(
            "s",
            vec![Some(String::new()), Some("x".to_string()), None],
        ))]);
        let mut out = Vec::new();
        write_csv(ReadAccess::AssumeHeld(&table), &mut out, &CsvOptions::new()).unwrap();

        let loaded = read_csv(out.as_slice(), &CsvOptions::new()).unwrap().into_result().unwrap();
        assert_eq!(loaded.value(0, "s").unwrap(), Value::from(""));
        assert_eq!(loaded.value(1, "s").unwrap(), Value::from("x"));
        assert_eq!(loaded.value(2, "s").unwrap(), Value::Missing);
        assert_eq!(loaded.column("s").unwrap().nil_count(), 1);

        let options = CsvOptions::new().dictate("n", ColumnType::Int64);
        let blank = read_csv("n,s\n,\n4,b\n".as_bytes(), &options).unwrap().into_result().unwrap();
        assert_eq!(blank.value(0, "n").unwrap(), Value::Missing);
        assert_eq!(blank.value(0, "s").unwrap(), Value::from(""));
    }

    #[test]
    fn test_headerless_import_names_columns() {
        let options = CsvOptions::new()
            .with_header(false)
            .dictate("column_2", ColumnType::Mixed);
        let imported = read_csv("a,1.5\nb,2\n".as_bytes(), &options).unwrap();
        let table = imported.into_result().unwrap();

        assert_eq!(table.names(), vec!["column_1", "column_2"]);
        assert_eq!(table.value(1, "column_2").unwrap(), Value::Float(2.0));
    }

    #[test]
    fn test_complex_roundtrip() {
        let table = Table::new(vec![Box::new(ComplexColumn::from_values(
            "z",
            vec![Complex64::new(1.0, -2.0), Complex64::new(f64::NAN, f64::NAN)],
        ))]);
        let mut out = Vec::new();
        write_csv(ReadAccess::AssumeHeld(&table), &mut out, &CsvOptions::new()).unwrap();

        let options = CsvOptions::new().dictate("z", ColumnType::Complex);
        let loaded = read_csv(out.as_slice(), &options).unwrap().into_result().unwrap();
        assert_eq!(
            loaded.value(0, "z").unwrap(),
            Value::Complex(Complex64::new(1.0, -2.0))
        );
        assert_eq!(loaded.value(1, "z").unwrap(), Value::Missing);
    }

    #[test]
    fn test_generic_columns_export_only() {
        let table = Table::new(vec![Box::new(GenericColumn::from_values("g", vec![7_u8, 9]))]);
        let mut out = Vec::new();
        write_csv(ReadAccess::AssumeHeld(&table), &mut out, &CsvOptions::new()).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "g\n7\n9\n");

        let options = CsvOptions::new().dictate("g", ColumnType::Generic);
        let err = read_csv("g\n1\n".as_bytes(), &options).unwrap_err();
        assert!(matches!(err, DataError::InvalidOperation(_)));
    }

    #[test]
    fn test_empty_input() {
        let imported = read_csv("".as_bytes(), &CsvOptions::new()).unwrap();
        assert_eq!(imported.table.column_count(), 0);
        assert!(imported.errors.is_empty());
    }
}
