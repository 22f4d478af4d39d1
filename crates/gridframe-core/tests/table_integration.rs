//! Integration tests across tables, pipelines, search, interpolation and CSV

use std::thread;

use gridframe_core::column::Float64Column;
use gridframe_core::config::DEFAULT_MISSING_TOKEN;
use gridframe_core::convert::to_float64;
use gridframe_core::interpolate::{interpolate, interpolated_values};
use gridframe_core::io::{read_csv, write_csv};
use gridframe_core::pipeline::{apply, apply_copy, filter, filter_copy};
use gridframe_core::range::ints_to_ranges;
use gridframe_core::search::{search, search_column};
use gridframe_core::{
    Axis, CancellationToken, Column, ColumnType, CsvOptions, DataError, Direction, EngineConfig,
    FilterAction, Int64Column, InterpolateOptions, ParallelConfig, Range, ReadAccess, Region,
    RowValues, SearchOptions, Shared, SortKey, Strategy, StringColumn, Table, Value, WriteAccess,
};

fn people() -> Table {
    Table::new(vec![
        Box::new(StringColumn::from_values(
            "name",
            vec!["Alice", "Bob", "Carol", "Dave", "Erin"],
        )),
        Box::new(Int64Column::from_options(
            "age",
            vec![Some(34), Some(27), None, Some(45), Some(27)],
        )),
        Box::new(Float64Column::from_values(
            "score",
            vec![81.0, f64::NAN, 64.5, f64::NAN, 90.0],
        )),
    ])
}

#[test]
fn test_table_rows_and_mutation() {
    let mut table = people();
    assert_eq!(table.row_count(), 5);
    assert_eq!(table.names(), vec!["name", "age", "score"]);

    table
        .append(RowValues::keyed([("name", Value::from("Frank")), ("age", Value::Int(52))]))
        .unwrap();
    assert_eq!(table.row_count(), 6);
    assert_eq!(table.value(5, "score").unwrap(), Value::Missing);

    table.update(2, "age", Value::Int(31)).unwrap();
    assert_eq!(table.row(2).get("age"), Some(&Value::Int(31)));

    let err = table.update(0, "age", Value::from("old")).unwrap_err();
    assert!(matches!(err, DataError::TypeMismatch { .. }));
    assert_eq!(table.value(0, "age").unwrap(), Value::Int(34));

    table.remove(0);
    assert_eq!(table.value(0, "name").unwrap(), Value::from("Bob"));
    assert!(matches!(
        table.value(0, "height"),
        Err(DataError::ColumnNotFound(_))
    ));
}

#[test]
fn test_table_multi_key_sort() {
    let mut table = people();
    table
        .sort(&[SortKey::ascending("age"), SortKey::descending("name")])
        .unwrap();

    let names: Vec<Value> = (0..table.row_count())
        .map(|row| table.value(row, "name").unwrap())
        .collect();
    // Missing sorts first; the two 27s are ordered by name, descending
    assert_eq!(
        names,
        vec![
            Value::from("Carol"),
            Value::from("Erin"),
            Value::from("Bob"),
            Value::from("Alice"),
            Value::from("Dave"),
        ]
    );
}

#[test]
fn test_apply_then_filter_on_shared_table() {
    let shared = Shared::new(people());
    let token = CancellationToken::new();

    apply(
        WriteAccess::Acquire(&shared),
        |row, _, _| {
            Ok(row
                .get("score")
                .filter(|v| v.is_missing())
                .map(|_| RowValues::keyed([("score", 0.0)])))
        },
        &token,
    )
    .unwrap();
    assert_eq!(shared.read().column("score").unwrap().nil_count(), 0);

    let removed = filter(
        WriteAccess::Acquire(&shared),
        |row, _, _| {
            let passed = matches!(row.get("score"), Some(Value::Float(s)) if *s >= 60.0);
            Ok(FilterAction::from(passed))
        },
        &token,
    )
    .unwrap();

    assert_eq!(removed, 2);
    let table = shared.read();
    assert_eq!(table.row_count(), 3);
    assert_eq!(table.value(2, "name").unwrap(), Value::from("Erin"));
}

#[test]
fn test_copying_pipelines_leave_source_alone() {
    let table = people();
    let token = CancellationToken::new();

    let adults = filter_copy(
        ReadAccess::AssumeHeld(&table),
        |row, _, _| Ok(matches!(row.get("age"), Some(Value::Int(a)) if *a >= 30).into()),
        &token,
    )
    .unwrap();
    assert_eq!(adults.row_count(), 2);
    assert_eq!(table.row_count(), 5);

    let col = Int64Column::from_values("n", vec![1, 2, 3]);
    let doubled = apply_copy(
        ReadAccess::AssumeHeld(&col),
        |v, _, _| Ok(Some(Value::Int(v.to_i64().ok().flatten().unwrap_or(0) * 2))),
        &token,
    )
    .unwrap();
    assert_eq!(doubled.cells(), &[Some(2), Some(4), Some(6)]);
    assert_eq!(col.cells(), &[Some(1), Some(2), Some(3)]);
}

#[test]
fn test_search_member_column_and_collapse_to_ranges() {
    let values: Vec<i64> = (0..50_000).map(|i| i % 100).collect();
    let shared = Shared::new(Int64Column::from_values("n", values));
    let token = CancellationToken::new();

    let options = SearchOptions::new()
        .with_parallel(ParallelConfig::new().with_threshold(1_000).with_num_threads(4));
    let rows = search(
        ReadAccess::Acquire(&shared),
        &Value::Int(10),
        &Value::Int(12),
        &options,
        &token,
    )
    .unwrap();

    assert_eq!(rows.len(), 1_500);
    assert!(rows.windows(2).all(|w| w[0] < w[1]));
    let ranges = ints_to_ranges(&rows);
    assert_eq!(ranges.len(), 500);
    assert_eq!(ranges[0], Range::new(10, 12));

    let table = people();
    let column = table.column("name").unwrap();
    let found = search_column(
        ReadAccess::AssumeHeld(column),
        &Value::from("B"),
        &Value::from("D"),
        &SearchOptions::new(),
        &token,
    )
    .unwrap();
    assert_eq!(found, vec![1, 2]);
}

#[test]
fn test_concurrent_readers_during_search() {
    let shared = Shared::new(Int64Column::from_values("n", (0..20_000).collect()));
    let handles: Vec<_> = (0..4)
        .map(|k| {
            let shared = shared.clone();
            thread::spawn(move || {
                let token = CancellationToken::new();
                search(
                    ReadAccess::Acquire(&shared),
                    &Value::Int(k * 1_000),
                    &Value::Int(k * 1_000 + 9),
                    &SearchOptions::new(),
                    &token,
                )
                .unwrap()
            })
        })
        .collect();

    for (k, handle) in handles.into_iter().enumerate() {
        let rows = handle.join().unwrap();
        assert_eq!(rows, (k * 1_000..k * 1_000 + 10).collect::<Vec<_>>());
    }
}

#[test]
fn test_interpolate_member_column() {
    let mut table = Table::new(vec![
        Box::new(Float64Column::from_values("t", vec![0.0, 1.0, 2.0, 4.0])),
        Box::new(Float64Column::from_values("y", vec![0.0, f64::NAN, f64::NAN, 8.0])),
    ]);
    let token = CancellationToken::new();
    let axis = table.typed_column::<Float64Column>("t").unwrap().clone();

    let filled = table
        .with_column_mut("y", |col| {
            let y = col
                .as_any_mut()
                .downcast_mut::<Float64Column>()
                .expect("y is a float column");
            interpolate(
                WriteAccess::AssumeHeld(y),
                &Axis::Float(&axis),
                &InterpolateOptions::new(Strategy::Linear),
                &token,
            )
        })
        .unwrap()
        .unwrap();

    assert_eq!(filled, 2);
    assert_eq!(table.value(1, "y").unwrap(), Value::Float(2.0));
    assert_eq!(table.value(2, "y").unwrap(), Value::Float(4.0));
}

#[test]
fn test_interpolation_is_all_or_nothing_on_cancel() {
    let col = Float64Column::from_values("y", vec![1.0, f64::NAN, 3.0]);
    let shared = Shared::new(col);
    let token = CancellationToken::new();
    token.cancel();

    let options = InterpolateOptions::new(Strategy::Linear)
        .with_direction(Direction::Both)
        .with_region(Region::Both);
    let err = interpolate(WriteAccess::Acquire(&shared), &Axis::Row, &options, &token).unwrap_err();
    assert_eq!(err, DataError::Cancelled);
    assert_eq!(shared.read().nil_count(), 1);

    let fills = interpolated_values(
        ReadAccess::Acquire(&shared),
        &Axis::Row,
        &options,
        &CancellationToken::new(),
    )
    .unwrap();
    assert_eq!(fills.get(&1), Some(&2.0));
}

#[test]
fn test_csv_import_convert_and_search() {
    let text = "city;temp\nOslo;4.5\nLima;NaN\nCairo;29\nQuito;x\n";
    let options = CsvOptions::new().with_delimiter(';');
    let imported = read_csv(text.as_bytes(), &options).unwrap();
    assert!(imported.errors.is_empty());
    assert_eq!(
        imported.table.column("temp").unwrap().column_type(),
        ColumnType::String
    );

    let converted = to_float64(
        ReadAccess::AssumeHeld(imported.table.column("temp").unwrap()),
        &CancellationToken::new(),
    )
    .unwrap();
    assert_eq!(converted.errors.rows().collect::<Vec<_>>(), vec![3]);
    assert_eq!(converted.column.nil_count(), 2);

    let warm = search(
        ReadAccess::AssumeHeld(&converted.column),
        &Value::Float(10.0),
        &Value::Float(40.0),
        &SearchOptions::new(),
        &CancellationToken::new(),
    )
    .unwrap();
    assert_eq!(warm, vec![2]);
}

#[test]
fn test_config_drives_csv_round_trip() {
    let config = EngineConfig::from_toml_str(
        r#"
        [csv]
        missing_token = "-"
        dictate = { age = "int64", score = "float64" }
        "#,
    )
    .unwrap();
    assert_ne!(config.csv.missing_token, DEFAULT_MISSING_TOKEN);

    let table = people();
    let mut out = Vec::new();
    write_csv(ReadAccess::AssumeHeld(&table), &mut out, &config.csv).unwrap();
    let loaded = read_csv(out.as_slice(), &config.csv)
        .unwrap()
        .into_result()
        .unwrap();

    for row in 0..table.row_count() {
        assert_eq!(loaded.row(row).values(), table.row(row).values());
    }
}

#[test]
fn test_range_errors_surface_from_operations() {
    let col = Float64Column::new("empty");
    let err = search(
        ReadAccess::AssumeHeld(&col),
        &Value::Float(0.0),
        &Value::Float(1.0),
        &SearchOptions::new(),
        &CancellationToken::new(),
    )
    .unwrap_err();
    assert_eq!(err, DataError::RangeUndefined);

    let col = Float64Column::from_values("y", vec![1.0, 2.0]);
    let err = interpolated_values(
        ReadAccess::AssumeHeld(&col),
        &Axis::Row,
        &InterpolateOptions::new(Strategy::Linear).with_range(Range::new(1, 5)),
        &CancellationToken::new(),
    )
    .unwrap_err();
    assert!(matches!(err, DataError::InvalidRange { .. }));
}
