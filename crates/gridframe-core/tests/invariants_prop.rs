//! Property tests for the row-count, missing-count and search invariants

use gridframe_core::column::MixedColumn;
use gridframe_core::pipeline::filter;
use gridframe_core::search::search;
use gridframe_core::{
    CancellationToken, Column, FilterAction, Float64Column, Int64Column, ParallelConfig,
    ReadAccess, SearchOptions, StringColumn, Table, Value, WriteAccess,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Append(Option<i64>),
    Prepend(Option<i64>),
    Insert(usize, Option<i64>),
    Update(usize, Option<i64>),
    Remove(usize),
    Swap(usize, usize),
}

fn cell() -> impl Strategy<Value = Option<i64>> {
    prop::option::of(-50_i64..50)
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        cell().prop_map(Op::Append),
        cell().prop_map(Op::Prepend),
        (any::<usize>(), cell()).prop_map(|(r, v)| Op::Insert(r, v)),
        (any::<usize>(), cell()).prop_map(|(r, v)| Op::Update(r, v)),
        any::<usize>().prop_map(Op::Remove),
        (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Op::Swap(a, b)),
    ]
}

fn to_value(v: Option<i64>) -> Value {
    v.map_or(Value::Missing, Value::Int)
}

fn count_missing(col: &dyn Column) -> usize {
    (0..col.row_count()).filter(|&r| col.is_missing(r)).count()
}

proptest! {
    #[test]
    fn prop_nil_count_tracks_mutations(
        initial in prop::collection::vec(cell(), 0..20),
        ops in prop::collection::vec(op(), 0..40),
    ) {
        let mut col = Int64Column::from_options("n", initial.clone());
        let mut model = initial;

        for op in ops {
            match op {
                Op::Append(v) => {
                    col.append(to_value(v)).unwrap();
                    model.push(v);
                }
                Op::Prepend(v) => {
                    col.prepend(to_value(v)).unwrap();
                    model.insert(0, v);
                }
                Op::Insert(r, v) => {
                    let row = r % (model.len() + 1);
                    col.insert(row, to_value(v)).unwrap();
                    model.insert(row, v);
                }
                Op::Update(r, v) if !model.is_empty() => {
                    let row = r % model.len();
                    col.update(row, to_value(v)).unwrap();
                    model[row] = v;
                }
                Op::Remove(r) if !model.is_empty() => {
                    let row = r % model.len();
                    col.remove(row);
                    model.remove(row);
                }
                Op::Swap(a, b) if !model.is_empty() => {
                    let (a, b) = (a % model.len(), b % model.len());
                    col.swap(a, b);
                    model.swap(a, b);
                }
                _ => {}
            }

            prop_assert_eq!(col.row_count(), model.len());
            prop_assert_eq!(col.nil_count(), count_missing(&col));
            prop_assert_eq!(col.nil_count(), model.iter().filter(|v| v.is_none()).count());
        }
        prop_assert_eq!(col.cells(), model.as_slice());
    }

    #[test]
    fn prop_search_matches_linear_scan(
        values in prop::collection::vec(prop::option::of(-1000.0_f64..1000.0), 1..400),
        a in -1000.0_f64..1000.0,
        b in -1000.0_f64..1000.0,
        threads in 1_usize..6,
    ) {
        let (lower, upper) = if a <= b { (a, b) } else { (b, a) };
        let col = MixedColumn::from_values(
            "m",
            values.iter().map(|v| v.unwrap_or(f64::NAN)).collect(),
        );
        let expected: Vec<usize> = values
            .iter()
            .enumerate()
            .filter(|(_, v)| matches!(v, Some(x) if *x >= lower && *x <= upper))
            .map(|(row, _)| row)
            .collect();

        let options = SearchOptions::new()
            .with_parallel(ParallelConfig::new().with_threshold(0).with_num_threads(threads));
        let rows = search(
            ReadAccess::AssumeHeld(&col),
            &Value::Float(lower),
            &Value::Float(upper),
            &options,
            &CancellationToken::new(),
        )
        .unwrap();
        prop_assert_eq!(rows, expected);
    }

    #[test]
    fn prop_filter_keeps_tables_rectangular(
        scores in prop::collection::vec(prop::option::of(0.0_f64..100.0), 0..60),
        cutoff in 0.0_f64..100.0,
    ) {
        let labels: Vec<String> = (0..scores.len()).map(|i| format!("r{i}")).collect();
        let mut table = Table::new(vec![
            Box::new(StringColumn::from_values("label", labels)),
            Box::new(Float64Column::from_values(
                "score",
                scores.iter().map(|v| v.unwrap_or(f64::NAN)).collect(),
            )),
        ]);
        let before = table.row_count();

        let removed = filter(
            WriteAccess::AssumeHeld(&mut table),
            |row, _, _| {
                let keep = matches!(row.get("score"), Some(Value::Float(s)) if *s >= cutoff);
                Ok(FilterAction::from(keep))
            },
            &CancellationToken::new(),
        )
        .unwrap();

        let kept = scores.iter().filter(|v| matches!(v, Some(s) if *s >= cutoff)).count();
        prop_assert_eq!(table.row_count(), kept);
        prop_assert_eq!(before - removed, kept);
        for col in table.columns() {
            prop_assert_eq!(col.row_count(), kept);
        }
        prop_assert_eq!(table.column("score").unwrap().nil_count(), 0);
    }
}

#[derive(Debug, Clone)]
enum TableOp {
    Append(Option<i64>, Option<f64>),
    Insert(usize, Option<i64>),
    Remove(usize),
}

fn table_op() -> impl Strategy<Value = TableOp> {
    prop_oneof![
        (cell(), prop::option::of(-10.0_f64..10.0)).prop_map(|(a, b)| TableOp::Append(a, b)),
        (any::<usize>(), cell()).prop_map(|(r, v)| TableOp::Insert(r, v)),
        any::<usize>().prop_map(TableOp::Remove),
    ]
}

proptest! {
    #[test]
    fn prop_table_columns_stay_aligned(ops in prop::collection::vec(table_op(), 0..50)) {
        let mut table = Table::new(vec![
            Box::new(Int64Column::new("n")),
            Box::new(Float64Column::new("x")),
            Box::new(StringColumn::new("s")),
        ]);
        let mut expected = 0_usize;

        for op in ops {
            match op {
                TableOp::Append(n, x) => {
                    table
                        .append(vec![to_value(n), Value::from(x), Value::from("a")])
                        .unwrap();
                    expected += 1;
                }
                TableOp::Insert(r, n) => {
                    let row = r % (expected + 1);
                    table
                        .insert(row, gridframe_core::RowValues::keyed([("n", to_value(n))]))
                        .unwrap();
                    expected += 1;
                }
                TableOp::Remove(r) if expected > 0 => {
                    table.remove(r % expected);
                    expected -= 1;
                }
                TableOp::Remove(_) => {}
            }

            prop_assert_eq!(table.row_count(), expected);
            for col in table.columns() {
                prop_assert_eq!(col.row_count(), expected);
                prop_assert_eq!(col.nil_count(), count_missing(col));
            }
        }
    }
}
