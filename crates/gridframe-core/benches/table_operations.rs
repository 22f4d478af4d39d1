//! Benchmarks for table pipelines, partitioned search and interpolation

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use gridframe_core::interpolate::interpolate;
use gridframe_core::pipeline::{apply, filter_copy};
use gridframe_core::search::search;
use gridframe_core::{
    CancellationToken, FilterAction, Float64Column, Int64Column, InterpolateOptions,
    ParallelConfig, ReadAccess, RowValues, SearchOptions, Strategy, StringColumn, Table, Value,
    WriteAccess,
};

fn generate_table(num_rows: usize) -> Table {
    let regions = ["North", "South", "East", "West"];
    let ids: Vec<i64> = (0..num_rows as i64).collect();
    let names: Vec<&str> = (0..num_rows).map(|i| regions[i % 4]).collect();
    let scores: Vec<f64> = (0..num_rows)
        .map(|i| if i % 7 == 0 { f64::NAN } else { (i % 100) as f64 + 0.5 })
        .collect();

    Table::new(vec![
        Box::new(Int64Column::from_values("id", ids)),
        Box::new(StringColumn::from_values("region", names)),
        Box::new(Float64Column::from_values("score", scores)),
    ])
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    let token = CancellationToken::new();

    for size in [10_000, 100_000, 1_000_000] {
        let values: Vec<i64> = (0..size as i64).map(|i| i % 1_000).collect();
        let col = Int64Column::from_values("n", values);
        group.throughput(Throughput::Elements(size as u64));

        for (label, parallel) in [
            ("serial", ParallelConfig::serial()),
            ("parallel", ParallelConfig::new().with_threshold(0)),
        ] {
            let options = SearchOptions::new().with_parallel(parallel);
            group.bench_with_input(BenchmarkId::new(label, size), &size, |b, _| {
                b.iter(|| {
                    black_box(
                        search(
                            ReadAccess::AssumeHeld(&col),
                            &Value::Int(100),
                            &Value::Int(110),
                            &options,
                            &token,
                        )
                        .unwrap(),
                    )
                });
            });
        }
    }

    group.finish();
}

fn bench_filter_copy(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_copy");
    let token = CancellationToken::new();

    for size in [1_000, 10_000, 100_000] {
        let table = generate_table(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                black_box(
                    filter_copy(
                        ReadAccess::AssumeHeld(&table),
                        |row, _, _| {
                            let keep = matches!(row.get("score"), Some(Value::Float(s)) if *s > 50.0);
                            Ok(FilterAction::from(keep))
                        },
                        &token,
                    )
                    .unwrap(),
                )
            });
        });
    }

    group.finish();
}

fn bench_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply");
    let token = CancellationToken::new();

    for size in [1_000, 10_000, 100_000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter_batched(
                || generate_table(size),
                |mut table| {
                    apply(
                        WriteAccess::AssumeHeld(&mut table),
                        |row, _, _| {
                            Ok(row
                                .get("score")
                                .filter(|v| v.is_missing())
                                .map(|_| RowValues::keyed([("score", 0.0)])))
                        },
                        &token,
                    )
                    .unwrap();
                    black_box(table)
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

fn bench_interpolate(c: &mut Criterion) {
    let mut group = c.benchmark_group("interpolate");
    let token = CancellationToken::new();

    for strategy in [Strategy::Linear, Strategy::Spline] {
        let size = 100_000;
        let values: Vec<f64> = (0..size)
            .map(|i| if i % 5 == 0 { (i as f64).sin() } else { f64::NAN })
            .collect();
        let options = InterpolateOptions::new(strategy);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(BenchmarkId::new(format!("{strategy:?}"), size), |b| {
            b.iter_batched(
                || Float64Column::from_values("y", values.clone()),
                |mut col| {
                    let filled = interpolate(
                        WriteAccess::AssumeHeld(&mut col),
                        &gridframe_core::Axis::Row,
                        &options,
                        &token,
                    )
                    .unwrap();
                    black_box(filled)
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_search,
    bench_filter_copy,
    bench_apply,
    bench_interpolate
);
criterion_main!(benches);
