//! Benchmarks for grouping, sorting and layout lookups.
//!
//! Run with: cargo bench
//!
//! Results are saved to `target/criterion/` with HTML reports.
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::indexing_slicing
)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use xlgrid::{CalculateType, Column, DataType, Grid, GridConfig, Row};

const STATUSES: [&str; 4] = ["open", "blocked", "review", "done"];
const OWNERS: [&str; 7] = ["ana", "bo", "cy", "di", "ed", "fa", "gu"];

fn dataset(count: usize) -> (Vec<Column>, Vec<Row>) {
    let mut amount = Column::new("amount", DataType::Number);
    amount.calculate_type = Some(CalculateType::Sum);
    let columns = vec![
        Column::new("status", DataType::Dropdown),
        Column::new("owner", DataType::Text),
        amount,
    ];
    let rows = (0..count)
        .map(|i| {
            Row::with_id(format!("r{i}"))
                .with_value("status", STATUSES[i % STATUSES.len()])
                .with_value("owner", OWNERS[(i * 7 + 3) % OWNERS.len()])
                .with_value("amount", ((i * 37) % 1000) as f64)
        })
        .collect();
    (columns, rows)
}

fn group_ids() -> Vec<String> {
    vec!["status".to_string(), "owner".to_string()]
}

/// Build the tree for growing row counts
fn bench_group_by(c: &mut Criterion) {
    let mut group = c.benchmark_group("group_by");
    for count in [1_000usize, 10_000, 50_000] {
        let (columns, rows) = dataset(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("two_levels", count), &count, |b, _| {
            b.iter(|| {
                let mut grid =
                    Grid::new(columns.clone(), rows.clone(), GridConfig::default()).unwrap();
                grid.group_by_columns(black_box(&group_ids())).unwrap();
                grid
            });
        });
    }
    group.finish();
}

/// Sort then restore inside an existing tree
fn bench_sort(c: &mut Criterion) {
    let (columns, rows) = dataset(10_000);
    let mut grid = Grid::new(columns, rows, GridConfig::default()).unwrap();
    grid.group_by_columns(&group_ids()).unwrap();
    let sort = vec!["amount".to_string()];

    c.bench_function("sort_unsort_10000", |b| {
        b.iter(|| {
            grid.sort_by_columns(black_box(&sort)).unwrap();
            grid.unsort();
        });
    });
}

/// Hit testing on a large grouped layout
fn bench_lookup(c: &mut Criterion) {
    let (columns, rows) = dataset(50_000);
    let mut grid = Grid::new(columns, rows, GridConfig::default()).unwrap();
    grid.group_by_columns(&group_ids()).unwrap();
    let layout = grid.layout();
    let height = layout.total_height;

    c.bench_function("find_item_at_offset", |b| {
        let mut y = 0.0f32;
        b.iter(|| {
            y = (y + 997.0) % height;
            layout.find_item_at_offset(black_box(y))
        });
    });

    c.bench_function("find_row_inside_viewport", |b| {
        b.iter(|| layout.find_row_inside_viewport(black_box(height / 2.0), height / 2.0 + 900.0));
    });
}

criterion_group!(benches, bench_group_by, bench_sort, bench_lookup);

criterion_main!(benches);
