//! Shared fixtures for the integration tests.
//!
//! A "task" dataset: every row has a status (3 values), a priority
//! (2 values), a numeric estimate, a due date and a free-text title.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation
)]

use std::cell::RefCell;
use std::rc::Rc;

use chrono::NaiveDate;
use xlgrid::events::{EventKey, GridEvent, ManualClock};
use xlgrid::{Column, DataType, Grid, GridConfig, Row};

pub const STATUSES: [&str; 3] = ["todo", "doing", "done"];
pub const PRIORITIES: [&str; 2] = ["high", "low"];

/// title, status, priority, estimate, due (in that order).
pub fn task_columns() -> Vec<Column> {
    vec![
        Column::new("title", DataType::Text).with_width(200.0),
        Column::new("status", DataType::Dropdown).with_width(100.0),
        Column::new("priority", DataType::Dropdown).with_width(100.0),
        Column::new("estimate", DataType::Number).with_width(100.0),
        Column::new("due", DataType::Date).with_width(100.0),
    ]
}

/// Row `i` has id `t{i}`, status `STATUSES[i % 3]`, priority
/// `PRIORITIES[i % 2]` and estimate `i`.
pub fn task_row(i: usize) -> Row {
    let due = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(i as u64);
    Row::with_id(format!("t{i}"))
        .with_value("title", format!("Task {i}"))
        .with_value("status", STATUSES[i % 3])
        .with_value("priority", PRIORITIES[i % 2])
        .with_value("estimate", i as f64)
        .with_value("due", due)
}

pub fn task_rows(count: usize) -> Vec<Row> {
    (0..count).map(task_row).collect()
}

/// Config with fixed, easy to reason about sizes and manual event delivery.
pub fn test_config() -> GridConfig {
    GridConfig {
        row_height: 10.0,
        group_header_height: 20.0,
        group_footer_height: 0.0,
        group_gap: 5.0,
        min_column_width: 20.0,
        auto_emit: false,
        ..GridConfig::default()
    }
}

pub fn task_grid(count: usize) -> Grid {
    Grid::new(task_columns(), task_rows(count), test_config()).unwrap()
}

/// Grid on a manual clock, for throttling and retry tests.
pub fn clocked_grid(count: usize, config: GridConfig) -> (Grid, ManualClock) {
    let clock = ManualClock::new();
    let grid = Grid::with_clock(task_columns(), task_rows(count), config, clock.clone()).unwrap();
    (grid, clock)
}

pub fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_string()).collect()
}

/// Display order of the grid's rows.
pub fn display_order(grid: &Grid) -> Vec<String> {
    grid.root().items().to_vec()
}

pub type Batches = Rc<RefCell<Vec<Vec<(EventKey, GridEvent)>>>>;

/// Install a listener that records every delivered batch.
pub fn record_batches(grid: &mut Grid) -> Batches {
    let batches: Batches = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&batches);
    grid.set_listener(move |batch| sink.borrow_mut().push(batch.to_vec()));
    batches
}
