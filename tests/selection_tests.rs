//! Selection, fill handle and clipboard tests
//!
//! Visible columns of the task grid: 0 title, 1 status, 2 priority,
//! 3 estimate, 4 due.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use chrono::NaiveDate;
use common::{ids, task_grid};
use xlgrid::events::{EventKind, GridEvent};
use xlgrid::selection::{CellExclusion, GesturePhase};
use xlgrid::{CellIndex, CellValue, GridError, RowEditable, SelectionType};

fn cell(row: usize, column: usize) -> CellIndex {
    CellIndex::new(row, column)
}

fn estimate(grid: &xlgrid::Grid, id: &str) -> CellValue {
    grid.row(id).unwrap().value("estimate").clone()
}

#[test]
fn test_select_cells_is_clamped() {
    let mut grid = task_grid(5);
    let state = grid.select_cells(cell(1, 1), cell(100, 100)).unwrap();
    assert_eq!(state.start, Some(cell(1, 1)));
    assert_eq!(state.end, Some(cell(4, 4)));
    assert_eq!(state.count, 16);
    assert_eq!(grid.selection().selection_type(), SelectionType::CellRange);

    let mut empty =
        xlgrid::Grid::new(common::task_columns(), Vec::new(), common::test_config()).unwrap();
    assert!(empty.select_cells(cell(0, 0), cell(1, 1)).is_none());
}

#[test]
fn test_selection_kinds_are_exclusive() {
    let mut grid = task_grid(5);
    grid.select_cells(cell(0, 0), cell(1, 1)).unwrap();
    grid.select_rows(&ids(&["t1", "t3"]), false).unwrap();

    assert_eq!(grid.selection().selection_type(), SelectionType::Rows);
    assert!(grid.selection().cells().is_empty());
    assert!(grid.row("t1").unwrap().selected);
    assert!(!grid.row("t0").unwrap().selected);

    grid.select_cells(cell(0, 0), cell(0, 0)).unwrap();
    assert!(grid.selection().rows().is_empty());
    assert!(!grid.row("t1").unwrap().selected);

    assert!(grid.select_rows(&ids(&["ghost"]), false).is_err());
}

#[test]
fn test_toggle_row() {
    let mut grid = task_grid(3);
    assert!(grid.toggle_row("t2").unwrap());
    assert!(grid.row("t2").unwrap().selected);
    assert!(!grid.toggle_row("t2").unwrap());
    assert!(!grid.row("t2").unwrap().selected);
}

#[test]
fn test_get_cells_with_exclusions() {
    let mut grid = task_grid(3);
    let mut rows = common::task_rows(3);
    rows[1].editable = Some(RowEditable::All(false));
    grid.set_rows(rows).unwrap();

    let all = grid.get_cells(cell(0, 3), cell(2, 4), &CellExclusion::default());
    assert_eq!(all.row_count(), 3);
    assert_eq!(all.column_count(), 2);
    assert_eq!(all.get(2, 0), Some(&CellValue::Number(2.0)));

    let writable = grid.get_cells(cell(0, 3), cell(2, 4), &CellExclusion::writable());
    assert_eq!(writable.count(), 6);
    assert_eq!(writable.filled_count(), 4);
    assert!(writable.get(1, 0).is_none());

    let no_dates = CellExclusion {
        data_types: vec![xlgrid::DataType::Date],
        ..CellExclusion::default()
    };
    let block = grid.get_cells(cell(0, 3), cell(0, 4), &no_dates);
    assert!(block.get(0, 1).is_none());

    assert_eq!(
        grid.get_cells(cell(10, 0), cell(12, 1), &CellExclusion::default())
            .count(),
        0
    );
}

#[test]
fn test_copy_cells_as_tsv() {
    let mut grid = task_grid(3);
    grid.update_cell("t1", "title", CellValue::from("a\tb")).unwrap();
    grid.select_cells(cell(0, 0), cell(1, 3)).unwrap();

    let text = grid.copy_selection().unwrap();
    assert_eq!(text, "Task 0\ttodo\thigh\t0\n\"a\tb\"\tdoing\tlow\t1");
}

#[test]
fn test_copy_rows_and_columns() {
    let mut grid = task_grid(3);
    assert!(grid.copy_selection().is_none());

    grid.select_rows(&ids(&["t2"]), false).unwrap();
    assert_eq!(
        grid.copy_selection().unwrap(),
        "Task 2\tdone\thigh\t2\t2024-01-03"
    );

    grid.select_columns(&[1, 3], false);
    assert_eq!(
        grid.copy_selection().unwrap(),
        "todo\t0\ndoing\t1\ndone\t2"
    );
}

#[test]
fn test_paste_extends_single_cell_target() {
    let mut grid = task_grid(5);
    grid.select_cells(cell(0, 3), cell(0, 3)).unwrap();

    let report = grid.paste("10\n20\n30\n").unwrap();
    assert_eq!(report.success, 3);
    assert_eq!(report.total, 3);
    assert_eq!(estimate(&grid, "t0"), CellValue::Number(10.0));
    assert_eq!(estimate(&grid, "t2"), CellValue::Number(30.0));
    assert_eq!(estimate(&grid, "t3"), CellValue::Number(3.0));

    let state = grid.selection().cells();
    assert_eq!(state.bounds(), Some((cell(0, 3), cell(2, 3))));
}

#[test]
fn test_paste_repeats_into_larger_target() {
    let mut grid = task_grid(5);
    grid.select_cells(cell(1, 3), cell(3, 3)).unwrap();
    let report = grid.paste("7").unwrap();
    assert!(report.is_complete());
    for id in ["t1", "t2", "t3"] {
        assert_eq!(estimate(&grid, id), CellValue::Number(7.0));
    }
    assert_eq!(estimate(&grid, "t4"), CellValue::Number(4.0));
}

#[test]
fn test_paste_reports_rejected_cells() {
    let mut grid = task_grid(3);
    let mut rows = common::task_rows(3);
    rows[1].editable = Some(RowEditable::All(false));
    grid.set_rows(rows).unwrap();
    grid.flush();

    grid.select_cells(cell(0, 3), cell(0, 3)).unwrap();
    let report = grid.paste("5\n6\nnot a number").unwrap();
    assert_eq!(report.success, 1);
    assert_eq!(report.total, 3);
    assert_eq!(estimate(&grid, "t0"), CellValue::Number(5.0));
    assert_eq!(estimate(&grid, "t1"), CellValue::Number(1.0));
    assert_eq!(estimate(&grid, "t2"), CellValue::Number(2.0));

    let events = grid.flush();
    let notice = events
        .iter()
        .find(|(key, _)| key.kind == EventKind::Notice)
        .map(|(_, event)| event)
        .unwrap();
    match notice {
        GridEvent::Notice { report, .. } => assert_eq!(report.success, 1),
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn test_paste_into_non_contiguous_columns_fails() {
    let mut grid = task_grid(3);
    grid.select_columns(&[0, 2], false);
    let err = grid.paste("x").unwrap_err();
    assert!(matches!(err, GridError::NonContiguousColumns));
    assert_eq!(grid.row("t0").unwrap().value("title"), &CellValue::from("Task 0"));

    let batch = grid.flush();
    let notice = batch
        .iter()
        .find(|(key, _)| key.kind == EventKind::Notice)
        .map(|(_, event)| event);
    match notice {
        // three rows, two selected columns, nothing written
        Some(GridEvent::Notice { report, .. }) => {
            assert_eq!(report.success, 0);
            assert_eq!(report.total, 6);
        }
        other => panic!("expected a notice, got {other:?}"),
    }
}

#[test]
fn test_paste_into_whole_columns() {
    let mut grid = task_grid(4);
    grid.select_columns(&[3], false);
    let report = grid.paste("1\n2").unwrap();
    assert_eq!(report.total, 4);
    assert!(report.is_complete());
    let values: Vec<CellValue> = ["t0", "t1", "t2", "t3"]
        .iter()
        .map(|id| estimate(&grid, id))
        .collect();
    assert_eq!(
        values,
        vec![
            CellValue::Number(1.0),
            CellValue::Number(2.0),
            CellValue::Number(1.0),
            CellValue::Number(2.0)
        ]
    );
}

#[test]
fn test_fill_handle_extends_numeric_series() {
    let mut grid = task_grid(6);
    grid.update_cell("t0", "estimate", CellValue::Number(10.0))
        .unwrap();
    grid.update_cell("t1", "estimate", CellValue::Number(20.0))
        .unwrap();

    grid.pointer_down(cell(0, 3), false);
    grid.pointer_move(cell(1, 3));
    assert!(grid.pointer_up().is_none());
    assert_eq!(grid.gesture_phase(), GesturePhase::Committed);

    assert!(grid.grab_fill_handle());
    grid.pointer_move(cell(4, 3));
    let preview = grid.fill_preview().unwrap();
    assert_eq!(preview.target_start, cell(2, 3));
    assert_eq!(preview.target_end, cell(4, 3));

    let report = grid.pointer_up().unwrap();
    assert!(report.is_complete());
    assert_eq!(report.total, 3);
    assert_eq!(estimate(&grid, "t2"), CellValue::Number(30.0));
    assert_eq!(estimate(&grid, "t4"), CellValue::Number(50.0));
    assert_eq!(estimate(&grid, "t5"), CellValue::Number(5.0));
    assert_eq!(
        grid.selection().cells().bounds(),
        Some((cell(0, 3), cell(4, 3)))
    );
}

#[test]
fn test_fill_upwards_with_dates() {
    let mut grid = task_grid(5);
    let day = |d: u32| CellValue::Date(NaiveDate::from_ymd_opt(2024, 1, d).unwrap());
    grid.update_cell("t3", "due", day(10)).unwrap();
    grid.update_cell("t4", "due", day(12)).unwrap();

    grid.pointer_down(cell(3, 4), false);
    grid.pointer_move(cell(4, 4));
    grid.pointer_up();
    assert!(grid.grab_fill_handle());
    grid.pointer_move(cell(1, 4));
    let report = grid.pointer_up().unwrap();
    assert_eq!(report.total, 2);

    // Two days per row, counted upwards from t3.
    let due = |id: &str| grid.row(id).unwrap().value("due").clone();
    assert_eq!(due("t2"), day(8));
    assert_eq!(due("t1"), day(6));
    assert_eq!(due("t0"), day(1));
}

#[test]
fn test_fill_skips_locked_cells_but_keeps_series() {
    let mut rows = common::task_rows(5);
    rows[3].editable = Some(RowEditable::All(false));
    let mut grid =
        xlgrid::Grid::new(common::task_columns(), rows, common::test_config()).unwrap();
    grid.update_cell("t0", "estimate", CellValue::Number(10.0))
        .unwrap();
    grid.update_cell("t1", "estimate", CellValue::Number(20.0))
        .unwrap();
    grid.flush();

    grid.pointer_down(cell(0, 3), false);
    grid.pointer_move(cell(1, 3));
    grid.pointer_up();
    grid.grab_fill_handle();
    grid.pointer_move(cell(4, 3));
    let report = grid.pointer_up().unwrap();

    assert_eq!(report.success, 2);
    assert_eq!(report.total, 3);
    assert_eq!(estimate(&grid, "t3"), CellValue::Number(3.0));
    assert_eq!(estimate(&grid, "t4"), CellValue::Number(50.0));
    assert!(grid
        .flush()
        .iter()
        .any(|(key, _)| key.kind == EventKind::Notice));
}

#[test]
fn test_fill_handle_needs_committed_selection() {
    let mut grid = task_grid(3);
    assert!(!grid.grab_fill_handle());
    grid.pointer_down(cell(0, 0), false);
    assert!(!grid.grab_fill_handle());
}

#[test]
fn test_clear_selected_cells() {
    let mut rows = common::task_rows(3);
    rows[0].editable = Some(RowEditable::All(false));
    let mut grid =
        xlgrid::Grid::new(common::task_columns(), rows, common::test_config()).unwrap();
    grid.select_cells(cell(0, 3), cell(2, 3)).unwrap();

    let report = grid.clear_selected_cells();
    assert_eq!(report.success, 2);
    assert_eq!(report.total, 3);
    assert_eq!(estimate(&grid, "t0"), CellValue::Number(0.0));
    assert_eq!(estimate(&grid, "t1"), CellValue::Empty);
    assert!(!grid.row("t1").unwrap().data.contains_key("estimate"));
}

#[test]
fn test_edit_state() {
    let mut rows = common::task_rows(2);
    rows[1].editable = Some(RowEditable::All(false));
    let mut grid =
        xlgrid::Grid::new(common::task_columns(), rows, common::test_config()).unwrap();

    grid.begin_edit(cell(0, 0)).unwrap();
    assert_eq!(grid.editing_cell(), Some(cell(0, 0)));
    grid.begin_edit(cell(0, 1)).unwrap();
    assert_eq!(grid.editing_cell(), Some(cell(0, 1)));

    assert!(matches!(
        grid.begin_edit(cell(1, 0)),
        Err(GridError::NotEditable { .. })
    ));

    // Any new selection finishes the edit.
    grid.select_cells(cell(1, 1), cell(1, 1)).unwrap();
    assert_eq!(grid.editing_cell(), None);
}

#[test]
fn test_selection_survives_relayout_clamped() {
    let mut grid = task_grid(5);
    grid.select_cells(cell(2, 0), cell(4, 2)).unwrap();
    grid.delete_rows(&ids(&["t3", "t4"])).unwrap();

    let state = grid.selection().cells();
    assert_eq!(state.bounds(), Some((cell(2, 0), cell(2, 2))));
}
