//! Row and column operations, sorting, editing and search

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use std::collections::HashMap;

use chrono::NaiveDate;
use common::{display_order, ids, task_columns, task_grid, task_rows, test_config};
use xlgrid::events::{EventKind, GridEvent};
use xlgrid::{
    CellIndex, CellValue, Column, DataType, Grid, GridError, Row, RowEditable, SortingType,
};

fn flushed_kinds(grid: &mut Grid) -> Vec<EventKind> {
    grid.flush().iter().map(|(key, _)| key.kind).collect()
}

// ---- construction --------------------------------------------------------

#[test]
fn test_duplicate_ids_are_rejected() {
    let mut rows = task_rows(2);
    rows.push(Row::with_id("t0"));
    assert!(matches!(
        Grid::new(task_columns(), rows, test_config()),
        Err(GridError::DuplicateRow(id)) if id == "t0"
    ));

    let mut columns = task_columns();
    columns.push(Column::new("title", DataType::Text));
    assert!(matches!(
        Grid::new(columns, Vec::new(), test_config()),
        Err(GridError::DuplicateColumn(_))
    ));
}

#[test]
fn test_rows_deserialize_from_host_json() {
    let json = r#"[
        {"id": "a", "data": {"title": {"kind": "text", "value": "Write docs"},
                             "estimate": {"kind": "number", "value": 3}}},
        {"data": {"title": {"kind": "text", "value": "No id"}}, "deletable": false}
    ]"#;
    let rows: Vec<Row> = serde_json::from_str(json).unwrap();
    assert_eq!(rows[0].value("estimate"), &CellValue::Number(3.0));
    assert!(!rows[1].id.is_empty());
    assert!(!rows[1].deletable);

    let grid = Grid::new(task_columns(), rows, test_config()).unwrap();
    assert_eq!(grid.row_count(), 2);
}

// ---- rows ----------------------------------------------------------------

#[test]
fn test_add_row_at_position() {
    let mut grid = task_grid(3);
    let index = grid
        .add_row(Row::with_id("n").with_value("title", "new"), Some(1))
        .unwrap();
    assert_eq!(index, 1);
    assert_eq!(display_order(&grid), ids(&["t0", "n", "t1", "t2"]));
    assert_eq!(grid.row("n").unwrap().view_props.rect.top, 10.0);

    let batch = grid.flush();
    match &batch[0].1 {
        GridEvent::AddRow { row, position } => {
            assert_eq!(row.id, "n");
            assert_eq!(*position, 1);
        }
        other => panic!("unexpected event {other:?}"),
    }

    assert!(matches!(
        grid.add_row(Row::with_id("t0"), None),
        Err(GridError::DuplicateRow(_))
    ));
}

#[test]
fn test_add_row_takes_group_values_of_position() {
    let mut grid = task_grid(30);
    grid.group_by_columns(&ids(&["status"])).unwrap();

    // The first ten displayed rows are "doing".
    let row = Row::with_id("n").with_value("status", "todo");
    assert_eq!(grid.add_row(row, Some(2)).unwrap(), 2);
    assert_eq!(grid.row("n").unwrap().value("status"), &CellValue::from("doing"));
    assert_eq!(grid.root().children()[0].len(), 11);
    assert!(grid.root().is_consistent());
}

#[test]
fn test_add_row_with_new_group_value() {
    let mut grid = task_grid(9);
    grid.group_by_columns(&ids(&["status"])).unwrap();

    let row = Row::with_id("n").with_value("status", "blocked");
    assert_eq!(grid.add_row(row, None).unwrap(), 0);
    let groups = grid.root().children();
    assert_eq!(groups.len(), 4);
    assert_eq!(groups[0].metadata().value, CellValue::from("blocked"));
    assert_eq!(groups[0].items().to_vec(), ids(&["n"]));
}

#[test]
fn test_add_row_joins_matching_group() {
    let mut grid = task_grid(9);
    grid.group_by_columns(&ids(&["status"])).unwrap();
    let row = Row::with_id("n").with_value("status", "done");
    // done holds t2, t5, t8 after the three doing rows.
    assert_eq!(grid.add_row(row, None).unwrap(), 6);
}

#[test]
fn test_delete_rows() {
    let mut rows = task_rows(6);
    rows[0].deletable = false;
    let mut grid = Grid::new(task_columns(), rows, test_config()).unwrap();
    grid.group_by_columns(&ids(&["status"])).unwrap();
    grid.flush();

    let deleted = grid.delete_rows(&ids(&["t0", "t2", "t5"])).unwrap();
    assert_eq!(deleted, ids(&["t2", "t5"]));
    assert_eq!(grid.row_count(), 4);
    // The emptied "done" group is gone.
    assert_eq!(grid.root().children().len(), 2);
    assert_eq!(flushed_kinds(&mut grid), vec![EventKind::DeleteRows]);

    assert!(matches!(
        grid.delete_rows(&ids(&["t1", "ghost"])),
        Err(GridError::UnknownRow(id)) if id == "ghost"
    ));
    assert_eq!(grid.row_count(), 4);
}

#[test]
fn test_move_row_flat() {
    let mut grid = task_grid(5);
    grid.flush();
    assert!(grid.move_row("t0", 3).unwrap());
    assert_eq!(display_order(&grid), ids(&["t1", "t2", "t3", "t0", "t4"]));
    assert_eq!(grid.rows()[3].id, "t0");

    match &grid.flush()[0].1 {
        GridEvent::MoveRow { id, from, to } => {
            assert_eq!(id, "t0");
            assert_eq!((*from, *to), (0, 3));
        }
        other => panic!("unexpected event {other:?}"),
    }

    assert!(!grid.move_row("t4", 4).unwrap());
    assert!(grid.move_row("ghost", 0).is_err());
}

#[test]
fn test_move_row_across_groups_rewrites_values() {
    let mut grid = task_grid(6);
    grid.group_by_columns(&ids(&["status"])).unwrap();
    assert_eq!(display_order(&grid), ids(&["t1", "t4", "t2", "t5", "t0", "t3"]));
    grid.flush();

    assert!(grid.move_row("t1", 3).unwrap());
    assert_eq!(display_order(&grid), ids(&["t4", "t2", "t5", "t1", "t0", "t3"]));
    assert_eq!(grid.row("t1").unwrap().value("status"), &CellValue::from("done"));
    assert_eq!(grid.root().children()[1].len(), 3);

    let kinds = flushed_kinds(&mut grid);
    assert!(kinds.contains(&EventKind::MoveRow));
    assert!(kinds.contains(&EventKind::UpdateRow));

    // The manual order survives a rebuild of the tree.
    grid.ungroup();
    assert_eq!(display_order(&grid), ids(&["t4", "t2", "t5", "t1", "t0", "t3"]));
}

#[test]
fn test_move_row_is_ignored_while_sorted() {
    let mut grid = task_grid(4);
    grid.sort_by_columns(&ids(&["title"])).unwrap();
    assert!(!grid.move_row("t0", 2).unwrap());
    assert_eq!(display_order(&grid), ids(&["t0", "t1", "t2", "t3"]));
}

// ---- sorting -------------------------------------------------------------

#[test]
fn test_sort_text_then_restore() {
    let mut grid = task_grid(12);
    assert!(grid.sort_by_columns(&ids(&["title"])).unwrap());
    assert!(grid.is_sorted());
    assert_eq!(
        &display_order(&grid)[..5],
        &ids(&["t0", "t1", "t10", "t11", "t2"])[..]
    );
    assert_eq!(
        grid.find_column_by_id("title").unwrap().sorting_type,
        Some(SortingType::Asc)
    );

    grid.unsort();
    assert!(!grid.is_sorted());
    let expected: Vec<String> = (0..12).map(|i| format!("t{i}")).collect();
    assert_eq!(display_order(&grid), expected);
    assert!(grid.find_column_by_id("title").unwrap().sorting_type.is_none());
}

#[test]
fn test_sort_inside_groups() {
    let mut grid = task_grid(6);
    grid.group_by_columns(&ids(&["status"])).unwrap();
    grid.set_sorting_type("estimate", SortingType::Desc).unwrap();
    grid.sort_by_columns(&ids(&["estimate"])).unwrap();
    assert_eq!(display_order(&grid), ids(&["t4", "t1", "t5", "t2", "t3", "t0"]));

    grid.set_sorting_type("estimate", SortingType::Asc).unwrap();
    assert_eq!(display_order(&grid), ids(&["t1", "t4", "t2", "t5", "t0", "t3"]));

    grid.unsort();
    assert_eq!(display_order(&grid), ids(&["t1", "t4", "t2", "t5", "t0", "t3"]));
}

#[test]
fn test_edit_of_sorted_column_resorts() {
    let mut grid = task_grid(4);
    grid.sort_by_columns(&ids(&["estimate"])).unwrap();
    grid.update_cell("t0", "estimate", CellValue::Number(10.0))
        .unwrap();
    assert_eq!(display_order(&grid), ids(&["t1", "t2", "t3", "t0"]));
}

#[test]
fn test_sort_unknown_column_fails() {
    let mut grid = task_grid(2);
    assert!(matches!(
        grid.sort_by_columns(&ids(&["nope"])),
        Err(GridError::UnknownColumn(_))
    ));
    assert!(!grid.is_sorted());
}

// ---- editing -------------------------------------------------------------

#[test]
fn test_set_cell_text_parses_by_field() {
    let mut grid = task_grid(2);
    grid.set_cell_text("t0", "estimate", "1,234").unwrap();
    assert_eq!(
        grid.row("t0").unwrap().value("estimate"),
        &CellValue::Number(1234.0)
    );

    grid.set_cell_text("t0", "due", "2024/02/03").unwrap();
    assert_eq!(
        grid.row("t0").unwrap().value("due"),
        &CellValue::Date(NaiveDate::from_ymd_opt(2024, 2, 3).unwrap())
    );

    assert!(matches!(
        grid.set_cell_text("t0", "estimate", "abc"),
        Err(GridError::InvalidValue { .. })
    ));
    assert!(matches!(
        grid.set_cell_text("t0", "owner", "x"),
        Err(GridError::UnknownColumn(_))
    ));

    grid.set_cell_text("t1", "title", "   ").unwrap();
    assert!(!grid.row("t1").unwrap().data.contains_key("title"));
}

#[test]
fn test_dropdown_options_are_enforced() {
    let mut columns = task_columns();
    columns[1].field.options = ids(&["todo", "doing", "done"]);
    let mut grid = Grid::new(columns, task_rows(2), test_config()).unwrap();

    assert!(grid
        .update_cell("t0", "status", CellValue::from("blocked"))
        .is_err());
    grid.update_cell("t0", "status", CellValue::from("done"))
        .unwrap();
    assert!(grid
        .update_cell("t0", "estimate", CellValue::from("ten"))
        .is_err());
}

#[test]
fn test_row_override_beats_column_flag() {
    let mut columns = task_columns();
    columns[0].editable = false;
    let mut rows = task_rows(2);
    rows[1].editable = Some(RowEditable::Columns(HashMap::from([
        ("title".to_string(), true),
        ("estimate".to_string(), false),
    ])));
    let mut grid = Grid::new(columns, rows, test_config()).unwrap();

    assert!(matches!(
        grid.update_cell("t0", "title", CellValue::from("x")),
        Err(GridError::NotEditable { .. })
    ));
    grid.update_cell("t1", "title", CellValue::from("x")).unwrap();
    assert!(grid
        .update_cell("t1", "estimate", CellValue::Number(1.0))
        .is_err());
    grid.update_cell("t1", "due", CellValue::Empty).unwrap();
}

// ---- columns -------------------------------------------------------------

#[test]
fn test_add_column() {
    let mut grid = task_grid(3);
    let position = grid
        .add_column(Column::new("owner", DataType::Text), Some(1))
        .unwrap();
    assert_eq!(position, 1);
    assert_eq!(grid.columns()[1].id, "owner");
    assert_eq!(grid.layout().column_count(), 6);
    assert_eq!(flushed_kinds(&mut grid), vec![EventKind::AddColumn]);

    assert!(grid
        .add_column(Column::new("owner", DataType::Text), None)
        .is_err());
}

#[test]
fn test_delete_grouping_column_ungroups() {
    let mut grid = task_grid(6);
    grid.group_by_columns(&ids(&["status"])).unwrap();
    let removed = grid.delete_column("status").unwrap();
    assert_eq!(removed.id, "status");

    assert!(!grid.is_grouped());
    assert!(grid.root().is_leaf());
    assert!(grid.rows().iter().all(|row| !row.data.contains_key("status")));
    assert_eq!(grid.layout().column_count(), 4);
    assert!(grid.delete_column("status").is_err());
}

#[test]
fn test_locked_column_cannot_be_deleted() {
    let mut columns = task_columns();
    columns[0].deletable = false;
    let mut grid = Grid::new(columns, task_rows(1), test_config()).unwrap();
    assert!(matches!(
        grid.delete_column("title"),
        Err(GridError::NotDeletable(_))
    ));
    assert_eq!(grid.columns().len(), 5);
}

#[test]
fn test_move_column_clears_cell_selection() {
    let mut grid = task_grid(3);
    grid.select_cells(CellIndex::new(0, 0), CellIndex::new(1, 1))
        .unwrap();
    grid.flush();

    assert!(grid.move_column("title", 10).unwrap());
    let order: Vec<&str> = grid.columns().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(order, vec!["status", "priority", "estimate", "due", "title"]);
    assert_eq!(grid.layout().column_positions[4], 400.0);
    assert!(grid.selection().cells().is_empty());

    match &grid.flush()[0].1 {
        GridEvent::MoveColumn { id, from, to } => {
            assert_eq!(id, "title");
            assert_eq!((*from, *to), (0, 4));
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert!(!grid.move_column("title", 4).unwrap());
}

// ---- search --------------------------------------------------------------

#[test]
fn test_search_cycles_through_matches() {
    let mut grid = task_grid(12);
    let info = grid.search("TASK 1");
    assert_eq!(
        info.matches,
        vec![CellIndex::new(1, 0), CellIndex::new(10, 0), CellIndex::new(11, 0)]
    );
    assert_eq!(info.focus, Some(0));

    assert_eq!(grid.search_next(), Some(CellIndex::new(10, 0)));
    assert_eq!(grid.search_next(), Some(CellIndex::new(11, 0)));
    assert_eq!(grid.search_next(), Some(CellIndex::new(1, 0)));
    assert_eq!(grid.search_previous(), Some(CellIndex::new(11, 0)));

    grid.clear_search();
    assert!(grid.search_next().is_none());
}

#[test]
fn test_search_follows_data_changes() {
    let mut grid = task_grid(12);
    assert_eq!(grid.search("done").matches.len(), 4);
    grid.search_next();
    grid.search_next();
    grid.search_next();
    assert_eq!(grid.search_info().focus, Some(3));

    grid.delete_rows(&ids(&["t2", "t5"])).unwrap();
    let info = grid.search_info();
    assert_eq!(info.matches, vec![CellIndex::new(6, 1), CellIndex::new(9, 1)]);
    assert_eq!(info.focus, Some(1));

    assert!(grid.search("").matches.is_empty());
}

#[test]
fn test_search_scrolls_match_into_view() {
    let mut grid = task_grid(50);
    grid.set_viewport_size(300.0, 100.0);
    grid.search("task 42");
    assert_eq!(grid.viewport().scroll_y, 330.0);
}
