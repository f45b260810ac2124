//! Browser-facing handle tests. Run with `wasm-pack test --node`.
#![cfg(target_arch = "wasm32")]
#![allow(clippy::unwrap_used, clippy::float_cmp, clippy::cast_precision_loss)]

use wasm_bindgen::JsValue;
use wasm_bindgen_test::wasm_bindgen_test;
use xlgrid::{Column, DataType, GridHandle, Row};

fn handle(count: usize) -> GridHandle {
    let columns = vec![
        Column::new("title", DataType::Text),
        Column::new("status", DataType::Dropdown),
        Column::new("estimate", DataType::Number),
    ];
    let rows: Vec<Row> = (0..count)
        .map(|i| {
            Row::with_id(format!("r{i}"))
                .with_value("title", format!("Item {i}"))
                .with_value("status", if i % 2 == 0 { "open" } else { "closed" })
                .with_value("estimate", i as f64)
        })
        .collect();
    GridHandle::new(
        &serde_wasm_bindgen::to_value(&columns).unwrap(),
        &serde_wasm_bindgen::to_value(&rows).unwrap(),
        &JsValue::UNDEFINED,
    )
    .unwrap()
}

#[wasm_bindgen_test]
fn test_default_config_layout() {
    let grid = handle(10);
    assert_eq!(grid.total_height(), 320.0);
}

#[wasm_bindgen_test]
fn test_group_and_summary() {
    let mut grid = handle(10);
    assert!(grid.group_by(&serde_wasm_bindgen::to_value(&["status"]).unwrap()).unwrap());
    let summary = grid.group_summary().unwrap();
    let count = js_sys::Reflect::get(&summary, &JsValue::from_str("count")).unwrap();
    assert_eq!(count.as_f64(), Some(10.0));
}

#[wasm_bindgen_test]
fn test_copy_and_paste() {
    let mut grid = handle(3);
    grid.select_cells(0, 2, 1, 2).unwrap();
    assert_eq!(grid.copy().unwrap(), "0\n1");

    grid.select_cells(2, 2, 2, 2).unwrap();
    grid.paste("7").unwrap();
    grid.select_cells(2, 2, 2, 2).unwrap();
    assert_eq!(grid.copy().unwrap(), "7");
}

#[wasm_bindgen_test]
fn test_invalid_rows_are_rejected() {
    let columns = serde_wasm_bindgen::to_value(&vec![Column::new("a", DataType::Text)]).unwrap();
    let result = GridHandle::new(&columns, &JsValue::from_str("nope"), &JsValue::NULL);
    assert!(result.is_err());
}
