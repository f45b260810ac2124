//! Browser host boundary.
//!
//! `GridHandle` wraps a [`Grid`] for JavaScript. Columns, rows and results
//! cross the boundary as plain JS objects through `serde-wasm-bindgen`;
//! event batches are delivered to a registered JS function.

use js_sys::Function;
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::config::GridConfig;
use crate::events::GridEvent;
use crate::grid::Grid;
use crate::types::{CellIndex, Column, Row};

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn from_js<T: DeserializeOwned>(value: &JsValue) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value.clone()).map_err(js_error)
}

/// Plain objects instead of `Map`s, so hosts can read results like JSON.
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| js_error(format!("Serialization error: {e}")))
}

#[wasm_bindgen]
pub struct GridHandle {
    grid: Grid,
}

#[wasm_bindgen]
impl GridHandle {
    /// Build a grid from arrays of columns and rows. `config` may be
    /// `undefined` for defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(
        columns: &JsValue,
        rows: &JsValue,
        config: &JsValue,
    ) -> Result<GridHandle, JsValue> {
        console_error_panic_hook::set_once();
        let columns: Vec<Column> = from_js(columns)?;
        let rows: Vec<Row> = from_js(rows)?;
        let config: GridConfig = if config.is_undefined() || config.is_null() {
            GridConfig::default()
        } else {
            from_js(config)?
        };
        let grid = Grid::new(columns, rows, config).map_err(js_error)?;
        Ok(GridHandle { grid })
    }

    /// Replace every row.
    #[wasm_bindgen(js_name = "setRows")]
    pub fn set_rows(&mut self, rows: &JsValue) -> Result<(), JsValue> {
        let rows: Vec<Row> = from_js(rows)?;
        self.grid.set_rows(rows).map_err(js_error)
    }

    /// Receive coalesced event batches as arrays of `{type, payload}`.
    /// `undefined` detaches the listener.
    #[wasm_bindgen(js_name = "setListener")]
    pub fn set_listener(&mut self, callback: Option<Function>) {
        let Some(callback) = callback else {
            self.grid.set_listener(|_| {});
            return;
        };
        self.grid.set_listener(move |batch| {
            let events: Vec<&GridEvent> = batch.iter().map(|(_, event)| event).collect();
            match to_js(&events) {
                Ok(value) => {
                    if let Err(e) = callback.call1(&JsValue::NULL, &value) {
                        tracing::warn!(target: "xlgrid::events", ?e, "event listener threw");
                    }
                }
                Err(e) => tracing::warn!(target: "xlgrid::events", ?e, "event batch not serializable"),
            }
        });
    }

    /// Deliver every pending event now.
    pub fn flush(&mut self) -> usize {
        self.grid.flush().len()
    }

    /// Drive throttled emits and retries. Call from a timer or animation frame.
    pub fn poll(&mut self) -> usize {
        self.grid.poll().len()
    }

    #[wasm_bindgen(js_name = "groupBy")]
    pub fn group_by(&mut self, column_ids: &JsValue) -> Result<bool, JsValue> {
        let column_ids: Vec<String> = from_js(column_ids)?;
        self.grid.group_by_columns(&column_ids).map_err(js_error)
    }

    #[wasm_bindgen(js_name = "sortBy")]
    pub fn sort_by(&mut self, column_ids: &JsValue) -> Result<bool, JsValue> {
        let column_ids: Vec<String> = from_js(column_ids)?;
        self.grid.sort_by_columns(&column_ids).map_err(js_error)
    }

    #[wasm_bindgen(js_name = "toggleGroup")]
    pub fn toggle_group(&mut self, group_id: u64) -> bool {
        self.grid.toggle_collapsed(group_id)
    }

    #[wasm_bindgen(js_name = "groupSummary")]
    pub fn group_summary(&self) -> Result<JsValue, JsValue> {
        to_js(&self.grid.group_summary())
    }

    #[wasm_bindgen(js_name = "addRow")]
    pub fn add_row(&mut self, row: &JsValue, position: Option<usize>) -> Result<usize, JsValue> {
        let row: Row = from_js(row)?;
        self.grid.add_row(row, position).map_err(js_error)
    }

    #[wasm_bindgen(js_name = "addDraftRow")]
    pub fn add_draft_row(&mut self, position: Option<usize>) -> Result<String, JsValue> {
        self.grid.add_draft_row(position).map_err(js_error)
    }

    #[wasm_bindgen(js_name = "confirmDraftRow")]
    pub fn confirm_draft_row(&mut self) -> bool {
        self.grid.confirm_draft_row().is_some()
    }

    #[wasm_bindgen(js_name = "cancelDraftRow")]
    pub fn cancel_draft_row(&mut self) -> bool {
        self.grid.cancel_draft_row()
    }

    #[wasm_bindgen(js_name = "deleteRows")]
    pub fn delete_rows(&mut self, ids: &JsValue) -> Result<JsValue, JsValue> {
        let ids: Vec<String> = from_js(ids)?;
        let deleted = self.grid.delete_rows(&ids).map_err(js_error)?;
        to_js(&deleted)
    }

    #[wasm_bindgen(js_name = "moveRow")]
    pub fn move_row(&mut self, id: &str, to: usize) -> Result<bool, JsValue> {
        self.grid.move_row(id, to).map_err(js_error)
    }

    /// Parse `text` with the column's field and store it.
    #[wasm_bindgen(js_name = "setCell")]
    pub fn set_cell(&mut self, row_id: &str, column_id: &str, text: &str) -> Result<(), JsValue> {
        self.grid
            .set_cell_text(row_id, column_id, text)
            .map_err(js_error)
    }

    #[wasm_bindgen(js_name = "selectCells")]
    pub fn select_cells(
        &mut self,
        start_row: usize,
        start_column: usize,
        end_row: usize,
        end_column: usize,
    ) -> Result<JsValue, JsValue> {
        let state = self.grid.select_cells(
            CellIndex::new(start_row, start_column),
            CellIndex::new(end_row, end_column),
        );
        to_js(&state)
    }

    #[wasm_bindgen(js_name = "selectRows")]
    pub fn select_rows(&mut self, ids: &JsValue, append: bool) -> Result<(), JsValue> {
        let ids: Vec<String> = from_js(ids)?;
        self.grid.select_rows(&ids, append).map_err(js_error)
    }

    #[wasm_bindgen(js_name = "pointerDown")]
    pub fn pointer_down(&mut self, row: usize, column: usize, extend: bool) {
        self.grid.pointer_down(CellIndex::new(row, column), extend);
    }

    /// Deferred to the next [`GridHandle::frame`].
    #[wasm_bindgen(js_name = "pointerMove")]
    pub fn pointer_move(&mut self, row: usize, column: usize) {
        self.grid.request_pointer_move(CellIndex::new(row, column));
    }

    /// Returns the fill report when a fill drag ended, `undefined` otherwise.
    #[wasm_bindgen(js_name = "pointerUp")]
    pub fn pointer_up(&mut self) -> Result<JsValue, JsValue> {
        self.grid.run_frame();
        match self.grid.pointer_up() {
            Some(report) => to_js(&report),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    #[wasm_bindgen(js_name = "grabFillHandle")]
    pub fn grab_fill_handle(&mut self) -> bool {
        self.grid.grab_fill_handle()
    }

    /// Run pointer moves and scrolls requested since the last frame.
    pub fn frame(&mut self) -> usize {
        self.grid.run_frame()
    }

    pub fn copy(&self) -> Option<String> {
        self.grid.copy_selection()
    }

    pub fn paste(&mut self, text: &str) -> Result<JsValue, JsValue> {
        let report = self.grid.paste(text).map_err(js_error)?;
        to_js(&report)
    }

    pub fn search(&mut self, query: &str) -> Result<JsValue, JsValue> {
        to_js(self.grid.search(query))
    }

    #[wasm_bindgen(js_name = "searchNext")]
    pub fn search_next(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.grid.search_next())
    }

    #[wasm_bindgen(js_name = "setViewport")]
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.grid.set_viewport_size(width, height);
    }

    /// Deferred to the next [`GridHandle::frame`].
    #[wasm_bindgen(js_name = "scrollTo")]
    pub fn scroll_to(&mut self, x: f32, y: f32) {
        self.grid.request_scroll(x, y);
    }

    #[wasm_bindgen(js_name = "visibleSlice")]
    pub fn visible_slice(&self) -> Result<JsValue, JsValue> {
        to_js(&self.grid.visible_slice())
    }

    #[wasm_bindgen(js_name = "totalHeight")]
    pub fn total_height(&self) -> f32 {
        self.grid.layout().total_height
    }
}
