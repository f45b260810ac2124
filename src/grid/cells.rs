//! Cell selection, editing state, fill handle and clipboard.

use super::Grid;
use crate::error::{GridError, Result};
use crate::events::GridEvent;
use crate::selection::{
    extrapolate, parse_tsv, plan_paste, to_tsv, CellExclusion, FillRequest, GesturePhase,
    OperationReport, PasteTarget,
};
use crate::types::{
    CellIndex, CellValue, Column, ColumnId, Field, MatrixCell, Row, RowId, SelectionState,
    SelectionType,
};

impl Grid {
    /// Select the rectangle spanned by `a` and `b` (anchored at `a`),
    /// clamped to the grid. Returns `None` on an empty grid.
    pub fn select_cells(&mut self, a: CellIndex, b: CellIndex) -> Option<SelectionState> {
        let a = self.clamp_cell(a)?;
        let b = self.clamp_cell(b)?;
        self.end_edit();
        self.selection.select_cells(a, b);
        self.after_cell_selection();
        Some(*self.selection.cells())
    }

    pub fn clear_selection(&mut self) {
        self.end_edit();
        self.gesture.cancel();
        self.selection.clear();
        for row in &mut self.rows {
            row.selected = false;
        }
    }

    /// Select whole columns by visible index.
    pub fn select_columns(&mut self, indices: &[usize], append: bool) {
        let count = self.layout.column_count();
        self.end_edit();
        self.selection
            .select_columns(indices.iter().copied().filter(|&c| c < count), append);
        for row in &mut self.rows {
            row.selected = false;
        }
    }

    // ---- pointer gestures --------------------------------------------------

    /// Pointer pressed on a cell. With `extend` the range grows from the anchor.
    pub fn pointer_down(&mut self, cell: CellIndex, extend: bool) {
        let Some(cell) = self.clamp_cell(cell) else {
            return;
        };
        self.end_edit();
        self.gesture.pointer_down(&mut self.selection, cell, extend);
        self.after_cell_selection();
    }

    /// Pointer moved over a cell while a gesture is active.
    pub fn pointer_move(&mut self, cell: CellIndex) {
        let Some(cell) = self.clamp_cell(cell) else {
            return;
        };
        let phase = self.gesture.phase();
        self.gesture.pointer_move(&mut self.selection, cell);
        if matches!(phase, GesturePhase::Selecting | GesturePhase::Extending) {
            self.after_cell_selection();
        }
    }

    /// Pointer released. A finished fill drag is applied and its report returned.
    pub fn pointer_up(&mut self) -> Option<OperationReport> {
        let request = self.gesture.pointer_up()?;
        Some(self.apply_fill(&request))
    }

    /// Grab the fill handle of the committed selection.
    pub fn grab_fill_handle(&mut self) -> bool {
        self.gesture.grab_fill_handle(&self.selection)
    }

    pub fn gesture_phase(&self) -> GesturePhase {
        self.gesture.phase()
    }

    /// Target of the fill drag in progress.
    pub fn fill_preview(&self) -> Option<&FillRequest> {
        self.gesture.fill_preview()
    }

    // ---- editing state -----------------------------------------------------

    /// Start editing a cell. Any other cell being edited is finished first.
    ///
    /// # Errors
    /// Returns [`GridError::NotEditable`] when the cell refuses edits.
    pub fn begin_edit(&mut self, cell: CellIndex) -> Result<()> {
        let (row, column) = self
            .cell_at(cell)
            .ok_or_else(|| GridError::Other(format!("no cell at {cell:?}")))?;
        if !self.is_cell_editable(row, column) {
            return Err(GridError::NotEditable {
                row: row.id.clone(),
                column: column.id.clone(),
            });
        }
        if let Some(previous) = self.selecting.set(cell) {
            tracing::trace!(target: "xlgrid::grid", ?previous, "edit finished by new edit");
        }
        Ok(())
    }

    /// Finish editing. Returns the cell that was being edited.
    pub fn end_edit(&mut self) -> Option<CellIndex> {
        self.selecting.take()
    }

    pub fn editing_cell(&self) -> Option<CellIndex> {
        self.selecting.get().copied()
    }

    // ---- cell access -------------------------------------------------------

    /// Row and visible column at a cell index.
    pub fn cell_at(&self, cell: CellIndex) -> Option<(&Row, &Column)> {
        let items = self.root.items();
        let row = self.row(items.get(cell.row_index)?)?;
        let column = self.visible_column(cell.column_index)?;
        Some((row, column))
    }

    /// Values of the block spanned by `start` and `end` (clamped to the
    /// grid). Cells matched by `exclusion` are holes; the shape is kept.
    pub fn get_cells(
        &self,
        start: CellIndex,
        end: CellIndex,
        exclusion: &CellExclusion,
    ) -> MatrixCell<CellValue> {
        let (start, end) = CellIndex::normalize(start, end);
        let (Some(last_row), Some(last_column)) = (
            self.root.len().checked_sub(1),
            self.layout.column_count().checked_sub(1),
        ) else {
            return MatrixCell::empty(0, 0);
        };
        if start.row_index > last_row || start.column_index > last_column {
            return MatrixCell::empty(0, 0);
        }
        let end = CellIndex::new(end.row_index.min(last_row), end.column_index.min(last_column));

        let items = self.root.items();
        let mut block = Vec::with_capacity(end.row_index - start.row_index + 1);
        for r in start.row_index..=end.row_index {
            let row = items.get(r).and_then(|id| self.row(id));
            let cells = (start.column_index..=end.column_index)
                .map(|c| {
                    let row = row?;
                    let column = self.visible_column(c)?;
                    if self.is_excluded(row, column, exclusion) {
                        return None;
                    }
                    Some(row.value(&column.id).clone())
                })
                .collect();
            block.push(cells);
        }
        MatrixCell::from_rows(block)
    }

    /// Values of the current cell selection.
    pub fn selected_cells(&self, exclusion: &CellExclusion) -> MatrixCell<CellValue> {
        match self.selection.cells().bounds() {
            Some((start, end)) => self.get_cells(start, end, exclusion),
            None => MatrixCell::empty(0, 0),
        }
    }

    fn is_excluded(&self, row: &Row, column: &Column, exclusion: &CellExclusion) -> bool {
        exclusion.excludes_type(column.data_type())
            || (exclusion.required_empty
                && column.field.is_required_and_empty(row.value(&column.id)))
            || (exclusion.non_editable && !self.is_cell_editable(row, column))
    }

    // ---- fill --------------------------------------------------------------

    /// Extrapolate the source block of `request` into its target rows.
    ///
    /// Target cells that refuse edits, or whose column type cannot be
    /// filled, are skipped but keep their place in the series. The selection
    /// grows to cover source and target.
    pub fn apply_fill(&mut self, request: &FillRequest) -> OperationReport {
        let source = self.get_cells(
            request.source_start,
            request.source_end,
            &CellExclusion::default(),
        );
        let columns: Vec<Column> = (request.source_start.column_index
            ..=request.source_end.column_index)
            .filter_map(|c| self.visible_column(c).cloned())
            .collect();
        let fields: Vec<&Field> = columns.iter().map(|c| &c.field).collect();
        let items = self.root.items();
        let top = request.target_start.row_index;
        let target_rows = request
            .target_rows()
            .min(items.len().saturating_sub(top));

        let filled = extrapolate(&source, &fields, target_rows, request.reverse, |r, c| {
            let row = items.get(top + r).and_then(|id| self.row(id));
            match (row, columns.get(c)) {
                (Some(row), Some(column)) => {
                    !column.data_type().capabilities().fillable || !self.is_cell_editable(row, column)
                }
                _ => true,
            }
        });

        let mut report = OperationReport {
            success: 0,
            total: target_rows * columns.len(),
        };
        let mut touched: Vec<RowId> = Vec::new();
        for cell in filled {
            let (Some(id), Some(column)) = (items.get(top + cell.row), columns.get(cell.column))
            else {
                continue;
            };
            if !column.field.validate(&cell.value) {
                continue;
            }
            if self.write_value(id, &column.id, cell.value) && !touched.contains(id) {
                touched.push(id.clone());
            }
            report.success += 1;
        }
        tracing::debug!(
            target: "xlgrid::selection",
            success = report.success,
            total = report.total,
            reverse = request.reverse,
            "fill applied"
        );

        if !touched.is_empty() {
            let column_ids: Vec<ColumnId> = columns.iter().map(|c| c.id.clone()).collect();
            self.after_edit(&touched, &column_ids);
        }
        let (start, end) = if request.reverse {
            (request.target_start, request.source_end)
        } else {
            (request.source_start, request.target_end)
        };
        self.select_cells(start, end);
        self.notify_partial("Some cells could not be filled", report);
        report
    }

    // ---- clipboard -----------------------------------------------------------

    /// Current selection as TSV: a cell range, whole rows or whole columns.
    pub fn copy_selection(&self) -> Option<String> {
        let block = match self.selection.selection_type() {
            SelectionType::None => return None,
            SelectionType::CellRange => self.selected_cells(&CellExclusion::default()),
            SelectionType::Rows => {
                let items = self.root.items();
                let selected = self.selection.rows();
                let columns = self.layout.column_count();
                let block = items
                    .iter()
                    .filter(|id| selected.contains(*id))
                    .filter_map(|id| self.row(id))
                    .map(|row| {
                        (0..columns)
                            .map(|c| Some(row.value(&self.visible_column(c)?.id).clone()))
                            .collect()
                    })
                    .collect();
                MatrixCell::from_rows(block)
            }
            SelectionType::Columns => {
                let items = self.root.items();
                let columns = self.selection.columns();
                let block = items
                    .iter()
                    .filter_map(|id| self.row(id))
                    .map(|row| {
                        columns
                            .iter()
                            .map(|&c| Some(row.value(&self.visible_column(c)?.id).clone()))
                            .collect()
                    })
                    .collect();
                MatrixCell::from_rows(block)
            }
        };
        Some(to_tsv(&block.map(CellValue::display)))
    }

    /// Paste TSV text into the selected cells or columns.
    ///
    /// The target grows to the clipboard's shape and a smaller clipboard
    /// repeats across a larger target. Cells that refuse edits or reject
    /// the text are counted as failures in the report.
    ///
    /// # Errors
    /// Returns [`GridError::NonContiguousColumns`] when the selected columns
    /// have gaps; an advisory notice is queued as well.
    pub fn paste(&mut self, text: &str) -> Result<OperationReport> {
        let clipboard = parse_tsv(text);
        let cells = *self.selection.cells();
        let columns = self.selection.columns().clone();
        let target = match self.selection.selection_type() {
            SelectionType::CellRange => PasteTarget::Cells(&cells),
            SelectionType::Columns => PasteTarget::Columns(&columns),
            SelectionType::Rows | SelectionType::None => return Ok(OperationReport::default()),
        };
        let plan = match plan_paste(
            &clipboard,
            &target,
            self.root.len(),
            self.layout.column_count(),
        ) {
            Ok(Some(plan)) => plan,
            Ok(None) => return Ok(OperationReport::default()),
            Err(err) => {
                let report = OperationReport {
                    success: 0,
                    total: self.root.len() * columns.len(),
                };
                self.queue(GridEvent::Notice {
                    message: err.to_string(),
                    report,
                });
                return Err(err);
            }
        };

        let items = self.root.items();
        let mut report = OperationReport::default();
        let mut touched_rows: Vec<RowId> = Vec::new();
        let mut touched_columns: Vec<ColumnId> = Vec::new();
        for (cell, text) in &plan.cells {
            let value = self.cell_at(*cell).and_then(|(row, column)| {
                if !self.is_cell_editable(row, column) {
                    return None;
                }
                Some((column.id.clone(), column.field.parse(text)?))
            });
            let (Some((column_id, value)), Some(id)) = (value, items.get(cell.row_index)) else {
                report.record(false);
                continue;
            };
            if self.write_value(id, &column_id, value) {
                if !touched_rows.contains(id) {
                    touched_rows.push(id.clone());
                }
                if !touched_columns.contains(&column_id) {
                    touched_columns.push(column_id);
                }
            }
            report.record(true);
        }
        tracing::debug!(
            target: "xlgrid::selection",
            success = report.success,
            total = report.total,
            "paste applied"
        );

        if !touched_rows.is_empty() {
            self.after_edit(&touched_rows, &touched_columns);
        }
        if matches!(target, PasteTarget::Cells(_)) {
            self.select_cells(plan.start, plan.end);
        }
        self.notify_partial("Some cells could not be pasted", report);
        Ok(report)
    }

    /// Clear every editable cell of the cell selection.
    pub fn clear_selected_cells(&mut self) -> OperationReport {
        let Some((start, end)) = self.selection.cells().bounds() else {
            return OperationReport::default();
        };
        let writable = self.get_cells(start, end, &CellExclusion::writable());
        let items = self.root.items();
        let mut report = OperationReport {
            success: 0,
            total: writable.count(),
        };
        let mut touched_rows: Vec<RowId> = Vec::new();
        let mut touched_columns: Vec<ColumnId> = Vec::new();
        for (r, c, _) in writable.iter() {
            let row_id = items.get(start.row_index + r);
            let column_id = self
                .visible_column(start.column_index + c)
                .map(|column| column.id.clone());
            let (Some(row_id), Some(column_id)) = (row_id, column_id) else {
                continue;
            };
            if self.write_value(row_id, &column_id, CellValue::Empty) {
                if !touched_rows.contains(row_id) {
                    touched_rows.push(row_id.clone());
                }
                if !touched_columns.contains(&column_id) {
                    touched_columns.push(column_id);
                }
            }
            report.success += 1;
        }
        if !touched_rows.is_empty() {
            self.after_edit(&touched_rows, &touched_columns);
        }
        report
    }

    // ---- internals -----------------------------------------------------------

    fn clamp_cell(&self, cell: CellIndex) -> Option<CellIndex> {
        let last_row = self.root.len().checked_sub(1)?;
        let last_column = self.layout.column_count().checked_sub(1)?;
        Some(CellIndex::new(
            cell.row_index.min(last_row),
            cell.column_index.min(last_column),
        ))
    }

    /// Bookkeeping after the cell selection changed: row selection flags,
    /// committing a draft row the selection left, and the host event.
    fn after_cell_selection(&mut self) {
        for row in &mut self.rows {
            row.selected = false;
        }
        let state = *self.selection.cells();
        if let Some(draft) = self.draft.get() {
            let inside = self.find_row_index(draft).is_some_and(|index| {
                state
                    .bounds()
                    .is_some_and(|(start, end)| (start.row_index..=end.row_index).contains(&index))
            });
            if !inside {
                self.confirm_draft_row();
            }
        }
        self.queue(GridEvent::SelectCells { state });
    }

    fn notify_partial(&mut self, message: &str, report: OperationReport) {
        if !report.is_complete() {
            self.queue(GridEvent::Notice {
                message: message.to_string(),
                report,
            });
        }
    }
}
