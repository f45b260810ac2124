//! Selection state: a cell range, a row set or a column set, never more
//! than one at a time.

use std::collections::{BTreeSet, HashSet};

use crate::types::{CellIndex, RowId, SelectionState, SelectionType};

#[derive(Debug, Clone, Default)]
pub struct SelectionModel {
    cells: SelectionState,
    rows: HashSet<RowId>,
    columns: BTreeSet<usize>,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection_type(&self) -> SelectionType {
        if !self.cells.is_empty() {
            SelectionType::CellRange
        } else if !self.rows.is_empty() {
            SelectionType::Rows
        } else if !self.columns.is_empty() {
            SelectionType::Columns
        } else {
            SelectionType::None
        }
    }

    pub fn cells(&self) -> &SelectionState {
        &self.cells
    }

    pub fn rows(&self) -> &HashSet<RowId> {
        &self.rows
    }

    pub fn columns(&self) -> &BTreeSet<usize> {
        &self.columns
    }

    /// Select the rectangle spanned by `a` and `b` with `a` as the anchor.
    /// Clears row and column selection.
    pub fn select_cells(&mut self, a: CellIndex, b: CellIndex) -> &SelectionState {
        self.rows.clear();
        self.columns.clear();
        self.cells = SelectionState::spanning(Some(a), a, b);
        &self.cells
    }

    /// Extend the current range from its anchor to `cell`.
    pub fn extend_to(&mut self, cell: CellIndex) -> &SelectionState {
        let anchor = self.cells.primary.unwrap_or(cell);
        self.select_cells(anchor, cell)
    }

    pub fn clear_cells(&mut self) {
        self.cells = SelectionState::default();
    }

    /// Select rows by identity. With `append`, adds to the current row set.
    pub fn select_rows<I>(&mut self, ids: I, append: bool)
    where
        I: IntoIterator<Item = RowId>,
    {
        self.clear_cells();
        self.columns.clear();
        if !append {
            self.rows.clear();
        }
        self.rows.extend(ids);
    }

    /// Toggle one row; returns whether it is selected afterwards.
    pub fn toggle_row(&mut self, id: &str) -> bool {
        self.clear_cells();
        self.columns.clear();
        if self.rows.remove(id) {
            false
        } else {
            self.rows.insert(id.to_string());
            true
        }
    }

    pub fn is_row_selected(&self, id: &str) -> bool {
        self.rows.contains(id)
    }

    /// Select columns by visible index. With `append`, adds to the current set.
    pub fn select_columns<I>(&mut self, indices: I, append: bool)
    where
        I: IntoIterator<Item = usize>,
    {
        self.clear_cells();
        self.rows.clear();
        if !append {
            self.columns.clear();
        }
        self.columns.extend(indices);
    }

    /// Whether the selected columns form one run without gaps.
    pub fn columns_contiguous(&self) -> bool {
        match (self.columns.first(), self.columns.last()) {
            (Some(first), Some(last)) => last - first + 1 == self.columns.len(),
            _ => true,
        }
    }

    pub fn clear(&mut self) {
        self.clear_cells();
        self.rows.clear();
        self.columns.clear();
    }

    /// Re-check the selection against a new layout.
    ///
    /// The cell range is clamped to `row_count x column_count` (dropped when
    /// the grid became empty), rows no longer present are removed and
    /// out-of-range columns are dropped.
    pub fn revalidate(
        &mut self,
        row_count: usize,
        column_count: usize,
        row_exists: impl Fn(&str) -> bool,
    ) {
        if let Some((start, end)) = self.cells.bounds() {
            if row_count == 0 || column_count == 0 {
                self.clear_cells();
            } else {
                let clamp = |cell: CellIndex| {
                    CellIndex::new(
                        cell.row_index.min(row_count - 1),
                        cell.column_index.min(column_count - 1),
                    )
                };
                let primary = self.cells.primary.map(clamp);
                self.cells = SelectionState::spanning(primary, clamp(start), clamp(end));
            }
        }
        self.rows.retain(|id| row_exists(id));
        self.columns.retain(|&c| c < column_count);
    }
}
