//! Paste planning.
//!
//! The target block starts at the selection's top-left corner and covers the
//! larger of the selection and clipboard shapes on each axis, clamped to the
//! grid. Every target cell takes the clipboard cell at its offset modulo the
//! clipboard shape, so a small clipboard repeats across a larger target.

use std::collections::BTreeSet;

use crate::error::{GridError, Result};
use crate::types::{CellIndex, MatrixCell, SelectionState};

/// Where a paste lands.
#[derive(Debug, Clone, PartialEq)]
pub enum PasteTarget<'a> {
    Cells(&'a SelectionState),
    /// Whole columns (visible indices); every row is targeted.
    Columns(&'a BTreeSet<usize>),
}

/// Resolved paste: the re-extended selection and the text for each cell.
#[derive(Debug, Clone, PartialEq)]
pub struct PastePlan {
    pub start: CellIndex,
    pub end: CellIndex,
    pub cells: Vec<(CellIndex, String)>,
}

/// Plan a paste of `clipboard` into `target` on a `row_count x column_count` grid.
///
/// Returns `Ok(None)` when there is nothing to paste or no target.
///
/// # Errors
/// Returns [`GridError::NonContiguousColumns`] when the target columns have gaps.
pub fn plan_paste(
    clipboard: &MatrixCell<String>,
    target: &PasteTarget<'_>,
    row_count: usize,
    column_count: usize,
) -> Result<Option<PastePlan>> {
    let clip_rows = clipboard.row_count();
    let clip_columns = clipboard.column_count();
    if clip_rows == 0 || clip_columns == 0 || row_count == 0 || column_count == 0 {
        return Ok(None);
    }

    let (start, selected_rows, selected_columns) = match target {
        PasteTarget::Cells(state) => {
            let Some((start, _)) = state.bounds() else {
                return Ok(None);
            };
            (start, state.row_count, state.column_count)
        }
        PasteTarget::Columns(columns) => {
            let (Some(&first), Some(&last)) = (columns.first(), columns.last()) else {
                return Ok(None);
            };
            if last - first + 1 != columns.len() {
                tracing::warn!(target: "xlgrid::selection", ?columns, "paste into non-contiguous columns");
                return Err(GridError::NonContiguousColumns);
            }
            (CellIndex::new(0, first), row_count, columns.len())
        }
    };
    if start.row_index >= row_count || start.column_index >= column_count {
        return Ok(None);
    }

    let rows = selected_rows.max(clip_rows).min(row_count - start.row_index);
    let columns = selected_columns
        .max(clip_columns)
        .min(column_count - start.column_index);
    let end = CellIndex::new(start.row_index + rows - 1, start.column_index + columns - 1);

    let mut cells = Vec::with_capacity(rows * columns);
    for r in 0..rows {
        for c in 0..columns {
            let text = clipboard
                .get(r % clip_rows, c % clip_columns)
                .cloned()
                .unwrap_or_default();
            cells.push((
                CellIndex::new(start.row_index + r, start.column_index + c),
                text,
            ));
        }
    }
    Ok(Some(PastePlan { start, end, cells }))
}
