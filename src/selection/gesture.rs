//! Pointer gesture state machine for cell selection and the fill handle.
//!
//! `Idle -> Selecting (pointer down) -> Extending (drag or shift) ->
//! Committed (pointer up)`. `Filling` is entered from `Committed` when the
//! fill handle is grabbed and ends with a [`FillRequest`] on pointer up.

use super::SelectionModel;
use crate::types::CellIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GesturePhase {
    #[default]
    Idle,
    Selecting,
    Extending,
    Committed,
    Filling,
}

/// A completed fill-handle drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillRequest {
    pub source_start: CellIndex,
    pub source_end: CellIndex,
    pub target_start: CellIndex,
    pub target_end: CellIndex,
    /// Target lies above the source.
    pub reverse: bool,
}

impl FillRequest {
    pub fn target_rows(&self) -> usize {
        self.target_end.row_index - self.target_start.row_index + 1
    }
}

#[derive(Debug, Clone, Default)]
pub struct SelectionGesture {
    phase: GesturePhase,
    fill: Option<FillRequest>,
}

impl SelectionGesture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    /// Pending fill target while `Filling`.
    pub fn fill_preview(&self) -> Option<&FillRequest> {
        self.fill.as_ref()
    }

    /// Pointer pressed on `cell`. With `extend` (shift held) and an existing
    /// anchor the range grows from the anchor instead.
    pub fn pointer_down(&mut self, model: &mut SelectionModel, cell: CellIndex, extend: bool) {
        if extend && model.cells().primary.is_some() {
            model.extend_to(cell);
            self.phase = GesturePhase::Extending;
        } else {
            model.select_cells(cell, cell);
            self.phase = GesturePhase::Selecting;
        }
        self.fill = None;
    }

    /// Pointer moved over `cell`.
    pub fn pointer_move(&mut self, model: &mut SelectionModel, cell: CellIndex) {
        match self.phase {
            GesturePhase::Selecting | GesturePhase::Extending => {
                model.extend_to(cell);
                self.phase = GesturePhase::Extending;
            }
            GesturePhase::Filling => {
                self.fill = fill_target(model, cell);
            }
            GesturePhase::Idle | GesturePhase::Committed => {}
        }
    }

    /// Pointer released. Returns the fill to apply when a fill drag ends.
    pub fn pointer_up(&mut self) -> Option<FillRequest> {
        match self.phase {
            GesturePhase::Selecting | GesturePhase::Extending => {
                self.phase = GesturePhase::Committed;
                None
            }
            GesturePhase::Filling => {
                self.phase = GesturePhase::Committed;
                self.fill.take()
            }
            GesturePhase::Idle | GesturePhase::Committed => None,
        }
    }

    /// Grab the fill handle. Only a committed, non-empty range can be filled.
    pub fn grab_fill_handle(&mut self, model: &SelectionModel) -> bool {
        if self.phase != GesturePhase::Committed || model.cells().is_empty() {
            return false;
        }
        self.phase = GesturePhase::Filling;
        self.fill = None;
        true
    }

    pub fn cancel(&mut self) {
        self.phase = GesturePhase::Idle;
        self.fill = None;
    }
}

/// Rows between the selection and the pointer, above or below it.
fn fill_target(model: &SelectionModel, pointer: CellIndex) -> Option<FillRequest> {
    let (start, end) = model.cells().bounds()?;
    let (target_start, target_end, reverse) = if pointer.row_index > end.row_index {
        (
            CellIndex::new(end.row_index + 1, start.column_index),
            CellIndex::new(pointer.row_index, end.column_index),
            false,
        )
    } else if pointer.row_index < start.row_index {
        (
            CellIndex::new(pointer.row_index, start.column_index),
            CellIndex::new(start.row_index - 1, end.column_index),
            true,
        )
    } else {
        return None;
    };
    Some(FillRequest {
        source_start: start,
        source_end: end,
        target_start,
        target_end,
        reverse,
    })
}
