//! Grid-scoped exclusive state.
//!
//! At most one row is mid-insertion (the draft row) and at most one cell is
//! mid-edit at a time. Both live in an [`ExclusiveSlot`] owned by the grid
//! instance rather than in process-wide statics.

use crate::types::{CellIndex, RowId};

/// Holds at most one value. Setting a new value hands back the old one so
/// the caller can flush it first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusiveSlot<T> {
    current: Option<T>,
}

impl<T> Default for ExclusiveSlot<T> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<T> ExclusiveSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Occupy the slot, returning the previous occupant.
    #[must_use = "the previous occupant must be flushed or discarded explicitly"]
    pub fn set(&mut self, value: T) -> Option<T> {
        self.current.replace(value)
    }

    pub fn get(&self) -> Option<&T> {
        self.current.as_ref()
    }

    pub fn is_set(&self) -> bool {
        self.current.is_some()
    }

    pub fn take(&mut self) -> Option<T> {
        self.current.take()
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

impl<T: PartialEq> ExclusiveSlot<T> {
    pub fn holds(&self, value: &T) -> bool {
        self.current.as_ref() == Some(value)
    }
}

/// The uncommitted row, if any.
pub type DraftRow = ExclusiveSlot<RowId>;

/// The cell being edited, if any.
pub type SelectingCell = ExclusiveSlot<CellIndex>;
