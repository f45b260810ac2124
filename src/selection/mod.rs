//! Cell, row and column selection plus the fill handle and clipboard.

mod clipboard;
mod fill;
mod gesture;
mod model;
mod paste;

use serde::Serialize;

pub use clipboard::{escape_cell_value, parse_tsv, to_tsv};
pub use fill::{extrapolate, FilledCell};
pub use gesture::{FillRequest, GesturePhase, SelectionGesture};
pub use model::SelectionModel;
pub use paste::{plan_paste, PastePlan, PasteTarget};

use crate::types::DataType;

/// Outcome of a bulk cell operation. Partial success is normal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationReport {
    pub success: usize,
    pub total: usize,
}

impl OperationReport {
    pub fn is_complete(&self) -> bool {
        self.success == self.total
    }

    pub fn record(&mut self, ok: bool) {
        self.total += 1;
        if ok {
            self.success += 1;
        }
    }
}

/// Filter applied by `get_cells`: excluded cells become holes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellExclusion {
    pub data_types: Vec<DataType>,
    /// Hole out required cells that are empty.
    pub required_empty: bool,
    /// Hole out cells that refuse edits.
    pub non_editable: bool,
}

impl CellExclusion {
    /// Exclusions for cells about to be written (fill, paste, clear).
    pub fn writable() -> Self {
        Self {
            data_types: Vec::new(),
            required_empty: false,
            non_editable: true,
        }
    }

    pub fn excludes_type(&self, data_type: DataType) -> bool {
        self.data_types.contains(&data_type)
    }
}
