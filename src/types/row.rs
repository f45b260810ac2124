use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use super::{CellValue, ColumnId, RowViewProps};

pub type RowId = String;

static NEXT_ROW_SEQ: AtomicU64 = AtomicU64::new(1);

/// Generate a fresh row id: creation time plus a process-wide sequence.
pub fn generate_row_id() -> RowId {
    let millis = web_time::SystemTime::now()
        .duration_since(web_time::SystemTime::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let seq = NEXT_ROW_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("r{millis:x}{seq:04x}")
}

/// Editability override of a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowEditable {
    /// Applies to every cell of the row.
    All(bool),
    /// Per-column override; columns not listed fall back to the column flag.
    Columns(HashMap<ColumnId, bool>),
}

/// A grid row. Keys of `data` are column ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    #[serde(default = "generate_row_id")]
    pub id: RowId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub data: HashMap<ColumnId, CellValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editable: Option<RowEditable>,
    #[serde(default = "default_true")]
    pub deletable: bool,
    #[serde(default)]
    pub selected: bool,
    /// Layout metadata (not serialized).
    #[serde(skip)]
    pub view_props: RowViewProps,
}

fn default_true() -> bool {
    true
}

impl Default for Row {
    fn default() -> Self {
        Self::new()
    }
}

impl Row {
    /// Create an empty row with a freshly generated id.
    pub fn new() -> Self {
        Self::with_id(generate_row_id())
    }

    pub fn with_id(id: impl Into<RowId>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            data: HashMap::new(),
            editable: None,
            deletable: true,
            selected: false,
            view_props: RowViewProps::default(),
        }
    }

    #[must_use]
    pub fn with_value(mut self, column: impl Into<ColumnId>, value: impl Into<CellValue>) -> Self {
        self.data.insert(column.into(), value.into());
        self
    }

    /// Value at `column`, `Empty` when absent.
    pub fn value(&self, column: &str) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.data.get(column).unwrap_or(&EMPTY)
    }

    /// Row-level editability override for a column, if any.
    pub fn editable_override(&self, column: &str) -> Option<bool> {
        match &self.editable {
            None => None,
            Some(RowEditable::All(flag)) => Some(*flag),
            Some(RowEditable::Columns(map)) => map.get(column).copied(),
        }
    }
}
