//! Structured error types for xlgrid.
//!
//! Only host-supplied input that is plainly wrong (unknown ids, targets that
//! refuse edits, malformed configuration) becomes an error. Stale indices and
//! unsupported data-type combinations are handled by the callers as no-ops.

/// All errors that can be reported to the host.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// No row with this id is owned by the grid.
    #[error("Unknown row: {0}")]
    UnknownRow(String),

    /// No column with this id is owned by the grid.
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// A row with this id already exists.
    #[error("Duplicate row: {0}")]
    DuplicateRow(String),

    /// A column with this id already exists.
    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),

    /// The value does not fit the column's field.
    #[error("Invalid value for column {column}: {value}")]
    InvalidValue { column: String, value: String },

    /// The row/column pair refuses edits.
    #[error("Cell is not editable: row {row}, column {column}")]
    NotEditable { row: String, column: String },

    /// The row or column refuses deletion.
    #[error("Not deletable: {0}")]
    NotDeletable(String),

    /// A multi-column paste target has gaps between its column indices.
    #[error("Selected columns are not contiguous")]
    NonContiguousColumns,

    /// Configuration values out of range.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// JSON (de)serialization error.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Catch-all for string errors.
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GridError>;

impl From<String> for GridError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for GridError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<GridError> for wasm_bindgen::JsValue {
    fn from(e: GridError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
