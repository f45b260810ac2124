use std::collections::HashMap;

use serde::Serialize;

use crate::grouping::GroupId;
use crate::selection::OperationReport;
use crate::types::{CalculateType, CellValue, Column, ColumnId, Row, RowId, SelectionState};

/// Notification sent to the host, serialized as `{"type": ..., "payload": ...}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum GridEvent {
    #[serde(rename_all = "camelCase")]
    AddRow { row: Row, position: usize },
    DeleteRows { ids: Vec<RowId> },
    MoveRow { id: RowId, from: usize, to: usize },
    /// Latest data of a row; later edits of the same row replace it.
    UpdateRow {
        id: RowId,
        data: HashMap<ColumnId, CellValue>,
    },
    SelectRows { ids: Vec<RowId> },
    SelectCells { state: SelectionState },
    AddColumn { column: Column, position: usize },
    DeleteColumn { id: ColumnId },
    MoveColumn { id: ColumnId, from: usize, to: usize },
    ResizeColumn { id: ColumnId, width: f32 },
    HideColumn { id: ColumnId, hidden: bool },
    FreezeColumns { count: usize },
    #[serde(rename_all = "camelCase")]
    Group { column_ids: Vec<ColumnId> },
    #[serde(rename_all = "camelCase")]
    Sort { column_ids: Vec<ColumnId> },
    #[serde(rename_all = "camelCase")]
    Calculate {
        column_id: ColumnId,
        calculate_type: Option<CalculateType>,
    },
    #[serde(rename_all = "camelCase")]
    Collapse { group_id: GroupId, collapsed: bool },
    /// Advisory outcome of a bulk operation (paste, fill).
    Notice {
        message: String,
        report: OperationReport,
    },
}

/// Kind part of an [`EventKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    AddRow,
    DeleteRows,
    MoveRow,
    UpdateRow,
    SelectRows,
    SelectCells,
    AddColumn,
    DeleteColumn,
    MoveColumn,
    ResizeColumn,
    HideColumn,
    FreezeColumns,
    Group,
    Sort,
    Calculate,
    Collapse,
    Notice,
}

/// Coalescing identity of an event: its kind and the object it is about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EventKey {
    pub kind: EventKind,
    pub target: String,
}

impl EventKey {
    pub fn new(kind: EventKind, target: impl Into<String>) -> Self {
        Self {
            kind,
            target: target.into(),
        }
    }
}

impl GridEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GridEvent::AddRow { .. } => EventKind::AddRow,
            GridEvent::DeleteRows { .. } => EventKind::DeleteRows,
            GridEvent::MoveRow { .. } => EventKind::MoveRow,
            GridEvent::UpdateRow { .. } => EventKind::UpdateRow,
            GridEvent::SelectRows { .. } => EventKind::SelectRows,
            GridEvent::SelectCells { .. } => EventKind::SelectCells,
            GridEvent::AddColumn { .. } => EventKind::AddColumn,
            GridEvent::DeleteColumn { .. } => EventKind::DeleteColumn,
            GridEvent::MoveColumn { .. } => EventKind::MoveColumn,
            GridEvent::ResizeColumn { .. } => EventKind::ResizeColumn,
            GridEvent::HideColumn { .. } => EventKind::HideColumn,
            GridEvent::FreezeColumns { .. } => EventKind::FreezeColumns,
            GridEvent::Group { .. } => EventKind::Group,
            GridEvent::Sort { .. } => EventKind::Sort,
            GridEvent::Calculate { .. } => EventKind::Calculate,
            GridEvent::Collapse { .. } => EventKind::Collapse,
            GridEvent::Notice { .. } => EventKind::Notice,
        }
    }

    /// Key under which this event is coalesced.
    pub fn key(&self) -> EventKey {
        let target = match self {
            GridEvent::AddRow { row, .. } => row.id.clone(),
            GridEvent::MoveRow { id, .. } | GridEvent::UpdateRow { id, .. } => id.clone(),
            GridEvent::DeleteRows { ids } => ids.join(","),
            GridEvent::AddColumn { column, .. } => column.id.clone(),
            GridEvent::DeleteColumn { id }
            | GridEvent::MoveColumn { id, .. }
            | GridEvent::ResizeColumn { id, .. }
            | GridEvent::HideColumn { id, .. } => id.clone(),
            GridEvent::Calculate { column_id, .. } => column_id.clone(),
            GridEvent::Collapse { group_id, .. } => group_id.to_string(),
            GridEvent::Notice { message, .. } => message.clone(),
            GridEvent::SelectRows { .. }
            | GridEvent::SelectCells { .. }
            | GridEvent::FreezeColumns { .. }
            | GridEvent::Group { .. }
            | GridEvent::Sort { .. } => String::new(),
        };
        EventKey::new(self.kind(), target)
    }
}
