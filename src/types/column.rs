use serde::{Deserialize, Serialize};

use super::{CalculateType, ColumnViewProps, DataType, Field, GroupingType, SortingType};

pub type ColumnId = String;

/// Default column width in pixels.
pub const DEFAULT_COLUMN_WIDTH: f32 = 180.0;

fn default_width() -> f32 {
    DEFAULT_COLUMN_WIDTH
}

fn default_true() -> bool {
    true
}

/// A grid column. Identity (`id`), not position, is authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: ColumnId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub field: Field,
    #[serde(default = "default_width")]
    pub width: f32,
    #[serde(default = "default_true")]
    pub editable: bool,
    #[serde(default = "default_true")]
    pub deletable: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculate_type: Option<CalculateType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grouping_type: Option<GroupingType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sorting_type: Option<SortingType>,
    /// Layout metadata (not serialized).
    #[serde(skip)]
    pub view_props: ColumnViewProps,
}

impl Column {
    pub fn new(id: impl Into<ColumnId>, data_type: DataType) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            field: Field::new(data_type),
            width: DEFAULT_COLUMN_WIDTH,
            editable: true,
            deletable: true,
            hidden: false,
            calculate_type: None,
            grouping_type: None,
            sorting_type: None,
            view_props: ColumnViewProps::default(),
        }
    }

    #[must_use]
    pub fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn data_type(&self) -> DataType {
        self.field.data_type
    }
}
