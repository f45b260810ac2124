//! Layout metadata attached to rows, columns and groups.
//!
//! These fields are written by the relayout pass only and are the single
//! source of truth for where an item is drawn.

use serde::Serialize;

/// Rectangle in grid content coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Whether `[top, bottom)` contains `y`.
    pub fn contains_y(&self, y: f32) -> bool {
        y >= self.top && y < self.bottom()
    }

    /// Whether `[top, bottom)` intersects `[start, end)`.
    pub fn intersects_y(&self, start: f32, end: f32) -> bool {
        self.top < end && self.bottom() > start
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowViewProps {
    /// Position in the flattened display order.
    pub index: usize,
    pub rect: Rect,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnViewProps {
    /// Position among the visible (non-hidden) columns.
    pub index: usize,
    pub rect: Rect,
    /// Cumulative left offset in pixels.
    pub offset: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupViewProps {
    /// Position among siblings.
    pub index: usize,
    /// Header, content and footer of the group.
    pub rect: Rect,
    /// Index of the group's first item in the flattened display order.
    pub start_item_index: usize,
    /// Height of the header band at the top of `rect`.
    pub header_height: f32,
}

impl GroupViewProps {
    /// Offset where the group's content (children or rows) starts.
    pub fn content_top(&self) -> f32 {
        self.rect.top + self.header_height
    }
}
