//! Viewport state management for scrolling.

use std::ops::Range;

use super::GridLayout;

/// Viewport state - the visible area of the grid content
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    /// Horizontal scroll position in content coordinates
    pub scroll_x: f32,
    /// Vertical scroll position in content coordinates
    pub scroll_y: f32,
    /// Viewport width in pixels
    pub width: f32,
    /// Viewport height in pixels
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewport {
    /// Create a new viewport with default values
    pub fn new() -> Self {
        Self {
            scroll_x: 0.0,
            scroll_y: 0.0,
            width: 800.0,
            height: 600.0,
        }
    }

    /// Visible columns: frozen columns first, then scrollable columns
    /// intersecting the area right of the frozen band.
    pub fn visible_columns(&self, layout: &GridLayout) -> Vec<usize> {
        let frozen_width = layout.frozen_columns_width();
        let mut columns: Vec<usize> = (0..layout.frozen_columns).collect();
        let start = self.scroll_x + frozen_width;
        let end = self.scroll_x + self.width;
        columns.extend(
            layout
                .find_column_inside_viewport(start, end)
                .into_iter()
                .filter(|&c| c >= layout.frozen_columns),
        );
        columns
    }

    /// Display positions of visible rows.
    pub fn visible_rows(&self, layout: &GridLayout) -> Range<usize> {
        layout.find_row_inside_viewport(self.scroll_y, self.scroll_y + self.height)
    }

    /// Convert content coordinates to screen coordinates for a cell in
    /// visible column `column`, accounting for frozen columns.
    ///
    /// Frozen columns render at their natural position (no horizontal scroll).
    pub fn to_screen(&self, x: f32, y: f32, column: usize, layout: &GridLayout) -> (f32, f32) {
        let screen_x = if column < layout.frozen_columns {
            x
        } else {
            x - self.scroll_x
        };
        (screen_x, y - self.scroll_y)
    }

    /// Convert screen coordinates to content coordinates.
    ///
    /// A point over the frozen band maps to the frozen columns.
    pub fn to_content(&self, screen_x: f32, screen_y: f32, layout: &GridLayout) -> (f32, f32) {
        let x = if screen_x < layout.frozen_columns_width() {
            screen_x
        } else {
            screen_x + self.scroll_x
        };
        (x, screen_y + self.scroll_y)
    }

    /// Clamp scroll position to valid range.
    pub fn clamp_scroll(&mut self, layout: &GridLayout) {
        let max_x = (layout.total_width() - self.width).max(0.0);
        let max_y = (layout.total_height - self.height).max(0.0);
        self.scroll_x = self.scroll_x.clamp(0.0, max_x);
        self.scroll_y = self.scroll_y.clamp(0.0, max_y);
    }

    /// Scroll by delta amounts
    pub fn scroll_by(&mut self, delta_x: f32, delta_y: f32, layout: &GridLayout) {
        self.scroll_x += delta_x;
        self.scroll_y += delta_y;
        self.clamp_scroll(layout);
    }

    /// Set absolute scroll position
    pub fn set_scroll(&mut self, x: f32, y: f32, layout: &GridLayout) {
        self.scroll_x = x;
        self.scroll_y = y;
        self.clamp_scroll(layout);
    }

    /// Scroll vertically just enough to show `[top, top + height)`.
    pub fn scroll_into_view(&mut self, top: f32, height: f32, layout: &GridLayout) {
        if top < self.scroll_y {
            self.scroll_y = top;
        } else if top + height > self.scroll_y + self.height {
            self.scroll_y = top + height - self.height;
        }
        self.clamp_scroll(layout);
    }

    /// Resize the viewport
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::config::GridConfig;
    use crate::grouping::{group_by, GroupMetadata};
    use crate::types::{Column, DataType};

    fn layout(frozen_columns: usize) -> GridLayout {
        let mut columns: Vec<Column> = (0..10)
            .map(|i| Column::new(format!("c{i}"), DataType::Text).with_width(100.0))
            .collect();
        let root = group_by(
            (0..100u32).collect(),
            |_: &u32, _| 0u8,
            |a: &u8, b: &u8, _| a.cmp(b),
            |_| GroupMetadata::default(),
            0,
        );
        let config = GridConfig {
            frozen_columns,
            ..GridConfig::default()
        };
        GridLayout::compute(&mut columns, &root, &config)
    }

    #[test]
    fn test_clamp_scroll() {
        let layout = layout(0);
        let mut viewport = Viewport::new();
        viewport.set_scroll(5000.0, -10.0, &layout);
        assert_eq!(viewport.scroll_x, 200.0);
        assert_eq!(viewport.scroll_y, 0.0);
    }

    #[test]
    fn test_frozen_columns_always_visible() {
        let layout = layout(2);
        let mut viewport = Viewport::new();
        viewport.resize(400.0, 300.0);
        viewport.set_scroll(500.0, 0.0, &layout);
        assert_eq!(viewport.visible_columns(&layout), vec![0, 1, 7, 8]);
    }

    #[test]
    fn test_visible_rows() {
        let layout = layout(0);
        let mut viewport = Viewport::new();
        viewport.resize(400.0, 320.0);
        viewport.set_scroll(0.0, 64.0, &layout);
        assert_eq!(viewport.visible_rows(&layout), 2..12);
    }

    #[test]
    fn test_scroll_into_view() {
        let layout = layout(0);
        let mut viewport = Viewport::new();
        viewport.resize(400.0, 320.0);
        viewport.scroll_into_view(32.0 * 50.0, 32.0, &layout);
        assert_eq!(viewport.scroll_y, 32.0 * 51.0 - 320.0);
    }
}
