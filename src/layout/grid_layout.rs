//! Pre-computed layout data for a grid.
//!
//! Positions are computed once per relayout in a single top-down pass,
//! enabling O(log n) lookups for hit testing and viewport queries.

use crate::config::GridConfig;
use crate::grouping::GroupRef;
use crate::types::{Column, ColumnViewProps, GroupViewProps, Rect};

/// Pre-computed layout data for a grid
#[derive(Debug, Clone, Default)]
pub struct GridLayout {
    /// Cumulative column positions over visible columns
    /// (`column_positions[i]` = x of visible column i's left edge, plus a final edge)
    pub column_positions: Vec<f32>,
    /// Index into the column list of each visible column
    pub visible_columns: Vec<usize>,
    /// Top edge of each displayed row, in display order
    pub row_tops: Vec<f32>,
    /// Item index (position in the root's items) of each displayed row
    pub row_items: Vec<usize>,
    /// Top edge per item index; `None` for rows inside a collapsed group
    pub item_tops: Vec<Option<f32>>,
    pub row_height: f32,
    /// Number of frozen (leading visible) columns
    pub frozen_columns: usize,
    pub total_height: f32,
}

struct Metrics {
    row_height: f32,
    header: f32,
    footer: f32,
    gap: f32,
    width: f32,
}

impl GridLayout {
    /// Lay out `columns` left to right and the tree below `root` top to bottom.
    ///
    /// Writes column and group view-props in place; row rectangles are
    /// available through [`row_rect`](Self::row_rect).
    pub fn compute<T>(columns: &mut [Column], root: &GroupRef<T>, config: &GridConfig) -> Self {
        let mut column_positions = Vec::with_capacity(columns.len() + 1);
        let mut visible_columns = Vec::with_capacity(columns.len());
        let mut x: f32 = 0.0;

        for (i, column) in columns.iter_mut().enumerate() {
            if column.hidden {
                column.view_props = ColumnViewProps::default();
                continue;
            }
            column_positions.push(x);
            column.view_props = ColumnViewProps {
                index: visible_columns.len(),
                rect: Rect::new(x, 0.0, column.width, config.row_height),
                offset: x,
            };
            visible_columns.push(i);
            x += column.width;
        }
        column_positions.push(x); // Final edge

        let metrics = Metrics {
            row_height: config.row_height,
            header: config.group_header_height,
            footer: config.group_footer_height,
            gap: config.group_gap,
            width: x,
        };

        let mut layout = GridLayout {
            column_positions,
            frozen_columns: config.frozen_columns.min(visible_columns.len()),
            visible_columns,
            row_tops: Vec::with_capacity(root.len()),
            row_items: Vec::with_capacity(root.len()),
            item_tops: vec![None; root.len()],
            row_height: config.row_height,
            total_height: 0.0,
        };
        layout.total_height = layout.layout_group(root, 0.0, 0, 0, true, &metrics);
        layout
    }

    /// Lay out one group starting at `top`; returns its bottom edge.
    fn layout_group<T>(
        &mut self,
        node: &GroupRef<T>,
        top: f32,
        start_item_index: usize,
        index: usize,
        is_root: bool,
        metrics: &Metrics,
    ) -> f32 {
        let header = if is_root { 0.0 } else { metrics.header };
        let footer = if is_root { 0.0 } else { metrics.footer };
        let mut y = top + header;

        if !node.is_collapsed() {
            let children = node.children();
            if children.is_empty() {
                for offset in 0..node.len() {
                    let item = start_item_index + offset;
                    self.row_tops.push(y);
                    self.row_items.push(item);
                    if let Some(slot) = self.item_tops.get_mut(item) {
                        *slot = Some(y);
                    }
                    y += metrics.row_height;
                }
            } else {
                let mut item = start_item_index;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        y += metrics.gap;
                    }
                    y = self.layout_group(child, y, item, i, false, metrics);
                    item += child.len();
                }
            }
            y += footer;
        }

        node.set_view_props(GroupViewProps {
            index,
            rect: Rect::new(0.0, top, metrics.width, y - top),
            start_item_index,
            header_height: header,
        });
        y
    }

    /// Number of visible columns
    pub fn column_count(&self) -> usize {
        self.visible_columns.len()
    }

    /// Number of displayed (not collapsed away) rows
    pub fn displayed_row_count(&self) -> usize {
        self.row_tops.len()
    }

    /// Get total width of the grid
    pub fn total_width(&self) -> f32 {
        self.column_positions.last().copied().unwrap_or(0.0)
    }

    /// Left edge and width of visible column `index`
    pub fn column_span(&self, index: usize) -> Option<(f32, f32)> {
        let left = *self.column_positions.get(index)?;
        let right = *self.column_positions.get(index + 1)?;
        Some((left, right - left))
    }

    /// Rectangle of the row at item index `item`, if displayed
    pub fn row_rect(&self, item: usize) -> Option<Rect> {
        let top = (*self.item_tops.get(item)?)?;
        Some(Rect::new(0.0, top, self.total_width(), self.row_height))
    }

    /// Get the total width of frozen columns (returns 0 if no frozen columns)
    pub fn frozen_columns_width(&self) -> f32 {
        if self.frozen_columns == 0 {
            return 0.0;
        }
        self.column_positions
            .get(self.frozen_columns)
            .copied()
            .unwrap_or(0.0)
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
    use crate::grouping::{group_by, GroupMetadata};
    use crate::types::DataType;

    fn columns() -> Vec<Column> {
        vec![
            Column::new("a", DataType::Text).with_width(100.0),
            Column::new("b", DataType::Text).with_width(50.0),
            Column::new("c", DataType::Text).with_width(70.0),
        ]
    }

    fn tree(depth: usize) -> GroupRef<u32> {
        group_by(
            (0..6).collect(),
            |n: &u32, _| n % 2,
            |a: &u32, b: &u32, _| a.cmp(b),
            |_| GroupMetadata::default(),
            depth,
        )
    }

    #[test]
    fn test_column_positions_skip_hidden() {
        let mut cols = columns();
        cols[1].hidden = true;
        let layout = GridLayout::compute(&mut cols, &tree(0), &GridConfig::default());
        assert_eq!(layout.column_positions, vec![0.0, 100.0, 170.0]);
        assert_eq!(layout.visible_columns, vec![0, 2]);
        assert_eq!(cols[2].view_props.offset, 100.0);
        assert_eq!(cols[2].view_props.index, 1);
        assert_eq!(layout.total_width(), 170.0);
    }

    #[test]
    fn test_flat_rows() {
        let config = GridConfig::default();
        let layout = GridLayout::compute(&mut columns(), &tree(0), &config);
        assert_eq!(layout.displayed_row_count(), 6);
        assert_eq!(layout.row_rect(2).unwrap().top, 64.0);
        assert_eq!(layout.total_height, 6.0 * 32.0);
    }

    #[test]
    fn test_grouped_rows_with_headers_and_gap() {
        let config = GridConfig::default();
        let root = tree(1);
        let layout = GridLayout::compute(&mut columns(), &root, &config);
        let children = root.children();
        // even: 0 2 4, odd: 1 3 5
        let first = children[0].view_props();
        assert_eq!(first.rect.top, 0.0);
        assert_eq!(first.rect.height, 48.0 + 3.0 * 32.0);
        let second = children[1].view_props();
        assert_eq!(second.rect.top, first.rect.bottom() + 16.0);
        assert_eq!(second.start_item_index, 3);
        assert_eq!(layout.row_rect(3).unwrap().top, second.rect.top + 48.0);
        assert_eq!(layout.total_height, second.rect.bottom());
    }

    #[test]
    fn test_collapsed_group_hides_rows() {
        let root = tree(1);
        root.children()[0].set_collapsed(true);
        let layout = GridLayout::compute(&mut columns(), &root, &GridConfig::default());
        assert_eq!(layout.displayed_row_count(), 3);
        assert!(layout.row_rect(0).is_none());
        assert_eq!(root.children()[0].view_props().rect.height, 48.0);
    }
}
