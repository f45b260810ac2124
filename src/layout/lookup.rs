//! Binary-search lookups over pre-computed layout.
//!
//! Every span is half-open `[start, start + size)`: an offset exactly on a
//! boundary belongs to the item that starts there.

use std::ops::Range;

use super::GridLayout;
use crate::grouping::GroupRef;

impl GridLayout {
    /// Find the visible column at x position (binary search)
    pub fn find_column_at_offset(&self, x: f32) -> Option<usize> {
        if !(x >= 0.0 && x < self.total_width()) {
            return None;
        }
        let index = match self
            .column_positions
            .binary_search_by(|pos| pos.partial_cmp(&x).unwrap_or(std::cmp::Ordering::Equal))
        {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        (index < self.column_count()).then_some(index)
    }

    /// Every visible column whose span intersects `[start, end)`, in order.
    ///
    /// Splits the column range around a midpoint and descends into both
    /// halves whenever the midpoint column overlaps the query, so partially
    /// visible edge columns are included.
    pub fn find_column_inside_viewport(&self, start: f32, end: f32) -> Vec<usize> {
        let mut out = Vec::new();
        if end > start {
            self.collect_columns(0..self.column_count(), start, end, &mut out);
        }
        out
    }

    fn collect_columns(&self, range: Range<usize>, start: f32, end: f32, out: &mut Vec<usize>) {
        if range.is_empty() {
            return;
        }
        let mid = range.start + (range.end - range.start) / 2;
        let Some((left, width)) = self.column_span(mid) else {
            return;
        };
        let right = left + width;
        if right <= start {
            self.collect_columns(mid + 1..range.end, start, end, out);
        } else if left >= end {
            self.collect_columns(range.start..mid, start, end, out);
        } else {
            self.collect_columns(range.start..mid, start, end, out);
            if width > 0.0 {
                out.push(mid);
            }
            self.collect_columns(mid + 1..range.end, start, end, out);
        }
    }

    /// Display positions (indices into `row_tops`) of rows intersecting `[start, end)`.
    pub fn find_row_inside_viewport(&self, start: f32, end: f32) -> Range<usize> {
        if end <= start {
            return 0..0;
        }
        let height = self.row_height;
        let first = self.row_tops.partition_point(|&top| top + height <= start);
        let last = self.row_tops.partition_point(|&top| top < end);
        first..last.max(first)
    }

    /// Display position of the row at y position.
    pub fn find_row_at_offset(&self, y: f32) -> Option<usize> {
        let position = self.row_tops.partition_point(|&top| top <= y).checked_sub(1)?;
        let top = *self.row_tops.get(position)?;
        (y < top + self.row_height).then_some(position)
    }

    /// Item index of the row at y position.
    pub fn find_item_at_offset(&self, y: f32) -> Option<usize> {
        self.row_items.get(self.find_row_at_offset(y)?).copied()
    }
}

/// Deepest group whose rectangle contains `y`.
///
/// An offset inside a group's header band resolves to that group, and a
/// collapsed group is never descended into.
pub fn find_group_at_pointer_offset<T>(root: &GroupRef<T>, y: f32) -> Option<GroupRef<T>> {
    let props = root.view_props();
    if !props.rect.contains_y(y) {
        return None;
    }
    let mut node = root.clone();
    loop {
        let props = node.view_props();
        if node.is_collapsed() || y < props.content_top() {
            return Some(node);
        }
        let children = node.children();
        let index = children.partition_point(|child| child.view_props().rect.top <= y);
        let hit = index
            .checked_sub(1)
            .and_then(|i| children.get(i))
            .filter(|child| child.view_props().rect.contains_y(y))
            .cloned();
        match hit {
            Some(child) => node = child,
            // Rows of a leaf, a gap or a footer.
            None => return Some(node),
        }
    }
}

/// Leaf group owning the item at `index` of the root's items.
pub fn find_group_by_item_index<T>(root: &GroupRef<T>, index: usize) -> Option<GroupRef<T>> {
    if index >= root.len() {
        return None;
    }
    let mut node = root.clone();
    loop {
        let children = node.children();
        if children.is_empty() {
            return Some(node);
        }
        let position = children.partition_point(|child| child.view_props().start_item_index <= index);
        // Skip empty siblings sharing the same start index.
        let hit = children
            .get(..position)
            .and_then(|before| before.iter().rev().find(|child| !child.is_empty()))
            .cloned();
        match hit {
            Some(child) => node = child,
            None => return Some(node),
        }
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

    fn columns(widths: &[f32]) -> Vec<Column> {
        widths
            .iter()
            .enumerate()
            .map(|(i, w)| Column::new(format!("c{i}"), DataType::Text).with_width(*w))
            .collect()
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
    fn test_column_boundary_belongs_to_right() {
        let layout =
            GridLayout::compute(&mut columns(&[100.0, 50.0, 70.0]), &tree(0), &GridConfig::default());
        assert_eq!(layout.find_column_at_offset(0.0), Some(0));
        assert_eq!(layout.find_column_at_offset(99.9), Some(0));
        assert_eq!(layout.find_column_at_offset(100.0), Some(1));
        assert_eq!(layout.find_column_at_offset(150.0), Some(2));
        assert_eq!(layout.find_column_at_offset(220.0), None);
        assert_eq!(layout.find_column_at_offset(-1.0), None);
    }

    #[test]
    fn test_columns_inside_viewport_include_partial_edges() {
        let layout = GridLayout::compute(
            &mut columns(&[100.0, 100.0, 100.0, 100.0, 100.0]),
            &tree(0),
            &GridConfig::default(),
        );
        assert_eq!(layout.find_column_inside_viewport(150.0, 310.0), vec![1, 2, 3]);
        assert_eq!(layout.find_column_inside_viewport(0.0, 100.0), vec![0]);
        assert_eq!(layout.find_column_inside_viewport(0.0, 1000.0), vec![0, 1, 2, 3, 4]);
        assert!(layout.find_column_inside_viewport(600.0, 700.0).is_empty());
    }

    #[test]
    fn test_rows_inside_viewport() {
        let layout = GridLayout::compute(&mut columns(&[100.0]), &tree(0), &GridConfig::default());
        // rows are 32px tall
        assert_eq!(layout.find_row_inside_viewport(40.0, 100.0), 1..4);
        assert_eq!(layout.find_row_inside_viewport(64.0, 96.0), 2..3);
        assert_eq!(layout.find_row_at_offset(64.0), Some(2));
        assert_eq!(layout.find_row_at_offset(500.0), None);
    }

    #[test]
    fn test_group_at_pointer_offset() {
        let root = tree(1);
        GridLayout::compute(&mut columns(&[100.0]), &root, &GridConfig::default());
        let children = root.children();
        // header of first group
        let hit = find_group_at_pointer_offset(&root, 10.0).unwrap();
        assert!(hit.ptr_eq(&children[0]));
        // exactly on the second group's top edge
        let top = children[1].view_props().rect.top;
        let hit = find_group_at_pointer_offset(&root, top).unwrap();
        assert!(hit.ptr_eq(&children[1]));
        // inside the gap between groups
        let gap = children[0].view_props().rect.bottom() + 1.0;
        assert!(find_group_at_pointer_offset(&root, gap).unwrap().ptr_eq(&root));
    }

    #[test]
    fn test_collapsed_group_is_not_descended() {
        let root = group_by(
            (0..8).collect::<Vec<u32>>(),
            |n: &u32, level| if level == 0 { n % 2 } else { n % 4 },
            |a: &u32, b: &u32, _| a.cmp(b),
            |_| GroupMetadata::default(),
            2,
        );
        let first = root.children()[0].clone();
        first.set_collapsed(true);
        GridLayout::compute(&mut columns(&[100.0]), &root, &GridConfig::default());
        let bottom = first.view_props().rect.bottom();
        let hit = find_group_at_pointer_offset(&root, bottom - 0.5).unwrap();
        assert!(hit.ptr_eq(&first));
    }

    #[test]
    fn test_group_by_item_index() {
        let root = tree(1);
        GridLayout::compute(&mut columns(&[100.0]), &root, &GridConfig::default());
        let children = root.children();
        assert!(find_group_by_item_index(&root, 0).unwrap().ptr_eq(&children[0]));
        assert!(find_group_by_item_index(&root, 2).unwrap().ptr_eq(&children[0]));
        assert!(find_group_by_item_index(&root, 3).unwrap().ptr_eq(&children[1]));
        assert!(find_group_by_item_index(&root, 6).is_none());
    }
}
