//! Grouping, sorting and collapse state.

use std::collections::BTreeMap;

use serde::Serialize;

use super::Grid;
use crate::error::{GridError, Result};
use crate::events::GridEvent;
use crate::grouping::{GroupId, GroupRef};
use crate::types::{CellValue, ColumnId, GroupingType, RowId, SortingType};

/// Serializable snapshot of one tree node and its descendants.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummary {
    pub id: GroupId,
    pub depth: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_id: Option<ColumnId>,
    pub value: CellValue,
    pub is_empty: bool,
    pub collapsed: bool,
    pub count: usize,
    pub calculated: BTreeMap<ColumnId, CellValue>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<GroupSummary>,
}

impl GroupSummary {
    fn of(node: &GroupRef<RowId>) -> Self {
        let metadata = node.metadata();
        GroupSummary {
            id: node.id(),
            depth: node.depth(),
            column_id: metadata.column_id,
            value: metadata.value,
            is_empty: metadata.is_empty,
            collapsed: metadata.collapsed,
            count: node.len(),
            calculated: metadata.calculated.into_iter().collect(),
            children: node.children().iter().map(GroupSummary::of).collect(),
        }
    }
}

impl Grid {
    /// Group rows by `column_ids`, outermost first. An empty list ungroups.
    ///
    /// Returns `false` (and changes nothing) when a column's data type
    /// cannot be grouped.
    ///
    /// # Errors
    /// Returns [`GridError::UnknownColumn`] for an unknown id.
    pub fn group_by_columns(&mut self, column_ids: &[ColumnId]) -> Result<bool> {
        for id in column_ids {
            let column = self
                .find_column_by_id(id)
                .ok_or_else(|| GridError::UnknownColumn(id.clone()))?;
            if !column.data_type().capabilities().groupable {
                tracing::debug!(target: "xlgrid::grid", %id, "column is not groupable");
                return Ok(false);
            }
        }
        self.apply_grouping(column_ids);
        Ok(true)
    }

    pub fn ungroup(&mut self) {
        self.apply_grouping(&[]);
    }

    fn apply_grouping(&mut self, column_ids: &[ColumnId]) {
        for column in &mut self.columns {
            let grouped = column_ids.contains(&column.id);
            column.grouping_type = match (grouped, column.grouping_type) {
                (true, Some(existing)) => Some(existing),
                (true, None) => Some(GroupingType::Asc),
                (false, _) => None,
            };
        }
        self.group_columns = column_ids.to_vec();
        self.collapsed.clear();
        self.selection.clear_cells();
        self.regroup();
        self.queue(GridEvent::Group {
            column_ids: column_ids.to_vec(),
        });
    }

    /// Change the sibling order of one grouping column.
    ///
    /// # Errors
    /// Returns [`GridError::UnknownColumn`] for an unknown id.
    pub fn set_grouping_type(&mut self, id: &str, grouping_type: GroupingType) -> Result<()> {
        let column = self
            .columns
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| GridError::UnknownColumn(id.to_string()))?;
        column.grouping_type = Some(grouping_type);
        if self.group_columns.iter().any(|c| c == id) {
            self.regroup();
            self.queue(GridEvent::Group {
                column_ids: self.group_columns.clone(),
            });
        }
        Ok(())
    }

    /// Sort rows by `column_ids` (lexicographic, each column in its own
    /// direction). An empty list restores the unsorted order.
    ///
    /// Returns `false` (and changes nothing) when a column's data type
    /// cannot be sorted.
    ///
    /// # Errors
    /// Returns [`GridError::UnknownColumn`] for an unknown id.
    pub fn sort_by_columns(&mut self, column_ids: &[ColumnId]) -> Result<bool> {
        for id in column_ids {
            let column = self
                .find_column_by_id(id)
                .ok_or_else(|| GridError::UnknownColumn(id.clone()))?;
            if !column.data_type().capabilities().sortable {
                tracing::debug!(target: "xlgrid::grid", %id, "column is not sortable");
                return Ok(false);
            }
        }
        self.apply_sorting(column_ids);
        Ok(true)
    }

    fn apply_sorting(&mut self, column_ids: &[ColumnId]) {
        for column in &mut self.columns {
            let sorted = column_ids.contains(&column.id);
            column.sorting_type = match (sorted, column.sorting_type) {
                (true, Some(existing)) => Some(existing),
                (true, None) => Some(SortingType::Asc),
                (false, _) => None,
            };
        }
        self.sort_columns = column_ids.to_vec();
        self.selection.clear_cells();
        self.resort();
        self.queue(GridEvent::Sort {
            column_ids: column_ids.to_vec(),
        });
    }

    /// Change the direction of one sorting column.
    ///
    /// # Errors
    /// Returns [`GridError::UnknownColumn`] for an unknown id.
    pub fn set_sorting_type(&mut self, id: &str, sorting_type: SortingType) -> Result<()> {
        let column = self
            .columns
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| GridError::UnknownColumn(id.to_string()))?;
        column.sorting_type = Some(sorting_type);
        if self.sort_columns.iter().any(|c| c == id) {
            self.resort();
            self.queue(GridEvent::Sort {
                column_ids: self.sort_columns.clone(),
            });
        }
        Ok(())
    }

    /// Restore the order rows had before sorting.
    pub fn unsort(&mut self) {
        self.apply_sorting(&[]);
    }

    /// Snapshot of the whole tree, root first.
    pub fn group_summary(&self) -> GroupSummary {
        GroupSummary::of(&self.root)
    }

    pub fn find_group(&self, id: GroupId) -> Option<GroupRef<RowId>> {
        self.root.find(id)
    }

    /// Aggregate of `column_id` within one group.
    pub fn group_calculation(&self, group_id: GroupId, column_id: &str) -> Option<CellValue> {
        let group = self.root.find(group_id)?;
        let node = group.borrow();
        node.metadata.calculated.get(column_id).cloned()
    }

    /// Collapse or expand a group. Returns whether the state changed.
    pub fn set_collapsed(&mut self, group_id: GroupId, collapsed: bool) -> bool {
        if group_id == self.root.id() {
            return false;
        }
        let next = self.root.clone_group();
        let Some(group) = next.find(group_id) else {
            return false;
        };
        if group.is_collapsed() == collapsed {
            return false;
        }
        group.set_collapsed(collapsed);
        if collapsed {
            self.collapsed.insert(group_id);
        } else {
            self.collapsed.remove(&group_id);
        }
        self.root = next;
        self.refresh();
        self.queue(GridEvent::Collapse {
            group_id,
            collapsed,
        });
        true
    }

    pub fn toggle_collapsed(&mut self, group_id: GroupId) -> bool {
        let collapsed = self.find_group(group_id).is_some_and(|g| g.is_collapsed());
        self.set_collapsed(group_id, !collapsed)
    }

    pub fn collapse_all(&mut self) {
        self.set_all_collapsed(true);
    }

    pub fn expand_all(&mut self) {
        self.set_all_collapsed(false);
    }

    fn set_all_collapsed(&mut self, collapsed: bool) {
        let next = self.root.clone_group();
        let root_id = next.id();
        let mut changed = Vec::new();
        next.walk(&mut |node| {
            if node.id() != root_id && node.is_collapsed() != collapsed {
                node.set_collapsed(collapsed);
                changed.push(node.id());
            }
        });
        if changed.is_empty() {
            return;
        }
        for id in &changed {
            if collapsed {
                self.collapsed.insert(*id);
            } else {
                self.collapsed.remove(id);
            }
        }
        self.root = next;
        self.refresh();
        for group_id in changed {
            self.queue(GridEvent::Collapse {
                group_id,
                collapsed,
            });
        }
    }
}
