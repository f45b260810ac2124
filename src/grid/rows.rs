//! Row mutations: add (committed or draft), delete, move, edit, select.

use std::collections::HashSet;

use super::Grid;
use crate::error::{GridError, Result};
use crate::events::{EventKey, EventKind, GridEvent, PendingFocus};
use crate::grouping::{GroupKey, GroupRef};
use crate::layout::find_group_by_item_index;
use crate::types::{CellValue, ColumnId, Row, RowId};

impl Grid {
    /// Insert a committed row at display index `position` (appended when
    /// `None`). Returns the row's display index.
    ///
    /// In a grouped grid the row joins the group covering `position` and
    /// takes that group's grouping values; without a position it joins the
    /// group matching its own values.
    ///
    /// # Errors
    /// Returns [`GridError::DuplicateRow`] when the id is taken.
    pub fn add_row(&mut self, row: Row, position: Option<usize>) -> Result<usize> {
        let id = row.id.clone();
        let index = self.insert_row(row, position)?;
        if let Some(row) = self.row(&id).cloned() {
            self.queue(GridEvent::AddRow {
                row,
                position: index,
            });
        }
        Ok(index)
    }

    /// Insert an empty, uncommitted row and focus its first cell once the
    /// host rendered it. A previous draft row is committed first.
    ///
    /// Its insertion event is held back from batches until
    /// [`confirm_draft_row`](Self::confirm_draft_row).
    ///
    /// # Errors
    /// Propagates insertion errors.
    pub fn add_draft_row(&mut self, position: Option<usize>) -> Result<RowId> {
        self.confirm_draft_row();
        let row = Row::new();
        let id = row.id.clone();
        let index = self.insert_row(row, position)?;

        self.events
            .hold(EventKey::new(EventKind::AddRow, id.clone()));
        if let Some(row) = self.row(&id).cloned() {
            self.queue(GridEvent::AddRow {
                row,
                position: index,
            });
        }
        let previous = self.draft.set(id.clone());
        debug_assert!(previous.is_none(), "draft row replaced without commit");
        self.pending_focus = Some(PendingFocus {
            row_id: id.clone(),
            column_index: 0,
        });
        tracing::debug!(target: "xlgrid::grid", %id, index, "draft row added");
        Ok(id)
    }

    pub fn draft_row(&self) -> Option<&RowId> {
        self.draft.get()
    }

    /// Commit the draft row, delivering its insertion event immediately.
    pub fn confirm_draft_row(&mut self) -> Option<(EventKey, GridEvent)> {
        let id = self.draft.take()?;
        tracing::debug!(target: "xlgrid::grid", %id, "draft row confirmed");
        self.events
            .emit_event(&EventKey::new(EventKind::AddRow, id))
    }

    /// Drop the draft row and its queued events. Returns whether there was one.
    pub fn cancel_draft_row(&mut self) -> bool {
        let Some(id) = self.draft.take() else {
            return false;
        };
        self.events
            .remove_event(&EventKey::new(EventKind::AddRow, id.clone()));
        if self
            .pending_focus
            .as_ref()
            .is_some_and(|focus| focus.row_id == id)
        {
            self.pending_focus = None;
        }
        tracing::debug!(target: "xlgrid::grid", %id, "draft row cancelled");
        self.remove_rows(&[id]);
        true
    }

    /// Delete rows by id. Rows that refuse deletion are skipped. Returns
    /// the ids actually deleted.
    ///
    /// # Errors
    /// Returns [`GridError::UnknownRow`] before deleting anything when an id
    /// is unknown.
    pub fn delete_rows(&mut self, ids: &[RowId]) -> Result<Vec<RowId>> {
        if let Some(unknown) = ids.iter().find(|id| !self.positions.contains_key(*id)) {
            return Err(GridError::UnknownRow(unknown.clone()));
        }
        let mut deleted = Vec::with_capacity(ids.len());
        for id in ids {
            if self.row(id).is_some_and(|row| !row.deletable) {
                tracing::warn!(target: "xlgrid::grid", %id, "row is not deletable");
                continue;
            }
            if self.draft.holds(id) {
                self.cancel_draft_row();
                continue;
            }
            if !deleted.contains(id) {
                deleted.push(id.clone());
            }
        }
        if !deleted.is_empty() {
            self.remove_rows(&deleted);
            self.queue(GridEvent::DeleteRows {
                ids: deleted.clone(),
            });
        }
        Ok(deleted)
    }

    /// Move a row to display index `to`.
    ///
    /// Crossing into another group rewrites the row's grouping values from
    /// the target group's ancestry. Moves are ignored while sorted. Returns
    /// whether the row moved.
    ///
    /// # Errors
    /// Returns [`GridError::UnknownRow`] for an unknown id.
    pub fn move_row(&mut self, id: &str, to: usize) -> Result<bool> {
        let from = self
            .find_row_index(id)
            .ok_or_else(|| GridError::UnknownRow(id.to_string()))?;
        let to = to.min(self.root.len().saturating_sub(1));
        if from == to {
            return Ok(false);
        }
        if self.is_sorted() {
            tracing::debug!(target: "xlgrid::grid", id, "row move ignored while sorted");
            return Ok(false);
        }

        let next = self.root.clone_group();
        let (Some(source), Some(target)) = (
            find_group_by_item_index(&next, from),
            find_group_by_item_index(&next, to),
        ) else {
            return Ok(false);
        };
        let leaf_start = target.view_props().start_item_index;
        // Start of the target leaf once the row left its old place.
        let start_after_removal = if from < leaf_start {
            leaf_start - 1
        } else {
            leaf_start
        };
        let offset = to.saturating_sub(start_after_removal);
        let crossed = !source.ptr_eq(&target);

        let key = id.to_string();
        next.remove_items(std::slice::from_ref(&key));
        target.add_items(std::slice::from_ref(&key), offset);
        next.remove_empty_children();

        if crossed {
            self.inherit_group_values(id, &target);
        }
        self.root = next;
        self.adopt_display_order();
        self.refresh();

        self.queue(GridEvent::MoveRow {
            id: key.clone(),
            from,
            to,
        });
        if crossed {
            self.queue_row_update(&key);
        }
        Ok(true)
    }

    /// Write `value` into a cell.
    ///
    /// # Errors
    /// Returns an error for unknown ids, a cell that refuses edits, or a
    /// value the column's field rejects.
    pub fn update_cell(&mut self, row_id: &str, column_id: &str, value: CellValue) -> Result<()> {
        let column = self
            .find_column_by_id(column_id)
            .ok_or_else(|| GridError::UnknownColumn(column_id.to_string()))?;
        let row = self
            .row(row_id)
            .ok_or_else(|| GridError::UnknownRow(row_id.to_string()))?;
        if !self.is_cell_editable(row, column) {
            return Err(GridError::NotEditable {
                row: row_id.to_string(),
                column: column_id.to_string(),
            });
        }
        if !column.field.validate(&value) {
            return Err(GridError::InvalidValue {
                column: column_id.to_string(),
                value: value.display(),
            });
        }
        if self.write_value(row_id, column_id, value) {
            self.after_edit(&[row_id.to_string()], &[column_id.to_string()]);
        }
        Ok(())
    }

    /// Parse `text` with the column's field and write it.
    ///
    /// # Errors
    /// As [`update_cell`](Self::update_cell); unparsable text is
    /// [`GridError::InvalidValue`].
    pub fn set_cell_text(&mut self, row_id: &str, column_id: &str, text: &str) -> Result<()> {
        let column = self
            .find_column_by_id(column_id)
            .ok_or_else(|| GridError::UnknownColumn(column_id.to_string()))?;
        let value = column.field.parse(text).ok_or_else(|| GridError::InvalidValue {
            column: column_id.to_string(),
            value: text.to_string(),
        })?;
        self.update_cell(row_id, column_id, value)
    }

    /// Select rows by identity.
    ///
    /// # Errors
    /// Returns [`GridError::UnknownRow`] for an unknown id.
    pub fn select_rows(&mut self, ids: &[RowId], append: bool) -> Result<()> {
        if let Some(unknown) = ids.iter().find(|id| !self.positions.contains_key(*id)) {
            return Err(GridError::UnknownRow(unknown.clone()));
        }
        self.end_edit();
        self.selection.select_rows(ids.iter().cloned(), append);
        self.sync_row_selection();
        Ok(())
    }

    /// Toggle one row in the row selection. Returns whether it is selected.
    ///
    /// # Errors
    /// Returns [`GridError::UnknownRow`] for an unknown id.
    pub fn toggle_row(&mut self, id: &str) -> Result<bool> {
        if !self.positions.contains_key(id) {
            return Err(GridError::UnknownRow(id.to_string()));
        }
        self.end_edit();
        let selected = self.selection.toggle_row(id);
        self.sync_row_selection();
        Ok(selected)
    }

    /// Mirror the row selection into `Row::selected` and notify the host.
    fn sync_row_selection(&mut self) {
        let selected = self.selection.rows();
        for row in &mut self.rows {
            row.selected = selected.contains(&row.id);
        }
        let items = self.root.items();
        let ids: Vec<RowId> = items
            .iter()
            .filter(|id| selected.contains(*id))
            .cloned()
            .collect();
        self.queue(GridEvent::SelectRows { ids });
    }

    // ---- internals -------------------------------------------------------

    pub(super) fn insert_row(&mut self, mut row: Row, position: Option<usize>) -> Result<usize> {
        if self.positions.contains_key(&row.id) {
            return Err(GridError::DuplicateRow(row.id));
        }
        let id = row.id.clone();
        let count = self.root.len();
        let next = self.root.clone_group();

        let target = if self.is_grouped() {
            match position {
                Some(position) if count > 0 => {
                    let position = position.min(count);
                    find_group_by_item_index(&next, position.min(count - 1)).map(|leaf| {
                        for node in leaf.find_closest(true) {
                            let metadata = node.metadata();
                            if let Some(column) = metadata.column_id {
                                set_value(&mut row, column, metadata.value);
                            }
                        }
                        let offset = position.saturating_sub(leaf.view_props().start_item_index);
                        (leaf, offset)
                    })
                }
                _ => self.leaf_matching(&next, &row).map(|leaf| {
                    let len = leaf.len();
                    (leaf, len)
                }),
            }
        } else {
            let at = position.unwrap_or(count).min(count);
            Some((next.clone(), at))
        };

        let Some((leaf, offset)) = target else {
            // No group for the row's values yet.
            self.rows.push(row);
            self.reindex();
            self.regroup();
            return Ok(self.find_row_index(&id).unwrap_or(0));
        };

        leaf.add_items(std::slice::from_ref(&id), offset);
        let successor = {
            let items = next.items();
            items
                .iter()
                .position(|item| *item == id)
                .and_then(|i| items.get(i + 1).cloned())
        };
        let at = successor
            .and_then(|s| self.positions.get(&s).copied())
            .unwrap_or(self.rows.len());
        self.rows.insert(at, row);
        self.reindex();

        if self.is_sorted() {
            self.sort_tree(&next);
        }
        self.root = next;
        self.refresh();
        Ok(self.find_row_index(&id).unwrap_or(0))
    }

    /// Leaf whose grouping values equal the row's, if it exists.
    fn leaf_matching(&self, root: &GroupRef<RowId>, row: &Row) -> Option<GroupRef<RowId>> {
        let mut node = root.clone();
        for column in &self.group_columns {
            let key = GroupKey::from(row.value(column));
            node = node
                .children()
                .into_iter()
                .find(|child| GroupKey::from(&child.metadata().value) == key)?;
        }
        Some(node)
    }

    /// Copy the grouping values of `group` and its ancestors into a row.
    fn inherit_group_values(&mut self, id: &str, group: &GroupRef<RowId>) {
        let chain = group.find_closest(true);
        let Some(row) = self.row_mut(id) else {
            return;
        };
        for node in chain {
            let metadata = node.metadata();
            if let Some(column) = metadata.column_id {
                set_value(row, column, metadata.value);
            }
        }
    }

    /// Remove rows from the row list and the tree, publishing a new root.
    pub(super) fn remove_rows(&mut self, ids: &[RowId]) {
        let doomed: HashSet<&RowId> = ids.iter().collect();
        let next = self.root.clone_group();
        next.remove_items(ids);
        next.remove_empty_children();
        self.rows.retain(|row| !doomed.contains(&row.id));
        self.reindex();
        self.root = next;
        self.refresh();
    }

    /// Store a value without any checks. Returns whether the cell changed.
    pub(super) fn write_value(&mut self, row_id: &str, column_id: &str, value: CellValue) -> bool {
        let Some(row) = self.row_mut(row_id) else {
            return false;
        };
        if row.value(column_id) == &value {
            return false;
        }
        set_value(row, column_id.to_string(), value);
        true
    }

    /// Rebuild whatever depends on the edited columns and notify the host.
    pub(super) fn after_edit(&mut self, row_ids: &[RowId], columns: &[ColumnId]) {
        if columns.iter().any(|c| self.group_columns.contains(c)) {
            self.regroup();
        } else if columns.iter().any(|c| self.sort_columns.contains(c)) {
            self.resort();
        } else {
            self.publish();
        }
        for id in row_ids {
            self.queue_row_update(id);
        }
    }

    /// Queue the latest data of a row. Edits of the draft row refresh its
    /// held insertion event instead.
    fn queue_row_update(&mut self, id: &str) {
        let Some(row) = self.row(id).cloned() else {
            return;
        };
        if self.draft.holds(&row.id) {
            let position = row.view_props.index;
            self.queue(GridEvent::AddRow { row, position });
        } else {
            self.queue(GridEvent::UpdateRow {
                id: row.id,
                data: row.data,
            });
        }
    }
}

fn set_value(row: &mut Row, column: ColumnId, value: CellValue) {
    if value.is_empty() {
        row.data.remove(&column);
    } else {
        row.data.insert(column, value);
    }
}
