//! Column mutations.

use super::Grid;
use crate::error::{GridError, Result};
use crate::events::GridEvent;
use crate::types::{CalculateType, Column};

impl Grid {
    /// Insert a column at `position` in the column list (appended when `None`).
    /// Returns the position used.
    ///
    /// # Errors
    /// Returns [`GridError::DuplicateColumn`] when the id is taken.
    pub fn add_column(&mut self, mut column: Column, position: Option<usize>) -> Result<usize> {
        if self.find_column_by_id(&column.id).is_some() {
            return Err(GridError::DuplicateColumn(column.id));
        }
        if !(column.width.is_finite() && column.width > 0.0) {
            column.width = self.config.default_column_width;
        }
        column.width = column.width.max(self.config.min_column_width);
        if column
            .calculate_type
            .is_some_and(|t| !column.data_type().supports_calculation(t))
        {
            column.calculate_type = None;
        }

        let position = position
            .unwrap_or(self.columns.len())
            .min(self.columns.len());
        self.columns.insert(position, column.clone());
        self.publish();
        self.queue(GridEvent::AddColumn { column, position });
        Ok(position)
    }

    /// Remove a column and its values from every row.
    ///
    /// # Errors
    /// Returns an error for an unknown id or a column that refuses deletion.
    pub fn delete_column(&mut self, id: &str) -> Result<Column> {
        let position = self
            .find_column_position(id)
            .ok_or_else(|| GridError::UnknownColumn(id.to_string()))?;
        if self.columns.get(position).is_some_and(|c| !c.deletable) {
            return Err(GridError::NotDeletable(id.to_string()));
        }
        let column = self.columns.remove(position);
        for row in &mut self.rows {
            row.data.remove(id);
        }

        let grouped = self.group_columns.iter().any(|c| c == id);
        let sorted = self.sort_columns.iter().any(|c| c == id);
        self.group_columns.retain(|c| c != id);
        self.sort_columns.retain(|c| c != id);
        if grouped {
            self.regroup();
        } else if sorted {
            self.resort();
        } else {
            self.publish();
        }
        self.queue(GridEvent::DeleteColumn { id: id.to_string() });
        Ok(column)
    }

    /// Move a column to `to` in the column list. Returns whether it moved.
    ///
    /// # Errors
    /// Returns [`GridError::UnknownColumn`] for an unknown id.
    pub fn move_column(&mut self, id: &str, to: usize) -> Result<bool> {
        let from = self
            .find_column_position(id)
            .ok_or_else(|| GridError::UnknownColumn(id.to_string()))?;
        let to = to.min(self.columns.len().saturating_sub(1));
        if from == to {
            return Ok(false);
        }
        let column = self.columns.remove(from);
        self.columns.insert(to, column);
        // Cell selection is positional; it no longer points at the same data.
        self.selection.clear_cells();
        self.relayout();
        self.queue(GridEvent::MoveColumn {
            id: id.to_string(),
            from,
            to,
        });
        Ok(true)
    }

    /// Set a column's width, clamped to the configured minimum. Returns the
    /// width applied.
    ///
    /// # Errors
    /// Returns [`GridError::UnknownColumn`] for an unknown id.
    pub fn resize_column(&mut self, id: &str, width: f32) -> Result<f32> {
        let min = self.config.min_column_width;
        let column = self
            .columns
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| GridError::UnknownColumn(id.to_string()))?;
        let width = if width.is_finite() { width.max(min) } else { min };
        column.width = width;
        self.relayout();
        self.queue(GridEvent::ResizeColumn {
            id: id.to_string(),
            width,
        });
        Ok(width)
    }

    /// Hide or show a column.
    ///
    /// # Errors
    /// Returns [`GridError::UnknownColumn`] for an unknown id.
    pub fn set_column_hidden(&mut self, id: &str, hidden: bool) -> Result<()> {
        let column = self
            .columns
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| GridError::UnknownColumn(id.to_string()))?;
        if column.hidden == hidden {
            return Ok(());
        }
        column.hidden = hidden;
        self.selection.clear_cells();
        self.refresh();
        self.queue(GridEvent::HideColumn {
            id: id.to_string(),
            hidden,
        });
        Ok(())
    }

    /// Freeze the first `count` visible columns. Returns the count applied.
    pub fn freeze_columns(&mut self, count: usize) -> usize {
        self.config.frozen_columns = count;
        self.relayout();
        let applied = self.layout.frozen_columns;
        self.queue(GridEvent::FreezeColumns { count: applied });
        applied
    }

    /// Set or clear a column's aggregate. Returns `false` (and changes
    /// nothing) when the data type does not support the calculation.
    ///
    /// # Errors
    /// Returns [`GridError::UnknownColumn`] for an unknown id.
    pub fn set_calculate_type(
        &mut self,
        id: &str,
        calculate_type: Option<CalculateType>,
    ) -> Result<bool> {
        let column = self
            .columns
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| GridError::UnknownColumn(id.to_string()))?;
        if calculate_type.is_some_and(|t| !column.data_type().supports_calculation(t)) {
            tracing::debug!(target: "xlgrid::grid", id, ?calculate_type, "calculation not applicable");
            return Ok(false);
        }
        column.calculate_type = calculate_type;
        self.publish();
        self.queue(GridEvent::Calculate {
            column_id: id.to_string(),
            calculate_type,
        });
        Ok(true)
    }
}
