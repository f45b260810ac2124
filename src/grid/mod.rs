//! The grid engine.
//!
//! [`Grid`] owns the columns and rows handed to it by the host and keeps
//! everything derived from them current: the grouping tree, sort order,
//! aggregates, layout, selection and the outgoing event queue.
//!
//! Every mutation runs the same pipeline: change the rows or columns,
//! publish a new tree root (rebuilt or cloned), recalculate, relayout and
//! re-validate the selection against the new layout.

mod cells;
mod columns;
mod groups;
mod rows;
mod search;
mod view;

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use crate::calculate::{Calculator, StandardCalculator};
use crate::config::GridConfig;
use crate::error::{GridError, Result};
use crate::events::{
    Clock, EventKey, FrameRequests, GridEvent, GridEvents, PendingFocus, RetryQueue, SystemClock,
};
use crate::grouping::{group_by, Group, GroupId, GroupKey, GroupMetadata, GroupRef, ROOT_GROUP_ID};
use crate::layout::{GridLayout, Viewport};
use crate::selection::{SelectionGesture, SelectionModel};
use crate::sort::{RowComparator, SortKey};
use crate::state::{DraftRow, SelectingCell};
use crate::types::{CellValue, Column, ColumnId, GroupingType, Row, RowId, RowViewProps};

pub use groups::GroupSummary;
pub use search::SearchInfo;
pub use view::{FrameAction, FrameKey, VisibleSlice};

/// In-memory engine behind a virtualized data grid.
pub struct Grid {
    config: GridConfig,
    columns: Vec<Column>,
    /// Rows in committed order (the order regrouping starts from).
    rows: Vec<Row>,
    /// Row id to position in `rows`.
    positions: HashMap<RowId, usize>,
    group_columns: Vec<ColumnId>,
    sort_columns: Vec<ColumnId>,
    collapsed: HashSet<GroupId>,
    root: GroupRef<RowId>,
    layout: GridLayout,
    viewport: Viewport,
    selection: SelectionModel,
    gesture: SelectionGesture,
    draft: DraftRow,
    selecting: SelectingCell,
    events: GridEvents,
    calculator: Box<dyn Calculator>,
    /// Whole-grid aggregates per calculating column.
    calculations: HashMap<ColumnId, CellValue>,
    frames: FrameRequests<FrameKey, FrameAction>,
    retries: RetryQueue<RowId>,
    pending_focus: Option<PendingFocus>,
    search: SearchInfo,
}

impl Grid {
    /// Build a grid over `columns` and `rows` using the wall clock.
    ///
    /// # Errors
    /// Returns an error for an invalid config or duplicate row/column ids.
    pub fn new(columns: Vec<Column>, rows: Vec<Row>, config: GridConfig) -> Result<Self> {
        Self::with_clock(columns, rows, config, SystemClock)
    }

    /// Build a grid whose throttling and retries read time from `clock`.
    ///
    /// # Errors
    /// Returns an error for an invalid config or duplicate row/column ids.
    pub fn with_clock<C>(
        columns: Vec<Column>,
        rows: Vec<Row>,
        config: GridConfig,
        clock: C,
    ) -> Result<Self>
    where
        C: Clock + Clone + 'static,
    {
        config.validate()?;
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.id.as_str()) {
                return Err(GridError::DuplicateColumn(column.id.clone()));
            }
        }

        let throttle = Duration::from_millis(config.event_throttle_ms);
        let retry_delay = Duration::from_millis(config.retry_delay_ms);
        let events = GridEvents::new(Box::new(clock.clone()), throttle, config.auto_emit);

        let mut grid = Grid {
            columns,
            rows: Vec::new(),
            positions: HashMap::new(),
            group_columns: Vec::new(),
            sort_columns: Vec::new(),
            collapsed: HashSet::new(),
            root: GroupRef::new(Group::new(ROOT_GROUP_ID, 0, 0)),
            layout: GridLayout::default(),
            viewport: Viewport::new(),
            selection: SelectionModel::new(),
            gesture: SelectionGesture::new(),
            draft: DraftRow::new(),
            selecting: SelectingCell::new(),
            events,
            calculator: Box::new(StandardCalculator),
            calculations: HashMap::new(),
            frames: FrameRequests::new(),
            retries: RetryQueue::new(Box::new(clock), retry_delay),
            pending_focus: None,
            search: SearchInfo::default(),
            config,
        };
        for column in &mut grid.columns {
            column.width = column.width.max(grid.config.min_column_width);
        }
        grid.set_rows(rows)?;
        Ok(grid)
    }

    /// Replace the aggregate implementation.
    pub fn set_calculator(&mut self, calculator: impl Calculator + 'static) {
        self.calculator = Box::new(calculator);
        self.regroup();
    }

    /// Replace every row. Grouping, sorting and column state are kept.
    ///
    /// # Errors
    /// Returns [`GridError::DuplicateRow`] when two rows share an id.
    pub fn set_rows(&mut self, rows: Vec<Row>) -> Result<()> {
        let mut positions = HashMap::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            if positions.insert(row.id.clone(), i).is_some() {
                return Err(GridError::DuplicateRow(row.id.clone()));
            }
        }
        self.rows = rows;
        self.positions = positions;
        self.draft.clear();
        self.selection.clear();
        self.regroup();
        Ok(())
    }

    // ---- accessors -------------------------------------------------------

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Rows in committed order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Current tree root. A new root is published after every change.
    pub fn root(&self) -> &GroupRef<RowId> {
        &self.root
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    pub fn group_columns(&self) -> &[ColumnId] {
        &self.group_columns
    }

    pub fn sort_columns(&self) -> &[ColumnId] {
        &self.sort_columns
    }

    pub fn is_grouped(&self) -> bool {
        !self.group_columns.is_empty()
    }

    pub fn is_sorted(&self) -> bool {
        !self.sort_columns.is_empty()
    }

    pub fn row(&self, id: &str) -> Option<&Row> {
        self.rows.get(*self.positions.get(id)?)
    }

    fn row_mut(&mut self, id: &str) -> Option<&mut Row> {
        let position = *self.positions.get(id)?;
        self.rows.get_mut(position)
    }

    /// Row at `index` of the display order (the root's items).
    pub fn find_row_by_index(&self, index: usize) -> Option<&Row> {
        let items = self.root.items();
        self.row(items.get(index)?)
    }

    /// Display index of a row. Recomputed from the current tree on every
    /// call; never cache it across a deferral.
    pub fn find_row_index(&self, id: &str) -> Option<usize> {
        self.root.items().iter().position(|item| item == id)
    }

    pub fn find_column_by_id(&self, id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    /// Position of a column in the column list (hidden columns included).
    pub fn find_column_position(&self, id: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.id == id)
    }

    /// Column at visible index `index`.
    pub fn visible_column(&self, index: usize) -> Option<&Column> {
        self.columns.get(*self.layout.visible_columns.get(index)?)
    }

    /// Whole-grid aggregate of a calculating column.
    pub fn calculation(&self, column_id: &str) -> Option<&CellValue> {
        self.calculations.get(column_id)
    }

    /// Whether `column_id` of `row` accepts edits: the row's override wins
    /// over the column flag.
    pub fn is_cell_editable(&self, row: &Row, column: &Column) -> bool {
        row.editable_override(&column.id).unwrap_or(column.editable)
    }

    // ---- events ----------------------------------------------------------

    /// Receive every delivered batch of events.
    pub fn set_listener(&mut self, listener: impl FnMut(&[(EventKey, GridEvent)]) + 'static) {
        self.events.set_listener(listener);
    }

    pub fn set_auto_emit(&mut self, auto_emit: bool) {
        self.config.auto_emit = auto_emit;
        self.events.set_auto_emit(auto_emit);
    }

    /// Throttled emit of the listed keys (all when `None`).
    pub fn emit(&mut self, keys: Option<&[EventKey]>) -> Vec<(EventKey, GridEvent)> {
        self.events.emit(keys)
    }

    /// Deliver every committed event now, cancelling the throttle.
    pub fn flush(&mut self) -> Vec<(EventKey, GridEvent)> {
        self.events.flush()
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    fn queue(&mut self, event: GridEvent) {
        let key = event.key();
        self.events.add_event(key, event);
    }

    // ---- rebuild pipeline ------------------------------------------------

    /// Rebuild the tree from the committed rows, then sort and refresh.
    fn regroup(&mut self) {
        let levels: Vec<(ColumnId, bool)> = self
            .group_columns
            .iter()
            .filter_map(|id| self.find_column_by_id(id))
            .map(|c| (c.id.clone(), c.grouping_type == Some(GroupingType::Desc)))
            .collect();
        let ids: Vec<RowId> = self.rows.iter().map(|r| r.id.clone()).collect();

        let root = {
            let rows = &self.rows;
            let positions = &self.positions;
            let lookup = |id: &RowId| positions.get(id).and_then(|&p| rows.get(p));
            let collapsed = &self.collapsed;
            group_by(
                ids,
                |id: &RowId, level: usize| match (lookup(id), levels.get(level)) {
                    (Some(row), Some((column, _))) => GroupKey::from(row.value(column)),
                    _ => GroupKey::Empty,
                },
                |a: &GroupKey, b: &GroupKey, level: usize| {
                    let descending = levels.get(level).is_some_and(|(_, desc)| *desc);
                    a.compare(b, descending)
                },
                |node: &Group<RowId>| {
                    let column_id = node
                        .depth
                        .checked_sub(1)
                        .and_then(|level| levels.get(level))
                        .map(|(id, _)| id.clone());
                    let value = match (&column_id, node.items().first().and_then(&lookup)) {
                        (Some(column), Some(row)) => row.value(column).clone(),
                        _ => CellValue::Empty,
                    };
                    GroupMetadata {
                        is_empty: column_id.is_some() && value.is_empty(),
                        collapsed: collapsed.contains(&node.id),
                        calculated: HashMap::new(),
                        column_id,
                        value,
                    }
                },
                levels.len(),
            )
        };
        self.sort_tree(&root);
        self.root = root;
        self.refresh();
    }

    /// Re-sort (or restore) the published tree into a new root.
    fn resort(&mut self) {
        let next = self.root.clone_group();
        next.unsort_items();
        self.sort_tree(&next);
        self.root = next;
        self.refresh();
    }

    fn sort_tree(&self, root: &GroupRef<RowId>) {
        let comparator = self.comparator();
        if comparator.is_empty() {
            return;
        }
        let rows = &self.rows;
        let positions = &self.positions;
        root.sort_items(&|a: &RowId, b: &RowId| {
            match (
                positions.get(a).and_then(|&p| rows.get(p)),
                positions.get(b).and_then(|&p| rows.get(p)),
            ) {
                (Some(a), Some(b)) => comparator.compare(a, b),
                _ => std::cmp::Ordering::Equal,
            }
        });
    }

    fn comparator(&self) -> RowComparator {
        RowComparator::new(
            self.sort_columns
                .iter()
                .filter_map(|id| self.find_column_by_id(id))
                .filter_map(SortKey::for_column)
                .collect(),
        )
    }

    fn calculating_columns(&self) -> Vec<Column> {
        self.columns
            .iter()
            .filter(|c| c.calculate_type.is_some())
            .cloned()
            .collect()
    }

    /// Publish a shallow copy of the root so identity comparison sees a change.
    fn publish(&mut self) {
        self.root = self.root.clone_group();
        self.refresh();
    }

    /// Recalculate, relayout and re-validate everything derived from the tree.
    fn refresh(&mut self) {
        self.recalculate();
        self.relayout();
        debug_assert!(self.root.is_consistent(), "grouping tree out of sync");
        let rows = self.root.len();
        let columns = self.layout.column_count();
        let positions = &self.positions;
        self.selection
            .revalidate(rows, columns, |id| positions.contains_key(id));
        self.refresh_search();
    }

    fn recalculate(&mut self) {
        let calculating = self.calculating_columns();
        let rows = &self.rows;
        let positions = &self.positions;
        let lookup = |id: &RowId| positions.get(id).and_then(|&p| rows.get(p));
        let calculator = self.calculator.as_ref();

        self.root.walk(&mut |node| {
            let calculated = aggregate(&calculating, &node.items(), &lookup, calculator);
            node.borrow_mut().metadata.calculated = calculated;
        });
        self.calculations = self.root.metadata().calculated;
    }

    fn relayout(&mut self) {
        self.layout = GridLayout::compute(&mut self.columns, &self.root, &self.config);
        self.viewport.clamp_scroll(&self.layout);

        let items = self.root.items();
        for (index, id) in items.iter().enumerate() {
            let rect = self.layout.row_rect(index).unwrap_or_default();
            if let Some(row) = self.row_mut(id) {
                row.view_props = RowViewProps { index, rect };
            }
        }
        tracing::debug!(
            target: "xlgrid::grid",
            rows = items.len(),
            displayed = self.layout.displayed_row_count(),
            columns = self.layout.column_count(),
            height = self.layout.total_height,
            "relayout"
        );
    }

    /// Rebuild `positions` after `rows` changed shape.
    fn reindex(&mut self) {
        self.positions = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| (row.id.clone(), i))
            .collect();
    }

    /// Put `rows` into the current display order. Used after manual moves
    /// so a later regroup keeps them.
    fn adopt_display_order(&mut self) {
        let items = self.root.items();
        let order: HashMap<&str, usize> = items
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();
        self.rows
            .sort_by_key(|row| order.get(row.id.as_str()).copied().unwrap_or(usize::MAX));
        self.reindex();
    }
}

impl Drop for Grid {
    fn drop(&mut self) {
        // A throttled emit must not outlive the grid.
        self.events.flush();
    }
}

/// Aggregates of `items` for every calculating column.
fn aggregate<'a>(
    columns: &[Column],
    items: &[RowId],
    lookup: &impl Fn(&RowId) -> Option<&'a Row>,
    calculator: &dyn Calculator,
) -> HashMap<ColumnId, CellValue> {
    columns
        .iter()
        .filter_map(|column| {
            let calculate_type = column.calculate_type?;
            let values: Vec<&CellValue> = items
                .iter()
                .filter_map(lookup)
                .map(|row| row.value(&column.id))
                .collect();
            let result = calculator.calculate_by(&values, calculate_type, &column.field);
            Some((column.id.clone(), result))
        })
        .collect()
}
