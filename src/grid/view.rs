//! Viewport, frame-deferred work and focus that waits for rendering.

use serde::Serialize;

use super::Grid;
use crate::events::{EventKey, FrameId, GridEvent, PendingFocus};
use crate::grouping::{GroupId, GroupRef};
use crate::layout::{GridLayout, Viewport};
use crate::types::{CellIndex, Rect, RowId};

/// Coalescing slot of a frame request: one pending request per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKey {
    Pointer,
    Scroll,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameAction {
    PointerMove(CellIndex),
    ScrollTo(f32, f32),
}

/// What the host has to render for the current viewport.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleSlice {
    /// Visible column indices, frozen columns first.
    pub columns: Vec<usize>,
    pub rows: Vec<RowId>,
    /// Display index of each entry of `rows`.
    pub row_indices: Vec<usize>,
    /// Groups whose rectangle intersects the viewport, outermost first.
    pub groups: Vec<GroupId>,
}

impl Grid {
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn set_viewport_size(&mut self, width: f32, height: f32) {
        self.viewport.resize(width.max(0.0), height.max(0.0));
        self.viewport.clamp_scroll(&self.layout);
    }

    pub fn scroll_to(&mut self, x: f32, y: f32) {
        self.viewport.set_scroll(x, y, &self.layout);
    }

    pub fn scroll_by(&mut self, delta_x: f32, delta_y: f32) {
        self.viewport.scroll_by(delta_x, delta_y, &self.layout);
    }

    /// Rows, columns and groups intersecting the viewport.
    pub fn visible_slice(&self) -> VisibleSlice {
        let items = self.root.items();
        let mut slice = VisibleSlice {
            columns: self.viewport.visible_columns(&self.layout),
            ..VisibleSlice::default()
        };
        for position in self.viewport.visible_rows(&self.layout) {
            let Some(&index) = self.layout.row_items.get(position) else {
                continue;
            };
            if let Some(id) = items.get(index) {
                slice.rows.push(id.clone());
                slice.row_indices.push(index);
            }
        }
        let top = self.viewport.scroll_y;
        let bottom = top + self.viewport.height;
        for child in self.root.children() {
            collect_visible_groups(&child, top, bottom, &mut slice.groups);
        }
        slice
    }

    /// Visible rows with their rectangles, in display order.
    pub fn visible_rows(&self) -> Vec<(RowId, Rect)> {
        let items = self.root.items();
        self.viewport
            .visible_rows(&self.layout)
            .filter_map(|position| {
                let index = *self.layout.row_items.get(position)?;
                Some((items.get(index)?.clone(), self.layout.row_rect(index)?))
            })
            .collect()
    }

    // ---- frame requests ----------------------------------------------------

    /// Defer a pointer move to the next frame. A newer move replaces it.
    pub fn request_pointer_move(&mut self, cell: CellIndex) -> FrameId {
        self.frames
            .request(FrameKey::Pointer, FrameAction::PointerMove(cell))
    }

    /// Defer a scroll to the next frame. A newer scroll replaces it.
    pub fn request_scroll(&mut self, x: f32, y: f32) -> FrameId {
        self.frames.request(FrameKey::Scroll, FrameAction::ScrollTo(x, y))
    }

    pub fn cancel_frame(&mut self, id: FrameId) -> bool {
        self.frames.cancel(id)
    }

    /// The host's animation frame fired: run every deferred request.
    pub fn run_frame(&mut self) -> usize {
        let actions = self.frames.take_frame();
        let count = actions.len();
        for (_, action) in actions {
            match action {
                FrameAction::PointerMove(cell) => self.pointer_move(cell),
                FrameAction::ScrollTo(x, y) => self.scroll_to(x, y),
            }
        }
        count
    }

    // ---- retries -----------------------------------------------------------

    /// Scroll a row into view. When the row has no rectangle yet (unknown,
    /// or inside a collapsed group) the lookup is retried once on a later
    /// [`Grid::poll`].
    pub fn scroll_to_row(&mut self, id: &str) -> Option<Rect> {
        let rect = self
            .retries
            .attempt(id.to_string(), |id| locate_row(&self.root, &self.layout, id))?;
        self.viewport
            .scroll_into_view(rect.top, rect.height, &self.layout);
        Some(rect)
    }

    /// Drive time-based work: throttled event delivery and due retries.
    /// Returns the events delivered by this call.
    pub fn poll(&mut self) -> Vec<(EventKey, GridEvent)> {
        let delivered = self.events.poll();
        let retried = self
            .retries
            .poll(|id| locate_row(&self.root, &self.layout, id));
        for (id, rect) in retried {
            match rect {
                Some(rect) => {
                    self.viewport
                        .scroll_into_view(rect.top, rect.height, &self.layout);
                }
                None => tracing::debug!(target: "xlgrid::grid", %id, "row still not laid out"),
            }
        }
        delivered
    }

    // ---- deferred focus ----------------------------------------------------

    pub fn pending_focus(&self) -> Option<&PendingFocus> {
        self.pending_focus.as_ref()
    }

    /// Focus the cell recorded by the last draft row, now that the host
    /// rendered it. The row index is looked up again here since rows may
    /// have moved in between.
    pub fn resolve_pending_focus(&mut self) -> Option<CellIndex> {
        let focus = self.pending_focus.take()?;
        let row_index = self.find_row_index(&focus.row_id)?;
        let last_column = self.layout.column_count().checked_sub(1)?;
        let cell = CellIndex::new(row_index, focus.column_index.min(last_column));
        if let Some(rect) = self.layout.row_rect(row_index) {
            self.viewport
                .scroll_into_view(rect.top, rect.height, &self.layout);
        }
        self.select_cells(cell, cell)
            .and_then(|state| state.primary)
    }
}

fn locate_row(root: &GroupRef<RowId>, layout: &GridLayout, id: &RowId) -> Option<Rect> {
    let index = root.items().iter().position(|item| item == id)?;
    layout.row_rect(index)
}

fn collect_visible_groups(node: &GroupRef<RowId>, top: f32, bottom: f32, out: &mut Vec<GroupId>) {
    if !node.view_props().rect.intersects_y(top, bottom) {
        return;
    }
    out.push(node.id());
    if node.is_collapsed() {
        return;
    }
    for child in node.children() {
        collect_visible_groups(&child, top, bottom, out);
    }
}
