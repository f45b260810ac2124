//! Text search over the displayed cells.

use serde::Serialize;

use super::Grid;
use crate::types::CellIndex;

/// Matches of the current query, in display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchInfo {
    pub query: String,
    pub matches: Vec<CellIndex>,
    /// Index into `matches` of the focused match.
    pub focus: Option<usize>,
}

impl SearchInfo {
    pub fn focused(&self) -> Option<CellIndex> {
        self.matches.get(self.focus?).copied()
    }
}

impl Grid {
    /// Search displayed cells for `query` (case-insensitive substring).
    /// An empty query clears the search.
    pub fn search(&mut self, query: &str) -> &SearchInfo {
        self.search = SearchInfo {
            query: query.to_string(),
            matches: Vec::new(),
            focus: None,
        };
        self.refresh_search();
        self.focus_match();
        &self.search
    }

    /// Focus the next match, wrapping around.
    pub fn search_next(&mut self) -> Option<CellIndex> {
        let count = self.search.matches.len();
        if count == 0 {
            return None;
        }
        let next = self.search.focus.map_or(0, |f| (f + 1) % count);
        self.search.focus = Some(next);
        self.focus_match()
    }

    /// Focus the previous match, wrapping around.
    pub fn search_previous(&mut self) -> Option<CellIndex> {
        let count = self.search.matches.len();
        if count == 0 {
            return None;
        }
        let previous = self
            .search
            .focus
            .map_or(count - 1, |f| (f + count - 1) % count);
        self.search.focus = Some(previous);
        self.focus_match()
    }

    pub fn search_info(&self) -> &SearchInfo {
        &self.search
    }

    pub fn clear_search(&mut self) {
        self.search = SearchInfo::default();
    }

    /// Recompute matches against the current tree and layout. The focus
    /// index is clamped to the new match list.
    pub(super) fn refresh_search(&mut self) {
        if self.search.query.is_empty() {
            self.search.matches.clear();
            self.search.focus = None;
            return;
        }
        let needle = self.search.query.to_lowercase();
        let mut matches = Vec::new();
        for (row_index, id) in self.root.items().iter().enumerate() {
            let Some(row) = self.row(id) else {
                continue;
            };
            for column_index in 0..self.layout.column_count() {
                let Some(column) = self.visible_column(column_index) else {
                    continue;
                };
                let value = row.value(&column.id);
                if !value.is_empty() && value.display().to_lowercase().contains(&needle) {
                    matches.push(CellIndex::new(row_index, column_index));
                }
            }
        }
        self.search.focus = match (self.search.focus, matches.len()) {
            (_, 0) => None,
            (None, _) => Some(0),
            (Some(f), len) => Some(f.min(len - 1)),
        };
        tracing::trace!(target: "xlgrid::grid", matches = matches.len(), "search refreshed");
        self.search.matches = matches;
    }

    /// Scroll the focused match into view.
    fn focus_match(&mut self) -> Option<CellIndex> {
        let cell = self.search.focused()?;
        if let Some(rect) = self.layout.row_rect(cell.row_index) {
            self.viewport
                .scroll_into_view(rect.top, rect.height, &self.layout);
        }
        Some(cell)
    }
}
