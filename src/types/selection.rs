use serde::Serialize;

use super::CellIndex;

/// Which selection mode is active. The modes are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectionType {
    #[default]
    None,
    /// Rectangular cell range
    CellRange,
    /// Whole rows, by identity
    Rows,
    /// Whole columns, by index
    Columns,
}

/// Rectangular cell selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionState {
    /// Anchor cell for range extension
    pub primary: Option<CellIndex>,
    /// Top-left corner (normalized)
    pub start: Option<CellIndex>,
    /// Bottom-right corner (normalized)
    pub end: Option<CellIndex>,
    pub row_count: usize,
    pub column_count: usize,
    pub count: usize,
}

impl SelectionState {
    /// Selection covering the rectangle spanned by `a` and `b`, keeping `primary`.
    pub fn spanning(primary: Option<CellIndex>, a: CellIndex, b: CellIndex) -> Self {
        let (start, end) = CellIndex::normalize(a, b);
        let row_count = end.row_index - start.row_index + 1;
        let column_count = end.column_index - start.column_index + 1;
        Self {
            primary: primary.or(Some(start)),
            start: Some(start),
            end: Some(end),
            row_count,
            column_count,
            count: row_count * column_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none()
    }

    /// Get normalized bounds `(start, end)`.
    pub fn bounds(&self) -> Option<(CellIndex, CellIndex)> {
        Some((self.start?, self.end?))
    }

    pub fn contains(&self, cell: CellIndex) -> bool {
        self.bounds().is_some_and(|(start, end)| {
            (start.row_index..=end.row_index).contains(&cell.row_index)
                && (start.column_index..=end.column_index).contains(&cell.column_index)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spanning_counts() {
        let s = SelectionState::spanning(None, CellIndex::new(3, 2), CellIndex::new(1, 0));
        assert_eq!(s.start, Some(CellIndex::new(1, 0)));
        assert_eq!(s.end, Some(CellIndex::new(3, 2)));
        assert_eq!(s.row_count, 3);
        assert_eq!(s.column_count, 3);
        assert_eq!(s.count, 9);
        assert!(s.contains(CellIndex::new(2, 1)));
        assert!(!s.contains(CellIndex::new(4, 1)));
    }
}
