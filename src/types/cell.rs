use serde::{Deserialize, Serialize};

/// Positional cell address `(row_index, column_index)`.
///
/// Only meaningful against one specific ordering (the flattened display
/// order of rows and the visible column order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellIndex {
    pub row_index: usize,
    pub column_index: usize,
}

impl CellIndex {
    pub fn new(row_index: usize, column_index: usize) -> Self {
        Self {
            row_index,
            column_index,
        }
    }

    /// Normalize two corners into `(top_left, bottom_right)`.
    pub fn normalize(a: CellIndex, b: CellIndex) -> (CellIndex, CellIndex) {
        (
            CellIndex::new(
                a.row_index.min(b.row_index),
                a.column_index.min(b.column_index),
            ),
            CellIndex::new(
                a.row_index.max(b.row_index),
                a.column_index.max(b.column_index),
            ),
        )
    }
}

/// Rectangular, possibly sparse block of cells.
///
/// Holes (`None`) keep the shape intact when cells are filtered out.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MatrixCell<T> {
    rows: Vec<Vec<Option<T>>>,
    column_count: usize,
}

impl<T> MatrixCell<T> {
    /// Build from row vectors. Short rows are padded with holes.
    pub fn from_rows(rows: Vec<Vec<Option<T>>>) -> Self {
        let column_count = rows.iter().map(Vec::len).max().unwrap_or(0);
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize_with(column_count, || None);
                row
            })
            .collect();
        Self { rows, column_count }
    }

    /// A matrix of `row_count x column_count` holes.
    pub fn empty(row_count: usize, column_count: usize) -> Self {
        let rows = (0..row_count)
            .map(|_| (0..column_count).map(|_| None).collect())
            .collect();
        Self { rows, column_count }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    /// Number of slots (including holes).
    pub fn count(&self) -> usize {
        self.row_count() * self.column_count
    }

    /// Number of non-hole cells.
    pub fn filled_count(&self) -> usize {
        self.rows.iter().flatten().filter(|c| c.is_some()).count()
    }

    pub fn get(&self, row: usize, column: usize) -> Option<&T> {
        self.rows.get(row)?.get(column)?.as_ref()
    }

    /// Store a value. Out-of-range positions are ignored.
    pub fn set(&mut self, row: usize, column: usize, value: Option<T>) {
        if let Some(slot) = self.rows.get_mut(row).and_then(|r| r.get_mut(column)) {
            *slot = value;
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Option<T>]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Iterate `(row, column, value)` over non-hole cells.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter_map(move |(c, cell)| cell.as_ref().map(|v| (r, c, v)))
        })
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> MatrixCell<U> {
        MatrixCell {
            rows: self
                .rows
                .iter()
                .map(|row| row.iter().map(|c| c.as_ref().map(&mut f)).collect())
                .collect(),
            column_count: self.column_count,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        let (start, end) = CellIndex::normalize(CellIndex::new(5, 1), CellIndex::new(2, 4));
        assert_eq!(start, CellIndex::new(2, 1));
        assert_eq!(end, CellIndex::new(5, 4));
    }

    #[test]
    fn test_ragged_rows_are_padded() {
        let m = MatrixCell::from_rows(vec![vec![Some(1), Some(2)], vec![Some(3)]]);
        assert_eq!(m.row_count(), 2);
        assert_eq!(m.column_count(), 2);
        assert_eq!(m.count(), 4);
        assert_eq!(m.filled_count(), 3);
        assert_eq!(m.get(1, 1), None);
        assert_eq!(m.get(1, 0), Some(&3));
    }

    #[test]
    fn test_set_out_of_range_is_ignored() {
        let mut m: MatrixCell<i32> = MatrixCell::empty(1, 1);
        m.set(4, 4, Some(1));
        m.set(0, 0, Some(7));
        assert_eq!(m.iter().collect::<Vec<_>>(), vec![(0, 0, &7)]);
    }
}
