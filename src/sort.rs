//! Multi-column row ordering.

use std::cmp::Ordering;

use crate::types::{Column, ColumnId, Field, Row, SortingType};

/// One sorting column: where to read the value and how to compare it.
#[derive(Debug, Clone)]
pub struct SortKey {
    pub column_id: ColumnId,
    pub field: Field,
    pub descending: bool,
}

impl SortKey {
    /// Sort key for `column`, or `None` when its data type cannot be sorted.
    pub fn for_column(column: &Column) -> Option<Self> {
        if !column.data_type().capabilities().sortable {
            return None;
        }
        Some(Self {
            column_id: column.id.clone(),
            field: column.field.clone(),
            descending: column.sorting_type == Some(SortingType::Desc),
        })
    }
}

/// Lexicographic comparator over `keys`. Empty values stay last in both
/// directions; ties keep the incoming order (callers use a stable sort).
#[derive(Debug, Clone, Default)]
pub struct RowComparator {
    keys: Vec<SortKey>,
}

impl RowComparator {
    pub fn new(keys: Vec<SortKey>) -> Self {
        Self { keys }
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    pub fn compare(&self, a: &Row, b: &Row) -> Ordering {
        for key in &self.keys {
            let left = a.value(&key.column_id);
            let right = b.value(&key.column_id);
            let ord = match (left.is_empty(), right.is_empty()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => {
                    let ord = key.field.compare(left, right);
                    if key.descending {
                        ord.reverse()
                    } else {
                        ord
                    }
                }
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}
