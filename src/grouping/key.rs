//! Grouping keys.
//!
//! Rows land in the same group when their keys are equal. Text is kept
//! exactly as entered; only whitespace-only text counts as empty.

use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::types::CellValue;

/// Hashable, totally ordered form of a cell value used to bucket rows.
///
/// Text keys are exact (case-sensitive); numbers compare by value with
/// `-0.0` folded into `0.0`; dates are day-granular already.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Empty,
    Text(String),
    Number(u64),
    Boolean(bool),
    Date(NaiveDate),
}

impl GroupKey {
    pub fn is_empty(&self) -> bool {
        matches!(self, GroupKey::Empty)
    }

    fn number(&self) -> Option<f64> {
        match self {
            GroupKey::Number(bits) => Some(f64::from_bits(*bits)),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            GroupKey::Boolean(_) => 0,
            GroupKey::Number(_) => 1,
            GroupKey::Date(_) => 2,
            GroupKey::Text(_) => 3,
            GroupKey::Empty => 4,
        }
    }

    /// Order keys for `GroupingType::Asc`/`Desc`. Empty keys stay last either way.
    pub fn compare(&self, other: &GroupKey, descending: bool) -> Ordering {
        match (self.is_empty(), other.is_empty()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            (false, false) => {}
        }
        let ord = self.cmp(other);
        if descending {
            ord.reverse()
        } else {
            ord
        }
    }
}

impl From<&CellValue> for GroupKey {
    fn from(value: &CellValue) -> Self {
        if value.is_empty() {
            return GroupKey::Empty;
        }
        match value {
            CellValue::Empty => GroupKey::Empty,
            CellValue::Text(s) => GroupKey::Text(s.clone()),
            CellValue::Number(n) => {
                let n = if *n == 0.0 { 0.0 } else { *n };
                GroupKey::Number(n.to_bits())
            }
            CellValue::Boolean(b) => GroupKey::Boolean(*b),
            CellValue::Date(d) => GroupKey::Date(*d),
        }
    }
}

impl Ord for GroupKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (GroupKey::Text(a), GroupKey::Text(b)) => a
                .to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b)),
            (GroupKey::Number(_), GroupKey::Number(_)) => match (self.number(), other.number()) {
                (Some(a), Some(b)) => a.total_cmp(&b),
                _ => Ordering::Equal,
            },
            (GroupKey::Boolean(a), GroupKey::Boolean(b)) => b.cmp(a),
            (GroupKey::Date(a), GroupKey::Date(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_sign_folds() {
        assert_eq!(
            GroupKey::from(&CellValue::Number(-0.0)),
            GroupKey::from(&CellValue::Number(0.0))
        );
    }

    #[test]
    fn test_text_keys_are_exact() {
        let padded = GroupKey::from(&CellValue::from(" done"));
        assert_ne!(padded, GroupKey::from(&CellValue::from("done")));
        assert_ne!(
            GroupKey::from(&CellValue::from("Done")),
            GroupKey::from(&CellValue::from("done"))
        );
    }

    #[test]
    fn test_blank_text_is_empty() {
        assert!(GroupKey::from(&CellValue::from("  ")).is_empty());
    }

    #[test]
    fn test_empty_last_in_both_directions() {
        let a = GroupKey::from(&CellValue::from("a"));
        let empty = GroupKey::Empty;
        assert_eq!(a.compare(&empty, false), Ordering::Less);
        assert_eq!(a.compare(&empty, true), Ordering::Less);
    }

    #[test]
    fn test_descending_numbers() {
        let one = GroupKey::from(&CellValue::Number(1.0));
        let two = GroupKey::from(&CellValue::Number(2.0));
        assert_eq!(one.compare(&two, false), Ordering::Less);
        assert_eq!(one.compare(&two, true), Ordering::Greater);
    }
}
