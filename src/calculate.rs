//! Column aggregates.
//!
//! The grid decides when a column is recalculated and where the result is
//! stored; the arithmetic is delegated to a [`Calculator`].

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::grouping::GroupKey;
use crate::types::{CalculateType, CellValue, DataType, Field};

/// Reduces the values of one column to a single scalar.
pub trait Calculator {
    /// Aggregate `values` (one per row, empty cells included).
    ///
    /// Returns `CellValue::Empty` when the calculation does not apply to
    /// the field's data type or there is nothing to aggregate.
    fn calculate_by(
        &self,
        values: &[&CellValue],
        calculate_type: CalculateType,
        field: &Field,
    ) -> CellValue;
}

/// Built-in aggregates for every [`CalculateType`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardCalculator;

impl Calculator for StandardCalculator {
    fn calculate_by(
        &self,
        values: &[&CellValue],
        calculate_type: CalculateType,
        field: &Field,
    ) -> CellValue {
        if !field.data_type.supports_calculation(calculate_type) {
            return CellValue::Empty;
        }
        let total = values.len();
        let filled: Vec<&CellValue> = values
            .iter()
            .copied()
            .filter(|v| !is_blank(v, field))
            .collect();

        match calculate_type {
            CalculateType::Count => count(total),
            CalculateType::CountEmpty => count(total - filled.len()),
            CalculateType::CountFilled => count(filled.len()),
            CalculateType::CountUnique => count(unique(&filled)),
            CalculateType::PercentEmpty => percent(total - filled.len(), total),
            CalculateType::PercentFilled => percent(filled.len(), total),
            CalculateType::PercentUnique => percent(unique(&filled), total),
            CalculateType::Sum => number(numbers(&filled).iter().sum()),
            CalculateType::Average => {
                let ns = numbers(&filled);
                if ns.is_empty() {
                    return CellValue::Empty;
                }
                number(ns.iter().sum::<f64>() / ns.len() as f64)
            }
            CalculateType::Median => median(numbers(&filled)).map_or(CellValue::Empty, number),
            CalculateType::Min => numbers(&filled)
                .into_iter()
                .reduce(f64::min)
                .map_or(CellValue::Empty, number),
            CalculateType::Max => numbers(&filled)
                .into_iter()
                .reduce(f64::max)
                .map_or(CellValue::Empty, number),
            CalculateType::Range => {
                let ns = numbers(&filled);
                let min = ns.iter().copied().reduce(f64::min);
                let max = ns.iter().copied().reduce(f64::max);
                match (min, max) {
                    (Some(min), Some(max)) => number(max - min),
                    _ => CellValue::Empty,
                }
            }
            CalculateType::Earliest => dates(&filled)
                .into_iter()
                .min()
                .map_or(CellValue::Empty, CellValue::Date),
            CalculateType::Latest => dates(&filled)
                .into_iter()
                .max()
                .map_or(CellValue::Empty, CellValue::Date),
            CalculateType::DateRange => {
                let ds = dates(&filled);
                match (ds.iter().min(), ds.iter().max()) {
                    (Some(first), Some(last)) => {
                        CellValue::Number((*last - *first).num_days() as f64)
                    }
                    _ => CellValue::Empty,
                }
            }
        }
    }
}

/// Unchecked checkboxes count as empty.
fn is_blank(value: &CellValue, field: &Field) -> bool {
    value.is_empty() || (field.data_type == DataType::Checkbox && value.as_bool() != Some(true))
}

fn count(n: usize) -> CellValue {
    CellValue::Number(n as f64)
}

fn percent(part: usize, total: usize) -> CellValue {
    if total == 0 {
        return CellValue::Number(0.0);
    }
    CellValue::Number(part as f64 * 100.0 / total as f64)
}

fn number(n: f64) -> CellValue {
    if n.is_finite() {
        CellValue::Number(n)
    } else {
        CellValue::Empty
    }
}

fn unique(values: &[&CellValue]) -> usize {
    values
        .iter()
        .map(|v| GroupKey::from(*v))
        .collect::<HashSet<_>>()
        .len()
}

fn numbers(values: &[&CellValue]) -> Vec<f64> {
    values.iter().filter_map(|v| v.as_number()).collect()
}

fn dates(values: &[&CellValue]) -> Vec<NaiveDate> {
    values.iter().filter_map(|v| v.as_date()).collect()
}

fn median(mut ns: Vec<f64>) -> Option<f64> {
    if ns.is_empty() {
        return None;
    }
    ns.sort_by(f64::total_cmp);
    let mid = ns.len() / 2;
    if ns.len().is_multiple_of(2) {
        let low = ns.get(mid.checked_sub(1)?)?;
        let high = ns.get(mid)?;
        Some((low + high) / 2.0)
    } else {
        ns.get(mid).copied()
    }
}
