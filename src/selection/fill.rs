//! Fill-handle extrapolation.
//!
//! A source block is extended into the rows below it (or above it when
//! `reverse` is set). Each source column becomes a series:
//!
//! * numeric columns with two or more numbers: least-squares line over
//!   `(row offset, value)`; a single-row numeric source steps by one
//! * date columns with a uniform day step continue that step; a single
//!   date steps by one day; a non-uniform step tiles the source verbatim
//! * anything else tiles the source rows
//!
//! Target row `t` (counted away from the source) belongs to page
//! `t / source_rows`.

use chrono::{Duration, NaiveDate};

use crate::types::{CellValue, FillStrategy, Field, MatrixCell};

/// One extrapolated cell of the target block.
#[derive(Debug, Clone, PartialEq)]
pub struct FilledCell {
    /// Row inside the target block, top-down.
    pub row: usize,
    /// Column inside the block.
    pub column: usize,
    pub value: CellValue,
    pub page: usize,
}

#[derive(Debug, Clone)]
enum Series {
    Linear { slope: f64, intercept: f64 },
    Days { anchor: NaiveDate, step: i64 },
    Tile(Vec<CellValue>),
}

impl Series {
    fn for_column(values: Vec<CellValue>, field: Option<&Field>, reverse: bool) -> Self {
        let strategy = field.map_or(FillStrategy::Repeat, |f| f.data_type.capabilities().fill);
        match strategy {
            FillStrategy::Numeric => Self::numeric(values),
            FillStrategy::Date => Self::dates(values, reverse),
            FillStrategy::Repeat => Series::Tile(values),
        }
    }

    fn numeric(values: Vec<CellValue>) -> Self {
        let points: Vec<(f64, f64)> = values
            .iter()
            .enumerate()
            .filter_map(|(x, v)| v.as_number().map(|y| (x as f64, y)))
            .collect();
        match points.as_slice() {
            // x = 0 is the source row; targets sit at 1, 2, ... or -1, -2, ...
            [(_, y)] if values.len() == 1 => Series::Linear {
                slope: 1.0,
                intercept: *y,
            },
            [_, _, ..] => match least_squares(&points) {
                Some((slope, intercept)) => Series::Linear { slope, intercept },
                None => Series::Tile(values),
            },
            _ => Series::Tile(values),
        }
    }

    fn dates(values: Vec<CellValue>, reverse: bool) -> Self {
        let dates: Vec<NaiveDate> = values.iter().filter_map(CellValue::as_date).collect();
        if dates.len() != values.len() {
            return Series::Tile(values);
        }
        match dates.as_slice() {
            [] => Series::Tile(values),
            [only] => Series::Days {
                anchor: *only,
                step: 1,
            },
            [first, rest @ ..] => {
                let step = rest.first().map_or(0, |second| (*second - *first).num_days());
                let uniform = dates
                    .windows(2)
                    .all(|pair| matches!(pair, [a, b] if (*b - *a).num_days() == step));
                if !uniform {
                    return Series::Tile(values);
                }
                let anchor = if reverse { *first } else { dates.last().copied().unwrap_or(*first) };
                Series::Days { anchor, step }
            }
        }
    }

    /// Value `distance` rows away from the source (1 = adjacent row).
    fn value_at(&self, distance: usize, source_rows: usize, reverse: bool) -> CellValue {
        match self {
            Series::Linear { slope, intercept } => {
                let x = if reverse {
                    -(distance as f64)
                } else {
                    (source_rows - 1 + distance) as f64
                };
                CellValue::Number(tidy(intercept + slope * x))
            }
            Series::Days { anchor, step } => {
                let days = step.saturating_mul(i64::try_from(distance).unwrap_or(i64::MAX));
                let offset = if reverse { -days } else { days };
                anchor
                    .checked_add_signed(Duration::days(offset))
                    .map_or(CellValue::Empty, CellValue::Date)
            }
            Series::Tile(values) => {
                let n = values.len().max(1);
                let t = (distance - 1) % n;
                let index = if reverse { n - 1 - t } else { t };
                values.get(index).cloned().unwrap_or_default()
            }
        }
    }
}

/// Slope and intercept of the least-squares line through `points`.
fn least_squares(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;
    let sxx: f64 = points.iter().map(|p| (p.0 - mean_x).powi(2)).sum();
    if sxx <= f64::EPSILON {
        return None;
    }
    let sxy: f64 = points.iter().map(|p| (p.0 - mean_x) * (p.1 - mean_y)).sum();
    let slope = sxy / sxx;
    Some((slope, mean_y - slope * mean_x))
}

/// Round away binary noise from the regression.
fn tidy(value: f64) -> f64 {
    if value.abs() >= 1e12 {
        return value;
    }
    let rounded = (value * 1e9).round() / 1e9;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Extrapolate `source` into `target_rows` rows.
///
/// `fields` gives the field of each source column (missing = tile).
/// `skip(row, column)` marks target cells that must not be written; they
/// still consume their position in the series.
pub fn extrapolate(
    source: &MatrixCell<CellValue>,
    fields: &[&Field],
    target_rows: usize,
    reverse: bool,
    skip: impl Fn(usize, usize) -> bool,
) -> Vec<FilledCell> {
    let source_rows = source.row_count();
    if source_rows == 0 || target_rows == 0 {
        return Vec::new();
    }

    let series: Vec<Series> = (0..source.column_count())
        .map(|column| {
            let values = (0..source_rows)
                .map(|row| source.get(row, column).cloned().unwrap_or_default())
                .collect();
            Series::for_column(values, fields.get(column).copied(), reverse)
        })
        .collect();

    let mut out = Vec::with_capacity(target_rows * series.len());
    for t in 0..target_rows {
        let row = if reverse { target_rows - 1 - t } else { t };
        let page = t / source_rows;
        for (column, s) in series.iter().enumerate() {
            if skip(row, column) {
                continue;
            }
            out.push(FilledCell {
                row,
                column,
                value: s.value_at(t + 1, source_rows, reverse),
                page,
            });
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::types::DataType;

    fn column(values: Vec<CellValue>) -> MatrixCell<CellValue> {
        MatrixCell::from_rows(values.into_iter().map(|v| vec![Some(v)]).collect())
    }

    fn numbers(cells: &[FilledCell]) -> Vec<f64> {
        cells.iter().map(|c| c.value.as_number().unwrap()).collect()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_linear_series_forward() {
        let field = Field::new(DataType::Number);
        let source = column(vec![10.0.into(), 20.0.into()]);
        let out = extrapolate(&source, &[&field], 4, false, |_, _| false);
        assert_eq!(numbers(&out), vec![30.0, 40.0, 50.0, 60.0]);
        let pages: Vec<usize> = out.iter().map(|c| c.page).collect();
        assert_eq!(pages, vec![0, 0, 1, 1]);
    }

    #[test]
    fn test_linear_series_reverse() {
        let field = Field::new(DataType::Number);
        let source = column(vec![10.0.into(), 20.0.into()]);
        let out = extrapolate(&source, &[&field], 2, true, |_, _| false);
        // the row nearest the source comes first
        assert_eq!(out[0].row, 1);
        assert_eq!(out[0].value, CellValue::Number(0.0));
        assert_eq!(out[1].row, 0);
        assert_eq!(out[1].value, CellValue::Number(-10.0));
    }

    #[test]
    fn test_single_number_steps_by_one() {
        let field = Field::new(DataType::Number);
        let source = column(vec![5.0.into()]);
        let out = extrapolate(&source, &[&field], 3, false, |_, _| false);
        assert_eq!(numbers(&out), vec![6.0, 7.0, 8.0]);
        let pages: Vec<usize> = out.iter().map(|c| c.page).collect();
        assert_eq!(pages, vec![0, 1, 2]);

        let out = extrapolate(&source, &[&field], 2, true, |_, _| false);
        assert_eq!(out[0].row, 1);
        assert_eq!(out[0].value, CellValue::Number(4.0));
        assert_eq!(out[1].row, 0);
        assert_eq!(out[1].value, CellValue::Number(3.0));
    }

    #[test]
    fn test_uniform_dates() {
        let field = Field::new(DataType::Date);
        let source = column(vec![date(2024, 1, 1).into(), date(2024, 1, 8).into()]);
        let out = extrapolate(&source, &[&field], 2, false, |_, _| false);
        assert_eq!(out[0].value, CellValue::Date(date(2024, 1, 15)));
        assert_eq!(out[1].value, CellValue::Date(date(2024, 1, 22)));
    }

    #[test]
    fn test_non_uniform_dates_tile() {
        let field = Field::new(DataType::Date);
        let a = date(2024, 1, 1);
        let b = date(2024, 1, 2);
        let c = date(2024, 1, 9);
        let source = column(vec![a.into(), b.into(), c.into()]);
        let out = extrapolate(&source, &[&field], 4, false, |_, _| false);
        let values: Vec<CellValue> = out.into_iter().map(|c| c.value).collect();
        assert_eq!(values, vec![a.into(), b.into(), c.into(), a.into()]);
    }

    #[test]
    fn test_text_tiles_pattern() {
        let field = Field::new(DataType::Text);
        let source = column(vec!["a".into(), "b".into()]);
        let out = extrapolate(&source, &[&field], 5, false, |_, _| false);
        let values: Vec<String> = out.iter().map(|c| c.value.display()).collect();
        assert_eq!(values, vec!["a", "b", "a", "b", "a"]);
    }

    #[test]
    fn test_skipped_cells_still_advance() {
        let field = Field::new(DataType::Number);
        let source = column(vec![1.0.into(), 2.0.into()]);
        let out = extrapolate(&source, &[&field], 3, false, |row, _| row == 1);
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].row, 2);
        assert_eq!(out[1].value, CellValue::Number(5.0));
    }
}
