//! Column data types and their per-capability behavior.
//!
//! The set of data types is closed, so behavior is looked up in a static
//! table of plain functions per type instead of per-type trait objects.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::CellValue;

/// Data type tag carried by a column's field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataType {
    #[default]
    Text,
    Number,
    Currency,
    Percent,
    Date,
    Checkbox,
    Dropdown,
    Link,
}

/// How the fill handle extends values of a data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillStrategy {
    /// Linear forecast over the numeric source values.
    Numeric,
    /// Uniform day step between consecutive dates.
    Date,
    /// Tile the source values verbatim.
    Repeat,
}

/// Aggregate shown for a column (footer or group header).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CalculateType {
    Count,
    CountEmpty,
    CountFilled,
    CountUnique,
    PercentEmpty,
    PercentFilled,
    PercentUnique,
    Sum,
    Average,
    Median,
    Min,
    Max,
    Range,
    Earliest,
    Latest,
    DateRange,
}

/// Order of sibling groups produced from a grouping column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupingType {
    #[default]
    Asc,
    Desc,
}

/// Row order contributed by a sorting column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortingType {
    #[default]
    Asc,
    Desc,
}

/// Capability record for one data type.
pub struct Capabilities {
    pub compare: fn(&CellValue, &CellValue) -> Ordering,
    pub parse: fn(&str) -> Option<CellValue>,
    pub fill: FillStrategy,
    pub calculations: &'static [CalculateType],
    pub groupable: bool,
    pub sortable: bool,
    /// Whether the fill handle writes into columns of this type.
    pub fillable: bool,
}

const COUNTS: &[CalculateType] = &[
    CalculateType::Count,
    CalculateType::CountEmpty,
    CalculateType::CountFilled,
    CalculateType::CountUnique,
    CalculateType::PercentEmpty,
    CalculateType::PercentFilled,
    CalculateType::PercentUnique,
];

const NUMERIC: &[CalculateType] = &[
    CalculateType::Count,
    CalculateType::CountEmpty,
    CalculateType::CountFilled,
    CalculateType::CountUnique,
    CalculateType::PercentEmpty,
    CalculateType::PercentFilled,
    CalculateType::PercentUnique,
    CalculateType::Sum,
    CalculateType::Average,
    CalculateType::Median,
    CalculateType::Min,
    CalculateType::Max,
    CalculateType::Range,
];

const DATES: &[CalculateType] = &[
    CalculateType::Count,
    CalculateType::CountEmpty,
    CalculateType::CountFilled,
    CalculateType::CountUnique,
    CalculateType::PercentEmpty,
    CalculateType::PercentFilled,
    CalculateType::PercentUnique,
    CalculateType::Earliest,
    CalculateType::Latest,
    CalculateType::DateRange,
];

const CHECKBOX: &[CalculateType] = &[
    CalculateType::Count,
    CalculateType::CountEmpty,
    CalculateType::CountFilled,
    CalculateType::PercentEmpty,
    CalculateType::PercentFilled,
];

static TEXT_CAPS: Capabilities = Capabilities {
    compare: compare_text,
    parse: parse_text,
    fill: FillStrategy::Repeat,
    calculations: COUNTS,
    groupable: true,
    sortable: true,
    fillable: true,
};

static NUMBER_CAPS: Capabilities = Capabilities {
    compare: compare_number,
    parse: parse_number,
    fill: FillStrategy::Numeric,
    calculations: NUMERIC,
    groupable: true,
    sortable: true,
    fillable: true,
};

static PERCENT_CAPS: Capabilities = Capabilities {
    compare: compare_number,
    parse: parse_percent,
    fill: FillStrategy::Numeric,
    calculations: NUMERIC,
    groupable: true,
    sortable: true,
    fillable: true,
};

static DATE_CAPS: Capabilities = Capabilities {
    compare: compare_date,
    parse: parse_date,
    fill: FillStrategy::Date,
    calculations: DATES,
    groupable: true,
    sortable: true,
    fillable: true,
};

static CHECKBOX_CAPS: Capabilities = Capabilities {
    compare: compare_bool,
    parse: parse_bool,
    fill: FillStrategy::Repeat,
    calculations: CHECKBOX,
    groupable: true,
    sortable: true,
    fillable: true,
};

static LINK_CAPS: Capabilities = Capabilities {
    compare: compare_text,
    parse: parse_text,
    fill: FillStrategy::Repeat,
    calculations: COUNTS,
    groupable: false,
    sortable: true,
    fillable: false,
};

impl DataType {
    /// Capability record for this type.
    pub fn capabilities(self) -> &'static Capabilities {
        match self {
            DataType::Text | DataType::Dropdown => &TEXT_CAPS,
            DataType::Number | DataType::Currency => &NUMBER_CAPS,
            DataType::Percent => &PERCENT_CAPS,
            DataType::Date => &DATE_CAPS,
            DataType::Checkbox => &CHECKBOX_CAPS,
            DataType::Link => &LINK_CAPS,
        }
    }

    pub fn supports_calculation(self, calculate_type: CalculateType) -> bool {
        self.capabilities().calculations.contains(&calculate_type)
    }

    pub fn is_numeric(self) -> bool {
        self.capabilities().fill == FillStrategy::Numeric
    }
}

/// Typed value descriptor of a column.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub data_type: DataType,
    /// A required cell must not be left empty.
    #[serde(default)]
    pub required: bool,
    /// Allowed values for `Dropdown` fields (empty = unrestricted).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl Field {
    pub fn new(data_type: DataType) -> Self {
        Self {
            data_type,
            required: false,
            options: Vec::new(),
        }
    }

    /// Parse user input into a value of this field's type.
    ///
    /// Empty input clears the cell. Returns `None` when the text does not
    /// describe a valid value.
    pub fn parse(&self, input: &str) -> Option<CellValue> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Some(CellValue::Empty);
        }
        let value = (self.data_type.capabilities().parse)(trimmed)?;
        self.validate(&value).then_some(value)
    }

    /// Whether the value is acceptable for this field.
    pub fn validate(&self, value: &CellValue) -> bool {
        if value.is_empty() {
            return true;
        }
        match self.data_type {
            DataType::Text | DataType::Link => matches!(value, CellValue::Text(_)),
            DataType::Dropdown => match value {
                CellValue::Text(s) => self.options.is_empty() || self.options.contains(s),
                _ => false,
            },
            DataType::Number | DataType::Currency | DataType::Percent => {
                value.as_number().is_some()
            }
            DataType::Date => value.as_date().is_some(),
            DataType::Checkbox => value.as_bool().is_some(),
        }
    }

    /// A required field holding an empty value.
    pub fn is_required_and_empty(&self, value: &CellValue) -> bool {
        self.required && value.is_empty()
    }

    pub fn compare(&self, a: &CellValue, b: &CellValue) -> Ordering {
        (self.data_type.capabilities().compare)(a, b)
    }
}

/// Empty values always sort after non-empty ones.
fn compare_empty(a: &CellValue, b: &CellValue) -> Option<Ordering> {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => Some(Ordering::Equal),
        (true, false) => Some(Ordering::Greater),
        (false, true) => Some(Ordering::Less),
        (false, false) => None,
    }
}

fn compare_text(a: &CellValue, b: &CellValue) -> Ordering {
    if let Some(ord) = compare_empty(a, b) {
        return ord;
    }
    let left = a.display().to_lowercase();
    let right = b.display().to_lowercase();
    left.cmp(&right)
}

fn compare_number(a: &CellValue, b: &CellValue) -> Ordering {
    if let Some(ord) = compare_empty(a, b) {
        return ord;
    }
    match (a.as_number(), b.as_number()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => compare_text(a, b),
    }
}

fn compare_date(a: &CellValue, b: &CellValue) -> Ordering {
    if let Some(ord) = compare_empty(a, b) {
        return ord;
    }
    match (a.as_date(), b.as_date()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => compare_text(a, b),
    }
}

fn compare_bool(a: &CellValue, b: &CellValue) -> Ordering {
    let left = a.as_bool().unwrap_or(false);
    let right = b.as_bool().unwrap_or(false);
    // Checked before unchecked.
    right.cmp(&left)
}

fn parse_text(input: &str) -> Option<CellValue> {
    Some(CellValue::Text(input.to_string()))
}

fn parse_number(input: &str) -> Option<CellValue> {
    let cleaned: String = input
        .chars()
        .filter(|c| !matches!(c, ',' | '$' | '€' | '£' | ' '))
        .collect();
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(CellValue::Number)
}

fn parse_percent(input: &str) -> Option<CellValue> {
    match input.strip_suffix('%') {
        Some(stripped) => parse_number(stripped)
            .and_then(|v| v.as_number())
            .map(|n| CellValue::Number(n / 100.0)),
        None => parse_number(input),
    }
}

fn parse_date(input: &str) -> Option<CellValue> {
    const FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
        .map(CellValue::Date)
}

fn parse_bool(input: &str) -> Option<CellValue> {
    if input.eq_ignore_ascii_case("true") || input == "1" {
        return Some(CellValue::Boolean(true));
    }
    if input.eq_ignore_ascii_case("false") || input == "0" {
        return Some(CellValue::Boolean(false));
    }
    None
}
