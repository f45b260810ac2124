//! Data model of the grid: values, fields, columns, rows, cells and layout metadata.

mod cell;
mod column;
mod field;
mod row;
mod selection;
mod value;
mod view_props;

pub use cell::*;
pub use column::*;
pub use field::*;
pub use row::*;
pub use selection::*;
pub use value::*;
pub use view_props::*;
