//! xlgrid - engine for virtualized data grids
//!
//! Keeps everything a grid UI derives from its rows and columns in memory,
//! leaving drawing to the host:
//! - Hierarchical grouping with per-group aggregates
//! - Multi-column sorting that can be undone
//! - Binary-search hit testing over precomputed layout
//! - Cell, row and column selection with a fill handle and TSV clipboard
//! - View recycling for the visible slice
//! - Keyed, throttled event batches for the host
//!
//! # Usage (Rust)
//!
//! ```
//! use xlgrid::{Column, DataType, Grid, GridConfig, Row};
//!
//! let columns = vec![
//!     Column::new("status", DataType::Dropdown),
//!     Column::new("amount", DataType::Number),
//! ];
//! let rows = vec![
//!     Row::with_id("r1").with_value("status", "open").with_value("amount", 3.0),
//!     Row::with_id("r2").with_value("status", "done").with_value("amount", 5.0),
//! ];
//! let mut grid = Grid::new(columns, rows, GridConfig::default()).unwrap();
//! grid.group_by_columns(&["status".to_string()]).unwrap();
//! assert_eq!(grid.root().children().len(), 2);
//! ```
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { GridHandle } from 'xlgrid';
//! await init();
//! const grid = new GridHandle(columns, rows, undefined);
//! grid.setListener((events) => console.log(events));
//! grid.groupBy(['status']);
//! ```

pub mod bindings;
pub mod calculate;
pub mod config;
pub mod error;
pub mod events;
pub mod grid;
pub mod grouping;
pub mod layout;
pub mod repeater;
pub mod selection;
pub mod sort;
pub mod state;
pub mod types;

use wasm_bindgen::prelude::*;

pub use bindings::GridHandle;
pub use config::GridConfig;
pub use error::{GridError, Result};
pub use grid::Grid;

pub use types::*;

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
