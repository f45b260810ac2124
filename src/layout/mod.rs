//! Layout engine for computing row, column and group positions.
//!
//! This module handles:
//! - Pre-computing positions from column widths, row height and group bands
//! - Managing viewport state (scroll position, visible range)
//! - Binary search for efficient lookup at content offsets

mod grid_layout;
mod lookup;
mod viewport;

pub use grid_layout::GridLayout;
pub use lookup::{find_group_at_pointer_offset, find_group_by_item_index};
pub use viewport::Viewport;
