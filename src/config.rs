//! Grid configuration.

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};

/// Tunables of a grid instance. Loadable from camelCase JSON; missing
/// fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridConfig {
    pub row_height: f32,
    pub default_column_width: f32,
    pub min_column_width: f32,
    pub group_header_height: f32,
    pub group_footer_height: f32,
    /// Vertical space between sibling groups.
    pub group_gap: f32,
    /// Detached views kept for reuse by a repeater.
    pub recycle_cache_size: usize,
    pub event_throttle_ms: u64,
    /// Schedule a throttled emit on every queued event.
    pub auto_emit: bool,
    /// Delay before a failed position query is retried.
    pub retry_delay_ms: u64,
    pub frozen_columns: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            row_height: 32.0,
            default_column_width: 180.0,
            min_column_width: 60.0,
            group_header_height: 48.0,
            group_footer_height: 0.0,
            group_gap: 16.0,
            recycle_cache_size: 20,
            event_throttle_ms: 100,
            auto_emit: true,
            retry_delay_ms: 150,
            frozen_columns: 0,
        }
    }
}

impl GridConfig {
    /// Parse and validate a JSON config.
    ///
    /// # Errors
    /// Returns an error on malformed JSON or out-of-range values.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: GridConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// Returns [`GridError::InvalidConfig`] for non-positive sizes.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("rowHeight", self.row_height),
            ("defaultColumnWidth", self.default_column_width),
            ("minColumnWidth", self.min_column_width),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(GridError::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        let non_negative = [
            ("groupHeaderHeight", self.group_header_height),
            ("groupFooterHeight", self.group_footer_height),
            ("groupGap", self.group_gap),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(GridError::InvalidConfig(format!(
                    "{name} must not be negative, got {value}"
                )));
            }
        }
        if self.min_column_width > self.default_column_width {
            return Err(GridError::InvalidConfig(
                "minColumnWidth exceeds defaultColumnWidth".to_string(),
            ));
        }
        Ok(())
    }
}
