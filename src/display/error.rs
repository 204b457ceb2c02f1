/*
 *  display/error.rs
 *
 *  value-widgets - SCADA panel indicators
 *  (c) 2020-26 Stuart Hunter
 *
 *  Unified error types for the widget layer
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use thiserror::Error;

/// Unified error type for widget configuration and state updates.
///
/// Out-of-range values are not errors: they are rendered (clamped needle,
/// fault readout). Only nonsensical configuration and caller bugs end up here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WidgetError {
    /// Invalid bounds, steps, thresholds or sizes
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Discrete state code that was never registered
    #[error("Unknown discrete state: {0}")]
    UnknownState(i32),

    /// Series/section index beyond the current model size
    #[error("Index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// Value matrix does not match sections x items
    #[error("Value matrix shape mismatch: expected {expected_rows}x{expected_cols}, got {rows}x{cols}")]
    ShapeMismatch {
        expected_rows: usize,
        expected_cols: usize,
        rows: usize,
        cols: usize,
    },
}

impl WidgetError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        WidgetError::Configuration(msg.into())
    }
}

/// Reject non-finite numbers and `min >= max` ranges.
pub(crate) fn check_range(min: f64, max: f64) -> Result<(), WidgetError> {
    if !min.is_finite() || !max.is_finite() {
        return Err(WidgetError::config(format!("bounds must be finite (min {min}, max {max})")));
    }
    if min >= max {
        return Err(WidgetError::config(format!("min_value {min} must be below max_value {max}")));
    }
    Ok(())
}
