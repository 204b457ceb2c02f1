/*
 *  display/linear.rs
 *
 *  value-widgets - SCADA panel indicators
 *  (c) 2020-26 Stuart Hunter
 *
 *  Linear value/pixel mapping for bars and grouped-bar diagrams
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

use log::debug;
use serde::Deserialize;

use crate::constants::DIAGRAM_BAR_GAP;
use crate::display::error::{check_range, WidgetError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

/// Validated `[min, max]` value range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    min: f64,
    max: f64,
}

impl LinearScale {
    pub fn new(min: f64, max: f64) -> Result<Self, WidgetError> {
        check_range(min, max)?;
        Ok(Self { min, max })
    }

    #[inline]
    pub fn min(&self) -> f64 { self.min }
    #[inline]
    pub fn max(&self) -> f64 { self.max }
    #[inline]
    pub fn span(&self) -> f64 { self.max - self.min }

    pub fn contains(&self, v: f64) -> bool {
        (self.min..=self.max).contains(&v)
    }

    pub fn clamp(&self, v: f64) -> f64 {
        v.max(self.min).min(self.max)
    }

    /// Where bars grow from: zero when on the scale, the minimum otherwise.
    pub fn origin_value(&self) -> f64 {
        if self.contains(0.0) { 0.0 } else { self.min }
    }

    /// Map `v` onto the pixel run `start..end`, where `start` is the pixel
    /// of `min` and `end` the pixel of `max`. Either may be the larger one.
    pub fn to_pixel(&self, v: f64, start: f32, end: f32) -> f32 {
        let frac = (v - self.min) / self.span();
        start + (frac as f32) * (end - start)
    }

    /// Pixel interval covered by a bar for `v`, clamped to the scale and
    /// ordered low to high.
    pub fn bar_extent(&self, v: f64, start: f32, end: f32) -> (f32, f32) {
        let a = self.to_pixel(self.origin_value(), start, end);
        let b = self.to_pixel(self.clamp(v), start, end);
        (a.min(b), a.max(b))
    }
}

/// Label margins that only ever grow.
///
/// Layout derived from the margins is recomputed by the owner whenever a
/// `grow_*` call returns true.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AutoMargin {
    left: u32,
    top: u32,
}

impl AutoMargin {
    pub fn new(left: u32, top: u32) -> Self {
        Self { left, top }
    }

    #[inline]
    pub fn left(&self) -> u32 { self.left }
    #[inline]
    pub fn top(&self) -> u32 { self.top }

    pub fn grow_left(&mut self, required: u32) -> bool {
        if required <= self.left {
            return false;
        }
        debug!("left margin {} -> {}", self.left, required);
        self.left = required;
        true
    }

    pub fn grow_top(&mut self, required: u32) -> bool {
        if required <= self.top {
            return false;
        }
        debug!("top margin {} -> {}", self.top, required);
        self.top = required;
        true
    }
}

/// Width of one bar in a section holding `n_items` bars.
pub fn grouped_bar_width(section_width: f32, n_items: usize) -> f32 {
    if n_items == 0 {
        return 0.0;
    }
    ((section_width - DIAGRAM_BAR_GAP) / n_items as f32 - DIAGRAM_BAR_GAP).max(0.0)
}

/// Left edge of bar `j` in a section starting at `section_x0`.
pub fn grouped_bar_x(section_x0: f32, j: usize, bar_width: f32) -> f32 {
    section_x0 + (j + 1) as f32 * DIAGRAM_BAR_GAP + j as f32 * bar_width
}

/// Labels wider than the bar (less a small margin) are drawn rotated.
pub fn label_needs_rotation(text_width: u32, bar_width: f32) -> bool {
    text_width as f32 > bar_width - DIAGRAM_BAR_GAP
}

/// Bar readout: precision by the scale maximum, aligned sign, optional unit.
pub fn format_bar_readout(v: f64, scale: &LinearScale, units: Option<&str>) -> String {
    let max = scale.max();
    let mut text = if max <= 1.0 {
        format!("{v:.3}")
    } else if max <= 100.0 {
        format!("{v:.2}")
    } else if max <= 1000.0 {
        format!("{v:.1}")
    } else {
        format!("{v:?}")
    };
    if let Some(units) = units {
        text.push_str(&format!(" [{units}]"));
    }
    if scale.min() < 0.0 && v >= 0.0 {
        text.insert(0, ' ');
    }
    text
}

/// Axis label at `v`, shortest form.
pub fn format_axis_label(v: f64) -> String {
    let v = v + 0.0;
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{:?}", (v * 1000.0).round() / 1000.0)
    }
}
