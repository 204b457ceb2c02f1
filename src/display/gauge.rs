/*
 *  display/gauge.rs
 *
 *  value-widgets - SCADA panel indicators
 *  (c) 2020-26 Stuart Hunter
 *
 *  Dial geometry: value/angle/pixel transforms, tick layout and readouts
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

use core::fmt::Write;

use arrayvec::ArrayString;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use log::warn;

use crate::constants::{GAUGE_MAX_TICKS, GAUGE_PADDING, GAUGE_START_ANGLE_DEG, GAUGE_STOP_ANGLE_DEG};
use crate::display::error::{check_range, WidgetError};

/// Slack used when comparing accumulated tick positions against bounds.
const TICK_EPSILON: f64 = 1e-9;

/// Minor divisions per major step when only one step is given.
const MINORS_PER_MAJOR: f64 = 5.0;

/// One scale division.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    pub value: f64,
    pub major: bool,
}

/// Dial configuration.
///
/// Angles are in degrees, counter-clockwise from 3 o'clock, screen y
/// pointing down. The default sweep runs clockwise from 225 to -45 degrees.
/// Tick positions are regenerated from this on every paint.
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeConfig {
    origin: Point,
    diameter: u32,
    padding: u32,
    min_value: f64,
    max_value: f64,
    start_angle_deg: f64,
    stop_angle_deg: f64,
    major_step: f64,
    minor_step: f64,
    /// Steps were chosen by the caller rather than derived from the span.
    steps_explicit: bool,
}

impl GaugeConfig {
    /// Dial whose bounding square has its top-left at `origin`.
    /// Steps default to a tenth and a fiftieth of the span.
    pub fn new(origin: Point, diameter: u32, min_value: f64, max_value: f64) -> Result<Self, WidgetError> {
        check_range(min_value, max_value)?;
        if diameter == 0 {
            return Err(WidgetError::config("dial diameter must be positive"));
        }
        let span = max_value - min_value;
        Ok(Self {
            origin,
            diameter,
            padding: GAUGE_PADDING,
            min_value,
            max_value,
            start_angle_deg: GAUGE_START_ANGLE_DEG,
            stop_angle_deg: GAUGE_STOP_ANGLE_DEG,
            major_step: span / 10.0,
            minor_step: span / 50.0,
            steps_explicit: false,
        })
    }

    pub fn min_value(&self) -> f64 { self.min_value }
    pub fn max_value(&self) -> f64 { self.max_value }
    pub fn major_step(&self) -> f64 { self.major_step }
    pub fn minor_step(&self) -> f64 { self.minor_step }
    pub fn steps_explicit(&self) -> bool { self.steps_explicit }
    pub fn diameter(&self) -> u32 { self.diameter }
    pub fn start_angle_deg(&self) -> f64 { self.start_angle_deg }
    pub fn stop_angle_deg(&self) -> f64 { self.stop_angle_deg }

    #[inline]
    pub fn span(&self) -> f64 {
        self.max_value - self.min_value
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        self.diameter as f64 / 2.0
    }

    /// Dial centre in target coordinates.
    pub fn center(&self) -> (f64, f64) {
        let r = self.radius();
        (self.origin.x as f64 + r, self.origin.y as f64 + r)
    }

    /// Dial square grown by the label padding on every side.
    pub fn bounds(&self) -> Rectangle {
        let pad = self.padding as i32;
        Rectangle::new(
            self.origin - Point::new(pad, pad),
            Size::new(self.diameter + 2 * self.padding, self.diameter + 2 * self.padding),
        )
    }

    pub fn set_geometry(&mut self, origin: Point, diameter: u32) -> Result<(), WidgetError> {
        if diameter == 0 {
            return Err(WidgetError::config("dial diameter must be positive"));
        }
        self.origin = origin;
        self.diameter = diameter;
        Ok(())
    }

    /// Change the scale bounds. Derived steps follow the new span; steps set
    /// through [`set_steps`](Self::set_steps) are kept and re-validated.
    pub fn set_range(&mut self, min_value: f64, max_value: f64) -> Result<(), WidgetError> {
        check_range(min_value, max_value)?;
        let span = max_value - min_value;
        let (major, minor) = if self.steps_explicit {
            validate_steps(span, self.major_step, self.minor_step)?;
            (self.major_step, self.minor_step)
        } else {
            (span / 10.0, span / 50.0)
        };
        self.min_value = min_value;
        self.max_value = max_value;
        self.major_step = major;
        self.minor_step = minor;
        Ok(())
    }

    pub fn set_steps(&mut self, major_step: f64, minor_step: f64) -> Result<(), WidgetError> {
        validate_steps(self.span(), major_step, minor_step)?;
        self.major_step = major_step;
        self.minor_step = minor_step;
        self.steps_explicit = true;
        Ok(())
    }

    /// Set the major step alone. The minor step is kept when the caller chose
    /// it and it still fits, otherwise it becomes a fifth of the major.
    pub fn set_major_step(&mut self, major_step: f64) -> Result<(), WidgetError> {
        let minor = if self.steps_explicit && self.minor_step <= major_step {
            self.minor_step
        } else {
            major_step / MINORS_PER_MAJOR
        };
        self.set_steps(major_step, minor)
    }

    /// Set the minor step alone. The major step is kept when the caller chose
    /// it and it still fits, otherwise it becomes five minors.
    pub fn set_minor_step(&mut self, minor_step: f64) -> Result<(), WidgetError> {
        let major = if self.steps_explicit && self.major_step >= minor_step {
            self.major_step
        } else {
            minor_step * MINORS_PER_MAJOR
        };
        self.set_steps(major, minor_step)
    }

    pub fn set_sweep(&mut self, start_angle_deg: f64, stop_angle_deg: f64) -> Result<(), WidgetError> {
        if !start_angle_deg.is_finite() || !stop_angle_deg.is_finite() {
            return Err(WidgetError::config("sweep angles must be finite"));
        }
        if start_angle_deg == stop_angle_deg {
            return Err(WidgetError::config("dial sweep must not be empty"));
        }
        self.start_angle_deg = start_angle_deg;
        self.stop_angle_deg = stop_angle_deg;
        Ok(())
    }

    /// Linear map of `v` onto the sweep, in radians. Not clamped.
    pub fn value_to_angle(&self, v: f64) -> f64 {
        let frac = (v - self.min_value) / self.span();
        (self.start_angle_deg + frac * (self.stop_angle_deg - self.start_angle_deg)).to_radians()
    }

    /// Point at `angle` whose distance from the dial edge is `radial_offset`
    /// (positive moves inward, negative outward).
    pub fn angle_to_point(&self, angle: f64, radial_offset: f64) -> (f64, f64) {
        let (cx, cy) = self.center();
        let r = self.radius() - radial_offset;
        (cx + r * angle.cos(), cy - r * angle.sin())
    }

    /// Same as [`angle_to_point`](Self::angle_to_point), snapped to the pixel grid.
    pub fn angle_to_pixel(&self, angle: f64, radial_offset: f64) -> Point {
        let (x, y) = self.angle_to_point(angle, radial_offset);
        Point::new(x.round() as i32, y.round() as i32)
    }

    pub fn center_pixel(&self) -> Point {
        let (x, y) = self.center();
        Point::new(x.round() as i32, y.round() as i32)
    }

    #[inline]
    pub fn clamp(&self, v: f64) -> f64 {
        v.max(self.min_value).min(self.max_value)
    }

    /// Needle angle; the value is clamped so the needle stays on the face.
    pub fn needle_angle(&self, v: f64) -> f64 {
        self.value_to_angle(self.clamp(v))
    }

    /// Readout fault check against the raw value. NaN counts as out of range.
    pub fn is_out_of_range(&self, v: f64) -> bool {
        !(self.min_value..=self.max_value).contains(&v)
    }

    /// Major ticks from `min` to `max` inclusive, each followed by its minors.
    pub fn ticks(&self) -> Vec<Tick> {
        let span = self.span();
        let n_major = (span / self.major_step + TICK_EPSILON).floor() as usize;
        let n_minor = (self.major_step / self.minor_step).round() as usize;
        let limit = self.max_value + TICK_EPSILON * span;

        let mut out = Vec::with_capacity((n_major + 1) * n_minor.max(1));
        for i in 0..=n_major {
            let major = self.min_value + i as f64 * self.major_step;
            out.push(Tick { value: major, major: true });
            for k in 1..n_minor {
                let value = major + k as f64 * self.minor_step;
                if value > limit || value < self.min_value {
                    break;
                }
                out.push(Tick { value, major: false });
            }
        }
        out
    }

    /// Polyline along the sweep at `radial_offset`, one point per degree.
    pub fn arc_points(&self, radial_offset: f64) -> Vec<Point> {
        let (a0, a1) = (self.start_angle_deg, self.stop_angle_deg);
        let steps = (a1 - a0).abs().ceil().max(1.0) as usize;
        (0..=steps)
            .map(|i| {
                let deg = a0 + (a1 - a0) * i as f64 / steps as f64;
                self.angle_to_pixel(deg.to_radians(), radial_offset)
            })
            .collect()
    }
}

/// Reject steps that would make tick generation degenerate or unbounded.
fn validate_steps(span: f64, major: f64, minor: f64) -> Result<(), WidgetError> {
    if !(major.is_finite() && major > 0.0) || !(minor.is_finite() && minor > 0.0) {
        return Err(WidgetError::config(format!(
            "tick steps must be positive (major {major}, minor {minor})"
        )));
    }
    if minor > major {
        return Err(WidgetError::config(format!(
            "minor step {minor} exceeds major step {major}"
        )));
    }
    let ratio = major / minor;
    let count = (span / major + 1.0) * ratio.round();
    if count > GAUGE_MAX_TICKS as f64 {
        return Err(WidgetError::config(format!(
            "steps produce {count:.0} ticks, limit is {GAUGE_MAX_TICKS}"
        )));
    }
    if (ratio - ratio.round()).abs() > 1e-6 {
        warn!("major step {major} is not a multiple of minor step {minor}");
    }
    Ok(())
}

/// Major tick label: two decimals, whole numbers from 10 upward.
pub fn format_tick_label(v: f64) -> ArrayString<24> {
    let mut out = ArrayString::new();
    let rounded = (v * 100.0).round() / 100.0 + 0.0;
    // an i64 or a two-decimal f64 always fits in 24 bytes
    if rounded.abs() >= 10.0 {
        write!(out, "{}", rounded.round() as i64).ok();
    } else {
        write!(out, "{:?}", rounded).ok();
    }
    out
}

/// Digits after the point for a readout on a scale of width `span`.
pub fn readout_precision(span: f64, n_digits: usize) -> usize {
    if span < 10.0 {
        n_digits
    } else if span < 100.0 {
        2
    } else {
        1
    }
}

/// Numeric readout for the dial, or `fault_token` when the raw value is
/// outside the scale. Positive values get a leading space.
pub fn format_readout(config: &GaugeConfig, v: f64, n_digits: usize, fault_token: &str) -> String {
    if config.is_out_of_range(v) {
        return fault_token.to_string();
    }
    let prec = readout_precision(config.span(), n_digits);
    let v = v + 0.0;
    if v > 0.0 {
        format!(" {v:.prec$}")
    } else {
        format!("{v:.prec$}")
    }
}
