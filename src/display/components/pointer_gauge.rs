/*
 *  display/components/pointer_gauge.rs
 *
 *  value-widgets - SCADA panel indicators
 *  (c) 2020-26 Stuart Hunter
 *
 *  Round needle gauge with optional secondary needle
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

use std::time::Instant;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, PrimitiveStyle, Rectangle};
use log::warn;

use crate::constants::{
    DEFAULT_FAULT_TOKEN, GAUGE_DEFAULT_DIGITS, GAUGE_FAULT_BLINK_MS, GAUGE_PADDING, GAUGE_REDRAW_PERIOD_MS,
};
use crate::display::error::WidgetError;
use crate::display::gauge::{format_readout, format_tick_label, GaugeConfig};
use crate::display::render_state::RenderState;
use crate::display::traits::Renderable;
use crate::draw::{draw_line, draw_polyline, draw_text_centered, font_for_height};
use crate::pacer::PeriodicTimer;

/// Needle gauge over a 270 degree dial.
#[derive(Debug)]
pub struct PointerGauge {
    state: RenderState,
    config: GaugeConfig,
    value: f64,
    second_value: Option<f64>,
    label: String,
    units: String,
    n_digits: usize,
    show_frame: bool,
    show_arc: bool,
    display_value: bool,
    fault_token: String,
    blink: PeriodicTimer,
    blink_on: bool,
}

impl PointerGauge {
    /// Gauge whose dial square has its top-left at `origin`.
    pub fn new(origin: Point, diameter: u32, min_value: f64, max_value: f64) -> Result<Self, WidgetError> {
        Ok(Self {
            state: RenderState::new(GAUGE_REDRAW_PERIOD_MS),
            config: GaugeConfig::new(origin, diameter, min_value, max_value)?,
            value: 0.0,
            second_value: None,
            label: String::new(),
            units: String::new(),
            n_digits: GAUGE_DEFAULT_DIGITS,
            show_frame: false,
            show_arc: false,
            display_value: true,
            fault_token: DEFAULT_FAULT_TOKEN.to_string(),
            blink: PeriodicTimer::new(GAUGE_FAULT_BLINK_MS),
            blink_on: true,
        })
    }

    /// Enable the secondary needle at construction time.
    pub fn with_secondary_needle(mut self) -> Self {
        self.second_value = Some(0.0);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = units.into();
        self
    }

    pub fn config(&self) -> &GaugeConfig { &self.config }
    pub fn value(&self) -> f64 { self.value }
    pub fn second_value(&self) -> Option<f64> { self.second_value }
    pub fn has_secondary_needle(&self) -> bool { self.second_value.is_some() }

    pub fn set_value(&mut self, value: f64) {
        self.state.apply(&mut self.value, value);
    }

    /// Ignored unless the gauge was built with a secondary needle.
    pub fn set_second_value(&mut self, value: f64) {
        match self.second_value.as_mut() {
            Some(slot) => {
                self.state.apply(slot, value);
            }
            None => warn!("secondary value {} pushed to a gauge without a second needle", value),
        }
    }

    pub fn set_range(&mut self, min_value: f64, max_value: f64) -> Result<(), WidgetError> {
        self.config.set_range(min_value, max_value)?;
        self.state.mark_dirty();
        Ok(())
    }

    pub fn set_min_value(&mut self, min_value: f64) -> Result<(), WidgetError> {
        self.set_range(min_value, self.config.max_value())
    }

    pub fn set_max_value(&mut self, max_value: f64) -> Result<(), WidgetError> {
        self.set_range(self.config.min_value(), max_value)
    }

    pub fn set_steps(&mut self, major_step: f64, minor_step: f64) -> Result<(), WidgetError> {
        self.config.set_steps(major_step, minor_step)?;
        self.state.mark_dirty();
        Ok(())
    }

    pub fn set_major_step(&mut self, step: f64) -> Result<(), WidgetError> {
        self.config.set_major_step(step)?;
        self.state.mark_dirty();
        Ok(())
    }

    pub fn set_minor_step(&mut self, step: f64) -> Result<(), WidgetError> {
        self.config.set_minor_step(step)?;
        self.state.mark_dirty();
        Ok(())
    }

    pub fn set_sweep(&mut self, start_angle_deg: f64, stop_angle_deg: f64) -> Result<(), WidgetError> {
        self.config.set_sweep(start_angle_deg, stop_angle_deg)?;
        self.state.mark_dirty();
        Ok(())
    }

    pub fn set_geometry(&mut self, origin: Point, diameter: u32) -> Result<(), WidgetError> {
        self.config.set_geometry(origin, diameter)?;
        self.state.mark_dirty();
        Ok(())
    }

    /// Digits after the point for scales narrower than 10.
    pub fn set_n_digits(&mut self, n_digits: usize) {
        self.state.apply(&mut self.n_digits, n_digits);
    }

    pub fn set_label(&mut self, label: &str) {
        if self.label != label {
            self.label = label.to_string();
            self.state.mark_dirty();
        }
    }

    pub fn set_units(&mut self, units: &str) {
        if self.units != units {
            self.units = units.to_string();
            self.state.mark_dirty();
        }
    }

    pub fn set_fault_token(&mut self, token: &str) {
        if self.fault_token != token {
            self.fault_token = token.to_string();
            self.state.mark_dirty();
        }
    }

    pub fn set_blink_period(&mut self, period_ms: u64) {
        self.blink.set_period(period_ms);
    }

    pub fn draw_frame(&mut self, draw: bool) {
        self.state.apply(&mut self.show_frame, draw);
    }

    pub fn draw_arc(&mut self, draw: bool) {
        self.state.apply(&mut self.show_arc, draw);
    }

    /// Show tick labels and the numeric readout.
    pub fn display_value(&mut self, display: bool) {
        self.state.apply(&mut self.display_value, display);
    }

    /// Text the readout currently shows.
    pub fn readout(&self) -> String {
        format_readout(&self.config, self.value, self.n_digits, &self.fault_token)
    }

    fn frame_diameter(&self) -> u32 {
        (1.3 * self.config.diameter() as f64).round() as u32
    }

    /// Whether the blinking fault readout is in its lit half.
    pub fn fault_visible(&self) -> bool {
        self.blink_on
    }

    fn draw_scale<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let colors = self.state.colors();
        let d = self.config.diameter() as f64;
        let offset_minor = d / 30.0;
        let offset_major = d / 14.0;
        let offset_text = -d / 15.0;
        let font = font_for_height((d / 20.0).round() as u32);

        if self.show_arc {
            draw_polyline(target, &self.config.arc_points(0.0), colors.scale, 2)?;
        }

        for tick in self.config.ticks() {
            let angle = self.config.value_to_angle(tick.value);
            let outer = self.config.angle_to_pixel(angle, 0.0);
            let depth = if tick.major { offset_major } else { offset_minor };
            let inner = self.config.angle_to_pixel(angle, depth);
            draw_line(target, outer, inner, colors.scale, 2)?;

            if tick.major && self.display_value {
                let at = self.config.angle_to_pixel(angle, offset_text);
                draw_text_centered(target, &format_tick_label(tick.value), at, font, colors.foreground)?;
            }
        }
        Ok(())
    }

    fn draw_needles<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let colors = self.state.colors();
        let d = self.config.diameter() as f64;
        let width = (d / 110.0).round().max(1.0) as u32;
        let center = self.config.center_pixel();
        let tip_offset = d / 27.0;

        if let Some(second) = self.second_value {
            let tip = self.config.angle_to_pixel(self.config.needle_angle(second), tip_offset);
            draw_line(target, center, tip, colors.second_needle, width)?;
        }
        let tip = self.config.angle_to_pixel(self.config.needle_angle(self.value), tip_offset);
        draw_line(target, center, tip, colors.needle, width)?;

        let hub = ((d / 40.0).round() as u32).max(3);
        Circle::with_center(center, hub)
            .into_styled(PrimitiveStyle::with_fill(colors.scale))
            .draw(target)
    }

    fn draw_readout<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let colors = self.state.colors();
        let d = self.config.diameter() as f64;
        let r = self.config.radius();
        let (cx, cy) = self.config.center();
        let cx = cx.round() as i32;

        let units_at = Point::new(cx, (cy - r / 2.0 + d / 20.0).round() as i32);
        draw_text_centered(target, &self.units, units_at, font_for_height((d / 14.0) as u32), colors.muted)?;

        let faulted = self.config.is_out_of_range(self.value);
        if !faulted || self.blink_on {
            let color = if faulted { colors.alert } else { colors.foreground };
            let at = Point::new(cx, (cy + d / 5.0 + r / 8.0).round() as i32);
            draw_text_centered(target, &self.readout(), at, font_for_height((d / 12.0) as u32), color)?;
        }

        let label_at = Point::new(cx, (cy + d / 2.2 + d / 20.0).round() as i32);
        draw_text_centered(target, &self.label, label_at, font_for_height((d / 16.0) as u32), colors.foreground)
    }
}

impl Renderable for PointerGauge {
    fn render_state(&self) -> &RenderState {
        &self.state
    }

    fn render_state_mut(&mut self) -> &mut RenderState {
        &mut self.state
    }

    /// Dial bounds, grown when the frame disc reaches past the label padding.
    fn bounds(&self) -> Rectangle {
        let dial = self.config.bounds();
        if !self.show_frame {
            return dial;
        }
        let overhang = (self.frame_diameter() - self.config.diameter()) / 2 + 2;
        dial.offset(overhang.saturating_sub(GAUGE_PADDING) as i32)
    }

    /// Blink the fault readout while the value is off the scale.
    fn advance(&mut self, now: Instant) {
        if self.config.is_out_of_range(self.value) && self.display_value {
            if self.blink.expired_at(now) {
                self.blink.restart_at(now);
                self.blink_on = !self.blink_on;
                self.state.mark_dirty();
            }
        } else {
            self.blink.restart_at(now);
            self.state.apply(&mut self.blink_on, true);
        }
    }

    fn render<D>(&mut self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        if self.show_frame {
            let colors = self.state.colors();
            Circle::with_center(self.config.center_pixel(), self.frame_diameter())
                .into_styled(PrimitiveStyle::with_fill(colors.background))
                .draw(target)?;
        }
        self.draw_scale(target)?;
        self.draw_needles(target)?;
        if self.display_value {
            self.draw_readout(target)?;
        }
        Ok(())
    }
}
