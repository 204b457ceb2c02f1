/*
 *  display/components/value_bar.rs
 *
 *  value-widgets - SCADA panel indicators
 *  (c) 2020-26 Stuart Hunter
 *
 *  Single-value bar with caption, readout and reference marker
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

use embedded_graphics::mono_font::ascii::{FONT_6X10, FONT_7X13, FONT_9X15};
use embedded_graphics::mono_font::MonoFont;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::text::{Alignment, Baseline};

use crate::constants::{BAR_CAPTION_HEIGHT, BAR_MARGIN_TOP, DEFAULT_FAULT_TOKEN, DEFAULT_REDRAW_PERIOD_MS};
use crate::display::color::Rgba;
use crate::display::error::WidgetError;
use crate::display::linear::{format_axis_label, format_bar_readout, AutoMargin, LinearScale, Orientation};
use crate::display::render_state::RenderState;
use crate::display::traits::Renderable;
use crate::draw::{draw_line, draw_text, draw_text_in_box, fill_rect, font_for_height, rect_from_corners, text_size};

const ZERO_LINE: Rgb888 = Rgb888::new(150, 150, 150);
const LABEL_FONT: &MonoFont<'static> = &FONT_6X10;

/// Horizontal or vertical bar for one scalar value.
///
/// `origin`/`size` describe the bar area; the widget grows to the left
/// and upward to make room for the scheme number, axis labels and caption.
#[derive(Debug)]
pub struct ValueBar {
    state: RenderState,
    scale: LinearScale,
    orientation: Orientation,
    origin: Point,
    size: Size,
    margin: AutoMargin,
    value: f64,
    reference: Option<f64>,
    scheme_number: String,
    label: String,
    units: String,
    color: Option<Rgba>,
    draw_ticks: bool,
    fault_token: String,
}

impl ValueBar {
    pub fn new(origin: Point, size: Size, min_value: f64, max_value: f64) -> Result<Self, WidgetError> {
        if size.width == 0 || size.height == 0 {
            return Err(WidgetError::config("bar size must be positive"));
        }
        let mut bar = Self {
            state: RenderState::new(DEFAULT_REDRAW_PERIOD_MS),
            scale: LinearScale::new(min_value, max_value)?,
            orientation: Orientation::Horizontal,
            origin,
            size,
            margin: AutoMargin::new(0, BAR_MARGIN_TOP),
            value: 0.0,
            reference: None,
            scheme_number: String::new(),
            label: String::new(),
            units: String::new(),
            color: None,
            draw_ticks: false,
            fault_token: DEFAULT_FAULT_TOKEN.to_string(),
        };
        bar.relayout();
        Ok(bar)
    }

    pub fn value(&self) -> f64 { self.value }
    pub fn reference(&self) -> Option<f64> { self.reference }
    pub fn scale(&self) -> &LinearScale { &self.scale }
    pub fn orientation(&self) -> Orientation { self.orientation }
    pub fn margin(&self) -> AutoMargin { self.margin }

    pub fn set_value(&mut self, value: f64) {
        self.state.apply(&mut self.value, value);
    }

    /// Show a marker at `value`; drawn only while it lies on the scale.
    pub fn set_reference_value(&mut self, value: f64) {
        self.state.apply(&mut self.reference, Some(value));
    }

    pub fn clear_reference_value(&mut self) {
        self.state.apply(&mut self.reference, None);
    }

    pub fn set_range(&mut self, min_value: f64, max_value: f64) -> Result<(), WidgetError> {
        let scale = LinearScale::new(min_value, max_value)?;
        if self.state.apply(&mut self.scale, scale) {
            self.relayout();
        }
        Ok(())
    }

    pub fn set_min_value(&mut self, min_value: f64) -> Result<(), WidgetError> {
        self.set_range(min_value, self.scale.max())
    }

    pub fn set_max_value(&mut self, max_value: f64) -> Result<(), WidgetError> {
        self.set_range(self.scale.min(), max_value)
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        if self.state.apply(&mut self.orientation, orientation) {
            self.relayout();
        }
    }

    pub fn set_vertical(&mut self, vertical: bool) {
        self.set_orientation(if vertical { Orientation::Vertical } else { Orientation::Horizontal });
    }

    pub fn set_geometry(&mut self, origin: Point, size: Size) -> Result<(), WidgetError> {
        if size.width == 0 || size.height == 0 {
            return Err(WidgetError::config("bar size must be positive"));
        }
        self.origin = origin;
        self.size = size;
        self.relayout();
        self.state.mark_dirty();
        Ok(())
    }

    pub fn set_scheme_number(&mut self, text: &str) {
        if self.scheme_number != text {
            self.scheme_number = text.to_string();
            self.relayout();
            self.state.mark_dirty();
        }
    }

    pub fn set_label(&mut self, text: &str) {
        if self.label != text {
            self.label = text.to_string();
            self.relayout();
            self.state.mark_dirty();
        }
    }

    pub fn set_units(&mut self, units: &str) {
        if self.units != units {
            self.units = units.to_string();
            self.state.mark_dirty();
        }
    }

    pub fn set_color(&mut self, color: Rgb888) {
        self.state.apply(&mut self.color, Some(Rgba::opaque(color)));
    }

    pub fn set_color_rgba(&mut self, color: Rgba) {
        self.state.apply(&mut self.color, Some(color));
    }

    pub fn set_draw_ticks(&mut self, draw: bool) {
        if self.state.apply(&mut self.draw_ticks, draw) {
            self.relayout();
        }
    }

    pub fn set_fault_token(&mut self, token: &str) {
        if self.fault_token != token {
            self.fault_token = token.to_string();
            self.state.mark_dirty();
        }
    }

    /// Readout text for the current value.
    pub fn readout(&self) -> String {
        if !self.scale.contains(self.value) {
            return self.fault_token.clone();
        }
        let units = (!self.vertical() && !self.units.is_empty()).then_some(self.units.as_str());
        format_bar_readout(self.value, &self.scale, units)
    }

    fn vertical(&self) -> bool {
        self.orientation == Orientation::Vertical
    }

    fn scheme_font(&self) -> &'static MonoFont<'static> {
        if self.vertical() {
            font_for_height(self.size.width / 6)
        } else {
            &FONT_7X13
        }
    }

    /// Values of the axis ticks, top (or left) first.
    fn tick_values(&self) -> [f64; 5] {
        let (max, span) = (self.scale.max(), self.scale.span());
        core::array::from_fn(|i| max - i as f64 * span / 4.0)
    }

    /// Grow the margins to fit every piece of text currently configured.
    fn relayout(&mut self) {
        let w_scheme = text_size(&self.scheme_number, self.scheme_font()).width;
        if w_scheme > 0 {
            self.margin.grow_left(w_scheme + 10);
        }
        if self.vertical() {
            let h = LABEL_FONT.character_size.height;
            self.margin.grow_top(h + 5);
            if self.draw_ticks {
                for (i, v) in self.tick_values().iter().enumerate() {
                    if i % 2 == 0 {
                        let w = text_size(&format_axis_label(*v), LABEL_FONT).width;
                        self.margin.grow_left(w + 10);
                    }
                }
            }
        }
    }

    /// Bar area; horizontal bars leave room for the caption strip.
    fn plot_area(&self) -> Rectangle {
        let h = if self.vertical() {
            self.size.height
        } else {
            self.size.height.saturating_sub(BAR_CAPTION_HEIGHT)
        };
        Rectangle::new(self.origin, Size::new(self.size.width, h))
    }

    fn draw_values<D>(&self, target: &mut D, plot: &Rectangle) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let colors = self.state.colors();
        let fill = self.color.unwrap_or(colors.bar).over(colors.background);
        let (x0, y0) = (plot.top_left.x as f32, plot.top_left.y as f32);
        let (w, h) = (plot.size.width as f32, plot.size.height as f32);

        if self.vertical() {
            let (top, bottom) = self.scale.bar_extent(self.value, y0 + h, y0);
            fill_rect(target, rect_from_corners(x0, top, x0 + w, bottom), fill)?;
            if let Some(r) = self.reference.filter(|r| self.scale.contains(*r)) {
                let y = self.scale.to_pixel(r, y0 + h, y0).round() as i32;
                draw_line(target, Point::new(x0 as i32, y), Point::new((x0 + w) as i32, y), colors.reference, 2)?;
            }
        } else {
            let zero_x = self.scale.to_pixel(self.scale.origin_value(), x0, x0 + w);
            if zero_x > x0 {
                let x = zero_x.round() as i32;
                draw_line(target, Point::new(x, y0 as i32 + 5), Point::new(x, (y0 + h) as i32 - 5), ZERO_LINE, 1)?;
            }
            let (left, right) = self.scale.bar_extent(self.value, x0, x0 + w);
            fill_rect(target, rect_from_corners(left, y0, right, y0 + h), fill)?;
            if let Some(r) = self.reference.filter(|r| self.scale.contains(*r)) {
                let x = self.scale.to_pixel(r, x0, x0 + w).round() as i32;
                draw_line(target, Point::new(x, y0 as i32 + 2), Point::new(x, (y0 + h) as i32 + 8), colors.reference, 2)?;
            }
        }
        Ok(())
    }

    fn draw_axes<D>(&self, target: &mut D, plot: &Rectangle) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let colors = self.state.colors();
        let x0 = plot.top_left.x;
        let y0 = plot.top_left.y;
        if self.vertical() {
            let step = self.size.height as f32 / 4.0;
            for (i, v) in self.tick_values().iter().enumerate() {
                let y = (y0 as f32 + i as f32 * step).round() as i32;
                draw_line(target, Point::new(x0 - 3, y), Point::new(x0 - 8, y), colors.scale, 1)?;
                if i % 2 == 0 {
                    let at = Point::new(x0 - 10, y);
                    draw_text(target, &format_axis_label(*v), at, LABEL_FONT, colors.scale, Alignment::Right, Baseline::Middle)?;
                }
            }
        } else {
            let span = self.size.width.saturating_sub(50) as i32;
            let step = (span / 8).max(1);
            for (i, x) in (x0..=x0 + span).step_by(step as usize).enumerate() {
                let top = if i % 2 == 0 { y0 - 8 } else { y0 - 6 };
                draw_line(target, Point::new(x, top), Point::new(x, y0 - 3), colors.scale, 1)?;
            }
        }
        Ok(())
    }
}

impl Renderable for ValueBar {
    fn render_state(&self) -> &RenderState {
        &self.state
    }

    fn render_state_mut(&mut self) -> &mut RenderState {
        &mut self.state
    }

    fn bounds(&self) -> Rectangle {
        let (left, top) = (self.margin.left(), self.margin.top());
        Rectangle::new(
            self.origin - Point::new(left as i32, top as i32),
            Size::new(self.size.width + left, self.size.height + 2 * top),
        )
    }

    fn render<D>(&mut self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let colors = self.state.colors();
        let plot = self.plot_area();
        let bounds = self.bounds();

        fill_rect(target, plot, colors.background)?;

        if !self.scheme_number.is_empty() {
            let at = Point::new(bounds.top_left.x, self.origin.y + 5);
            draw_text(target, &self.scheme_number, at, self.scheme_font(), colors.scale, Alignment::Left, Baseline::Top)?;
        }

        self.draw_values(target, &plot)?;

        let in_range = self.scale.contains(self.value);
        let (font, color) = if in_range {
            (&FONT_7X13, colors.foreground)
        } else {
            (&FONT_9X15, colors.alert)
        };
        draw_text_in_box(target, &self.readout(), plot, font, color)?;

        if self.vertical() {
            let caption = if self.units.is_empty() {
                self.label.clone()
            } else {
                format!("{}, {}", self.label, self.units)
            };
            let at = Point::new(self.origin.x, self.origin.y - 5);
            draw_text(target, &caption, at, LABEL_FONT, colors.foreground, Alignment::Left, Baseline::Bottom)?;
        } else {
            let at = Point::new(self.origin.x, self.origin.y + self.size.height as i32 - 5);
            draw_text(target, &self.label, at, LABEL_FONT, colors.foreground, Alignment::Left, Baseline::Bottom)?;
        }

        if self.draw_ticks {
            self.draw_axes(target, &plot)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vframebuf::VarFrameBuf;

    fn bar() -> ValueBar {
        ValueBar::new(Point::new(60, 20), Size::new(200, 60), 0.0, 100.0).unwrap()
    }

    #[test]
    fn test_rejects_bad_config() {
        assert!(ValueBar::new(Point::zero(), Size::new(10, 10), 1.0, 1.0).is_err());
        assert!(ValueBar::new(Point::zero(), Size::new(0, 10), 0.0, 1.0).is_err());
        let mut b = bar();
        assert!(b.set_max_value(-1.0).is_err());
        assert_eq!(b.scale().max(), 100.0);
    }

    #[test]
    fn test_initial_bounds() {
        let b = bar();
        assert_eq!(b.bounds(), Rectangle::new(Point::new(60, 10), Size::new(200, 80)));
    }

    #[test]
    fn test_scheme_number_grows_left_margin_only() {
        let mut b = bar();
        b.set_scheme_number("P-101");
        let grown = b.margin().left();
        assert_eq!(grown, 5 * 7 + 10);
        assert_eq!(b.bounds().top_left.x, 60 - grown as i32);

        b.set_scheme_number("P1");
        assert_eq!(b.margin().left(), grown);
    }

    #[test]
    fn test_vertical_ticks_grow_margins() {
        let mut b = ValueBar::new(Point::new(60, 40), Size::new(40, 200), -1000.0, 1000.0).unwrap();
        b.set_vertical(true);
        assert_eq!(b.margin().top(), 15);
        b.set_draw_ticks(true);
        // widest even tick label is "-1000"
        assert_eq!(b.margin().left(), 5 * 6 + 10);
    }

    #[test]
    fn test_readout_units_and_fault() {
        let mut b = bar();
        b.set_units("kPa");
        b.set_value(42.0);
        assert_eq!(b.readout(), "42.00 [kPa]");
        b.set_vertical(true);
        assert_eq!(b.readout(), "42.00");
        b.set_value(120.0);
        assert_eq!(b.readout(), DEFAULT_FAULT_TOKEN);
    }

    #[test]
    fn test_reference_marks_dirty_once() {
        let mut b = bar();
        b.render_state_mut().complete_repaint();
        b.set_reference_value(30.0);
        assert!(b.render_state().dirty());
        b.render_state_mut().complete_repaint();
        b.set_reference_value(30.0);
        assert!(!b.render_state().dirty());
    }

    #[test]
    fn test_render_fills_bar_and_marker() {
        let mut b = bar();
        b.set_color(Rgb888::new(0, 0, 200));
        b.set_value(50.0);
        b.set_reference_value(75.0);
        let mut fb = VarFrameBuf::new(300, 120, Rgb888::BLACK);
        b.render(&mut fb).unwrap();

        let fill = Rgb888::new(0, 0, 200);
        // bar covers x 60..160, plot rows 20..58
        assert_eq!(fb.pixel(Point::new(65, 22)), Some(fill));
        assert_eq!(fb.pixel(Point::new(200, 22)), Some(b.render_state().colors().background));
        assert!(fb.count(b.render_state().colors().reference) > 0);
    }
}
