/*
 *  display/components/valve.rs
 *
 *  value-widgets - SCADA panel indicators
 *  (c) 2020-26 Stuart Hunter
 *
 *  Bow-tie valve icon, optionally controllable
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

use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use serde::Deserialize;

use crate::constants::DEFAULT_REDRAW_PERIOD_MS;
use crate::display::color::ThemeColors;
use crate::display::error::WidgetError;
use crate::display::interaction::{InteractionState, TriggerMode};
use crate::display::render_state::RenderState;
use crate::display::traits::{PointerEvent, Renderable};
use crate::draw::{draw_line, draw_rounded_rect, draw_text_in_box, draw_triangle};

const HOVER_ALPHA: u8 = 255;
const IDLE_ALPHA: u8 = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValveState {
    #[default]
    Unknown,
    Closed,
    Open,
    Fault,
}

impl ValveState {
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Body fill; an unknown valve is drawn as an outline only.
    pub fn color(self, colors: &ThemeColors) -> Option<Rgb888> {
        match self {
            ValveState::Unknown => None,
            ValveState::Closed => Some(colors.idle),
            ValveState::Open => Some(colors.ok),
            ValveState::Fault => Some(colors.alert),
        }
    }
}

impl TryFrom<u8> for ValveState {
    type Error = WidgetError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(ValveState::Unknown),
            1 => Ok(ValveState::Closed),
            2 => Ok(ValveState::Open),
            3 => Ok(ValveState::Fault),
            other => Err(WidgetError::UnknownState(other as i32)),
        }
    }
}

/// Icon outline in widget-local float pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ValveShape {
    offset_x: f32,
    offset_y: f32,
    xs: [f32; 5],
    ys: [f32; 5],
}

impl ValveShape {
    fn for_size(size: Size) -> Self {
        let (w, h) = (size.width as f32, size.height as f32);
        let (ox, oy) = (w / 6.0, h / 5.0);
        Self {
            offset_x: ox,
            offset_y: oy,
            xs: [ox, ox, w / 3.0 + ox, w * 2.0 / 3.0 + ox, w * 2.0 / 3.0 + ox],
            ys: [oy, h / 2.0 + oy, h / 4.0 + oy, oy, h / 2.0 + oy],
        }
    }

    fn vertex(&self, origin: Point, i: usize) -> Point {
        origin + Point::new(self.xs[i].round() as i32, self.ys[i].round() as i32)
    }
}

#[derive(Debug)]
pub struct Valve {
    state: RenderState,
    origin: Point,
    size: Size,
    shape: ValveShape,
    label: String,
    valve_state: ValveState,
    interaction: InteractionState,
}

impl Valve {
    pub const DEFAULT_SIZE: Size = Size::new(120, 80);

    pub fn new(origin: Point, label: impl Into<String>) -> Self {
        Self {
            state: RenderState::new(DEFAULT_REDRAW_PERIOD_MS),
            origin,
            size: Self::DEFAULT_SIZE,
            shape: ValveShape::for_size(Self::DEFAULT_SIZE),
            label: label.into(),
            valve_state: ValveState::Unknown,
            interaction: InteractionState::inactive(),
        }
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self.shape = ValveShape::for_size(size);
        self
    }

    /// Accept pointer input; the toggle flips on press.
    pub fn controllable(mut self) -> Self {
        self.interaction = InteractionState::new(true, TriggerMode::OnPress);
        self
    }

    pub fn valve_state(&self) -> ValveState { self.valve_state }
    pub fn label(&self) -> &str { &self.label }
    pub fn is_controllable(&self) -> bool { self.interaction.is_active() }

    pub fn toggle_state(&self) -> bool {
        self.interaction.toggle_state()
    }

    pub fn set_toggle_state(&mut self, on: bool) {
        if self.interaction.set_toggle_state(on) && self.interaction.is_active() {
            self.state.mark_dirty();
        }
    }

    pub fn set_state(&mut self, valve_state: ValveState) {
        self.state.apply(&mut self.valve_state, valve_state);
    }

    /// Numeric state code as sent by the field device.
    pub fn set_state_code(&mut self, code: u8) -> Result<(), WidgetError> {
        self.set_state(ValveState::try_from(code)?);
        Ok(())
    }

    pub fn set_label(&mut self, label: &str) {
        if self.label != label {
            self.label = label.to_string();
            self.state.mark_dirty();
        }
    }

    pub fn set_geometry(&mut self, origin: Point, size: Size) {
        self.origin = origin;
        self.size = size;
        self.shape = ValveShape::for_size(size);
        self.state.mark_dirty();
    }

    fn draw_flow_arrow<D>(&self, target: &mut D, color: Rgb888) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let w = self.size.width as f32;
        let y = self.shape.offset_y / 2.0;
        let tail = self.shape.xs[0] + w / 6.0;
        let tip = self.shape.xs[3] - w / 6.0;
        let barb = self.shape.xs[3] - w / 4.0;
        let at = |x: f32, y: f32| self.origin + Point::new(x.round() as i32, y.round() as i32);

        draw_line(target, at(tail, y + 5.0), at(tip, y + 5.0), color, 1)?;
        draw_line(target, at(tip, y + 5.0), at(barb, y), color, 1)?;
        draw_line(target, at(tip, y + 5.0), at(barb, y + 10.0), color, 1)
    }
}

impl Renderable for Valve {
    fn render_state(&self) -> &RenderState {
        &self.state
    }

    fn render_state_mut(&mut self) -> &mut RenderState {
        &mut self.state
    }

    fn bounds(&self) -> Rectangle {
        Rectangle::new(self.origin, self.size)
    }

    fn handle_pointer_event(&mut self, event: PointerEvent, _now: Instant) -> bool {
        let bounds = self.bounds();
        let repaint = self.interaction.handle(event, &bounds);
        if repaint {
            self.state.mark_dirty();
        }
        repaint
    }

    fn render<D>(&mut self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let colors = self.state.colors();
        let dark = self.state.dark();
        let body = self.valve_state.color(colors);
        let outline = match body {
            Some(c) if dark => c,
            None if dark => colors.muted,
            _ => Rgb888::BLACK,
        };
        let fill = body.map(|c| self.interaction.feedback(c, HOVER_ALPHA, IDLE_ALPHA).over(colors.window));

        if self.valve_state == ValveState::Open {
            let arrow = if dark { colors.muted } else { Rgb888::BLACK };
            self.draw_flow_arrow(target, arrow)?;
        }

        let v = |i| self.shape.vertex(self.origin, i);
        draw_triangle(target, [v(0), v(1), v(2)], fill, Some((outline, 1)))?;
        draw_triangle(target, [v(2), v(3), v(4)], fill, Some((outline, 1)))?;

        let stem_y = v(2).y;
        let ox = self.shape.offset_x.round() as i32;
        draw_line(target, Point::new(self.origin.x + 2, stem_y), Point::new(self.origin.x + ox, stem_y), outline, 1)?;
        draw_line(target, Point::new(v(3).x, stem_y), Point::new(v(3).x + ox - 2, stem_y), outline, 1)?;

        let (x, y) = (self.origin.x, self.origin.y);
        let caption = Rectangle::new(Point::new(x, y + self.size.height as i32 - 20), Size::new(self.size.width, 20));
        draw_text_in_box(target, &self.label, caption, &FONT_6X10, colors.foreground)?;

        if self.interaction.is_active() {
            let marker = if self.interaction.toggle_state() { colors.ok } else { colors.idle };
            let square = Rectangle::new(Point::new(x + 2, y + 2), Size::new(10, 10));
            draw_rounded_rect(target, square, 2, Some(marker), None)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::color::Rgba;
    use crate::vframebuf::VarFrameBuf;

    #[test]
    fn test_state_codes() {
        assert_eq!(ValveState::try_from(2), Ok(ValveState::Open));
        assert_eq!(ValveState::Fault.code(), 3);
        assert_eq!(ValveState::try_from(4), Err(WidgetError::UnknownState(4)));
    }

    #[test]
    fn test_bad_code_keeps_state() {
        let mut valve = Valve::new(Point::zero(), "V1");
        valve.set_state_code(1).unwrap();
        valve.render_state_mut().complete_repaint();
        assert!(valve.set_state_code(7).is_err());
        assert_eq!(valve.valve_state(), ValveState::Closed);
        assert!(!valve.render_state().dirty());
    }

    #[test]
    fn test_controllable_valve_toggles_on_press() {
        let now = Instant::now();
        let mut valve = Valve::new(Point::zero(), "V1").controllable();
        valve.handle_pointer_event(PointerEvent::Press(Point::new(60, 40)), now);
        assert!(valve.toggle_state());
        valve.handle_pointer_event(PointerEvent::Release(Point::new(60, 40)), now);
        assert!(valve.toggle_state());
    }

    #[test]
    fn test_open_valve_body_fill() {
        let mut valve = Valve::new(Point::zero(), "");
        valve.set_state(ValveState::Open);
        let window = ThemeColors::LIGHT.window;
        let mut fb = VarFrameBuf::new(120, 80, window);
        valve.render(&mut fb).unwrap();
        let body = Rgba::opaque(ThemeColors::LIGHT.ok).with_alpha(IDLE_ALPHA).over(window);
        assert_eq!(fb.pixel(Point::new(30, 36)), Some(body));
        assert_eq!(fb.pixel(Point::new(90, 36)), Some(body));
    }

    #[test]
    fn test_unknown_valve_is_outline_only() {
        let mut valve = Valve::new(Point::zero(), "");
        let window = ThemeColors::LIGHT.window;
        let mut fb = VarFrameBuf::new(120, 80, window);
        valve.render(&mut fb).unwrap();
        assert_eq!(fb.pixel(Point::new(30, 36)), Some(window));
        assert!(fb.count(Rgb888::BLACK) > 0);
    }
}
