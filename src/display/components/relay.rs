/*
 *  display/components/relay.rs
 *
 *  value-widgets - SCADA panel indicators
 *  (c) 2020-26 Stuart Hunter
 *
 *  Relay contact icon, optionally controllable
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
use crate::display::interaction::{InteractionState, TriggerMode};
use crate::display::render_state::RenderState;
use crate::display::traits::{PointerEvent, Renderable};
use crate::draw::{draw_line, draw_rounded_rect, draw_text_in_box};

const HOVER_ALPHA: u8 = 200;
const IDLE_ALPHA: u8 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayState {
    #[default]
    Open,
    Closed,
    Fault,
}

impl RelayState {
    pub fn color(self, colors: &ThemeColors) -> Rgb888 {
        match self {
            RelayState::Open => colors.idle,
            RelayState::Closed => colors.ok,
            RelayState::Fault => colors.alert,
        }
    }
}

impl From<bool> for RelayState {
    fn from(closed: bool) -> Self {
        if closed { RelayState::Closed } else { RelayState::Open }
    }
}

#[derive(Debug)]
pub struct Relay {
    state: RenderState,
    origin: Point,
    size: Size,
    label: String,
    relay_state: RelayState,
    interaction: InteractionState,
}

impl Relay {
    pub const DEFAULT_SIZE: Size = Size::new(100, 70);

    pub fn new(origin: Point, label: impl Into<String>) -> Self {
        Self {
            state: RenderState::new(DEFAULT_REDRAW_PERIOD_MS),
            origin,
            size: Self::DEFAULT_SIZE,
            label: label.into(),
            relay_state: RelayState::Open,
            interaction: InteractionState::inactive(),
        }
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    /// Accept pointer input; the toggle flips on release.
    pub fn controllable(mut self) -> Self {
        self.interaction = InteractionState::new(true, TriggerMode::OnRelease);
        self
    }

    pub fn relay_state(&self) -> RelayState { self.relay_state }
    pub fn label(&self) -> &str { &self.label }
    pub fn is_controllable(&self) -> bool { self.interaction.is_active() }

    /// Operator toggle; always false on display-only relays.
    pub fn toggle_state(&self) -> bool {
        self.interaction.toggle_state()
    }

    pub fn set_toggle_state(&mut self, on: bool) {
        if self.interaction.set_toggle_state(on) && self.interaction.is_active() {
            self.state.mark_dirty();
        }
    }

    /// `true` closes the contact.
    pub fn set_value(&mut self, closed: bool) {
        self.set_state(RelayState::from(closed));
    }

    pub fn set_state(&mut self, relay_state: RelayState) {
        self.state.apply(&mut self.relay_state, relay_state);
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
        self.state.mark_dirty();
    }
}

impl Renderable for Relay {
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
        let base = self.relay_state.color(colors);
        let fill = self.interaction.feedback(base, HOVER_ALPHA, IDLE_ALPHA).over(colors.window);
        let border = if self.state.dark() { base } else { Rgb888::BLACK };
        draw_rounded_rect(target, self.bounds(), 5, Some(fill), Some((border, 1)))?;

        let (x, y) = (self.origin.x, self.origin.y);
        let (w, h) = (self.size.width as i32, self.size.height as i32);
        let mid = y + h / 2;
        let contact = Rgb888::BLACK;

        draw_line(target, Point::new(x + 2, mid), Point::new(x + w / 3, mid), contact, 2)?;
        if self.relay_state != RelayState::Fault {
            draw_line(target, Point::new(x + w / 3, mid), Point::new(x + 2 * w / 3 + 2, mid - 20), contact, 2)?;
        }
        draw_line(target, Point::new(x + 2 * w / 3, mid), Point::new(x + w - 2, mid), contact, 2)?;
        if self.relay_state == RelayState::Closed {
            draw_line(target, Point::new(x + 2 * w / 3, mid), Point::new(x + 2 * w / 3, mid - 25), contact, 2)?;
        }

        let caption = Rectangle::new(Point::new(x, y + h - 25), Size::new(self.size.width, 20));
        draw_text_in_box(target, &self.label, caption, &FONT_6X10, colors.foreground)?;

        if self.interaction.is_active() {
            let marker = if self.interaction.toggle_state() { colors.ok } else { colors.idle };
            let square = Rectangle::new(Point::new(x + 5, y + 5), Size::new(10, 10));
            draw_rounded_rect(target, square, 2, Some(marker), None)?;
        }
        Ok(())
    }
}
