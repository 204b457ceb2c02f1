/*
 *  display/components/state_label.rs
 *
 *  value-widgets - SCADA panel indicators
 *  (c) 2020-26 Stuart Hunter
 *
 *  Discrete state name on a coloured plate
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

use std::collections::BTreeMap;

use embedded_graphics::mono_font::ascii::FONT_9X15;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use log::debug;

use crate::constants::DEFAULT_REDRAW_PERIOD_MS;
use crate::display::color::contrast_color;
use crate::display::error::WidgetError;
use crate::display::render_state::RenderState;
use crate::display::traits::Renderable;
use crate::draw::{draw_rounded_rect, draw_text_in_box};

#[derive(Debug, Clone, PartialEq, Eq)]
struct DiscreteState {
    name: String,
    color: Rgb888,
}

/// Maps integer state codes to a name and plate colour.
#[derive(Debug)]
pub struct StateLabel {
    state: RenderState,
    origin: Point,
    size: Size,
    states: BTreeMap<i32, DiscreteState>,
    current: Option<i32>,
}

impl StateLabel {
    pub fn new(origin: Point, size: Size) -> Self {
        Self {
            state: RenderState::new(DEFAULT_REDRAW_PERIOD_MS),
            origin,
            size,
            states: BTreeMap::new(),
            current: None,
        }
    }

    /// Add (or redefine) a code. The first code registered becomes current.
    pub fn register(&mut self, value: i32, name: impl Into<String>, color: Rgb888) {
        let entry = DiscreteState { name: name.into(), color };
        let changed = self.states.insert(value, entry.clone()) != Some(entry);
        if self.current.is_none() {
            self.current = Some(value);
            self.state.mark_dirty();
        } else if changed && self.current == Some(value) {
            self.state.mark_dirty();
        }
    }

    /// Switch to a registered code; unknown codes leave the display as is.
    pub fn set_state(&mut self, value: i32) -> Result<(), WidgetError> {
        if !self.states.contains_key(&value) {
            return Err(WidgetError::UnknownState(value));
        }
        if self.current != Some(value) {
            debug!("state label {:?} -> {}", self.current, value);
            self.current = Some(value);
            self.state.mark_dirty();
        }
        Ok(())
    }

    pub fn current(&self) -> Option<i32> {
        self.current
    }

    pub fn text(&self) -> Option<&str> {
        self.current_entry().map(|s| s.name.as_str())
    }

    pub fn fill_color(&self) -> Option<Rgb888> {
        self.current_entry().map(|s| s.color)
    }

    pub fn set_geometry(&mut self, origin: Point, size: Size) {
        self.origin = origin;
        self.size = size;
        self.state.mark_dirty();
    }

    fn current_entry(&self) -> Option<&DiscreteState> {
        self.current.and_then(|v| self.states.get(&v))
    }
}

impl Renderable for StateLabel {
    fn render_state(&self) -> &RenderState {
        &self.state
    }

    fn render_state_mut(&mut self) -> &mut RenderState {
        &mut self.state
    }

    fn bounds(&self) -> Rectangle {
        Rectangle::new(self.origin, self.size)
    }

    fn render<D>(&mut self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let Some(entry) = self.current_entry() else {
            return Ok(());
        };
        draw_rounded_rect(target, self.bounds(), 5, Some(entry.color), None)?;
        draw_text_in_box(target, &entry.name, self.bounds(), &FONT_9X15, contrast_color(entry.color))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vframebuf::VarFrameBuf;

    fn label() -> StateLabel {
        let mut l = StateLabel::new(Point::zero(), Size::new(120, 30));
        l.register(0, "Stopped", Rgb888::new(128, 128, 128));
        l.register(1, "Running", Rgb888::new(0, 176, 0));
        l
    }

    #[test]
    fn test_first_registered_is_current() {
        let l = label();
        assert_eq!(l.current(), Some(0));
        assert_eq!(l.text(), Some("Stopped"));
    }

    #[test]
    fn test_unknown_state_is_rejected() {
        let mut l = label();
        l.render_state_mut().complete_repaint();
        assert_eq!(l.set_state(99), Err(WidgetError::UnknownState(99)));
        assert_eq!(l.text(), Some("Stopped"));
        assert!(!l.render_state().dirty());
    }

    #[test]
    fn test_same_state_is_noop() {
        let mut l = label();
        l.set_state(1).unwrap();
        l.render_state_mut().complete_repaint();
        l.set_state(1).unwrap();
        assert!(!l.render_state().dirty());
        assert_eq!(l.fill_color(), Some(Rgb888::new(0, 176, 0)));
    }

    #[test]
    fn test_text_contrasts_with_plate() {
        let mut l = StateLabel::new(Point::zero(), Size::new(120, 30));
        l.register(5, "HIGH", Rgb888::new(250, 250, 250));
        let mut fb = VarFrameBuf::new(120, 30, Rgb888::new(1, 2, 3));
        l.render(&mut fb).unwrap();
        assert!(fb.count(Rgb888::BLACK) > 0);
        assert_eq!(fb.pixel(Point::new(60, 2)), Some(Rgb888::new(250, 250, 250)));
    }
}
