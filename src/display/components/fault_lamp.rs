/*
 *  display/components/fault_lamp.rs
 *
 *  value-widgets - SCADA panel indicators
 *  (c) 2020-26 Stuart Hunter
 *
 *  Round fault lamp with its name
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

use embedded_graphics::mono_font::ascii::FONT_7X13;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Alignment, Baseline};

use crate::constants::LAMP_REDRAW_PERIOD_MS;
use crate::display::render_state::RenderState;
use crate::display::traits::Renderable;
use crate::draw::{draw_text, text_size};

const LAMP_DIAMETER: u32 = 15;
const LAMP_HEIGHT: u32 = 20;
const NAME_GAP: u32 = 6;

#[derive(Debug)]
pub struct FaultLamp {
    state: RenderState,
    origin: Point,
    name: String,
    error: bool,
}

impl FaultLamp {
    pub fn new(origin: Point, name: impl Into<String>) -> Self {
        Self {
            state: RenderState::new(LAMP_REDRAW_PERIOD_MS),
            origin,
            name: name.into(),
            error: false,
        }
    }

    pub fn error(&self) -> bool { self.error }
    pub fn name(&self) -> &str { &self.name }

    pub fn set_error(&mut self, error: bool) {
        self.state.apply(&mut self.error, error);
    }

    pub fn set_origin(&mut self, origin: Point) {
        self.state.apply(&mut self.origin, origin);
    }
}

impl Renderable for FaultLamp {
    fn render_state(&self) -> &RenderState {
        &self.state
    }

    fn render_state_mut(&mut self) -> &mut RenderState {
        &mut self.state
    }

    /// Sized to the name.
    fn bounds(&self) -> Rectangle {
        let text_w = text_size(&self.name, &FONT_7X13).width;
        Rectangle::new(self.origin, Size::new(LAMP_DIAMETER + NAME_GAP + text_w, LAMP_HEIGHT))
    }

    fn render<D>(&mut self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let colors = self.state.colors();
        let (lamp, ink) = if self.error {
            (colors.alert, colors.foreground)
        } else {
            (colors.muted, colors.muted)
        };
        let top = ((LAMP_HEIGHT - LAMP_DIAMETER) / 2) as i32;
        Circle::new(self.origin + Point::new(0, top), LAMP_DIAMETER)
            .into_styled(PrimitiveStyle::with_fill(lamp))
            .draw(target)?;

        let at = self.origin + Point::new((LAMP_DIAMETER + NAME_GAP) as i32, LAMP_HEIGHT as i32 / 2);
        draw_text(target, &self.name, at, &FONT_7X13, ink, Alignment::Left, Baseline::Middle)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::color::ThemeColors;
    use crate::vframebuf::VarFrameBuf;

    #[test]
    fn test_error_marks_dirty_on_change() {
        let mut lamp = FaultLamp::new(Point::zero(), "Overheat");
        lamp.render_state_mut().complete_repaint();
        lamp.set_error(false);
        assert!(!lamp.render_state().dirty());
        lamp.set_error(true);
        assert!(lamp.render_state().dirty());
    }

    #[test]
    fn test_lamp_colour_follows_error() {
        let mut lamp = FaultLamp::new(Point::zero(), "Overheat");
        let mut fb = VarFrameBuf::new(100, 20, Rgb888::WHITE);
        lamp.render(&mut fb).unwrap();
        assert_eq!(fb.pixel(Point::new(7, 10)), Some(ThemeColors::LIGHT.muted));

        lamp.set_error(true);
        lamp.render(&mut fb).unwrap();
        assert_eq!(fb.pixel(Point::new(7, 10)), Some(ThemeColors::LIGHT.alert));
        assert!(fb.count(ThemeColors::LIGHT.foreground) > 0);
    }

    #[test]
    fn test_bounds_fit_name() {
        let lamp = FaultLamp::new(Point::new(3, 4), "AB");
        assert_eq!(lamp.bounds().size, Size::new(15 + 6 + 14, 20));
    }
}
