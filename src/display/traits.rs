/*
 *  display/traits.rs
 *
 *  value-widgets - SCADA panel indicators
 *  (c) 2020-26 Stuart Hunter
 *
 *  Capability interface shared by every panel widget
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
use embedded_graphics::primitives::Rectangle;

use crate::display::render_state::RenderState;

/// Host query for the application-wide light/dark theme.
pub trait ThemeSource {
    fn is_dark(&self) -> bool;
}

impl ThemeSource for bool {
    fn is_dark(&self) -> bool {
        *self
    }
}

impl<F> ThemeSource for F
where
    F: Fn() -> bool,
{
    fn is_dark(&self) -> bool {
        self()
    }
}

/// Pointer activity forwarded by the host toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    /// Pointer entered the widget
    Enter,

    /// Pointer left the widget
    Leave,

    /// Pointer moved to a new position
    Move(Point),

    /// Primary button went down
    Press(Point),

    /// Primary button came up
    Release(Point),
}

impl PointerEvent {
    /// Position carried by the event, if any.
    pub fn position(&self) -> Option<Point> {
        match *self {
            PointerEvent::Move(p) | PointerEvent::Press(p) | PointerEvent::Release(p) => Some(p),
            PointerEvent::Enter | PointerEvent::Leave => None,
        }
    }
}

/// Everything the panel needs to schedule and paint a widget.
///
/// Setters on the concrete widgets only touch state and the dirty flag;
/// painting happens when the panel tick finds the widget dirty and visible.
pub trait Renderable {
    fn render_state(&self) -> &RenderState;

    fn render_state_mut(&mut self) -> &mut RenderState;

    /// Area the widget paints into, in target coordinates.
    fn bounds(&self) -> Rectangle;

    /// Force a repaint on the next tick.
    fn request_repaint(&mut self) {
        self.render_state_mut().mark_dirty();
    }

    fn is_visible(&self) -> bool {
        self.render_state().visible()
    }

    fn set_visible(&mut self, visible: bool) {
        self.render_state_mut().set_visible(visible);
    }

    /// Adopt the host theme; a change forces a repaint.
    fn set_dark(&mut self, dark: bool) {
        self.render_state_mut().sync_theme(dark);
    }

    /// React to pointer input. Returns true when the event was consumed.
    fn handle_pointer_event(&mut self, _event: PointerEvent, _now: Instant) -> bool {
        false
    }

    /// Per-tick state machines (animation, blinking, elapsed time).
    fn advance(&mut self, _now: Instant) {}

    /// Paint the current state. Must not touch the dirty flag.
    fn render<D>(&mut self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_theme_sources() {
        assert!(true.is_dark());
        let flag = Cell::new(false);
        let query = || flag.get();
        assert!(!query.is_dark());
        flag.set(true);
        assert!(query.is_dark());
    }

    #[test]
    fn test_event_position() {
        assert_eq!(PointerEvent::Press(Point::new(3, 4)).position(), Some(Point::new(3, 4)));
        assert_eq!(PointerEvent::Leave.position(), None);
    }
}
