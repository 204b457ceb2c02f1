/*
 *  display/interaction.rs
 *
 *  value-widgets - SCADA panel indicators
 *  (c) 2020-26 Stuart Hunter
 *
 *  Press/release toggle semantics for controllable icons
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

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use log::debug;
use serde::Deserialize;

use crate::display::color::Rgba;
use crate::display::traits::PointerEvent;

/// When the toggle flips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerMode {
    OnPress,
    #[default]
    OnRelease,
}

/// Pointer state of a controllable widget.
///
/// An inactive widget is a pure display: it ignores events and reports
/// neither hover, press nor toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionState {
    active: bool,
    pressed: bool,
    hovered: bool,
    toggle_state: bool,
    trigger_mode: TriggerMode,
}

impl InteractionState {
    pub fn new(active: bool, trigger_mode: TriggerMode) -> Self {
        Self {
            active,
            pressed: false,
            hovered: false,
            toggle_state: false,
            trigger_mode,
        }
    }

    /// Display-only state.
    pub fn inactive() -> Self {
        Self::new(false, TriggerMode::default())
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn trigger_mode(&self) -> TriggerMode {
        self.trigger_mode
    }

    pub fn pressed(&self) -> bool {
        self.active && self.pressed
    }

    pub fn hovered(&self) -> bool {
        self.active && self.hovered
    }

    pub fn toggle_state(&self) -> bool {
        self.active && self.toggle_state
    }

    /// Set the toggle from code. Returns whether it changed.
    pub fn set_toggle_state(&mut self, state: bool) -> bool {
        let changed = self.toggle_state != state;
        self.toggle_state = state;
        changed
    }

    /// Feed a pointer event. Returns true when the widget should repaint.
    pub fn handle(&mut self, event: PointerEvent, bounds: &Rectangle) -> bool {
        if !self.active {
            return false;
        }
        match event {
            PointerEvent::Enter => {
                self.hovered = true;
                true
            }
            PointerEvent::Leave => {
                self.hovered = false;
                true
            }
            PointerEvent::Move(p) => {
                let inside = bounds.contains(p);
                let changed = inside != self.hovered;
                self.hovered = inside;
                changed
            }
            PointerEvent::Press(p) => {
                if !bounds.contains(p) {
                    return false;
                }
                self.pressed = true;
                self.hovered = true;
                if self.trigger_mode == TriggerMode::OnPress {
                    self.flip();
                }
                true
            }
            PointerEvent::Release(_) => {
                if !self.pressed {
                    return false;
                }
                self.pressed = false;
                if self.trigger_mode == TriggerMode::OnRelease {
                    self.flip();
                }
                true
            }
        }
    }

    /// Fill colour with hover/press feedback applied.
    pub fn feedback(&self, base: Rgb888, hover_alpha: u8, idle_alpha: u8) -> Rgba {
        let alpha = if self.hovered() { hover_alpha } else { idle_alpha };
        let color = Rgba::opaque(base).with_alpha(alpha);
        if self.pressed() { color.lighter(120) } else { color }
    }

    fn flip(&mut self) {
        self.toggle_state = !self.toggle_state;
        debug!("control toggled to {}", self.toggle_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area() -> Rectangle {
        Rectangle::new(Point::new(10, 10), Size::new(100, 70))
    }

    #[test]
    fn test_release_mode_flips_on_release() {
        let mut st = InteractionState::new(true, TriggerMode::OnRelease);
        assert!(st.handle(PointerEvent::Press(Point::new(20, 20)), &area()));
        assert!(st.pressed());
        assert!(!st.toggle_state());
        assert!(st.handle(PointerEvent::Release(Point::new(20, 20)), &area()));
        assert!(!st.pressed());
        assert!(st.toggle_state());
    }

    #[test]
    fn test_press_mode_flips_on_press() {
        let mut st = InteractionState::new(true, TriggerMode::OnPress);
        st.handle(PointerEvent::Press(Point::new(20, 20)), &area());
        assert!(st.toggle_state());
        st.handle(PointerEvent::Release(Point::new(20, 20)), &area());
        assert!(st.toggle_state());
        st.handle(PointerEvent::Press(Point::new(20, 20)), &area());
        assert!(!st.toggle_state());
    }

    #[test]
    fn test_press_outside_is_ignored() {
        let mut st = InteractionState::new(true, TriggerMode::OnPress);
        assert!(!st.handle(PointerEvent::Press(Point::new(0, 0)), &area()));
        assert!(!st.pressed());
        assert!(!st.handle(PointerEvent::Release(Point::new(0, 0)), &area()));
    }

    #[test]
    fn test_hover_only_requests_repaint() {
        let mut st = InteractionState::new(true, TriggerMode::OnRelease);
        assert!(st.handle(PointerEvent::Enter, &area()));
        assert!(st.hovered());
        assert!(!st.toggle_state());
        assert!(!st.handle(PointerEvent::Move(Point::new(30, 30)), &area()));
        assert!(st.handle(PointerEvent::Move(Point::new(300, 30)), &area()));
        assert!(!st.hovered());
    }

    #[test]
    fn test_inactive_is_display_only() {
        let mut st = InteractionState::inactive();
        st.set_toggle_state(true);
        assert!(!st.handle(PointerEvent::Press(Point::new(20, 20)), &area()));
        assert!(!st.handle(PointerEvent::Enter, &area()));
        assert!(!st.pressed());
        assert!(!st.hovered());
        assert!(!st.toggle_state());
    }

    #[test]
    fn test_feedback_alpha_and_brightening() {
        let mut st = InteractionState::new(true, TriggerMode::OnRelease);
        let base = Rgb888::new(100, 50, 0);
        assert_eq!(st.feedback(base, 200, 90).alpha, 90);
        st.handle(PointerEvent::Enter, &area());
        assert_eq!(st.feedback(base, 200, 90).alpha, 200);
        st.handle(PointerEvent::Press(Point::new(20, 20)), &area());
        assert_eq!(st.feedback(base, 200, 90).rgb, Rgb888::new(120, 60, 0));
    }
}
