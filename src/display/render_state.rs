/*
 *  display/render_state.rs
 *
 *  value-widgets - SCADA panel indicators
 *  (c) 2020-26 Stuart Hunter
 *
 *  Dirty-flag protocol shared by every panel widget
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

use log::trace;

use crate::display::color::ThemeColors;
use crate::pacer::PeriodicTimer;

/// Per-widget repaint bookkeeping.
///
/// `dirty` starts set so a fresh widget paints on its first visible tick,
/// and is only cleared by [`complete_repaint`](Self::complete_repaint).
#[derive(Debug)]
pub struct RenderState {
    dirty: bool,
    visible: bool,
    dark: bool,
    tick: PeriodicTimer,
}

impl RenderState {
    pub fn new(redraw_period_ms: u64) -> Self {
        Self::starting_at(redraw_period_ms, Instant::now())
    }

    pub fn starting_at(redraw_period_ms: u64, now: Instant) -> Self {
        Self {
            dirty: true,
            visible: true,
            dark: false,
            tick: PeriodicTimer::starting_at(redraw_period_ms, now),
        }
    }

    #[inline]
    pub fn dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn visible(&self) -> bool {
        self.visible
    }

    #[inline]
    pub fn dark(&self) -> bool {
        self.dark
    }

    /// Colours for the cached theme mode.
    #[inline]
    pub fn colors(&self) -> &'static ThemeColors {
        ThemeColors::for_mode(self.dark)
    }

    pub fn redraw_period_ms(&self) -> u64 {
        self.tick.period_ms()
    }

    pub fn set_redraw_period(&mut self, period_ms: u64) {
        self.tick.set_period(period_ms);
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Store `value` into `field` and mark dirty, but only when it differs.
    /// Returns whether anything changed.
    pub fn apply<T: PartialEq>(&mut self, field: &mut T, value: T) -> bool {
        if *field == value {
            return false;
        }
        *field = value;
        self.dirty = true;
        true
    }

    /// Showing a hidden widget repaints it; hiding keeps the pending state.
    pub fn set_visible(&mut self, visible: bool) {
        if visible && !self.visible {
            self.dirty = true;
        }
        self.visible = visible;
    }

    /// Compare the cached theme against the host's. Returns true on mismatch.
    pub fn sync_theme(&mut self, host_dark: bool) -> bool {
        if self.dark == host_dark {
            return false;
        }
        trace!("theme changed, dark={}", host_dark);
        self.dark = host_dark;
        self.dirty = true;
        true
    }

    /// True when this widget's redraw period has elapsed; restarts the period.
    pub fn due_at(&mut self, now: Instant) -> bool {
        self.tick.process_at(now)
    }

    #[inline]
    pub fn needs_repaint(&self) -> bool {
        self.dirty && self.visible
    }

    /// Called once a repaint has actually been drawn.
    pub fn complete_repaint(&mut self) {
        self.dirty = false;
    }
}

impl Default for RenderState {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_REDRAW_PERIOD_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_apply_marks_dirty_once() {
        let mut rs = RenderState::new(20);
        let mut value = 0.0_f64;
        rs.complete_repaint();

        assert!(rs.apply(&mut value, 5.0));
        assert!(rs.dirty());
        rs.complete_repaint();

        assert!(!rs.apply(&mut value, 5.0));
        assert!(!rs.dirty());
        assert_eq!(value, 5.0);
    }

    #[test]
    fn test_hidden_widget_never_needs_repaint() {
        let mut rs = RenderState::new(20);
        rs.set_visible(false);
        rs.mark_dirty();
        assert!(!rs.needs_repaint());
        assert!(rs.dirty());

        rs.complete_repaint();
        rs.set_visible(true);
        assert!(rs.needs_repaint());
    }

    #[test]
    fn test_theme_mismatch_forces_dirty() {
        let mut rs = RenderState::new(20);
        rs.complete_repaint();
        assert!(!rs.sync_theme(false));
        assert!(!rs.dirty());
        assert!(rs.sync_theme(true));
        assert!(rs.dirty());
        assert!(rs.dark());
        assert_eq!(rs.colors(), &ThemeColors::DARK);
    }

    #[test]
    fn test_due_follows_period() {
        let t0 = Instant::now();
        let mut rs = RenderState::starting_at(20, t0);
        assert!(!rs.due_at(t0 + Duration::from_millis(5)));
        assert!(rs.due_at(t0 + Duration::from_millis(20)));
        assert!(!rs.due_at(t0 + Duration::from_millis(30)));
        assert!(rs.due_at(t0 + Duration::from_millis(41)));
    }
}
