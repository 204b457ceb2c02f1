/*
 *  display/components/timer_display.rs
 *
 *  value-widgets - SCADA panel indicators
 *  (c) 2020-26 Stuart Hunter
 *
 *  Stopwatch panel with start/pause and reset buttons
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

use embedded_graphics::mono_font::ascii::{FONT_10X20, FONT_7X13};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::constants::{SECONDS_SUFFIX, TIMER_REDRAW_PERIOD_MS};
use crate::display::color::Rgba;
use crate::display::error::WidgetError;
use crate::display::render_state::RenderState;
use crate::display::stopwatch::{Stopwatch, ThresholdWindow, TimerPhase};
use crate::display::traits::{PointerEvent, Renderable};
use crate::draw::{draw_polyline, draw_rounded_rect, draw_text_in_box, draw_triangle, fill_rect};

const BUTTON: u32 = 25;
const BUTTON_GAP: i32 = 7;
const BUTTON_HOVER: Rgb888 = Rgb888::new(173, 216, 230);
const BUTTON_PRESSED_BORDER: Rgb888 = Rgb888::new(119, 119, 119);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerButton {
    StartPause,
    Reset,
}

/// Caption shown above the elapsed time.
pub fn format_name_line(name: &str, window: Option<ThresholdWindow>, units: Option<&str>) -> String {
    let mut line = name.to_string();
    if let Some(w) = window {
        line.push_str(&format!(" from {:.2} to {:.2}", w.begin(), w.end()));
    }
    if let Some(units) = units {
        line.push(' ');
        line.push_str(units);
    }
    line
}

pub fn format_elapsed(seconds: f64) -> String {
    format!("{seconds:05.2} {SECONDS_SUFFIX}")
}

#[derive(Debug)]
pub struct TimerDisplay {
    state: RenderState,
    origin: Point,
    size: Size,
    name: String,
    units: Option<String>,
    stopwatch: Stopwatch,
    hovered: Option<TimerButton>,
    pressed: Option<TimerButton>,
}

impl TimerDisplay {
    pub const DEFAULT_SIZE: Size = Size::new(250, 90);

    pub fn new(
        origin: Point,
        name: impl Into<String>,
        window: Option<ThresholdWindow>,
        normal_min: f64,
        normal_max: f64,
    ) -> Result<Self, WidgetError> {
        Self::starting_at(origin, name, window, normal_min, normal_max, Instant::now())
    }

    pub fn starting_at(
        origin: Point,
        name: impl Into<String>,
        window: Option<ThresholdWindow>,
        normal_min: f64,
        normal_max: f64,
        now: Instant,
    ) -> Result<Self, WidgetError> {
        Ok(Self {
            state: RenderState::starting_at(TIMER_REDRAW_PERIOD_MS, now),
            origin,
            size: Self::DEFAULT_SIZE,
            name: name.into(),
            units: None,
            stopwatch: Stopwatch::starting_at(window, normal_min, normal_max, now)?,
            hovered: None,
            pressed: None,
        })
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    pub fn stopwatch(&self) -> &Stopwatch { &self.stopwatch }
    pub fn phase(&self) -> TimerPhase { self.stopwatch.phase() }
    pub fn elapsed(&self) -> f64 { self.stopwatch.elapsed() }

    pub fn name_line(&self) -> String {
        format_name_line(&self.name, self.stopwatch.window(), self.units.as_deref())
    }

    pub fn elapsed_text(&self) -> String {
        format_elapsed(self.stopwatch.elapsed())
    }

    /// Feed the process value the threshold window watches.
    pub fn set_controlled_value(&mut self, v: f64) {
        self.stopwatch.set_controlled_value(v);
    }

    pub fn start_at(&mut self, now: Instant) {
        self.stopwatch.start_at(now);
        self.state.mark_dirty();
    }

    pub fn toggle_pause_at(&mut self, now: Instant) -> bool {
        let changed = self.stopwatch.toggle_pause_at(now);
        if changed {
            self.state.mark_dirty();
        }
        changed
    }

    pub fn reset_at(&mut self, now: Instant) {
        self.stopwatch.reset_at(now);
        self.state.mark_dirty();
    }

    pub fn set_geometry(&mut self, origin: Point, size: Size) {
        self.origin = origin;
        self.size = size;
        self.state.mark_dirty();
    }

    pub fn button_rect(&self, button: TimerButton) -> Rectangle {
        let right = self.origin.x + self.size.width as i32 - BUTTON_GAP;
        let top = self.origin.y + self.size.height as i32 - BUTTON as i32 - BUTTON_GAP;
        let slot = match button {
            TimerButton::StartPause => 2,
            TimerButton::Reset => 1,
        };
        let x = right - slot * (BUTTON as i32 + BUTTON_GAP) + BUTTON_GAP;
        Rectangle::new(Point::new(x, top), Size::new(BUTTON, BUTTON))
    }

    fn button_at(&self, p: Point) -> Option<TimerButton> {
        [TimerButton::StartPause, TimerButton::Reset]
            .into_iter()
            .find(|b| self.button_rect(*b).contains(p))
    }

    fn press(&mut self, button: TimerButton, now: Instant) {
        match button {
            TimerButton::StartPause if self.stopwatch.window().is_none() => {
                self.toggle_pause_at(now);
            }
            TimerButton::StartPause => self.start_at(now),
            TimerButton::Reset => self.reset_at(now),
        }
    }

    /// Pause bars while a free-running count is live, play arrow otherwise.
    fn shows_pause_glyph(&self) -> bool {
        self.stopwatch.window().is_none() && !self.stopwatch.paused()
    }

    fn draw_button<D>(&self, target: &mut D, button: TimerButton) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let colors = self.state.colors();
        let rect = self.button_rect(button);
        let face = if self.pressed == Some(button) || self.hovered == Some(button) {
            BUTTON_HOVER
        } else if self.state.dark() {
            Rgba::new(180, 180, 180, 204).over(colors.background)
        } else {
            Rgba::new(255, 255, 255, 178).over(colors.background)
        };
        let border = if self.pressed == Some(button) { (BUTTON_PRESSED_BORDER, 2) } else { (Rgb888::BLACK, 1) };
        draw_rounded_rect(target, rect, 5, Some(face), Some(border))?;

        let c = rect.center();
        let glyph = Rgb888::BLACK;
        match button {
            TimerButton::StartPause if self.shows_pause_glyph() => {
                fill_rect(target, Rectangle::new(c + Point::new(-5, -6), Size::new(3, 12)), glyph)?;
                fill_rect(target, Rectangle::new(c + Point::new(2, -6), Size::new(3, 12)), glyph)
            }
            TimerButton::StartPause => {
                let tri = [c + Point::new(-4, -6), c + Point::new(-4, 6), c + Point::new(6, 0)];
                draw_triangle(target, tri, Some(glyph), None)
            }
            TimerButton::Reset => {
                // three-quarter ring with an arrowhead at its open end
                let ring: Vec<Point> = (0..=270)
                    .step_by(15)
                    .map(|deg| {
                        let a = (deg as f32 + 90.0).to_radians();
                        c + Point::new((7.0 * a.cos()).round() as i32, (-7.0 * a.sin()).round() as i32)
                    })
                    .collect();
                draw_polyline(target, &ring, glyph, 2)?;
                let head = [c + Point::new(4, -10), c + Point::new(4, -4), c + Point::new(9, -7)];
                draw_triangle(target, head, Some(glyph), None)
            }
        }
    }
}

impl Renderable for TimerDisplay {
    fn render_state(&self) -> &RenderState {
        &self.state
    }

    fn render_state_mut(&mut self) -> &mut RenderState {
        &mut self.state
    }

    fn bounds(&self) -> Rectangle {
        Rectangle::new(self.origin, self.size)
    }

    fn handle_pointer_event(&mut self, event: PointerEvent, now: Instant) -> bool {
        match event {
            PointerEvent::Enter => false,
            PointerEvent::Leave => {
                let changed = self.hovered.is_some() || self.pressed.is_some();
                self.hovered = None;
                self.pressed = None;
                if changed {
                    self.state.mark_dirty();
                }
                changed
            }
            PointerEvent::Move(p) => {
                let hovered = self.button_at(p);
                self.state.apply(&mut self.hovered, hovered)
            }
            PointerEvent::Press(p) => match self.button_at(p) {
                Some(button) => {
                    self.pressed = Some(button);
                    self.press(button, now);
                    self.state.mark_dirty();
                    true
                }
                None => false,
            },
            PointerEvent::Release(_) => {
                let released = self.pressed.take().is_some();
                if released {
                    self.state.mark_dirty();
                }
                released
            }
        }
    }

    fn advance(&mut self, now: Instant) {
        if self.stopwatch.tick_at(now) {
            self.state.mark_dirty();
        }
    }

    fn render<D>(&mut self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let colors = self.state.colors();
        draw_rounded_rect(target, self.bounds(), 10, Some(colors.background), None)?;

        let (x, y) = (self.origin.x, self.origin.y);
        let name_box = Rectangle::new(Point::new(x, y + 6), Size::new(self.size.width, 16));
        draw_text_in_box(target, &self.name_line(), name_box, &FONT_7X13, colors.caption)?;

        let ink = if self.stopwatch.threshold_crossed() { colors.timer_warn } else { colors.timer_ok };
        let time_box = Rectangle::new(Point::new(x, y + 24), Size::new(self.size.width, 22));
        draw_text_in_box(target, &self.elapsed_text(), time_box, &FONT_10X20, ink)?;

        self.draw_button(target, TimerButton::StartPause)?;
        self.draw_button(target, TimerButton::Reset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_name_line() {
        let w = ThresholdWindow::new(0.0, 10.0).unwrap();
        assert_eq!(format_name_line("Fill", Some(w), Some("bar")), "Fill from 0.00 to 10.00 bar");
        assert_eq!(format_name_line("Dwell", None, None), "Dwell");
    }

    #[test]
    fn test_elapsed_format() {
        assert_eq!(format_elapsed(0.0), "00.00 s");
        assert_eq!(format_elapsed(3.14159), "03.14 s");
        assert_eq!(format_elapsed(123.456), "123.46 s");
    }

    #[test]
    fn test_buttons_do_not_overlap() {
        let t0 = Instant::now();
        let timer = TimerDisplay::starting_at(Point::new(10, 10), "T", None, 0.0, 100.0, t0).unwrap();
        let start = timer.button_rect(TimerButton::StartPause);
        let reset = timer.button_rect(TimerButton::Reset);
        assert!(start.intersection(&reset).is_zero_sized());
        assert!(timer.bounds().contains(reset.bottom_right().unwrap_or(reset.top_left)));
    }

    #[test]
    fn test_start_button_toggles_manual_timer() {
        let t0 = Instant::now();
        let mut timer = TimerDisplay::starting_at(Point::zero(), "T", None, 0.0, 100.0, t0).unwrap();
        let start = timer.button_rect(TimerButton::StartPause).center();

        assert!(timer.handle_pointer_event(PointerEvent::Press(start), t0));
        timer.handle_pointer_event(PointerEvent::Release(start), t0);
        timer.advance(t0 + ms(1500));
        assert_eq!(timer.phase(), TimerPhase::Running);
        assert!((timer.elapsed() - 1.5).abs() < 1e-9);

        timer.handle_pointer_event(PointerEvent::Press(start), t0 + ms(2000));
        timer.advance(t0 + ms(9000));
        assert!(timer.stopwatch().paused());
        assert!((timer.elapsed() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_reset_button_zeroes() {
        let t0 = Instant::now();
        let mut timer = TimerDisplay::starting_at(Point::zero(), "T", None, 0.0, 100.0, t0).unwrap();
        timer.toggle_pause_at(t0);
        timer.advance(t0 + ms(800));
        let reset = timer.button_rect(TimerButton::Reset).center();
        timer.handle_pointer_event(PointerEvent::Press(reset), t0 + ms(900));
        assert_eq!(timer.elapsed(), 0.0);
        assert_eq!(timer.phase(), TimerPhase::Idle);
        assert_eq!(timer.elapsed_text(), "00.00 s");
    }

    #[test]
    fn test_windowed_timer_arms_from_button() {
        let t0 = Instant::now();
        let w = ThresholdWindow::new(0.0, 10.0).unwrap();
        let mut timer = TimerDisplay::starting_at(Point::zero(), "T", Some(w), 0.0, 100.0, t0).unwrap();
        let start = timer.button_rect(TimerButton::StartPause).center();
        timer.handle_pointer_event(PointerEvent::Press(start), t0);
        assert_eq!(timer.phase(), TimerPhase::Armed);
        timer.set_controlled_value(1.0);
        timer.advance(t0 + ms(10));
        assert_eq!(timer.phase(), TimerPhase::Running);
    }

    #[test]
    fn test_press_outside_buttons_is_ignored() {
        let t0 = Instant::now();
        let mut timer = TimerDisplay::starting_at(Point::zero(), "T", None, 0.0, 100.0, t0).unwrap();
        assert!(!timer.handle_pointer_event(PointerEvent::Press(Point::new(5, 5)), t0));
        assert_eq!(timer.phase(), TimerPhase::Idle);
    }
}
