/*
 *  display/components/selector.rs
 *
 *  value-widgets - SCADA panel indicators
 *  (c) 2020-26 Stuart Hunter
 *
 *  Seven position rotary selector with animated handle
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
use log::debug;

use crate::constants::{DEFAULT_REDRAW_PERIOD_MS, SELECTOR_BLINK_MS, SELECTOR_STEP_DEG};
use crate::display::color::contrast_color;
use crate::display::error::WidgetError;
use crate::display::render_state::RenderState;
use crate::display::traits::Renderable;
use crate::draw::{draw_line, draw_polyline, draw_rounded_rect, draw_text_in_box, font_for_height};
use crate::pacer::PeriodicTimer;

pub const POSITION_LABELS: [&str; 7] = ["I", "II", "III", "IV", "VA", "V", "VI"];

/// Handle angle per position, degrees left of vertical.
pub const POSITION_ANGLES: [f32; 7] = [
    3.0 * SELECTOR_STEP_DEG,
    2.0 * SELECTOR_STEP_DEG,
    SELECTOR_STEP_DEG,
    0.0,
    -SELECTOR_STEP_DEG,
    -2.0 * SELECTOR_STEP_DEG,
    -3.0 * SELECTOR_STEP_DEG,
];

const CENTRE: usize = 3;

/// Label for a position; 0 and anything unknown show "?".
pub fn position_label(position: u8) -> &'static str {
    match position {
        1..=7 => POSITION_LABELS[position as usize - 1],
        _ => "?",
    }
}

#[derive(Debug)]
pub struct Selector {
    state: RenderState,
    center: Point,
    scale: f32,
    requested: u8,
    shown: u8,
    current_angle: f32,
    target_angle: f32,
    handle_visible: bool,
    blink: PeriodicTimer,
}

impl Selector {
    /// Selector around `center`, drawn at `scale` (1.0 is roughly 540 px wide).
    pub fn new(center: Point, scale: f32) -> Result<Self, WidgetError> {
        Self::starting_at(center, scale, Instant::now())
    }

    pub fn starting_at(center: Point, scale: f32, now: Instant) -> Result<Self, WidgetError> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(WidgetError::config(format!("selector scale {scale} must be positive")));
        }
        Ok(Self {
            state: RenderState::starting_at(DEFAULT_REDRAW_PERIOD_MS, now),
            center,
            scale,
            requested: 0,
            shown: 0,
            current_angle: POSITION_ANGLES[0],
            target_angle: POSITION_ANGLES[0],
            handle_visible: true,
            blink: PeriodicTimer::starting_at(SELECTOR_BLINK_MS, now),
        })
    }

    pub fn position(&self) -> u8 { self.requested }
    pub fn label(&self) -> &'static str { position_label(self.requested) }
    pub fn handle_angle(&self) -> f32 { self.current_angle }
    pub fn target_angle(&self) -> f32 { self.target_angle }
    pub fn handle_visible(&self) -> bool { self.handle_visible }

    /// Request a position, 0 (unknown) to 7. The handle moves on later ticks.
    pub fn set_position(&mut self, position: u8) -> Result<(), WidgetError> {
        if position > POSITION_LABELS.len() as u8 {
            return Err(WidgetError::UnknownState(position as i32));
        }
        self.state.apply(&mut self.requested, position);
        Ok(())
    }

    pub fn set_center(&mut self, center: Point) {
        self.state.apply(&mut self.center, center);
    }

    fn px(&self, v: f32) -> i32 {
        (v * self.scale).round() as i32
    }

    fn pivot(&self) -> Point {
        self.center + Point::new(0, self.px(50.0))
    }

    fn radius(&self) -> f32 { 160.0 * self.scale }
    fn handle_length(&self) -> f32 { 200.0 * self.scale }

    /// Point `distance` px from the pivot along `angle_deg`.
    pub fn polar(&self, angle_deg: f32, distance: f32) -> Point {
        let a = angle_deg.to_radians();
        self.pivot() - Point::new((distance * a.sin()).round() as i32, (distance * a.cos()).round() as i32)
    }

    fn plate(&self) -> Rectangle {
        Rectangle::new(
            self.center - Point::new(self.px(170.0), self.px(60.0)),
            Size::new(2 * self.px(170.0) as u32, self.px(138.0) as u32),
        )
    }
}

impl Renderable for Selector {
    fn render_state(&self) -> &RenderState {
        &self.state
    }

    fn render_state_mut(&mut self) -> &mut RenderState {
        &mut self.state
    }

    fn bounds(&self) -> Rectangle {
        Rectangle::new(
            self.center - Point::new(self.px(270.0), self.px(360.0)),
            Size::new(self.px(540.0) as u32, self.px(440.0) as u32),
        )
    }

    fn advance(&mut self, now: Instant) {
        let pos = self.requested;
        if pos > 0 && pos != self.shown {
            debug!("selector {} -> {}", self.shown, pos);
            self.target_angle = POSITION_ANGLES[pos as usize - 1];
            self.shown = pos;
            self.handle_visible = true;
            self.state.mark_dirty();
        } else if pos == 0 {
            self.target_angle = POSITION_ANGLES[CENTRE];
            self.state.apply(&mut self.current_angle, self.target_angle);
            self.shown = 0;
            if self.blink.expired_at(now) {
                self.blink.restart_at(now);
                self.handle_visible = !self.handle_visible;
                self.state.mark_dirty();
            }
        }

        let step = SELECTOR_STEP_DEG / 5.0;
        if self.target_angle < self.current_angle - 1.0 {
            self.current_angle -= step;
            self.state.mark_dirty();
        } else if self.target_angle > self.current_angle + 1.0 {
            self.current_angle += step;
            self.state.mark_dirty();
        }
    }

    fn render<D>(&mut self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let ink = self.state.colors().foreground;
        let radius = self.radius();

        let dial: Vec<Point> = (-50..=50).map(|deg| self.polar(deg as f32, radius)).collect();
        draw_polyline(target, &dial, ink, 3)?;
        for angle in POSITION_ANGLES {
            let outer = self.polar(angle, radius);
            let inner = self.polar(angle, radius - 10.0 * self.scale);
            draw_line(target, outer, inner, ink, 3)?;
        }

        if self.handle_visible {
            let tip_distance = radius + self.handle_length();
            let base = self.polar(self.current_angle, radius);
            let tip = self.polar(self.current_angle, tip_distance);
            draw_line(target, base, tip, ink, self.px(25.0).max(1) as u32)?;
            Circle::with_center(tip, self.px(75.0).max(1) as u32)
                .into_styled(PrimitiveStyle::with_fill(ink))
                .draw(target)?;
        }

        let plate = self.plate();
        draw_rounded_rect(target, plate, 10, Some(ink), None)?;
        let font = font_for_height(self.px(60.0).max(8) as u32);
        draw_text_in_box(target, self.label(), plate, font, contrast_color(ink))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn selector(now: Instant) -> Selector {
        Selector::starting_at(Point::new(100, 100), 0.25, now).unwrap()
    }

    #[test]
    fn test_labels() {
        assert_eq!(position_label(0), "?");
        assert_eq!(position_label(1), "I");
        assert_eq!(position_label(5), "VA");
        assert_eq!(position_label(7), "VI");
    }

    #[test]
    fn test_rejects_unknown_position() {
        let mut s = selector(Instant::now());
        assert_eq!(s.set_position(8), Err(WidgetError::UnknownState(8)));
        assert_eq!(s.position(), 0);
    }

    #[test]
    fn test_unknown_position_snaps_to_centre() {
        let t0 = Instant::now();
        let mut s = selector(t0);
        s.advance(t0);
        assert_eq!(s.handle_angle(), 0.0);
        assert_eq!(s.label(), "?");
    }

    #[test]
    fn test_handle_animates_to_target() {
        let t0 = Instant::now();
        let mut s = selector(t0);
        s.advance(t0);
        s.set_position(7).unwrap();
        let mut ticks = 0;
        while ticks < 100 {
            let before = s.handle_angle();
            s.advance(t0);
            if s.handle_angle() == before {
                break;
            }
            assert!((before - s.handle_angle() - SELECTOR_STEP_DEG / 5.0).abs() < 1e-4);
            ticks += 1;
        }
        assert_eq!(ticks, 15);
        assert!((s.handle_angle() - POSITION_ANGLES[6]).abs() <= 1.0);
        assert!(s.handle_visible());
    }

    #[test]
    fn test_unknown_position_blinks() {
        let t0 = Instant::now();
        let mut s = selector(t0);
        s.advance(t0 + Duration::from_millis(100));
        assert!(s.handle_visible());
        s.advance(t0 + Duration::from_millis(260));
        assert!(!s.handle_visible());
        s.advance(t0 + Duration::from_millis(400));
        assert!(!s.handle_visible());
        s.advance(t0 + Duration::from_millis(520));
        assert!(s.handle_visible());
    }

    #[test]
    fn test_polar_points_up_at_zero() {
        let s = selector(Instant::now());
        assert_eq!(s.polar(0.0, 40.0), Point::new(100, 113 - 40));
        let left = s.polar(90.0, 40.0);
        assert_eq!(left, Point::new(60, 113));
    }
}
