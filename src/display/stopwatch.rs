/*
 *  display/stopwatch.rs
 *
 *  value-widgets - SCADA panel indicators
 *  (c) 2020-26 Stuart Hunter
 *
 *  Elapsed-time counter with threshold-driven start and auto-stop
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

use log::debug;

use crate::display::error::WidgetError;
use crate::pacer::PeriodicTimer;

/// Time base period; only elapsed time is read from it.
const TIME_BASE_MS: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    Idle,
    Armed,
    Running,
}

impl TimerPhase {
    /// Numeric code as shown on legacy panels.
    pub fn code(self) -> u8 {
        match self {
            TimerPhase::Idle => 0,
            TimerPhase::Armed => 1,
            TimerPhase::Running => 2,
        }
    }
}

/// Begin/end pair of the controlled value. Direction follows from the order:
/// `begin < end` is a rising window, `begin > end` a falling one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdWindow {
    begin: f64,
    end: f64,
}

impl ThresholdWindow {
    pub fn new(begin: f64, end: f64) -> Result<Self, WidgetError> {
        if !begin.is_finite() || !end.is_finite() {
            return Err(WidgetError::config("threshold window must be finite"));
        }
        if begin == end {
            return Err(WidgetError::config(format!("threshold begin and end are both {begin}")));
        }
        Ok(Self { begin, end })
    }

    pub fn begin(&self) -> f64 { self.begin }
    pub fn end(&self) -> f64 { self.end }

    #[inline]
    pub fn rising(&self) -> bool {
        self.begin < self.end
    }

    /// Controlled value has moved past `begin` in the window direction.
    pub fn began(&self, v: f64) -> bool {
        if self.rising() { v > self.begin } else { v < self.begin }
    }

    /// Controlled value has reached `end`.
    pub fn ended(&self, v: f64) -> bool {
        if self.rising() { v >= self.end } else { v <= self.end }
    }
}

/// Run/pause/threshold state machine behind the timer display.
#[derive(Debug)]
pub struct Stopwatch {
    window: Option<ThresholdWindow>,
    normal_min: f64,
    normal_max: f64,
    phase: TimerPhase,
    paused: bool,
    elapsed: f64,
    carried: f64,
    controlled_value: f64,
    threshold_crossed: bool,
    base: PeriodicTimer,
}

impl Stopwatch {
    pub fn new(window: Option<ThresholdWindow>, normal_min: f64, normal_max: f64) -> Result<Self, WidgetError> {
        Self::starting_at(window, normal_min, normal_max, Instant::now())
    }

    pub fn starting_at(
        window: Option<ThresholdWindow>,
        normal_min: f64,
        normal_max: f64,
        now: Instant,
    ) -> Result<Self, WidgetError> {
        if !normal_min.is_finite() || !normal_max.is_finite() || normal_min > normal_max {
            return Err(WidgetError::config(format!(
                "normal band [{normal_min}, {normal_max}] is not a valid range"
            )));
        }
        Ok(Self {
            window,
            normal_min,
            normal_max,
            phase: TimerPhase::Idle,
            paused: window.is_none(),
            elapsed: 0.0,
            carried: 0.0,
            controlled_value: 0.0,
            threshold_crossed: !(normal_min..=normal_max).contains(&0.0),
            base: PeriodicTimer::starting_at(TIME_BASE_MS, now),
        })
    }

    pub fn window(&self) -> Option<ThresholdWindow> { self.window }
    pub fn phase(&self) -> TimerPhase { self.phase }
    pub fn paused(&self) -> bool { self.paused }
    /// Accumulated seconds.
    pub fn elapsed(&self) -> f64 { self.elapsed }
    pub fn normal_band(&self) -> (f64, f64) { (self.normal_min, self.normal_max) }
    pub fn controlled_value(&self) -> f64 { self.controlled_value }

    /// Elapsed time is outside the normal band.
    pub fn threshold_crossed(&self) -> bool {
        self.threshold_crossed
    }

    pub fn set_controlled_value(&mut self, v: f64) {
        self.controlled_value = v;
    }

    pub fn start(&mut self) {
        self.start_at(Instant::now());
    }

    /// Zero the counter and either run at once (no window) or wait for the
    /// controlled value to pass `begin`.
    pub fn start_at(&mut self, now: Instant) {
        self.elapsed = 0.0;
        self.carried = 0.0;
        self.paused = false;
        self.base.restart_at(now);
        let next = if self.window.is_some() { TimerPhase::Armed } else { TimerPhase::Running };
        self.enter(next);
        self.update_band();
    }

    /// Freeze a free-running counter. Returns false when not applicable.
    pub fn pause_at(&mut self, now: Instant) -> bool {
        if self.window.is_some() || self.paused {
            return false;
        }
        if self.phase == TimerPhase::Running {
            self.elapsed = self.running_total(now);
        }
        self.carried = self.elapsed;
        self.paused = true;
        self.enter(TimerPhase::Idle);
        true
    }

    /// Continue a paused free-running counter from where it stopped.
    pub fn resume_at(&mut self, now: Instant) -> bool {
        if self.window.is_some() || !self.paused {
            return false;
        }
        self.paused = false;
        self.base.restart_at(now);
        self.enter(TimerPhase::Running);
        true
    }

    pub fn toggle_pause_at(&mut self, now: Instant) -> bool {
        if self.paused { self.resume_at(now) } else { self.pause_at(now) }
    }

    pub fn reset(&mut self) {
        self.reset_at(Instant::now());
    }

    pub fn reset_at(&mut self, now: Instant) {
        self.enter(TimerPhase::Idle);
        self.elapsed = 0.0;
        self.carried = 0.0;
        self.paused = self.window.is_none();
        self.base.restart_at(now);
        self.update_band();
    }

    /// Advance one tick. Returns true when anything displayed changed.
    pub fn tick_at(&mut self, now: Instant) -> bool {
        let before = (self.phase, self.elapsed, self.threshold_crossed);
        match (self.phase, self.window) {
            (TimerPhase::Idle, _) => {}
            (TimerPhase::Armed, None) => {
                self.base.restart_at(now);
                self.enter(TimerPhase::Running);
            }
            (TimerPhase::Armed, Some(w)) => {
                if w.began(self.controlled_value) {
                    self.base.restart_at(now);
                    self.enter(TimerPhase::Running);
                }
            }
            (TimerPhase::Running, None) => {
                self.elapsed = self.running_total(now);
            }
            (TimerPhase::Running, Some(w)) => {
                if w.ended(self.controlled_value) {
                    self.enter(TimerPhase::Idle);
                } else {
                    self.elapsed = self.running_total(now);
                }
            }
        }
        self.update_band();
        before != (self.phase, self.elapsed, self.threshold_crossed)
    }

    fn running_total(&self, now: Instant) -> f64 {
        self.base.elapsed_ms_at(now) as f64 / 1000.0 + self.carried
    }

    fn update_band(&mut self) {
        self.threshold_crossed = !(self.normal_min..=self.normal_max).contains(&self.elapsed);
    }

    fn enter(&mut self, phase: TimerPhase) {
        if self.phase != phase {
            debug!("timer {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn ms(t0: Instant, n: u64) -> Instant {
        t0 + Duration::from_millis(n)
    }

    #[test]
    fn test_window_validation() {
        assert!(ThresholdWindow::new(1.0, 1.0).is_err());
        assert!(ThresholdWindow::new(f64::NAN, 1.0).is_err());
        assert!(ThresholdWindow::new(0.0, 10.0).unwrap().rising());
        assert!(!ThresholdWindow::new(10.0, 0.0).unwrap().rising());
        assert!(Stopwatch::new(None, 5.0, 1.0).is_err());
    }

    #[test]
    fn test_rising_window_sequence() {
        let t0 = Instant::now();
        let window = ThresholdWindow::new(0.0, 10.0).unwrap();
        let mut sw = Stopwatch::starting_at(Some(window), 0.0, 100.0, t0).unwrap();
        assert_eq!(sw.phase(), TimerPhase::Idle);

        sw.start_at(t0);
        assert_eq!(sw.phase(), TimerPhase::Armed);

        let feed = [-1.0, 0.5, 5.0, 9.9, 10.0, 10.0];
        let expect = [
            TimerPhase::Armed,
            TimerPhase::Running,
            TimerPhase::Running,
            TimerPhase::Running,
            TimerPhase::Idle,
            TimerPhase::Idle,
        ];
        let mut stopped_at = None;
        for (i, (v, want)) in feed.iter().zip(expect).enumerate() {
            sw.set_controlled_value(*v);
            sw.tick_at(ms(t0, 1000 * (i as u64 + 1)));
            assert_eq!(sw.phase(), want, "tick {i}");
            if want == TimerPhase::Idle && stopped_at.is_none() {
                stopped_at = Some(sw.elapsed());
            }
        }
        // running from t=2s, last accumulated at t=4s
        assert_eq!(stopped_at, Some(2.0));
        sw.tick_at(ms(t0, 60_000));
        assert_eq!(sw.elapsed(), 2.0);
    }

    #[test]
    fn test_falling_window() {
        let t0 = Instant::now();
        let window = ThresholdWindow::new(10.0, 2.0).unwrap();
        let mut sw = Stopwatch::starting_at(Some(window), 0.0, 100.0, t0).unwrap();
        sw.start_at(t0);
        sw.set_controlled_value(11.0);
        sw.tick_at(ms(t0, 10));
        assert_eq!(sw.phase(), TimerPhase::Armed);
        sw.set_controlled_value(9.0);
        sw.tick_at(ms(t0, 20));
        assert_eq!(sw.phase(), TimerPhase::Running);
        sw.set_controlled_value(2.0);
        sw.tick_at(ms(t0, 30));
        assert_eq!(sw.phase(), TimerPhase::Idle);
    }

    #[test]
    fn test_manual_pause_preserves_elapsed() {
        let t0 = Instant::now();
        let mut sw = Stopwatch::starting_at(None, 0.0, 100.0, t0).unwrap();
        assert!(sw.paused());

        sw.start_at(t0);
        assert_eq!(sw.phase(), TimerPhase::Running);
        sw.tick_at(ms(t0, 1500));
        assert_eq!(sw.elapsed(), 1.5);

        assert!(sw.pause_at(ms(t0, 2000)));
        assert_eq!(sw.elapsed(), 2.0);
        sw.tick_at(ms(t0, 9000));
        assert_eq!(sw.elapsed(), 2.0);

        assert!(sw.resume_at(ms(t0, 10_000)));
        sw.tick_at(ms(t0, 10_500));
        assert_eq!(sw.elapsed(), 2.5);
    }

    #[test]
    fn test_pause_ignored_with_window() {
        let t0 = Instant::now();
        let window = ThresholdWindow::new(0.0, 1.0).unwrap();
        let mut sw = Stopwatch::starting_at(Some(window), 0.0, 10.0, t0).unwrap();
        sw.start_at(t0);
        assert!(!sw.pause_at(t0));
        assert!(!sw.resume_at(t0));
        assert_eq!(sw.phase(), TimerPhase::Armed);
    }

    #[test]
    fn test_reset_zeroes() {
        let t0 = Instant::now();
        let mut sw = Stopwatch::starting_at(None, 0.0, 100.0, t0).unwrap();
        sw.start_at(t0);
        sw.tick_at(ms(t0, 3000));
        sw.reset_at(ms(t0, 3100));
        assert_eq!(sw.phase(), TimerPhase::Idle);
        assert_eq!(sw.elapsed(), 0.0);
        assert!(sw.paused());
        sw.tick_at(ms(t0, 5000));
        assert_eq!(sw.elapsed(), 0.0);
    }

    #[test]
    fn test_threshold_band_is_cosmetic() {
        let t0 = Instant::now();
        let mut sw = Stopwatch::starting_at(None, 0.0, 1.0, t0).unwrap();
        sw.start_at(t0);
        sw.tick_at(ms(t0, 500));
        assert!(!sw.threshold_crossed());
        sw.tick_at(ms(t0, 1200));
        assert!(sw.threshold_crossed());
        assert_eq!(sw.phase(), TimerPhase::Running);
    }

    #[test]
    fn test_phase_codes() {
        assert_eq!(TimerPhase::Idle.code(), 0);
        assert_eq!(TimerPhase::Armed.code(), 1);
        assert_eq!(TimerPhase::Running.code(), 2);
    }
}
