/*
 *  pacer.rs
 *
 *  value-widgets - SCADA panel indicators
 *	(c) 2020-26 Stuart Hunter
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */
use std::fmt;
use std::time::{Duration, Instant};

/// Monotonic interval helper.
///
/// Used both to throttle repaints and as the time base of elapsed-time
/// counters. Every time-dependent method has an `_at` twin taking the
/// current instant so callers can drive it from a single tick timestamp.
pub struct PeriodicTimer {
    period: Duration,
    started: Instant,
    on_expire: Option<Box<dyn FnMut()>>,
}

impl PeriodicTimer {
    pub fn new(period_ms: u64) -> Self {
        Self::starting_at(period_ms, Instant::now())
    }

    /// Timer whose start instant is `now` instead of the wall clock.
    pub fn starting_at(period_ms: u64, now: Instant) -> Self {
        Self {
            period: Duration::from_millis(period_ms),
            started: now,
            on_expire: None,
        }
    }

    /// Attach a side effect run by [`process`](Self::process) on expiry.
    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: FnMut() + 'static,
    {
        self.on_expire = Some(Box::new(callback));
        self
    }

    #[inline]
    pub fn period_ms(&self) -> u64 {
        self.period.as_millis() as u64
    }

    #[inline]
    pub fn set_period(&mut self, period_ms: u64) {
        self.period = Duration::from_millis(period_ms);
    }

    /// Whole milliseconds since the last restart.
    #[inline]
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms_at(Instant::now())
    }

    #[inline]
    pub fn elapsed_ms_at(&self, now: Instant) -> u64 {
        now.saturating_duration_since(self.started).as_millis() as u64
    }

    /// Seconds since the last restart, without millisecond truncation.
    #[inline]
    pub fn elapsed_secs_at(&self, now: Instant) -> f64 {
        now.saturating_duration_since(self.started).as_secs_f64()
    }

    /// True once at least one full period has elapsed.
    #[inline]
    pub fn expired(&self) -> bool {
        self.expired_at(Instant::now())
    }

    #[inline]
    pub fn expired_at(&self, now: Instant) -> bool {
        self.elapsed_ms_at(now) >= self.period_ms()
    }

    #[inline]
    pub fn restart(&mut self) {
        self.restart_at(Instant::now());
    }

    #[inline]
    pub fn restart_at(&mut self, now: Instant) {
        self.started = now;
    }

    /// Run the callback and restart if the period has elapsed.
    /// Returns true when the timer fired.
    pub fn process(&mut self) -> bool {
        self.process_at(Instant::now())
    }

    pub fn process_at(&mut self, now: Instant) -> bool {
        if !self.expired_at(now) {
            return false;
        }
        self.restart_at(now);
        if let Some(cb) = self.on_expire.as_mut() {
            cb();
        }
        true
    }
}

impl fmt::Debug for PeriodicTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeriodicTimer")
            .field("period", &self.period)
            .field("started", &self.started)
            .field("has_callback", &self.on_expire.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_expiry_uses_milliseconds() {
        let t0 = Instant::now();
        let tmr = PeriodicTimer::starting_at(250, t0);
        assert!(!tmr.expired_at(t0 + Duration::from_millis(249)));
        assert!(tmr.expired_at(t0 + Duration::from_millis(250)));
        assert_eq!(tmr.elapsed_ms_at(t0 + Duration::from_micros(1_999)), 1);
    }

    #[test]
    fn test_restart_resets_elapsed() {
        let t0 = Instant::now();
        let mut tmr = PeriodicTimer::starting_at(100, t0);
        let t1 = t0 + Duration::from_millis(150);
        assert!(tmr.expired_at(t1));
        tmr.restart_at(t1);
        assert_eq!(tmr.elapsed_ms_at(t1), 0);
        assert!(!tmr.expired_at(t1 + Duration::from_millis(50)));
    }

    #[test]
    fn test_instant_before_start_is_zero() {
        let t0 = Instant::now() + Duration::from_secs(1);
        let tmr = PeriodicTimer::starting_at(10, t0);
        assert_eq!(tmr.elapsed_ms_at(t0 - Duration::from_millis(500)), 0);
    }

    #[test]
    fn test_process_runs_callback_and_restarts() {
        let hits = Rc::new(Cell::new(0u32));
        let seen = Rc::clone(&hits);
        let t0 = Instant::now();
        let mut tmr = PeriodicTimer::starting_at(50, t0).with_callback(move || seen.set(seen.get() + 1));

        assert!(!tmr.process_at(t0 + Duration::from_millis(10)));
        assert!(tmr.process_at(t0 + Duration::from_millis(60)));
        assert!(!tmr.process_at(t0 + Duration::from_millis(100)));
        assert!(tmr.process_at(t0 + Duration::from_millis(110)));
        assert_eq!(hits.get(), 2);
    }
}
