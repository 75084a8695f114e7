//! Press-and-hold pressure gauge.
//!
//! Holding raises the gauge one increment per tick until it is full. Letting
//! go before it is full makes it sink by a fixed amount per tick until empty
//! or held again. The session owns the tick timers; the gauge only keeps
//! their handles and the arithmetic.

use crate::timer::TimerHandle;

pub const PRESSURE_MAX: f64 = 100.0;

const FULL_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Default)]
pub struct PressureGauge {
    value: f64,
    pressing: bool,
    decompressing: bool,
    pub(crate) hold_timer: Option<TimerHandle>,
    pub(crate) decay_timer: Option<TimerHandle>,
}

impl PressureGauge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn is_pressing(&self) -> bool {
        self.pressing
    }

    pub fn is_decompressing(&self) -> bool {
        self.decompressing
    }

    pub fn is_full(&self) -> bool {
        self.value >= PRESSURE_MAX
    }

    /// Gain per tick so that a continuous hold fills the gauge in
    /// `duration_secs`.
    pub fn hold_increment(duration_secs: u32, tick_ms: u64) -> f64 {
        let ticks = (duration_secs.max(1) as f64 * 1000.0) / tick_ms.max(1) as f64;
        PRESSURE_MAX / ticks
    }

    pub(crate) fn set_pressing(&mut self, pressing: bool) {
        self.pressing = pressing;
    }

    pub(crate) fn set_decompressing(&mut self, decompressing: bool) {
        self.decompressing = decompressing;
    }

    /// Apply one hold tick. Returns `true` once the gauge is full.
    pub(crate) fn rise(&mut self, increment: f64) -> bool {
        let next = self.value + increment;
        self.value = if next >= PRESSURE_MAX - FULL_EPSILON {
            PRESSURE_MAX
        } else {
            next
        };
        self.is_full()
    }

    /// Apply one decay tick. Returns `true` once the gauge is empty.
    pub(crate) fn sink(&mut self, amount: f64) -> bool {
        self.value = (self.value - amount).max(0.0);
        self.value <= 0.0
    }

    /// Forget both tick timers. The caller has already cancelled them.
    pub(crate) fn forget_timers(&mut self) {
        self.hold_timer = None;
        self.decay_timer = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increment_matches_forty_ms_formula() {
        let inc = PressureGauge::hold_increment(5, 40);
        assert!((inc - 100.0 / (5.0 * 25.0)).abs() < 1e-12);
    }

    #[test]
    fn rising_fills_after_expected_ticks() {
        let mut gauge = PressureGauge::new();
        let inc = PressureGauge::hold_increment(3, 40);
        let ticks = (0..1000).take_while(|_| !gauge.rise(inc)).count() + 1;
        assert_eq!(ticks, 75);
        assert_eq!(gauge.value(), PRESSURE_MAX);
    }

    #[test]
    fn sinking_floors_at_zero() {
        let mut gauge = PressureGauge::new();
        gauge.rise(2.0);
        assert!(!gauge.sink(1.5));
        assert!(gauge.sink(1.5));
        assert_eq!(gauge.value(), 0.0);
    }
}
