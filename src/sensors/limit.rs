// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Bottom limit switch.
//!
//! Normally-open switch to ground with a pull-up; triggered reads low. Not debounced: a single
//! triggered sample is enough to stop the motor.

use crate::input::ActiveLevel;

#[derive(Clone, Debug)]
pub struct LimitSwitch {
    active: ActiveLevel,
    triggered: bool,
}

impl LimitSwitch {
    pub fn new(active: ActiveLevel) -> Self {
        Self {
            active,
            triggered: false,
        }
    }

    pub fn active_low() -> Self {
        Self::new(ActiveLevel::Low)
    }

    /// Feed the raw pin level for this tick.
    #[inline]
    pub fn update(&mut self, level_high: bool) {
        self.triggered = self.active.is_asserted(level_high);
    }

    #[inline]
    pub fn is_triggered(&self) -> bool {
        self.triggered
    }
}

impl Default for LimitSwitch {
    fn default() -> Self {
        Self::active_low()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follows_raw_level() {
        let mut limit = LimitSwitch::active_low();
        assert!(!limit.is_triggered());
        limit.update(false);
        assert!(limit.is_triggered());
        limit.update(true);
        assert!(!limit.is_triggered());
    }
}
