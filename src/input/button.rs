// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Debounced push button with press-duration classification.
//!
//! The raw pin level is fed in once per control tick through [`Button::update`]. The debounced
//! level only follows the raw level after it has been stable for [`DEBOUNCE_MS`]. Hold durations
//! are measured from the tick at which the debounced level became pressed.

use crate::config::{DEBOUNCE_MS, LONG_PRESS_MS, VERY_LONG_PRESS_MS};

/// Whether an input is asserted by driving it high or low on the board wiring.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ActiveLevel {
    High,
    Low,
}

impl ActiveLevel {
    /// Translate a raw pin level into "asserted".
    #[inline]
    pub fn is_asserted(self, level_high: bool) -> bool {
        match self {
            ActiveLevel::High => level_high,
            ActiveLevel::Low => !level_high,
        }
    }
}

/// One debounced button.
#[derive(Clone, Debug)]
pub struct Button {
    active: ActiveLevel,

    /// Last raw sample, already translated to "pressed".
    raw_pressed: bool,
    /// Time of the last raw change.
    raw_changed_ms: u32,

    /// Committed level.
    pressed: bool,
    /// Time the committed level became pressed.
    press_start_ms: Option<u32>,

    /// Timestamp of the most recent update, used by the hold queries.
    now_ms: u32,
}

impl Button {
    pub fn new(active: ActiveLevel) -> Self {
        Self {
            active,
            raw_pressed: false,
            raw_changed_ms: 0,
            pressed: false,
            press_start_ms: None,
            now_ms: 0,
        }
    }

    /// Button wired to ground with a pull-up (pressed reads low).
    pub fn active_low() -> Self {
        Self::new(ActiveLevel::Low)
    }

    pub fn active_high() -> Self {
        Self::new(ActiveLevel::High)
    }

    /// Feed one raw sample. `level_high` is the electrical pin level.
    pub fn update(&mut self, level_high: bool, now_ms: u32) {
        self.now_ms = now_ms;

        let reading = self.active.is_asserted(level_high);
        if reading != self.raw_pressed {
            self.raw_pressed = reading;
            self.raw_changed_ms = now_ms;
        }

        let stable_for = now_ms.wrapping_sub(self.raw_changed_ms);
        if stable_for >= DEBOUNCE_MS && self.raw_pressed != self.pressed {
            self.pressed = self.raw_pressed;
            self.press_start_ms = if self.pressed { Some(now_ms) } else { None };
        }
    }

    /// Debounced pressed state.
    #[inline]
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// How long the debounced level has been pressed, or 0 when released.
    pub fn held_ms(&self) -> u32 {
        match self.press_start_ms {
            Some(start) if self.pressed => self.now_ms.wrapping_sub(start),
            _ => 0,
        }
    }

    /// Pressed for at least `threshold_ms`.
    #[inline]
    pub fn is_held_for(&self, threshold_ms: u32) -> bool {
        self.pressed && self.held_ms() >= threshold_ms
    }

    #[inline]
    pub fn is_long_pressed(&self) -> bool {
        self.is_held_for(LONG_PRESS_MS)
    }

    #[inline]
    pub fn is_very_long_pressed(&self) -> bool {
        self.is_held_for(VERY_LONG_PRESS_MS)
    }
}
