// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Button Gestures
//!
//! Debounced buttons and the two-button gesture facts the controller consumes.
//!
//! ## Modules
//!
//! - [`button`] - Single debounced button with long / very-long press detection.
//!
//! Two-button queries live on [`GestureInput`]. Combined holds are measured against each button's
//! own press start, so pressing one button long before the other does not count as a long chord.

pub mod button;

pub use button::{ActiveLevel, Button};

use crate::config::{BOTH_LONG_PRESS_MS, LONG_PRESS_MS, VERY_LONG_PRESS_MS};

/// The desk's up/down button pair.
#[derive(Clone, Debug)]
pub struct GestureInput {
    pub up: Button,
    pub down: Button,
}

impl GestureInput {
    pub fn new(up: Button, down: Button) -> Self {
        Self { up, down }
    }

    /// Both buttons wired active-low, as on the desk handset.
    pub fn active_low() -> Self {
        Self::new(Button::active_low(), Button::active_low())
    }

    /// Sample both raw pin levels for this tick.
    pub fn update(&mut self, up_level: bool, down_level: bool, now_ms: u32) {
        self.up.update(up_level, now_ms);
        self.down.update(down_level, now_ms);
    }

    #[inline]
    pub fn is_both_pressed(&self) -> bool {
        self.up.is_pressed() && self.down.is_pressed()
    }

    /// Both held for at least [`BOTH_LONG_PRESS_MS`], each measured from its own press start.
    #[inline]
    pub fn is_both_long_pressed(&self) -> bool {
        self.up.is_held_for(BOTH_LONG_PRESS_MS) && self.down.is_held_for(BOTH_LONG_PRESS_MS)
    }

    #[inline]
    pub fn is_both_very_long_pressed(&self) -> bool {
        self.up.is_held_for(VERY_LONG_PRESS_MS) && self.down.is_held_for(VERY_LONG_PRESS_MS)
    }

    /// Quick chord: both pressed, neither held long yet.
    #[inline]
    pub fn is_both_short_pressed(&self) -> bool {
        self.is_both_pressed()
            && !self.up.is_held_for(LONG_PRESS_MS)
            && !self.down.is_held_for(LONG_PRESS_MS)
    }

    /// Up pressed, down released.
    #[inline]
    pub fn is_up_only(&self) -> bool {
        self.up.is_pressed() && !self.down.is_pressed()
    }

    /// Down pressed, up released.
    #[inline]
    pub fn is_down_only(&self) -> bool {
        self.down.is_pressed() && !self.up.is_pressed()
    }

    #[inline]
    pub fn is_any_pressed(&self) -> bool {
        self.up.is_pressed() || self.down.is_pressed()
    }
}

impl Default for GestureInput {
    fn default() -> Self {
        Self::active_low()
    }
}
