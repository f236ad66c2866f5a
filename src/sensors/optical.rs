// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Single-channel optical pulse counter.
//!
//! A slotted disc on the lift spindle interrupts an IR beam. Every light-to-dark transition
//! (high to low on the pulled-up sensor line) is one pulse. The sensor cannot tell direction, so
//! pulses are signed by the travel hint from the controller.
//!
//! `ReadLevel` is a closure that returns the raw sensor line level.

use super::{is_valid_scale, PositionSensor, Travel};
use crate::config::{DEFAULT_SCALE_PULSES_PER_MM, MOVEMENT_TIMEOUT_MS};

pub struct OpticalPulseCounter<ReadLevel> {
    read_level: ReadLevel,
    last_level: bool,
    pulse_count: i32,
    pulses_per_mm: f32,
    travel: Travel,
    last_pulse_ms: u32,
}

impl<ReadLevel> OpticalPulseCounter<ReadLevel>
where
    ReadLevel: FnMut() -> bool,
{
    /// Construct a counter with the given scale (pulses per mm).
    pub fn new(mut read_level: ReadLevel, pulses_per_mm: f32) -> Self {
        let last_level = (read_level)();
        let pulses_per_mm = if is_valid_scale(pulses_per_mm) {
            pulses_per_mm
        } else {
            DEFAULT_SCALE_PULSES_PER_MM
        };

        Self {
            read_level,
            last_level,
            pulse_count: 0,
            pulses_per_mm,
            travel: Travel::Up,
            last_pulse_ms: 0,
        }
    }

    /// Time of the most recent pulse.
    #[inline]
    pub fn last_pulse_ms(&self) -> u32 {
        self.last_pulse_ms
    }

    /// True if a pulse arrived within [`MOVEMENT_TIMEOUT_MS`].
    pub fn is_moving(&self, now_ms: u32) -> bool {
        now_ms.wrapping_sub(self.last_pulse_ms) < MOVEMENT_TIMEOUT_MS
    }
}

impl<ReadLevel> PositionSensor for OpticalPulseCounter<ReadLevel>
where
    ReadLevel: FnMut() -> bool,
{
    fn update(&mut self, now_ms: u32) {
        let level = (self.read_level)();

        // Beam blocked: high -> low
        if self.last_level && !level {
            match self.travel {
                Travel::Down => self.pulse_count = self.pulse_count.wrapping_sub(1),
                // Coasting after a stop keeps the last direction's sign; Up is the default.
                Travel::Up | Travel::Stopped => self.pulse_count = self.pulse_count.wrapping_add(1),
            }
            self.last_pulse_ms = now_ms;
        }

        self.last_level = level;
    }

    #[inline]
    fn pulse_count(&self) -> i32 {
        self.pulse_count
    }

    #[inline]
    fn scale(&self) -> f32 {
        self.pulses_per_mm
    }

    fn set_scale(&mut self, pulses_per_mm: f32) {
        if is_valid_scale(pulses_per_mm) {
            self.pulses_per_mm = pulses_per_mm;
        }
    }

    fn reset_to(&mut self, count: i32) {
        self.pulse_count = count;
    }

    fn note_travel(&mut self, travel: Travel) {
        // Remember the last real direction so pulses while coasting down still count down.
        if travel != Travel::Stopped {
            self.travel = travel;
        }
    }
}
