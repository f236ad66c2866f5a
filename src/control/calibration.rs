// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Two-step calibration wizard.
//!
//! The operator dials in the real desk height, confirms, moves the desk, dials in the new real
//! height and confirms again. The pulses counted between the two confirmations divided by the
//! height difference is the scale factor.
//!
//! Buttons: up / down alone nudge the guess by 1 mm per tick, a quick press of both confirms.
//! Nothing is processed until the gesture that opened the wizard has been released.

use crate::config::{
    CAL_DEFAULT_SPAN_MM, CAL_DEFAULT_START_MM, CAL_IDLE_TIMEOUT_MS, CAL_MAX_HEIGHT_MM,
    CAL_MIN_HEIGHT_MM, CAL_NUDGE_MM,
};
use crate::display::CalibrationStep;
use crate::input::GestureInput;
use crate::sensors::is_valid_scale;

/// Result of one wizard tick.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum WizardEvent {
    None,
    /// Start height confirmed.
    Advanced,
    /// End height confirmed but no usable scale; still waiting in the second step.
    Rejected,
    Completed {
        pulses_per_mm: f32,
        /// Real height the desk is at now (mm).
        end_height_mm: f32,
    },
    /// No button activity for [`CAL_IDLE_TIMEOUT_MS`].
    TimedOut,
}

#[derive(Clone, Debug)]
pub struct CalibrationWizard {
    step: CalibrationStep,
    start_guess_mm: f32,
    end_guess_mm: f32,
    pulse_count_at_start: i32,

    /// Entry gesture released.
    armed: bool,
    prev_pressed: bool,
    prev_both_short: bool,
    /// Guess when the current press began, restored if the press turns into a chord.
    guess_at_press_start: f32,
    /// The current press became a chord. No nudging until every button is released.
    chord_seen: bool,
    last_activity_ms: u32,
}

impl CalibrationWizard {
    /// Open the wizard. `current_height_mm` seeds the first guess when the desk is calibrated.
    pub fn new(current_height_mm: Option<f32>, pulse_count: i32, now_ms: u32) -> Self {
        let start = current_height_mm
            .filter(|h| h.is_finite())
            .map(clamp_guess)
            .unwrap_or(CAL_DEFAULT_START_MM);

        Self {
            step: CalibrationStep::AwaitingStartHeight,
            start_guess_mm: start,
            end_guess_mm: clamp_guess(start + CAL_DEFAULT_SPAN_MM),
            pulse_count_at_start: pulse_count,
            armed: false,
            prev_pressed: true,
            prev_both_short: false,
            guess_at_press_start: start,
            chord_seen: false,
            last_activity_ms: now_ms,
        }
    }

    #[inline]
    pub fn step(&self) -> CalibrationStep {
        self.step
    }

    #[inline]
    pub fn start_guess_mm(&self) -> f32 {
        self.start_guess_mm
    }

    #[inline]
    pub fn end_guess_mm(&self) -> f32 {
        self.end_guess_mm
    }

    /// Pulses counted since the start height was confirmed (0 before that).
    pub fn pulses_since_start(&self, pulse_count: i32) -> i32 {
        match self.step {
            CalibrationStep::AwaitingStartHeight => 0,
            _ => pulse_count.wrapping_sub(self.pulse_count_at_start),
        }
    }

    /// Run one tick against the debounced buttons and the live pulse count.
    pub fn update(&mut self, input: &GestureInput, pulse_count: i32, now_ms: u32) -> WizardEvent {
        let pressed = input.is_any_pressed();

        if pressed {
            self.last_activity_ms = now_ms;
        } else if now_ms.wrapping_sub(self.last_activity_ms) >= CAL_IDLE_TIMEOUT_MS {
            return WizardEvent::TimedOut;
        }

        if !self.armed {
            if !pressed {
                self.armed = true;
                self.prev_pressed = false;
            }
            return WizardEvent::None;
        }

        if pressed && !self.prev_pressed {
            self.guess_at_press_start = self.guess();
        }
        self.prev_pressed = pressed;

        if !pressed {
            self.chord_seen = false;
        }

        if input.is_both_pressed() {
            self.chord_seen = true;
            let restored = self.guess_at_press_start;
            *self.guess_mut() = restored;
        } else if !self.chord_seen {
            if input.is_up_only() {
                self.nudge(CAL_NUDGE_MM);
            } else if input.is_down_only() {
                self.nudge(-CAL_NUDGE_MM);
            }
        }

        let both_short = input.is_both_short_pressed();
        let confirmed = both_short && !self.prev_both_short;
        self.prev_both_short = both_short;

        if !confirmed {
            return WizardEvent::None;
        }

        match self.step {
            CalibrationStep::AwaitingStartHeight => {
                self.pulse_count_at_start = pulse_count;
                self.end_guess_mm = clamp_guess(self.start_guess_mm + CAL_DEFAULT_SPAN_MM);
                // The confirming chord is still held.
                self.guess_at_press_start = self.end_guess_mm;
                self.step = CalibrationStep::AwaitingEndHeight;
                WizardEvent::Advanced
            }
            CalibrationStep::AwaitingEndHeight | CalibrationStep::Complete => self.finish(pulse_count),
        }
    }

    fn finish(&mut self, pulse_count: i32) -> WizardEvent {
        let pulses = pulse_count.wrapping_sub(self.pulse_count_at_start).unsigned_abs() as f32;
        let delta = self.end_guess_mm - self.start_guess_mm;
        let delta = if delta < 0.0 { -delta } else { delta };

        if pulses == 0.0 || delta == 0.0 {
            return WizardEvent::Rejected;
        }

        let pulses_per_mm = pulses / delta;
        if !is_valid_scale(pulses_per_mm) {
            return WizardEvent::Rejected;
        }

        self.step = CalibrationStep::Complete;
        WizardEvent::Completed {
            pulses_per_mm,
            end_height_mm: self.end_guess_mm,
        }
    }

    fn guess(&self) -> f32 {
        match self.step {
            CalibrationStep::AwaitingStartHeight => self.start_guess_mm,
            _ => self.end_guess_mm,
        }
    }

    fn guess_mut(&mut self) -> &mut f32 {
        match self.step {
            CalibrationStep::AwaitingStartHeight => &mut self.start_guess_mm,
            _ => &mut self.end_guess_mm,
        }
    }

    fn nudge(&mut self, delta_mm: f32) {
        let guess = self.guess_mut();
        *guess = clamp_guess(*guess + delta_mm);
    }
}

#[inline]
fn clamp_guess(mm: f32) -> f32 {
    mm.clamp(CAL_MIN_HEIGHT_MM, CAL_MAX_HEIGHT_MM)
}
