// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Display intents.
//!
//! The controller never draws. It hands semantic screens to a [`DisplaySink`] every tick and the
//! sink decides what and when to redraw.

/// Calibration screen variants.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationStep {
    /// Operator sets the current real height.
    AwaitingStartHeight,
    /// Operator moved the desk and sets the new real height.
    AwaitingEndHeight,
    /// Scale factor computed and saved.
    Complete,
}

impl CalibrationStep {
    /// 1-based step number for on-screen progress.
    pub fn number(self) -> u8 {
        match self {
            CalibrationStep::AwaitingStartHeight => 1,
            CalibrationStep::AwaitingEndHeight => 2,
            CalibrationStep::Complete => 3,
        }
    }
}

/// Sink for the controller's display intents.
pub trait DisplaySink {
    type Error;

    /// Bring the display up. A failure is reported once and the desk keeps working without it.
    fn init(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Animation hook, called at the start of every tick.
    fn refresh(&mut self, _now_ms: u32) {}

    /// Height readout. `moving` selects the movement indicator.
    fn show_height(&mut self, height_mm: f32, moving: bool);

    /// Preset selection screen. `number` is 1-based.
    fn show_preset_mode(&mut self, number: u8, height_mm: f32);

    /// Calibration wizard screen.
    fn show_calibration_step(
        &mut self,
        step: CalibrationStep,
        start_guess_mm: f32,
        end_guess_mm: f32,
        pulses_since_start: i32,
    );

    /// One-line status message.
    fn show_status(&mut self, message: &str, success: bool);
}
