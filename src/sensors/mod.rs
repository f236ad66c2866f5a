// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Position and Limit Sensing
//!
//! The controller is written once against [`PositionSensor`]; each sensor variant converts its own
//! pulse source into a signed count and divides by the calibrated scale factor to get millimeters.
//!
//! ## Modules
//!
//! - [`optical`] - Single-channel slotted-disc pulse counter.
//! - [`quadrature`] - Two-channel rotary quadrature encoder sampled in software.
//! - [`limit`] - Bottom limit switch.

pub mod limit;
pub mod optical;
pub mod quadrature;

pub use limit::LimitSwitch;
pub use optical::OpticalPulseCounter;
pub use quadrature::QuadratureEncoder;

use crate::config::MIN_SCALE_PULSES_PER_MM;

/// Direction the desk is being driven, as far as the controller knows.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Travel {
    Up,
    Down,
    Stopped,
}

/// Common capability of every height sensor.
pub trait PositionSensor {
    /// Sample the sensor. Called once per control tick.
    fn update(&mut self, now_ms: u32);

    /// Signed pulse count since the last reference reset.
    fn pulse_count(&self) -> i32;

    /// Current scale factor in pulses per millimeter.
    fn scale(&self) -> f32;

    /// Change the scale factor. Non-positive or non-finite values are ignored.
    fn set_scale(&mut self, pulses_per_mm: f32);

    /// Re-reference the pulse count.
    fn reset_to(&mut self, count: i32);

    /// Height in millimeters, `pulse_count / scale`.
    fn height_mm(&self) -> f32 {
        self.pulse_count() as f32 / self.scale()
    }

    /// Direction hint for sensors that cannot sense direction themselves.
    fn note_travel(&mut self, _travel: Travel) {}
}

/// True for scale factors that may be committed.
#[inline]
pub fn is_valid_scale(pulses_per_mm: f32) -> bool {
    pulses_per_mm.is_finite() && pulses_per_mm >= MIN_SCALE_PULSES_PER_MM
}
