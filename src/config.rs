// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Timing and tuning constants for the desk controller.
//!
//! All durations are in milliseconds and are compared against the `now_ms` timestamp handed to
//! [`DeskController::update`](crate::control::DeskController::update).

// ----- Control loop -----

/// Nominal control tick period.
pub const TICK_MS: u32 = 10;

// ----- Buttons -----

/// Raw level must be stable this long before the debounced level changes.
pub const DEBOUNCE_MS: u32 = 50;
/// Single-button long press.
pub const LONG_PRESS_MS: u32 = 1_000;
/// Both buttons held, measured per button.
pub const BOTH_LONG_PRESS_MS: u32 = 2_000;
/// Single- or two-button very long press.
pub const VERY_LONG_PRESS_MS: u32 = 5_000;

// ----- Motor -----

/// Full PWM duty.
pub const MAX_DUTY: u8 = 255;
/// Manual movement speed (~78% duty).
pub const MOTOR_SPEED: u8 = 200;
/// Slower speed used when recalling a preset.
pub const PRESET_MOVE_SPEED: u8 = 150;
/// Duty change applied per ramp interval.
pub const RAMP_STEP: u8 = 10;
/// Minimum time between two ramp steps.
pub const RAMP_INTERVAL_MS: u32 = 20;

// ----- Position sensor -----

/// Scale factor used until the desk is calibrated (pulses per mm).
pub const DEFAULT_SCALE_PULSES_PER_MM: f32 = 10.0;
/// Smallest scale factor accepted anywhere. Guards the height division.
pub const MIN_SCALE_PULSES_PER_MM: f32 = 1.0e-3;
/// No sensor pulse for this long means the desk is standing still.
pub const MOVEMENT_TIMEOUT_MS: u32 = 100;

// ----- Persistence -----

/// Number of preset slots.
pub const PRESET_COUNT: usize = 3;
/// Raw height changes smaller than this are not written back to storage.
pub const HEIGHT_PERSIST_EPSILON_MM: f32 = 1.0;
/// Storage offset of the calibration record.
pub const STORAGE_BASE: u32 = 0;

// ----- Preset mode -----

/// Preset mode exits without saving after this long without a button press.
pub const PRESET_TIMEOUT_MS: u32 = 5_000;
/// Safety limit on a single preset recall movement.
pub const RECALL_TIMEOUT_MS: u32 = 30_000;
/// Recall counts as arrived within this distance of the target.
pub const RECALL_TOLERANCE_MM: f32 = 2.0;

// ----- Calibration wizard -----

/// Lower bound for height guesses.
pub const CAL_MIN_HEIGHT_MM: f32 = 600.0;
/// Upper bound for height guesses.
pub const CAL_MAX_HEIGHT_MM: f32 = 1_200.0;
/// Start guess on an uncalibrated desk.
pub const CAL_DEFAULT_START_MM: f32 = 700.0;
/// End guess is seeded this far above the confirmed start guess.
pub const CAL_DEFAULT_SPAN_MM: f32 = 100.0;
/// Guess adjustment per tick while a button is held.
pub const CAL_NUDGE_MM: f32 = 1.0;
/// Calibration result stays on screen this long.
pub const CAL_RESULT_DWELL_MS: u32 = 2_000;
/// Success message dwell after calibration.
pub const CAL_SAVED_DWELL_MS: u32 = 1_500;
/// The wizard is abandoned after this long without a button press.
pub const CAL_IDLE_TIMEOUT_MS: u32 = 120_000;

// ----- Display -----

/// Regular height/preset screens are held back this long after a status message.
pub const STATUS_HOLD_MS: u32 = 1_500;
