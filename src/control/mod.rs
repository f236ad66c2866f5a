// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Desk Control
//!
//! The top-level state machine and the interactive sessions it runs.
//!
//! ## Modules
//!
//! - [`desk_controller`] - Per-tick orchestrator owning every desk component.
//! - [`mode`] - Controller modes and movement commands.
//! - [`calibration`] - Two-step scale-factor calibration wizard.
//! - [`preset`] - Preset selection, save and recall gestures.

pub mod calibration;
pub mod desk_controller;
pub mod mode;
pub mod preset;

pub use calibration::{CalibrationWizard, WizardEvent};
pub use desk_controller::{DeskController, RawInputs};
pub use mode::{ControllerMode, ModeKind, Movement};
pub use preset::{PresetEvent, PresetSession};
