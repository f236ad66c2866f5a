// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Actuator Abstractions
//!
//! This module contains the motor-level wrapper that sits between the controller and the board's
//! H-bridge outputs.
//!
//! ## Modules
//!
//! - [`drive`] - Ramped, direction-safe PWM drive for the lift motor.

pub mod drive;

pub use drive::{Direction, HBridge, MotorDrive};
