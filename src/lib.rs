// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # LiftDesk Firmware
//!
//! Controller for a motorized height-adjustable desk: two handset buttons, a height sensor on the
//! lift spindle, an H-bridge driven lift motor, a small non-volatile record and a status display.
//! The controller logic is hardware-independent and runs on the host for testing; the STM32F777
//! board bindings live behind the `board` feature.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`input`] | Debounced buttons and two-button gestures |
//! | [`sensors`] | Height sensors and the bottom limit switch |
//! | [`motors`] | Ramped H-bridge motor drive |
//! | [`storage`] | Persisted calibration record |
//! | [`display`] | Display intents |
//! | [`control`] | Desk mode state machine, calibration and presets |
//! | [`config`] | Timing and tuning constants |
//! | `hw` | MCU-level bindings (feature `board`) |
//!
//! ## Getting Started
//!
//! Run the controller tests on the host:
//!
//! ```bash
//! cargo test
//! ```
//!
//! Flash the board:
//!
//! ```bash
//! cargo run --release --features board --target thumbv7em-none-eabihf
//! ```
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//! See the `LICENSE` file in the repository root for full terms.
//!
//! © 2025–2026 Christopher Liu

#![cfg_attr(not(test), no_std)]

mod fmt;

pub mod config;
pub mod control;
pub mod display;
pub mod input;
pub mod motors;
pub mod sensors;
pub mod storage;

#[cfg(feature = "board")]
pub mod hw;

#[cfg(test)]
mod testing;
