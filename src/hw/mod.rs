// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # STM32F777 Bindings
//!
//! Board-side implementations of the controller's hardware seams.
//!
//! ## Modules
//!
//! - [`encoder`] - TIM2 hardware quadrature encoder as a [`PositionSensor`](crate::sensors::PositionSensor).
//! - [`pwm`] - TIM4 CH1/CH2 PWM H-bridge.
//! - [`backup_sram`] - Battery-backed SRAM as the calibration store.
//! - [`usart`] - USART terminal as the desk display.
//! - [`pins`] - Board pin assignments.

pub mod backup_sram;
pub mod encoder;
pub mod pins;
pub mod pwm;
pub mod usart;

pub use backup_sram::BackupSram;
pub use encoder::TimerEncoder;
pub use pins::BoardPins;
pub use pwm::PwmBridge;
pub use usart::UsartDisplay;
