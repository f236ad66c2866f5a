// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Persistent State
//!
//! Calibration, presets and the last known height, kept in a small non-volatile region behind
//! [`embedded_storage`].
//!
//! ## Modules
//!
//! - [`record`] - The persisted record and its byte-stable layout.
//! - [`state`] - Write-through owner of the record.

pub mod record;
pub mod state;

pub use record::{CalibrationRecord, RECORD_LEN};
pub use state::PersistentState;

/// Storage errors, generic over the backend's error type.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Error<E> {
    /// The backend rejected a read or write.
    Storage(E),
}
