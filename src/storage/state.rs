// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Write-through owner of the [`CalibrationRecord`].
//!
//! Every setter validates its input, mutates the in-RAM record, and writes the whole record back
//! before returning. Rejected input leaves the record untouched and does not write. A failed
//! write keeps the new value in RAM, so the desk keeps working from memory.

use embedded_storage::Storage;
#[cfg(not(test))]
use micromath::F32Ext;

use super::record::{CalibrationRecord, RECORD_LEN};
use super::Error;
use crate::config::{HEIGHT_PERSIST_EPSILON_MM, PRESET_COUNT};
use crate::sensors::is_valid_scale;

pub struct PersistentState<S> {
    storage: S,
    base: u32,
    record: CalibrationRecord,
    /// Raw height as last written, for coalescing height updates.
    persisted_raw_height: f32,
}

impl<S: Storage> PersistentState<S> {
    /// Wrap a storage region. The record starts at defaults until [`load`](Self::load).
    pub fn new(storage: S, base: u32) -> Self {
        let record = CalibrationRecord::default();
        Self {
            storage,
            base,
            persisted_raw_height: record.raw_height,
            record,
        }
    }

    /// Read and sanitize the stored record.
    pub fn load(&mut self) -> Result<&CalibrationRecord, Error<S::Error>> {
        let mut buf = [0u8; RECORD_LEN];
        self.storage.read(self.base, &mut buf).map_err(Error::Storage)?;

        self.record = CalibrationRecord::from_bytes(&buf);
        self.persisted_raw_height = self.record.raw_height;
        Ok(&self.record)
    }

    /// Write the full record.
    pub fn save(&mut self) -> Result<(), Error<S::Error>> {
        let buf = self.record.to_bytes();
        self.storage.write(self.base, &buf).map_err(Error::Storage)?;

        self.persisted_raw_height = self.record.raw_height;
        Ok(())
    }

    #[inline]
    pub fn record(&self) -> &CalibrationRecord {
        &self.record
    }

    #[inline]
    pub fn is_calibrated(&self) -> bool {
        self.record.is_calibrated
    }

    /// Displayed height, raw plus offset (mm).
    #[inline]
    pub fn current_height(&self) -> f32 {
        self.record.current_height()
    }

    #[inline]
    pub fn raw_height(&self) -> f32 {
        self.record.raw_height
    }

    #[inline]
    pub fn height_offset(&self) -> f32 {
        self.record.height_offset
    }

    #[inline]
    pub fn scale_factor(&self) -> f32 {
        self.record.scale_factor
    }

    /// Saved height of slot `index`, `None` if out of range.
    pub fn preset(&self, index: usize) -> Option<f32> {
        self.record.presets.get(index).copied()
    }

    #[inline]
    pub fn current_preset(&self) -> usize {
        self.record.current_preset as usize
    }

    pub fn set_calibrated(&mut self, calibrated: bool) -> Result<(), Error<S::Error>> {
        self.record.is_calibrated = calibrated;
        self.save()
    }

    pub fn set_height_offset(&mut self, offset_mm: f32) -> Result<(), Error<S::Error>> {
        if !offset_mm.is_finite() {
            return Ok(());
        }
        self.record.height_offset = offset_mm;
        self.save()
    }

    pub fn adjust_height_offset(&mut self, delta_mm: f32) -> Result<(), Error<S::Error>> {
        self.set_height_offset(self.record.height_offset + delta_mm)
    }

    /// Store `height_mm` into slot `index`.
    pub fn save_preset(&mut self, index: usize, height_mm: f32) -> Result<(), Error<S::Error>> {
        if index >= PRESET_COUNT || !height_mm.is_finite() {
            return Ok(());
        }
        self.record.presets[index] = height_mm;
        self.save()
    }

    pub fn set_current_preset(&mut self, index: usize) -> Result<(), Error<S::Error>> {
        if index >= PRESET_COUNT {
            return Ok(());
        }
        self.record.current_preset = index as u8;
        self.save()
    }

    /// Step the selected slot, wrapping in both directions.
    pub fn cycle_preset(&mut self, forward: bool) -> Result<(), Error<S::Error>> {
        let current = self.current_preset();
        let next = if forward {
            (current + 1) % PRESET_COUNT
        } else {
            (current + PRESET_COUNT - 1) % PRESET_COUNT
        };
        self.set_current_preset(next)
    }

    pub fn set_scale_factor(&mut self, pulses_per_mm: f32) -> Result<(), Error<S::Error>> {
        if !is_valid_scale(pulses_per_mm) {
            return Ok(());
        }
        self.record.scale_factor = pulses_per_mm;
        self.save()
    }

    /// Track the raw sensor height.
    ///
    /// The in-RAM value always follows; storage is only written once the height has moved at
    /// least [`HEIGHT_PERSIST_EPSILON_MM`] from the last written value.
    pub fn update_height(&mut self, raw_mm: f32) -> Result<(), Error<S::Error>> {
        if !raw_mm.is_finite() {
            return Ok(());
        }
        self.record.raw_height = raw_mm;

        if (raw_mm - self.persisted_raw_height).abs() >= HEIGHT_PERSIST_EPSILON_MM {
            self.save()
        } else {
            Ok(())
        }
    }

    /// Commit a calibration result: scale, offset and the calibrated flag in one write.
    pub fn apply_calibration(
        &mut self,
        pulses_per_mm: f32,
        offset_mm: f32,
    ) -> Result<(), Error<S::Error>> {
        if !is_valid_scale(pulses_per_mm) || !offset_mm.is_finite() {
            return Ok(());
        }
        self.record.scale_factor = pulses_per_mm;
        self.record.height_offset = offset_mm;
        self.record.is_calibrated = true;
        self.save()
    }

    /// Release the storage region.
    pub fn free(self) -> S {
        self.storage
    }
}
