// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Persisted calibration record and its byte layout.
//!
//! The layout is positional and shared with earlier firmware revisions, so field order and widths
//! must not change. Multi-byte values are little-endian.
//!
//! | Offset | Width | Field |
//! | ------ | ----- | ----- |
//! | 0  | 1  | calibrated flag (1 = calibrated) |
//! | 1  | 4  | raw height, f32 mm |
//! | 5  | 4  | height offset, f32 mm |
//! | 9  | 12 | presets, 3 x f32 mm |
//! | 21 | 1  | selected preset index |
//! | 22 | 4  | scale factor, f32 pulses/mm |

use crate::config::{DEFAULT_SCALE_PULSES_PER_MM, PRESET_COUNT};
use crate::sensors::is_valid_scale;

/// Field offsets relative to the record base.
pub mod offset {
    pub const FLAG: usize = 0;
    pub const RAW_HEIGHT: usize = 1;
    pub const HEIGHT_OFFSET: usize = 5;
    pub const PRESETS: usize = 9;
    pub const CURRENT_PRESET: usize = 21;
    pub const SCALE: usize = 22;
}

/// Total record size in bytes.
pub const RECORD_LEN: usize = 26;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CalibrationRecord {
    pub is_calibrated: bool,
    /// Last raw sensor height (mm).
    pub raw_height: f32,
    /// Added to the raw height for display (mm).
    pub height_offset: f32,
    /// Saved heights (mm); 0.0 means unset.
    pub presets: [f32; PRESET_COUNT],
    /// Selected preset, always `< PRESET_COUNT`.
    pub current_preset: u8,
    /// Sensor pulses per mm, always positive.
    pub scale_factor: f32,
}

impl Default for CalibrationRecord {
    fn default() -> Self {
        Self {
            is_calibrated: false,
            raw_height: 0.0,
            height_offset: 0.0,
            presets: [0.0; PRESET_COUNT],
            current_preset: 0,
            scale_factor: DEFAULT_SCALE_PULSES_PER_MM,
        }
    }
}

impl CalibrationRecord {
    /// Raw height plus offset.
    #[inline]
    pub fn current_height(&self) -> f32 {
        self.raw_height + self.height_offset
    }

    pub fn to_bytes(&self) -> [u8; RECORD_LEN] {
        let mut buf = [0u8; RECORD_LEN];

        buf[offset::FLAG] = self.is_calibrated as u8;
        put_f32(&mut buf, offset::RAW_HEIGHT, self.raw_height);
        put_f32(&mut buf, offset::HEIGHT_OFFSET, self.height_offset);
        for (i, preset) in self.presets.iter().enumerate() {
            put_f32(&mut buf, offset::PRESETS + i * 4, *preset);
        }
        buf[offset::CURRENT_PRESET] = self.current_preset;
        put_f32(&mut buf, offset::SCALE, self.scale_factor);

        buf
    }

    /// Decode a stored record, replacing anything that would break an invariant.
    ///
    /// Erased storage (all 0xFF) decodes to the default record.
    pub fn from_bytes(buf: &[u8; RECORD_LEN]) -> Self {
        let mut presets = [0.0; PRESET_COUNT];
        for (i, preset) in presets.iter_mut().enumerate() {
            *preset = finite_or_zero(get_f32(buf, offset::PRESETS + i * 4));
        }

        let current_preset = buf[offset::CURRENT_PRESET];
        let current_preset = if (current_preset as usize) < PRESET_COUNT {
            current_preset
        } else {
            0
        };

        let scale_factor = get_f32(buf, offset::SCALE);
        let scale_factor = if is_valid_scale(scale_factor) {
            scale_factor
        } else {
            DEFAULT_SCALE_PULSES_PER_MM
        };

        Self {
            is_calibrated: buf[offset::FLAG] == 1,
            raw_height: finite_or_zero(get_f32(buf, offset::RAW_HEIGHT)),
            height_offset: finite_or_zero(get_f32(buf, offset::HEIGHT_OFFSET)),
            presets,
            current_preset,
            scale_factor,
        }
    }
}

#[inline]
fn put_f32(buf: &mut [u8; RECORD_LEN], at: usize, value: f32) {
    buf[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

#[inline]
fn get_f32(buf: &[u8; RECORD_LEN], at: usize) -> f32 {
    f32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

#[inline]
fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CalibrationRecord {
        CalibrationRecord {
            is_calibrated: true,
            raw_height: 81.5,
            height_offset: 640.25,
            presets: [720.0, 1_050.5, 0.0],
            current_preset: 1,
            scale_factor: 5.0,
        }
    }

    #[test]
    fn layout_is_positional() {
        let bytes = sample().to_bytes();
        assert_eq!(bytes[0], 1);
        assert_eq!(&bytes[1..5], &81.5f32.to_le_bytes());
        assert_eq!(&bytes[5..9], &640.25f32.to_le_bytes());
        assert_eq!(&bytes[9..13], &720.0f32.to_le_bytes());
        assert_eq!(&bytes[13..17], &1_050.5f32.to_le_bytes());
        assert_eq!(&bytes[17..21], &0.0f32.to_le_bytes());
        assert_eq!(bytes[21], 1);
        assert_eq!(&bytes[22..26], &5.0f32.to_le_bytes());
    }

    #[test]
    fn decode_reproduces_encoded_record() {
        let record = sample();
        assert_eq!(CalibrationRecord::from_bytes(&record.to_bytes()), record);
    }

    #[test]
    fn erased_storage_decodes_to_defaults() {
        let record = CalibrationRecord::from_bytes(&[0xFF; RECORD_LEN]);
        assert_eq!(record, CalibrationRecord::default());
    }

    #[test]
    fn out_of_range_fields_are_sanitized() {
        let mut bytes = sample().to_bytes();
        bytes[offset::CURRENT_PRESET] = 7;
        bytes[offset::SCALE..offset::SCALE + 4].copy_from_slice(&0.0f32.to_le_bytes());
        bytes[offset::FLAG] = 2;

        let record = CalibrationRecord::from_bytes(&bytes);
        assert_eq!(record.current_preset, 0);
        assert_eq!(record.scale_factor, DEFAULT_SCALE_PULSES_PER_MM);
        assert!(!record.is_calibrated);
        assert_eq!(record.presets, sample().presets);
    }

    #[test]
    fn current_height_includes_offset() {
        assert!((sample().current_height() - 721.75).abs() < 1e-4);
    }
}
