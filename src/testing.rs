// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Host-side doubles for the hardware seams, shared by the unit tests.

use embedded_hal::delay::DelayNs;
use embedded_storage::{ReadStorage, Storage};

use crate::display::{CalibrationStep, DisplaySink};
use crate::motors::HBridge;
use crate::sensors::{PositionSensor, Travel};

/// H-bridge that records every duty write.
#[derive(Debug, Default)]
pub struct RecordingBridge {
    pub forward: u8,
    pub backward: u8,
    log: Vec<(bool, u8)>,
    overlapped: bool,
}

impl RecordingBridge {
    /// Writes in order, `(is_forward, duty)`.
    pub fn log(&self) -> &[(bool, u8)] {
        &self.log
    }

    /// True if both outputs were ever non-zero at the same time.
    pub fn ever_overlapped(&self) -> bool {
        self.overlapped
    }

    fn check(&mut self) {
        if self.forward > 0 && self.backward > 0 {
            self.overlapped = true;
        }
    }
}

impl HBridge for RecordingBridge {
    fn set_forward_duty(&mut self, duty: u8) {
        self.forward = duty;
        self.log.push((true, duty));
        self.check();
    }

    fn set_backward_duty(&mut self, duty: u8) {
        self.backward = duty;
        self.log.push((false, duty));
        self.check();
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct MemError;

/// Erased (0xFF) byte region with a write counter and an injectable failure.
#[derive(Debug)]
pub struct MemStorage {
    bytes: Vec<u8>,
    writes: usize,
    failing: bool,
}

impl MemStorage {
    pub fn new() -> Self {
        Self {
            bytes: vec![0xFF; 64],
            writes: 0,
            failing: false,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    fn range(&self, offset: u32, len: usize) -> Result<core::ops::Range<usize>, MemError> {
        let start = offset as usize;
        let end = start + len;
        if self.failing || end > self.bytes.len() {
            return Err(MemError);
        }
        Ok(start..end)
    }
}

impl ReadStorage for MemStorage {
    type Error = MemError;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let range = self.range(offset, bytes.len())?;
        bytes.copy_from_slice(&self.bytes[range]);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.bytes.len()
    }
}

impl Storage for MemStorage {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        let range = self.range(offset, bytes.len())?;
        self.bytes[range].copy_from_slice(bytes);
        self.writes += 1;
        Ok(())
    }
}

/// One display intent.
#[derive(Clone, Debug, PartialEq)]
pub enum Screen {
    Height(f32, bool),
    Preset(u8, f32),
    Calibration(CalibrationStep, f32, f32, i32),
    Status(String, bool),
}

#[derive(Debug, Default)]
pub struct RecordingDisplay {
    pub screens: Vec<Screen>,
    pub fail_init: bool,
    pub refreshes: usize,
}

impl RecordingDisplay {
    pub fn last(&self) -> Option<&Screen> {
        self.screens.last()
    }

    /// Status messages in order.
    pub fn statuses(&self) -> Vec<(&str, bool)> {
        self.screens
            .iter()
            .filter_map(|s| match s {
                Screen::Status(msg, ok) => Some((msg.as_str(), *ok)),
                _ => None,
            })
            .collect()
    }

    pub fn has_status(&self, message: &str) -> bool {
        self.statuses().iter().any(|(m, _)| *m == message)
    }
}

impl DisplaySink for RecordingDisplay {
    type Error = ();

    fn init(&mut self) -> Result<(), Self::Error> {
        if self.fail_init {
            Err(())
        } else {
            Ok(())
        }
    }

    fn refresh(&mut self, _now_ms: u32) {
        self.refreshes += 1;
    }

    fn show_height(&mut self, height_mm: f32, moving: bool) {
        self.screens.push(Screen::Height(height_mm, moving));
    }

    fn show_preset_mode(&mut self, number: u8, height_mm: f32) {
        self.screens.push(Screen::Preset(number, height_mm));
    }

    fn show_calibration_step(
        &mut self,
        step: CalibrationStep,
        start_guess_mm: f32,
        end_guess_mm: f32,
        pulses_since_start: i32,
    ) {
        self.screens.push(Screen::Calibration(
            step,
            start_guess_mm,
            end_guess_mm,
            pulses_since_start,
        ));
    }

    fn show_status(&mut self, message: &str, success: bool) {
        self.screens.push(Screen::Status(message.into(), success));
    }
}

/// Delay that only adds up the requested time.
#[derive(Debug, Default)]
pub struct CountingDelay {
    pub total_ns: u64,
}

impl CountingDelay {
    pub fn total_ms(&self) -> u64 {
        self.total_ns / 1_000_000
    }
}

impl DelayNs for CountingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
    }

    fn delay_ms(&mut self, ms: u32) {
        self.total_ns += ms as u64 * 1_000_000;
    }
}

/// Sensor whose count is set directly by the test.
#[derive(Debug)]
pub struct ScriptedSensor {
    pub count: i32,
    pub pulses_per_mm: f32,
    pub travel: Travel,
    pub updates: usize,
}

impl ScriptedSensor {
    pub fn new(pulses_per_mm: f32) -> Self {
        Self {
            count: 0,
            pulses_per_mm,
            travel: Travel::Stopped,
            updates: 0,
        }
    }
}

impl PositionSensor for ScriptedSensor {
    fn update(&mut self, _now_ms: u32) {
        self.updates += 1;
    }

    fn pulse_count(&self) -> i32 {
        self.count
    }

    fn scale(&self) -> f32 {
        self.pulses_per_mm
    }

    fn set_scale(&mut self, pulses_per_mm: f32) {
        if crate::sensors::is_valid_scale(pulses_per_mm) {
            self.pulses_per_mm = pulses_per_mm;
        }
    }

    fn reset_to(&mut self, count: i32) {
        self.count = count;
    }

    fn note_travel(&mut self, travel: Travel) {
        self.travel = travel;
    }
}
