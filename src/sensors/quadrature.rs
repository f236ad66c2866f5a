// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Rotary quadrature encoder sampled in software.
//!
//! Each edge on channel A is one step; channel B decides the direction. Fine for the slow spindle
//! speeds of a desk lift at a 10 ms tick. Use the hardware timer encoder in `hw` when available.

use super::{is_valid_scale, PositionSensor};
use crate::config::DEFAULT_SCALE_PULSES_PER_MM;

/// Software quadrature decoder.
///
/// `ReadA` / `ReadB` return the raw channel levels.
pub struct QuadratureEncoder<ReadA, ReadB> {
    read_a: ReadA,
    read_b: ReadB,
    last_a: bool,
    position: i32,
    pulses_per_mm: f32,
}

impl<ReadA, ReadB> QuadratureEncoder<ReadA, ReadB>
where
    ReadA: FnMut() -> bool,
    ReadB: FnMut() -> bool,
{
    pub fn new(mut read_a: ReadA, read_b: ReadB, pulses_per_mm: f32) -> Self {
        let last_a = (read_a)();
        let pulses_per_mm = if is_valid_scale(pulses_per_mm) {
            pulses_per_mm
        } else {
            DEFAULT_SCALE_PULSES_PER_MM
        };

        Self {
            read_a,
            read_b,
            last_a,
            position: 0,
            pulses_per_mm,
        }
    }
}

impl<ReadA, ReadB> PositionSensor for QuadratureEncoder<ReadA, ReadB>
where
    ReadA: FnMut() -> bool,
    ReadB: FnMut() -> bool,
{
    fn update(&mut self, _now_ms: u32) {
        let a = (self.read_a)();
        let b = (self.read_b)();

        if a != self.last_a {
            if b != a {
                self.position = self.position.wrapping_add(1);
            } else {
                self.position = self.position.wrapping_sub(1);
            }
        }

        self.last_a = a;
    }

    #[inline]
    fn pulse_count(&self) -> i32 {
        self.position
    }

    #[inline]
    fn scale(&self) -> f32 {
        self.pulses_per_mm
    }

    fn set_scale(&mut self, pulses_per_mm: f32) {
        if is_valid_scale(pulses_per_mm) {
            self.pulses_per_mm = pulses_per_mm;
        }
    }

    fn reset_to(&mut self, count: i32) {
        self.position = count;
    }
}
