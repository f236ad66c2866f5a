// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Lift spindle encoder on TIM2 in encoder mode.
//!
//! The timer counts both edges of both channels in hardware, so no pulses are lost between control
//! ticks. The 32-bit counter is read as a signed position.

use stm32f7xx_hal::{
    gpio::{gpioa, Alternate},
    pac,
};

use crate::config::DEFAULT_SCALE_PULSES_PER_MM;
use crate::sensors::{is_valid_scale, PositionSensor};

pub struct TimerEncoder {
    tim: pac::TIM2,
    pulses_per_mm: f32,
}

impl TimerEncoder {
    /// Configure TIM2 as a quadrature encoder with full 32-bit range.
    pub fn tim2(
        tim2: pac::TIM2,
        _pins: (gpioa::PA0<Alternate<1>>, gpioa::PA1<Alternate<1>>),
        pulses_per_mm: f32,
    ) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb1enr.modify(|_, w| w.tim2en().set_bit());

        let tim = tim2;

        // Disable counter while configuring
        tim.cr1.modify(|_, w| w.cen().clear_bit());

        tim.arr.write(|w| w.bits(0xFFFF_FFFF));

        // Encoder mode 3: count on both TI1 and TI2
        tim.smcr.modify(|_, w| w.sms().bits(0b011));
        tim.ccmr1_input().modify(|_, w| w.cc1s().ti1().cc2s().ti2());

        tim.ccer.modify(|_, w| {
            w.cc1p()
                .clear_bit()
                .cc2p()
                .clear_bit()
                .cc1e()
                .set_bit()
                .cc2e()
                .set_bit()
        });

        tim.cnt.write(|w| w.bits(0));
        tim.cr1.modify(|_, w| w.cen().set_bit());

        let pulses_per_mm = if is_valid_scale(pulses_per_mm) {
            pulses_per_mm
        } else {
            DEFAULT_SCALE_PULSES_PER_MM
        };

        Self { tim, pulses_per_mm }
    }

    /// Raw 32-bit counter value.
    #[inline]
    pub fn raw(&self) -> u32 {
        self.tim.cnt.read().cnt().bits()
    }

    /// Consume the wrapper and return the timer.
    #[inline]
    pub fn free(self) -> pac::TIM2 {
        self.tim
    }
}

impl PositionSensor for TimerEncoder {
    // Counting happens in hardware.
    fn update(&mut self, _now_ms: u32) {}

    #[inline]
    fn pulse_count(&self) -> i32 {
        self.raw() as i32
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
        self.tim.cnt.write(|w| w.bits(count as u32));
    }
}
