// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Lift motor H-bridge on TIM4.
//!
//! CH1 (PD12) drives the raise input, CH2 (PD13) the lower input. Both channels run in PWM mode 1
//! with ARR = 255, so a compare value is the duty directly.

use stm32f7xx_hal::{
    gpio::{gpiod, Alternate},
    pac,
};

use crate::config::MAX_DUTY;
use crate::motors::HBridge;

pub struct PwmBridge {
    tim: pac::TIM4,
}

impl PwmBridge {
    /// Configure TIM4 for two-channel PWM at roughly `pwm_hz`, both outputs off.
    ///
    /// `timer_clock_hz` is the APB1 timer clock.
    pub fn tim4(
        tim4: pac::TIM4,
        _pins: (gpiod::PD12<Alternate<2>>, gpiod::PD13<Alternate<2>>),
        timer_clock_hz: u32,
        pwm_hz: u32,
    ) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb1enr.modify(|_, w| w.tim4en().set_bit());

        let tim = tim4;
        tim.cr1.modify(|_, w| w.cen().clear_bit());

        let period = MAX_DUTY as u32 + 1;
        let psc = (timer_clock_hz / (pwm_hz.max(1) * period)).saturating_sub(1);
        tim.psc.write(|w| unsafe { w.bits(psc.min(0xFFFF)) });
        tim.arr.write(|w| unsafe { w.bits(MAX_DUTY as u32) });

        // OC1M/OC2M = PWM mode 1, preload on both channels
        const PWM1_PRELOAD: u32 = (0b110 << 4) | (1 << 3);
        tim.ccmr1_output()
            .write(|w| unsafe { w.bits(PWM1_PRELOAD | (PWM1_PRELOAD << 8)) });

        tim.ccr1.write(|w| unsafe { w.bits(0) });
        tim.ccr2.write(|w| unsafe { w.bits(0) });

        // CC1E | CC2E, active high
        tim.ccer.write(|w| unsafe { w.bits((1 << 0) | (1 << 4)) });

        tim.egr.write(|w| w.ug().set_bit());
        tim.cr1.modify(|_, w| w.arpe().set_bit().cen().set_bit());

        Self { tim }
    }

    /// Consume the wrapper and return the timer.
    pub fn free(self) -> pac::TIM4 {
        self.tim
    }
}

impl HBridge for PwmBridge {
    #[inline]
    fn set_forward_duty(&mut self, duty: u8) {
        self.tim.ccr1.write(|w| unsafe { w.bits(duty as u32) });
    }

    #[inline]
    fn set_backward_duty(&mut self, duty: u8) {
        self.tim.ccr2.write(|w| unsafe { w.bits(duty as u32) });
    }
}
