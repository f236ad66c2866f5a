// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Pin definitions for the STM32F777 desk controller board.

use stm32f7xx_hal::{
    gpio::{gpioa, gpiod, gpioe, Alternate, Input, PullUp},
    pac,
    prelude::*,
};

/// All board pins. Construct this once at startup using:
///
/// ```ignore
/// let pins = BoardPins::new(dp.GPIOA, dp.GPIOD, dp.GPIOE);
/// ```
pub struct BoardPins {
    pub usart1: Usart1Pins,
    pub encoder: EncoderPins,
    pub motor: MotorPins,
    pub handset: HandsetPins,
}

pub struct Usart1Pins {
    pub tx: gpioa::PA9<Alternate<7>>,
    pub rx: gpioa::PA10<Alternate<7>>,
}

/// TIM2 quadrature encoder inputs on the lift spindle
pub struct EncoderPins {
    pub tim2_ch1: gpioa::PA0<Alternate<1>>,
    pub tim2_ch2: gpioa::PA1<Alternate<1>>,
}

/// H-bridge inputs
pub struct MotorPins {
    pub raise: gpiod::PD12<Alternate<2>>, // TIM4_CH1 (PWM)
    pub lower: gpiod::PD13<Alternate<2>>, // TIM4_CH2 (PWM)
}

/// Handset buttons and bottom limit switch, all to ground with pull-ups
pub struct HandsetPins {
    pub up: gpioe::PE2<Input<PullUp>>,
    pub down: gpioe::PE3<Input<PullUp>>,
    pub limit: gpioe::PE4<Input<PullUp>>,
}

impl BoardPins {
    /// Create all named pins from raw GPIO peripherals.
    pub fn new(gpioa: pac::GPIOA, gpiod: pac::GPIOD, gpioe: pac::GPIOE) -> Self {
        let gpioa = gpioa.split();
        let gpiod = gpiod.split();
        let gpioe = gpioe.split();

        Self {
            usart1: Usart1Pins {
                tx: gpioa.pa9.into_alternate::<7>(),
                rx: gpioa.pa10.into_alternate::<7>(),
            },

            encoder: EncoderPins {
                tim2_ch1: gpioa.pa0.into_alternate::<1>(),
                tim2_ch2: gpioa.pa1.into_alternate::<1>(),
            },

            motor: MotorPins {
                raise: gpiod.pd12.into_alternate::<2>(),
                lower: gpiod.pd13.into_alternate::<2>(),
            },

            handset: HandsetPins {
                up: gpioe.pe2.into_pull_up_input(),
                down: gpioe.pe3.into_pull_up_input(),
                limit: gpioe.pe4.into_pull_up_input(),
            },
        }
    }
}
