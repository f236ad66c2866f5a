// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

#![no_main]
#![no_std]

use cortex_m::delay::Delay;
use cortex_m_rt::entry;
use defmt_rtt as _;
use embedded_hal::delay::DelayNs;
use panic_halt as _;

use hal::{
    pac,
    prelude::*,
    serial::{Config, Serial},
};
use stm32f7xx_hal as hal;

use liftdesk::config::{DEFAULT_SCALE_PULSES_PER_MM, STORAGE_BASE, TICK_MS};
use liftdesk::control::{DeskController, RawInputs};
use liftdesk::hw::{BackupSram, BoardPins, PwmBridge, TimerEncoder, UsartDisplay};
use liftdesk::motors::MotorDrive;
use liftdesk::storage::PersistentState;

/// Lift motor PWM frequency.
const PWM_HZ: u32 = 20_000;

/// SysTick delay for the blocking calibration dwells.
struct SysDelay(Delay);

impl DelayNs for SysDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.0.delay_us(ns.div_ceil(1_000));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.0.delay_ms(ms);
    }
}

#[entry]
fn main() -> ! {
    // Peripherals
    let dp = pac::Peripherals::take().unwrap();
    let cp = cortex_m::Peripherals::take().unwrap();

    // Clocks
    let rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.freeze();

    let pins = BoardPins::new(dp.GPIOA, dp.GPIOD, dp.GPIOE);

    // USART1 (display terminal)
    let usart_cfg = Config {
        baud_rate: 115_200.bps(),
        ..Default::default()
    };
    let serial = Serial::new(
        dp.USART1,
        (pins.usart1.tx, pins.usart1.rx),
        &clocks,
        usart_cfg,
    );
    let display = UsartDisplay::new(serial);

    // TIM2 encoder, TIM4 H-bridge
    let sensor = TimerEncoder::tim2(
        dp.TIM2,
        (pins.encoder.tim2_ch1, pins.encoder.tim2_ch2),
        DEFAULT_SCALE_PULSES_PER_MM,
    );
    let bridge = PwmBridge::tim4(
        dp.TIM4,
        (pins.motor.raise, pins.motor.lower),
        clocks.timclk1().raw(),
        PWM_HZ,
    );

    let storage = BackupSram::new(dp.PWR);
    let delay = SysDelay(Delay::new(cp.SYST, clocks.sysclk().raw()));

    let mut desk = DeskController::new(
        sensor,
        MotorDrive::new(bridge),
        PersistentState::new(storage, STORAGE_BASE),
        display,
        delay,
    );

    let handset = pins.handset;
    let tick_cycles = clocks.sysclk().raw() / 1_000 * TICK_MS;
    let mut now_ms: u32 = 0;

    desk.init(now_ms);
    defmt::info!("liftdesk running, {} ms tick", TICK_MS);

    loop {
        let raw = RawInputs {
            up_level: handset.up.is_high(),
            down_level: handset.down.is_high(),
            limit_level: handset.limit.is_high(),
        };
        desk.update(raw, now_ms);

        cortex_m::asm::delay(tick_cycles);
        now_ms = now_ms.wrapping_add(TICK_MS);
    }
}
