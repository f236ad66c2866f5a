// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! USART terminal used as the desk display.
//!
//! Each display intent becomes one CRLF-terminated line. The controller repeats its intent every
//! tick, so a line is only written when what it would show has changed.
//!
//! To access the terminal on the host machine, connect to the debug USB port and use
//! ```text
//! $ screen /dev/tty.usbmodem* 115200
//! ```
//!
//! To close the debug terminal, press `Ctrl+A` then `Ctrl+\` then `y`.

use core::convert::Infallible;
use core::fmt::{self, Write};

use micromath::F32Ext;
use nb::block;
use stm32f7xx_hal::{
    prelude::*,
    serial::{Instance, Pins, Serial, Tx},
};

use crate::display::{CalibrationStep, DisplaySink};

/// Last line written, at display resolution (0.1 mm).
#[derive(Copy, Clone, PartialEq)]
enum Shown {
    Height { tenths: i32, moving: bool },
    Preset { number: u8, tenths: i32 },
    Calibration { step: CalibrationStep, start: i32, end: i32, pulses: i32 },
    Status,
}

pub struct UsartDisplay<U: Instance> {
    tx: Tx<U>,
    shown: Option<Shown>,
}

impl<U: Instance> UsartDisplay<U> {
    pub fn new<PINS: Pins<U>>(serial: Serial<U, PINS>) -> Self {
        let (tx, _rx) = serial.split();
        Self { tx, shown: None }
    }

    #[inline]
    fn write_byte(&mut self, b: u8) {
        let _ = block!(self.tx.write(b));
    }

    /// Write string and CRLF terminator.
    pub fn println(&mut self, s: &str) {
        for &b in s.as_bytes().iter().chain(b"\r\n") {
            self.write_byte(b);
        }
    }

    /// Block until the hardware TX FIFO/drain is flushed.
    #[inline]
    pub fn flush(&mut self) {
        let _ = block!(self.tx.flush());
    }

    /// Returns false if `next` is already on screen.
    fn replace(&mut self, next: Shown) -> bool {
        if self.shown == Some(next) {
            return false;
        }
        self.shown = Some(next);
        true
    }
}

impl<U: Instance> fmt::Write for UsartDisplay<U> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for &b in s.as_bytes() {
            self.write_byte(b);
        }
        Ok(())
    }
}

#[inline]
fn tenths(mm: f32) -> i32 {
    (mm * 10.0).round() as i32
}

impl<U: Instance> DisplaySink for UsartDisplay<U> {
    type Error = Infallible;

    fn init(&mut self) -> Result<(), Self::Error> {
        self.println("");
        self.println("LiftDesk ready");
        Ok(())
    }

    fn show_height(&mut self, height_mm: f32, moving: bool) {
        let tenths = tenths(height_mm);
        if !self.replace(Shown::Height { tenths, moving }) {
            return;
        }
        let marker = if moving { " *" } else { "" };
        let _ = write!(self, "Height {:.1} mm{}\r\n", height_mm, marker);
    }

    fn show_preset_mode(&mut self, number: u8, height_mm: f32) {
        if !self.replace(Shown::Preset {
            number,
            tenths: tenths(height_mm),
        }) {
            return;
        }
        if height_mm > 0.0 {
            let _ = write!(self, "Preset {}: {:.1} mm\r\n", number, height_mm);
        } else {
            let _ = write!(self, "Preset {}: empty\r\n", number);
        }
    }

    fn show_calibration_step(
        &mut self,
        step: CalibrationStep,
        start_guess_mm: f32,
        end_guess_mm: f32,
        pulses_since_start: i32,
    ) {
        let start = tenths(start_guess_mm);
        let end = tenths(end_guess_mm);
        if !self.replace(Shown::Calibration {
            step,
            start,
            end,
            pulses: pulses_since_start,
        }) {
            return;
        }

        let _ = match step {
            CalibrationStep::AwaitingStartHeight => write!(
                self,
                "Cal {}/3: start height {:.0} mm\r\n",
                step.number(),
                start_guess_mm
            ),
            CalibrationStep::AwaitingEndHeight => write!(
                self,
                "Cal {}/3: end height {:.0} mm ({} pulses)\r\n",
                step.number(),
                end_guess_mm,
                pulses_since_start
            ),
            CalibrationStep::Complete => write!(
                self,
                "Cal {}/3: {} pulses over {:.0} mm\r\n",
                step.number(),
                pulses_since_start,
                end_guess_mm - start_guess_mm
            ),
        };
    }

    fn show_status(&mut self, message: &str, success: bool) {
        self.shown = Some(Shown::Status);
        let tag = if success { "ok" } else { "!!" };
        let _ = write!(self, "[{}] {}\r\n", tag, message);
    }
}
