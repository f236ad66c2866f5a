// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! 4 KiB battery-backed SRAM as an [`embedded_storage`] region.
//!
//! Survives resets and, with VBAT present, power loss. Contents are undefined on first boot; the
//! record loader sanitizes whatever it finds.

use embedded_storage::{ReadStorage, Storage};
use stm32f7xx_hal::pac;

const BKPSRAM_BASE: usize = 0x4002_4000;
const BKPSRAM_SIZE: usize = 4 * 1024;

/// Access outside the backup SRAM.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct OutOfBounds;

pub struct BackupSram {
    _pwr: pac::PWR,
}

impl BackupSram {
    /// Unlock the backup domain and clock the backup SRAM.
    pub fn new(pwr: pac::PWR) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb1enr.modify(|_, w| w.pwren().set_bit());

        // Backup domain write access
        pwr.cr1.modify(|_, w| w.dbp().set_bit());

        rcc.ahb1enr.modify(|_, w| w.bkpsramen().set_bit());

        // Keep contents on VBAT
        pwr.csr1.modify(|_, w| w.bre().set_bit());
        while pwr.csr1.read().brr().bit_is_clear() {}

        Self { _pwr: pwr }
    }

    fn span(offset: u32, len: usize) -> Result<usize, OutOfBounds> {
        let start = offset as usize;
        match start.checked_add(len) {
            Some(end) if end <= BKPSRAM_SIZE => Ok(BKPSRAM_BASE + start),
            _ => Err(OutOfBounds),
        }
    }
}

impl ReadStorage for BackupSram {
    type Error = OutOfBounds;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let addr = Self::span(offset, bytes.len())?;
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = unsafe { core::ptr::read_volatile((addr + i) as *const u8) };
        }
        Ok(())
    }

    fn capacity(&self) -> usize {
        BKPSRAM_SIZE
    }
}

impl Storage for BackupSram {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        let addr = Self::span(offset, bytes.len())?;
        for (i, byte) in bytes.iter().enumerate() {
            unsafe { core::ptr::write_volatile((addr + i) as *mut u8, *byte) };
        }
        Ok(())
    }
}
