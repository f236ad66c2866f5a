// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Desk controller: the top-level mode state machine.
//!
//! The controller owns every component and is advanced by [`DeskController::update`] once per
//! control tick. Each tick runs in a fixed order:
//!
//! 1. sample buttons, limit switch and position sensor, advance the motor ramp and the display;
//!    a closed limit switch cuts a descent before the ramp advances
//! 2. resolve gestures into a mode transition
//! 3. command the motor for the resulting mode and track the raw height
//! 4. run the calibration wizard (`Calibrating` only)
//! 5. run the preset session (`PresetMode` only)
//! 6. hand the display intent for the mode to the sink
//!
//! Typical usage pattern:
//!
//! ```ignore
//! desk.init(now_ms);
//!
//! loop {
//!     desk.update(RawInputs { up_level, down_level, limit_level }, now_ms);
//!     delay.delay_ms(TICK_MS);
//!     now_ms = now_ms.wrapping_add(TICK_MS);
//! }
//! ```

use core::fmt::Write;

use embedded_hal::delay::DelayNs;
use embedded_storage::Storage;
use heapless::String;
#[cfg(not(test))]
use micromath::F32Ext;

use super::calibration::{CalibrationWizard, WizardEvent};
use super::mode::{ControllerMode, ModeKind, Movement};
use super::preset::{PresetEvent, PresetSession};
use crate::config::{
    CAL_RESULT_DWELL_MS, CAL_SAVED_DWELL_MS, MOTOR_SPEED, PRESET_MOVE_SPEED, RECALL_TIMEOUT_MS,
    RECALL_TOLERANCE_MM, STATUS_HOLD_MS,
};
use crate::display::{CalibrationStep, DisplaySink};
use crate::fmt::{desk_debug, desk_info, desk_warn};
use crate::input::GestureInput;
use crate::motors::{HBridge, MotorDrive};
use crate::sensors::{LimitSwitch, PositionSensor, Travel};
use crate::storage::{self, PersistentState};

/// Raw electrical pin levels sampled for one tick (`true` = high).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct RawInputs {
    pub up_level: bool,
    pub down_level: bool,
    pub limit_level: bool,
}

impl RawInputs {
    /// Nothing pressed, limit switch open (all lines pulled high).
    pub const fn released() -> Self {
        Self {
            up_level: true,
            down_level: true,
            limit_level: true,
        }
    }
}

pub struct DeskController<S, B, F, D, T> {
    input: GestureInput,
    limit: LimitSwitch,
    sensor: S,
    motor: MotorDrive<B>,
    state: PersistentState<F>,
    display: D,
    delay: T,

    mode: ControllerMode,

    /// Set when a session ends with buttons still held; Idle rules wait for a full release.
    release_latch: bool,
    /// Time the current status message went up. Mode screens are held back until it expires.
    status_since_ms: Option<u32>,
    storage_fault_reported: bool,
}

impl<S, B, F, D, T> DeskController<S, B, F, D, T>
where
    S: PositionSensor,
    B: HBridge,
    F: Storage,
    D: DisplaySink,
    T: DelayNs,
{
    /// Assemble a controller. Buttons and limit switch default to active-low.
    pub fn new(
        sensor: S,
        motor: MotorDrive<B>,
        state: PersistentState<F>,
        display: D,
        delay: T,
    ) -> Self {
        Self {
            input: GestureInput::active_low(),
            limit: LimitSwitch::active_low(),
            sensor,
            motor,
            state,
            display,
            delay,
            mode: ControllerMode::Idle,
            release_latch: false,
            status_since_ms: None,
            storage_fault_reported: false,
        }
    }

    pub fn with_input(mut self, input: GestureInput) -> Self {
        self.input = input;
        self
    }

    pub fn with_limit_switch(mut self, limit: LimitSwitch) -> Self {
        self.limit = limit;
        self
    }

    /// Bring up the display, load the persisted record and restore the sensor from it.
    ///
    /// Failures are reported and the desk stays usable by direct button hold.
    pub fn init(&mut self, now_ms: u32) {
        if self.display.init().is_err() {
            desk_warn!("display init failed, continuing without it");
        }

        if self.state.load().is_err() {
            desk_warn!("calibration record unreadable, using defaults");
            self.storage_fault_reported = true;
            self.show_status("Storage Error", false, now_ms);
        }

        let scale = self.state.scale_factor();
        self.sensor.set_scale(scale);
        self.sensor
            .reset_to((self.state.raw_height() * scale).round() as i32);

        if self.state.is_calibrated() {
            desk_info!(
                "restored height {} mm, scale {} pulses/mm",
                self.state.current_height(),
                scale
            );
        } else {
            desk_info!("desk not calibrated");
            self.show_status("Please calibrate", false, now_ms);
        }

        self.mode = ControllerMode::Idle;
        self.release_latch = false;
    }

    /// Run one control tick.
    pub fn update(&mut self, raw: RawInputs, now_ms: u32) {
        self.input.update(raw.up_level, raw.down_level, now_ms);
        self.limit.update(raw.limit_level);
        self.check_limit();
        self.sensor.update(now_ms);
        self.motor.update(now_ms);
        self.display.refresh(now_ms);

        self.resolve_transition(now_ms);

        self.drive_motor();
        let result = self.state.update_height(self.sensor.height_mm());
        self.check_storage(result, now_ms);

        self.run_calibration(now_ms);
        self.run_preset_mode(now_ms);

        self.show_mode(now_ms);
    }

    /// Cut a descent at the bottom stop before the motor ramp advances this tick.
    fn check_limit(&mut self) {
        if self.limit.is_triggered() && matches!(self.mode, ControllerMode::MovingDown(_)) {
            desk_warn!("bottom limit reached, stopping");
            self.motor.stop();
            self.enter(ControllerMode::Idle);
        }
    }

    fn resolve_transition(&mut self, now_ms: u32) {
        if !self.input.is_any_pressed() {
            self.release_latch = false;
        }

        let next = match self.mode {
            ControllerMode::Idle => self.idle_transition(now_ms),
            ControllerMode::MovingUp(movement) => {
                self.moving_transition(Travel::Up, movement, now_ms)
            }
            ControllerMode::MovingDown(movement) => {
                self.moving_transition(Travel::Down, movement, now_ms)
            }
            ControllerMode::Calibrating(_) | ControllerMode::PresetMode(_) => None,
        };

        if let Some(mode) = next {
            self.enter(mode);
        }
    }

    /// Idle rules, highest priority first.
    fn idle_transition(&self, now_ms: u32) -> Option<ControllerMode> {
        if self.release_latch {
            return None;
        }

        let input = &self.input;
        if input.is_both_very_long_pressed() {
            Some(ControllerMode::Calibrating(self.open_wizard(now_ms)))
        } else if input.is_both_long_pressed() {
            Some(ControllerMode::PresetMode(PresetSession::new(now_ms)))
        } else if input.is_down_only()
            && input.down.is_long_pressed()
            && !self.state.is_calibrated()
        {
            Some(ControllerMode::Calibrating(self.open_wizard(now_ms)))
        } else if input.is_up_only() {
            Some(ControllerMode::MovingUp(Movement::manual(MOTOR_SPEED, now_ms)))
        } else if input.is_down_only() && !self.limit.is_triggered() {
            Some(ControllerMode::MovingDown(Movement::manual(MOTOR_SPEED, now_ms)))
        } else {
            None
        }
    }

    fn moving_transition(
        &mut self,
        travel: Travel,
        movement: Movement,
        now_ms: u32,
    ) -> Option<ControllerMode> {
        let Some(target_mm) = movement.target_mm else {
            // Manual moves last while their own button is held alone. A chord hands over to the
            // Idle rules.
            let held = match travel {
                Travel::Up => self.input.is_up_only(),
                _ => self.input.is_down_only(),
            };
            let wants_calibration = travel == Travel::Down
                && self.input.down.is_long_pressed()
                && !self.state.is_calibrated();

            return (!held || wants_calibration).then_some(ControllerMode::Idle);
        };

        if self.input.is_any_pressed() {
            desk_info!("preset move cancelled");
            self.release_latch = true;
            return Some(ControllerMode::Idle);
        }

        let height = self.live_height();
        let arrived = match travel {
            Travel::Up => height >= target_mm - RECALL_TOLERANCE_MM,
            _ => height <= target_mm + RECALL_TOLERANCE_MM,
        };
        if arrived {
            desk_info!("reached preset height {} mm", height);
            return Some(ControllerMode::Idle);
        }

        if now_ms.wrapping_sub(movement.started_ms) >= RECALL_TIMEOUT_MS {
            desk_warn!("preset move timed out at {} mm", height);
            return Some(ControllerMode::Idle);
        }

        None
    }

    fn enter(&mut self, mode: ControllerMode) {
        let kind = mode.kind();
        if kind != self.mode.kind() {
            desk_debug!("mode {} -> {}", self.mode.kind(), kind);
        }

        if kind == ModeKind::Calibrating {
            self.motor.stop();
        }
        self.mode = mode;
    }

    fn drive_motor(&mut self) {
        match &self.mode {
            ControllerMode::MovingUp(movement) => {
                self.motor.forward(movement.speed);
                self.sensor.note_travel(Travel::Up);
            }
            ControllerMode::MovingDown(movement) => {
                self.motor.backward(movement.speed);
                self.sensor.note_travel(Travel::Down);
            }
            ControllerMode::Idle | ControllerMode::PresetMode(_) => {
                self.motor.decelerate();
                self.sensor.note_travel(Travel::Stopped);
            }
            ControllerMode::Calibrating(_) => {
                self.motor.stop();
                self.sensor.note_travel(Travel::Stopped);
            }
        }
    }

    fn open_wizard(&self, now_ms: u32) -> CalibrationWizard {
        let current = self.state.is_calibrated().then(|| self.live_height());
        CalibrationWizard::new(current, self.sensor.pulse_count(), now_ms)
    }

    fn run_calibration(&mut self, now_ms: u32) {
        let pulses = self.sensor.pulse_count();
        let event = match &mut self.mode {
            ControllerMode::Calibrating(wizard) => wizard.update(&self.input, pulses, now_ms),
            _ => return,
        };

        match event {
            WizardEvent::None => {}
            WizardEvent::Advanced => desk_info!("calibration: start height confirmed"),
            WizardEvent::Rejected => desk_warn!("calibration: no movement measured, try again"),
            WizardEvent::TimedOut => {
                desk_warn!("calibration abandoned");
                self.show_status("Calibration Cancelled", false, now_ms);
                self.enter(ControllerMode::Idle);
            }
            WizardEvent::Completed {
                pulses_per_mm,
                end_height_mm,
            } => self.finish_calibration(pulses_per_mm, end_height_mm, now_ms),
        }
    }

    fn finish_calibration(&mut self, pulses_per_mm: f32, end_height_mm: f32, now_ms: u32) {
        let pulses = self.sensor.pulse_count();
        let (start_mm, pulses_since_start) = match &self.mode {
            ControllerMode::Calibrating(wizard) => {
                (wizard.start_guess_mm(), wizard.pulses_since_start(pulses))
            }
            _ => return,
        };

        self.sensor.set_scale(pulses_per_mm);
        let raw_mm = self.sensor.height_mm();
        let offset_mm = end_height_mm - raw_mm;

        let result = self.state.update_height(raw_mm);
        let height_saved = self.check_storage(result, now_ms);
        let result = self.state.apply_calibration(pulses_per_mm, offset_mm);
        let saved = self.check_storage(result, now_ms) && height_saved;

        desk_info!(
            "calibrated: {} pulses/mm, offset {} mm",
            pulses_per_mm,
            offset_mm
        );

        // The desk must not move while the result is on screen.
        self.display.show_calibration_step(
            CalibrationStep::Complete,
            start_mm,
            end_height_mm,
            pulses_since_start,
        );
        self.delay.delay_ms(CAL_RESULT_DWELL_MS);

        if saved {
            self.display.show_status("Calibration Saved", true);
        } else {
            self.display.show_status("Calibration Not Saved", false);
        }
        self.delay.delay_ms(CAL_SAVED_DWELL_MS);

        self.release_latch = true;
        self.enter(ControllerMode::Idle);
    }

    fn run_preset_mode(&mut self, now_ms: u32) {
        let event = match &mut self.mode {
            ControllerMode::PresetMode(session) => session.update(&self.input, now_ms),
            _ => return,
        };

        match event {
            PresetEvent::None => {}
            PresetEvent::CycleForward | PresetEvent::CycleBackward => {
                let result = self.state.cycle_preset(event == PresetEvent::CycleForward);
                self.check_storage(result, now_ms);
                desk_debug!("preset {} selected", self.state.current_preset() + 1);
            }
            PresetEvent::Save => {
                let index = self.state.current_preset();
                let height = self.live_height();
                let result = self.state.save_preset(index, height);

                let mut msg: String<24> = String::new();
                if self.check_storage(result, now_ms) {
                    desk_info!("preset {} saved at {} mm", index + 1, height);
                    let _ = write!(msg, "Preset {} Saved", index + 1);
                    self.show_status(&msg, true, now_ms);
                } else {
                    let _ = write!(msg, "Preset {} Not Saved", index + 1);
                    self.show_status(&msg, false, now_ms);
                }

                self.release_latch = true;
                self.enter(ControllerMode::Idle);
            }
            PresetEvent::Recall => self.recall_preset(now_ms),
            PresetEvent::TimedOut => {
                self.show_status("Normal Mode", true, now_ms);
                self.enter(ControllerMode::Idle);
            }
            PresetEvent::Escalate => self.enter(ControllerMode::Idle),
        }
    }

    /// Start a move toward the selected preset. Unset presets stay in preset mode.
    fn recall_preset(&mut self, now_ms: u32) {
        let index = self.state.current_preset();
        let target_mm = self.state.preset(index).unwrap_or(0.0);

        if target_mm <= 0.0 {
            let mut msg: String<24> = String::new();
            let _ = write!(msg, "Preset {} Empty", index + 1);
            self.show_status(&msg, false, now_ms);
            return;
        }

        desk_info!("moving to preset {} at {} mm", index + 1, target_mm);
        let movement = Movement::toward(target_mm, PRESET_MOVE_SPEED, now_ms);

        // The motor was already commanded this tick, so start the move here.
        if target_mm > self.live_height() {
            self.motor.forward(PRESET_MOVE_SPEED);
            self.sensor.note_travel(Travel::Up);
            self.enter(ControllerMode::MovingUp(movement));
        } else if self.limit.is_triggered() {
            desk_warn!("preset below the bottom limit, not moving");
            self.enter(ControllerMode::Idle);
        } else {
            self.motor.backward(PRESET_MOVE_SPEED);
            self.sensor.note_travel(Travel::Down);
            self.enter(ControllerMode::MovingDown(movement));
        }
    }

    fn show_mode(&mut self, now_ms: u32) {
        if let Some(since) = self.status_since_ms {
            if now_ms.wrapping_sub(since) < STATUS_HOLD_MS {
                return;
            }
            self.status_since_ms = None;
        }

        match &self.mode {
            ControllerMode::Idle => self.display.show_height(self.state.current_height(), false),
            ControllerMode::MovingUp(_) | ControllerMode::MovingDown(_) => {
                self.display.show_height(self.state.current_height(), true)
            }
            ControllerMode::Calibrating(wizard) => self.display.show_calibration_step(
                wizard.step(),
                wizard.start_guess_mm(),
                wizard.end_guess_mm(),
                wizard.pulses_since_start(self.sensor.pulse_count()),
            ),
            ControllerMode::PresetMode(_) => {
                let index = self.state.current_preset();
                let height = self.state.preset(index).unwrap_or(0.0);
                self.display.show_preset_mode(index as u8 + 1, height);
            }
        }
    }

    fn show_status(&mut self, message: &str, success: bool, now_ms: u32) {
        self.display.show_status(message, success);
        self.status_since_ms = Some(now_ms);
    }

    /// Report the first storage failure. Returns true if the write went through.
    fn check_storage(&mut self, result: Result<(), storage::Error<F::Error>>, now_ms: u32) -> bool {
        if result.is_ok() {
            return true;
        }
        if !self.storage_fault_reported {
            desk_warn!("storage write failed, keeping settings in memory");
            self.storage_fault_reported = true;
            self.show_status("Storage Error", false, now_ms);
        }
        false
    }

    /// Height from the live sensor reading plus the calibrated offset.
    fn live_height(&self) -> f32 {
        self.sensor.height_mm() + self.state.height_offset()
    }

    #[inline]
    pub fn mode(&self) -> &ControllerMode {
        &self.mode
    }

    #[inline]
    pub fn mode_kind(&self) -> ModeKind {
        self.mode.kind()
    }

    /// Displayed height (mm).
    #[inline]
    pub fn current_height(&self) -> f32 {
        self.state.current_height()
    }

    #[inline]
    pub fn is_calibrated(&self) -> bool {
        self.state.is_calibrated()
    }

    pub fn state(&self) -> &PersistentState<F> {
        &self.state
    }

    pub fn input(&self) -> &GestureInput {
        &self.input
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    pub fn motor(&self) -> &MotorDrive<B> {
        &self.motor
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn delay(&self) -> &T {
        &self.delay
    }
}
