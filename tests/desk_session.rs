// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! End-to-end desk session on the host.
//!
//! The lift is simulated as a spindle that advances one quadrature quarter-step per tick while
//! either bridge output is energized. Its channel levels feed the software quadrature decoder, and
//! the calibration record lives in a shared byte array that survives a simulated power cycle.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_storage::{ReadStorage, Storage};

use liftdesk::config::{
    BOTH_LONG_PRESS_MS, CAL_RESULT_DWELL_MS, CAL_SAVED_DWELL_MS, DEBOUNCE_MS, LONG_PRESS_MS,
    RECALL_TIMEOUT_MS, TICK_MS,
};
use liftdesk::control::{DeskController, ModeKind, RawInputs};
use liftdesk::display::{CalibrationStep, DisplaySink};
use liftdesk::motors::{HBridge, MotorDrive};
use liftdesk::sensors::{PositionSensor, QuadratureEncoder};
use liftdesk::storage::PersistentState;

type Channel = Box<dyn FnMut() -> bool>;
type Desk = DeskController<QuadratureEncoder<Channel, Channel>, Bridge, Flash, Screen, Dwell>;

/// Bridge outputs shared with the spindle.
struct Bridge(Rc<Cell<(u8, u8)>>);

impl HBridge for Bridge {
    fn set_forward_duty(&mut self, duty: u8) {
        let (_, backward) = self.0.get();
        self.0.set((duty, backward));
    }

    fn set_backward_duty(&mut self, duty: u8) {
        let (forward, _) = self.0.get();
        self.0.set((forward, duty));
    }
}

#[derive(Debug)]
struct OutOfRange;

/// Non-volatile bytes that outlive a controller instance.
#[derive(Clone)]
struct Flash(Rc<RefCell<Vec<u8>>>);

impl Flash {
    fn erased() -> Self {
        Self(Rc::new(RefCell::new(vec![0xFF; 64])))
    }

    fn span(&self, offset: u32, len: usize) -> Result<std::ops::Range<usize>, OutOfRange> {
        let start = offset as usize;
        let end = start + len;
        if end > self.0.borrow().len() {
            return Err(OutOfRange);
        }
        Ok(start..end)
    }
}

impl ReadStorage for Flash {
    type Error = OutOfRange;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let span = self.span(offset, bytes.len())?;
        bytes.copy_from_slice(&self.0.borrow()[span]);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.0.borrow().len()
    }
}

impl Storage for Flash {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        let span = self.span(offset, bytes.len())?;
        self.0.borrow_mut()[span].copy_from_slice(bytes);
        Ok(())
    }
}

/// Keeps the status lines and the last height readout.
#[derive(Default)]
struct Screen {
    statuses: Vec<(String, bool)>,
    height: Option<(f32, bool)>,
    calibration: Option<CalibrationStep>,
}

impl Screen {
    fn has_status(&self, message: &str) -> bool {
        self.statuses.iter().any(|(msg, _)| msg == message)
    }
}

impl DisplaySink for Screen {
    type Error = ();

    fn show_height(&mut self, height_mm: f32, moving: bool) {
        self.height = Some((height_mm, moving));
    }

    fn show_preset_mode(&mut self, _number: u8, _height_mm: f32) {}

    fn show_calibration_step(
        &mut self,
        step: CalibrationStep,
        _start_guess_mm: f32,
        _end_guess_mm: f32,
        _pulses_since_start: i32,
    ) {
        self.calibration = Some(step);
    }

    fn show_status(&mut self, message: &str, success: bool) {
        self.statuses.push((message.to_owned(), success));
    }
}

#[derive(Default)]
struct Dwell {
    ns: u64,
}

impl DelayNs for Dwell {
    fn delay_ns(&mut self, ns: u32) {
        self.ns += u64::from(ns);
    }
}

struct Rig {
    desk: Desk,
    now: u32,
    /// Spindle position in quadrature quarter-steps.
    phase: Rc<Cell<i32>>,
    duty: Rc<Cell<(u8, u8)>>,
    /// Quarter-steps still to be turned by hand.
    by_hand: i32,
}

impl Rig {
    fn power_on(flash: Flash) -> Self {
        let phase = Rc::new(Cell::new(0_i32));
        let duty = Rc::new(Cell::new((0, 0)));

        let a = phase.clone();
        let b = phase.clone();
        let read_a: Channel = Box::new(move || matches!(a.get().rem_euclid(4), 1 | 2));
        let read_b: Channel = Box::new(move || matches!(b.get().rem_euclid(4), 2 | 3));

        let mut desk = DeskController::new(
            QuadratureEncoder::new(read_a, read_b, 10.0),
            MotorDrive::new(Bridge(duty.clone())),
            PersistentState::new(flash, 0),
            Screen::default(),
            Dwell::default(),
        );
        desk.init(0);

        Self {
            desk,
            now: 0,
            phase,
            duty,
            by_hand: 0,
        }
    }

    fn tick(&mut self, up: bool, down: bool) {
        let (forward, backward) = self.duty.get();
        assert!(forward == 0 || backward == 0, "both bridge outputs energized");

        let step = if forward > 0 {
            1
        } else if backward > 0 {
            -1
        } else {
            self.by_hand.signum()
        };
        if forward == 0 && backward == 0 {
            self.by_hand -= step;
        }
        self.phase.set(self.phase.get() + step);

        self.now += TICK_MS;
        let raw = RawInputs {
            up_level: !up,
            down_level: !down,
            limit_level: true,
        };
        self.desk.update(raw, self.now);
    }

    fn hold(&mut self, up: bool, down: bool, ms: u32) {
        let end = self.now + ms;
        while self.now < end {
            self.tick(up, down);
        }
    }

    fn release(&mut self, ms: u32) {
        self.hold(false, false, ms);
    }

    fn tap(&mut self, up: bool, down: bool) {
        self.hold(up, down, DEBOUNCE_MS + 100);
        self.release(DEBOUNCE_MS + 50);
    }

    fn turn_by_hand(&mut self, quarter_steps: i32) {
        self.by_hand = quarter_steps;
        while self.by_hand != 0 {
            self.tick(false, false);
        }
    }

    fn open_presets(&mut self) {
        self.hold(true, true, DEBOUNCE_MS + BOTH_LONG_PRESS_MS + 30);
        assert_eq!(self.desk.mode_kind(), ModeKind::PresetMode);
        self.release(DEBOUNCE_MS + 50);
    }

    fn settle(&mut self) {
        self.release(1_000);
        assert!(!self.desk.motor().is_running());
    }

    fn kind(&self) -> ModeKind {
        self.desk.mode_kind()
    }
}

/// Uncalibrated desk: calibrate by hand, store a preset, recall it, then power cycle.
#[test]
fn calibrate_store_recall_and_restart() {
    let flash = Flash::erased();
    let mut rig = Rig::power_on(flash.clone());

    assert!(!rig.desk.is_calibrated());
    assert!(rig.desk.display().has_status("Please calibrate"));

    // Long down press opens the wizard and stops the motor.
    rig.hold(false, true, DEBOUNCE_MS + LONG_PRESS_MS + 50);
    assert_eq!(rig.kind(), ModeKind::Calibrating);
    assert_eq!(rig.desk.motor().target_speed(), 0);
    rig.release(500);

    // Step 1 at the default 700 mm.
    rig.tap(true, true);
    assert_eq!(
        rig.desk.display().calibration,
        Some(CalibrationStep::AwaitingEndHeight)
    );

    // Raise the desk 500 pulses by hand and confirm the default 800 mm.
    rig.turn_by_hand(1_000);
    rig.tap(true, true);

    assert_eq!(rig.kind(), ModeKind::Idle);
    assert!(rig.desk.is_calibrated());
    assert!((rig.desk.state().scale_factor() - 5.0).abs() < 1e-4);
    assert!((rig.desk.sensor().scale() - 5.0).abs() < 1e-4);
    assert!((rig.desk.current_height() - 800.0).abs() < 1e-2);
    assert!(rig.desk.display().has_status("Calibration Saved"));
    assert_eq!(
        rig.desk.delay().ns,
        u64::from(CAL_RESULT_DWELL_MS + CAL_SAVED_DWELL_MS) * 1_000_000
    );

    // Drive up for two seconds.
    rig.release(DEBOUNCE_MS + 50);
    rig.hold(true, false, 2_000);
    assert_eq!(rig.kind(), ModeKind::MovingUp);
    assert_eq!(rig.desk.display().height.map(|(_, moving)| moving), Some(true));
    rig.settle();
    assert!(rig.desk.current_height() > 810.0);

    // Save preset 1 at the raised height.
    rig.open_presets();
    rig.hold(true, true, DEBOUNCE_MS + BOTH_LONG_PRESS_MS + 10);
    assert_eq!(rig.kind(), ModeKind::Idle);
    assert!(rig.desk.display().has_status("Preset 1 Saved"));
    let stored = rig.desk.state().preset(0).unwrap_or(0.0);
    assert!((stored - rig.desk.current_height()).abs() < 1.0);
    rig.release(DEBOUNCE_MS + 50);

    // Lower the desk again.
    rig.hold(false, true, 2_000);
    assert_eq!(rig.kind(), ModeKind::MovingDown);
    rig.settle();
    assert!(rig.desk.current_height() < stored - 10.0);

    // Recall preset 1 and wait for arrival.
    rig.open_presets();
    rig.tap(true, true);
    assert_eq!(rig.kind(), ModeKind::MovingUp);
    let deadline = rig.now + RECALL_TIMEOUT_MS;
    while rig.kind() == ModeKind::MovingUp && rig.now < deadline {
        rig.tick(false, false);
    }
    assert_eq!(rig.kind(), ModeKind::Idle);
    rig.settle();
    let parked = rig.desk.current_height();
    assert!((parked - stored).abs() < 6.0, "parked at {parked}, preset {stored}");

    // Power cycle: the record restores calibration and height. Storage trails by under 1 mm.
    drop(rig);
    let rig = Rig::power_on(flash);
    assert!(rig.desk.is_calibrated());
    assert!(!rig.desk.display().has_status("Please calibrate"));
    assert!((rig.desk.sensor().scale() - 5.0).abs() < 1e-4);
    assert!((rig.desk.current_height() - parked).abs() < 1.0);
    assert_eq!(rig.desk.state().preset(0), Some(stored));
}

/// Erased storage with a chord held from power on goes to preset mode, never to calibration.
#[test]
fn chord_from_power_on_reaches_preset_mode_first() {
    let mut rig = Rig::power_on(Flash::erased());
    rig.hold(true, true, DEBOUNCE_MS + BOTH_LONG_PRESS_MS + 30);
    assert_eq!(rig.kind(), ModeKind::PresetMode);
    assert_eq!(rig.desk.motor().current_speed(), 0);
}
