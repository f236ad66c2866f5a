// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Top-level controller modes.

use super::calibration::CalibrationWizard;
use super::preset::PresetSession;

/// An active motor movement.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Movement {
    /// Target duty.
    pub speed: u8,
    /// Height to stop at (mm). `None` for a manual move that stops on release.
    pub target_mm: Option<f32>,
    pub started_ms: u32,
}

impl Movement {
    /// Manual move, held by the operator.
    pub fn manual(speed: u8, now_ms: u32) -> Self {
        Self {
            speed,
            target_mm: None,
            started_ms: now_ms,
        }
    }

    /// Move toward a recalled height.
    pub fn toward(target_mm: f32, speed: u8, now_ms: u32) -> Self {
        Self {
            speed,
            target_mm: Some(target_mm),
            started_ms: now_ms,
        }
    }

    #[inline]
    pub fn is_recall(&self) -> bool {
        self.target_mm.is_some()
    }
}

/// Controller mode with its session data.
#[derive(Clone, Debug)]
pub enum ControllerMode {
    Idle,
    MovingUp(Movement),
    MovingDown(Movement),
    Calibrating(CalibrationWizard),
    PresetMode(PresetSession),
}

/// Mode without payload, for logging and queries.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModeKind {
    Idle,
    MovingUp,
    MovingDown,
    Calibrating,
    PresetMode,
}

impl ControllerMode {
    pub fn kind(&self) -> ModeKind {
        match self {
            ControllerMode::Idle => ModeKind::Idle,
            ControllerMode::MovingUp(_) => ModeKind::MovingUp,
            ControllerMode::MovingDown(_) => ModeKind::MovingDown,
            ControllerMode::Calibrating(_) => ModeKind::Calibrating,
            ControllerMode::PresetMode(_) => ModeKind::PresetMode,
        }
    }

    #[inline]
    pub fn is_moving(&self) -> bool {
        matches!(self, ControllerMode::MovingUp(_) | ControllerMode::MovingDown(_))
    }
}

impl Default for ControllerMode {
    fn default() -> Self {
        ControllerMode::Idle
    }
}
