// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Ramped open-loop motor drive for the desk lift.
//!
//! `forward` / `backward` / `decelerate` only set the command; [`MotorDrive::update`] moves the
//! applied duty toward the target by at most one ramp step per ramp interval. [`MotorDrive::stop`]
//! is the exception and cuts both outputs immediately.
//!
//! A direction change is applied inside a single update: the old output is written to 0 before
//! the new one is energized, so the two half-bridges are never driven at the same time.

use crate::config::{MAX_DUTY, RAMP_INTERVAL_MS, RAMP_STEP};

/// Two PWM outputs of an H-bridge, one per direction.
pub trait HBridge {
    /// Duty for the raise (forward) output. 0 de-energizes it.
    fn set_forward_duty(&mut self, duty: u8);

    /// Duty for the lower (backward) output. 0 de-energizes it.
    fn set_backward_duty(&mut self, duty: u8);
}

/// Logical drive direction.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Forward,
    Backward,
    Coast,
}

pub struct MotorDrive<B> {
    bridge: B,

    /// Commanded direction.
    commanded: Direction,
    /// Output that is currently energized (or `Coast`).
    active: Direction,

    current_speed: u8,
    target_speed: u8,

    max_speed: u8,
    ramp_step: u8,
    ramp_interval_ms: u32,
    last_ramp_ms: Option<u32>,
}

impl<B: HBridge> MotorDrive<B> {
    /// Create a drive with both outputs de-energized.
    pub fn new(mut bridge: B) -> Self {
        bridge.set_forward_duty(0);
        bridge.set_backward_duty(0);

        Self {
            bridge,
            commanded: Direction::Coast,
            active: Direction::Coast,
            current_speed: 0,
            target_speed: 0,
            max_speed: MAX_DUTY,
            ramp_step: RAMP_STEP,
            ramp_interval_ms: RAMP_INTERVAL_MS,
            last_ramp_ms: None,
        }
    }

    /// Override the ramp rate.
    pub fn with_ramp(mut self, step: u8, interval_ms: u32) -> Self {
        self.ramp_step = step.max(1);
        self.ramp_interval_ms = interval_ms;
        self
    }

    /// Override the duty ceiling.
    pub fn with_max_speed(mut self, max: u8) -> Self {
        self.max_speed = max;
        self
    }

    /// Raise the desk at `target` duty.
    pub fn forward(&mut self, target: u8) {
        self.commanded = Direction::Forward;
        self.target_speed = target.min(self.max_speed);
    }

    /// Lower the desk at `target` duty.
    pub fn backward(&mut self, target: u8) {
        self.commanded = Direction::Backward;
        self.target_speed = target.min(self.max_speed);
    }

    /// Ramp down to zero in the current direction.
    pub fn decelerate(&mut self) {
        self.target_speed = 0;
        if self.active == Direction::Coast {
            self.commanded = Direction::Coast;
        }
    }

    /// Immediate stop: zero current and target speed, de-energize both outputs.
    pub fn stop(&mut self) {
        self.commanded = Direction::Coast;
        self.active = Direction::Coast;
        self.current_speed = 0;
        self.target_speed = 0;
        self.bridge.set_forward_duty(0);
        self.bridge.set_backward_duty(0);
    }

    /// Advance the ramp. Called every control tick.
    pub fn update(&mut self, now_ms: u32) {
        if let Some(last) = self.last_ramp_ms {
            if now_ms.wrapping_sub(last) < self.ramp_interval_ms {
                return;
            }
        }
        self.last_ramp_ms = Some(now_ms);

        let switching = self.commanded != Direction::Coast && self.commanded != self.active;
        if switching {
            // Release the old half-bridge first, then restart the ramp from zero.
            match self.active {
                Direction::Forward => self.bridge.set_forward_duty(0),
                Direction::Backward => self.bridge.set_backward_duty(0),
                Direction::Coast => {}
            }
            self.active = self.commanded;
            self.current_speed = 0;
        }

        let before = self.current_speed;
        self.current_speed = Self::step_toward(self.current_speed, self.target_speed, self.ramp_step);

        if self.current_speed == 0 && self.target_speed == 0 {
            if self.active != Direction::Coast {
                self.bridge.set_forward_duty(0);
                self.bridge.set_backward_duty(0);
            }
            self.active = Direction::Coast;
            self.commanded = Direction::Coast;
            return;
        }

        if switching || self.current_speed != before {
            self.apply();
        }
    }

    fn step_toward(current: u8, target: u8, step: u8) -> u8 {
        if current < target {
            current.saturating_add(step).min(target)
        } else {
            current.saturating_sub(step).max(target)
        }
    }

    /// Write the duty, opposite output first.
    fn apply(&mut self) {
        match self.active {
            Direction::Forward => {
                self.bridge.set_backward_duty(0);
                self.bridge.set_forward_duty(self.current_speed);
            }
            Direction::Backward => {
                self.bridge.set_forward_duty(0);
                self.bridge.set_backward_duty(self.current_speed);
            }
            Direction::Coast => {
                self.bridge.set_forward_duty(0);
                self.bridge.set_backward_duty(0);
            }
        }
    }

    /// Duty currently applied to the energized output.
    #[inline]
    pub fn current_speed(&self) -> u8 {
        self.current_speed
    }

    #[inline]
    pub fn target_speed(&self) -> u8 {
        self.target_speed
    }

    /// Output that is currently energized.
    #[inline]
    pub fn direction(&self) -> Direction {
        self.active
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.current_speed > 0
    }

    /// Access the output stage.
    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    /// Release the output stage.
    pub fn free(self) -> B {
        self.bridge
    }
}
