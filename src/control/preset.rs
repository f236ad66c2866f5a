// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Preset-mode gesture session.
//!
//! Presses are classified once every button is released:
//!
//! - up alone: select the next slot
//! - down alone: select the previous slot
//! - both, released before the long-press threshold: move to the selected preset
//!
//! Holding both for [`BOTH_LONG_PRESS_MS`](crate::config::BOTH_LONG_PRESS_MS) saves right away,
//! without waiting for release.

use crate::config::PRESET_TIMEOUT_MS;
use crate::input::GestureInput;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PresetEvent {
    None,
    CycleForward,
    CycleBackward,
    Save,
    Recall,
    /// No button activity for [`PRESET_TIMEOUT_MS`].
    TimedOut,
    /// The opening chord kept going to the very-long threshold.
    Escalate,
}

#[derive(Clone, Debug)]
pub struct PresetSession {
    /// Opening chord released.
    armed: bool,
    last_activity_ms: u32,
    up_seen: bool,
    down_seen: bool,
    chord: bool,
    chord_long: bool,
}

impl PresetSession {
    pub fn new(now_ms: u32) -> Self {
        Self {
            armed: false,
            last_activity_ms: now_ms,
            up_seen: false,
            down_seen: false,
            chord: false,
            chord_long: false,
        }
    }

    pub fn update(&mut self, input: &GestureInput, now_ms: u32) -> PresetEvent {
        let pressed = input.is_any_pressed();

        if !self.armed {
            if input.is_both_very_long_pressed() {
                return PresetEvent::Escalate;
            }
            if !pressed {
                self.armed = true;
                self.last_activity_ms = now_ms;
            }
            return PresetEvent::None;
        }

        if pressed {
            self.last_activity_ms = now_ms;
            self.up_seen |= input.up.is_pressed();
            self.down_seen |= input.down.is_pressed();

            if input.is_both_pressed() {
                self.chord = true;
                if input.is_both_long_pressed() {
                    self.clear();
                    return PresetEvent::Save;
                }
                if !input.is_both_short_pressed() {
                    self.chord_long = true;
                }
            }
            return PresetEvent::None;
        }

        if self.up_seen || self.down_seen {
            let event = if self.chord {
                if self.chord_long {
                    PresetEvent::None
                } else {
                    PresetEvent::Recall
                }
            } else if self.up_seen {
                PresetEvent::CycleForward
            } else {
                PresetEvent::CycleBackward
            };
            self.clear();
            return event;
        }

        if now_ms.wrapping_sub(self.last_activity_ms) >= PRESET_TIMEOUT_MS {
            return PresetEvent::TimedOut;
        }

        PresetEvent::None
    }

    fn clear(&mut self) {
        self.up_seen = false;
        self.down_seen = false;
        self.chord = false;
        self.chord_long = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BOTH_LONG_PRESS_MS, DEBOUNCE_MS, LONG_PRESS_MS, TICK_MS, VERY_LONG_PRESS_MS};

    struct Bench {
        input: GestureInput,
        session: PresetSession,
        now: u32,
    }

    impl Bench {
        /// Session opened by a held chord that is then released.
        fn armed() -> Self {
            let mut bench = Self {
                input: GestureInput::active_low(),
                session: PresetSession::new(0),
                now: 0,
            };
            bench.hold(false, false, 100);
            bench
        }

        fn hold(&mut self, up: bool, down: bool, ms: u32) -> Vec<PresetEvent> {
            let mut events = Vec::new();
            let end = self.now + ms;
            while self.now < end {
                self.now += TICK_MS;
                self.input.update(!up, !down, self.now);
                let event = self.session.update(&self.input, self.now);
                if event != PresetEvent::None {
                    events.push(event);
                }
            }
            events
        }

        fn tap(&mut self, up: bool, down: bool, ms: u32) -> Vec<PresetEvent> {
            let mut events = self.hold(up, down, DEBOUNCE_MS + ms);
            events.extend(self.hold(false, false, DEBOUNCE_MS + 20));
            events
        }
    }

    #[test]
    fn single_presses_cycle() {
        let mut bench = Bench::armed();
        assert_eq!(bench.tap(true, false, 100), vec![PresetEvent::CycleForward]);
        assert_eq!(bench.tap(false, true, 100), vec![PresetEvent::CycleBackward]);
    }

    #[test]
    fn quick_chord_recalls() {
        let mut bench = Bench::armed();
        assert_eq!(bench.tap(true, true, 200), vec![PresetEvent::Recall]);
    }

    #[test]
    fn chord_held_past_long_but_released_early_does_nothing() {
        let mut bench = Bench::armed();
        let events = bench.tap(true, true, LONG_PRESS_MS + 200);
        assert!(events.is_empty());
    }

    #[test]
    fn long_chord_saves_while_held() {
        let mut bench = Bench::armed();
        let events = bench.hold(true, true, DEBOUNCE_MS + BOTH_LONG_PRESS_MS + 10);
        assert_eq!(events, vec![PresetEvent::Save]);
    }

    #[test]
    fn times_out_without_activity() {
        let mut bench = Bench::armed();
        bench.tap(true, false, 100);
        let events = bench.hold(false, false, PRESET_TIMEOUT_MS - 200);
        assert!(events.is_empty());
        let events = bench.hold(false, false, 300);
        assert_eq!(events.first(), Some(&PresetEvent::TimedOut));
    }

    #[test]
    fn opening_chord_escalates_before_release() {
        let mut input = GestureInput::active_low();
        let mut session = PresetSession::new(0);
        let mut now = 0;
        let mut escalated = false;
        while now < VERY_LONG_PRESS_MS + 200 {
            now += TICK_MS;
            input.update(false, false, now);
            if session.update(&input, now) == PresetEvent::Escalate {
                escalated = true;
                break;
            }
        }
        assert!(escalated);
        assert!(input.is_both_very_long_pressed());
    }
}
