//! Button sampling and press classification.
//!
//! The two raw lines are sampled once per tick. A hold that crosses its
//! long-press threshold fires `LongPress` exactly once; releasing a hold
//! that never fired its long action produces `Released`, which the
//! application treats as the short press.

use embedded_hal::digital::v2::InputPin;
use ufmt::derive::uDebug;

use crate::config;

#[derive(uDebug, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Add,
    Set,
}

#[derive(uDebug, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Pressed,
    Released,
    LongPress,
}

#[derive(uDebug, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonEvent {
    pub button: Button,
    pub kind: EventKind,
}

/// Per-button hold state.
#[derive(Default)]
struct PressCounter {
    active_ticks: u16,
    long_fired: bool,
}

impl PressCounter {
    fn sample(&mut self, pressed: bool, long_threshold: u16) -> Option<EventKind> {
        if pressed {
            if self.active_ticks == 0 && !self.long_fired {
                self.active_ticks = 1;
                return Some(EventKind::Pressed);
            }
            self.active_ticks = self.active_ticks.saturating_add(1);
            if self.active_ticks >= long_threshold && !self.long_fired {
                // once per hold
                self.long_fired = true;
                self.active_ticks = 0;
                return Some(EventKind::LongPress);
            }
            None
        } else {
            let short_hold = self.active_ticks > 0 && !self.long_fired;
            self.active_ticks = 0;
            self.long_fired = false;
            if short_hold {
                Some(EventKind::Released)
            } else {
                None
            }
        }
    }
}

/// Classifier over the two raw button lines.
pub struct Buttons<A: InputPin, S: InputPin> {
    add_line: A,
    set_line: S,
    add: PressCounter,
    set: PressCounter,
}

impl<A: InputPin, S: InputPin> Buttons<A, S> {
    pub fn new(add_line: A, set_line: S) -> Self {
        Self {
            add_line,
            set_line,
            add: PressCounter::default(),
            set: PressCounter::default(),
        }
    }

    /// Sample both lines; at most one event per button per tick.
    pub fn on_tick(&mut self) -> [Option<ButtonEvent>; 2] {
        let add_pressed = Self::pressed(&self.add_line);
        let set_pressed = Self::pressed(&self.set_line);

        [
            self.add
                .sample(add_pressed, config::LONG_PRESS_TICKS)
                .map(|kind| ButtonEvent {
                    button: Button::Add,
                    kind,
                }),
            self.set
                .sample(set_pressed, config::ULTRA_PRESS_TICKS)
                .map(|kind| ButtonEvent {
                    button: Button::Set,
                    kind,
                }),
        ]
    }

    fn pressed<P: InputPin>(line: &P) -> bool {
        let high = line.is_high().unwrap_or(false);
        if config::BUTTON_ACTIVE_HIGH {
            high
        } else {
            !high
        }
    }
}
