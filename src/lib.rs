//! Host-testable core of the countdown timer firmware.
//!
//! The logic that does not touch hardware registers lives here: the
//! two-wire bus transfer engine, the button classifier, the countdown
//! state machine, the sleep-depth policy and the display encoding.
//! The AVR binary in `main.rs` wires these to the ATtiny417 peripherals;
//! `cargo test` runs them on the host.

#![cfg_attr(not(test), no_std)]

pub mod app;
pub mod bus;
pub mod buttons;
pub mod config;
pub mod drivers;
pub mod power;
