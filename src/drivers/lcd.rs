//! Command surface of the BU9796-class LCD controller.
//!
//! The controller sits at a fixed bus address. Every transfer starts with
//! command bytes; a command with [`CMD_CHAIN`] set announces another
//! command byte, a command with it clear is followed by DDRAM data. The
//! first data byte drives the rightmost digit of the glass and the colon
//! sits on the second data byte.

use ufmt::derive::uDebug;

use crate::drivers::segments;

/// Another command byte follows this one.
pub const CMD_CHAIN: u8 = 0b1000_0000;

/// Display control: frame rate, drive waveform, power save mode. The
/// power-on defaults (80 Hz, line inversion) suit this glass.
pub const DISCTL: u8 = 0b0010_0000;

/// Display mode setting.
pub const MODESET: u8 = 0b0100_0000;
pub const MODESET_ON: u8 = 1 << 3;
pub const MODESET_BIAS_THIRD: u8 = 0 << 2;

/// Chip operation setting.
const ICSET: u8 = 0b0110_1000;
const ICSET_RESET: u8 = 1 << 1;

/// DDRAM address setting; low bits carry the target address.
pub const ADSET: u8 = 0b0000_0000;

/// Blink control.
const BLKCTL: u8 = 0b0111_0000;

/// All-pixel override.
const APCTL: u8 = 0b0111_1100;
const APCTL_ALL_ON: u8 = 1 << 1;
const APCTL_ALL_OFF: u8 = 1 << 0;

/// Bytes in a full display write: address-set plus four digit bitmaps.
pub const FRAME_LEN: usize = 5;

/// Hardware blink rate of the whole display.
#[derive(uDebug, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlinkRate {
    Off,
    HalfHz,
    OneHz,
    TwoHz,
}

/// Single-byte blink control command.
pub fn blink_command(rate: BlinkRate) -> u8 {
    BLKCTL
        | match rate {
            BlinkRate::Off => 0b00,
            BlinkRate::HalfHz => 0b01,
            BlinkRate::OneHz => 0b10,
            BlinkRate::TwoHz => 0b11,
        }
}

/// Power-on command: display on, 1/3 bias, output from DDRAM. Data bytes
/// may follow directly, the address pointer is 0 after reset.
pub fn power_on_command() -> u8 {
    MODESET | MODESET_ON | MODESET_BIAS_THIRD
}

/// Single-byte command forcing every pixel on or off, overriding DDRAM.
pub fn all_pixels_command(on: bool) -> u8 {
    APCTL | if on { APCTL_ALL_ON } else { APCTL_ALL_OFF }
}

/// Software reset: clears DDRAM and every mode register.
pub fn software_reset_command() -> u8 {
    ICSET | ICSET_RESET
}

/// DDRAM frame showing `minutes:seconds`: address-set to 0 followed by
/// the four digit bitmaps, rightmost digit first.
pub fn frame(minutes: u16, seconds: u16, colon: bool) -> [u8; FRAME_LEN] {
    let m = minutes.min(99);
    let s = seconds.min(59);
    let mut f = [
        ADSET,
        segments::digit((s % 10) as u8),
        segments::digit((s / 10) as u8),
        segments::digit((m % 10) as u8),
        segments::digit((m / 10) as u8),
    ];
    if colon {
        f[2] |= segments::POINT;
    }
    f
}
