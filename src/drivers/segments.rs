//! Segment bitmaps for the 4-digit seven-segment glass.
//!
//! Each DDRAM byte drives one digit. The controller's segment lines land
//! on the glass so that the high nibble carries `d c b a` and the low
//! nibble `p e g f`, where `p` is the decimal-point/colon line:
//!
//! ```text
//!      ┌─a─┐
//!      f   b
//!      ├─g─┤
//!      e   c
//!      └─d─┘  .p
//! ```

const SEG_A: u8 = 0b0001_0000;
const SEG_B: u8 = 0b0010_0000;
const SEG_C: u8 = 0b0100_0000;
const SEG_D: u8 = 0b1000_0000;
const SEG_E: u8 = 0b0000_0100;
const SEG_F: u8 = 0b0000_0001;
const SEG_G: u8 = 0b0000_0010;

/// Decimal-point/colon modifier, OR'ed onto a digit bitmap.
pub const POINT: u8 = 0b0000_1000;

pub const MINUS: u8 = SEG_G;
pub const SPACE: u8 = 0;

const DIGITS: [u8; 10] = [
    SEG_A | SEG_B | SEG_C | SEG_D | SEG_E | SEG_F,
    SEG_B | SEG_C,
    SEG_A | SEG_B | SEG_G | SEG_E | SEG_D,
    SEG_A | SEG_B | SEG_C | SEG_D | SEG_G,
    SEG_F | SEG_G | SEG_B | SEG_C,
    SEG_A | SEG_F | SEG_G | SEG_C | SEG_D,
    SEG_A | SEG_F | SEG_E | SEG_D | SEG_C | SEG_G,
    SEG_A | SEG_B | SEG_C,
    SEG_A | SEG_B | SEG_C | SEG_D | SEG_E | SEG_F | SEG_G,
    SEG_A | SEG_B | SEG_C | SEG_D | SEG_G | SEG_F,
];

/// Segment bitmap for a decimal digit; anything above 9 renders blank.
pub fn digit(d: u8) -> u8 {
    DIGITS.get(d as usize).copied().unwrap_or(SPACE)
}
