//! System clock and crystal bring-up.
//!
//! The main clock registers are under configuration change protection:
//! each write must be preceded by the IOREG key in `CPU.CCP`.

use avr_device::attiny417::{CLKCTRL, CPU};

const CCP_IOREG: u8 = 0xD8;

// MCLKCTRLA
const CLKSEL_OSC20M: u8 = 0x00;

// MCLKCTRLB: prescaler field value 0 divides by 2
const PDIV_2X: u8 = 0x0 << 1;
const PEN: u8 = 1 << 0;

// MCLKLOCK
const LOCKEN: u8 = 1 << 0;

// XOSC32KCTRLA / MCLKSTATUS
const XOSC32K_ENABLE: u8 = 1 << 0;
const XOSC32KS: u8 = 1 << 6;

/// 20 MHz internal oscillator prescaled to a 10 MHz system clock, locked
/// against further changes; external 32.768 kHz crystal for the RTC.
pub fn init() {
    unsafe {
        let cpu = CPU::ptr();
        let clk = CLKCTRL::ptr();

        (*cpu).ccp.write(|w| w.bits(CCP_IOREG));
        (*clk).mclkctrla.write(|w| w.bits(CLKSEL_OSC20M));

        (*cpu).ccp.write(|w| w.bits(CCP_IOREG));
        (*clk).mclkctrlb.write(|w| w.bits(PDIV_2X | PEN));

        (*cpu).ccp.write(|w| w.bits(CCP_IOREG));
        (*clk).mclklock.write(|w| w.bits(LOCKEN));

        // the crystal must be disabled and settled before reconfiguring
        (*cpu).ccp.write(|w| w.bits(CCP_IOREG));
        (*clk).xosc32kctrla.write(|w| w.bits(0));
        while (*clk).mclkstatus.read().bits() & XOSC32KS != 0 {}

        (*cpu).ccp.write(|w| w.bits(CCP_IOREG));
        (*clk).xosc32kctrla.write(|w| w.bits(XOSC32K_ENABLE));
    }
}
