//! RTC peripheral: the 64 Hz sampling tick and the gated one-second
//! counter.
//!
//! The periodic interrupt timer (PIT) runs continuously and is the only
//! wake source in power-down. The main RTC counter is started and stopped
//! by the application to implement pause/resume with sub-second precision:
//! `stop_seconds` hands back the exact in-flight count and
//! `start_seconds` resumes from it.

use avr_device::attiny417::RTC;
use core::marker::PhantomData;

use lcd_timer_firmware::config;

// CLKSEL
const CLKSEL_TOSC32K: u8 = 0x02;

// PITCTRLA: period field in bits 6:3, CYC512 gives 32768/512 = 64 Hz
const PIT_CYC512: u8 = 0x8 << 3;
const PITEN: u8 = 1 << 0;

// PITINTCTRL / PITINTFLAGS
const PI: u8 = 1 << 0;

// CTRLA
const RTCEN: u8 = 1 << 0;

// INTCTRL / INTFLAGS
const OVF: u8 = 1 << 0;

// STATUS register-synchronization busy bits
const CTRLABUSY: u8 = 1 << 0;
const CNTBUSY: u8 = 1 << 1;
const PERBUSY: u8 = 1 << 2;

pub struct Rtc {
    _rtc: PhantomData<RTC>,
}

impl Rtc {
    /// Clock the RTC from the 32.768 kHz crystal, set the one-second
    /// overflow period and start the 64 Hz periodic tick.
    pub fn new() -> Self {
        unsafe {
            let p = RTC::ptr();
            (*p).clksel.write(|w| w.bits(CLKSEL_TOSC32K));

            while (*p).status.read().bits() & PERBUSY != 0 {}
            (*p).per.write(|w| w.bits(config::SECOND_PERIOD));

            (*p).pitctrla.write(|w| w.bits(PIT_CYC512 | PITEN));
            (*p).pitintctrl.write(|w| w.bits(PI));
        }
        Self { _rtc: PhantomData }
    }

    /// Begin second counting from `from_count` and enable the overflow
    /// interrupt. Must not race the second interrupt; interrupts do not
    /// nest on this target, so calling from interrupt context is safe.
    pub fn start_seconds(&mut self, from_count: u16) {
        unsafe {
            let p = RTC::ptr();
            while (*p).status.read().bits() & CNTBUSY != 0 {}
            (*p).cnt.write(|w| w.bits(from_count));

            (*p).intflags.write(|w| w.bits(OVF));
            (*p).intctrl.modify(|r, w| w.bits(r.bits() | OVF));

            while (*p).status.read().bits() & CTRLABUSY != 0 {}
            (*p).ctrla.modify(|r, w| w.bits(r.bits() | RTCEN));
        }
    }

    /// Disable the overflow interrupt, halt the counter and return the
    /// exact in-flight count so no fractional second is lost.
    pub fn stop_seconds(&mut self) -> u16 {
        unsafe {
            let p = RTC::ptr();
            (*p).intctrl.modify(|r, w| w.bits(r.bits() & !OVF));

            while (*p).status.read().bits() & CTRLABUSY != 0 {}
            (*p).ctrla.modify(|r, w| w.bits(r.bits() & !RTCEN));

            (*p).cnt.read().bits()
        }
    }

    /// Acknowledge the periodic tick interrupt.
    pub fn clear_tick(&mut self) {
        unsafe { (*RTC::ptr()).pitintflags.write(|w| w.bits(PI)) }
    }

    /// Acknowledge the second overflow interrupt.
    pub fn clear_second(&mut self) {
        unsafe { (*RTC::ptr()).intflags.write(|w| w.bits(OVF)) }
    }
}
