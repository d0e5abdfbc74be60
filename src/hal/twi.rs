//! TWI0 master peripheral access.
//!
//! Only configuration and register-level byte shoveling live here; the
//! transfer state machine is the platform-independent
//! [`BusEngine`](lcd_timer_firmware::bus::BusEngine).

use avr_device::attiny417::TWI0;
use core::marker::PhantomData;

use lcd_timer_firmware::bus::{BusFlags, BusPort};
use lcd_timer_firmware::config;

// MSTATUS bits
const RIF: u8 = 1 << 7;
const WIF: u8 = 1 << 6;
const RXACK: u8 = 1 << 4;
const ARBLOST: u8 = 1 << 3;
const BUSERR: u8 = 1 << 2;
const BUSSTATE_MASK: u8 = 0x03;
const BUSSTATE_IDLE: u8 = 0x01;

// MCTRLA bits
const RIEN: u8 = 1 << 7;
const WIEN: u8 = 1 << 6;
const ENABLE: u8 = 1 << 0;

// MCTRLB bits: ACKACT high means NACK, MCMD low bits are the bus command
const ACKACT_NACK: u8 = 1 << 2;
const MCMD_RECVTRANS: u8 = 0x02;
const MCMD_STOP: u8 = 0x03;

/// TWI0 in interrupt-driven master mode.
pub struct Twi {
    _twi: PhantomData<TWI0>,
}

impl Twi {
    /// Configure the controller: fast-mode baud rate, read/write
    /// interrupts enabled, bus timeout disabled, bus state forced idle.
    pub fn new() -> Self {
        unsafe {
            let p = TWI0::ptr();
            (*p).mbaud.write(|w| w.bits(config::twi_baud()));
            (*p).mctrla.write(|w| w.bits(RIEN | WIEN | ENABLE));
            (*p).mstatus.write(|w| w.bits(BUSSTATE_IDLE));
        }
        Self { _twi: PhantomData }
    }
}

impl BusPort for Twi {
    fn flags(&self) -> BusFlags {
        let status = unsafe { (*TWI0::ptr()).mstatus.read().bits() };
        BusFlags {
            arbitration_lost: status & ARBLOST != 0,
            bus_error: status & BUSERR != 0,
            nack: status & RXACK != 0,
            write_done: status & WIF != 0,
            read_done: status & RIF != 0,
        }
    }

    fn bus_idle(&self) -> bool {
        let status = unsafe { (*TWI0::ptr()).mstatus.read().bits() };
        status & BUSSTATE_MASK == BUSSTATE_IDLE
    }

    fn start(&mut self, header: u8) {
        // writing the address register clears the event flags and
        // triggers the start condition
        unsafe { (*TWI0::ptr()).maddr.write(|w| w.bits(header)) }
    }

    fn write_data(&mut self, byte: u8) {
        unsafe {
            let p = TWI0::ptr();
            (*p).mctrlb.write(|w| w.bits(MCMD_RECVTRANS));
            (*p).mdata.write(|w| w.bits(byte));
        }
    }

    fn read_data(&mut self) -> u8 {
        unsafe { (*TWI0::ptr()).mdata.read().bits() }
    }

    fn ack_continue(&mut self) {
        unsafe { (*TWI0::ptr()).mctrlb.write(|w| w.bits(MCMD_RECVTRANS)) }
    }

    fn nack(&mut self) {
        unsafe { (*TWI0::ptr()).mctrlb.write(|w| w.bits(ACKACT_NACK)) }
    }

    fn stop(&mut self) {
        unsafe {
            (*TWI0::ptr())
                .mctrlb
                .modify(|r, w| w.bits(r.bits() | MCMD_STOP))
        }
    }

    fn clear_faults(&mut self) {
        // write-one-to-clear; leaves the bus-state field untouched
        unsafe {
            (*TWI0::ptr())
                .mstatus
                .write(|w| w.bits(ARBLOST | BUSERR | WIF | RIF))
        }
    }
}

impl Default for Twi {
    fn default() -> Self {
        Self::new()
    }
}
