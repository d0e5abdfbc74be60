//! Transmit-only USART0 console for development builds.
//!
//! The shipped appliance has no logging surface; this module exists so a
//! bench build can report bus faults over the TXD pin (PB2).

use avr_device::attiny417::{PORTB, USART0};
use core::convert::Infallible;
use core::marker::PhantomData;

use lcd_timer_firmware::config;
use ufmt::uWrite;

// STATUS
const DREIF: u8 = 1 << 5;

// CTRLB
const TXEN: u8 = 1 << 6;

// normal async mode: BAUD = 64 * f_cpu / (16 * baud rate)
const BAUD: u16 = (4 * config::CPU_FREQ_HZ / config::UART_BAUD) as u16;

pub struct DebugConsole {
    _usart: PhantomData<USART0>,
}

impl DebugConsole {
    pub fn new() -> Self {
        unsafe {
            // drive TXD idle-high before enabling the transmitter
            (*PORTB::ptr()).outset.write(|w| w.bits(1 << 2));
            (*PORTB::ptr()).dirset.write(|w| w.bits(1 << 2));

            let p = USART0::ptr();
            (*p).baud.write(|w| w.bits(BAUD));
            (*p).ctrlb.write(|w| w.bits(TXEN));
        }
        Self { _usart: PhantomData }
    }
}

impl uWrite for DebugConsole {
    type Error = Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Infallible> {
        for &byte in s.as_bytes() {
            unsafe {
                let p = USART0::ptr();
                while (*p).status.read().bits() & DREIF == 0 {}
                (*p).txdatal.write(|w| w.bits(byte));
            }
        }
        Ok(())
    }
}
