//! CPU sleep-depth policy.
//!
//! In power-down only the RTC can wake the device, so entering it with a
//! bus transfer pending would starve the transfer's completion interrupt.
//! The interrupt paths re-apply this policy whenever the pending state
//! changes (every submit, every terminal outcome), with interrupts masked;
//! the foreground loop only executes the sleep instruction and therefore
//! never acts on a stale depth.

use ufmt::derive::uDebug;

#[derive(uDebug, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepDepth {
    /// Peripherals stay clocked; the bus interrupt can fire.
    Idle,
    /// Deepest sleep; only the RTC tick/second interrupts wake the CPU.
    PowerDown,
}

pub fn sleep_depth(bus_pending: bool) -> SleepDepth {
    if bus_pending {
        SleepDepth::Idle
    } else {
        SleepDepth::PowerDown
    }
}
