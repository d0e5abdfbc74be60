//! SLPCTRL access: apply the sleep depth chosen by the policy in
//! [`lcd_timer_firmware::power`] and execute the sleep instruction.
//!
//! The depth is written by the interrupt paths whenever the bus-pending
//! state changes, never by the foreground loop. The loop only executes
//! [`sleep`], so the mode register always reflects the latest submit or
//! terminal outcome when the instruction runs.

use avr_device::attiny417::SLPCTRL;

use lcd_timer_firmware::power::SleepDepth;

const SEN: u8 = 1 << 0;
const SMODE_IDLE: u8 = 0x0 << 1;
const SMODE_PDOWN: u8 = 0x2 << 1;

/// Configure the depth of the next sleep. Called with interrupts masked,
/// so the write cannot race a foreground sleep entry.
pub fn set_depth(depth: SleepDepth) {
    let mode = match depth {
        SleepDepth::Idle => SMODE_IDLE,
        SleepDepth::PowerDown => SMODE_PDOWN,
    };
    unsafe { (*SLPCTRL::ptr()).ctrla.write(|w| w.bits(mode | SEN)) }
}

/// Put the CPU to sleep at the configured depth until the next enabled
/// interrupt.
pub fn sleep() {
    unsafe { avr_device::asm::sleep() }
}
