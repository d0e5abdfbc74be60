//! Configuration constants for the countdown timer firmware

/// CPU frequency in Hz (20 MHz internal oscillator prescaled by 2)
pub const CPU_FREQ_HZ: u32 = 10_000_000;

/// Two-wire bus clock in Hz (fast mode)
pub const TWI_FREQ_HZ: u32 = 400_000;

/// Bus line rise time in nanoseconds, from the controller datasheet
pub const TWI_RISE_NS: u32 = 300;

/// LCD controller bus address (7-bit)
pub const LCD_ADDRESS: u8 = 0x3E;

/// UART baud rate for the development console
pub const UART_BAUD: u32 = 9600;

/// Rate of the periodic sampling/refresh tick in Hz
pub const TICK_HZ: u16 = 64;

/// RTC period for a one-second overflow at 32.768 kHz (counts 0..=PERIOD)
pub const SECOND_PERIOD: u16 = 32_767;

/// Ticks a held Add button needs to fire its long-press action (~0.5 s)
pub const LONG_PRESS_TICKS: u16 = 32;

/// Ticks a held Set button needs to fire its reset action (~1 s)
pub const ULTRA_PRESS_TICKS: u16 = 64;

/// Upper bound of preset/remaining seconds (displayed as 99:59)
pub const MAX_SECONDS: u16 = 5_999;

/// Seconds added per short Add press
pub const ADD_SHORT_SECS: u16 = 10;

/// Seconds added per long Add press (once per hold)
pub const ADD_LONG_SECS: u16 = 60;

/// Button lines read as pressed when high
pub const BUTTON_ACTIVE_HIGH: bool = true;

/// Baud register value for the bus controller:
/// `f_scl = f_cpu / (10 + 2*BAUD + f_cpu*t_rise)`
pub const fn twi_baud() -> u8 {
    let rise_cycles = (CPU_FREQ_HZ as u64 * TWI_RISE_NS as u64 / 1_000_000_000) as u32;
    ((CPU_FREQ_HZ / TWI_FREQ_HZ - rise_cycles - 10) / 2) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baud_for_400khz_at_10mhz() {
        // 10 MHz / 400 kHz = 25 cycles per bit, 3 of which are rise time
        assert_eq!(twi_baud(), 6);
    }

    #[test]
    fn tick_matches_long_press_timings() {
        // Add long press at half a second, Set reset at a full second
        assert_eq!(LONG_PRESS_TICKS * 2, TICK_HZ);
        assert_eq!(ULTRA_PRESS_TICKS, TICK_HZ);
    }
}
