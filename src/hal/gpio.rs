//! Pin configuration: indicator LED, raw button lines, bus pull-ups,
//! LCD supply rails and power-saving input-buffer control.

use avr_device::attiny417::{PORTA, PORTB, PORTC};
use core::convert::Infallible;
use core::marker::PhantomData;

use embedded_hal::digital::v2::InputPin;

// PINnCTRL values
const PULLUPEN: u8 = 1 << 3;
const ISC_INPUT_DISABLE: u8 = 0x04;

const LED_PIN: u8 = 1 << 5;

/// Indicator LED on PA5.
pub struct Led {
    _port: PhantomData<PORTA>,
}

impl Led {
    pub fn new() -> Self {
        unsafe { (*PORTA::ptr()).dirset.write(|w| w.bits(LED_PIN)) }
        Self { _port: PhantomData }
    }

    pub fn on(&mut self) {
        unsafe { (*PORTA::ptr()).outset.write(|w| w.bits(LED_PIN)) }
    }

    pub fn off(&mut self) {
        unsafe { (*PORTA::ptr()).outclr.write(|w| w.bits(LED_PIN)) }
    }

    pub fn toggle(&mut self) {
        unsafe { (*PORTA::ptr()).outtgl.write(|w| w.bits(LED_PIN)) }
    }
}

/// Raw button line on PORTB, sampled by the classifier on every tick.
pub struct ButtonLine<const PIN: u8> {
    _port: PhantomData<PORTB>,
}

impl<const PIN: u8> ButtonLine<PIN> {
    pub fn new() -> Self {
        unsafe { (*PORTB::ptr()).dirclr.write(|w| w.bits(1 << PIN)) }
        Self { _port: PhantomData }
    }
}

impl<const PIN: u8> InputPin for ButtonLine<PIN> {
    type Error = Infallible;

    fn is_high(&self) -> Result<bool, Infallible> {
        let levels = unsafe { (*PORTB::ptr()).in_.read().bits() };
        Ok(levels & (1 << PIN) != 0)
    }

    fn is_low(&self) -> Result<bool, Infallible> {
        self.is_high().map(|v| !v)
    }
}

pub type AddButton = ButtonLine<6>;
pub type SetButton = ButtonLine<7>;

/// Bus pull-ups on PB0/PB1 and power to the LCD controller:
/// VLCD (PA6) low, VDD (PA7) high.
pub fn setup_lcd_rails() {
    unsafe {
        let b = PORTB::ptr();
        (*b).pin0ctrl.write(|w| w.bits(PULLUPEN));
        (*b).pin1ctrl.write(|w| w.bits(PULLUPEN));

        let a = PORTA::ptr();
        (*a).dirset.write(|w| w.bits((1 << 6) | (1 << 7)));
        (*a).outclr.write(|w| w.bits(1 << 6));
        (*a).outset.write(|w| w.bits(1 << 7));
    }
}

/// Disable input buffers on unconnected pins to cut power-down leakage.
pub fn disable_unused_pins() {
    unsafe {
        let a = PORTA::ptr();
        (*a).pin1ctrl.write(|w| w.bits(ISC_INPUT_DISABLE));
        (*a).pin2ctrl.write(|w| w.bits(ISC_INPUT_DISABLE));
        (*a).pin3ctrl.write(|w| w.bits(ISC_INPUT_DISABLE));
        (*a).pin4ctrl.write(|w| w.bits(ISC_INPUT_DISABLE));

        let b = PORTB::ptr();
        (*b).pin4ctrl.write(|w| w.bits(ISC_INPUT_DISABLE));
        (*b).pin5ctrl.write(|w| w.bits(ISC_INPUT_DISABLE));

        let c = PORTC::ptr();
        (*c).pin0ctrl.write(|w| w.bits(ISC_INPUT_DISABLE));
        (*c).pin1ctrl.write(|w| w.bits(ISC_INPUT_DISABLE));
        (*c).pin2ctrl.write(|w| w.bits(ISC_INPUT_DISABLE));
        (*c).pin3ctrl.write(|w| w.bits(ISC_INPUT_DISABLE));
        (*c).pin4ctrl.write(|w| w.bits(ISC_INPUT_DISABLE));
        (*c).pin5ctrl.write(|w| w.bits(ISC_INPUT_DISABLE));
    }
}
