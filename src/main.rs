//! Countdown timer firmware for the ATtiny417 board.
//!
//! The foreground loop only sleeps; all work happens in three interrupt
//! handlers. The TWI vector runs the bus transfer engine, the RTC tick
//! samples the buttons and reconciles the display, the RTC overflow
//! decrements the countdown once per second.

#![no_std]
#![no_main]
#![feature(abi_avr_interrupt)]

use panic_halt as _;

use avr_device::attiny417::Peripherals;
use avr_device::interrupt::{self, Mutex};
use core::cell::RefCell;

mod hal;

use hal::gpio::{AddButton, Led, SetButton};
use hal::{Rtc, Twi};
use lcd_timer_firmware::app::{App, Board, Event};
use lcd_timer_firmware::bus::{BusEngine, SubmitError};
use lcd_timer_firmware::buttons::Buttons;
use lcd_timer_firmware::config;
use lcd_timer_firmware::drivers::lcd;
use lcd_timer_firmware::power;

#[cfg(feature = "debug-console")]
use lcd_timer_firmware::bus::BusOutcome;

/// The one device context shared with the interrupt handlers. Each field
/// has a single writing interrupt path; the foreground loop never touches
/// the context after startup.
struct Device {
    engine: BusEngine,
    twi: Twi,
    rtc: Rtc,
    buttons: Buttons<AddButton, SetButton>,
    app: App,
    led: Led,
    #[cfg(feature = "debug-console")]
    console: hal::uart::DebugConsole,
}

static DEVICE: Mutex<RefCell<Option<Device>>> = Mutex::new(RefCell::new(None));

/// Peripheral borrows handed to the application state machine.
struct AvrBoard<'a> {
    engine: &'a mut BusEngine,
    twi: &'a mut Twi,
    rtc: &'a mut Rtc,
    led: &'a mut Led,
}

impl Board for AvrBoard<'_> {
    fn start_second_timer(&mut self, from_count: u16) {
        self.rtc.start_seconds(from_count);
    }

    fn stop_second_timer(&mut self) -> u16 {
        self.rtc.stop_seconds()
    }

    fn led_on(&mut self) {
        self.led.on();
    }

    fn led_off(&mut self) {
        self.led.off();
    }

    fn led_toggle(&mut self) {
        self.led.toggle();
    }

    fn submit_display(&mut self, bytes: &[u8]) -> nb::Result<(), SubmitError> {
        self.engine
            .submit_write(self.twi, config::LCD_ADDRESS, bytes)
    }
}

#[avr_device::entry]
fn main() -> ! {
    let _dp = Peripherals::take().unwrap();

    hal::clock::init();
    hal::gpio::setup_lcd_rails();
    hal::gpio::disable_unused_pins();

    let device = Device {
        engine: BusEngine::new(),
        twi: Twi::new(),
        rtc: Rtc::new(),
        buttons: Buttons::new(AddButton::new(), SetButton::new()),
        app: App::new(),
        led: Led::new(),
        #[cfg(feature = "debug-console")]
        console: hal::uart::DebugConsole::new(),
    };

    interrupt::free(|cs| {
        DEVICE.borrow(cs).replace(Some(device));
    });
    hal::power::set_depth(power::SleepDepth::PowerDown);

    // SAFETY: the device context is in place, the vectors may fire now
    unsafe { avr_device::interrupt::enable() };

    // power the display on and show 0:00; the transfer completes in the
    // TWI vector while the loop below sleeps in idle depth
    let mut boot_frame = lcd::frame(0, 0, false);
    boot_frame[0] = lcd::power_on_command();
    interrupt::free(|cs| {
        if let Some(dev) = DEVICE.borrow(cs).borrow_mut().as_mut() {
            let _ = dev
                .engine
                .submit_write(&mut dev.twi, config::LCD_ADDRESS, &boot_frame);
            hal::power::set_depth(power::sleep_depth(dev.engine.pending()));

            #[cfg(feature = "debug-console")]
            let _ = ufmt::uwriteln!(dev.console, "lcd_timer_firmware up");
        }
    });

    // The sleep depth is maintained by the interrupt paths: every submit
    // and every terminal outcome rewrites SLPCTRL with interrupts masked,
    // so it can never be stale here.
    loop {
        hal::power::sleep();
    }
}

#[avr_device::interrupt(attiny417)]
fn TWI0_TWIM() {
    interrupt::free(|cs| {
        if let Some(dev) = DEVICE.borrow(cs).borrow_mut().as_mut() {
            dev.engine.on_interrupt(&mut dev.twi);
            hal::power::set_depth(power::sleep_depth(dev.engine.pending()));

            #[cfg(feature = "debug-console")]
            if !dev.engine.pending() && dev.engine.outcome() != BusOutcome::Success {
                let outcome = dev.engine.outcome();
                let _ = ufmt::uwriteln!(dev.console, "bus fault: {:?}", outcome);
            }
        }
    });
}

#[avr_device::interrupt(attiny417)]
fn RTC_PIT() {
    interrupt::free(|cs| {
        if let Some(dev) = DEVICE.borrow(cs).borrow_mut().as_mut() {
            dev.rtc.clear_tick();

            let Device {
                engine,
                twi,
                rtc,
                buttons,
                app,
                led,
                ..
            } = dev;
            let mut board = AvrBoard {
                engine,
                twi,
                rtc,
                led,
            };

            for event in buttons.on_tick().into_iter().flatten() {
                app.handle(Event::Button(event), &mut board);
            }
            app.refresh(&mut board);
            hal::power::set_depth(power::sleep_depth(board.engine.pending()));
        }
    });
}

#[avr_device::interrupt(attiny417)]
fn RTC_CNT() {
    interrupt::free(|cs| {
        if let Some(dev) = DEVICE.borrow(cs).borrow_mut().as_mut() {
            dev.rtc.clear_second();

            let Device {
                engine,
                twi,
                rtc,
                app,
                led,
                ..
            } = dev;
            let mut board = AvrBoard {
                engine,
                twi,
                rtc,
                led,
            };
            app.handle(Event::SecondElapsed, &mut board);
        }
    });
}
