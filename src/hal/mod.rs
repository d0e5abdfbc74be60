pub mod clock;
pub mod gpio;
pub mod power;
pub mod rtc;
pub mod twi;

#[cfg(feature = "debug-console")]
pub mod uart;

// Re-export commonly used types
pub use rtc::Rtc;
pub use twi::Twi;
