use std::env;

fn main() {
    let target = env::var("TARGET").unwrap();

    // Only the AVR binary needs the device-specific linker argument.
    // Host builds compile the library for unit testing and get nothing.
    if target.contains("avr") {
        println!("cargo:rustc-link-arg=-mmcu=attiny417");
    }
}
