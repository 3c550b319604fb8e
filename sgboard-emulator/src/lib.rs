//! Software emulation of the signal generation board peripherals.
//!
//! The acquisition front end (clock generator, ADC pair and serial port) shares one state so that
//! [`FrontEndEmulator::next_interrupt`] can replay the interrupt sequence the hardware would
//! raise for the current register contents.

pub mod dds;
pub mod front_end;
pub mod gain;
pub mod usb;

pub use dds::DdsEmulator;
pub use front_end::{EmulatedClock, FrontEndEmulator, PcgEmulator, SportEmulator};
pub use gain::GainPortEmulator;
pub use usb::UsbFifoEmulator;
