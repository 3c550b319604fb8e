#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::unescaped_backticks)]

//! Peripheral services of the signal generation board firmware.
//!
//! Every service is generic over a small register-level trait, so the same code drives the real
//! peripherals and the software emulation used by the tests.

/// Conversion trigger clock generator.
pub mod clock_gen;
/// Synthesizer initialization.
pub mod dds;
/// Gain DAC service.
pub mod gain;
/// Serial receive state machine.
pub mod receive;
/// Host transport.
pub mod transport;

/// Commonly used items.
pub mod prelude {
    pub use crate::{
        clock_gen::{ClockGenerator, Pcg, PcgControl, PcgRegisters},
        dds::init_synthesizers,
        gain::GainDac,
        receive::{ReceiveEvent, ReceiveState, SerialPort, SerialReceiver, SportControl},
        transport::{Transport, TransportOption},
    };
}
