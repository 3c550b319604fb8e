#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::unescaped_backticks)]

//! Core traits and types for the signal generation board firmware.
//!
//! This crate has no dependency on the standard library unless the `std` feature is enabled.
//! Everything here is statically sized: sample storage is a const-generic ring and the run
//! model is a plain value that the interrupt handlers mutate in place.

/// Acquisition buffers.
pub mod buffer;
/// Calibration of the ADC channels.
pub mod calibration;
/// Monotonic time source.
pub mod clock;
/// Common constants and units.
pub mod common;
/// Direct digital synthesizer collaborator interface.
pub mod dds;
/// Error types.
pub mod error;
/// Gain DAC of the analog front end.
pub mod gain;
/// Byte oriented interface to the host bridge.
pub mod link;
/// Bounded busy polling.
pub mod retry;
/// Acquisition run model.
pub mod run;
/// Raw sample word.
pub mod sample;
/// Sleep strategies.
pub mod sleep;

/// Commonly used items.
pub mod prelude {
    pub use crate::{
        buffer::SampleBuffer,
        calibration::{Calibration, ChannelCalibration},
        clock::Clock,
        common::{Freq, Hz, MHz, kHz},
        dds::{Dds, DdsChannel, DdsPhase, DdsSettings},
        error::{DdsError, GainError, ReceiveError, RunError, TransportError, TransportStage},
        gain::{GainPort, GainPowerDown, GainSettings},
        link::{FifoBus, FifoStatus},
        retry::Retry,
        run::{AcquisitionRun, Progress, RunConfig, RunMode, RunState},
        sample::RawSample,
        sleep::{NopSleeper, Sleep},
    };
}
