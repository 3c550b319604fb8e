#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::unescaped_backticks)]

//! Acquisition run controller of the signal generation board firmware.
//!
//! A run is driven entirely by interrupts: the clock generator triggers a conversion on both
//! ADCs, the serial port frames the daisy-chained result word, and the receive-complete
//! interrupt hands the word to the [`Pipeline`](pipeline::Pipeline), which calibrates it and
//! stores it in the per-channel ring buffers. The [`Board`](board::Board) ties the controller to
//! the host transport, the synthesizers and the gain DAC.

/// Board facade.
pub mod board;
/// Acquisition run controller.
pub mod controller;
/// Software demodulation of IF mode runs.
pub mod demod;
/// Error type of the board facade.
pub mod error;
/// Sample processing pipeline.
pub mod pipeline;

pub use sgboard_core;
pub use sgboard_driver as driver;

pub use board::Board;
pub use controller::Controller;

/// Commonly used items.
pub mod prelude {
    pub use sgboard_core::prelude::*;
    pub use sgboard_driver::prelude::*;

    pub use crate::{
        board::Board,
        controller::{Controller, ControllerOption, RunEvent, RunResults},
        demod::{Demodulator, NullDemodulator, QuadratureDemodulator},
        error::BoardError,
        pipeline::{Pipeline, Strategy},
    };
}
