use core::time::Duration;

use derive_more::Display;
use thiserror::Error;

use crate::dds::DdsChannel;

/// The step of a host transaction that was being performed when the transport gave up.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum TransportStage {
    /// Waiting for the start-of-packet sentinel.
    #[display("start of packet")]
    StartOfPacket,
    /// Reading the 2-byte packet size.
    #[display("packet size")]
    PacketSize,
    /// Reading the payload.
    #[display("payload")]
    Payload,
    /// Waiting for space in the outgoing FIFO.
    #[display("transmit space")]
    Write,
}

/// An error produced by the host transport.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// A status poll exhausted its retry budget.
    #[error("Transport timed out waiting for {0}")]
    Timeout(TransportStage),
    /// The destination buffer cannot hold the announced payload.
    #[error("Payload of {required} bytes does not fit into a buffer of {capacity} bytes")]
    BufferTooSmall {
        /// The announced payload size.
        required: usize,
        /// The size of the destination buffer.
        capacity: usize,
    },
    /// The payload is longer than the 2-byte size field can describe.
    #[error("Payload of {0} bytes exceeds the maximum packet size")]
    PayloadTooLarge(usize),
    /// The first byte of a packet was not the start-of-packet sentinel.
    #[error("Unexpected packet header ({0:#04X})")]
    UnexpectedHeader(u8),
}

/// An error produced by the serial receive path.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveError {
    /// The receive-complete interrupt fired but no word reached the receive buffer.
    #[error("Receive buffer stayed empty after the receive-complete interrupt")]
    RxTimeout,
}

/// An error that ends or prevents an acquisition run.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunError {
    /// A run must acquire at least one sample.
    #[error("Total number of samples must not be zero")]
    InvalidSampleCount,
    /// No sample arrived within the per-sample deadline.
    #[error("No sample completed for {elapsed:?} after sample {index}; front end desynchronized")]
    Desynchronized {
        /// The index of the sample that never completed.
        index: u32,
        /// The time since the last completed sample.
        elapsed: Duration,
    },
    /// The serial receive path failed.
    #[error("{0}")]
    Receive(#[from] ReceiveError),
}

/// An error produced by the gain DAC.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GainError {
    /// The serial transmit buffer did not drain within the retry budget.
    #[error("Gain DAC transmit buffer is busy")]
    Busy,
}

/// An error produced by the synthesizer service.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DdsError {
    /// The serial port of a synthesizer did not accept the configuration word.
    #[error("Synthesizer port of {0} channel is busy")]
    Busy(DdsChannel),
    /// The reset or update line could not be driven.
    #[error("Synthesizer control line could not be driven")]
    ControlLine,
}
