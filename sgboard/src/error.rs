use sgboard_core::error::{DdsError, GainError, RunError, TransportError};
use thiserror::Error;

/// An error produced by the [`Board`](crate::board::Board).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardError {
    /// The acquisition run failed or could not be started.
    #[error("{0}")]
    Run(#[from] RunError),
    /// The host transport failed.
    #[error("{0}")]
    Transport(#[from] TransportError),
    /// The gain DAC failed.
    #[error("{0}")]
    Gain(#[from] GainError),
    /// The synthesizers could not be programmed.
    #[error("{0}")]
    Dds(#[from] DdsError),
    /// Results were requested before the run finished.
    #[error("Acquisition run has not finished")]
    NotFinished,
}
