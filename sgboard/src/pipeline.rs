use sgboard_core::{
    buffer::SampleBuffer,
    calibration::Calibration,
    common::MAX_SAMPLES_BUFFER_SIZE,
    run::{AcquisitionRun, RunMode},
    sample::RawSample,
};

use crate::demod::Demodulator;

/// How a raw word becomes stored samples. Selected once when a run is armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Both channels are calibrated and stored.
    #[default]
    Direct,
    /// Channel A is calibrated and stored, then handed to the [`Demodulator`].
    Demodulate,
}

impl From<RunMode> for Strategy {
    fn from(mode: RunMode) -> Self {
        match mode {
            RunMode::Iq => Strategy::Direct,
            RunMode::If => Strategy::Demodulate,
        }
    }
}

/// The sample processing pipeline and its two channel buffers.
pub struct Pipeline<D: Demodulator, const N: usize = MAX_SAMPLES_BUFFER_SIZE> {
    calibration: Calibration,
    demodulator: D,
    strategy: Strategy,
    ch_a: SampleBuffer<N>,
    ch_b: SampleBuffer<N>,
}

impl<D: Demodulator, const N: usize> Pipeline<D, N> {
    /// Creates a new [`Pipeline`].
    #[must_use]
    pub const fn new(calibration: Calibration, demodulator: D) -> Self {
        Self {
            calibration,
            demodulator,
            strategy: Strategy::Direct,
            ch_a: SampleBuffer::new(),
            ch_b: SampleBuffer::new(),
        }
    }

    /// Prepares the pipeline for a run in `mode` and clears both buffers.
    pub fn arm(&mut self, mode: RunMode) {
        self.strategy = mode.into();
        self.ch_a.fill(0.0);
        self.ch_b.fill(0.0);
        if self.strategy == Strategy::Demodulate {
            self.demodulator.reset();
        }
        tracing::debug!("pipeline armed: {:?}", self.strategy);
    }

    /// Stores one sample at the current index of `run` and advances the index.
    ///
    /// Returns the values stored at that index for channel A and channel B.
    pub fn process(&mut self, raw: RawSample, run: &mut AcquisitionRun) -> (f32, f32) {
        let index = run.current_index();
        let values = match self.strategy {
            Strategy::Direct => {
                let (a, b) = self.calibration.convert(raw);
                self.ch_a.write(index, a);
                self.ch_b.write(index, b);
                (a, b)
            }
            Strategy::Demodulate => {
                self.ch_a
                    .write(index, self.calibration.ch_a.to_voltage(raw.channel_a()));
                self.demodulator
                    .demodulate(&mut self.ch_a, &mut self.ch_b, index);
                (self.ch_a.get(index), self.ch_b.get(index))
            }
        };
        run.advance();
        values
    }

    /// Returns the active strategy.
    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Returns the calibration.
    #[must_use]
    pub const fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Returns the demodulator.
    #[must_use]
    pub const fn demodulator(&self) -> &D {
        &self.demodulator
    }

    /// Returns the buffer of channel A.
    #[must_use]
    pub const fn ch_a(&self) -> &SampleBuffer<N> {
        &self.ch_a
    }

    /// Returns the buffer of channel B.
    #[must_use]
    pub const fn ch_b(&self) -> &SampleBuffer<N> {
        &self.ch_b
    }
}

impl<D: Demodulator + core::fmt::Debug, const N: usize> core::fmt::Debug for Pipeline<D, N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Pipeline")
            .field("calibration", &self.calibration)
            .field("demodulator", &self.demodulator)
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}
