use core::time::Duration;

use derive_more::Display;

use crate::{
    common::{DEFAULT_SAMPLE_PERIOD, MIN_SAMPLE_PERIOD},
    error::RunError,
};

/// The acquisition strategy of a run.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Only channel A is sampled; the quadrature components are recovered in software.
    #[display("IF")]
    If,
    /// Both channels are sampled and stored directly.
    #[default]
    #[display("IQ")]
    Iq,
}

/// The parameters of a start-run request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    /// The number of samples of a finite run, or the block size of a continuous run.
    pub total_samples: u32,
    /// The conversion period.
    pub period: Duration,
    /// If `true`, the run does not stop on sample count.
    pub continuous: bool,
    /// The acquisition strategy.
    pub mode: RunMode,
}

impl RunConfig {
    /// A run that stops after `total_samples` samples.
    #[must_use]
    pub const fn finite(total_samples: u32, period: Duration, mode: RunMode) -> Self {
        Self {
            total_samples,
            period,
            continuous: false,
            mode,
        }
    }

    /// A run that keeps sampling until stopped, reporting every `block_size` samples.
    #[must_use]
    pub const fn continuous(block_size: u32, period: Duration, mode: RunMode) -> Self {
        Self {
            total_samples: block_size,
            period,
            continuous: true,
            mode,
        }
    }

    /// Returns `true` if the period is below the hardware floor.
    #[must_use]
    pub fn is_below_period_floor(&self) -> bool {
        self.period < MIN_SAMPLE_PERIOD
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::finite(1000, DEFAULT_SAMPLE_PERIOD, RunMode::default())
    }
}

/// The lifecycle state of an acquisition run.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    /// No run has been requested since power up.
    #[default]
    Idle,
    /// The run is configured and the front end is primed; the clock is not running yet.
    Armed,
    /// The clock generator is running and samples are being acquired.
    Running,
    /// The sample count was reached; the clock is being stopped.
    Finishing,
    /// The run is over. Buffers belong to the transport until a new run is armed.
    Stopped,
}

/// What the last completed sample means for the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Keep sampling.
    Continue,
    /// A finite run reached its sample count.
    Complete,
    /// A continuous run completed another block of `total_samples` samples.
    BlockComplete,
}

/// The state of the current acquisition run.
///
/// There is exactly one run at a time; arming a new run resets this value in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquisitionRun {
    total_samples: u32,
    current_index: u32,
    continuous: bool,
    mode: RunMode,
    period: Duration,
    finished: bool,
    state: RunState,
    error: Option<RunError>,
    blocks_completed: u32,
    acquired: u32,
    in_block: u32,
}

impl AcquisitionRun {
    /// Creates a new idle [`AcquisitionRun`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            total_samples: 0,
            current_index: 0,
            continuous: false,
            mode: RunMode::Iq,
            period: DEFAULT_SAMPLE_PERIOD,
            finished: false,
            state: RunState::Idle,
            error: None,
            blocks_completed: 0,
            acquired: 0,
            in_block: 0,
        }
    }

    /// Resets the run to the requested configuration and moves it to [`RunState::Armed`].
    ///
    /// Any previous run is discarded, whatever its state.
    pub fn arm(&mut self, config: &RunConfig) -> Result<(), RunError> {
        if config.total_samples == 0 {
            return Err(RunError::InvalidSampleCount);
        }
        *self = Self {
            total_samples: config.total_samples,
            current_index: 0,
            continuous: config.continuous,
            mode: config.mode,
            period: config.period,
            finished: false,
            state: RunState::Armed,
            error: None,
            blocks_completed: 0,
            acquired: 0,
            in_block: 0,
        };
        Ok(())
    }

    /// Moves an armed run to [`RunState::Running`].
    pub fn start(&mut self) {
        if self.state == RunState::Armed {
            self.state = RunState::Running;
        }
    }

    /// Advances the sample index after a sample was stored.
    ///
    /// Finite runs never advance past `total_samples`. Continuous runs wrap around `u32`; block
    /// boundaries and the acquired count are tracked separately, so the wrap is invisible to
    /// both.
    pub fn advance(&mut self) -> Progress {
        if self.continuous {
            self.current_index = self.current_index.wrapping_add(1);
            self.acquired = self.acquired.saturating_add(1);
            self.in_block += 1;
            if self.in_block >= self.total_samples {
                self.in_block = 0;
                self.blocks_completed = self.blocks_completed.wrapping_add(1);
            }
        } else if self.current_index < self.total_samples {
            self.current_index += 1;
            self.acquired = self.current_index;
        }
        self.progress()
    }

    /// Returns what the current index means for the run.
    #[must_use]
    pub const fn progress(&self) -> Progress {
        if self.total_samples == 0 {
            return Progress::Continue;
        }
        if self.continuous {
            if self.acquired != 0 && self.in_block == 0 {
                Progress::BlockComplete
            } else {
                Progress::Continue
            }
        } else if self.current_index >= self.total_samples {
            Progress::Complete
        } else {
            Progress::Continue
        }
    }

    /// Marks the sample count as reached.
    pub fn begin_finish(&mut self) {
        self.state = RunState::Finishing;
    }

    /// Ends the run; the buffers are ready for the transport.
    pub fn finish(&mut self) {
        self.state = RunState::Stopped;
        self.finished = true;
    }

    /// Ends the run with an error. The buffers are not handed to the transport.
    pub fn abort(&mut self, error: RunError) {
        self.state = RunState::Stopped;
        self.finished = false;
        self.error = Some(error);
    }

    /// Returns `true` while the clock generator should be running.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self.state, RunState::Running)
    }

    /// The number of samples of a finite run, or the block size of a continuous run.
    #[must_use]
    pub const fn total_samples(&self) -> u32 {
        self.total_samples
    }

    /// The logical index of the next sample.
    #[must_use]
    pub const fn current_index(&self) -> u32 {
        self.current_index
    }

    /// Returns `true` for a continuous run.
    #[must_use]
    pub const fn continuous(&self) -> bool {
        self.continuous
    }

    /// The acquisition strategy.
    #[must_use]
    pub const fn mode(&self) -> RunMode {
        self.mode
    }

    /// The conversion period.
    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Returns `true` once the buffers may be read by the transport.
    #[must_use]
    pub const fn finished(&self) -> bool {
        self.finished
    }

    /// The lifecycle state.
    #[must_use]
    pub const fn state(&self) -> RunState {
        self.state
    }

    /// The error that ended the run, if any.
    #[must_use]
    pub const fn error(&self) -> Option<RunError> {
        self.error
    }

    /// The number of blocks a continuous run has completed.
    #[must_use]
    pub const fn blocks_completed(&self) -> u32 {
        self.blocks_completed
    }

    /// The number of samples acquired so far, saturating at `u32::MAX`.
    #[must_use]
    pub const fn samples_acquired(&self) -> u32 {
        self.acquired
    }

    /// The number of samples a buffer of `capacity` slots still holds for this run.
    #[must_use]
    pub const fn samples_available(&self, capacity: usize) -> usize {
        let n = self.acquired as usize;
        if n < capacity { n } else { capacity }
    }
}

impl Default for AcquisitionRun {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl AcquisitionRun {
    fn running_continuous_at(block_size: u32, index: u32, acquired: u32, in_block: u32) -> Self {
        Self {
            total_samples: block_size,
            current_index: index,
            continuous: true,
            mode: RunMode::Iq,
            period: DEFAULT_SAMPLE_PERIOD,
            finished: false,
            state: RunState::Running,
            error: None,
            blocks_completed: 0,
            acquired,
            in_block,
        }
    }
}
