use core::{num::NonZeroU32, ops::ControlFlow, time::Duration};

use sgboard_core::{
    buffer::SampleBuffer,
    clock::Clock,
    common::MAX_SAMPLES_BUFFER_SIZE,
    error::RunError,
    retry::Retry,
    run::{AcquisitionRun, Progress, RunConfig, RunState},
    sleep::Sleep,
};
use sgboard_driver::{
    clock_gen::ClockGenerator,
    receive::{ReceiveEvent, SerialPort, SerialReceiver},
};

use crate::{demod::Demodulator, pipeline::Pipeline};

/// The default budget of the receive buffer poll.
const RECEIVE_RETRY_ATTEMPTS: NonZeroU32 = match NonZeroU32::new(100) {
    Some(n) => n,
    None => NonZeroU32::MIN,
};

/// The option of [`Controller`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerOption {
    /// The number of sample periods without a completed sample after which the run is declared
    /// desynchronized.
    pub deadline_periods: u32,
    /// The budget of the receive buffer poll after the receive-complete interrupt.
    pub receive_retry: Retry,
}

impl Default for ControllerOption {
    fn default() -> Self {
        Self {
            deadline_periods: 4,
            receive_retry: Retry::new(RECEIVE_RETRY_ATTEMPTS),
        }
    }
}

/// What a handled interrupt meant for the run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RunEvent {
    /// A sample was stored.
    Sample {
        /// The logical index of the sample.
        index: u32,
        /// The stored values of channel A and channel B.
        values: (f32, f32),
    },
    /// A continuous run completed another block.
    BlockComplete {
        /// The number of blocks completed so far.
        blocks: u32,
    },
    /// A finite run acquired all its samples and stopped.
    Finished,
}

/// The samples of a finished run, oldest first.
#[derive(Debug, Clone, Copy)]
pub struct RunResults<'a, const N: usize = MAX_SAMPLES_BUFFER_SIZE> {
    ch_a: &'a SampleBuffer<N>,
    ch_b: &'a SampleBuffer<N>,
    end: u32,
    len: usize,
}

impl<'a, const N: usize> RunResults<'a, N> {
    fn new(ch_a: &'a SampleBuffer<N>, ch_b: &'a SampleBuffer<N>, run: &AcquisitionRun) -> Self {
        Self {
            ch_a,
            ch_b,
            end: run.current_index(),
            len: run.samples_available(N),
        }
    }

    /// The number of samples per channel.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no sample was acquired.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates channel A.
    pub fn channel_a(&self) -> impl ExactSizeIterator<Item = f32> + 'a {
        self.ch_a.recent(self.end, self.len)
    }

    /// Iterates channel B.
    pub fn channel_b(&self) -> impl ExactSizeIterator<Item = f32> + 'a {
        self.ch_b.recent(self.end, self.len)
    }
}

/// The acquisition run controller.
///
/// Owns the run, the clock generator, the serial receiver and the pipeline. Interrupt handlers
/// call [`Controller::dispatch`] (or the per-interrupt entry points); the main path calls
/// [`Controller::start_run`], [`Controller::stop_run`] and reads [`Controller::results`] once the
/// run has finished.
pub struct Controller<G, P, K, S, D, const N: usize = MAX_SAMPLES_BUFFER_SIZE>
where
    G: ClockGenerator,
    P: SerialPort,
    K: Clock,
    S: Sleep,
    D: Demodulator,
{
    clock_gen: G,
    receiver: SerialReceiver<P>,
    clock: K,
    sleeper: S,
    pipeline: Pipeline<D, N>,
    run: AcquisitionRun,
    option: ControllerOption,
    last_sample_at: Duration,
    consumed: bool,
}

impl<G, P, K, S, D, const N: usize> Controller<G, P, K, S, D, N>
where
    G: ClockGenerator,
    P: SerialPort,
    K: Clock,
    S: Sleep,
    D: Demodulator,
{
    /// Creates a new idle [`Controller`].
    #[must_use]
    pub fn new(
        clock_gen: G,
        port: P,
        clock: K,
        sleeper: S,
        pipeline: Pipeline<D, N>,
        option: ControllerOption,
    ) -> Self {
        Self {
            clock_gen,
            receiver: SerialReceiver::new(port, option.receive_retry),
            clock,
            sleeper,
            pipeline,
            run: AcquisitionRun::new(),
            option,
            last_sample_at: Duration::ZERO,
            consumed: true,
        }
    }

    /// Configures a new run and primes the front end without starting the clock.
    ///
    /// Any previous run is discarded.
    pub fn arm(&mut self, config: &RunConfig) -> Result<(), RunError> {
        if config.total_samples == 0 {
            return Err(RunError::InvalidSampleCount);
        }
        if self.run.is_running() {
            tracing::warn!(
                "discarding run in flight at sample {}",
                self.run.current_index()
            );
            self.clock_gen.stop();
            self.receiver.disarm();
        }
        if self.run.finished() && !self.consumed {
            tracing::warn!("discarding unconsumed results of the previous run");
        }
        if config.is_below_period_floor() {
            tracing::warn!(
                "sample period {:?} is below the hardware floor; samples will be lost",
                config.period
            );
        }
        if !config.continuous && config.total_samples as usize > N {
            tracing::warn!(
                "{} samples exceed the buffer capacity of {}; only the last {} are kept",
                config.total_samples,
                N,
                N
            );
        }

        self.run.arm(config)?;
        self.pipeline.arm(config.mode);
        self.receiver.disarm();
        self.receiver.arm();
        self.consumed = false;
        tracing::debug!(
            "run armed: {} samples, period {:?}, {}, {}",
            config.total_samples,
            config.period,
            if config.continuous { "continuous" } else { "finite" },
            config.mode
        );
        Ok(())
    }

    /// Starts the clock generator of an armed run.
    pub fn start(&mut self) {
        if self.run.state() != RunState::Armed {
            tracing::warn!("start ignored in {}", self.run.state());
            return;
        }
        self.run.start();
        self.last_sample_at = self.clock.now();
        self.clock_gen.start(self.run.period());
        tracing::debug!("run started");
    }

    /// Arms and starts a new run.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn start_run(&mut self, config: RunConfig) -> Result<(), RunError> {
        self.arm(&config)?;
        self.start();
        Ok(())
    }

    /// Stops the run. The samples acquired so far become available as results.
    pub fn stop_run(&mut self) {
        match self.run.state() {
            RunState::Armed | RunState::Running | RunState::Finishing => {
                self.clock_gen.stop();
                self.receiver.disarm();
                self.run.finish();
                tracing::debug!("run stopped at sample {}", self.run.current_index());
            }
            RunState::Idle | RunState::Stopped => {
                tracing::debug!("stop ignored in {}", self.run.state());
            }
        }
    }

    /// Handles one interrupt.
    pub fn dispatch(&mut self, event: ReceiveEvent) -> Result<Option<RunEvent>, RunError> {
        match event {
            ReceiveEvent::TriggerEdge => self.on_trigger_edge(),
            ReceiveEvent::FrameSync => self.on_frame_sync(),
            ReceiveEvent::ReceiveComplete => self.on_receive_complete(),
        }
    }

    /// Handles the conversion trigger interrupt.
    pub fn on_trigger_edge(&mut self) -> Result<Option<RunEvent>, RunError> {
        self.check_deadline()?;
        if !self.run.is_running() {
            tracing::trace!("trigger edge in {}", self.run.state());
            return Ok(None);
        }
        self.receiver
            .dispatch(ReceiveEvent::TriggerEdge, &self.sleeper)
            .map_err(|e| self.fail(e.into()))?;
        Ok(None)
    }

    /// Handles the frame sync interrupt.
    pub fn on_frame_sync(&mut self) -> Result<Option<RunEvent>, RunError> {
        self.receiver
            .dispatch(ReceiveEvent::FrameSync, &self.sleeper)
            .map_err(|e| self.fail(e.into()))?;
        Ok(None)
    }

    /// Handles the receive-complete interrupt.
    pub fn on_receive_complete(&mut self) -> Result<Option<RunEvent>, RunError> {
        let Some(raw) = self
            .receiver
            .dispatch(ReceiveEvent::ReceiveComplete, &self.sleeper)
            .map_err(|e| self.fail(e.into()))?
        else {
            return Ok(None);
        };
        if !self.run.is_running() {
            tracing::warn!("sample {} received in {}, dropped", raw, self.run.state());
            return Ok(None);
        }

        let index = self.run.current_index();
        let values = self.pipeline.process(raw, &mut self.run);
        self.last_sample_at = self.clock.now();
        tracing::trace!("sample {}: {} -> {:?}", index, raw, values);

        match self.run.progress() {
            Progress::Complete => {
                self.run.begin_finish();
                self.clock_gen.stop();
                self.run.finish();
                tracing::debug!("run finished after {} samples", self.run.current_index());
                Ok(Some(RunEvent::Finished))
            }
            Progress::BlockComplete => {
                self.receiver.arm();
                let blocks = self.run.blocks_completed();
                tracing::debug!("block {} complete", blocks);
                Ok(Some(RunEvent::BlockComplete { blocks }))
            }
            Progress::Continue => {
                self.receiver.arm();
                Ok(Some(RunEvent::Sample { index, values }))
            }
        }
    }

    /// Returns the per-sample deadline of the current run, saturating at [`Duration::MAX`].
    #[must_use]
    pub fn deadline(&self) -> Duration {
        self.run
            .period()
            .checked_mul(self.option.deadline_periods.max(1))
            .unwrap_or(Duration::MAX)
    }

    /// Stops the run with [`RunError::Desynchronized`] if no sample completed within the
    /// deadline.
    pub fn check_deadline(&mut self) -> Result<(), RunError> {
        if !self.run.is_running() {
            return Ok(());
        }
        let elapsed = self.clock.now().saturating_sub(self.last_sample_at);
        if elapsed > self.deadline() {
            return Err(self.fail(RunError::Desynchronized {
                index: self.run.current_index(),
                elapsed,
            }));
        }
        Ok(())
    }

    fn fail(&mut self, error: RunError) -> RunError {
        tracing::error!("run aborted: {}", error);
        self.clock_gen.stop();
        self.receiver.disarm();
        self.run.abort(error);
        error
    }

    /// Pumps interrupts until the run leaves [`RunState::Running`].
    ///
    /// `next_interrupt` returns the next pending interrupt, or `None` if none is pending, in
    /// which case the deadline is checked. `on_event` may break to stop the run.
    pub fn run(
        &mut self,
        mut next_interrupt: impl FnMut() -> Option<ReceiveEvent>,
        mut on_event: impl FnMut(&RunEvent) -> ControlFlow<()>,
    ) -> Result<RunState, RunError> {
        while self.run.is_running() {
            match next_interrupt() {
                Some(interrupt) => {
                    if let Some(event) = self.dispatch(interrupt)? {
                        if on_event(&event).is_break() {
                            self.stop_run();
                        }
                    }
                }
                None => self.check_deadline()?,
            }
        }
        Ok(self.run.state())
    }

    /// Returns the results of a finished run.
    #[must_use]
    pub fn results(&self) -> Option<RunResults<'_, N>> {
        self.run
            .finished()
            .then(|| RunResults::new(self.pipeline.ch_a(), self.pipeline.ch_b(), &self.run))
    }

    /// Returns the results of a finished run and marks them consumed.
    pub fn take_results(&mut self) -> Option<RunResults<'_, N>> {
        if !self.run.finished() {
            return None;
        }
        self.consumed = true;
        self.results()
    }

    /// Marks the results of a finished run consumed, once they reached the host.
    pub fn mark_results_consumed(&mut self) {
        if self.run.finished() {
            self.consumed = true;
        }
    }

    /// Returns `true` if the results of the last finished run were consumed, or if there are
    /// none to consume.
    #[must_use]
    pub const fn results_consumed(&self) -> bool {
        self.consumed || !self.run.finished()
    }

    /// Returns the current run.
    #[must_use]
    pub const fn acquisition(&self) -> &AcquisitionRun {
        &self.run
    }

    /// Returns the pipeline.
    #[must_use]
    pub const fn pipeline(&self) -> &Pipeline<D, N> {
        &self.pipeline
    }

    /// Returns the clock generator.
    #[must_use]
    pub const fn clock_generator(&self) -> &G {
        &self.clock_gen
    }

    /// Returns the serial receiver.
    #[must_use]
    pub const fn receiver(&self) -> &SerialReceiver<P> {
        &self.receiver
    }

    /// Returns the option.
    #[must_use]
    pub const fn option(&self) -> &ControllerOption {
        &self.option
    }
}
