use sgboard_core::{
    clock::Clock,
    common::MAX_SAMPLES_BUFFER_SIZE,
    dds::{Dds, DdsSettings},
    gain::{GainPort, GainPowerDown},
    link::FifoBus,
    run::RunConfig,
    sleep::Sleep,
};
use sgboard_driver::{
    clock_gen::ClockGenerator, dds::init_synthesizers, gain::GainDac, receive::SerialPort,
    transport::Transport,
};

use crate::{controller::Controller, demod::Demodulator, error::BoardError};

/// The whole board: acquisition controller, host transport, synthesizers and gain DAC.
pub struct Board<G, P, K, S, D, B, Y, Q, const N: usize = MAX_SAMPLES_BUFFER_SIZE>
where
    G: ClockGenerator,
    P: SerialPort,
    K: Clock,
    S: Sleep,
    D: Demodulator,
    B: FifoBus,
    Y: Dds,
    Q: GainPort,
{
    controller: Controller<G, P, K, S, D, N>,
    transport: Transport<B, S>,
    dds: Y,
    dds_settings: DdsSettings,
    gain: GainDac<Q, S>,
}

impl<G, P, K, S, D, B, Y, Q, const N: usize> Board<G, P, K, S, D, B, Y, Q, N>
where
    G: ClockGenerator,
    P: SerialPort,
    K: Clock,
    S: Sleep,
    D: Demodulator,
    B: FifoBus,
    Y: Dds,
    Q: GainPort,
{
    /// Creates a new [`Board`]. No peripheral is touched until [`Board::init`].
    #[must_use]
    pub const fn new(
        controller: Controller<G, P, K, S, D, N>,
        transport: Transport<B, S>,
        dds: Y,
        dds_settings: DdsSettings,
        gain: GainDac<Q, S>,
    ) -> Self {
        Self {
            controller,
            transport,
            dds,
            dds_settings,
            gain,
        }
    }

    /// Brings the board up: discards stale host bytes, programs the synthesizers and powers up
    /// the gain DAC.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn init(&mut self) -> Result<(), BoardError> {
        self.transport.purge();
        init_synthesizers(&mut self.dds, &self.dds_settings)?;
        self.gain.init()?;
        Ok(())
    }

    /// Arms and starts a new acquisition run.
    pub fn start_run(&mut self, config: RunConfig) -> Result<(), BoardError> {
        Ok(self.controller.start_run(config)?)
    }

    /// Stops the acquisition run.
    pub fn stop_run(&mut self) {
        self.controller.stop_run();
    }

    /// Sets the gain DAC code and output mode.
    pub fn set_gain(&mut self, value: u16, power_down: GainPowerDown) -> Result<(), BoardError> {
        Ok(self.gain.set_voltage(value, power_down)?)
    }

    /// Sends the results of the finished run to the host.
    ///
    /// The payload is every sample of channel A followed by every sample of channel B, each as
    /// the 4 bytes of its bit pattern, least significant byte first. The results count as
    /// consumed only once the whole packet was written.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn send_results(&mut self) -> Result<usize, BoardError> {
        if let Some(err) = self.controller.acquisition().error() {
            return Err(err.into());
        }
        let Some(results) = self.controller.results() else {
            return Err(BoardError::NotFinished);
        };
        let len = results.len();
        self.transport
            .write_packet_header(len * 2 * core::mem::size_of::<f32>())?;
        self.transport.send_samples(results.channel_a())?;
        self.transport.send_samples(results.channel_b())?;
        self.controller.mark_results_consumed();
        tracing::debug!("sent {} samples per channel", len);
        Ok(len)
    }

    /// Returns the acquisition controller.
    #[must_use]
    pub const fn controller(&self) -> &Controller<G, P, K, S, D, N> {
        &self.controller
    }

    /// Returns the acquisition controller.
    pub fn controller_mut(&mut self) -> &mut Controller<G, P, K, S, D, N> {
        &mut self.controller
    }

    /// Returns the host transport.
    #[must_use]
    pub const fn transport(&self) -> &Transport<B, S> {
        &self.transport
    }

    /// Returns the host transport.
    pub fn transport_mut(&mut self) -> &mut Transport<B, S> {
        &mut self.transport
    }

    /// Returns the synthesizers.
    #[must_use]
    pub const fn dds(&self) -> &Y {
        &self.dds
    }

    /// Returns the synthesizers.
    pub fn dds_mut(&mut self) -> &mut Y {
        &mut self.dds
    }

    /// Returns the synthesizer plan.
    #[must_use]
    pub const fn dds_settings(&self) -> &DdsSettings {
        &self.dds_settings
    }

    /// Returns the gain DAC.
    #[must_use]
    pub const fn gain(&self) -> &GainDac<Q, S> {
        &self.gain
    }
}
