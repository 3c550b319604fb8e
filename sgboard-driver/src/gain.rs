use sgboard_core::{
    error::GainError,
    gain::{GainPort, GainPowerDown, GainSettings, GainWord},
    retry::Retry,
    sleep::Sleep,
};

/// The gain DAC of the analog front end.
#[derive(Debug)]
pub struct GainDac<P: GainPort, S: Sleep> {
    port: P,
    sleeper: S,
    retry: Retry,
    settings: GainSettings,
    current: Option<GainWord>,
}

impl<P: GainPort, S: Sleep> GainDac<P, S> {
    /// Creates a new [`GainDac`]. Nothing is transmitted until [`GainDac::init`].
    #[must_use]
    pub const fn new(port: P, sleeper: S, retry: Retry, settings: GainSettings) -> Self {
        Self {
            port,
            sleeper,
            retry,
            settings,
            current: None,
        }
    }

    /// Transmits the power-up word.
    pub fn init(&mut self) -> Result<(), GainError> {
        self.transmit(self.settings.word())
    }

    /// Sets the DAC code and output mode. Bits of `value` above 12 are discarded.
    pub fn set_voltage(&mut self, value: u16, power_down: GainPowerDown) -> Result<(), GainError> {
        self.transmit(GainWord::encode(value, power_down))
    }

    /// Returns the last word transmitted.
    #[must_use]
    pub const fn current(&self) -> Option<GainWord> {
        self.current
    }

    /// Returns the port.
    #[must_use]
    pub const fn port(&self) -> &P {
        &self.port
    }

    fn transmit(&mut self, word: GainWord) -> Result<(), GainError> {
        let port = &mut self.port;
        if !self.retry.poll(&self.sleeper, || !port.is_busy()) {
            tracing::error!("gain DAC transmit buffer busy");
            return Err(GainError::Busy);
        }
        tracing::debug!(
            "gain DAC: value = {:#05X}, power down = {:?}",
            word.value(),
            word.power_down()
        );
        self.port.transmit(word.into_bits());
        self.current = Some(word);
        Ok(())
    }
}
