use sgboard_core::{
    common::{Freq, Hz},
    dds::{Dds, DdsChannel, DdsControlByte, DdsCurrentScale, DdsPhase},
    error::DdsError,
};

/// Emulator of the three synthesizers.
///
/// Tuning words and control bytes are loaded into an input register and only reach the output
/// register on an update pulse, as on the real parts.
#[derive(Debug, Default, Clone, Copy)]
pub struct DdsEmulator {
    input: [Option<(u32, DdsControlByte)>; 3],
    output: [Option<(u32, DdsControlByte)>; 3],
    current_scale: Option<DdsCurrentScale>,
    resets: u32,
    updates: u32,
    busy: Option<DdsChannel>,
    broken: bool,
}

impl DdsEmulator {
    /// Creates a new [`DdsEmulator`] in its power-on state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    const fn slot(channel: DdsChannel) -> usize {
        (channel.number() - 1) as usize
    }

    /// Makes the serial port of `channel` reject every word.
    pub fn set_busy(&mut self, channel: Option<DdsChannel>) {
        self.busy = channel;
    }

    /// Makes the reset and update lines fail.
    pub fn break_down(&mut self) {
        self.broken = true;
    }

    /// Restores the reset and update lines.
    pub fn repair(&mut self) {
        self.broken = false;
    }

    /// Returns the active tuning word of `channel`.
    #[must_use]
    pub fn tuning_word(&self, channel: DdsChannel) -> Option<u32> {
        self.output[Self::slot(channel)].map(|(word, _)| word)
    }

    /// Returns the active control byte of `channel`.
    #[must_use]
    pub fn control(&self, channel: DdsChannel) -> Option<DdsControlByte> {
        self.output[Self::slot(channel)].map(|(_, control)| control)
    }

    /// Returns the active output frequency of `channel` for `system_clock`, truncated to whole
    /// hertz.
    #[must_use]
    pub fn frequency(&self, channel: DdsChannel, system_clock: Freq<u32>) -> Option<Freq<u32>> {
        self.tuning_word(channel)
            .map(|word| ((word as u64 * system_clock.hz() as u64) >> 32) as u32 * Hz)
    }

    /// Returns the active phase offset of `channel`.
    #[must_use]
    pub fn phase(&self, channel: DdsChannel) -> Option<DdsPhase> {
        self.control(channel).and_then(|c| DdsPhase::new(c.phase()))
    }

    /// Returns `true` if `channel` has a word loaded that was not latched yet.
    #[must_use]
    pub fn is_pending(&self, channel: DdsChannel) -> bool {
        self.input[Self::slot(channel)] != self.output[Self::slot(channel)]
    }

    /// Returns the output current scale.
    #[must_use]
    pub const fn current_scale(&self) -> Option<DdsCurrentScale> {
        self.current_scale
    }

    /// Returns the number of reset pulses.
    #[must_use]
    pub const fn resets(&self) -> u32 {
        self.resets
    }

    /// Returns the number of update pulses.
    #[must_use]
    pub const fn updates(&self) -> u32 {
        self.updates
    }
}

impl Dds for DdsEmulator {
    fn reset(&mut self) -> Result<(), DdsError> {
        if self.broken {
            return Err(DdsError::ControlLine);
        }
        self.input = Default::default();
        self.output = Default::default();
        self.resets += 1;
        Ok(())
    }

    fn set_frequency_phase(
        &mut self,
        channel: DdsChannel,
        tuning_word: u32,
        control: DdsControlByte,
    ) -> Result<(), DdsError> {
        if self.busy == Some(channel) {
            return Err(DdsError::Busy(channel));
        }
        self.input[Self::slot(channel)] = Some((tuning_word, control));
        Ok(())
    }

    fn update(&mut self) -> Result<(), DdsError> {
        if self.broken {
            return Err(DdsError::ControlLine);
        }
        self.output = self.input;
        self.updates += 1;
        Ok(())
    }

    fn set_current_scale(&mut self, scale: DdsCurrentScale) -> Result<(), DdsError> {
        self.current_scale = Some(scale);
        Ok(())
    }
}
