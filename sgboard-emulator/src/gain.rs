use sgboard_core::gain::{GainPort, GainWord};

/// Emulator of the serial transmitter wired to the gain DAC.
#[derive(Debug, Default, Clone)]
pub struct GainPortEmulator {
    words: Vec<u16>,
    latency: u32,
    busy_polls: u32,
    broken: bool,
}

impl GainPortEmulator {
    /// Creates a new [`GainPortEmulator`] that drains every word immediately.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new [`GainPortEmulator`] that reports busy for `latency` polls after each
    /// word.
    #[must_use]
    pub fn with_latency(latency: u32) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    /// Makes the transmit buffer never drain.
    pub fn break_down(&mut self) {
        self.broken = true;
    }

    /// Makes the transmit buffer drain again.
    pub fn repair(&mut self) {
        self.broken = false;
    }

    /// Returns every word transmitted so far.
    #[must_use]
    pub fn words(&self) -> &[u16] {
        &self.words
    }

    /// Returns the word the DAC currently holds.
    #[must_use]
    pub fn last_word(&self) -> Option<GainWord> {
        self.words.last().copied().map(GainWord::from_bits)
    }
}

impl GainPort for GainPortEmulator {
    fn is_busy(&mut self) -> bool {
        if self.broken {
            return true;
        }
        if self.busy_polls > 0 {
            self.busy_polls -= 1;
            return true;
        }
        false
    }

    fn transmit(&mut self, word: u16) {
        self.words.push(word);
        self.busy_polls = self.latency;
    }
}
