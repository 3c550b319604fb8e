/// The largest code of the 12-bit gain DAC.
pub const GAIN_MAX_VALUE: u16 = 0x0FFF;

/// The output mode of the gain DAC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum GainPowerDown {
    /// Normal operation; the output follows the code.
    #[default]
    Normal = 0b00,
    /// Output pulled to ground through 1 kΩ.
    Pulldown1k = 0b01,
    /// Output pulled to ground through 100 kΩ.
    Pulldown100k = 0b10,
    /// Output in high impedance.
    ThreeState = 0b11,
}

impl GainPowerDown {
    const fn into_bits(self) -> u16 {
        self as u16
    }

    const fn from_bits(value: u16) -> Self {
        match value & 0b11 {
            0b00 => Self::Normal,
            0b01 => Self::Pulldown1k,
            0b10 => Self::Pulldown100k,
            _ => Self::ThreeState,
        }
    }
}

/// The 16-bit word shifted into the gain DAC.
///
/// `[2 bit power down | 12 bit value | 2 bit don't care]`, MSB first.
#[bitfield_struct::bitfield(u16)]
#[derive(PartialEq, Eq)]
pub struct GainWord {
    #[bits(2)]
    __: u8,
    /// The DAC code.
    #[bits(12)]
    pub value: u16,
    /// The output mode.
    #[bits(2)]
    pub power_down: GainPowerDown,
}

impl GainWord {
    /// Creates a word, discarding value bits above 12.
    #[must_use]
    pub const fn encode(value: u16, power_down: GainPowerDown) -> Self {
        Self::new()
            .with_value(value & GAIN_MAX_VALUE)
            .with_power_down(power_down)
    }
}

/// The serial transmitter wired to the gain DAC.
pub trait GainPort {
    /// Returns `true` while the transmit buffer still holds the previous word.
    fn is_busy(&mut self) -> bool;

    /// Loads a word into the transmit buffer.
    fn transmit(&mut self, word: u16);
}

impl<P: GainPort + ?Sized> GainPort for &mut P {
    fn is_busy(&mut self) -> bool {
        P::is_busy(self)
    }

    fn transmit(&mut self, word: u16) {
        P::transmit(self, word)
    }
}

/// The power-up programming of the gain DAC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GainSettings {
    /// The initial DAC code.
    pub value: u16,
    /// The initial output mode.
    pub power_down: GainPowerDown,
}

impl GainSettings {
    /// Returns the configured word.
    #[must_use]
    pub const fn word(&self) -> GainWord {
        GainWord::encode(self.value, self.power_down)
    }
}

impl Default for GainSettings {
    fn default() -> Self {
        Self {
            value: 0x0800,
            power_down: GainPowerDown::Normal,
        }
    }
}
