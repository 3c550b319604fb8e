use derive_more::Display;

use crate::{
    common::{DDS_PHASE_BITS, DDS_SYSTEM_CLOCK, Freq, kHz},
    error::DdsError,
};

/// A synthesizer of the board.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DdsChannel {
    /// The excitation signal.
    #[display("excitation")]
    Excitation = 1,
    /// The local oscillator of ADC channel A.
    #[display("local oscillator 1")]
    LocalOscillator1 = 2,
    /// The local oscillator of ADC channel B.
    #[display("local oscillator 2")]
    LocalOscillator2 = 3,
}

impl DdsChannel {
    /// All channels in programming order.
    pub const ALL: [DdsChannel; 3] = [
        DdsChannel::Excitation,
        DdsChannel::LocalOscillator1,
        DdsChannel::LocalOscillator2,
    ];

    /// Returns the 1-based channel number.
    #[must_use]
    pub const fn number(self) -> u8 {
        self as u8
    }
}

/// A 5-bit phase offset code in steps of 11.25°.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, PartialOrd, Ord)]
#[repr(transparent)]
pub struct DdsPhase(u8);

impl DdsPhase {
    /// 0°
    pub const DEG_0: DdsPhase = DdsPhase(0);
    /// 45°
    pub const DEG_45: DdsPhase = DdsPhase(4);
    /// 90°
    pub const DEG_90: DdsPhase = DdsPhase(8);
    /// 180°
    pub const DEG_180: DdsPhase = DdsPhase(16);

    /// Creates a new [`DdsPhase`], or `None` if `code` does not fit into 5 bits.
    #[must_use]
    pub const fn new(code: u8) -> Option<Self> {
        if code >> DDS_PHASE_BITS != 0 {
            None
        } else {
            Some(Self(code))
        }
    }

    /// Returns the raw code.
    #[must_use]
    pub const fn code(self) -> u8 {
        self.0
    }

    /// Returns the phase offset in degrees.
    #[must_use]
    pub fn degrees(self) -> f32 {
        self.0 as f32 * 360.0 / (1 << DDS_PHASE_BITS) as f32
    }
}

/// The full-scale output current setting shared by all synthesizers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum DdsCurrentScale {
    /// Scale 100 (lowest).
    #[default]
    S100 = 0,
    /// Scale 200.
    S200 = 1,
    /// Scale 500.
    S500 = 2,
    /// Scale 1000 (highest).
    S1000 = 3,
}

impl DdsCurrentScale {
    /// Returns the levels of the two scale select pins `(b0, b1)`.
    #[must_use]
    pub const fn pins(self) -> (bool, bool) {
        let v = self as u8;
        (v & 0x01 != 0, v & 0x02 != 0)
    }
}

/// The control byte shifted out after the 32-bit tuning word.
#[bitfield_struct::bitfield(u8)]
#[derive(PartialEq, Eq)]
pub struct DdsControlByte {
    /// Enables the 6× reference clock multiplier.
    pub x6_multiplier: bool,
    #[bits(1)]
    __: u8,
    /// Powers the synthesizer down.
    pub power_down: bool,
    /// Phase offset code.
    #[bits(5)]
    pub phase: u8,
}

impl DdsControlByte {
    /// Creates a control byte from a phase code and flags.
    #[must_use]
    pub const fn with_settings(phase: DdsPhase, power_down: bool, x6_multiplier: bool) -> Self {
        Self::new()
            .with_phase(phase.code())
            .with_power_down(power_down)
            .with_x6_multiplier(x6_multiplier)
    }
}

/// Converts an output frequency to a 32-bit phase increment.
///
/// `word = freq × 2^32 / system_clock`, truncated. Frequencies at or above the system clock
/// saturate.
#[must_use]
pub const fn frequency_to_tuning_word(freq: Freq<u32>, system_clock: Freq<u32>) -> u32 {
    if system_clock.hz() == 0 {
        return 0;
    }
    let word = ((freq.hz() as u64) << 32) / system_clock.hz() as u64;
    if word > u32::MAX as u64 {
        u32::MAX
    } else {
        word as u32
    }
}

/// The black-box synthesizer service.
///
/// Register transfer is the implementor's business; the firmware only sequences these calls.
pub trait Dds {
    /// Pulses the reset line of all synthesizers.
    fn reset(&mut self) -> Result<(), DdsError>;

    /// Loads a tuning word and control byte into the input register of `channel`.
    ///
    /// The value takes effect at the next [`Dds::update`].
    fn set_frequency_phase(
        &mut self,
        channel: DdsChannel,
        tuning_word: u32,
        control: DdsControlByte,
    ) -> Result<(), DdsError>;

    /// Pulses the frequency update line; all loaded values take effect simultaneously.
    fn update(&mut self) -> Result<(), DdsError>;

    /// Sets the output current scale.
    fn set_current_scale(&mut self, scale: DdsCurrentScale) -> Result<(), DdsError>;
}

impl<D: Dds + ?Sized> Dds for &mut D {
    fn reset(&mut self) -> Result<(), DdsError> {
        D::reset(self)
    }

    fn set_frequency_phase(
        &mut self,
        channel: DdsChannel,
        tuning_word: u32,
        control: DdsControlByte,
    ) -> Result<(), DdsError> {
        D::set_frequency_phase(self, channel, tuning_word, control)
    }

    fn update(&mut self) -> Result<(), DdsError> {
        D::update(self)
    }

    fn set_current_scale(&mut self, scale: DdsCurrentScale) -> Result<(), DdsError> {
        D::set_current_scale(self, scale)
    }
}

/// The programming of a single synthesizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DdsChannelSettings {
    /// Output frequency.
    pub frequency: Freq<u32>,
    /// Phase offset.
    pub phase: DdsPhase,
    /// If `true`, the synthesizer is powered down.
    pub power_down: bool,
}

impl DdsChannelSettings {
    /// Creates a new powered [`DdsChannelSettings`].
    #[must_use]
    pub const fn new(frequency: Freq<u32>, phase: DdsPhase) -> Self {
        Self {
            frequency,
            phase,
            power_down: false,
        }
    }
}

/// The frequency plan of the three synthesizers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DdsSettings {
    /// Excitation signal.
    pub excitation: DdsChannelSettings,
    /// Local oscillator of channel A.
    pub local_oscillator_1: DdsChannelSettings,
    /// Local oscillator of channel B.
    pub local_oscillator_2: DdsChannelSettings,
    /// System clock of the synthesizers.
    pub system_clock: Freq<u32>,
    /// If `true`, the 6× reference multiplier is enabled.
    pub x6_multiplier: bool,
    /// Output current scale.
    pub current_scale: DdsCurrentScale,
}

impl DdsSettings {
    /// Returns the settings of `channel`.
    #[must_use]
    pub const fn channel(&self, channel: DdsChannel) -> &DdsChannelSettings {
        match channel {
            DdsChannel::Excitation => &self.excitation,
            DdsChannel::LocalOscillator1 => &self.local_oscillator_1,
            DdsChannel::LocalOscillator2 => &self.local_oscillator_2,
        }
    }

    /// Returns the tuning word of `channel`.
    #[must_use]
    pub const fn tuning_word(&self, channel: DdsChannel) -> u32 {
        frequency_to_tuning_word(self.channel(channel).frequency, self.system_clock)
    }

    /// Returns the control byte of `channel`.
    #[must_use]
    pub const fn control_byte(&self, channel: DdsChannel) -> DdsControlByte {
        let s = self.channel(channel);
        DdsControlByte::with_settings(s.phase, s.power_down, self.x6_multiplier)
    }

    /// Returns the difference between excitation and local oscillator 1.
    ///
    /// This is the frequency at which the IF mode sees the signal.
    #[must_use]
    pub const fn intermediate_frequency(&self) -> Freq<u32> {
        self.excitation
            .frequency
            .abs_diff(self.local_oscillator_1.frequency)
    }
}

impl Default for DdsSettings {
    fn default() -> Self {
        Self {
            excitation: DdsChannelSettings::new(1000 * kHz, DdsPhase::DEG_0),
            local_oscillator_1: DdsChannelSettings::new(990 * kHz, DdsPhase::DEG_0),
            local_oscillator_2: DdsChannelSettings::new(990 * kHz, DdsPhase::DEG_90),
            system_clock: DDS_SYSTEM_CLOCK,
            x6_multiplier: true,
            current_scale: DdsCurrentScale::default(),
        }
    }
}

impl DdsChannelSettings {
    /// A powered down channel at 0 Hz.
    pub const OFF: DdsChannelSettings = DdsChannelSettings {
        frequency: Freq { freq: 0 },
        phase: DdsPhase::DEG_0,
        power_down: true,
    };
}
