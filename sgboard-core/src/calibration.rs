use getset::CopyGetters;

use crate::{common::VOLTS_PER_CODE, sample::RawSample};

/// The calibration of a single ADC channel.
///
/// `to_voltage(code) = (code - offset) * scale`
#[derive(Clone, Copy, Debug, PartialEq, CopyGetters)]
pub struct ChannelCalibration {
    /// The code measured with the input shorted.
    #[getset(get_copy = "pub")]
    offset: i32,
    /// The voltage of one code \[V\].
    #[getset(get_copy = "pub")]
    scale: f32,
}

impl ChannelCalibration {
    /// Creates a new [`ChannelCalibration`] with the nominal scale of `VREF / 65536`.
    #[must_use]
    pub const fn new(offset: i32) -> Self {
        Self {
            offset,
            scale: VOLTS_PER_CODE,
        }
    }

    /// Sets the voltage of one code.
    #[must_use]
    pub const fn with_scale(self, scale: f32) -> Self {
        Self { scale, ..self }
    }

    /// Converts a raw code to a calibrated voltage.
    #[inline]
    #[must_use]
    pub fn to_voltage(&self, code: u16) -> f32 {
        (code as i32 - self.offset) as f32 * self.scale
    }
}

impl Default for ChannelCalibration {
    fn default() -> Self {
        Self::new(0)
    }
}

/// The calibration of both ADC channels.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Calibration {
    /// Channel A (upper half-word of the sample).
    pub ch_a: ChannelCalibration,
    /// Channel B (lower half-word of the sample).
    pub ch_b: ChannelCalibration,
}

impl Calibration {
    /// Creates a new [`Calibration`].
    #[must_use]
    pub const fn new(ch_a: ChannelCalibration, ch_b: ChannelCalibration) -> Self {
        Self { ch_a, ch_b }
    }

    /// Converts both channels of a raw sample.
    #[inline]
    #[must_use]
    pub fn convert(&self, raw: RawSample) -> (f32, f32) {
        (
            self.ch_a.to_voltage(raw.channel_a()),
            self.ch_b.to_voltage(raw.channel_b()),
        )
    }
}
