use derive_more::{Debug, Display};

/// One word shifted out of the daisy-chained ADC pair.
///
/// The first converter in the chain shifts out first, so its code lands in the upper half-word.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug, Display)]
#[display("{:#010X}", _0)]
#[debug("RawSample({:#010X})", _0)]
#[repr(transparent)]
pub struct RawSample(pub u32);

impl RawSample {
    /// Creates a new [`RawSample`] from the two channel codes.
    #[must_use]
    pub const fn from_codes(ch_a: u16, ch_b: u16) -> Self {
        Self(((ch_a as u32) << 16) | ch_b as u32)
    }

    /// Returns the code of channel A.
    #[must_use]
    pub const fn channel_a(&self) -> u16 {
        (self.0 >> 16) as u16
    }

    /// Returns the code of channel B.
    #[must_use]
    pub const fn channel_b(&self) -> u16 {
        (self.0 & 0xFFFF) as u16
    }

    /// Returns the raw word.
    #[must_use]
    pub const fn word(&self) -> u32 {
        self.0
    }
}

impl From<u32> for RawSample {
    fn from(value: u32) -> Self {
        Self(value)
    }
}
