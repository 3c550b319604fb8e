/// \[Hz\]
pub struct Hz;

/// \[kHz\]
#[allow(non_camel_case_types)]
pub struct kHz;

/// \[MHz\]
pub struct MHz;

/// A frequency, built by multiplying a number with a unit (`990 * kHz`).
#[derive(Clone, Copy, PartialEq, PartialOrd)]
pub struct Freq<T: Copy> {
    pub(crate) freq: T,
}

impl<T: Copy + core::fmt::Display> core::fmt::Debug for Freq<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} Hz", self.freq)
    }
}

impl<T: Copy> Freq<T> {
    /// Returns the frequency in Hz.
    #[inline]
    pub const fn hz(&self) -> T {
        self.freq
    }
}

impl Freq<u32> {
    /// Returns the distance between two frequencies, such as the beat of an excitation and a
    /// local oscillator.
    #[must_use]
    pub const fn abs_diff(self, other: Self) -> Self {
        Self {
            freq: self.freq.abs_diff(other.freq),
        }
    }
}

macro_rules! unit {
    ($unit:ident, $scale:literal) => {
        impl core::ops::Mul<$unit> for u32 {
            type Output = Freq<u32>;

            fn mul(self, _: $unit) -> Self::Output {
                Freq {
                    freq: self * $scale,
                }
            }
        }

        impl core::ops::Mul<$unit> for f32 {
            type Output = Freq<f32>;

            fn mul(self, _: $unit) -> Self::Output {
                Freq {
                    freq: self * $scale as f32,
                }
            }
        }
    };
}

unit!(Hz, 1);
unit!(kHz, 1_000);
unit!(MHz, 1_000_000);
