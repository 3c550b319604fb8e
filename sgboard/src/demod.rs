use core::time::Duration;

use num_traits::Float;
use sgboard_core::{buffer::SampleBuffer, common::Freq, dds::DdsSettings};

/// Per-sample processing of an IF mode run.
///
/// Called once per sample, with strictly increasing `index`, after the calibrated channel A
/// value was stored at `index`. Implementations may rewrite both buffers at `index`.
pub trait Demodulator {
    /// Clears the filter state. Called when a run is armed.
    fn reset(&mut self);

    /// Processes the sample at logical `index`.
    fn demodulate<const N: usize>(
        &mut self,
        ch_a: &mut SampleBuffer<N>,
        ch_b: &mut SampleBuffer<N>,
        index: u32,
    );
}

impl<D: Demodulator + ?Sized> Demodulator for &mut D {
    fn reset(&mut self) {
        D::reset(self)
    }

    fn demodulate<const N: usize>(
        &mut self,
        ch_a: &mut SampleBuffer<N>,
        ch_b: &mut SampleBuffer<N>,
        index: u32,
    ) {
        D::demodulate(self, ch_a, ch_b, index)
    }
}

/// A [`Demodulator`] that leaves the samples untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NullDemodulator;

impl Demodulator for NullDemodulator {
    fn reset(&mut self) {}

    fn demodulate<const N: usize>(
        &mut self,
        _: &mut SampleBuffer<N>,
        _: &mut SampleBuffer<N>,
        _: u32,
    ) {
    }
}

/// Quadrature demodulator with an internal local oscillator.
///
/// Mixes channel A with `cos` and `-sin` of a phase accumulator running at the intermediate
/// frequency and low-pass filters both products with a single-pole IIR. The in-phase component
/// overwrites channel A and the quadrature component is written to channel B, both scaled to
/// the amplitude of the input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadratureDemodulator {
    increment: u32,
    alpha: f32,
    i: f32,
    q: f32,
}

impl QuadratureDemodulator {
    /// Creates a new [`QuadratureDemodulator`].
    ///
    /// `alpha` is the IIR coefficient in `(0, 1]`; `1` disables filtering.
    #[must_use]
    pub fn new(intermediate: Freq<u32>, period: Duration, alpha: f32) -> Self {
        let sample_rate_hz = 1e9 / period.as_nanos().max(1) as f64;
        let increment = (intermediate.hz() as f64 / sample_rate_hz * 4294967296.0) as u64;
        Self {
            increment: increment as u32,
            alpha: alpha.clamp(f32::EPSILON, 1.0),
            i: 0.0,
            q: 0.0,
        }
    }

    /// Creates a demodulator tuned to the intermediate frequency of `settings`.
    #[must_use]
    pub fn from_settings(settings: &DdsSettings, period: Duration, alpha: f32) -> Self {
        Self::new(settings.intermediate_frequency(), period, alpha)
    }

    /// Returns the phase increment per sample.
    #[must_use]
    pub const fn increment(&self) -> u32 {
        self.increment
    }

    /// Returns the local oscillator phase at `index` in radians, in `[0, 2π)`.
    #[must_use]
    pub fn phase(&self, index: u32) -> f32 {
        let phase = index.wrapping_mul(self.increment);
        (phase as f64 * (2.0 * core::f64::consts::PI) / 4294967296.0) as f32
    }
}

impl Demodulator for QuadratureDemodulator {
    fn reset(&mut self) {
        self.i = 0.0;
        self.q = 0.0;
    }

    fn demodulate<const N: usize>(
        &mut self,
        ch_a: &mut SampleBuffer<N>,
        ch_b: &mut SampleBuffer<N>,
        index: u32,
    ) {
        let x = ch_a.get(index);
        let (sin, cos) = Float::sin_cos(self.phase(index));
        self.i += self.alpha * (x * cos - self.i);
        self.q += self.alpha * (-x * sin - self.q);
        ch_a.write(index, 2.0 * self.i);
        ch_b.write(index, 2.0 * self.q);
    }
}
