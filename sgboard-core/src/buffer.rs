use crate::common::MAX_SAMPLES_BUFFER_SIZE;

/// A fixed-capacity circular store of calibrated samples for one channel.
///
/// Samples are addressed by their logical run index; the slot written is always
/// `index mod N`. Writing logical index `N` therefore overwrites logical index `0`: a consumer
/// that falls behind keeps at most the last `N` samples.
#[derive(Clone, PartialEq)]
pub struct SampleBuffer<const N: usize = MAX_SAMPLES_BUFFER_SIZE> {
    data: [f32; N],
}

impl<const N: usize> SampleBuffer<N> {
    /// The number of slots.
    pub const CAPACITY: usize = N;

    /// Creates a new zero-filled [`SampleBuffer`].
    #[must_use]
    pub const fn new() -> Self {
        Self { data: [0.0; N] }
    }

    /// Returns the number of slots.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Returns the slot of a logical index.
    #[inline]
    #[must_use]
    pub const fn slot(index: u32) -> usize {
        index as usize % N
    }

    /// Stores `value` at logical `index`.
    #[inline]
    pub fn write(&mut self, index: u32, value: f32) {
        self.data[Self::slot(index)] = value;
    }

    /// Returns the value stored for logical `index`.
    #[inline]
    #[must_use]
    pub fn get(&self, index: u32) -> f32 {
        self.data[Self::slot(index)]
    }

    /// Returns a mutable reference to the slot of logical `index`.
    #[inline]
    pub fn get_mut(&mut self, index: u32) -> &mut f32 {
        &mut self.data[Self::slot(index)]
    }

    /// Returns the raw slots.
    #[must_use]
    pub const fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Sets every slot to `value`.
    pub fn fill(&mut self, value: f32) {
        self.data.fill(value);
    }

    /// Iterates the last `count` samples written before logical index `end`, oldest first.
    ///
    /// `count` is clamped to the capacity. Logical indices wrap around `u32`, so `end` may be
    /// smaller than `count`; the caller bounds `count` by the number of samples written.
    pub fn recent(&self, end: u32, count: usize) -> impl ExactSizeIterator<Item = f32> + '_ {
        let count = count.min(N);
        let start = end.wrapping_sub(count as u32);
        (0..count).map(move |i| self.get(start.wrapping_add(i as u32)))
    }
}

impl<const N: usize> Default for SampleBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> core::fmt::Debug for SampleBuffer<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SampleBuffer")
            .field("capacity", &N)
            .finish_non_exhaustive()
    }
}
