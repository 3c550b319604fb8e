use core::time::Duration;

#[cfg(feature = "std")]
pub use spin_sleep::SpinSleeper;

/// A trait for sleep operations.
///
/// On the board the only form of waiting is a busy loop, so implementations must not yield to a
/// scheduler. Tests inject [`NopSleeper`] to make polling loops deterministic.
pub trait Sleep: core::fmt::Debug {
    /// Sleep for the specified duration.
    fn sleep(&self, duration: Duration);
}

impl<S: Sleep + ?Sized> Sleep for &S {
    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration);
    }
}

/// A sleeper that returns immediately.
///
/// Pairs with a zero-interval [`Retry`](crate::retry::Retry), where the retry budget alone bounds
/// the wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NopSleeper;

impl Sleep for NopSleeper {
    fn sleep(&self, _: Duration) {}
}

/// A sleeper that spins on [`core::hint::spin_loop`] for a fixed number of iterations per
/// microsecond.
///
/// This is the `no_std` replacement for the fixed NOP delay loops of the bus access routines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpinLoopSleeper {
    iterations_per_us: u32,
}

impl SpinLoopSleeper {
    /// Creates a new [`SpinLoopSleeper`].
    #[must_use]
    pub const fn new(iterations_per_us: u32) -> Self {
        Self { iterations_per_us }
    }
}

impl Sleep for SpinLoopSleeper {
    fn sleep(&self, duration: Duration) {
        let n = (duration.as_micros() as u64).saturating_mul(self.iterations_per_us as u64);
        (0..n).for_each(|_| core::hint::spin_loop());
    }
}

#[cfg(feature = "std")]
impl Sleep for SpinSleeper {
    fn sleep(&self, duration: Duration) {
        SpinSleeper::sleep(*self, duration);
    }
}
