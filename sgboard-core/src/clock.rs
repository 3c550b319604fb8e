use core::time::Duration;

/// A monotonic time source.
///
/// Used to enforce the per-sample deadline of a run. On the board this reads a free running
/// core timer; tests inject a manually advanced clock.
pub trait Clock {
    /// Returns the time elapsed since an arbitrary fixed origin.
    fn now(&self) -> Duration;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

#[cfg(feature = "std")]
/// A [`Clock`] based on [`std::time::Instant`].
#[derive(Debug, Clone, Copy)]
pub struct StdClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl StdClock {
    /// Creates a new [`StdClock`] whose origin is now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for StdClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}
