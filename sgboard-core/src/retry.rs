use core::{num::NonZeroU32, time::Duration};

use crate::{common::USB_READ_TIMEOUT, sleep::Sleep};

/// A bounded busy-poll budget.
///
/// Every hardware wait in the firmware is a status poll with a fixed number of attempts. `interval`
/// is slept between two failing attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Retry {
    /// The maximum number of status reads.
    pub attempts: NonZeroU32,
    /// The delay between two status reads.
    pub interval: Duration,
}

impl Retry {
    /// The budget of a single USB status poll.
    pub const USB_READ: Retry = Retry {
        attempts: match NonZeroU32::new(USB_READ_TIMEOUT) {
            Some(n) => n,
            None => NonZeroU32::MIN,
        },
        interval: Duration::ZERO,
    };

    /// A budget that checks exactly once.
    pub const ONCE: Retry = Retry {
        attempts: NonZeroU32::MIN,
        interval: Duration::ZERO,
    };

    /// Creates a new [`Retry`] with zero interval.
    #[must_use]
    pub const fn new(attempts: NonZeroU32) -> Self {
        Self {
            attempts,
            interval: Duration::ZERO,
        }
    }

    /// Sets the interval between attempts.
    #[must_use]
    pub const fn with_interval(self, interval: Duration) -> Self {
        Self { interval, ..self }
    }

    /// Polls `ready` until it returns `true` or the budget is exhausted.
    ///
    /// Returns `false` on timeout. Never blocks longer than `attempts × interval`.
    pub fn poll<S: Sleep>(&self, sleeper: &S, mut ready: impl FnMut() -> bool) -> bool {
        let attempts = self.attempts.get();
        for i in 0..attempts {
            if ready() {
                return true;
            }
            if i + 1 < attempts {
                sleeper.sleep(self.interval);
            }
        }
        false
    }
}

impl Default for Retry {
    fn default() -> Self {
        Self::USB_READ
    }
}
