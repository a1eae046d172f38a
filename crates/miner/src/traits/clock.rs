//! Wall clock access.

use core::fmt::Debug;

/// A source of the current time.
pub trait Clock: Debug {
    /// Returns the current unix time, in seconds.
    fn now(&self) -> u64;
}

/// The system wall clock.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[cfg(feature = "std")]
impl Clock for SystemClock {
    fn now(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
    }
}
