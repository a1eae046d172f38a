//! A fixed clock.

use crate::Clock;

/// A clock stuck at a unix time, in seconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockClock(pub u64);

impl Clock for MockClock {
    fn now(&self) -> u64 {
        self.0
    }
}
