//! Deterministic clock for tests

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

use super::Clock;

/// Mock clock for deterministic testing
///
/// Clones share the same instant, so a test can keep one handle and hand
/// another to the code under test.
///
/// ```
/// # #[cfg(feature = "test-utils")]
/// # {
/// use chrono::{Duration, TimeZone, Utc};
/// use consinco_common::{Clock, MockClock};
///
/// let clock = MockClock::at(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
/// clock.advance(Duration::minutes(5));
/// assert_eq!(clock.now_utc(), Utc.with_ymd_and_hms(2025, 1, 1, 0, 5, 0).unwrap());
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl MockClock {
    /// Start at the real current time.
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    pub fn at(instant: DateTime<Utc>) -> Self {
        Self { now: Arc::new(Mutex::new(instant)) }
    }

    /// Move time forward (or backward, with a negative duration).
    pub fn advance(&self, duration: Duration) {
        let mut now = self.now.lock();
        *now += duration;
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.lock() = instant;
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now_utc(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn mock_clock_advances_and_sets() {
        let start = Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap();
        let clock = MockClock::at(start);
        let shared = clock.clone();

        clock.advance(Duration::seconds(90));
        assert_eq!(shared.now_utc(), start + Duration::seconds(90));

        shared.set(start);
        assert_eq!(clock.now_utc(), start);
    }
}
