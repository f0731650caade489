//! Time abstraction for testability
//!
//! Token validity is a function of "now". Everything that asks for the
//! current time goes through [`Clock`] so tests can pin it.
//!
//! ```
//! use consinco_common::{Clock, SystemClock};
//!
//! let clock = SystemClock;
//! let before = clock.now_utc();
//! assert!(clock.now_utc() >= before);
//! ```

pub mod format;
#[cfg(any(test, feature = "test-utils"))]
mod mock;

use chrono::{DateTime, Utc};

#[cfg(any(test, feature = "test-utils"))]
pub use mock::MockClock;

/// Source of wall-clock time
pub trait Clock: Send + Sync {
    /// Current UTC instant.
    fn now_utc(&self) -> DateTime<Utc>;
}

/// Real system clock. Use this in production code.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
