//! Common utilities shared across Consinco gateway crates.
//!
//! - [`clock`]: wall-clock abstraction so expiry logic can be driven by a
//!   deterministic clock in tests (`MockClock`, behind `test-utils`)
//! - [`secret`]: constant-time comparison and a redacting string wrapper

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod clock;
pub mod secret;

pub use clock::format::format_hms;
#[cfg(any(test, feature = "test-utils"))]
pub use clock::MockClock;
pub use clock::{Clock, SystemClock};
pub use secret::{constant_time_eq, SecretString};
