//! Logging setup
//!
//! Events go to stdout through `tracing-subscriber`. The filter comes from
//! `RUST_LOG` (default `info`); `LOG_FORMAT=json` switches to one JSON
//! object per line.

use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Output format of the process-wide subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    /// Read `LOG_FORMAT`; anything but `json` is the human format.
    pub fn from_env() -> Self {
        match std::env::var("LOG_FORMAT") {
            Ok(value) if value.trim().eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Install the global subscriber.
///
/// Calling this more than once is harmless: later calls leave the first
/// subscriber in place and return `false`.
pub fn init_tracing() -> bool {
    init_tracing_with(LogFormat::from_env())
}

/// Install the global subscriber with an explicit format.
pub fn init_tracing_with(format: LogFormat) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let registry = tracing_subscriber::registry().with(filter);
    let result = match format {
        LogFormat::Json => registry.with(fmt::layer().json().with_current_span(false)).try_init(),
        LogFormat::Pretty => registry.with(fmt::layer().with_target(true)).try_init(),
    };
    result.is_ok()
}
