//! Infrastructure error handling

mod conversions;

pub use conversions::{into_gateway_error, InfraError};
