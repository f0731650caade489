//! Conversions from external infrastructure errors into domain errors.

use consinco_domain::ConsincoError;
use reqwest::Error as HttpError;
use serde_json::Error as JsonError;
use std::io::Error as IoError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub ConsincoError);

impl From<InfraError> for ConsincoError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<ConsincoError> for InfraError {
    fn from(value: ConsincoError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoConsincoError {
    fn into_consinco(self) -> ConsincoError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → ConsincoError */
/* -------------------------------------------------------------------------- */

impl IntoConsincoError for HttpError {
    fn into_consinco(self) -> ConsincoError {
        if self.is_timeout() {
            return ConsincoError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return ConsincoError::Network(format!("HTTP connection failure: {self}"));
        }

        if self.is_builder() {
            return ConsincoError::Config(format!("invalid HTTP request: {self}"));
        }

        if self.is_decode() {
            return ConsincoError::Network(format!("malformed HTTP response body: {self}"));
        }

        ConsincoError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_consinco())
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → ConsincoError */
/* -------------------------------------------------------------------------- */

impl IntoConsincoError for IoError {
    fn into_consinco(self) -> ConsincoError {
        use std::io::ErrorKind;

        match self.kind() {
            ErrorKind::NotFound => ConsincoError::NotFound(self.to_string()),
            ErrorKind::PermissionDenied => {
                ConsincoError::Storage(format!("permission denied: {self}"))
            }
            _ => ConsincoError::Storage(self.to_string()),
        }
    }
}

impl From<IoError> for InfraError {
    fn from(value: IoError) -> Self {
        InfraError(value.into_consinco())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → ConsincoError */
/* -------------------------------------------------------------------------- */

impl IntoConsincoError for JsonError {
    fn into_consinco(self) -> ConsincoError {
        if self.is_io() {
            return ConsincoError::Storage(self.to_string());
        }
        ConsincoError::Internal(format!("invalid JSON: {self}"))
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        InfraError(value.into_consinco())
    }
}

/// Reclassify a failure of an authenticated ERP call as a gateway error.
///
/// Transport problems (timeouts, refused connections) become
/// `ConsincoError::Gateway` without a status; authentication failures stay
/// as they are.
pub fn into_gateway_error(err: ConsincoError) -> ConsincoError {
    match err {
        ConsincoError::Network(message) => ConsincoError::gateway_transport(message),
        ConsincoError::Internal(message) => ConsincoError::gateway_transport(message),
        other => other,
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
