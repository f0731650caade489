//! Error types used throughout the gateway

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the Consinco gateway
///
/// `Auth` covers every failure to produce a valid session token (login
/// rejected, malformed token cookie, transport failure during login).
/// `Gateway` covers authenticated ERP calls that did not answer HTTP 200 or
/// whose transport failed; `status` is `None` for the latter.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum ConsincoError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Gateway error: {message}")]
    Gateway { status: Option<u16>, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConsincoError {
    /// Gateway failure caused by a non-200 ERP response.
    pub fn gateway_status(status: u16, body: impl AsRef<str>) -> Self {
        let body = body.as_ref();
        let message = if body.is_empty() {
            format!("ERP answered HTTP {status}")
        } else {
            format!("ERP answered HTTP {status}: {body}")
        };
        Self::Gateway { status: Some(status), message }
    }

    /// Gateway failure that never produced an HTTP status.
    pub fn gateway_transport(message: impl Into<String>) -> Self {
        Self::Gateway { status: None, message: message.into() }
    }

    /// Stable label for structured logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Auth(_) => "auth",
            Self::Gateway { .. } => "gateway",
            Self::Network(_) => "network",
            Self::Storage(_) => "storage",
            Self::InvalidInput(_) => "invalid_input",
            Self::NotFound(_) => "not_found",
            Self::Internal(_) => "internal",
        }
    }

    /// HTTP status reported by the ERP, when there was one.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Gateway { status, .. } => *status,
            _ => None,
        }
    }
}

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, ConsincoError>;
