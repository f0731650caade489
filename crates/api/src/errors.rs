//! HTTP error responses
//!
//! Every error renders as `{"detail": "<message>"}`.

use axum::http::header::WWW_AUTHENTICATE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use consinco_domain::ConsincoError;
use serde_json::json;
use thiserror::Error;

/// Errors surfaced by the service front
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or wrong Basic credentials.
    #[error("Invalid credentials")]
    Unauthorized,

    /// `ambiente` names no known environment.
    #[error("{0}")]
    UnknownEnvironment(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::UnknownEnvironment(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ConsincoError> for ApiError {
    fn from(err: ConsincoError) -> Self {
        match err {
            ConsincoError::NotFound(msg) => ApiError::NotFound(msg),
            ConsincoError::InvalidInput(msg) => ApiError::UnknownEnvironment(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "detail": self.to_string() }));

        match self {
            ApiError::Unauthorized => (status, [(WWW_AUTHENTICATE, "Basic")], body).into_response(),
            _ => (status, body).into_response(),
        }
    }
}
