//! HTTP Basic authentication for the service front.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::warn;

use crate::context::AppContext;
use crate::errors::ApiError;

/// Reject the request with 401 unless it carries the configured Basic
/// credentials.
pub async fn require_basic_auth(
    State(context): State<Arc<AppContext>>,
    request: Request,
    next: Next,
) -> Response {
    let authorized = basic_credentials(request.headers())
        .is_some_and(|(username, password)| context.credentials.verify(&username, &password));

    if authorized {
        return next.run(request).await;
    }

    warn!(path = %request.uri().path(), "Rejected request with missing or invalid Basic credentials");
    ApiError::Unauthorized.into_response()
}

/// `(username, password)` from an `Authorization: Basic` header.
fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn decodes_basic_header() {
        let encoded = STANDARD.encode("api:pa:ss");
        let parsed = basic_credentials(&headers(&format!("Basic {encoded}")));

        assert_eq!(parsed, Some(("api".to_string(), "pa:ss".to_string())));
    }

    #[test]
    fn rejects_other_schemes_and_garbage() {
        assert_eq!(basic_credentials(&headers("Bearer abc")), None);
        assert_eq!(basic_credentials(&headers("Basic !!!")), None);
        assert_eq!(basic_credentials(&headers(&format!("Basic {}", STANDARD.encode("nocolon")))), None);
        assert_eq!(basic_credentials(&HeaderMap::new()), None);
    }
}
