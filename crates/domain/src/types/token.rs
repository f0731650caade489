//! ERP bearer token carried by the `oAuthToken` cookie

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::{
    ACCESS_TOKEN_FIELD, EXPIRES_FIELD, EXPIRES_FORMAT, OAUTH_TOKEN_COOKIE, TOKEN_SAFETY_MARGIN_SECS,
};
use crate::errors::{ConsincoError, Result};
use crate::types::cookies::CookieJar;
use crate::types::status::TokenState;

/// Session token issued by the ERP login.
///
/// Immutable: a renewal produces a new `Token`, it never edits the current
/// one. Fields of the `oAuthToken` payload other than the bearer string and
/// the expiry are kept in `claims` untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    access_token: String,
    expires_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    claims: Map<String, Value>,
}

/// Buffer before expiry at which a token stops being handed out.
pub fn safety_margin() -> Duration {
    Duration::seconds(TOKEN_SAFETY_MARGIN_SECS)
}

impl Token {
    pub fn new(access_token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self { access_token: access_token.into(), expires_at, claims: Map::new() }
    }

    /// Parse the value of the `oAuthToken` cookie.
    ///
    /// The value is a JSON object, sent either raw or percent-encoded, with
    /// `access_token` and `.expires` (`YYYY-MM-DDTHH:MM:SSZ`, read as UTC).
    ///
    /// # Errors
    /// Returns `ConsincoError::Auth` when the payload is not JSON or either
    /// field is missing or malformed.
    pub fn from_oauth_cookie(raw: &str) -> Result<Self> {
        let mut payload = decode_payload(raw)?;

        let access_token = match payload.remove(ACCESS_TOKEN_FIELD) {
            Some(Value::String(token)) if !token.is_empty() => token,
            _ => {
                return Err(ConsincoError::Auth(format!(
                    "{OAUTH_TOKEN_COOKIE} payload has no {ACCESS_TOKEN_FIELD}"
                )))
            }
        };

        let expires_at = match payload.remove(EXPIRES_FIELD) {
            Some(Value::String(expires)) => parse_expiry(&expires)?,
            _ => {
                return Err(ConsincoError::Auth(format!(
                    "{OAUTH_TOKEN_COOKIE} payload has no {EXPIRES_FIELD}"
                )))
            }
        };

        Ok(Self { access_token, expires_at, claims: payload })
    }

    /// Extract the token from a session cookie jar.
    ///
    /// # Errors
    /// Returns `ConsincoError::Auth` when the jar has no `oAuthToken` cookie
    /// or its value cannot be parsed.
    pub fn from_cookie_jar(jar: &CookieJar) -> Result<Self> {
        let raw = jar.get(OAUTH_TOKEN_COOKIE).ok_or_else(|| {
            ConsincoError::Auth(format!("{OAUTH_TOKEN_COOKIE} cookie not found in session"))
        })?;
        Self::from_oauth_cookie(raw)
    }

    /// Copy of this token with its expiry moved by `offset`.
    #[must_use]
    pub fn with_expiry_offset(&self, offset: Duration) -> Self {
        Self {
            access_token: self.access_token.clone(),
            expires_at: self.expires_at + offset,
            claims: self.claims.clone(),
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn claims(&self) -> &Map<String, Value> {
        &self.claims
    }

    /// Time left before expiry; negative once expired.
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        self.expires_at - now
    }

    /// `expiry - now > 10 minutes`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.remaining(now) > safety_margin()
    }

    /// `expiry - now <= 10 minutes`; exact complement of [`Token::is_valid_at`].
    pub fn needs_renewal_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_valid_at(now)
    }

    pub fn state_at(&self, now: DateTime<Utc>) -> TokenState {
        let remaining = self.remaining(now);
        if remaining > safety_margin() {
            TokenState::Valid
        } else if remaining > Duration::zero() {
            TokenState::NearExpiry
        } else {
            TokenState::Expired
        }
    }
}

fn decode_payload(raw: &str) -> Result<Map<String, Value>> {
    if let Ok(payload) = serde_json::from_str::<Map<String, Value>>(raw) {
        return Ok(payload);
    }

    let decoded = urlencoding::decode(raw).map_err(|err| {
        ConsincoError::Auth(format!("{OAUTH_TOKEN_COOKIE} cookie is not valid UTF-8: {err}"))
    })?;

    serde_json::from_str(&decoded).map_err(|err| {
        ConsincoError::Auth(format!("{OAUTH_TOKEN_COOKIE} cookie is not a JSON object: {err}"))
    })
}

fn parse_expiry(raw: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, EXPIRES_FORMAT).map(|naive| naive.and_utc()).map_err(
        |err| ConsincoError::Auth(format!("invalid {EXPIRES_FIELD} timestamp '{raw}': {err}")),
    )
}
