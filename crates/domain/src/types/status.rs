//! Read-only view of a token cache

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::token::Token;

/// Lifecycle position of the current token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenState {
    /// Nothing cached yet (or the last login failed before any success).
    NoToken,
    /// More than the safety margin left.
    Valid,
    /// Still unexpired but inside the safety margin; next use renews.
    NearExpiry,
    Expired,
}

crate::impl_domain_label_conversions!(TokenState {
    NoToken => "no_token",
    Valid => "valid",
    NearExpiry => "near_expiry",
    Expired => "expired",
});

/// Snapshot reported by `status()`; computing it never triggers a renewal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenStatus {
    pub valid: bool,
    pub expires_at: Option<DateTime<Utc>>,
    /// `None` when there is no token or it already expired.
    pub time_remaining: Option<Duration>,
    pub needs_renewal: bool,
    pub state: TokenState,
}

impl TokenStatus {
    pub fn evaluate(token: Option<&Token>, now: DateTime<Utc>) -> Self {
        match token {
            None => Self {
                valid: false,
                expires_at: None,
                time_remaining: None,
                needs_renewal: true,
                state: TokenState::NoToken,
            },
            Some(token) => {
                let remaining = token.remaining(now);
                Self {
                    valid: token.is_valid_at(now),
                    expires_at: Some(token.expires_at()),
                    time_remaining: (remaining > Duration::zero()).then_some(remaining),
                    needs_renewal: token.needs_renewal_at(now),
                    state: token.state_at(now),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap()
    }

    #[test]
    fn no_token_needs_renewal() {
        let status = TokenStatus::evaluate(None, noon());
        assert!(!status.valid);
        assert!(status.needs_renewal);
        assert_eq!(status.state, TokenState::NoToken);
        assert_eq!(status.expires_at, None);
    }

    #[test]
    fn needs_renewal_exactly_at_margin() {
        let token = Token::new("abc", noon() + Duration::minutes(10));
        let status = TokenStatus::evaluate(Some(&token), noon());
        assert!(status.needs_renewal);
        assert!(!status.valid);
        assert_eq!(status.time_remaining, Some(Duration::minutes(10)));
    }

    #[test]
    fn valid_just_outside_margin() {
        let token = Token::new("abc", noon() + Duration::seconds(601));
        let status = TokenStatus::evaluate(Some(&token), noon());
        assert!(status.valid);
        assert!(!status.needs_renewal);
        assert_eq!(status.state, TokenState::Valid);
    }

    #[test]
    fn expired_token_reports_no_remaining_time() {
        let token = Token::new("abc", noon() - Duration::minutes(1));
        let status = TokenStatus::evaluate(Some(&token), noon());
        assert_eq!(status.time_remaining, None);
        assert_eq!(status.state, TokenState::Expired);
        assert!(status.needs_renewal);
    }
}
