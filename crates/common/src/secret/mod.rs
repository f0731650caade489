//! Secret handling helpers
//!
//! Use [`constant_time_eq`] for any comparison against a configured secret.

use std::fmt;

/// String that never shows its contents in `Debug` or `Display`.
///
/// `PartialEq` is NOT constant-time. Use [`SecretString::constant_time_eq`]
/// for security-sensitive comparisons.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString {
    inner: String,
}

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self { inner: value.into() }
    }

    /// Compare against a candidate in time independent of where they differ.
    pub fn constant_time_eq(&self, candidate: &str) -> bool {
        constant_time_eq(self.inner.as_bytes(), candidate.as_bytes())
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretString(***)")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***")
    }
}

/// Constant-time comparison to prevent timing attacks
///
/// Only the length check short-circuits; equal-length inputs always scan
/// every byte.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }

    result == 0
}
