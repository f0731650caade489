//! Cookie jar replayed on every ERP call

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Name → value map of the cookies the ERP set on the session.
///
/// Serializes as a flat JSON object, which is also the durable snapshot
/// format. Values are never shown by `Debug` since the jar carries the
/// bearer token.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CookieJar(BTreeMap<String, String>);

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Overlay `other` on top of this jar; cookies present in both take the
    /// value from `other`.
    pub fn merge(&mut self, other: &CookieJar) {
        for (name, value) in &other.0 {
            self.0.insert(name.clone(), value.clone());
        }
    }

    /// Record the cookie carried by one `Set-Cookie` header value.
    ///
    /// Only the leading `name=value` pair is kept; attributes such as `Path`
    /// or `Expires` are dropped. Returns the cookie name when one was found.
    pub fn absorb_set_cookie(&mut self, header: &str) -> Option<String> {
        let pair = header.split(';').next()?.trim();
        let (name, value) = pair.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let value = value.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(value);

        self.0.insert(name.to_string(), value.to_string());
        Some(name.to_string())
    }

    /// Render the jar as a `Cookie` request header value.
    pub fn header_value(&self) -> Option<String> {
        if self.0.is_empty() {
            return None;
        }

        let rendered: Vec<String> =
            self.0.iter().map(|(name, value)| format!("{name}={value}")).collect();
        Some(rendered.join("; "))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for CookieJar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.0.keys()).finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CookieJar {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
