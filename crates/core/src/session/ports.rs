//! Port interfaces for session management
//!
//! These traits define the boundaries between the token lifecycle and the
//! infrastructure that talks to the ERP and to disk.

use async_trait::async_trait;
use consinco_domain::{CookieJar, Credential, Result};

/// Performs the ERP login call
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Log in with `credential`, replaying `cookies` on the request.
    ///
    /// Returns the session jar after the response's cookies were merged over
    /// `cookies`. Must fail unless the ERP answered HTTP 200.
    async fn login(&self, credential: &Credential, cookies: &CookieJar) -> Result<CookieJar>;
}

/// Durable storage for session cookie jars, keyed by ERP domain
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the persisted jar; `Ok(None)` when nothing was saved yet.
    async fn load(&self, domain: &str) -> Result<Option<CookieJar>>;

    /// Replace the persisted jar.
    async fn save(&self, domain: &str, cookies: &CookieJar) -> Result<()>;
}
