//! Per-environment session lifecycle
//!
//! [`TokenCache`] hands out tokens that are valid for at least the safety
//! margin, logging in again when the current one gets close to expiry.
//!
//! ## Renewal
//! 1. Fast path: read the published [`Session`] without locking; return it if
//!    its token is still valid.
//! 2. Slow path: take the per-environment renewal lock and re-check, since a
//!    concurrent caller may have renewed while we waited.
//! 3. On the first miss, consult the durable snapshot once. Its cookies are
//!    kept for replay; its token is adopted only if valid after the expiry
//!    correction.
//! 4. Otherwise log in, persist the new jar, publish.
//!
//! Callers that queued behind a login which then failed get that failure
//! back instead of starting another login. The next caller to arrive after
//! the failure tries again.
//!
//! Publishing is a single swap of an `Arc<Session>`, so the fast path never
//! observes a token without its matching cookies.

mod memory_store;
pub mod ports;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Duration;
use consinco_common::{Clock, SystemClock};
use consinco_domain::constants::SNAPSHOT_EXPIRY_CORRECTION_HOURS;
use consinco_domain::{ConsincoError, CookieJar, Credential, Result, Token, TokenStatus};
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub use memory_store::InMemorySnapshotStore;
use ports::{Authenticator, SnapshotStore};

/// Token plus the cookie jar it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    token: Token,
    cookies: CookieJar,
}

impl Session {
    pub fn new(token: Token, cookies: CookieJar) -> Self {
        Self { token, cookies }
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }
}

/// State only touched while holding the renewal lock
#[derive(Debug, Default)]
struct RenewalState {
    /// Jar replayed on the next login; survives failed logins.
    cookies: CookieJar,
    snapshot_consulted: bool,
    /// Error of the most recent login attempt, cleared on success.
    last_failure: Option<ConsincoError>,
}

/// Token lifecycle manager for one ERP environment
pub struct TokenCache {
    credential: Credential,
    domain: String,
    authenticator: Arc<dyn Authenticator>,
    snapshots: Arc<dyn SnapshotStore>,
    clock: Arc<dyn Clock>,
    published: RwLock<Option<Arc<Session>>>,
    renewal: Mutex<RenewalState>,
    /// Completed login attempts; bumped while holding `renewal`.
    attempts: AtomicU64,
}

impl TokenCache {
    /// Create an empty cache; nothing is loaded until the first request.
    pub fn new(
        credential: Credential,
        authenticator: Arc<dyn Authenticator>,
        snapshots: Arc<dyn SnapshotStore>,
    ) -> Self {
        let domain = credential.domain();
        Self {
            credential,
            domain,
            authenticator,
            snapshots,
            clock: Arc::new(SystemClock),
            published: RwLock::new(None),
            renewal: Mutex::new(RenewalState::default()),
            attempts: AtomicU64::new(0),
        }
    }

    /// Replace the wall clock (tests drive expiry with a mock clock).
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// ERP host this cache authenticates against.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Token valid for more than the safety margin at the instant of return.
    ///
    /// # Errors
    /// Returns `ConsincoError::Auth` when no valid token could be produced.
    pub async fn get_valid_token(&self) -> Result<Token> {
        Ok(self.get_valid_session().await?.token().clone())
    }

    /// Like [`TokenCache::get_valid_token`], with the cookie jar to replay.
    ///
    /// # Errors
    /// Returns `ConsincoError::Auth` when no valid token could be produced.
    pub async fn get_valid_session(&self) -> Result<Arc<Session>> {
        if let Some(session) = self.valid_published() {
            return Ok(session);
        }

        let seen = self.attempts.load(Ordering::Acquire);
        let mut state = self.renewal.lock().await;

        if let Some(session) = self.valid_published() {
            debug!(domain = %self.domain, "Token renewed by a concurrent caller");
            return Ok(session);
        }

        if self.attempts.load(Ordering::Acquire) != seen {
            if let Some(err) = &state.last_failure {
                debug!(domain = %self.domain, "Concurrent login failed; not retrying");
                return Err(err.clone());
            }
        }

        if self.published.read().is_none() && !state.snapshot_consulted {
            state.snapshot_consulted = true;
            if let Some(session) = self.restore_snapshot(&mut state).await {
                return Ok(self.publish(session));
            }
        }

        let outcome = self.login(&mut state).await;
        state.last_failure = outcome.as_ref().err().cloned();
        self.attempts.fetch_add(1, Ordering::Release);
        outcome
    }

    /// Read-only view of the current token; never renews.
    pub fn status(&self) -> TokenStatus {
        let published = self.published.read().clone();
        TokenStatus::evaluate(published.as_ref().map(|s| s.token()), self.clock.now_utc())
    }

    fn valid_published(&self) -> Option<Arc<Session>> {
        let now = self.clock.now_utc();
        self.published.read().as_ref().filter(|s| s.token().is_valid_at(now)).cloned()
    }

    fn publish(&self, session: Session) -> Arc<Session> {
        let session = Arc::new(session);
        *self.published.write() = Some(Arc::clone(&session));
        session
    }

    async fn restore_snapshot(&self, state: &mut RenewalState) -> Option<Session> {
        let cookies = match self.snapshots.load(&self.domain).await {
            Ok(Some(cookies)) => cookies,
            Ok(None) => {
                debug!(domain = %self.domain, "No session snapshot found");
                return None;
            }
            Err(err) => {
                warn!(domain = %self.domain, error = %err, "Failed to load session snapshot");
                return None;
            }
        };

        state.cookies = cookies.clone();

        let token = match Token::from_cookie_jar(&cookies) {
            Ok(token) => {
                token.with_expiry_offset(Duration::hours(-SNAPSHOT_EXPIRY_CORRECTION_HOURS))
            }
            Err(err) => {
                warn!(domain = %self.domain, error = %err, "Session snapshot has no usable token");
                return None;
            }
        };

        if !token.is_valid_at(self.clock.now_utc()) {
            debug!(
                domain = %self.domain,
                expires_at = %token.expires_at(),
                "Snapshot token needs renewal"
            );
            return None;
        }

        info!(
            domain = %self.domain,
            expires_at = %token.expires_at(),
            "Session restored from snapshot"
        );
        Some(Session::new(token, cookies))
    }

    async fn login(&self, state: &mut RenewalState) -> Result<Arc<Session>> {
        info!(domain = %self.domain, "Logging in to ERP");

        let cookies = self
            .authenticator
            .login(&self.credential, &state.cookies)
            .await
            .map_err(into_auth_error)?;

        let token = Token::from_cookie_jar(&cookies).map_err(into_auth_error)?;
        if !token.is_valid_at(self.clock.now_utc()) {
            return Err(ConsincoError::Auth(format!(
                "ERP issued a token expiring at {} which is inside the renewal margin",
                token.expires_at()
            )));
        }

        if let Err(err) = self.snapshots.save(&self.domain, &cookies).await {
            warn!(domain = %self.domain, error = %err, "Failed to persist session snapshot");
        }

        state.cookies = cookies.clone();

        info!(
            domain = %self.domain,
            expires_at = %token.expires_at(),
            "ERP login succeeded"
        );
        Ok(self.publish(Session::new(token, cookies)))
    }
}

impl std::fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCache")
            .field("domain", &self.domain)
            .field("credential", &self.credential)
            .finish_non_exhaustive()
    }
}

fn into_auth_error(err: ConsincoError) -> ConsincoError {
    match err {
        ConsincoError::Auth(_) => err,
        other => ConsincoError::Auth(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use consinco_common::MockClock;
    use consinco_domain::constants::{EXPIRES_FORMAT, OAUTH_TOKEN_COOKIE};
    use consinco_domain::TokenState;

    use super::*;

    const DOMAIN: &str = "erp.example.com";

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap()
    }

    fn jar_expiring_at(token: &str, expires_at: DateTime<Utc>) -> CookieJar {
        let payload = serde_json::json!({
            "access_token": token,
            ".expires": expires_at.format(EXPIRES_FORMAT).to_string(),
        });
        [(OAUTH_TOKEN_COOKIE.to_string(), payload.to_string())].into_iter().collect()
    }

    /// Authenticator that issues one-hour tokens and records what it saw.
    struct StubAuthenticator {
        clock: MockClock,
        calls: AtomicUsize,
        delay: std::time::Duration,
        fail: bool,
        replayed: parking_lot::Mutex<Vec<CookieJar>>,
    }

    impl StubAuthenticator {
        fn new(clock: &MockClock) -> Self {
            Self {
                clock: clock.clone(),
                calls: AtomicUsize::new(0),
                delay: std::time::Duration::ZERO,
                fail: false,
                replayed: parking_lot::Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Authenticator for StubAuthenticator {
        async fn login(&self, _credential: &Credential, cookies: &CookieJar) -> Result<CookieJar> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            self.replayed.lock().push(cookies.clone());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.fail {
                return Err(ConsincoError::Network("connection reset".into()));
            }

            let mut jar = cookies.clone();
            jar.merge(&jar_expiring_at(&format!("token-{n}"), self.clock.now_utc() + Duration::hours(1)));
            jar.insert("ASP.NET_SessionId", format!("sid-{n}"));
            Ok(jar)
        }
    }

    fn cache(
        clock: &MockClock,
        auth: Arc<StubAuthenticator>,
        store: Arc<InMemorySnapshotStore>,
    ) -> TokenCache {
        let credential = Credential::new(format!("https://{DOMAIN}/Login"), 42, 1234);
        TokenCache::new(credential, auth, store).with_clock(Arc::new(clock.clone()))
    }

    #[tokio::test]
    async fn first_call_logs_in_and_persists() {
        let clock = MockClock::at(start());
        let auth = Arc::new(StubAuthenticator::new(&clock));
        let store = Arc::new(InMemorySnapshotStore::new());
        let cache = cache(&clock, Arc::clone(&auth), Arc::clone(&store));

        let token = cache.get_valid_token().await.unwrap();

        assert_eq!(token.access_token(), "token-1");
        assert_eq!(auth.calls(), 1);
        let saved = store.get(DOMAIN).expect("snapshot written after login");
        assert_eq!(saved.get("ASP.NET_SessionId"), Some("sid-1"));
        assert_eq!(cache.status().state, TokenState::Valid);
    }

    /// Repeated calls while the token is valid never log in again.
    #[tokio::test]
    async fn valid_token_is_reused() {
        let clock = MockClock::at(start());
        let auth = Arc::new(StubAuthenticator::new(&clock));
        let cache = cache(&clock, Arc::clone(&auth), Arc::new(InMemorySnapshotStore::new()));

        let first = cache.get_valid_token().await.unwrap();
        clock.advance(Duration::minutes(49));
        let second = cache.get_valid_token().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(auth.calls(), 1);
    }

    #[tokio::test]
    async fn renews_once_inside_safety_margin() {
        let clock = MockClock::at(start());
        let auth = Arc::new(StubAuthenticator::new(&clock));
        let cache = cache(&clock, Arc::clone(&auth), Arc::new(InMemorySnapshotStore::new()));

        cache.get_valid_token().await.unwrap();
        clock.advance(Duration::minutes(50));
        assert!(cache.status().needs_renewal);

        let renewed = cache.get_valid_token().await.unwrap();

        assert_eq!(renewed.access_token(), "token-2");
        assert_eq!(auth.calls(), 2);
        // the previous jar is replayed on the renewal login
        assert_eq!(auth.replayed.lock()[1].get("ASP.NET_SessionId"), Some("sid-1"));
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_login() {
        let clock = MockClock::at(start());
        let mut stub = StubAuthenticator::new(&clock);
        stub.delay = std::time::Duration::from_millis(50);
        let auth = Arc::new(stub);
        let cache =
            Arc::new(cache(&clock, Arc::clone(&auth), Arc::new(InMemorySnapshotStore::new())));

        let tasks = (0..16).map(|_| {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move { cache.get_valid_token().await })
        });
        let tokens: Vec<Token> = futures::future::join_all(tasks)
            .await
            .into_iter()
            .map(|joined| joined.unwrap().unwrap())
            .collect();

        assert_eq!(auth.calls(), 1);
        assert!(tokens.iter().all(|t| t == &tokens[0]));
    }

    #[tokio::test]
    async fn restores_valid_snapshot_with_expiry_correction() {
        let clock = MockClock::at(start());
        let auth = Arc::new(StubAuthenticator::new(&clock));
        let mut persisted = jar_expiring_at("persisted", start() + Duration::hours(4));
        persisted.insert("ASP.NET_SessionId", "persisted-sid");
        let store =
            Arc::new(InMemorySnapshotStore::new().with_snapshot(DOMAIN, persisted.clone()));
        let cache = cache(&clock, Arc::clone(&auth), store);

        let session = cache.get_valid_session().await.unwrap();

        assert_eq!(auth.calls(), 0);
        assert_eq!(session.token().access_token(), "persisted");
        assert_eq!(session.token().expires_at(), start() + Duration::hours(1));
        assert_eq!(session.cookies(), &persisted);
    }

    #[tokio::test]
    async fn stale_snapshot_cookies_are_replayed_on_login() {
        let clock = MockClock::at(start());
        let auth = Arc::new(StubAuthenticator::new(&clock));
        // 3h05m ahead on disk is 5 minutes after correction: needs renewal
        let mut persisted = jar_expiring_at("stale", start() + Duration::minutes(185));
        persisted.insert("ASP.NET_SessionId", "persisted-sid");
        let store = Arc::new(InMemorySnapshotStore::new().with_snapshot(DOMAIN, persisted));
        let cache = cache(&clock, Arc::clone(&auth), Arc::clone(&store));

        let token = cache.get_valid_token().await.unwrap();

        assert_eq!(token.access_token(), "token-1");
        assert_eq!(auth.calls(), 1);
        assert_eq!(auth.replayed.lock()[0].get("ASP.NET_SessionId"), Some("persisted-sid"));
        assert_eq!(store.get(DOMAIN).unwrap().get("ASP.NET_SessionId"), Some("sid-1"));
    }

    #[tokio::test]
    async fn failed_login_adopts_and_persists_nothing() {
        let clock = MockClock::at(start());
        let mut stub = StubAuthenticator::new(&clock);
        stub.fail = true;
        let auth = Arc::new(stub);
        let store = Arc::new(InMemorySnapshotStore::new());
        let cache = cache(&clock, Arc::clone(&auth), Arc::clone(&store));

        let err = cache.get_valid_token().await.unwrap_err();

        assert!(matches!(err, ConsincoError::Auth(msg) if msg.contains("connection reset")));
        assert_eq!(store.get(DOMAIN), None);
        assert_eq!(cache.status().state, TokenState::NoToken);

        // the next call tries again
        assert!(cache.get_valid_token().await.is_err());
        assert_eq!(auth.calls(), 2);
    }

    /// Callers queued behind a failing login share its error.
    #[tokio::test]
    async fn concurrent_callers_share_one_failed_login() {
        let clock = MockClock::at(start());
        let mut stub = StubAuthenticator::new(&clock);
        stub.delay = std::time::Duration::from_millis(100);
        stub.fail = true;
        let auth = Arc::new(stub);
        let cache =
            Arc::new(cache(&clock, Arc::clone(&auth), Arc::new(InMemorySnapshotStore::new())));

        let tasks = (0..8).map(|_| {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move { cache.get_valid_token().await })
        });
        let results: Vec<Result<Token>> =
            futures::future::join_all(tasks).await.into_iter().map(|j| j.unwrap()).collect();

        assert_eq!(auth.calls(), 1);
        assert!(results
            .iter()
            .all(|r| matches!(r, Err(ConsincoError::Auth(msg)) if msg.contains("connection reset"))));

        // a caller arriving after the failure logs in again
        assert!(cache.get_valid_token().await.is_err());
        assert_eq!(auth.calls(), 2);
    }

    /// Snapshot store whose writes always fail.
    struct ReadOnlySnapshotStore;

    #[async_trait]
    impl SnapshotStore for ReadOnlySnapshotStore {
        async fn load(&self, _domain: &str) -> Result<Option<CookieJar>> {
            Ok(None)
        }

        async fn save(&self, _domain: &str, _cookies: &CookieJar) -> Result<()> {
            Err(ConsincoError::Storage("read-only file system".into()))
        }
    }

    #[tokio::test]
    async fn failed_snapshot_save_still_publishes_session() {
        let clock = MockClock::at(start());
        let auth = Arc::new(StubAuthenticator::new(&clock));
        let credential = Credential::new(format!("https://{DOMAIN}/Login"), 42, 1234);
        let cache = TokenCache::new(credential, Arc::clone(&auth) as Arc<dyn Authenticator>, Arc::new(ReadOnlySnapshotStore))
            .with_clock(Arc::new(clock.clone()));

        let token = cache.get_valid_token().await.unwrap();

        assert_eq!(token.access_token(), "token-1");
        assert_eq!(cache.status().state, TokenState::Valid);
        assert_eq!(cache.get_valid_token().await.unwrap(), token);
        assert_eq!(auth.calls(), 1);
    }

    #[tokio::test]
    async fn status_never_triggers_login() {
        let clock = MockClock::at(start());
        let auth = Arc::new(StubAuthenticator::new(&clock));
        let cache = cache(&clock, Arc::clone(&auth), Arc::new(InMemorySnapshotStore::new()));

        let status = cache.status();

        assert!(!status.valid);
        assert!(status.needs_renewal);
        assert_eq!(auth.calls(), 0);
    }
}
