//! Consinco ERP integration
//!
//! - [`ConsincoAuthenticator`] logs in through the web front's form
//! - [`ConsincoGateway`] runs SQL and structural calls with the session
//! - [`ErpEndpoints`] derives every URL from the configured login URL

mod auth;
mod client;
mod endpoints;

use std::sync::Arc;
use std::time::Duration;

use consinco_core::{SnapshotStore, TokenCache};
use consinco_domain::{Environment, Result, ServiceConfig};
use tracing::info;

pub use auth::ConsincoAuthenticator;
pub use client::ConsincoGateway;
pub use endpoints::ErpEndpoints;

use crate::http::HttpClient;

/// Wire the gateway for one configured environment.
///
/// The login client never follows redirects on its own so cookies set on
/// intermediate hops are kept. Both clients share the configured timeout and
/// TLS policy.
///
/// # Errors
/// - `ConsincoError::NotFound` when `environment` has no login URL
/// - `ConsincoError::Config` when the URL has no host or a client cannot be
///   built
pub fn build_gateway(
    environment: Environment,
    config: &ServiceConfig,
    snapshots: Arc<dyn SnapshotStore>,
) -> Result<ConsincoGateway> {
    let credential = config.credential(environment)?;
    let endpoints = ErpEndpoints::derive(credential.login_url(), config.erp.api_port)?;

    let timeout = Duration::from_secs(config.erp.timeout_secs);
    let insecure = !config.erp.tls_verify;

    let authenticator = Arc::new(login_authenticator(&endpoints, timeout, insecure)?);
    let api_client =
        HttpClient::builder().timeout(timeout).accept_invalid_certs(insecure).build()?;

    info!(
        environment = %environment,
        login = authenticator.login_url(),
        api = %endpoints.sql(),
        "ERP gateway configured"
    );
    let tokens = Arc::new(TokenCache::new(credential, authenticator, snapshots));

    Ok(ConsincoGateway::new(environment, endpoints, api_client, tokens)
        .with_sql_escaping(config.erp.escape_sql))
}

/// The form is always posted to `https://<domain>/Login`, whatever path the
/// configured URL carries.
fn login_authenticator(
    endpoints: &ErpEndpoints,
    timeout: Duration,
    insecure: bool,
) -> Result<ConsincoAuthenticator> {
    let login_client = HttpClient::builder()
        .timeout(timeout)
        .accept_invalid_certs(insecure)
        .follow_redirects(false)
        .build()?;

    Ok(ConsincoAuthenticator::new(login_client, endpoints.login()))
}
