use std::time::Duration;

use consinco_domain::constants::DEFAULT_HTTP_TIMEOUT_SECS;
use consinco_domain::ConsincoError;
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use tracing::debug;

use crate::errors::InfraError;

/// HTTP client with a bounded per-request timeout.
///
/// Requests are sent exactly once. ERP calls are not idempotent (a login
/// opens a session, an activation changes state), so nothing is retried here.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self, ConsincoError> {
        Self::builder().build()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute the provided request builder once.
    ///
    /// Any HTTP status is returned as a response; only transport failures
    /// are errors.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, ConsincoError> {
        let request = builder.build().map_err(|err| {
            let infra: InfraError = err.into();
            ConsincoError::from(infra)
        })?;

        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, url = %url.as_str(), "sending HTTP request");

        match self.client.execute(request).await {
            Ok(response) => {
                let status = response.status();
                debug!(%method, url = %url.as_str(), %status, "received HTTP response");
                Ok(response)
            }
            Err(err) => {
                debug!(%method, url = %url.as_str(), error = %err, "HTTP request failed");
                let infra: InfraError = err.into();
                Err(ConsincoError::from(infra))
            }
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    accept_invalid_certs: bool,
    follow_redirects: bool,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            accept_invalid_certs: false,
            follow_redirects: true,
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Skip TLS certificate verification.
    ///
    /// The ERP is commonly served with self-signed certificates; only enable
    /// this for hosts you trust.
    pub fn accept_invalid_certs(mut self, enabled: bool) -> Self {
        self.accept_invalid_certs = enabled;
        self
    }

    /// Return 3xx responses to the caller instead of following them.
    pub fn follow_redirects(mut self, enabled: bool) -> Self {
        self.follow_redirects = enabled;
        self
    }

    pub fn build(self) -> Result<HttpClient, ConsincoError> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();

        if self.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        if !self.follow_redirects {
            builder = builder.redirect(reqwest::redirect::Policy::none());
        }

        let client = builder.build().map_err(|err| {
            let infra: InfraError = err.into();
            ConsincoError::from(infra)
        })?;

        Ok(HttpClient { client })
    }
}
