//! ERP login over the web front's form endpoint

use async_trait::async_trait;
use chrono::Local;
use consinco_core::Authenticator;
use consinco_domain::constants::{LOGIN_TIMESTAMP_FORMAT, OAUTH_TOKEN_COOKIE};
use consinco_domain::{ConsincoError, CookieJar, Credential, Result};
use reqwest::header::{COOKIE, LOCATION, SET_COOKIE};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use tracing::{debug, warn};

use crate::http::HttpClient;

/// Redirect hops followed after the login POST.
const MAX_LOGIN_REDIRECTS: usize = 5;

/// [`Authenticator`] for the ERP's `/Login` form.
///
/// Redirects are followed by hand so that cookies set on every hop land in
/// the session jar.
pub struct ConsincoAuthenticator {
    http_client: HttpClient,
    login_url: String,
}

impl ConsincoAuthenticator {
    /// `http_client` must be built with redirects disabled.
    pub fn new(http_client: HttpClient, login_url: impl Into<String>) -> Self {
        Self { http_client, login_url: login_url.into() }
    }

    /// Form endpoint the credentials are posted to.
    pub fn login_url(&self) -> &str {
        &self.login_url
    }

    fn with_cookies(builder: RequestBuilder, jar: &CookieJar) -> RequestBuilder {
        match jar.header_value() {
            Some(cookies) => builder.header(COOKIE, cookies),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        self.http_client
            .send(builder)
            .await
            .map_err(|err| ConsincoError::Auth(format!("ERP login request failed: {err}")))
    }
}

#[async_trait]
impl Authenticator for ConsincoAuthenticator {
    async fn login(&self, credential: &Credential, cookies: &CookieJar) -> Result<CookieJar> {
        let form = [
            ("DataHoraLocal", Local::now().format(LOGIN_TIMESTAMP_FORMAT).to_string()),
            ("returnUrl", String::new()),
            ("Nome", credential.identity().to_string()),
            ("Senha", credential.secret().to_string()),
            ("NroEmpresa", credential.company().to_string()),
        ];

        let mut jar = cookies.clone();
        debug!(url = %self.login_url, replayed = jar.len(), "Posting ERP login form");
        let request = self.http_client.request(Method::POST, &self.login_url).form(&form);
        let mut response = self.send(Self::with_cookies(request, &jar)).await?;

        let mut hops = 0;
        loop {
            absorb_cookies(&mut jar, &response);

            let status = response.status();
            if !status.is_redirection() {
                break;
            }
            if hops == MAX_LOGIN_REDIRECTS {
                return Err(ConsincoError::Auth(format!(
                    "ERP login exceeded {MAX_LOGIN_REDIRECTS} redirects"
                )));
            }
            hops += 1;

            let next = redirect_target(&response)?;
            debug!(status = status.as_u16(), location = %next, "Following login redirect");
            let request = self.http_client.request(Method::GET, next);
            response = self.send(Self::with_cookies(request, &jar)).await?;
        }

        let status = response.status();
        if status != StatusCode::OK {
            warn!(status = status.as_u16(), "ERP rejected login");
            return Err(ConsincoError::Auth(format!("ERP login answered HTTP {}", status.as_u16())));
        }

        if jar.get(OAUTH_TOKEN_COOKIE).is_none() {
            return Err(ConsincoError::Auth(format!(
                "ERP login succeeded but did not set the {OAUTH_TOKEN_COOKIE} cookie"
            )));
        }

        Ok(jar)
    }
}

fn absorb_cookies(jar: &mut CookieJar, response: &Response) {
    for header in response.headers().get_all(SET_COOKIE) {
        match header.to_str() {
            Ok(value) => {
                if let Some(name) = jar.absorb_set_cookie(value) {
                    debug!(cookie = %name, "ERP set cookie");
                }
            }
            Err(_) => warn!("Ignoring non-ASCII Set-Cookie header"),
        }
    }
}

fn redirect_target(response: &Response) -> Result<reqwest::Url> {
    let location = response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ConsincoError::Auth("ERP login redirect has no Location".to_string()))?;

    response
        .url()
        .join(location)
        .map_err(|err| ConsincoError::Auth(format!("invalid login redirect '{location}': {err}")))
}
