//! Configuration management

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_API_PORT, DEFAULT_COMPANY, DEFAULT_HOST, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_PORT,
    DEFAULT_TOKENS_DIR,
};
use crate::errors::{ConsincoError, Result};
use crate::types::{Credential, Environment};
use crate::utils::domain::extract_domain;

/// Gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub auth: BasicAuthConfig,
    pub erp: ErpConfig,
    #[serde(default)]
    pub environments: EnvironmentUrls,
}

/// Listener configuration for the service front
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub health_requires_auth: bool,
}

/// Caller credentials accepted by the service front
#[derive(Clone, Serialize, Deserialize)]
pub struct BasicAuthConfig {
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
}

/// ERP login identity and transport settings, shared by every environment
#[derive(Clone, Serialize, Deserialize)]
pub struct ErpConfig {
    pub identity: u64,
    #[serde(skip_serializing)]
    pub secret: u64,
    #[serde(default = "default_company")]
    pub company: u64,
    /// Verify ERP TLS certificates. Off unless explicitly enabled.
    #[serde(default)]
    pub tls_verify: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    /// JSON-escape SQL text instead of substituting it raw.
    #[serde(default)]
    pub escape_sql: bool,
    #[serde(default = "default_tokens_dir")]
    pub tokens_dir: PathBuf,
}

/// Login URL per named environment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentUrls {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prod: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev: Option<String>,
}

impl EnvironmentUrls {
    pub fn login_url(&self, environment: Environment) -> Option<&str> {
        let url = match environment {
            Environment::Prod => self.prod.as_deref(),
            Environment::Dev => self.dev.as_deref(),
        };
        url.filter(|url| !url.trim().is_empty())
    }

    /// Environments with a login URL, in priority order.
    pub fn configured(&self) -> Vec<Environment> {
        Environment::ALL.into_iter().filter(|env| self.login_url(*env).is_some()).collect()
    }
}

impl ServiceConfig {
    /// Check cross-field constraints serde cannot express.
    ///
    /// # Errors
    /// Returns `ConsincoError::Config` naming the offending setting.
    pub fn validate(&self) -> Result<()> {
        let configured = self.environments.configured();
        if configured.is_empty() {
            return Err(ConsincoError::Config(
                "At least one login URL is required (URL_LOGIN_PROD, URL_LOGIN_DEV or URL_LOGIN)"
                    .to_string(),
            ));
        }

        for environment in configured {
            let url = self.environments.login_url(environment).unwrap_or_default();
            if extract_domain(url).is_empty() {
                return Err(ConsincoError::Config(format!(
                    "Login URL for environment '{environment}' has no host: {url}"
                )));
            }
        }

        if self.auth.username.is_empty() || self.auth.password.is_empty() {
            return Err(ConsincoError::Config(
                "VALID_USERNAME and VALID_PASSWORD must not be empty".to_string(),
            ));
        }

        if self.erp.timeout_secs == 0 {
            return Err(ConsincoError::Config(
                "CONSINCO_HTTP_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Credential for one environment.
    ///
    /// # Errors
    /// Returns `ConsincoError::NotFound` when the environment has no login URL.
    pub fn credential(&self, environment: Environment) -> Result<Credential> {
        let url = self.environments.login_url(environment).ok_or_else(|| {
            ConsincoError::NotFound(format!("Environment '{environment}' is not configured"))
        })?;

        Ok(Credential::new(url, self.erp.identity, self.erp.secret).with_company(self.erp.company))
    }

    /// `prod` when configured, otherwise the only configured environment.
    pub fn default_environment(&self) -> Option<Environment> {
        self.environments.configured().into_iter().next()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            health_requires_auth: false,
        }
    }
}

impl fmt::Debug for BasicAuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuthConfig")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl fmt::Debug for ErpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErpConfig")
            .field("identity", &self.identity)
            .field("secret", &"***")
            .field("company", &self.company)
            .field("tls_verify", &self.tls_verify)
            .field("timeout_secs", &self.timeout_secs)
            .field("api_port", &self.api_port)
            .field("escape_sql", &self.escape_sql)
            .field("tokens_dir", &self.tokens_dir)
            .finish()
    }
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_company() -> u64 {
    DEFAULT_COMPANY
}

fn default_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

fn default_api_port() -> u16 {
    DEFAULT_API_PORT
}

fn default_tokens_dir() -> PathBuf {
    PathBuf::from(DEFAULT_TOKENS_DIR)
}
