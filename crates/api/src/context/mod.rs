//! Application context - dependency injection container

use std::collections::BTreeMap;
use std::sync::Arc;

use consinco_common::SecretString;
use consinco_core::{ErpGateway, SnapshotStore};
use consinco_domain::{ConsincoError, Environment, Result, ServiceConfig};
use consinco_infra::{build_gateway, FileSnapshotStore};
use tracing::info;

use crate::errors::ApiError;

/// Trait object for one environment's gateway
pub type DynErpGateway = dyn ErpGateway + 'static;

/// Gateways per named environment, fixed at startup
///
/// Each environment owns an independent token cache; nothing is shared
/// between them.
pub struct EnvironmentRegistry {
    gateways: BTreeMap<Environment, Arc<DynErpGateway>>,
    default: Environment,
}

impl EnvironmentRegistry {
    /// Empty registry answering unqualified requests with `default`.
    pub fn new(default: Environment) -> Self {
        Self { gateways: BTreeMap::new(), default }
    }

    #[must_use]
    pub fn with_gateway(mut self, environment: Environment, gateway: Arc<DynErpGateway>) -> Self {
        self.gateways.insert(environment, gateway);
        self
    }

    /// Build one gateway per configured environment, all persisting their
    /// sessions through `snapshots`.
    ///
    /// # Errors
    /// `ConsincoError::Config` when no environment is configured or a
    /// gateway cannot be built.
    pub fn from_config(config: &ServiceConfig, snapshots: Arc<dyn SnapshotStore>) -> Result<Self> {
        let default = config.default_environment().ok_or_else(|| {
            ConsincoError::Config("No ERP environment is configured".to_string())
        })?;

        let mut registry = Self::new(default);
        for environment in config.environments.configured() {
            let gateway = build_gateway(environment, config, Arc::clone(&snapshots))?;
            registry.gateways.insert(environment, Arc::new(gateway));
        }
        Ok(registry)
    }

    pub fn default_environment(&self) -> Environment {
        self.default
    }

    pub fn environments(&self) -> impl Iterator<Item = Environment> + '_ {
        self.gateways.keys().copied()
    }

    /// Resolve the `ambiente` selector of a request.
    ///
    /// `None` selects the default environment. Unknown names are rejected as
    /// invalid input; known but unconfigured ones are not found.
    pub fn resolve(
        &self,
        selector: Option<&str>,
    ) -> std::result::Result<(Environment, Arc<DynErpGateway>), ApiError> {
        let environment = match selector.map(str::trim).filter(|s| !s.is_empty()) {
            None => self.default,
            Some(name) => name.parse::<Environment>().map_err(ApiError::UnknownEnvironment)?,
        };

        self.gateways
            .get(&environment)
            .map(|gateway| (environment, Arc::clone(gateway)))
            .ok_or_else(|| {
                ApiError::NotFound(format!("Environment '{environment}' is not configured"))
            })
    }
}

/// Basic credentials callers must present
pub struct BasicCredentials {
    username: String,
    password: SecretString,
}

impl BasicCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: SecretString::new(password) }
    }

    /// Both halves are always compared so timing does not reveal which one
    /// was wrong.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        let username_ok = consinco_common::constant_time_eq(
            self.username.as_bytes(),
            username.as_bytes(),
        );
        let password_ok = self.password.constant_time_eq(password);
        username_ok & password_ok
    }
}

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub registry: EnvironmentRegistry,
    pub credentials: BasicCredentials,
    /// Put `/` and `/health` behind Basic auth as well.
    pub health_requires_auth: bool,
}

impl AppContext {
    /// Wire every configured environment with file-backed snapshots.
    ///
    /// # Errors
    /// `ConsincoError::Config` when a gateway cannot be built.
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let snapshots: Arc<dyn SnapshotStore> =
            Arc::new(FileSnapshotStore::new(config.erp.tokens_dir.clone()));
        let registry = EnvironmentRegistry::from_config(config, snapshots)?;

        info!(
            default = %registry.default_environment(),
            environments = ?registry.environments().collect::<Vec<_>>(),
            tokens_dir = %config.erp.tokens_dir.display(),
            "Application context initialized"
        );

        Ok(Self::with_registry(
            registry,
            BasicCredentials::new(config.auth.username.clone(), config.auth.password.clone()),
            config.server.health_requires_auth,
        ))
    }

    /// Context over an already-built registry.
    pub fn with_registry(
        registry: EnvironmentRegistry,
        credentials: BasicCredentials,
        health_requires_auth: bool,
    ) -> Self {
        Self { registry, credentials, health_requires_auth }
    }
}
