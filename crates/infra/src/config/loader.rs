//! Configuration loader
//!
//! Loads gateway configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Loads a `.env` file from the working directory when one exists
//! 2. Attempts to load from environment variables
//! 3. If incomplete, falls back to the first config file found by
//!    [`probe_config_paths`]
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `URL_LOGIN_PROD`, `URL_LOGIN_DEV`: ERP login URL per environment
//!   (`URL_LOGIN` is accepted as the production URL)
//! - `NOME`, `SENHA`: numeric ERP identity and secret
//! - `NRO_EMPRESA`: company number (default 1)
//! - `VALID_USERNAME`, `VALID_PASSWORD`: Basic credentials callers must send
//! - `HOST`, `PORT`: listener address (default `0.0.0.0:8000`)
//! - `HEALTH_REQUIRES_AUTH`: put `/health` behind Basic auth (default false)
//! - `CONSINCO_TLS_VERIFY`: verify ERP certificates (default false)
//! - `CONSINCO_HTTP_TIMEOUT_SECS`: per-request timeout (default 30)
//! - `CONSINCO_API_PORT`: port of the ERP REST APIs (default 8343)
//! - `CONSINCO_SQL_ESCAPE`: JSON-escape SQL text (default false)
//! - `TOKENS_DIR`: session snapshot directory (default `tokens`)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./consinco-gateway.{toml,json}` or `./config.{toml,json}`
//! 2. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use consinco_domain::constants::{
    DEFAULT_API_PORT, DEFAULT_COMPANY, DEFAULT_HOST, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_PORT,
    DEFAULT_TOKENS_DIR,
};
use consinco_domain::{
    BasicAuthConfig, ConsincoError, EnvironmentUrls, ErpConfig, Result, ServerConfig,
    ServiceConfig,
};

const CONFIG_FILE_NAMES: [&str; 4] =
    ["consinco-gateway.toml", "consinco-gateway.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// Reads the process environment as-is; the binary loads `.env` before
/// calling this. First attempts to load from environment variables. If any
/// required variables are missing, falls back to a probed config file. When
/// no file exists either, the environment error is returned since it names
/// the missing variable.
///
/// # Errors
/// Returns `ConsincoError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing or fail validation
pub fn load() -> Result<ServiceConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(env_err) => {
            tracing::debug!(error = %env_err, "Failed to load from environment, trying file");
            match probe_config_paths() {
                Some(path) => load_from_file(Some(path)),
                None => Err(env_err),
            }
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `ConsincoError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<ServiceConfig> {
    let environments = EnvironmentUrls {
        prod: optional_var("URL_LOGIN_PROD").or_else(|| optional_var("URL_LOGIN")),
        dev: optional_var("URL_LOGIN_DEV"),
    };
    if environments.configured().is_empty() {
        return Err(ConsincoError::Config(
            "Missing required environment variable: URL_LOGIN_PROD, URL_LOGIN_DEV or URL_LOGIN"
                .to_string(),
        ));
    }

    let config = ServiceConfig {
        server: ServerConfig {
            host: optional_var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: env_parse("PORT", DEFAULT_PORT)?,
            health_requires_auth: env_bool("HEALTH_REQUIRES_AUTH", false),
        },
        auth: BasicAuthConfig {
            username: env_var("VALID_USERNAME")?,
            password: env_var("VALID_PASSWORD")?,
        },
        erp: ErpConfig {
            identity: required_parse("NOME")?,
            secret: required_parse("SENHA")?,
            company: env_parse("NRO_EMPRESA", DEFAULT_COMPANY)?,
            tls_verify: env_bool("CONSINCO_TLS_VERIFY", false),
            timeout_secs: env_parse("CONSINCO_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?,
            api_port: env_parse("CONSINCO_API_PORT", DEFAULT_API_PORT)?,
            escape_sql: env_bool("CONSINCO_SQL_ESCAPE", false),
            tokens_dir: optional_var("TOKENS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TOKENS_DIR)),
        },
        environments,
    };

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `ConsincoError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid or validation fails
pub fn load_from_file(path: Option<PathBuf>) -> Result<ServiceConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ConsincoError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ConsincoError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ConsincoError::Config(format!("Failed to read config file: {}", e)))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<ServiceConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ConsincoError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ConsincoError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(ConsincoError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe standard paths for configuration files
///
/// Searches the current working directory, then the executable's directory.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
///
/// # Errors
/// Returns `ConsincoError::Config` if the variable is not set or empty.
fn env_var(key: &str) -> Result<String> {
    optional_var(key).ok_or_else(|| {
        ConsincoError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Non-empty value of an environment variable, trimmed.
fn optional_var(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Parse a required variable.
fn required_parse<T>(key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = env_var(key)?;
    raw.parse::<T>()
        .map_err(|e| ConsincoError::Config(format!("Invalid value for {}: {} ({})", key, raw, e)))
}

/// Parse an optional variable, falling back to `default` when unset.
fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional_var(key) {
        Some(_) => required_parse(key),
        None => Ok(default),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
///
/// # Returns
/// The parsed boolean value, or `default` if not set.
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
