//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! gateway.

/// Tokens whose expiry is this close (or closer) are due for renewal.
pub const TOKEN_SAFETY_MARGIN_SECS: i64 = 10 * 60;

/// Fixed correction subtracted from the expiry of a token reloaded from a
/// persisted snapshot. The upstream cookie stores local (UTC-3) wall-clock
/// time behind a `Z` suffix.
pub const SNAPSHOT_EXPIRY_CORRECTION_HOURS: i64 = 3;

/// Cookie carrying the ERP session token.
pub const OAUTH_TOKEN_COOKIE: &str = "oAuthToken";

/// Field of the `oAuthToken` payload holding the bearer token.
pub const ACCESS_TOKEN_FIELD: &str = "access_token";

/// Field of the `oAuthToken` payload holding the expiry timestamp.
pub const EXPIRES_FIELD: &str = ".expires";

/// Format of the `.expires` timestamp.
pub const EXPIRES_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Format of the `DataHoraLocal` login field.
pub const LOGIN_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Company number used when none is configured.
pub const DEFAULT_COMPANY: u64 = 1;

/// Port of the ERP's REST APIs (SQL execution, structural registers).
pub const DEFAULT_API_PORT: u16 = 8343;

/// Directory holding durable session snapshots.
pub const DEFAULT_TOKENS_DIR: &str = "tokens";

/// Suffix of durable snapshot file names (`<domain>_cookies.json`).
pub const SNAPSHOT_FILE_SUFFIX: &str = "_cookies.json";

// Service front defaults
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
