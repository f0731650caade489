//! ERP gateway port interface

use async_trait::async_trait;
use consinco_domain::{Result, TokenStatus};
use serde_json::Value;

/// Authenticated operations against one ERP environment
///
/// The service front only talks to this trait, so handlers can be exercised
/// against a stub without a live ERP.
#[async_trait]
pub trait ErpGateway: Send + Sync {
    /// Execute SQL text on the ERP and return its JSON answer untouched.
    ///
    /// # Errors
    /// `ConsincoError::Auth` when no valid token can be produced,
    /// `ConsincoError::Gateway` when the ERP does not answer HTTP 200.
    async fn run_sql(&self, sql: &str) -> Result<Value>;

    /// Activate a product category; `Ok(true)` iff the ERP answered 200.
    async fn activate_category(&self, code: &str) -> Result<bool>;

    /// Current token status. Never triggers a renewal.
    fn token_status(&self) -> TokenStatus;
}
