//! # Consinco Gateway API
//!
//! axum service front: Basic authentication, environment selection and the
//! HTTP routes over the ERP gateways.
//!
//! ## Architecture
//! - Depends on `common`, `domain`, `core` and `infra`
//! - Wires the environment registry at startup
//! - Handlers only talk to the `ErpGateway` port

pub mod context;
pub mod errors;
pub mod middleware;
pub mod routes;

// Re-export for convenience
pub use context::{AppContext, BasicCredentials, DynErpGateway, EnvironmentRegistry};
pub use errors::ApiError;
pub use routes::router;
