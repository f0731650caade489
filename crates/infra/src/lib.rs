//! # Consinco Gateway Infrastructure
//!
//! Adapters for the ports defined in `consinco-core`.
//!
//! This crate contains:
//! - The HTTP client used for every ERP call
//! - The Consinco login flow and authenticated gateway
//! - File-backed session snapshots
//! - Configuration loading and logging setup
//!
//! ## Architecture
//! - Implements traits defined in `consinco-core`
//! - Contains all "impure" code (network, filesystem, environment)

pub mod config;
pub mod errors;
pub mod http;
pub mod integrations;
pub mod observability;
pub mod storage;

// Re-export commonly used items
pub use errors::{into_gateway_error, InfraError};
pub use http::{HttpClient, HttpClientBuilder};
pub use integrations::consinco::{
    build_gateway, ConsincoAuthenticator, ConsincoGateway, ErpEndpoints,
};
pub use observability::init_tracing;
pub use storage::FileSnapshotStore;
