//! # Consinco Domain
//!
//! Business domain types and models for the Consinco gateway.
//!
//! This crate contains:
//! - Session types (`Token`, `CookieJar`, `Credential`, `TokenStatus`)
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other Consinco crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
pub use utils::domain::extract_domain;
