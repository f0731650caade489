//! # Consinco Core
//!
//! Session lifecycle logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces (traits) for ERP login, snapshot persistence and the
//!   authenticated gateway
//! - [`TokenCache`], the per-environment token lifecycle manager
//!
//! ## Architecture Principles
//! - Only depends on `consinco-common` and `consinco-domain`
//! - No HTTP or filesystem code
//! - All external effects via traits

pub mod gateway_ports;
pub mod session;

pub use gateway_ports::ErpGateway;
pub use session::ports::{Authenticator, SnapshotStore};
pub use session::{InMemorySnapshotStore, Session, TokenCache};
