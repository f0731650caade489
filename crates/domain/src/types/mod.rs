//! Domain types and models
//!
//! Everything the token lifecycle needs to describe a session: which
//! environment it belongs to, the credential used to open it, the cookie jar
//! the ERP hands back and the bearer token carried inside that jar.

pub mod cookies;
pub mod credential;
pub mod environment;
pub mod status;
pub mod token;

pub use cookies::CookieJar;
pub use credential::Credential;
pub use environment::Environment;
pub use status::{TokenState, TokenStatus};
pub use token::Token;
