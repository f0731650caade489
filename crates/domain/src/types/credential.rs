//! Login credential for one ERP environment

use std::fmt;

use crate::constants::DEFAULT_COMPANY;
use crate::utils::domain::extract_domain;

/// Identity used to open an ERP session.
///
/// Immutable once built; one per environment for the process lifetime.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    login_url: String,
    identity: u64,
    secret: u64,
    company: u64,
}

impl Credential {
    pub fn new(login_url: impl Into<String>, identity: u64, secret: u64) -> Self {
        Self { login_url: login_url.into(), identity, secret, company: DEFAULT_COMPANY }
    }

    #[must_use]
    pub fn with_company(mut self, company: u64) -> Self {
        self.company = company;
        self
    }

    pub fn login_url(&self) -> &str {
        &self.login_url
    }

    pub fn identity(&self) -> u64 {
        self.identity
    }

    /// Numeric secret. Never log this value.
    pub fn secret(&self) -> u64 {
        self.secret
    }

    pub fn company(&self) -> u64 {
        self.company
    }

    /// Host name the credential authenticates against; keys the durable
    /// snapshot.
    pub fn domain(&self) -> String {
        extract_domain(&self.login_url)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("login_url", &self.login_url)
            .field("identity", &self.identity)
            .field("secret", &"***")
            .field("company", &self.company)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_company_to_one() {
        let credential = Credential::new("https://erp.example.com/Login", 42, 1234);
        assert_eq!(credential.company(), 1);
        assert_eq!(credential.with_company(7).company(), 7);
    }

    #[test]
    fn derives_domain_from_login_url() {
        let credential = Credential::new("https://erp.example.com:8443/Login?x=1", 42, 1234);
        assert_eq!(credential.domain(), "erp.example.com");
    }

    #[test]
    fn debug_redacts_secret() {
        let credential = Credential::new("https://erp.example.com", 42, 987654);
        let rendered = format!("{credential:?}");
        assert!(!rendered.contains("987654"));
        assert!(rendered.contains("***"));
    }
}
