//! ERP endpoint derivation

use consinco_domain::{extract_domain, ConsincoError, Result};

const LOGIN_PATH: &str = "/Login";
const SQL_PATH: &str = "/ConstrutorAnaliseAPI/api/Analysis/GetSqlResult";
const STRUCTURAL_API_PATH: &str = "/CadastrosEstruturaisAPI/api/v1";

/// Base URLs of one ERP deployment
///
/// The web front (login) lives on the default HTTPS port of the domain; the
/// REST APIs live on a dedicated port of the same host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErpEndpoints {
    web_base: String,
    api_base: String,
}

impl ErpEndpoints {
    /// Derive every endpoint from the configured login URL.
    ///
    /// # Errors
    /// Returns `ConsincoError::Config` when the URL has no host.
    pub fn derive(login_url: &str, api_port: u16) -> Result<Self> {
        let domain = extract_domain(login_url);
        if domain.is_empty() {
            return Err(ConsincoError::Config(format!("Login URL has no host: {login_url}")));
        }

        Ok(Self {
            web_base: format!("https://{domain}"),
            api_base: format!("https://{domain}:{api_port}"),
        })
    }

    /// Explicit base URLs, e.g. a local stub server.
    pub fn new(web_base: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            web_base: web_base.into().trim_end_matches('/').to_string(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn login(&self) -> String {
        format!("{}{LOGIN_PATH}", self.web_base)
    }

    pub fn sql(&self) -> String {
        format!("{}{SQL_PATH}", self.api_base)
    }

    /// Structural register endpoint for `entity` (e.g. `Familia`).
    pub fn entity(&self, entity: &str) -> String {
        format!("{}{STRUCTURAL_API_PATH}/{}", self.api_base, urlencoding::encode(entity))
    }

    pub fn activate_category(&self, code: &str) -> String {
        format!(
            "{}{STRUCTURAL_API_PATH}/Familia/{}/ativar-categoria",
            self.api_base,
            urlencoding::encode(code)
        )
    }

    pub fn nutritional_info(&self) -> String {
        format!("{}{STRUCTURAL_API_PATH}/Familia/informacao-nutricional", self.api_base)
    }
}
