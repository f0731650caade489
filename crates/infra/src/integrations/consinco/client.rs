//! Authenticated ERP client
use std::sync::Arc;

use async_trait::async_trait;
use consinco_core::{ErpGateway, Session, TokenCache};
use consinco_domain::{ConsincoError, Environment, Result, TokenStatus};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, COOKIE};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::endpoints::ErpEndpoints;
use crate::errors::into_gateway_error;
use crate::http::HttpClient;

/// Placeholder replaced by the SQL text in [`SQL_BODY_TEMPLATE`].
const SQL_PLACEHOLDER: &str = "{SQL_TEXT}";

/// Body of the SQL execution call. The SQL text is substituted verbatim
/// unless escaping is enabled.
const SQL_BODY_TEMPLATE: &str =
    r#"{"CommandText": "{SQL_TEXT}", "ConnectionType": 0, "Limit": null}"#;

/// ERP client for one environment
///
/// Every call first obtains a valid session from the environment's
/// [`TokenCache`], then sends the bearer token and the session cookies.
pub struct ConsincoGateway {
    environment: Environment,
    endpoints: ErpEndpoints,
    http_client: HttpClient,
    tokens: Arc<TokenCache>,
    escape_sql: bool,
}

impl ConsincoGateway {
    pub fn new(
        environment: Environment,
        endpoints: ErpEndpoints,
        http_client: HttpClient,
        tokens: Arc<TokenCache>,
    ) -> Self {
        Self { environment, endpoints, http_client, tokens, escape_sql: false }
    }

    /// JSON-escape SQL text before substitution instead of inserting it raw.
    #[must_use]
    pub fn with_sql_escaping(mut self, enabled: bool) -> Self {
        self.escape_sql = enabled;
        self
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn endpoints(&self) -> &ErpEndpoints {
        &self.endpoints
    }

    pub fn tokens(&self) -> &Arc<TokenCache> {
        &self.tokens
    }

    /// Authenticated GET; the response is returned only on HTTP 200.
    ///
    /// # Errors
    /// `ConsincoError::Auth` when no token can be produced,
    /// `ConsincoError::Gateway` for transport failures and non-200 answers.
    pub async fn get(&self, url: &str, params: &[(&str, &str)]) -> Result<Response> {
        let builder = self.http_client.request(Method::GET, url).query(params);
        self.execute(builder).await
    }

    /// Authenticated POST with an optional JSON body or form body.
    ///
    /// # Errors
    /// Same as [`ConsincoGateway::get`].
    pub async fn post(
        &self,
        url: &str,
        json: Option<&Value>,
        form: Option<&[(&str, &str)]>,
    ) -> Result<Response> {
        let mut builder = self.http_client.request(Method::POST, url);
        if let Some(json) = json {
            builder = builder.json(json);
        }
        if let Some(form) = form {
            builder = builder.form(form);
        }
        self.execute(builder).await
    }

    fn sql_body(&self, sql: &str) -> String {
        if self.escape_sql {
            let quoted = Value::from(sql).to_string();
            let escaped =
                quoted.strip_prefix('"').and_then(|q| q.strip_suffix('"')).unwrap_or(&quoted);
            SQL_BODY_TEMPLATE.replace(SQL_PLACEHOLDER, escaped)
        } else {
            SQL_BODY_TEMPLATE.replace(SQL_PLACEHOLDER, sql)
        }
    }

    fn authorize(builder: RequestBuilder, session: &Session) -> RequestBuilder {
        let builder = builder
            .header(AUTHORIZATION, format!("Bearer {}", session.token().access_token()));
        match session.cookies().header_value() {
            Some(cookies) => builder.header(COOKIE, cookies),
            None => builder,
        }
    }

    /// Send an authenticated request without judging the status.
    async fn send_authorized(&self, builder: RequestBuilder) -> Result<Response> {
        let session = self.tokens.get_valid_session().await?;
        self.http_client
            .send(Self::authorize(builder, &session))
            .await
            .map_err(into_gateway_error)
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Response> {
        let response = self.send_authorized(builder).await?;
        ensure_ok(response).await
    }
}

#[async_trait]
impl ErpGateway for ConsincoGateway {
    async fn run_sql(&self, sql: &str) -> Result<Value> {
        let correlation_id = uuid::Uuid::new_v4();
        debug!(
            %correlation_id,
            environment = %self.environment,
            sql_len = sql.len(),
            "Executing SQL on ERP"
        );

        let builder = self
            .http_client
            .request(Method::POST, self.endpoints.sql())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(self.sql_body(sql));

        let response = match self.execute(builder).await {
            Ok(response) => response,
            Err(err) => {
                warn!(
                    %correlation_id,
                    environment = %self.environment,
                    error = %err,
                    "ERP SQL execution failed"
                );
                return Err(err);
            }
        };

        let data: Value = response.json().await.map_err(|err| {
            ConsincoError::gateway_transport(format!("ERP answered with a non-JSON body: {err}"))
        })?;

        debug!(%correlation_id, environment = %self.environment, "ERP SQL execution succeeded");
        Ok(data)
    }

    async fn activate_category(&self, code: &str) -> Result<bool> {
        let url = self.endpoints.activate_category(code);
        let builder = self.http_client.request(Method::POST, url);
        let response = self.send_authorized(builder).await?;

        let status = response.status();
        if status == StatusCode::OK {
            info!(environment = %self.environment, category = code, "Category activated");
            Ok(true)
        } else {
            warn!(
                environment = %self.environment,
                category = code,
                status = status.as_u16(),
                "Category activation rejected"
            );
            Ok(false)
        }
    }

    fn token_status(&self) -> TokenStatus {
        self.tokens.status()
    }
}

/// Pass HTTP 200 through; turn anything else into a gateway error.
async fn ensure_ok(response: Response) -> Result<Response> {
    let status = response.status();
    if status == StatusCode::OK {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ConsincoError::gateway_status(status.as_u16(), body.trim()))
}
