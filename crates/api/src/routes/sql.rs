//! `POST /sql/query`

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use consinco_domain::ConsincoError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};

use super::EnvironmentQuery;
use crate::context::AppContext;
use crate::errors::ApiError;

#[derive(Debug, Deserialize)]
pub struct SqlQuery {
    pub sql_query: String,
}

/// `data` holds the ERP's JSON untouched (object or array).
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SqlResponse {
    pub success: bool,
    pub data: Option<Value>,
    pub error: Option<String>,
}

/// Run the caller's SQL on the selected environment.
///
/// A non-200 ERP answer is reported in the body with `success=false`; any
/// other failure (no valid token included) is an HTTP 500.
pub async fn execute_sql(
    State(context): State<Arc<AppContext>>,
    Query(query): Query<EnvironmentQuery>,
    Json(body): Json<SqlQuery>,
) -> Result<Json<SqlResponse>, ApiError> {
    let (environment, gateway) = context.registry.resolve(query.ambiente.as_deref())?;

    match gateway.run_sql(&body.sql_query).await {
        Ok(data) => {
            info!(environment = %environment, "SQL query succeeded");
            Ok(Json(SqlResponse { success: true, data: Some(data), error: None }))
        }
        Err(err @ ConsincoError::Gateway { .. }) => {
            warn!(
                environment = %environment,
                status = ?err.upstream_status(),
                error = %err,
                "SQL query rejected by ERP"
            );
            Ok(Json(SqlResponse { success: false, data: None, error: Some(err.to_string()) }))
        }
        Err(err) => {
            error!(environment = %environment, kind = err.label(), error = %err, "SQL query failed");
            Err(ApiError::Internal(format!("Failed to execute query: {err}")))
        }
    }
}
