//! `POST /categoria/{codigo}/ativar`

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use consinco_domain::ConsincoError;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use super::EnvironmentQuery;
use crate::context::AppContext;
use crate::errors::ApiError;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct CategoryActivationResponse {
    pub success: bool,
    pub ambiente: String,
    pub codigo: String,
    pub error: Option<String>,
}

/// Activate a product category on the selected environment.
///
/// Same contract as the SQL route: ERP refusals come back with
/// `success=false`, token failures are HTTP 500.
pub async fn activate_category(
    State(context): State<Arc<AppContext>>,
    Path(codigo): Path<String>,
    Query(query): Query<EnvironmentQuery>,
) -> Result<Json<CategoryActivationResponse>, ApiError> {
    let (environment, gateway) = context.registry.resolve(query.ambiente.as_deref())?;
    let ambiente = environment.to_string();

    match gateway.activate_category(&codigo).await {
        Ok(true) => {
            Ok(Json(CategoryActivationResponse { success: true, ambiente, codigo, error: None }))
        }
        Ok(false) => {
            let error = Some(format!("ERP did not activate category {codigo}"));
            Ok(Json(CategoryActivationResponse { success: false, ambiente, codigo, error }))
        }
        Err(err @ ConsincoError::Gateway { .. }) => {
            warn!(environment = %environment, category = %codigo, error = %err, "Category activation failed");
            let error = Some(err.to_string());
            Ok(Json(CategoryActivationResponse { success: false, ambiente, codigo, error }))
        }
        Err(err) => {
            error!(environment = %environment, kind = err.label(), error = %err, "Category activation failed");
            Err(ApiError::Internal(format!("Failed to activate category: {err}")))
        }
    }
}
