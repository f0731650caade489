//! `GET /token/status`

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use chrono::SecondsFormat;
use consinco_common::format_hms;
use consinco_domain::{TokenState, TokenStatus};
use serde::{Deserialize, Serialize};

use super::EnvironmentQuery;
use crate::context::AppContext;
use crate::errors::ApiError;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TokenStatusResponse {
    pub success: bool,
    pub ambiente: String,
    pub status: TokenStatusBody,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TokenStatusBody {
    pub token_valido: bool,
    /// RFC 3339, UTC.
    pub validade: Option<String>,
    /// `H:MM:SS`; `None` once expired.
    pub tempo_restante: Option<String>,
    pub precisa_renovar: bool,
    pub estado: TokenState,
}

impl From<TokenStatus> for TokenStatusBody {
    fn from(status: TokenStatus) -> Self {
        Self {
            token_valido: status.valid,
            validade: status.expires_at.map(|at| at.to_rfc3339_opts(SecondsFormat::Secs, true)),
            tempo_restante: status.time_remaining.map(format_hms),
            precisa_renovar: status.needs_renewal,
            estado: status.state,
        }
    }
}

/// Report the selected environment's token without renewing it.
pub async fn token_status(
    State(context): State<Arc<AppContext>>,
    Query(query): Query<EnvironmentQuery>,
) -> Result<Json<TokenStatusResponse>, ApiError> {
    let (environment, gateway) = context.registry.resolve(query.ambiente.as_deref())?;

    Ok(Json(TokenStatusResponse {
        success: true,
        ambiente: environment.to_string(),
        status: gateway.token_status().into(),
    }))
}
