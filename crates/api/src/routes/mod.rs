//! HTTP routes of the gateway
//!
//! | Method | Path                        | Auth                        |
//! |--------|-----------------------------|-----------------------------|
//! | GET    | `/`                         | only with `health_requires_auth` |
//! | GET    | `/health`                   | only with `health_requires_auth` |
//! | POST   | `/sql/query`                | Basic                       |
//! | GET    | `/token/status`             | Basic                       |
//! | POST   | `/categoria/{codigo}/ativar`| Basic                       |
//!
//! ERP routes accept `?ambiente=prod|dev`; without it the default
//! environment is used.

mod category;
mod health;
mod sql;
mod token;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::{middleware, Router};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

pub use category::CategoryActivationResponse;
pub use sql::{SqlQuery, SqlResponse};
pub use token::{TokenStatusBody, TokenStatusResponse};

use crate::context::AppContext;
use crate::middleware::require_basic_auth;

/// `?ambiente=` selector shared by the ERP routes.
#[derive(Debug, Default, Deserialize)]
pub struct EnvironmentQuery {
    pub ambiente: Option<String>,
}

/// Build the service router over `context`.
pub fn router(context: Arc<AppContext>) -> Router {
    let basic_auth = middleware::from_fn_with_state(Arc::clone(&context), require_basic_auth);

    let erp = Router::new()
        .route("/sql/query", post(sql::execute_sql))
        .route("/token/status", get(token::token_status))
        .route("/categoria/{codigo}/ativar", post(category::activate_category));

    let probes = Router::new().route("/", get(health::root)).route("/health", get(health::health));

    let routes = if context.health_requires_auth {
        erp.merge(probes).route_layer(basic_auth)
    } else {
        erp.route_layer(basic_auth).merge(probes)
    };

    routes.layer(TraceLayer::new_for_http()).with_state(context)
}
