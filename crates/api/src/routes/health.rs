use axum::Json;
use serde_json::{json, Value};

const SERVICE_NAME: &str = "Consinco SQL Gateway";

/// Liveness probe; never touches the ERP.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "message": "Service is running" }))
}

/// Service description.
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health",
            "sql_query": "/sql/query (POST)",
            "token_status": "/token/status (GET)",
            "category_activation": "/categoria/{codigo}/ativar (POST)",
        },
        "authentication": "Basic Auth",
    }))
}
